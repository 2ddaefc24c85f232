use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::types::*;
use crate::api::page::error_page;
use crate::api::ApiResponse;
use crate::search::{translate, IndexError, SearchHit};
use crate::state::AppState;

/// Characters of body text logged per result
const LOG_EXCERPT_CHARS: usize = 72;

/// Translate and run a raw query / 转换并执行查询
pub async fn run_search(
    state: &AppState,
    raw: &str,
    limit: Option<usize>,
) -> Result<(String, Vec<SearchHit>), SearchFailure> {
    if raw.trim().is_empty() {
        return Err(SearchFailure::EmptyQuery);
    }

    // 转换失败时不回退到原始输入
    let match_expr = translate(raw).map_err(|e| {
        tracing::warn!("Rejected query {:?}: {}", raw, e);
        SearchFailure::Malformed
    })?;
    tracing::debug!("Query {:?} -> {}", raw, match_expr);

    let limit = limit.unwrap_or(state.max_results).clamp(1, state.max_results.max(1));
    let hits = state.index.search(&match_expr, limit).await.map_err(|e| match e {
        IndexError::Syntax(msg) => {
            tracing::debug!("Query {:?} rejected: {}", match_expr, msg);
            SearchFailure::Rejected(msg)
        }
        e => {
            tracing::error!("Query {:?} failed: {}", match_expr, e);
            SearchFailure::Query(e.to_string())
        }
    })?;

    for hit in &hits {
        tracing::debug!("query {:?} result {} {:?}", match_expr, hit.path, hit.excerpt(LOG_EXCERPT_CHARS));
    }

    Ok((match_expr, hits))
}

/// GET /search - 搜索结果页面
pub async fn search_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    match run_search(&state, &params.q, params.limit).await {
        Ok((_, hits)) => Html(state.page.render(&params.q, &hits)).into_response(),
        Err(failure) => (failure.status(), Html(error_page(&failure.message()))).into_response(),
    }
}

/// GET /api/search - 搜索 (JSON)
pub async fn search_json(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<ApiResponse<SearchResponse>>) {
    match run_search(&state, &params.q, params.limit).await {
        Ok((match_expr, results)) => {
            let total = results.len();
            (
                StatusCode::OK,
                Json(ApiResponse::success(SearchResponse {
                    query: params.q,
                    match_expr,
                    results,
                    total,
                })),
            )
        }
        Err(failure) => {
            let status = failure.status();
            let status = if status == StatusCode::OK { StatusCode::BAD_REQUEST } else { status };
            (status, Json(ApiResponse::failure(status, &failure.message())))
        }
    }
}
