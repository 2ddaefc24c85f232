use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::ApiResponse;
use crate::search::IndexStats;
use crate::state::AppState;

/// GET /api/health - 健康检查
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
    }))
}

/// GET /api/stats - 索引统计
pub async fn index_stats(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<IndexStats>>) {
    match state.index.stats().await {
        Ok(stats) => (StatusCode::OK, Json(ApiResponse::success(stats))),
        Err(e) => {
            tracing::error!("Failed to read index stats: {}", e);
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            (status, Json(ApiResponse::failure(status, &e.to_string())))
        }
    }
}
