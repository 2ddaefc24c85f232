use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::search::SearchHit;

/// 搜索请求参数 (`GET /search?q=…`)
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// 搜索响应
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Raw query as typed / 原始查询
    pub query: String,
    /// FTS5 expression that was executed / 实际执行的 FTS5 表达式
    pub match_expr: String,
    pub results: Vec<SearchHit>,
    pub total: usize,
}

/// Why a search produced no result page / 搜索失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    EmptyQuery,
    Malformed,
    /// FTS5 rejected the translated query / 查询语法被 FTS5 拒绝
    Rejected(String),
    Query(String),
}

impl SearchFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            SearchFailure::EmptyQuery => StatusCode::OK,
            SearchFailure::Malformed | SearchFailure::Rejected(_) => StatusCode::BAD_REQUEST,
            SearchFailure::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message / 提示信息
    pub fn message(&self) -> String {
        match self {
            SearchFailure::EmptyQuery => "Please enter search terms.".to_string(),
            SearchFailure::Malformed => "Malformed search terms.".to_string(),
            SearchFailure::Rejected(e) | SearchFailure::Query(e) => format!("Query error: {}", e),
        }
    }
}
