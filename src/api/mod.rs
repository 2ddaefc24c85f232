pub mod page;
pub mod search;
pub mod server;

use axum::{http::StatusCode, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn failure(status: StatusCode, message: &str) -> Self {
        Self {
            code: status.as_u16() as i32,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(search::search_page))
        .route("/api/search", get(search::search_json))
        .route("/api/health", get(server::health_check))
        .route("/api/stats", get(server::index_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
