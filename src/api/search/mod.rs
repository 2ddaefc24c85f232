//! Search endpoints / 搜索接口

mod query;
mod types;

pub use query::{run_search, search_json, search_page};
pub use types::{SearchFailure, SearchParams, SearchResponse};
