use crate::api::page::PageTemplate;
use crate::search::DbIndex;

/// Shared state of the web front end / Web 服务共享状态
pub struct AppState {
    pub index: DbIndex,
    pub page: PageTemplate,
    /// Upper bound for result rows per query / 每次查询最大结果数
    pub max_results: usize,
}

impl AppState {
    pub fn new(index: DbIndex, page: PageTemplate, max_results: usize) -> Self {
        Self {
            index,
            page,
            max_results,
        }
    }
}
