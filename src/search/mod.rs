//! Search module - full-text index primitives / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Search module only exposes primitive operations: translate, insert_batch, search
//! - Callers (indexer, web front end) control scanning and request flow
//! - Call direction: Core → Search (unidirectional) / 调用方向
//!
//! Index features / 索引特性：
//! - SQLite FTS5 virtual table, bm25 ranking / 使用 SQLite FTS5
//! - User queries are translated before reaching FTS5, never concatenated into SQL

pub mod db_index;
pub mod query;
pub mod schema;

pub use db_index::{DbIndex, IndexError};
pub use query::{translate, ParseError};
pub use schema::{Document, IndexStats, SearchHit};
