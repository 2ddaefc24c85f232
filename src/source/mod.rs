//! Document sources - produce documents for the search index / 文档来源
//!
//! - `HtmlSource`: HTML files under a directory / 目录下的 HTML 文件
//! - `SiteSource`: Markdown content of a Hugo-style static site / 静态站点内容
//!
//! Sources only read; writing to the index is the indexer's job.

pub mod front_matter;
pub mod html;
pub mod markdown;
pub mod site;

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

use crate::search::Document;

pub use html::HtmlSource;
pub use site::SiteSource;

/// Document source error / 文档来源错误
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid front matter in {path:?}: {message}")]
    FrontMatter { path: PathBuf, message: String },
    #[error("invalid site config {path:?}: {message}")]
    SiteConfig { path: PathBuf, message: String },
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A tree of documents that can be (re)indexed / 可索引的文档集合
pub trait DocumentSource: Send + Sync {
    /// Short name for logs / 日志名称
    fn name(&self) -> &'static str;

    /// Documents modified at or after `since` (all documents when `None`) / 收集文档
    ///
    /// A single unreadable document is logged and skipped.
    fn collect(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Document>, SourceError>;
}

/// Modification-time watermark check / 修改时间过滤
pub fn modified_since(modified: SystemTime, since: Option<DateTime<Utc>>) -> bool {
    match since {
        Some(since) => DateTime::<Utc>::from(modified) >= since,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_modified_since() {
        let now = SystemTime::now();
        let now_utc = DateTime::<Utc>::from(now);
        assert!(modified_since(now, None));
        assert!(modified_since(now, Some(now_utc - Duration::seconds(10))));
        assert!(!modified_since(now, Some(now_utc + Duration::seconds(10))));
    }
}
