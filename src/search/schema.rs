//! Search index schema definition / 搜索索引的 Schema 定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Indexed document / 待索引文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Relative file path or page permalink / 文件路径或页面链接
    pub path: String,
    /// Document title / 标题
    pub title: String,
    /// Plain text body / 纯文本正文
    pub text: String,
    /// HTML summary fragment (site pages only) / 摘要（HTML片段）
    pub summary: Option<String>,
}

impl Document {
    pub fn new(path: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            text: text.into(),
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Search result row / 搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: String,
    pub title: String,
    pub summary: Option<String>,
    pub text: String,
}

impl SearchHit {
    /// Leading part of the body, for logs and result listings / 正文前缀
    pub fn excerpt(&self, max_chars: usize) -> &str {
        crate::utils::truncate_chars(&self.text, max_chars)
    }
}

/// Index statistics / 索引统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub document_count: u64,
    pub db_size: u64,
    pub last_indexed: Option<DateTime<Utc>>,
}
