//! HTML file source / HTML 文件来源
//!
//! Walks a directory for `.html` / `.htm` files and extracts title and plain text.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{modified_since, DocumentSource, SourceError};
use crate::search::Document;
use crate::utils::{collapse_whitespace, get_ext};

static TITLE: Lazy<Regex> = Lazy::new(|| pattern(r"(?is)<title\b[^>]*>(.*?)</title\s*>"));
static COMMENT: Lazy<Regex> = Lazy::new(|| pattern(r"(?s)<!--.*?-->"));
static HEAD: Lazy<Regex> = Lazy::new(|| pattern(r"(?is)<head\b[^>]*>.*?</head\s*>"));
static SCRIPT: Lazy<Regex> = Lazy::new(|| pattern(r"(?is)<script\b[^>]*>.*?</script\s*>"));
static STYLE: Lazy<Regex> = Lazy::new(|| pattern(r"(?is)<style\b[^>]*>.*?</style\s*>"));
static NOSCRIPT: Lazy<Regex> = Lazy::new(|| pattern(r"(?is)<noscript\b[^>]*>.*?</noscript\s*>"));
static BLOCK_TAG: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)</?(p|div|br|hr|h[1-6]|li|ul|ol|dl|dt|dd|tr|table|section|article|aside|nav|header|footer|blockquote|pre|figure|figcaption|main)\b[^>]*>",
    )
});
static TAG: Lazy<Regex> = Lazy::new(|| pattern(r"(?s)<[^>]*>"));
static ENTITY: Lazy<Regex> = Lazy::new(|| pattern(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]{2,8});"));

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static HTML pattern")
}

/// HTML files under a root directory / 目录下的 HTML 文件
pub struct HtmlSource {
    root: PathBuf,
}

impl HtmlSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_document(&self, path: &Path) -> Result<Document, SourceError> {
        let html = std::fs::read(path).map_err(|e| SourceError::io(path, e))?;
        let html = String::from_utf8_lossy(&html);

        let rel = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        Ok(Document::new(rel, extract_title(&html), html_to_text(&html)))
    }
}

impl DocumentSource for HtmlSource {
    fn name(&self) -> &'static str {
        "html"
    }

    fn collect(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Document>, SourceError> {
        let mut docs = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_html_file(entry.path()) {
                continue;
            }

            let modified = entry
                .metadata()?
                .modified()
                .map_err(|e| SourceError::io(entry.path(), e))?;
            if !modified_since(modified, since) {
                continue;
            }

            match self.read_document(entry.path()) {
                Ok(doc) => {
                    tracing::debug!("{} -> {:?}", doc.path, doc.title);
                    docs.push(doc);
                }
                Err(e) => tracing::warn!("Skipping {:?}: {}", entry.path(), e),
            }
        }

        Ok(docs)
    }
}

fn is_html_file(path: &Path) -> bool {
    matches!(get_ext(path).as_str(), "html" | "htm")
}

/// Text of the first `<title>` element / 提取标题
pub fn extract_title(html: &str) -> String {
    TITLE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| {
            let title = decode_entities(&TAG.replace_all(m.as_str(), ""));
            title.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .unwrap_or_default()
}

/// Convert an HTML page to plain text / HTML 转纯文本
pub fn html_to_text(html: &str) -> String {
    let text = COMMENT.replace_all(html, "");
    let text = HEAD.replace_all(&text, "");
    // title is stored in its own column
    let text = TITLE.replace_all(&text, "");
    let text = SCRIPT.replace_all(&text, "");
    let text = STYLE.replace_all(&text, "");
    let text = NOSCRIPT.replace_all(&text, "");
    let text = BLOCK_TAG.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");
    collapse_whitespace(&decode_entities(&text))
}

/// Decode numeric and common named character references / 解码 HTML 实体
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "eacute" => 'é',
        "egrave" => 'è',
        "agrave" => 'à',
        "ccedil" => 'ç',
        "uuml" => 'ü',
        "ouml" => 'ö',
        "auml" => 'ä',
        "szlig" => 'ß',
        _ => return None,
    };
    Some(c)
}
