//! Static site source / 静态站点来源
//!
//! Indexes the Markdown pages under `<root>/content` of a Hugo-style site.
//! Each page is stored under its public permalink so results link straight
//! to the published page.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::front_matter::{self, FrontMatter};
use super::markdown;
use super::{modified_since, DocumentSource, SourceError};
use crate::search::Document;
use crate::utils::get_ext;

/// Site configuration files, in lookup order / 站点配置文件
const SITE_CONFIG_FILES: [&str; 2] = ["hugo.toml", "config.toml"];

/// Markdown content of a static site / 静态站点的 Markdown 内容
pub struct SiteSource {
    root: PathBuf,
    base_url: Option<String>,
}

impl SiteSource {
    /// `base_url` overrides the `baseURL` from the site configuration.
    pub fn new(root: impl Into<PathBuf>, base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            base_url,
        }
    }

    fn content_dir(&self) -> PathBuf {
        self.root.join("content")
    }

    /// Resolve the site's base URL / 获取站点 baseURL
    pub fn resolve_base_url(&self) -> Result<String, SourceError> {
        if let Some(base_url) = &self.base_url {
            return Ok(base_url.clone());
        }

        for name in SITE_CONFIG_FILES {
            let path = self.root.join(name);
            if !path.is_file() {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| SourceError::io(&path, e))?;
            let table: toml::Table = content.parse().map_err(|e: toml::de::Error| SourceError::SiteConfig {
                path: path.clone(),
                message: e.message().to_string(),
            })?;

            let base_url = table
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("baseurl"))
                .and_then(|(_, value)| value.as_str())
                .unwrap_or("/");
            tracing::debug!("Site baseURL from {:?}: {}", path, base_url);
            return Ok(base_url.to_string());
        }

        Ok("/".to_string())
    }

    fn read_page(
        &self,
        path: &Path,
        base_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Document>, SourceError> {
        let source = std::fs::read_to_string(path).map_err(|e| SourceError::io(path, e))?;
        let (front, body) = front_matter::split(&source).map_err(|message| SourceError::FrontMatter {
            path: path.to_path_buf(),
            message,
        })?;

        if !front.is_published(now) {
            tracing::debug!("Skipping unpublished page {:?}", path);
            return Ok(None);
        }

        let content_dir = self.content_dir();
        let rel = path
            .strip_prefix(&content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let link = permalink(base_url, &rel, &front);
        let title = front.title.clone().unwrap_or_else(|| fallback_title(path));

        let body = markdown::strip_shortcodes(body);
        let text = markdown::to_plain_text(&body);
        let summary = markdown::summary(&body, front.summary.as_deref());

        Ok(Some(Document::new(link, title, text).with_summary(summary)))
    }
}

impl DocumentSource for SiteSource {
    fn name(&self) -> &'static str {
        "site"
    }

    fn collect(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Document>, SourceError> {
        let base_url = self.resolve_base_url()?;
        let now = Utc::now();
        let mut docs = Vec::new();

        for entry in WalkDir::new(self.content_dir()).follow_links(true) {
            let entry = entry?;
            if !entry.file_type().is_file() || get_ext(entry.path()) != "md" {
                continue;
            }

            let modified = entry
                .metadata()?
                .modified()
                .map_err(|e| SourceError::io(entry.path(), e))?;
            if !modified_since(modified, since) {
                continue;
            }

            match self.read_page(entry.path(), &base_url, now) {
                Ok(Some(doc)) => {
                    tracing::debug!("{} -> {:?}", doc.path, doc.title);
                    docs.push(doc);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping {:?}: {}", entry.path(), e),
            }
        }

        Ok(docs)
    }
}

/// Public URL of a content page / 页面永久链接
///
/// `rel` is the path below the content directory, `/`-separated.
pub fn permalink(base_url: &str, rel: &str, front: &FrontMatter) -> String {
    let path = match &front.url {
        Some(url) => url.trim_matches('/').to_string(),
        None => {
            let rel = rel.strip_suffix(".md").unwrap_or(rel);
            let mut segments: Vec<&str> = rel.split('/').filter(|s| !s.is_empty()).collect();

            match segments.last() {
                Some(&"index") | Some(&"_index") => {
                    segments.pop();
                }
                Some(_) => {
                    if let Some(slug) = front.slug.as_deref() {
                        segments.pop();
                        segments.push(slug);
                    }
                }
                None => {}
            }
            segments.join("/")
        }
    };

    let path = path.to_lowercase().replace(' ', "-");
    let base = base_url.trim_end_matches('/');
    if path.is_empty() {
        format!("{}/", base)
    } else {
        format!("{}/{}/", base, path)
    }
}

/// File stem, or the directory name for `index.md` / `_index.md` / 默认标题
fn fallback_title(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    if stem == "index" || stem == "_index" {
        if let Some(dir) = path.parent().and_then(|p| p.file_name()).and_then(|s| s.to_str()) {
            return dir.to_string();
        }
    }
    stem.to_string()
}
