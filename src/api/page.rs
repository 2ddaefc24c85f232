//! Search page rendering / 搜索页面渲染
//!
//! A page template is plain HTML with three placeholders:
//! `{{query}}` (escaped search text), `{{count}}` and `{{results}}`
//! (one `<li>` per hit). Substitution is a single pass, so text coming
//! from documents is never re-expanded.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

use crate::search::SearchHit;
use crate::utils::escape_html;

/// Body characters shown for hits without a summary
const EXCERPT_CHARS: usize = 200;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(query|count|results)\s*\}\}").expect("static placeholder pattern")
});

/// Built-in page used when no template file is configured / 内置页面模板
pub const DEFAULT_TEMPLATE: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Search: {{query}}</title>
  </head>
  <body>
    <form action="/search" method="get">
      <input type="search" name="q" value="{{query}}">
      <button type="submit">Search</button>
    </form>
    <p>{{count}} results</p>
    <ol class="results">
{{results}}
    </ol>
  </body>
</html>
"#;

/// Search page template / 搜索页面模板
#[derive(Debug, Clone)]
pub struct PageTemplate {
    source: String,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl PageTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    /// Load a template file / 加载模板文件
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        tracing::info!("Loaded page template {:?}", path);
        Ok(Self::new(source))
    }

    /// Render the result page / 渲染结果页面
    pub fn render(&self, query: &str, hits: &[SearchHit]) -> String {
        let results = hits.iter().map(render_hit).collect::<Vec<_>>().join("\n");

        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures| match &caps[1] {
                "query" => escape_html(query),
                "count" => hits.len().to_string(),
                _ => results.clone(),
            })
            .into_owned()
    }
}

fn render_hit(hit: &SearchHit) -> String {
    // summaries are HTML produced at index time
    let summary = match hit.summary.as_deref() {
        Some(summary) if !summary.is_empty() => summary.to_string(),
        _ => escape_html(hit.excerpt(EXCERPT_CHARS)),
    };
    let title = if hit.title.is_empty() { &hit.path } else { &hit.title };

    format!(
        "<li><a href=\"{}\">{}</a><div class=\"summary\">{}</div></li>",
        escape_html(&hit.path),
        escape_html(title),
        summary
    )
}

/// Standalone error page / 错误页面
pub fn error_page(message: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head>
    <title>Error</title>
  </head>
  <body>
    <h1>Error</h1>
    <p>{}</p>
  </body>
</html>
"#,
        escape_html(message)
    )
}
