//! Indexing pipeline / 索引流程
//!
//! Collects documents from each enabled source and writes them to the
//! index in batches. The watermark is advanced only when every source
//! succeeded, so a failed run is retried in full next time.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::IndexConfig;
use crate::search::{DbIndex, IndexError};
use crate::source::{DocumentSource, HtmlSource, SiteSource, SourceError};

/// Indexing error / 索引错误
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("{source_name} source failed: {source}")]
    Source {
        source_name: &'static str,
        #[source]
        source: SourceError,
    },
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("indexing task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result of indexing one source / 单个来源的索引结果
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub source: &'static str,
    pub documents: usize,
    pub elapsed: Duration,
}

/// Sources enabled by the configuration, HTML first / 按配置创建来源
pub fn configured_sources(config: &IndexConfig) -> Vec<Arc<dyn DocumentSource>> {
    let mut sources: Vec<Arc<dyn DocumentSource>> = Vec::new();
    if config.html {
        sources.push(Arc::new(HtmlSource::new(config.root.clone())));
    }
    if config.site {
        sources.push(Arc::new(SiteSource::new(config.root.clone(), config.base_url.clone())));
    }
    sources
}

/// Index every configured source, then advance the watermark / 执行索引
pub async fn run(index: &DbIndex, config: &IndexConfig) -> Result<Vec<IndexReport>, IndexerError> {
    let sources = configured_sources(config);
    if sources.is_empty() {
        return Ok(Vec::new());
    }

    let started = Utc::now();
    let since = index.last_indexed().await?;
    match since {
        Some(since) => tracing::info!("Indexing documents modified since {}", since),
        None => tracing::info!("Building index from scratch"),
    }

    let mut reports = Vec::with_capacity(sources.len());
    for source in sources {
        reports.push(index_source(index, source, since, config.batch_size).await?);
    }

    index.set_last_indexed(started).await?;
    Ok(reports)
}

/// Collect one source and insert its documents / 索引单个来源
pub async fn index_source(
    index: &DbIndex,
    source: Arc<dyn DocumentSource>,
    since: Option<DateTime<Utc>>,
    batch_size: usize,
) -> Result<IndexReport, IndexerError> {
    let name = source.name();
    let timer = Instant::now();
    tracing::info!("Indexing {} documents", name);

    // filesystem walk and parsing are blocking work
    let docs = tokio::task::spawn_blocking(move || source.collect(since))
        .await?
        .map_err(|source| IndexerError::Source {
            source_name: name,
            source,
        })?;

    for batch in docs.chunks(batch_size.max(1)) {
        index.insert_batch(batch).await?;
        tracing::debug!("Wrote batch of {} {} documents", batch.len(), name);
    }

    let elapsed = timer.elapsed();
    tracing::info!("Indexed {} {} documents in {:?}", docs.len(), name, elapsed);

    Ok(IndexReport {
        source: name,
        documents: docs.len(),
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, DbIndex) {
        let dir = tempfile::tempdir().unwrap();
        let index = DbIndex::open(&dir.path().join("search.db")).await.unwrap();
        index.init().await.unwrap();
        (dir, index)
    }

    fn html_config(root: PathBuf) -> IndexConfig {
        IndexConfig {
            root,
            html: true,
            batch_size: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_configured_sources_order() {
        let config = IndexConfig {
            html: true,
            site: true,
            ..Default::default()
        };
        let names: Vec<_> = configured_sources(&config).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["html", "site"]);
        assert!(configured_sources(&IndexConfig::default()).is_empty());
    }

    #[tokio::test]
    async fn test_run_indexes_and_sets_watermark() {
        let (dir, index) = setup().await;
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("a.html"), "<title>Alpha</title><p>rust search</p>").unwrap();
        std::fs::write(docs.join("b.html"), "<title>Beta</title><p>other words</p>").unwrap();

        let before = Utc::now();
        let reports = run(&index, &html_config(docs)).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].source, "html");
        assert_eq!(reports[0].documents, 2);

        let hits = index.search("\"rust\"", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Alpha");

        let watermark = index.last_indexed().await.unwrap().unwrap();
        assert!(watermark.timestamp() >= before.timestamp());
    }

    #[tokio::test]
    async fn test_run_skips_unmodified_documents() {
        let (dir, index) = setup().await;
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("a.html"), "<title>Alpha</title>").unwrap();

        index
            .set_last_indexed(Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        let reports = run(&index, &html_config(docs)).await.unwrap();
        assert_eq!(reports[0].documents, 0);
        assert_eq!(index.stats().await.unwrap().document_count, 0);
    }

    #[tokio::test]
    async fn test_source_failure_keeps_watermark() {
        let (dir, index) = setup().await;
        let config = IndexConfig {
            root: dir.path().join("no-site"),
            site: true,
            ..Default::default()
        };

        let err = run(&index, &config).await.unwrap_err();
        assert!(matches!(err, IndexerError::Source { source_name: "site", .. }));
        assert_eq!(index.last_indexed().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_nothing_configured() {
        let (_dir, index) = setup().await;
        assert!(run(&index, &IndexConfig::default()).await.unwrap().is_empty());
        assert_eq!(index.last_indexed().await.unwrap(), None);
    }
}
