//! SQLite FTS5 search index / SQLite FTS5 全文索引
//!
//! Storage layout / 存储方案：
//! - `search`: FTS5 virtual table (path UNINDEXED, title, text, summary UNINDEXED)
//! - `search_meta`: key/value table, holds the `last_indexed` watermark
//!
//! Features / 特性：
//! - WAL mode + busy timeout (concurrent readers while indexing) / WAL 模式
//! - Batched inserts in one transaction, retried when the database is locked / 批量插入 + 重试
//! - Re-indexing a path replaces its previous row / 同一路径重复索引时替换旧记录

use chrono::{DateTime, TimeZone, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::schema::{Document, IndexStats, SearchHit};

const MAX_RETRIES: u32 = 3;

/// Storage layer error / 存储层错误
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// FTS5 rejected the MATCH expression (unbalanced parentheses, dangling operator)
    #[error("{0}")]
    Syntax(String),
    #[error("batch insert failed after {attempts} retries: {source}")]
    Busy {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
}

/// Full-text search index / 全文搜索索引
pub struct DbIndex {
    db: Pool<Sqlite>,
    path: PathBuf,
}

impl DbIndex {
    /// Open (or create) the index database file / 打开或创建索引数据库
    pub async fn open(db_path: &Path) -> Result<Self, IndexError> {
        // 确保目录存在
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());

        let db = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&db_url)
            .await?;

        // 启用WAL模式，提高并发性能
        sqlx::query("PRAGMA journal_mode=WAL").execute(&db).await?;

        // 设置busy_timeout，避免锁超时
        sqlx::query("PRAGMA busy_timeout=5000").execute(&db).await?;

        sqlx::query("PRAGMA synchronous=NORMAL").execute(&db).await?;

        tracing::info!("Search database opened: {:?} (WAL mode)", db_path);

        Ok(Self {
            db,
            path: db_path.to_path_buf(),
        })
    }

    /// Close the connection pool / 关闭数据库连接池
    pub async fn close(&self) {
        self.db.close().await;
    }

    /// Create tables if missing, keeps existing data / 初始化表结构（不删除已有数据）
    pub async fn init(&self) -> Result<(), IndexError> {
        sqlx::query(
            "CREATE VIRTUAL TABLE IF NOT EXISTS search USING fts5(path UNINDEXED, title, text, summary UNINDEXED)",
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS search_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Drop and recreate all tables / 重置表结构（清空重建时调用）
    pub async fn reset_tables(&self) -> Result<(), IndexError> {
        sqlx::query("DROP TABLE IF EXISTS search").execute(&self.db).await?;
        sqlx::query("DROP TABLE IF EXISTS search_meta").execute(&self.db).await?;
        self.init().await
    }

    /// Record the indexing watermark / 记录索引水位时间
    pub async fn set_last_indexed(&self, at: DateTime<Utc>) -> Result<(), IndexError> {
        sqlx::query("INSERT OR REPLACE INTO search_meta (key, value) VALUES ('last_indexed', ?)")
            .bind(at.timestamp().to_string())
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Watermark of the last successful indexing run / 上次索引时间
    pub async fn last_indexed(&self) -> Result<Option<DateTime<Utc>>, IndexError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM search_meta WHERE key = 'last_indexed'")
                .fetch_optional(&self.db)
                .await?;

        Ok(row
            .and_then(|(v,)| v.parse::<i64>().ok())
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single()))
    }

    /// Insert documents, retrying while the database is locked / 批量插入（带重试）
    pub async fn insert_batch(&self, docs: &[Document]) -> Result<(), IndexError> {
        if docs.is_empty() {
            return Ok(());
        }

        let mut attempt = 0;
        loop {
            match self.do_insert_batch(docs).await {
                Ok(()) => return Ok(()),
                Err(e) if is_busy(&e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(IndexError::Busy { attempts: attempt, source: e });
                    }
                    let delay = 100 * attempt as u64;
                    tracing::warn!(
                        "Database locked, retrying in {}ms (attempt {}/{})",
                        delay,
                        attempt,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn do_insert_batch(&self, docs: &[Document]) -> Result<(), sqlx::Error> {
        let mut tx = self.db.begin().await?;

        for doc in docs {
            // FTS5 has no unique constraint, replace by hand
            sqlx::query("DELETE FROM search WHERE path = ?")
                .bind(&doc.path)
                .execute(&mut *tx)
                .await?;

            sqlx::query("INSERT INTO search (path, title, text, summary) VALUES (?, ?, ?, ?)")
                .bind(&doc.path)
                .bind(&doc.title)
                .bind(&doc.text)
                .bind(&doc.summary)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Run a translated MATCH expression, best matches first / 执行全文检索
    pub async fn search(&self, match_expr: &str, limit: usize) -> Result<Vec<SearchHit>, IndexError> {
        let rows = sqlx::query(
            "SELECT path, title, summary, text FROM search WHERE search MATCH ? ORDER BY rank LIMIT ?",
        )
        .bind(match_expr)
        .bind(limit as i64)
        .fetch_all(&self.db)
        .await
        .map_err(classify_query_error)?;

        let hits = rows
            .iter()
            .map(|row| SearchHit {
                path: row.get("path"),
                title: row.get("title"),
                summary: row.get("summary"),
                text: row.get("text"),
            })
            .collect();

        Ok(hits)
    }

    /// Index statistics / 获取统计信息
    pub async fn stats(&self) -> Result<IndexStats, IndexError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM search")
            .fetch_one(&self.db)
            .await?;

        Ok(IndexStats {
            document_count: count as u64,
            db_size: self.db_size(),
            last_indexed: self.last_indexed().await?,
        })
    }

    /// Database file size including WAL and SHM / 数据库文件大小
    pub fn db_size(&self) -> u64 {
        let db_path = &self.path;
        let db_shm = with_suffix(db_path, "-shm");
        let db_wal = with_suffix(db_path, "-wal");

        [db_path.as_path(), db_shm.as_path(), db_wal.as_path()]
            .iter()
            .map(|p| std::fs::metadata(p).map(|m| m.len()).unwrap_or(0))
            .sum()
    }
}

/// `search.db` -> `search.db-wal`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Separate user-caused MATCH errors from storage failures
fn classify_query_error(e: sqlx::Error) -> IndexError {
    if let sqlx::Error::Database(db_err) = &e {
        let msg = db_err.message();
        if msg.starts_with("fts5:") || msg.starts_with("unterminated string") || msg.starts_with("no such column") {
            return IndexError::Syntax(msg.to_string());
        }
    }
    IndexError::Database(e)
}

fn is_busy(e: &sqlx::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked") || msg.contains("SQLITE_BUSY")
}
