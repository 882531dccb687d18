//! Blocklist Store
//!
//! Durable set of known-bad URLs and hosts, refreshed from external
//! feeds. Rows are insert-only: re-ingesting a URL is a no-op and the
//! first source/timestamp wins. Readers stay consistent while an
//! ingestion commits its batches (WAL journal, one transaction per
//! batch).

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;

use super::feeds::{FeedClient, FeedError};

/// Rows buffered per bulk insert; keeps memory bounded on six-figure feeds
pub const INGEST_BATCH_SIZE: usize = 9000;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlocklistEntry {
    pub url: String,
    pub source: String,
    pub last_seen: String,
}

/// Per-feed ingestion counts
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestOutcome {
    pub lines_processed: usize,
    pub inserted: usize,
}

/// Aggregate over all configured feeds. One feed failing does not stop
/// the others; partial success is the normal case.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub success: bool,
    pub feeds_synced: usize,
    pub lines_processed: usize,
    pub inserted: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlocklistStats {
    pub total_entries: i64,
    pub last_seen_max: Option<String>,
}

impl BlocklistEntry {
    /// Exact-match lookup. No normalization happens here; callers try
    /// the raw URL and the derived hostname as separate keys.
    pub async fn lookup(pool: &SqlitePool, key: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, BlocklistEntry>(
            "SELECT url, source, last_seen FROM entries WHERE url = ? LIMIT 1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    /// Stream one feed into the store, flushing every INGEST_BATCH_SIZE
    /// rows as a single transaction.
    pub async fn ingest(
        pool: &SqlitePool,
        client: &FeedClient,
        feed_url: &str,
    ) -> Result<IngestOutcome, IngestError> {
        let mut download = client.open(feed_url).await?;
        let source = download.source().to_string();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut outcome = IngestOutcome::default();
        let mut batch: Vec<String> = Vec::with_capacity(INGEST_BATCH_SIZE);

        while let Some(entry) = download.next_entry().await? {
            batch.push(entry);
            outcome.lines_processed += 1;

            if batch.len() >= INGEST_BATCH_SIZE {
                outcome.inserted += flush_batch(pool, &batch, &source, &now).await?;
                batch.clear();
            }
        }
        if !batch.is_empty() {
            outcome.inserted += flush_batch(pool, &batch, &source, &now).await?;
        }

        Ok(outcome)
    }

    /// Best-effort ingestion across all configured feeds
    pub async fn ingest_all(
        pool: &SqlitePool,
        client: &FeedClient,
        sources: &[String],
    ) -> IngestReport {
        let mut report = IngestReport {
            success: true,
            feeds_synced: 0,
            lines_processed: 0,
            inserted: 0,
            errors: Vec::new(),
        };

        for source in sources {
            match Self::ingest(pool, client, source).await {
                Ok(outcome) => {
                    report.feeds_synced += 1;
                    report.lines_processed += outcome.lines_processed;
                    report.inserted += outcome.inserted;
                    tracing::info!(
                        source = %source,
                        lines = outcome.lines_processed,
                        inserted = outcome.inserted,
                        "Feed ingested"
                    );
                }
                Err(e) => {
                    report.errors.push(format!("{}: {}", source, e));
                    tracing::warn!(source = %source, error = %e, "Feed ingestion failed");
                }
            }
        }

        if !report.errors.is_empty() {
            report.success = report.feeds_synced > 0;
        }

        report
    }

    pub async fn stats(pool: &SqlitePool) -> Result<BlocklistStats, sqlx::Error> {
        let row: (i64, Option<String>) =
            sqlx::query_as("SELECT COUNT(*), MAX(last_seen) FROM entries")
                .fetch_one(pool)
                .await?;

        Ok(BlocklistStats {
            total_entries: row.0,
            last_seen_max: row.1,
        })
    }
}

/// Bulk insert one batch atomically; returns how many rows were new
async fn flush_batch(
    pool: &SqlitePool,
    urls: &[String],
    source: &str,
    now: &str,
) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;

    for url in urls {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO entries (url, source, last_seen) VALUES (?, ?, ?)",
        )
        .bind(url)
        .bind(source)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected() as usize;
    }

    tx.commit().await?;
    Ok(inserted)
}
