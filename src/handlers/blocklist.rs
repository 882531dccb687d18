//! Blocklist admin handlers

use axum::{extract::State, Json};

use crate::logic::blocklist::{BlocklistEntry, BlocklistStats, IngestReport};
use crate::{AppResult, AppState};

/// Re-sync every configured feed into the store
pub async fn update(State(state): State<AppState>) -> Json<IngestReport> {
    let report = BlocklistEntry::ingest_all(
        &state.pool,
        &state.feed_client,
        &state.config.blocklist_feeds,
    )
    .await;

    Json(report)
}

/// Store counters for dashboards and smoke checks
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<BlocklistStats>> {
    let stats = BlocklistEntry::stats(&state.pool).await?;
    Ok(Json(stats))
}
