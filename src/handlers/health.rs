//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::logic::blocklist::BlocklistEntry;
use crate::{AppResult, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
    blocklist_entries: i64,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let stats = BlocklistEntry::stats(&state.pool).await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.config.model_path.clone(),
        blocklist_entries: stats.total_entries,
        timestamp: chrono::Utc::now().timestamp(),
    }))
}
