//! URL analysis handler

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::logic::verdict::Verdict;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: Option<String>,
}

/// Run one URL through the full classification pipeline
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> AppResult<Json<Verdict>> {
    let url = req
        .url
        .ok_or_else(|| AppError::ValidationError("URL not provided".to_string()))?;

    let verdict = state.pipeline.classify(&url).await?;
    Ok(Json(verdict))
}
