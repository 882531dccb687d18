//! Authentication middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::{AppError, AppState};

/// Middleware: Require the admin bearer token
pub async fn require_admin_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;

    // Compare token digests rather than the raw strings
    if hash_token(&token) != hash_token(&state.config.admin_token) {
        tracing::warn!("Rejected admin request with an invalid token");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req.headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::Unauthorized);
    }

    Ok(auth_header[7..].to_string())
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
