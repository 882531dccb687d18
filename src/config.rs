//! Configuration module

use std::env;

use crate::logic::features::DEFAULT_FETCH_TIMEOUT_SECS;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file path
    pub database_path: String,

    /// Server port
    pub port: u16,

    /// ONNX model file path
    pub model_path: String,

    /// Bearer token for the admin endpoints
    pub admin_token: String,

    /// Blocklist feed URLs, comma-separated in the environment
    pub blocklist_feeds: Vec<String>,

    /// Page fetch timeout for feature extraction, in seconds
    pub fetch_timeout_secs: u64,

    /// Run a blocklist ingestion pass in the background at startup
    pub ingest_on_startup: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_path: env::var("PHISH_DB_PATH")
                .unwrap_or_else(|_| "phish_urls_simple.db".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "phishing_model.onnx".to_string()),

            admin_token: env::var("ADMIN_TOKEN")
                .unwrap_or_else(|_| "dev-admin-token-change-in-production".to_string()),

            blocklist_feeds: env::var("BLOCKLIST_FEEDS")
                .map(|feeds| {
                    feeds
                        .split(',')
                        .map(|feed| feed.trim().to_string())
                        .filter(|feed| !feed.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| {
                    vec![
                        "https://raw.githubusercontent.com/Phishing-Database/Phishing.Database/master/phishing-links-ACTIVE.txt"
                            .to_string(),
                    ]
                }),

            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),

            ingest_on_startup: env::var("INGEST_ON_STARTUP")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
        }
    }
}
