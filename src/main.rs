//! PhishGuard Backend Server
//!
//! URL classification service backing the PhishGuard browser extension.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   PHISHGUARD BACKEND                    │
//! ├─────────────────────────────────────────────────────────┤
//! │  ┌──────────┐  ┌─────────────┐  ┌────────────────────┐  │
//! │  │  API     │  │  Decision   │  │  Blocklist Ingest  │  │
//! │  │  Gateway │  │  Pipeline   │  │  (Feed Streaming)  │  │
//! │  │  (Axum)  │  │  (ONNX)     │  │                    │  │
//! │  └────┬─────┘  └──────┬──────┘  └─────────┬──────────┘  │
//! │       └───────────────┼───────────────────┘             │
//! │                       ▼                                 │
//! │                 ┌──────────┐                            │
//! │                 │  SQLite  │                            │
//! │                 └──────────┘                            │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod error;
mod handlers;
mod logic;
mod middleware;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use logic::blocklist::{BlocklistEntry, FeedClient};
use logic::features::{Extractor, LayoutInfo};
use logic::model::OnnxScorer;
use logic::pipeline::Pipeline;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "phishguard_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("PhishGuard Server starting...");
    tracing::info!("Database: {}", config.database_path);

    let layout = LayoutInfo::current();
    tracing::info!(
        "Feature layout v{} ({} features, hash {:08x})",
        layout.version,
        layout.feature_count,
        layout.hash
    );

    // Initialize database pool
    let pool = db::create_pool(&config.database_path).await
        .expect("Failed to create database pool");

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await
        .expect("Failed to run migrations");

    // Load ONNX model (fatal if missing)
    let scorer = OnnxScorer::load(&config.model_path)
        .expect("Failed to load ONNX model");

    // Build application state
    let extractor = Extractor::new(Duration::from_secs(config.fetch_timeout_secs));
    let pipeline = Pipeline::new(pool.clone(), extractor, Arc::new(scorer));
    let state = AppState {
        pool,
        config: config.clone(),
        pipeline: Arc::new(pipeline),
        feed_client: Arc::new(FeedClient::new()),
    };

    // Background ingestion pass so a fresh install has a populated blocklist
    if config.ingest_on_startup {
        let pool = state.pool.clone();
        let feed_client = state.feed_client.clone();
        let feeds = config.blocklist_feeds.clone();
        tokio::spawn(async move {
            let report = BlocklistEntry::ingest_all(&pool, &feed_client, &feeds).await;
            tracing::info!(
                feeds_synced = report.feeds_synced,
                inserted = report.inserted,
                "Startup blocklist ingestion finished"
            );
        });
    }

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub config: config::Config,
    pub pipeline: Arc<Pipeline>,
    pub feed_client: Arc<FeedClient>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/analyze", post(handlers::analyze::analyze));

    // Admin routes (bearer token auth)
    let admin_routes = Router::new()
        .route("/api/v1/admin/blocklist/update", post(handlers::blocklist::update))
        .route("/api/v1/admin/blocklist/stats", get(handlers::blocklist::stats))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin_auth
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
