//! Database module - SQLite connection and migrations

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};

/// Create database connection pool
pub async fn create_pool(database_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create tables if not exist
    sqlx::query(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    url TEXT PRIMARY KEY,
    source TEXT,
    last_seen TEXT
);
"#;
