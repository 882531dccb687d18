//! Blocklist Module - Feed Ingestion and Durable Lookup

pub mod feeds;
pub mod store;

pub use feeds::{FeedClient, FeedError};
pub use store::{
    BlocklistEntry, BlocklistStats, IngestError, IngestOutcome, IngestReport, INGEST_BATCH_SIZE,
};
