//! Logic Module - Classification Engines
//!
//! - `features/` - Feature extraction (URL tier, content tier)
//! - `model/` - ML inference (ONNX scorer)
//! - `blocklist/` - Feed ingestion and exact-match lookups

// Core modules
pub mod allowlist;
pub mod pipeline;
pub mod verdict;

// Engines
pub mod blocklist;
pub mod features;
pub mod model;
