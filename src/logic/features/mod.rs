//! Features Module - Feature Extraction Engine
//!
//! URL-structural and content-based feature extraction behind a single
//! versioned vector layout shared with the trained model.

pub mod content;
pub mod extractor;
pub mod layout;
pub mod url;
pub mod vector;

// Re-export common types
pub use extractor::{Extraction, ExtractionTier, Extractor, DEFAULT_FETCH_TIMEOUT_SECS};
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, LayoutInfo};
pub use vector::{FeatureExtractor, FeatureVector};
