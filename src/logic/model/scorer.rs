//! Scorer Boundary
//!
//! The trained classifier is opaque to this service: it consumes the
//! versioned 32-feature vector and returns two class probabilities.
//! Everything behind this trait can be swapped without touching the
//! pipeline.

use serde::Serialize;

use crate::logic::features::FeatureVector;

/// Two-class probability pair, in training order (class 0 = legitimate,
/// class 1 = phishing)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassProbabilities {
    pub legitimate: f32,
    pub phishing: f32,
}

/// Scoring error. Always a deployment or versioning bug, never a
/// transient condition.
#[derive(Debug)]
pub struct ScoringError(pub String);

impl std::fmt::Display for ScoringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScoringError: {}", self.0)
    }
}

impl std::error::Error for ScoringError {}

/// Trait for scorer implementations (ONNX today, anything tomorrow)
pub trait Scorer: Send + Sync {
    fn score(&self, vector: &FeatureVector) -> Result<ClassProbabilities, ScoringError>;
}
