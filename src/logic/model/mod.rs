//! Model Module - Classifier Inference

pub mod onnx;
pub mod scorer;

pub use onnx::OnnxScorer;
pub use scorer::{ClassProbabilities, Scorer, ScoringError};
