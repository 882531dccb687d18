//! ONNX Runtime Scorer
//!
//! Loads the exported phishing model and runs single-row inference.
//! The session is loaded once at startup; a missing or unusable artifact
//! is a deployment error and stops the service.

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use crate::logic::features::{FeatureVector, FEATURE_COUNT};

use super::scorer::{ClassProbabilities, Scorer, ScoringError};

/// ONNX-backed scorer. `Session::run` needs exclusive access, so the
/// session sits behind a mutex.
pub struct OnnxScorer {
    session: Mutex<Session>,
}

impl OnnxScorer {
    /// Load the model artifact from disk
    pub fn load(model_path: &str) -> Result<Self, ScoringError> {
        tracing::info!(path = %model_path, "Loading ONNX model");

        if !std::path::Path::new(model_path).exists() {
            return Err(ScoringError(format!("Model not found: {}", model_path)));
        }

        let session = Session::builder()
            .map_err(|e| ScoringError(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ScoringError(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ScoringError(format!("Failed to load model: {}", e)))?;

        tracing::info!("ONNX model loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl Scorer for OnnxScorer {
    fn score(&self, vector: &FeatureVector) -> Result<ClassProbabilities, ScoringError> {
        // A stale vector must never reach the model
        vector
            .validate()
            .map_err(|e| ScoringError(e.to_string()))?;

        let mut session = self.session.lock();

        let output_names: Vec<String> =
            session.outputs.iter().map(|o| o.name.clone()).collect();
        if output_names.is_empty() {
            return Err(ScoringError("No output defined".to_string()));
        }

        let input_array = Array2::<f32>::from_shape_vec(
            (1, FEATURE_COUNT),
            vector.values.to_vec(),
        )
        .map_err(|e| ScoringError(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ScoringError(format!("Tensor error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ScoringError(format!("Inference failed: {}", e)))?;

        // Exported classifiers usually emit a label output first and the
        // probability tensor after it; take the first output that yields
        // at least two floats.
        for name in &output_names {
            let Some(output) = outputs.get(name) else { continue };
            let Ok(output_tensor) = output.try_extract_tensor::<f32>() else { continue };

            let data = output_tensor.1;
            if data.len() >= 2 {
                return Ok(ClassProbabilities {
                    legitimate: data[0],
                    phishing: data[1],
                });
            }
        }

        Err(ScoringError(
            "Model produced no two-class probability output".to_string(),
        ))
    }
}
