//! Feature Vector - Core data structure for model input
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use serde::{Deserialize, Serialize};
use super::layout::{
    FEATURE_COUNT, FEATURE_VERSION, FEATURE_LAYOUT,
    layout_hash, validate_layout, LayoutMismatchError,
};

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned Feature Vector with layout metadata
///
/// This struct MUST be used for all feature data to ensure compatibility.
/// Never hand a raw `Vec<f32>` to the scorer!
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create a new zeroed feature vector with current version
    pub fn new() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: [0.0; FEATURE_COUNT],
        }
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).and_then(|i| self.values.get(i).copied())
    }

    /// Set feature by name
    pub fn set_by_name(&mut self, name: &str, value: f32) -> bool {
        if let Some(index) = super::layout::feature_index(name) {
            self.values[index] = value;
            true
        } else {
            false
        }
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// Check if this vector is compatible with current layout
    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok()
    }

    /// Names of features with a nonzero value, in layout order
    pub fn nonzero_names(&self) -> Vec<String> {
        FEATURE_LAYOUT
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| **v > 0.0)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Names of features still at their zero default, in layout order
    pub fn zero_names(&self) -> Vec<String> {
        FEATURE_LAYOUT
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| **v == 0.0)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::HashMap<_, _>>(),
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// Trait for feature extractors
pub trait FeatureExtractor {
    /// Extract features and update the vector
    fn extract(&self, vector: &mut FeatureVector);
}

// ============================================================================
// TESTS
// ============================================================================
