//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The order below is the persisted contract with the externally trained
//! phishing model: the artifact consumes a 32-dimensional vector in exactly
//! this order. Reordering, adding, or removing a name invalidates the model
//! without a version bump.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Features fall into three groups:
//! - URL-structural: computed from the URL string alone, always available
//! - Content-based: computed from a fetched page, zero when the fetch fails
//! - Training-only: present in the model schema but not derived by this
//!   service; they keep their zero default (the model was trained with
//!   zero-imputation for absent signals)

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    "PctExtHyperlinks",                   // 0:  training-only
    "PctExtResourceUrls",                 // 1:  training-only
    "PctNullSelfRedirectHyperlinks",      // 2:  training-only
    "PctExtNullSelfRedirectHyperlinksRT", // 3:  training-only
    "NumNumericChars",                    // 4:  url: digit count in full URL
    "FrequentDomainNameMismatch",         // 5:  training-only
    "ExtMetaScriptLinkRT",                // 6:  training-only
    "NumDash",                            // 7:  url: '-' count in full URL
    "SubmitInfoToEmail",                  // 8:  content: form action contains mailto:
    "NumDots",                            // 9:  url: '.' count in full URL
    "PathLength",                         // 10: url: length of path component
    "QueryLength",                        // 11: url: length of query component
    "PathLevel",                          // 12: url: '/' count in path
    "InsecureForms",                      // 13: content: form action over http://
    "UrlLength",                          // 14: url: total URL length
    "NumSensitiveWords",                  // 15: content: distinct sensitive words in page
    "NumQueryComponents",                 // 16: training-only
    "PctExtResourceUrlsRT",               // 17: training-only
    "IframeOrFrame",                      // 18: content: iframe/frame element present
    "HostnameLength",                     // 19: url: hostname length
    "NumAmpersand",                       // 20: url: '&' count in full URL
    "AbnormalExtFormActionR",             // 21: training-only
    "UrlLengthRT",                        // 22: training-only
    "NumDashInHostname",                  // 23: training-only
    "IpAddress",                          // 24: url: hostname is a dotted-quad literal
    "AbnormalFormAction",                 // 25: content: form action host differs from page
    "EmbeddedBrandName",                  // 26: url: known brand token in URL
    "NumUnderscore",                      // 27: url: '_' count in full URL
    "MissingTitle",                       // 28: training-only
    "DomainInPaths",                      // 29: training-only
    "SubdomainLevel",                     // 30: training-only
    "ExtFormAction",                      // 31: training-only
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 32;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches at runtime
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    // Include version in hash
    hasher.update(&[FEATURE_VERSION]);

    // Hash all feature names in order
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (cached for performance)
pub fn layout_hash() -> u32 {
    // Computed at compile time effectively since inputs are const
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version,
            self.expected_hash,
            self.actual_version,
            self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================
