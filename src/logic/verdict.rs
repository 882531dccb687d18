//! Verdict Assembly
//!
//! Pure construction of the classification verdict. Exactly one of the
//! four constructors fires per request: allowlist hit, blocklist hit,
//! unresponsive target, or model scoring.

use serde::Serialize;

use crate::logic::features::FeatureVector;
use crate::logic::model::ClassProbabilities;

/// Model decision threshold on the phishing probability
pub const PHISHING_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub url: String,
    pub is_phishing: bool,
    pub is_on_blocklist: bool,
    pub matched_allowlist: bool,
    pub model_analysis_skipped: bool,
    pub probability_phishing: String,
    pub probability_legitimate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub risky_features: Vec<String>,
    pub safe_features: Vec<String>,
}

impl Verdict {
    /// Hostname sits on the static allowlist
    pub fn allowlisted(url: &str) -> Self {
        Self {
            url: url.to_string(),
            is_phishing: false,
            is_on_blocklist: false,
            matched_allowlist: true,
            model_analysis_skipped: true,
            probability_phishing: percent(0.0),
            probability_legitimate: percent(1.0),
            reason: Some("On Allowlist".to_string()),
            risky_features: Vec::new(),
            safe_features: vec!["This domain is on the allowlist.".to_string()],
        }
    }

    /// URL or hostname found in the blocklist store
    pub fn blocklisted(url: &str) -> Self {
        Self {
            url: url.to_string(),
            is_phishing: true,
            is_on_blocklist: true,
            matched_allowlist: false,
            model_analysis_skipped: true,
            probability_phishing: percent(1.0),
            probability_legitimate: percent(0.0),
            reason: Some("Found on blocklist".to_string()),
            risky_features: vec!["Found on blocklist".to_string()],
            safe_features: Vec::new(),
        }
    }

    /// Content fetch failed; unreachable sites are presumed risky
    pub fn unresponsive(url: &str) -> Self {
        Self {
            url: url.to_string(),
            is_phishing: true,
            is_on_blocklist: false,
            matched_allowlist: false,
            model_analysis_skipped: true,
            probability_phishing: percent(1.0),
            probability_legitimate: percent(0.0),
            reason: Some("Site unresponsive".to_string()),
            risky_features: vec!["Site is unresponsive or blocked connections.".to_string()],
            safe_features: Vec::new(),
        }
    }

    /// Scored by the model.
    ///
    /// The risky/safe split labels nonzero features as risky and zeroed
    /// ones as safe. That is a coarse polarity heuristic, not calibrated
    /// per-feature attribution.
    pub fn from_model(url: &str, vector: &FeatureVector, probs: ClassProbabilities) -> Self {
        Self {
            url: url.to_string(),
            is_phishing: probs.phishing > PHISHING_THRESHOLD,
            is_on_blocklist: false,
            matched_allowlist: false,
            model_analysis_skipped: false,
            probability_phishing: percent(probs.phishing),
            probability_legitimate: percent(probs.legitimate),
            reason: None,
            risky_features: vector.nonzero_names(),
            safe_features: vector.zero_names(),
        }
    }
}

/// Percentage string with two decimals, e.g. "93.51%"
fn percent(p: f32) -> String {
    format!("{:.2}%", p * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(0.0), "0.00%");
        assert_eq!(percent(1.0), "100.00%");
        assert_eq!(percent(0.935), "93.50%");
        assert_eq!(percent(0.5), "50.00%");
    }

    #[test]
    fn test_allowlisted_verdict() {
        let v = Verdict::allowlisted("https://www.google.com/search?q=x");
        assert!(!v.is_phishing);
        assert!(v.matched_allowlist);
        assert!(v.model_analysis_skipped);
        assert!(!v.is_on_blocklist);
        assert_eq!(v.probability_phishing, "0.00%");
        assert_eq!(v.probability_legitimate, "100.00%");
        assert_eq!(v.reason.as_deref(), Some("On Allowlist"));
    }

    #[test]
    fn test_blocklisted_verdict() {
        let v = Verdict::blocklisted("http://000agreementmail.weebly.com");
        assert!(v.is_phishing);
        assert!(v.is_on_blocklist);
        assert!(v.model_analysis_skipped);
        assert_eq!(v.probability_phishing, "100.00%");
        assert_eq!(v.reason.as_deref(), Some("Found on blocklist"));
    }

    #[test]
    fn test_unresponsive_verdict() {
        let v = Verdict::unresponsive("http://dead.example");
        assert!(v.is_phishing);
        assert!(!v.is_on_blocklist);
        assert!(v.model_analysis_skipped);
        assert_eq!(v.reason.as_deref(), Some("Site unresponsive"));
    }

    #[test]
    fn test_model_verdict_threshold_is_strict() {
        let vector = FeatureVector::new();

        let at_threshold = Verdict::from_model(
            "http://x.example",
            &vector,
            ClassProbabilities { legitimate: 0.5, phishing: 0.5 },
        );
        assert!(!at_threshold.is_phishing);

        let above = Verdict::from_model(
            "http://x.example",
            &vector,
            ClassProbabilities { legitimate: 0.2, phishing: 0.8 },
        );
        assert!(above.is_phishing);
        assert!(!above.model_analysis_skipped);
        assert_eq!(above.probability_phishing, "80.00%");
        assert_eq!(above.probability_legitimate, "20.00%");
    }

    #[test]
    fn test_model_verdict_feature_split() {
        let mut vector = FeatureVector::new();
        vector.set_by_name("IpAddress", 1.0);
        vector.set_by_name("NumSensitiveWords", 2.0);

        let v = Verdict::from_model(
            "http://203.0.113.5/login/verify",
            &vector,
            ClassProbabilities { legitimate: 0.1, phishing: 0.9 },
        );
        assert_eq!(
            v.risky_features,
            vec!["NumSensitiveWords".to_string(), "IpAddress".to_string()]
        );
        assert!(v.safe_features.contains(&"IframeOrFrame".to_string()));
        assert_eq!(v.risky_features.len() + v.safe_features.len(), 32);
    }
}
