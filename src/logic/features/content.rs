//! Content-Based Feature Extraction
//!
//! Features derived from the fetched page markup. All of these keep their
//! zero default when the fetch fails; the extractor reports that tier
//! separately so the pipeline can branch on it.
//!
//! Scanning is regex/substring based over the raw markup; phishing pages
//! are routinely malformed and still have to scan.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::vector::{FeatureExtractor, FeatureVector};

/// Credential-harvesting vocabulary checked against page text
pub const SENSITIVE_WORDS: &[&str] = &[
    "login", "secure", "account", "update", "verify", "password", "bank",
];

static IFRAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(iframe|frame)\b").unwrap());

static FORM_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<form\b[^>]*").unwrap());

/// Pulls the action value out of a form tag, quoted or bare
static ACTION_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\baction\s*=\s*["']?([^"'\s>]*)"#).unwrap());

/// Content-based features for one fetched page
#[derive(Debug, Clone, Default)]
pub struct ContentFeatures {
    /// Distinct sensitive words present anywhere in the markup
    pub sensitive_word_count: usize,
    pub has_iframe_or_frame: bool,
    pub submits_to_email: bool,
    pub has_insecure_form: bool,
    pub has_abnormal_form_action: bool,
}

impl ContentFeatures {
    /// Scan fetched markup. `page_hostname` is the lowercased hostname the
    /// page was fetched from, used to spot form actions pointing elsewhere.
    pub fn scan(html: &str, page_hostname: &str) -> Self {
        let lowered = html.to_lowercase();

        let sensitive_word_count = SENSITIVE_WORDS
            .iter()
            .filter(|w| lowered.contains(*w))
            .count();

        let mut features = Self {
            sensitive_word_count,
            has_iframe_or_frame: IFRAME_RE.is_match(html),
            ..Self::default()
        };

        for form_tag in FORM_TAG_RE.find_iter(html) {
            let action = match ACTION_ATTR_RE.captures(form_tag.as_str()) {
                Some(caps) => caps[1].to_string(),
                None => continue,
            };

            if action.contains("mailto:") {
                features.submits_to_email = true;
            }
            if action.starts_with("http://") {
                features.has_insecure_form = true;
            }
            if action_has_host(&action) && !action.contains(page_hostname) {
                features.has_abnormal_form_action = true;
            }
        }

        features
    }
}

impl FeatureExtractor for ContentFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set_by_name("NumSensitiveWords", self.sensitive_word_count as f32);
        vector.set_by_name("IframeOrFrame", if self.has_iframe_or_frame { 1.0 } else { 0.0 });
        vector.set_by_name("SubmitInfoToEmail", if self.submits_to_email { 1.0 } else { 0.0 });
        vector.set_by_name("InsecureForms", if self.has_insecure_form { 1.0 } else { 0.0 });
        vector.set_by_name(
            "AbnormalFormAction",
            if self.has_abnormal_form_action { 1.0 } else { 0.0 },
        );
    }
}

/// Whether a form action resolves to its own host. Relative actions do
/// not; absolute and protocol-relative ones do.
fn action_has_host(action: &str) -> bool {
    let candidate = match action.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => action.to_string(),
    };
    Url::parse(&candidate)
        .ok()
        .and_then(|u| u.host_str().map(|h| !h.is_empty()))
        .unwrap_or(false)
}
