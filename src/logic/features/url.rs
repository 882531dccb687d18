//! URL-Structural Feature Extraction
//!
//! Features computable from the URL string alone. These are always
//! available, even when the target site is dead.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::vector::{FeatureExtractor, FeatureVector};

/// Brand tokens frequently impersonated in phishing URLs
pub const BRAND_NAMES: &[&str] = &[
    "paypal", "sbi", "hdfc", "amazon", "apple", "microsoft", "google",
];

/// Strict dotted-quad literal, nothing else counts as an IP hostname
static IP_LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").unwrap());

/// Prefix a scheme when the input has none, so host parsing succeeds
/// for bare inputs like "example.com/login".
pub fn normalize_url(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Lowercased hostname derived from the input, scheme-defaulted.
/// Returns `None` when no hostname can be derived at all.
pub fn canonical_hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(&normalize_url(url)).ok()?;
    let host = parsed.host_str()?.trim().to_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// URL-structural features for one input URL
#[derive(Debug, Clone, Default)]
pub struct UrlFeatures {
    pub url_length: usize,
    pub hostname_length: usize,
    pub path_length: usize,
    pub query_length: usize,
    pub path_level: usize,
    pub num_numeric_chars: usize,
    pub num_dash: usize,
    pub num_dots: usize,
    pub num_underscore: usize,
    pub num_ampersand: usize,
    pub is_ip_literal: bool,
    pub has_brand_token: bool,
}

impl UrlFeatures {
    /// Analyze the raw input string together with its parsed form.
    ///
    /// Character-class counts run over the raw string as submitted;
    /// component lengths come from the parsed URL.
    pub fn analyze(raw: &str, parsed: &Url) -> Self {
        let hostname = parsed.host_str().unwrap_or("");
        // Url::path() reports "/" even when the input carried no path
        // component at all; keep the bare-host case at zero.
        let path = if parsed.path() == "/" && !has_explicit_path(&normalize_url(raw)) {
            ""
        } else {
            parsed.path()
        };
        let query = parsed.query().unwrap_or("");
        let lowered = raw.to_lowercase();

        Self {
            url_length: raw.len(),
            hostname_length: hostname.len(),
            path_length: path.len(),
            query_length: query.len(),
            path_level: path.matches('/').count(),
            num_numeric_chars: raw.chars().filter(|c| c.is_ascii_digit()).count(),
            num_dash: raw.matches('-').count(),
            num_dots: raw.matches('.').count(),
            num_underscore: raw.matches('_').count(),
            num_ampersand: raw.matches('&').count(),
            is_ip_literal: IP_LITERAL_RE.is_match(hostname),
            has_brand_token: BRAND_NAMES.iter().any(|b| lowered.contains(b)),
        }
    }
}

impl FeatureExtractor for UrlFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set_by_name("UrlLength", self.url_length as f32);
        vector.set_by_name("HostnameLength", self.hostname_length as f32);
        vector.set_by_name("PathLength", self.path_length as f32);
        vector.set_by_name("QueryLength", self.query_length as f32);
        vector.set_by_name("PathLevel", self.path_level as f32);
        vector.set_by_name("NumNumericChars", self.num_numeric_chars as f32);
        vector.set_by_name("NumDash", self.num_dash as f32);
        vector.set_by_name("NumDots", self.num_dots as f32);
        vector.set_by_name("NumUnderscore", self.num_underscore as f32);
        vector.set_by_name("NumAmpersand", self.num_ampersand as f32);
        vector.set_by_name("IpAddress", if self.is_ip_literal { 1.0 } else { 0.0 });
        vector.set_by_name("EmbeddedBrandName", if self.has_brand_token { 1.0 } else { 0.0 });
    }
}

/// Whether the pre-query part of the URL string contains a path slash
fn has_explicit_path(url_str: &str) -> bool {
    url_str
        .split_once("://")
        .map(|(_, rest)| rest.split(['?', '#']).next().unwrap_or("").contains('/'))
        .unwrap_or(false)
}
