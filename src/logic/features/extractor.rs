//! Two-Tier Feature Extraction
//!
//! Combines the URL-structural tier (always computed) with the
//! content-based tier (needs a live page). Network failure never
//! propagates: the result carries an explicit tier so the pipeline can
//! branch on degraded extractions instead of catching errors.

use std::time::Duration;

use url::Url;

use super::content::ContentFeatures;
use super::url::{normalize_url, UrlFeatures};
use super::vector::{FeatureExtractor, FeatureVector};

/// Default bound on the page fetch
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

/// How complete an extraction is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionTier {
    /// URL and content tiers both populated
    Full,
    /// Content fetch failed; content-tier features keep their zero default
    Degraded,
}

/// Result of one extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    pub tier: ExtractionTier,
    pub vector: FeatureVector,
}

impl Extraction {
    pub fn is_degraded(&self) -> bool {
        self.tier == ExtractionTier::Degraded
    }
}

/// Feature extractor with a bounded-timeout page fetcher
pub struct Extractor {
    client: reqwest::Client,
}

impl Extractor {
    pub fn new(fetch_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .user_agent("Mozilla/5.0")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Extract features for one URL.
    ///
    /// Returns `None` only when the input cannot be parsed as a URL at
    /// all. Any network condition degrades the tier instead of failing.
    pub async fn extract(&self, raw_url: &str) -> Option<Extraction> {
        let normalized = normalize_url(raw_url);
        let parsed = Url::parse(&normalized).ok()?;
        let hostname = parsed.host_str().unwrap_or("").to_lowercase();

        let mut vector = FeatureVector::new();
        UrlFeatures::analyze(raw_url, &parsed).extract(&mut vector);

        let tier = match self.fetch_page(parsed.as_str()).await {
            Ok(html) => {
                ContentFeatures::scan(&html, &hostname).extract(&mut vector);
                ExtractionTier::Full
            }
            Err(e) => {
                tracing::warn!(url = %raw_url, error = %e, "Content fetch failed, URL-tier features only");
                ExtractionTier::Degraded
            }
        };

        Some(Extraction { tier, vector })
    }

    /// Body of the page, whatever the status code. Markup behind an
    /// error status is scanned like any other.
    async fn fetch_page(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        response.text().await
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;

    async fn serve_page(html: &'static str) -> String {
        let app = Router::new().route("/*path", get(move || async move { html }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_full_extraction_against_live_page() {
        let base = serve_page(
            "<html><body>Please login to verify your account\
             <form action=\"http://collector.evil.example/grab\"></form>\
             </body></html>",
        )
        .await;
        let url = format!("{base}/login/verify");

        let extractor = Extractor::new(Duration::from_secs(2));
        let extraction = extractor.extract(&url).await.unwrap();

        assert_eq!(extraction.tier, ExtractionTier::Full);
        let v = &extraction.vector;
        // Local listener host is a dotted-quad literal
        assert_eq!(v.get_by_name("IpAddress"), Some(1.0));
        assert_eq!(v.get_by_name("PathLevel"), Some(2.0));
        assert!(v.get_by_name("NumSensitiveWords").unwrap() >= 1.0);
        assert_eq!(v.get_by_name("InsecureForms"), Some(1.0));
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades() {
        // Nothing listens on port 1; connection is refused immediately
        let extractor = Extractor::new(Duration::from_secs(2));
        let extraction = extractor.extract("http://127.0.0.1:1/login-page").await.unwrap();

        assert!(extraction.is_degraded());
        let v = &extraction.vector;
        // URL tier still fully computed
        assert_eq!(v.get_by_name("IpAddress"), Some(1.0));
        assert!(v.get_by_name("UrlLength").unwrap() > 0.0);
        assert_eq!(v.get_by_name("NumDash"), Some(1.0));
        // Content tier stays at zero defaults
        assert_eq!(v.get_by_name("NumSensitiveWords"), Some(0.0));
        assert_eq!(v.get_by_name("IframeOrFrame"), Some(0.0));
    }

    #[tokio::test]
    async fn test_fetch_timeout_degrades() {
        // Listener that accepts but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else { break };
                // Hold the socket open without responding
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    drop(socket);
                });
            }
        });

        let extractor = Extractor::new(Duration::from_millis(200));
        let extraction = extractor.extract(&format!("http://{addr}/x")).await.unwrap();
        assert!(extraction.is_degraded());
    }

    #[tokio::test]
    async fn test_unparsable_url_yields_no_vector() {
        let extractor = Extractor::new(Duration::from_millis(200));
        assert!(extractor.extract("ht!tp://///").await.is_none());
    }
}
