//! Static Allowlist
//!
//! Registrable domains always treated as benign. An allowlist hit takes
//! precedence over every other signal, including the blocklist; feeds
//! occasionally pick up legitimate hosts.

/// Known-safe registrable domains
pub const SAFE_DOMAINS: &[&str] = &[
    "google.com",
    "youtube.com",
    "twitter.com",
    "x.com",
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "reddit.com",
    "pinterest.com",
    "tiktok.com",
    "amazon.com",
    "ebay.com",
    "walmart.com",
    "microsoft.com",
    "apple.com",
    "github.com",
    "stackoverflow.com",
    "wikipedia.org",
    "phishtank.org",
];

/// Exact match or subdomain of a safe domain
pub fn is_allowlisted(hostname: &str) -> bool {
    SAFE_DOMAINS.iter().any(|d| {
        hostname == *d
            || hostname
                .strip_suffix(d)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
