//! Blocklist Feed Download
//!
//! Streams newline-delimited feeds without buffering whole responses;
//! the active phishing lists run to six-figure line counts.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Bounds the connect and each body read; whole transfers are unbounded.
/// A full list takes longer to download than any sane request deadline.
pub const FEED_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// HTTP client for feed downloads
pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(FEED_REQUEST_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(FEED_REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Open a streaming download of one feed. Browsable GitHub URLs are
    /// rewritten to their raw-content form first.
    pub async fn open(&self, feed_url: &str) -> Result<FeedDownload, FeedError> {
        let raw_url = to_raw_github_url(feed_url);
        let response = self.client.get(&raw_url).send().await?.error_for_status()?;

        Ok(FeedDownload {
            source: raw_url,
            response,
            buffer: Vec::new(),
            done: false,
        })
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// One in-flight feed download, consumed line by line
pub struct FeedDownload {
    source: String,
    response: reqwest::Response,
    buffer: Vec<u8>,
    done: bool,
}

impl FeedDownload {
    /// The URL the bytes actually come from (post-rewrite)
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Next usable entry, or `None` at end of stream. Blank lines and
    /// comment lines never surface.
    pub async fn next_entry(&mut self) -> Result<Option<String>, FeedError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line_bytes);
                if let Some(entry) = feed_entry(&line) {
                    return Ok(Some(entry.to_string()));
                }
                continue;
            }

            if self.done {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let tail = std::mem::take(&mut self.buffer);
                let line = String::from_utf8_lossy(&tail);
                return Ok(feed_entry(&line).map(str::to_string));
            }

            match self.response.chunk().await? {
                Some(bytes) => self.buffer.extend_from_slice(&bytes),
                None => self.done = true,
            }
        }
    }
}

/// Filter one raw feed line down to a usable entry
fn feed_entry(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
        None
    } else {
        Some(line)
    }
}

/// Convert a browsable GitHub blob URL to its raw-content form.
/// Already-raw and non-GitHub URLs pass through unchanged.
pub fn to_raw_github_url(url: &str) -> String {
    if url.contains("raw.githubusercontent.com") || !url.contains("github.com") {
        return url.to_string();
    }

    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };

    // Path shape: /<owner>/<repo>/blob/<branch>/<path...>
    let parts: Vec<&str> = parsed.path().split('/').collect();
    let Some(blob_index) = parts.iter().position(|p| *p == "blob") else {
        return url.to_string();
    };
    if blob_index < 3 || blob_index + 1 >= parts.len() {
        return url.to_string();
    }

    let owner = parts[1];
    let repo = parts[2];
    let branch = parts[blob_index + 1];
    let path = parts[blob_index + 2..].join("/");

    format!("https://raw.githubusercontent.com/{owner}/{repo}/{branch}/{path}")
}
