/// Directory listing fetcher for browsable HTTP/FTP archives
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Errors produced while fetching a single directory listing.
///
/// These are always scoped to one URL: callers log them and continue with
/// an empty listing for that branch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("cannot parse listing URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// One anchor found on a directory listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    /// Raw href exactly as it appeared on the page (still percent-encoded).
    pub href: String,
    /// Absolute URL, resolved against the page the entry was found on.
    pub url: String,
    /// Heuristic: href ends with a path separator and is not a parent/self link.
    pub is_directory: bool,
}

impl DirectoryEntry {
    /// Percent-decoded final path segment, used as the display name.
    pub fn display_name(&self) -> String {
        let trimmed = self.href.trim_end_matches('/');
        let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
        match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        }
    }
}

/// Ordered anchors extracted from one fetched page.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    pub url: String,
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    pub fn directories(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|e| e.is_directory)
    }

    pub fn files(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|e| !e.is_directory)
    }
}

/// Contract for fetching one directory listing page.
///
/// The scan pipeline only ever talks to this trait; tests swap in an
/// in-memory implementation.
#[async_trait]
pub trait DirectoryFetcher: Send + Sync {
    async fn fetch_listing(&self, url: &str) -> Result<DirectoryListing, FetchError>;
}

/// Production fetcher for HTML directory-index pages.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a per-request timeout.
    pub fn new(timeout_seconds: u64, user_agent: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

#[async_trait]
impl DirectoryFetcher for HttpFetcher {
    async fn fetch_listing(&self, url: &str) -> Result<DirectoryListing, FetchError> {
        debug!("📡 Fetching listing: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;

        let base = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            source: e,
        })?;

        let entries = extract_entries(&base, &body);
        debug!("📡 {} yielded {} entries", url, entries.len());

        Ok(DirectoryListing {
            url: url.to_string(),
            entries,
        })
    }
}

/// Pull anchors out of a listing page in document order.
fn extract_entries(base: &Url, html: &str) -> Vec<DirectoryEntry> {
    let document = Html::parse_document(html);
    let anchor = Selector::parse("a").unwrap();

    let mut entries = Vec::new();
    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.is_empty() || href == "../" || href == "/" {
            continue;
        }

        let resolved = match base.join(href) {
            Ok(u) => u,
            Err(e) => {
                warn!("Skipping unresolvable href {:?} on {}: {}", href, base, e);
                continue;
            }
        };

        entries.push(DirectoryEntry {
            href: href.to_string(),
            url: resolved.to_string(),
            is_directory: href.ends_with('/'),
        });
    }

    entries
}
