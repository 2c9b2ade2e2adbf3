//! Page content lookup for records exported without a body.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use ldgraph_shared::{LdGraphError, Result, ids};

/// Maximum page size accepted from the network (5 MB).
const MAX_PAGE_SIZE: u64 = 5 * 1024 * 1024;

/// Looks up the raw content (text or HTML) published at a URL.
///
/// Lookups are trailing-slash tolerant: `https://x/a` and `https://x/a/`
/// resolve to the same page. `Ok(None)` means the page is unknown.
pub trait ContentStore: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Option<String>>> + Send;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A fixed URL → content map, typically loaded from a JSON object file.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    pages: HashMap<String, String>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page. Keys are normalized; unparsable URLs are ignored.
    pub fn insert(&mut self, url: &str, content: impl Into<String>) {
        if let Some(key) = ids::normalize_url(url) {
            self.pages.insert(key, content.into());
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Load a JSON object mapping page URLs to content.
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LdGraphError::io(path, e))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let map: HashMap<String, String> = serde_json::from_str(raw)
            .map_err(|e| LdGraphError::parse(format!("content map is not a JSON object of strings: {e}")))?;

        let mut store = Self::new();
        for (url, content) in map {
            store.insert(&url, content);
        }
        Ok(store)
    }
}

impl ContentStore for MemoryContentStore {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        Ok(ids::normalize_url(url).and_then(|key| self.pages.get(&key).cloned()))
    }
}

// ---------------------------------------------------------------------------
// HTTP store
// ---------------------------------------------------------------------------

/// Fetches live pages and keeps only the editorial container.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: Client,
    max_bytes: u64,
}

impl HttpContentStore {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: crate::build_client(timeout_secs)?,
            max_bytes: MAX_PAGE_SIZE,
        })
    }

    /// Override the page size limit.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl ContentStore for HttpContentStore {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LdGraphError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            debug!(%status, "page not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LdGraphError::Network(format!("{url}: HTTP {status}")));
        }

        let max = self.max_bytes;
        let too_large =
            |len: u64| LdGraphError::Network(format!("{url}: page too large ({len} bytes, max {max})"));

        if let Some(len) = response.content_length() {
            if len > max {
                return Err(too_large(len));
            }
        }

        // Chunked responses have no length up front.
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LdGraphError::Network(format!("{url}: failed to read body: {e}")))?
        {
            bytes.extend_from_slice(&chunk);
            if bytes.len() as u64 > max {
                return Err(too_large(bytes.len() as u64));
            }
        }
        let body = String::from_utf8_lossy(&bytes);

        let content = extract_article_html(&body);
        debug!(len = content.len(), "fetched page content");
        Ok(Some(content))
    }
}

/// Inner HTML of the article container, or the whole page when none matches.
fn extract_article_html(html: &str) -> String {
    let doc = Html::parse_document(html);

    let selectors = [".entry-content", ".post-content", "article", "main"];
    for sel_str in &selectors {
        if let Ok(selector) = Selector::parse(sel_str) {
            if let Some(el) = doc.select(&selector).next() {
                return el.inner_html();
            }
        }
    }

    html.to_string()
}
