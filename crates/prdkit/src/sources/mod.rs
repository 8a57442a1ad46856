//! Document sources, one per content platform
//!
//! Design: each source resolves URLs of one platform, fetches the content
//! tree and normalizes it. SourceRegistry dispatches to the first matching
//! source.

mod confluence;
mod google_docs;
mod notion;

pub use confluence::{ConfluenceConfig, ConfluenceSource};
pub use google_docs::{GoogleDocsConfig, GoogleDocsSource, GOOGLE_DOCS_API_BASE};
pub use notion::{NotionConfig, NotionSource, NOTION_API_BASE, NOTION_VERSION};

use crate::client::ReadOptions;
use crate::error::ReadError;
use crate::types::{Credentials, NormalizedDocument, Platform};
use async_trait::async_trait;
use url::Url;

/// Trait for platform document sources
///
/// Each source declares which URLs it can handle via `matches()` and
/// reads the document via `get_document_by_url()`.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Unique identifier for this source (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Platform this source reads from
    fn platform(&self) -> Platform;

    /// Returns true if this source can handle the given URL
    ///
    /// More specific sources should be registered before generic ones.
    fn matches(&self, url: &Url) -> bool;

    /// Resolve, fetch and normalize the document at `url`
    ///
    /// Either the whole document is returned or an error; never partial
    /// content alongside an error.
    async fn get_document_by_url(&self, url: &str) -> Result<NormalizedDocument, ReadError>;
}

/// Registry of sources that dispatches to the appropriate handler
///
/// Maintains an ordered list of sources. When reading a URL, iterates
/// through sources and uses the first one that matches.
pub struct SourceRegistry {
    sources: Vec<Box<dyn DocumentSource>>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Create a registry with a source for every platform that has credentials
    ///
    /// Registration order:
    /// 1. GoogleDocsSource - docs.google.com URLs
    /// 2. NotionSource - notion.so / notion.site URLs
    /// 3. ConfluenceSource - any URL with a `pages/<id>` path
    pub fn from_credentials(credentials: &Credentials, options: &ReadOptions) -> Self {
        let mut registry = Self::new();

        if let Some(ref access_token) = credentials.google_access_token {
            registry.register(Box::new(GoogleDocsSource::new(
                GoogleDocsConfig::new(access_token.clone()),
                options.clone(),
            )));
        }

        if let Some(ref token) = credentials.notion_token {
            registry.register(Box::new(NotionSource::new(
                NotionConfig::new(token.clone()),
                options.clone(),
            )));
        }

        // Confluence last: it matches on path alone, regardless of host
        if let Some(ref confluence) = credentials.confluence {
            registry.register(Box::new(ConfluenceSource::new(
                ConfluenceConfig::new(confluence.username.clone(), confluence.token.clone()),
                options.clone(),
            )));
        }

        registry
    }

    /// Register a source
    ///
    /// Sources are checked in registration order.
    pub fn register(&mut self, source: Box<dyn DocumentSource>) {
        self.sources.push(source);
    }

    /// Names of the registered sources, in dispatch order
    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Read a document using the first source that matches the URL
    pub async fn read(&self, url: &str) -> Result<NormalizedDocument, ReadError> {
        if url.is_empty() {
            return Err(ReadError::MissingUrl);
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ReadError::InvalidUrlScheme);
        }

        let parsed_url = Url::parse(url).map_err(|_| ReadError::InvalidUrlScheme)?;

        for source in &self.sources {
            if source.matches(&parsed_url) {
                tracing::debug!(source = source.name(), url = %url, "Using source");
                return source.get_document_by_url(url).await;
            }
        }

        Err(ReadError::NoSourceMatched(url.to_string()))
    }
}
