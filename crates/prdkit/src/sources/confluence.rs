//! Confluence page source
//!
//! Reads pages through the Confluence REST API and flattens their storage
//! format HTML to plain text.

use crate::client::{build_http_client, send_json, ReadOptions};
use crate::convert::strip_html;
use crate::error::ReadError;
use crate::resolve::resolve;
use crate::sources::DocumentSource;
use crate::types::{NormalizedDocument, Platform};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

/// Confluence connection settings
#[derive(Debug, Clone)]
pub struct ConfluenceConfig {
    /// Account username (usually an email address)
    pub username: String,
    /// API token
    pub token: String,
    /// REST API root; derived from the page URL when unset
    pub api_base: Option<String>,
}

impl ConfluenceConfig {
    /// Create a config that talks to the host of each page URL
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            api_base: None,
        }
    }

    /// Use a fixed REST API root instead of the page URL's host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }
}

/// Confluence page source
///
/// Matches any URL with a `pages/<digits>` path, so it should be
/// registered after host-specific sources.
pub struct ConfluenceSource {
    config: ConfluenceConfig,
    options: ReadOptions,
}

impl ConfluenceSource {
    /// Create a new Confluence source
    pub fn new(config: ConfluenceConfig, options: ReadOptions) -> Self {
        Self { config, options }
    }

    /// Fetch a page by its numeric id from the given site root
    pub async fn get_page_by_id(
        &self,
        root: &str,
        page_id: &str,
    ) -> Result<NormalizedDocument, ReadError> {
        let api_base = self
            .config
            .api_base
            .as_deref()
            .unwrap_or(root)
            .trim_end_matches('/');
        let api_url = format!(
            "{}/rest/api/content/{}?expand=body.storage,space",
            api_base, page_id
        );
        tracing::debug!(url = %api_url, "Fetching Confluence page");

        let client = build_http_client(&self.options)?;
        let page: ConfluencePage = send_json(
            Platform::Confluence,
            client
                .get(&api_url)
                .basic_auth(&self.config.username, Some(&self.config.token)),
        )
        .await?;

        if let Some(ref space) = page.space {
            tracing::debug!(space = %space.key, page_id = %page.id, "Fetched Confluence page");
        }

        Ok(normalize_page(page, root))
    }
}

/// Confluence content response (partial)
#[derive(Debug, Deserialize)]
struct ConfluencePage {
    id: String,
    title: String,
    body: ConfluenceBody,
    space: Option<ConfluenceSpace>,
    #[serde(rename = "_links", default)]
    links: ConfluenceLinks,
}

#[derive(Debug, Deserialize)]
struct ConfluenceBody {
    storage: ConfluenceStorage,
}

#[derive(Debug, Deserialize)]
struct ConfluenceStorage {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ConfluenceSpace {
    key: String,
}

#[derive(Debug, Default, Deserialize)]
struct ConfluenceLinks {
    /// Site base including any context path, e.g. `https://x.atlassian.net/wiki`
    base: Option<String>,
    /// Page path relative to `base`
    webui: Option<String>,
}

#[async_trait]
impl DocumentSource for ConfluenceSource {
    fn name(&self) -> &'static str {
        "confluence"
    }

    fn platform(&self) -> Platform {
        Platform::Confluence
    }

    fn matches(&self, url: &Url) -> bool {
        resolve(Platform::Confluence, url.as_str()).is_ok()
    }

    async fn get_document_by_url(&self, url: &str) -> Result<NormalizedDocument, ReadError> {
        let resolved = resolve(Platform::Confluence, url)?;
        let site_root = site_root(url, &resolved.root);
        self.get_page_by_id(&site_root, &resolved.id).await
    }
}

/// Site root including the `/wiki` context path Confluence Cloud serves under
fn site_root(url: &str, origin: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.path().starts_with("/wiki/") => format!("{}/wiki", origin),
        _ => origin.to_string(),
    }
}

/// Flatten a fetched page into a normalized document
fn normalize_page(page: ConfluencePage, root: &str) -> NormalizedDocument {
    let url = match page.links.webui {
        Some(ref webui) => {
            let base = page.links.base.as_deref().unwrap_or(root);
            format!("{}{}", base.trim_end_matches('/'), webui)
        }
        None => format!(
            "{}/pages/viewpage.action?pageId={}",
            root.trim_end_matches('/'),
            page.id
        ),
    };

    NormalizedDocument {
        content: strip_html(&page.body.storage.value),
        id: page.id,
        title: page.title,
        url,
    }
}
