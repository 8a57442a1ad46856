//! Core types for PrdKit

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Content platform a document lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Confluence wiki pages
    Confluence,
    /// Notion block-based pages
    Notion,
    /// Google Docs documents
    GoogleDocs,
}

impl Platform {
    /// Human-readable platform label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Confluence => "Confluence",
            Platform::Notion => "Notion",
            Platform::GoogleDocs => "Google Docs",
        }
    }

    /// Noun used for one document on this platform
    pub fn document_noun(&self) -> &'static str {
        match self {
            Platform::Confluence => "Confluence page",
            Platform::Notion => "Notion page",
            Platform::GoogleDocs => "Google Doc",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A document flattened into canonical Markdown text
///
/// `content` holds rendered blocks separated by one blank line and never
/// contains platform markup. `url` always points back to the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    /// Platform document identifier
    pub id: String,
    /// Document title
    pub title: String,
    /// Rendered Markdown content
    pub content: String,
    /// Canonical link back to the source document
    pub url: String,
}

impl NormalizedDocument {
    /// Render as a Markdown page with a title heading and source footer
    pub fn to_markdown(&self) -> String {
        format!(
            "# {}\n\n{}\n\nSource: {}",
            self.title, self.content, self.url
        )
    }
}

/// Credentials for the platforms a caller can read from
///
/// Secrets are passed through as-is; they are expected to be valid.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Confluence username and API token
    pub confluence: Option<ConfluenceCredentials>,
    /// Notion integration token
    pub notion_token: Option<String>,
    /// Google OAuth access token with documents.readonly scope
    pub google_access_token: Option<String>,
}

/// Confluence basic-auth credentials
#[derive(Debug, Clone)]
pub struct ConfluenceCredentials {
    pub username: String,
    pub token: String,
}

/// Arguments for the `read_confluence_page` tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadConfluencePageRequest {
    /// The URL of the Confluence page to read
    pub url: String,
    /// Confluence username for authentication
    pub username: String,
    /// Confluence API token for authentication
    pub token: String,
}

/// Arguments for the `read_notion_page` tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadNotionPageRequest {
    /// The URL of the Notion page to read
    pub url: String,
    /// Notion integration token for authentication
    pub token: String,
}

/// Arguments for the `read_google_doc` tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadGoogleDocRequest {
    /// The URL of the Google Doc to read
    pub url: String,
    /// Google OAuth access token with documents.readonly scope
    pub access_token: String,
}
