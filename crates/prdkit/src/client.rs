//! HTTP client for PrdKit
//!
//! This module provides the main entry points for reading documents and the
//! request plumbing shared by the sources in [`sources`](crate::sources).

use crate::error::ReadError;
use crate::sources::SourceRegistry;
use crate::types::{Credentials, NormalizedDocument, Platform};
use crate::DEFAULT_USER_AGENT;
use reqwest::header::{HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for platform API requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout for platform API requests
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read options shared by all sources
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Total timeout per API request
    pub timeout: Duration,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Read a document by URL
///
/// Builds a registry from the given credentials and dispatches to the
/// source matching the URL. For custom options, use
/// [`read_document_with_options`].
pub async fn read_document(
    url: &str,
    credentials: &Credentials,
) -> Result<NormalizedDocument, ReadError> {
    read_document_with_options(url, credentials, &ReadOptions::default()).await
}

/// Read a document by URL with custom options
pub async fn read_document_with_options(
    url: &str,
    credentials: &Credentials,
    options: &ReadOptions,
) -> Result<NormalizedDocument, ReadError> {
    // Validate URL early
    if url.is_empty() {
        return Err(ReadError::MissingUrl);
    }

    let registry = SourceRegistry::from_credentials(credentials, options);
    registry.read(url).await
}

/// Build an HTTP client for one platform API
pub(crate) fn build_http_client(options: &ReadOptions) -> Result<reqwest::Client, ReadError> {
    let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(CONNECT_TIMEOUT.min(options.timeout))
        .timeout(options.timeout)
        .build()
        .map_err(ReadError::ClientBuildError)
}

/// Error body shapes returned by the platform APIs
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    /// Confluence and Notion: `{"message": "..."}`
    Flat { message: String },
    /// Google: `{"error": {"message": "..."}}`
    Nested { error: ApiErrorDetail },
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Send a request and decode its JSON body
///
/// Non-success statuses become [`ReadError::Upstream`] carrying the
/// upstream message when the body has one.
pub(crate) async fn send_json<T: DeserializeOwned>(
    platform: Platform,
    request: reqwest::RequestBuilder,
) -> Result<T, ReadError> {
    let response = request
        .send()
        .await
        .map_err(|e| ReadError::from_reqwest(platform, e))?;

    let status = response.status();
    debug!(platform = %platform, url = %response.url(), status = status.as_u16(), "API response");

    let body = response
        .text()
        .await
        .map_err(|e| ReadError::from_reqwest(platform, e))?;

    if !status.is_success() {
        let message = upstream_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
        warn!(platform = %platform, status = status.as_u16(), %message, "API request failed");
        return Err(ReadError::Upstream {
            platform,
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| ReadError::InvalidResponse {
        platform,
        message: e.to_string(),
    })
}

/// Extract the human-readable message from an API error body
fn upstream_message(body: &str) -> Option<String> {
    match serde_json::from_str::<ApiErrorBody>(body).ok()? {
        ApiErrorBody::Flat { message } => Some(message),
        ApiErrorBody::Nested { error } => Some(error.message),
    }
}
