//! Error types for PrdKit

use crate::types::Platform;
use thiserror::Error;

/// Errors that can occur while reading a document
#[derive(Debug, Error)]
pub enum ReadError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// Document identifier could not be found in the URL
    #[error("Cannot extract {platform} document ID from URL: {url}")]
    MalformedUrl { platform: Platform, url: String },

    /// No registered source handles the URL
    #[error("No document source available for URL: {0}")]
    NoSourceMatched(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request timed out
    #[error("{platform} API error: request timed out")]
    Timeout { platform: Platform },

    /// Failed to connect to the platform API
    #[error("{platform} API error: failed to connect")]
    ConnectError {
        platform: Platform,
        #[source]
        source: reqwest::Error,
    },

    /// Other transport error
    #[error("{platform} API error: {message}")]
    RequestError { platform: Platform, message: String },

    /// Platform API returned a non-success status
    #[error("{platform} API error: {status} - {message}")]
    Upstream {
        platform: Platform,
        status: u16,
        message: String,
    },

    /// Platform API returned a body that could not be understood
    #[error("{platform} API error: invalid response: {message}")]
    InvalidResponse { platform: Platform, message: String },

    /// Summarization call failed
    #[error("Summarization failed: {0}")]
    Summarize(String),

    /// Key point extraction call failed
    #[error("Key points extraction failed: {0}")]
    KeyPoints(String),
}

impl ReadError {
    /// Create an error from a reqwest error raised while talking to `platform`
    pub fn from_reqwest(platform: Platform, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ReadError::Timeout { platform }
        } else if err.is_connect() {
            ReadError::ConnectError {
                platform,
                source: err,
            }
        } else if err.is_decode() {
            ReadError::InvalidResponse {
                platform,
                message: err.to_string(),
            }
        } else {
            ReadError::RequestError {
                platform,
                message: err.to_string(),
            }
        }
    }

    /// True if the platform API answered with an error status or a bad body
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ReadError::Upstream { .. } | ReadError::InvalidResponse { .. }
        )
    }
}
