//! Summarization of normalized documents through the Anthropic Messages API

use crate::client::{build_http_client, ReadOptions};
use crate::error::ReadError;
use serde::{Deserialize, Serialize};

/// Default model used for summaries
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Messages API root
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Returned when the reply carries no text block
const NO_SUMMARY: &str = "Unable to generate summary";

/// Summarizer settings
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_base: String,
}

impl SummarizerConfig {
    /// Create a config with the default model and token budget
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_base: ANTHROPIC_API_BASE.to_string(),
        }
    }

    /// Use a different model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different completion budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Use a different API root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Summarizes document content with a language model
pub struct Summarizer {
    config: SummarizerConfig,
    options: ReadOptions,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl Summarizer {
    /// Create a new summarizer
    pub fn new(config: SummarizerConfig, options: ReadOptions) -> Self {
        Self { config, options }
    }

    /// Summarize document content
    pub async fn summarize(
        &self,
        content: &str,
        title: Option<&str>,
    ) -> Result<String, ReadError> {
        let prompt = summary_prompt(content, title);
        let text = self.complete(&prompt).await?;
        Ok(text.unwrap_or_else(|| NO_SUMMARY.to_string()))
    }

    /// Extract the key points of a document as a list
    pub async fn extract_key_points(
        &self,
        content: &str,
        title: Option<&str>,
    ) -> Result<Vec<String>, ReadError> {
        let prompt = key_points_prompt(content, title);
        let text = self
            .complete(&prompt)
            .await
            .map_err(|e| match e {
                ReadError::Summarize(message) => ReadError::KeyPoints(message),
                other => other,
            })?
            .unwrap_or_default();
        Ok(parse_key_points(&text))
    }

    /// Send one user message; returns the first text block of the reply
    async fn complete(&self, prompt: &str) -> Result<Option<String>, ReadError> {
        let client = build_http_client(&self.options)?;

        let url = format!("{}/messages", self.config.api_base.trim_end_matches('/'));
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.config.model, "Requesting summary");
        let response = client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReadError::Summarize(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ReadError::Summarize(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(ReadError::Summarize(format!(
                "{} - {}",
                status.as_u16(),
                message
            )));
        }

        let reply: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| ReadError::Summarize(e.to_string()))?;

        Ok(reply
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text))
    }
}

fn title_line(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.is_empty() => format!("Document Title: {}\n\n", title),
        _ => String::new(),
    }
}

fn summary_prompt(content: &str, title: Option<&str>) -> String {
    format!(
        "Summarize the following product requirements document. Cover its objectives, \
         key requirements, target users, success criteria and constraints.\n\n\
         {}Document Content:\n{}",
        title_line(title),
        content
    )
}

fn key_points_prompt(content: &str, title: Option<&str>) -> String {
    format!(
        "List the most important key points of the following product requirements \
         document, one per line, each starting with the • symbol.\n\n\
         {}Document Content:\n{}",
        title_line(title),
        content
    )
}

/// Keep list lines (`•`, `-` or `N.` markers) and strip their markers
fn parse_key_points(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            if let Some(rest) = line.strip_prefix('•').or_else(|| line.strip_prefix('-')) {
                return Some(rest.trim_start().to_string());
            }
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            if digits > 0 {
                if let Some(rest) = line[digits..].strip_prefix('.') {
                    return Some(rest.trim_start().to_string());
                }
            }
            None
        })
        .collect()
}
