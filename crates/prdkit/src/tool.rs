//! Tool builder and contract for PrdKit

use crate::client::ReadOptions;
use crate::error::ReadError;
use crate::sources::{
    ConfluenceConfig, ConfluenceSource, DocumentSource, GoogleDocsConfig, GoogleDocsSource,
    NotionConfig, NotionSource,
};
use crate::types::{
    NormalizedDocument, Platform, ReadConfluencePageRequest, ReadGoogleDocRequest,
    ReadNotionPageRequest,
};
use crate::TOOL_LLMTXT;
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Name of the Confluence tool
pub const READ_CONFLUENCE_PAGE: &str = "read_confluence_page";
/// Name of the Notion tool
pub const READ_NOTION_PAGE: &str = "read_notion_page";
/// Name of the Google Docs tool
pub const READ_GOOGLE_DOC: &str = "read_google_doc";

/// Tool advertised to an LLM host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Text result of a tool call
///
/// Read failures are reported here with `is_error` set rather than as a
/// [`ToolCallError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn document(doc: &NormalizedDocument) -> Self {
        Self {
            text: doc.to_markdown(),
            is_error: false,
        }
    }

    fn read_error(platform: Platform, err: &ReadError) -> Self {
        Self {
            text: format!("Error reading {}: {}", platform.document_noun(), err),
            is_error: true,
        }
    }
}

/// Errors in the call itself, before any document is read
#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
}

/// Builder for configuring the document tools
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    /// Custom User-Agent
    user_agent: Option<String>,
    /// Per-request timeout
    timeout: Option<Duration>,
    /// Confluence REST root override
    confluence_api_base: Option<String>,
    /// Notion REST root override
    notion_api_base: Option<String>,
    /// Google Docs REST root override
    google_docs_api_base: Option<String>,
}

impl ToolBuilder {
    /// Create a new tool builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send Confluence requests to a fixed REST root
    pub fn confluence_api_base(mut self, base: impl Into<String>) -> Self {
        self.confluence_api_base = Some(base.into());
        self
    }

    /// Send Notion requests to a different REST root
    pub fn notion_api_base(mut self, base: impl Into<String>) -> Self {
        self.notion_api_base = Some(base.into());
        self
    }

    /// Send Google Docs requests to a different REST root
    pub fn google_docs_api_base(mut self, base: impl Into<String>) -> Self {
        self.google_docs_api_base = Some(base.into());
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        let mut options = ReadOptions {
            user_agent: self.user_agent,
            ..Default::default()
        };
        if let Some(timeout) = self.timeout {
            options.timeout = timeout;
        }

        Tool {
            options,
            confluence_api_base: self.confluence_api_base,
            notion_api_base: self.notion_api_base,
            google_docs_api_base: self.google_docs_api_base,
        }
    }
}

/// Configured document reading tools
#[derive(Debug, Clone)]
pub struct Tool {
    options: ReadOptions,
    confluence_api_base: Option<String>,
    notion_api_base: Option<String>,
    google_docs_api_base: Option<String>,
}

impl Default for Tool {
    fn default() -> Self {
        ToolBuilder::new().build()
    }
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Definitions of every tool, with JSON input schemas
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: READ_CONFLUENCE_PAGE.to_string(),
                description: "Read content from a Confluence page by URL".to_string(),
                input_schema: schema_value(schema_for!(ReadConfluencePageRequest)),
            },
            ToolDefinition {
                name: READ_NOTION_PAGE.to_string(),
                description: "Read content from a Notion page by URL".to_string(),
                input_schema: schema_value(schema_for!(ReadNotionPageRequest)),
            },
            ToolDefinition {
                name: READ_GOOGLE_DOC.to_string(),
                description: "Read content from a Google Doc by URL".to_string(),
                input_schema: schema_value(schema_for!(ReadGoogleDocRequest)),
            },
        ]
    }

    /// Call a tool by name with JSON arguments
    pub async fn call(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolOutput, ToolCallError> {
        match name {
            READ_CONFLUENCE_PAGE => {
                let req: ReadConfluencePageRequest = parse_arguments(name, arguments)?;
                Ok(self.read_confluence_page(req).await)
            }
            READ_NOTION_PAGE => {
                let req: ReadNotionPageRequest = parse_arguments(name, arguments)?;
                Ok(self.read_notion_page(req).await)
            }
            READ_GOOGLE_DOC => {
                let req: ReadGoogleDocRequest = parse_arguments(name, arguments)?;
                Ok(self.read_google_doc(req).await)
            }
            _ => Err(ToolCallError::UnknownTool(name.to_string())),
        }
    }

    /// Read a Confluence page
    pub async fn read_confluence_page(&self, req: ReadConfluencePageRequest) -> ToolOutput {
        let mut config = ConfluenceConfig::new(req.username, req.token);
        config.api_base = self.confluence_api_base.clone();
        let source = ConfluenceSource::new(config, self.options.clone());
        run_source(&source, &req.url).await
    }

    /// Read a Notion page
    pub async fn read_notion_page(&self, req: ReadNotionPageRequest) -> ToolOutput {
        let mut config = NotionConfig::new(req.token);
        if let Some(ref base) = self.notion_api_base {
            config = config.with_api_base(base.clone());
        }
        let source = NotionSource::new(config, self.options.clone());
        run_source(&source, &req.url).await
    }

    /// Read a Google Doc
    pub async fn read_google_doc(&self, req: ReadGoogleDocRequest) -> ToolOutput {
        let mut config = GoogleDocsConfig::new(req.access_token);
        if let Some(ref base) = self.google_docs_api_base {
            config = config.with_api_base(base.clone());
        }
        let source = GoogleDocsSource::new(config, self.options.clone());
        run_source(&source, &req.url).await
    }
}

async fn run_source(source: &dyn DocumentSource, url: &str) -> ToolOutput {
    match source.get_document_by_url(url).await {
        Ok(doc) => ToolOutput::document(&doc),
        Err(err) => {
            tracing::warn!(source = source.name(), error = %err, "Read failed");
            ToolOutput::read_error(source.platform(), &err)
        }
    }
}

fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool: &str,
    arguments: serde_json::Value,
) -> Result<T, ToolCallError> {
    serde_json::from_value(arguments).map_err(|e| ToolCallError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

fn schema_value(schema: schemars::schema::RootSchema) -> serde_json::Value {
    serde_json::to_value(schema).unwrap_or_default()
}
