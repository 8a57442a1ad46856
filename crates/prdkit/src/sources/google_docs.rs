//! Google Docs document source
//!
//! Reads a document through the Google Docs REST API and maps its
//! structural elements (paragraphs, tables, section breaks) onto the
//! shared content tree.

use crate::client::{build_http_client, send_json, ReadOptions};
use crate::error::ReadError;
use crate::node::{ContentNode, NodeRenderer, RenderOptions, RichTextRun};
use crate::resolve::{resolve, GOOGLE_DOCS_ROOT};
use crate::sources::DocumentSource;
use crate::types::{NormalizedDocument, Platform};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

/// Google Docs REST API root
pub const GOOGLE_DOCS_API_BASE: &str = "https://docs.googleapis.com/v1";

/// Title used when a document has none
const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Google Docs connection settings
#[derive(Debug, Clone)]
pub struct GoogleDocsConfig {
    /// OAuth access token with the documents.readonly scope
    pub access_token: String,
    /// REST API root
    pub api_base: String,
    /// Web root for canonical document links
    pub doc_base: String,
    /// Block rendering defaults
    pub render: RenderOptions,
}

impl GoogleDocsConfig {
    /// Create a config for the public Google Docs API
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base: GOOGLE_DOCS_API_BASE.to_string(),
            doc_base: GOOGLE_DOCS_ROOT.to_string(),
            render: RenderOptions::default(),
        }
    }

    /// Use a different REST API root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Google Docs document source
///
/// Matches `https://docs.google.com/document/d/{id}/...` URLs.
pub struct GoogleDocsSource {
    config: GoogleDocsConfig,
    options: ReadOptions,
    renderer: NodeRenderer,
}

impl GoogleDocsSource {
    /// Create a new Google Docs source
    pub fn new(config: GoogleDocsConfig, options: ReadOptions) -> Self {
        let renderer = NodeRenderer::new(config.render.clone());
        Self {
            config,
            options,
            renderer,
        }
    }

    /// Fetch a document by id
    pub async fn get_doc_by_id(&self, doc_id: &str) -> Result<NormalizedDocument, ReadError> {
        let api_url = format!(
            "{}/documents/{}",
            self.config.api_base.trim_end_matches('/'),
            doc_id
        );
        tracing::debug!(url = %api_url, "Fetching Google Doc");

        let client = build_http_client(&self.options)?;
        let doc: GoogleDocument = send_json(
            Platform::GoogleDocs,
            client.get(&api_url).bearer_auth(&self.config.access_token),
        )
        .await?;

        let nodes: Vec<ContentNode> = doc
            .body
            .map(|body| body.content.iter().map(StructuralElement::to_node).collect())
            .unwrap_or_default();

        Ok(NormalizedDocument {
            id: doc_id.to_string(),
            title: doc
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED_DOCUMENT.to_string()),
            content: self.renderer.render_document(&nodes),
            url: format!(
                "{}/document/d/{}",
                self.config.doc_base.trim_end_matches('/'),
                doc_id
            ),
        })
    }
}

#[async_trait]
impl DocumentSource for GoogleDocsSource {
    fn name(&self) -> &'static str {
        "google_docs"
    }

    fn platform(&self) -> Platform {
        Platform::GoogleDocs
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str() == Some("docs.google.com")
            && resolve(Platform::GoogleDocs, url.as_str()).is_ok()
    }

    async fn get_document_by_url(&self, url: &str) -> Result<NormalizedDocument, ReadError> {
        let resolved = resolve(Platform::GoogleDocs, url)?;
        self.get_doc_by_id(&resolved.id).await
    }
}

/// Google Docs document response (partial)
#[derive(Debug, Deserialize)]
struct GoogleDocument {
    title: Option<String>,
    body: Option<GoogleBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoogleBody {
    content: Vec<StructuralElement>,
}

/// One element of a document body or table cell
///
/// Exactly one of the element kinds is set; kinds not listed here (e.g.
/// `tableOfContents`) leave all three empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StructuralElement {
    paragraph: Option<Paragraph>,
    table: Option<Table>,
    section_break: Option<serde_json::Value>,
    table_of_contents: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Paragraph {
    elements: Vec<ParagraphElement>,
    paragraph_style: Option<ParagraphStyle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ParagraphElement {
    text_run: Option<TextRun>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TextRun {
    content: String,
    text_style: TextStyle,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextStyle {
    bold: bool,
    italic: bool,
    link: Option<TextLink>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextLink {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ParagraphStyle {
    named_style_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Table {
    table_rows: Vec<TableRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TableRow {
    table_cells: Vec<TableCell>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TableCell {
    content: Vec<StructuralElement>,
}

impl StructuralElement {
    fn to_node(&self) -> ContentNode {
        if let Some(ref paragraph) = self.paragraph {
            paragraph.to_node()
        } else if let Some(ref table) = self.table {
            ContentNode::Table(
                table
                    .table_rows
                    .iter()
                    .map(|row| {
                        row.table_cells
                            .iter()
                            .map(|cell| cell.content.iter().map(Self::to_node).collect())
                            .collect()
                    })
                    .collect(),
            )
        } else if self.section_break.is_some() {
            ContentNode::Divider
        } else if self.table_of_contents.is_some() {
            ContentNode::Unsupported("tableOfContents".to_string())
        } else {
            ContentNode::Unsupported("unknown".to_string())
        }
    }
}

impl Paragraph {
    fn to_node(&self) -> ContentNode {
        let mut runs: Vec<RichTextRun> = self
            .elements
            .iter()
            .filter_map(|element| element.text_run.as_ref())
            .map(|run| RichTextRun {
                text: run.content.clone(),
                bold: run.text_style.bold,
                italic: run.text_style.italic,
                link: run
                    .text_style
                    .link
                    .as_ref()
                    .and_then(|link| link.url.clone()),
            })
            .collect();
        trim_runs(&mut runs);

        let heading_level = self
            .paragraph_style
            .as_ref()
            .and_then(|style| style.named_style_type.as_deref())
            .and_then(|style| style.strip_prefix("HEADING_"))
            .and_then(|level| level.parse::<u8>().ok());

        match heading_level {
            Some(level) => ContentNode::Heading { level, runs },
            None => ContentNode::Paragraph(runs),
        }
    }
}

/// Trim whitespace around the paragraph text as a whole
///
/// Every paragraph ends with a `\n` run terminator; runs that trim to
/// nothing at either edge are emptied and the trim moves inward.
fn trim_runs(runs: &mut [RichTextRun]) {
    for run in runs.iter_mut() {
        run.text = run.text.trim_start().to_string();
        if !run.text.is_empty() {
            break;
        }
    }
    for run in runs.iter_mut().rev() {
        run.text = run.text.trim_end().to_string();
        if !run.text.is_empty() {
            break;
        }
    }
}
