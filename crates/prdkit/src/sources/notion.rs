//! Notion page source
//!
//! Reads a page's properties for its title, then every page of its child
//! blocks, and renders the blocks through the shared [`NodeRenderer`].

use crate::client::{build_http_client, send_json, ReadOptions};
use crate::error::ReadError;
use crate::node::{ContentNode, NodeRenderer, RenderOptions, RichTextRun};
use crate::resolve::{resolve, NOTION_ROOT};
use crate::sources::DocumentSource;
use crate::types::{NormalizedDocument, Platform};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

/// Notion REST API root
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// Notion API version sent with every request
pub const NOTION_VERSION: &str = "2022-06-28";

/// Largest page size the block children endpoint accepts
const BLOCK_PAGE_SIZE: u32 = 100;

/// Title used when a page has no title property
const UNTITLED: &str = "Untitled";

/// Notion connection settings
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token
    pub token: String,
    /// REST API root
    pub api_base: String,
    /// Web root for canonical page links
    pub page_base: String,
    /// Value of the `Notion-Version` header
    pub notion_version: String,
    /// Block rendering defaults
    pub render: RenderOptions,
}

impl NotionConfig {
    /// Create a config for the public Notion API
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: NOTION_API_BASE.to_string(),
            page_base: NOTION_ROOT.to_string(),
            notion_version: NOTION_VERSION.to_string(),
            render: RenderOptions::default(),
        }
    }

    /// Use a different REST API root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Notion page source
///
/// Matches `notion.so`, `*.notion.so` and `*.notion.site` URLs carrying a
/// page id.
pub struct NotionSource {
    config: NotionConfig,
    options: ReadOptions,
    renderer: NodeRenderer,
}

impl NotionSource {
    /// Create a new Notion source
    pub fn new(config: NotionConfig, options: ReadOptions) -> Self {
        let renderer = NodeRenderer::new(config.render.clone());
        Self {
            config,
            options,
            renderer,
        }
    }

    /// Fetch a page and all of its top-level blocks by page id
    pub async fn get_page_by_id(&self, page_id: &str) -> Result<NormalizedDocument, ReadError> {
        let client = build_http_client(&self.options)?;
        let api_base = self.config.api_base.trim_end_matches('/');

        let page_url = format!("{}/pages/{}", api_base, page_id);
        tracing::debug!(url = %page_url, "Fetching Notion page");
        let page: NotionPage = self.get_json(&client, &page_url).await?;
        let title = extract_title(&page.properties);

        let mut nodes = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut blocks_url = Url::parse(&format!("{}/blocks/{}/children", api_base, page_id))
                .map_err(|e| ReadError::RequestError {
                    platform: Platform::Notion,
                    message: e.to_string(),
                })?;
            {
                let mut query = blocks_url.query_pairs_mut();
                query.append_pair("page_size", &BLOCK_PAGE_SIZE.to_string());
                if let Some(ref cursor) = cursor {
                    query.append_pair("start_cursor", cursor);
                }
            }

            let list: NotionBlockList = self.get_json(&client, blocks_url.as_str()).await?;
            tracing::debug!(
                count = list.results.len(),
                has_more = list.has_more,
                "Fetched Notion blocks"
            );
            nodes.extend(list.results.iter().map(NotionBlock::to_node));

            match list.next_cursor {
                Some(next) if list.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(NormalizedDocument {
            id: page.id,
            title,
            content: self.renderer.render_document(&nodes),
            url: format!(
                "{}/{}",
                self.config.page_base.trim_end_matches('/'),
                page_id
            ),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<T, ReadError> {
        send_json(
            Platform::Notion,
            client
                .get(url)
                .bearer_auth(&self.config.token)
                .header("Notion-Version", &self.config.notion_version),
        )
        .await
    }

    fn is_notion_host(host: &str) -> bool {
        host == "notion.so"
            || host.ends_with(".notion.so")
            || host == "notion.site"
            || host.ends_with(".notion.site")
    }
}

#[async_trait]
impl DocumentSource for NotionSource {
    fn name(&self) -> &'static str {
        "notion"
    }

    fn platform(&self) -> Platform {
        Platform::Notion
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str().is_some_and(Self::is_notion_host)
            && resolve(Platform::Notion, url.as_str()).is_ok()
    }

    async fn get_document_by_url(&self, url: &str) -> Result<NormalizedDocument, ReadError> {
        let resolved = resolve(Platform::Notion, url)?;
        self.get_page_by_id(&resolved.id).await
    }
}

/// Notion page response (partial)
#[derive(Debug, Deserialize)]
struct NotionPage {
    id: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

/// Notion block children response
#[derive(Debug, Deserialize)]
struct NotionBlockList {
    results: Vec<NotionBlock>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

/// A block: its `type` tag plus a payload stored under the key named by it
#[derive(Debug, Deserialize)]
struct NotionBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl NotionBlock {
    /// Payload under the block's type key
    fn payload(&self) -> &Value {
        self.fields.get(&self.kind).unwrap_or(&Value::Null)
    }

    fn to_node(&self) -> ContentNode {
        let payload = self.payload();
        let runs = rich_text_runs(payload.get("rich_text"));

        match self.kind.as_str() {
            "paragraph" => ContentNode::Paragraph(runs),
            "heading_1" => ContentNode::Heading { level: 1, runs },
            "heading_2" => ContentNode::Heading { level: 2, runs },
            "heading_3" => ContentNode::Heading { level: 3, runs },
            "bulleted_list_item" => ContentNode::BulletItem(runs),
            "numbered_list_item" => ContentNode::NumberedItem(runs),
            "to_do" => ContentNode::TodoItem {
                checked: payload
                    .get("checked")
                    .and_then(Value::as_bool)
                    .unwrap_or_default(),
                runs,
            },
            "code" => ContentNode::CodeBlock {
                language: payload
                    .get("language")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                runs,
            },
            "quote" => ContentNode::Quote(runs),
            "callout" => ContentNode::Callout {
                icon: payload
                    .get("icon")
                    .and_then(|icon| icon.get("emoji"))
                    .and_then(Value::as_str)
                    .filter(|emoji| !emoji.is_empty())
                    .map(str::to_string),
                runs,
            },
            "divider" => ContentNode::Divider,
            other => ContentNode::Unsupported(other.to_string()),
        }
    }
}

/// Read a `rich_text` array run by run
///
/// Each field is read on its own, so a null or mistyped field costs only
/// that field. Non-text runs (mentions, equations) carry no `text` and
/// contribute nothing.
fn rich_text_runs(rich_text: Option<&Value>) -> Vec<RichTextRun> {
    let Some(items) = rich_text.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| {
            let text = item.get("text");
            let annotation = |name: &str| {
                item.get("annotations")
                    .and_then(|a| a.get(name))
                    .and_then(Value::as_bool)
                    .unwrap_or_default()
            };
            RichTextRun {
                text: text
                    .and_then(|t| t.get("content"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                bold: annotation("bold"),
                italic: annotation("italic"),
                link: text
                    .and_then(|t| t.get("link"))
                    .and_then(|l| l.get("url"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }
        })
        .collect()
}

/// Plain text of a `title` rich-text array
fn title_text(value: &Value) -> Option<String> {
    let items = value.get("title")?.as_array()?;
    let text = items
        .iter()
        .map(|item| {
            item.get("text")
                .and_then(|t| t.get("content"))
                .and_then(Value::as_str)
                .unwrap_or("")
        })
        .collect::<String>();
    Some(text)
}

/// Resolve a page title from its properties
///
/// Precedence: a property named `title`, then one named `Name`, then the
/// first property whose type is `title`, then "Untitled".
fn extract_title(properties: &Map<String, Value>) -> String {
    for name in ["title", "Name"] {
        if let Some(text) = properties.get(name).and_then(title_text) {
            return text;
        }
    }

    properties
        .values()
        .find(|prop| prop.get("type").and_then(Value::as_str) == Some("title"))
        .map(|prop| title_text(prop).unwrap_or_default())
        .unwrap_or_else(|| UNTITLED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(content: &str) -> Value {
        json!({"type": "text", "text": {"content": content}, "plain_text": content})
    }

    fn block(value: Value) -> NotionBlock {
        serde_json::from_value(value).unwrap()
    }

    fn render(blocks: Vec<Value>) -> String {
        let nodes: Vec<ContentNode> = blocks.into_iter().map(|b| block(b).to_node()).collect();
        NodeRenderer::default().render_document(&nodes)
    }

    #[test]
    fn test_title_prefers_literal_title_property() {
        let properties: Map<String, Value> = serde_json::from_value(json!({
            "Name": {"id": "a", "type": "title", "title": [text("From Name")]},
            "title": {"id": "title", "type": "title", "title": [text("From title")]}
        }))
        .unwrap();
        assert_eq!(extract_title(&properties), "From title");
    }

    #[test]
    fn test_title_falls_back_to_name() {
        let properties: Map<String, Value> = serde_json::from_value(json!({
            "Status": {"type": "select", "select": null},
            "Name": {"type": "title", "title": [text("Launch "), text("Plan")]}
        }))
        .unwrap();
        assert_eq!(extract_title(&properties), "Launch Plan");
    }

    #[test]
    fn test_title_falls_back_to_title_typed_property() {
        let properties: Map<String, Value> = serde_json::from_value(json!({
            "Owner": {"type": "people", "people": []},
            "Document": {"type": "title", "title": [text("PRD")]}
        }))
        .unwrap();
        assert_eq!(extract_title(&properties), "PRD");
    }

    #[test]
    fn test_title_untitled() {
        let properties: Map<String, Value> = serde_json::from_value(json!({
            "Owner": {"type": "people", "people": []}
        }))
        .unwrap();
        assert_eq!(extract_title(&properties), "Untitled");
        assert_eq!(extract_title(&Map::new()), "Untitled");
    }

    #[test]
    fn test_block_rendering() {
        let content = render(vec![
            json!({"type": "heading_1", "heading_1": {"rich_text": [text("Overview")]}}),
            json!({"type": "paragraph", "paragraph": {"rich_text": [text("Hello "), text("world")]}}),
            json!({"type": "bulleted_list_item", "bulleted_list_item": {"rich_text": [text("one")]}}),
            json!({"type": "numbered_list_item", "numbered_list_item": {"rich_text": [text("first")]}}),
            json!({"type": "to_do", "to_do": {"rich_text": [text("ship")], "checked": true}}),
            json!({"type": "to_do", "to_do": {"rich_text": [text("test")], "checked": false}}),
            json!({"type": "code", "code": {"rich_text": [text("let x = 1;")], "language": "rust"}}),
            json!({"type": "quote", "quote": {"rich_text": [text("cite")]}}),
            json!({"type": "callout", "callout": {"rich_text": [text("note")], "icon": {"type": "emoji", "emoji": "🚀"}}}),
            json!({"type": "callout", "callout": {"rich_text": [text("tip")], "icon": {"type": "external", "external": {"url": "https://x/y.png"}}}}),
            json!({"type": "divider", "divider": {}}),
        ]);

        assert_eq!(
            content,
            [
                "# Overview",
                "Hello world",
                "• one",
                "1. first",
                "[x] ship",
                "[ ] test",
                "```rust\nlet x = 1;\n```",
                "> cite",
                "🚀 note",
                "💡 tip",
                "---",
            ]
            .join("\n\n")
        );
    }

    #[test]
    fn test_unknown_block_type_skipped() {
        let content = render(vec![
            json!({"type": "paragraph", "paragraph": {"rich_text": [text("Visible")]}}),
            json!({"type": "synced_block", "synced_block": {"synced_from": null}}),
            json!({"type": "image", "image": {"type": "external"}}),
        ]);
        assert_eq!(content, "Visible");
    }

    #[test]
    fn test_empty_paragraph_skipped() {
        let content = render(vec![
            json!({"type": "paragraph", "paragraph": {"rich_text": []}}),
            json!({"type": "paragraph", "paragraph": {"rich_text": [text("Kept")]}}),
        ]);
        assert_eq!(content, "Kept");
    }

    #[test]
    fn test_malformed_payload_reads_as_empty() {
        let node = block(json!({"type": "quote", "quote": "not an object"})).to_node();
        assert_eq!(node, ContentNode::Quote(vec![]));
    }

    #[test]
    fn test_null_fields_keep_block_text() {
        let content = render(vec![
            json!({"type": "code", "code": {"rich_text": [text("let x")], "language": null}}),
            json!({"type": "to_do", "to_do": {"rich_text": [text("ship")], "checked": null}}),
            json!({"type": "quote", "quote": {"rich_text": [
                {"type": "text", "text": {"content": "cite"}, "annotations": {"bold": "yes"}},
                {"type": "text", "text": {"content": "!"}, "annotations": null}
            ]}}),
        ]);
        assert_eq!(content, "```\nlet x\n```\n\n[ ] ship\n\n> cite!");
    }

    #[test]
    fn test_callout_empty_emoji_uses_default() {
        let content = render(vec![json!({
            "type": "callout",
            "callout": {"rich_text": [text("x")], "icon": {"type": "emoji", "emoji": ""}}
        })]);
        assert_eq!(content, "💡 x");
    }

    #[test]
    fn test_paragraph_indentation_kept() {
        let content = render(vec![json!({
            "type": "paragraph",
            "paragraph": {"rich_text": [text("    indented")]}
        })]);
        assert_eq!(content, "    indented");
    }

    #[test]
    fn test_mention_runs_have_no_text() {
        let node = block(json!({
            "type": "paragraph",
            "paragraph": {"rich_text": [
                {"type": "mention", "mention": {"type": "user"}, "plain_text": "@Ann"},
                text("hi")
            ]}
        }))
        .to_node();
        assert_eq!(
            NodeRenderer::default().extract_node(&node),
            vec!["hi".to_string()]
        );
    }

    #[test]
    fn test_rich_text_styles_parsed() {
        let node = block(json!({
            "type": "paragraph",
            "paragraph": {"rich_text": [{
                "type": "text",
                "text": {"content": "docs", "link": {"url": "https://example.com"}},
                "annotations": {"bold": true, "italic": false}
            }]}
        }))
        .to_node();
        let ContentNode::Paragraph(runs) = node else {
            panic!("expected paragraph");
        };
        assert!(runs[0].bold);
        assert_eq!(runs[0].link.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_source_matches() {
        let source = NotionSource::new(NotionConfig::new("t"), ReadOptions::default());

        let url = Url::parse("https://www.notion.so/acme/Checkout-0123456789abcdef0123456789abcdef")
            .unwrap();
        assert!(source.matches(&url));

        let url = Url::parse("https://acme.notion.site/0123456789abcdef0123456789abcdef").unwrap();
        assert!(source.matches(&url));

        let url = Url::parse("https://www.notion.so/acme/Checkout").unwrap();
        assert!(!source.matches(&url));

        let url = Url::parse("https://example.com/0123456789abcdef0123456789abcdef").unwrap();
        assert!(!source.matches(&url));
    }
}
