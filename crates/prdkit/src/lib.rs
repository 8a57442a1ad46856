//! PrdKit - read Confluence, Notion and Google Docs documents as Markdown
//!
//! This crate resolves platform URLs to document identifiers, fetches the
//! document's content tree from the platform API and flattens it into a
//! single canonical [`NormalizedDocument`].
//!
//! ## Source System
//!
//! Each platform is handled by a [`DocumentSource`]. The [`SourceRegistry`]
//! dispatches requests to the first source whose URL pattern matches.
//!
//! Built-in sources:
//! - [`ConfluenceSource`] - storage-format HTML flattened to text
//! - [`NotionSource`] - page title plus rendered child blocks
//! - [`GoogleDocsSource`] - paragraphs, headings, tables, section breaks

pub mod client;
mod convert;
mod error;
pub mod node;
pub mod resolve;
pub mod sources;
pub mod summarize;
mod tool;
mod types;

pub use client::{read_document, read_document_with_options, ReadOptions};
pub use convert::{assemble, render_table, rich_text_plain, strip_html};
pub use error::ReadError;
pub use node::{ContentNode, NodeRenderer, RenderOptions, RichTextRun};
pub use resolve::{resolve, ResolvedDocument};
pub use sources::{
    ConfluenceConfig, ConfluenceSource, DocumentSource, GoogleDocsConfig, GoogleDocsSource,
    NotionConfig, NotionSource, SourceRegistry,
};
pub use summarize::{Summarizer, SummarizerConfig};
pub use tool::{Tool, ToolBuilder, ToolCallError, ToolDefinition, ToolOutput};
pub use types::{
    ConfluenceCredentials, Credentials, NormalizedDocument, Platform, ReadConfluencePageRequest,
    ReadGoogleDocRequest, ReadNotionPageRequest,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Everruns PrdKit/1.0";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Reads product documents from Confluence, Notion and Google Docs as Markdown.

- One tool per platform, each taking the document URL and credentials
- Headings, lists, to-dos, code, quotes, callouts and tables preserved
- Unsupported content is skipped, never fails the read"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# PrdKit Tools

Reads a document from a content platform and returns it as Markdown.

## Tools
- `read_confluence_page`: `url`, `username`, `token` (API token)
- `read_notion_page`: `url`, `token` (integration token)
- `read_google_doc`: `url`, `access_token` (OAuth token, documents.readonly)

## Output
```
# {title}

{content}

Source: {url}
```

## Rendering
- Headings: `#` repeated per level
- Bullets: `• item`; numbered items: `1. item`
- To-dos: `[x] done` / `[ ] open`
- Code: fenced with the language tag
- Quotes: `> text`; callouts: `emoji text`
- Dividers and section breaks: `---`
- Tables: Markdown tables with a header separator row
- Blocks are separated by a blank line

## Examples

### Read a Confluence page
```json
{"url": "https://acme.atlassian.net/wiki/spaces/ENG/pages/123456/Plan", "username": "me@acme.com", "token": "..."}
```

### Read a Notion page
```json
{"url": "https://www.notion.so/acme/Checkout-0123456789abcdef0123456789abcdef", "token": "secret_..."}
```

## Error Handling
- URLs without a document id return an error without calling the API
- API failures return "Error reading ...: <Platform> API error: <status> - <message>"
"#;
