//! Platform-neutral content tree and its Markdown renderer
//!
//! Each source maps its API node shapes onto [`ContentNode`] and hands the
//! tree to a [`NodeRenderer`]. Rendering is synchronous and has no side
//! effects.

use crate::convert::{assemble, render_table, rich_text_plain};

/// Callout icon used when a callout carries none
pub const DEFAULT_CALLOUT_ICON: &str = "💡";

/// A run of inline text
///
/// Style fields are kept from the source but not rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichTextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub link: Option<String>,
}

impl RichTextRun {
    /// Unstyled run
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// One structural node of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    /// Paragraph, rendered as its plain text
    Paragraph(Vec<RichTextRun>),
    /// Heading; levels outside 1..=6 render as plain text
    Heading {
        level: u8,
        runs: Vec<RichTextRun>,
    },
    BulletItem(Vec<RichTextRun>),
    NumberedItem(Vec<RichTextRun>),
    TodoItem {
        checked: bool,
        runs: Vec<RichTextRun>,
    },
    CodeBlock {
        language: String,
        runs: Vec<RichTextRun>,
    },
    Quote(Vec<RichTextRun>),
    Callout {
        icon: Option<String>,
        runs: Vec<RichTextRun>,
    },
    Divider,
    /// Grid of cells; each cell holds its own nodes
    Table(Vec<Vec<Vec<ContentNode>>>),
    /// Node kind this crate does not understand, by its platform tag
    Unsupported(String),
}

/// Rendering defaults
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Icon for callouts without one
    pub default_callout_icon: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_callout_icon: DEFAULT_CALLOUT_ICON.to_string(),
        }
    }
}

/// Flattens content trees into Markdown blocks
#[derive(Debug, Clone, Default)]
pub struct NodeRenderer {
    options: RenderOptions,
}

impl NodeRenderer {
    /// Create a renderer with the given defaults
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render one node into zero or more blocks
    ///
    /// Whitespace-only output is dropped. Unsupported nodes render to
    /// nothing so new platform node kinds never fail a whole document.
    pub fn extract_node(&self, node: &ContentNode) -> Vec<String> {
        let rendered = self.render(node);
        if rendered.trim().is_empty() {
            Vec::new()
        } else {
            vec![rendered]
        }
    }

    /// Render a sequence of nodes into blocks, in order
    pub fn extract_nodes(&self, nodes: &[ContentNode]) -> Vec<String> {
        nodes
            .iter()
            .flat_map(|node| self.extract_node(node))
            .collect()
    }

    /// Render nodes and join them into document content
    pub fn render_document(&self, nodes: &[ContentNode]) -> String {
        assemble(self.extract_nodes(nodes))
    }

    fn render(&self, node: &ContentNode) -> String {
        match node {
            ContentNode::Paragraph(runs) => rich_text_plain(runs),
            ContentNode::Heading { level, runs } => {
                let text = rich_text_plain(runs);
                let text = text.trim();
                match level {
                    1..=6 => format!("{} {}", "#".repeat(*level as usize), text),
                    _ => text.to_string(),
                }
            }
            ContentNode::BulletItem(runs) => format!("• {}", rich_text_plain(runs)),
            ContentNode::NumberedItem(runs) => format!("1. {}", rich_text_plain(runs)),
            ContentNode::TodoItem { checked, runs } => {
                let mark = if *checked { "[x]" } else { "[ ]" };
                format!("{} {}", mark, rich_text_plain(runs))
            }
            ContentNode::CodeBlock { language, runs } => {
                format!("```{}\n{}\n```", language, rich_text_plain(runs))
            }
            ContentNode::Quote(runs) => format!("> {}", rich_text_plain(runs)),
            ContentNode::Callout { icon, runs } => {
                let icon = icon
                    .as_deref()
                    .unwrap_or(&self.options.default_callout_icon);
                format!("{} {}", icon, rich_text_plain(runs))
            }
            ContentNode::Divider => "---".to_string(),
            ContentNode::Table(rows) => {
                let grid: Vec<Vec<String>> = rows
                    .iter()
                    .map(|cells| cells.iter().map(|cell| self.render_cell(cell)).collect())
                    .collect();
                render_table(&grid)
            }
            ContentNode::Unsupported(kind) => {
                tracing::trace!(kind = %kind, "Skipping unsupported node");
                String::new()
            }
        }
    }

    // Block boundaries inside a cell collapse: blocks are concatenated as-is
    fn render_cell(&self, nodes: &[ContentNode]) -> String {
        self.extract_nodes(nodes).concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(text: &str) -> Vec<RichTextRun> {
        vec![RichTextRun::plain(text)]
    }

    fn render_one(node: ContentNode) -> Vec<String> {
        NodeRenderer::default().extract_node(&node)
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            render_one(ContentNode::Heading {
                level: 3,
                runs: runs("Scope")
            }),
            vec!["### Scope"]
        );
        assert_eq!(
            render_one(ContentNode::Heading {
                level: 6,
                runs: runs("  Deep  ")
            }),
            vec!["###### Deep"]
        );
        assert_eq!(
            render_one(ContentNode::Heading {
                level: 7,
                runs: runs(" Plain ")
            }),
            vec!["Plain"]
        );
        assert_eq!(
            render_one(ContentNode::Heading {
                level: 0,
                runs: runs("Zero")
            }),
            vec!["Zero"]
        );
    }

    #[test]
    fn test_block_templates() {
        assert_eq!(render_one(ContentNode::BulletItem(runs("a"))), vec!["• a"]);
        assert_eq!(
            render_one(ContentNode::NumberedItem(runs("b"))),
            vec!["1. b"]
        );
        assert_eq!(
            render_one(ContentNode::TodoItem {
                checked: true,
                runs: runs("done")
            }),
            vec!["[x] done"]
        );
        assert_eq!(
            render_one(ContentNode::TodoItem {
                checked: false,
                runs: runs("open")
            }),
            vec!["[ ] open"]
        );
        assert_eq!(render_one(ContentNode::Quote(runs("q"))), vec!["> q"]);
        assert_eq!(render_one(ContentNode::Divider), vec!["---"]);
    }

    #[test]
    fn test_numbered_items_do_not_increment() {
        let nodes = vec![
            ContentNode::NumberedItem(runs("first")),
            ContentNode::NumberedItem(runs("second")),
        ];
        assert_eq!(
            NodeRenderer::default().render_document(&nodes),
            "1. first\n\n1. second"
        );
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            render_one(ContentNode::CodeBlock {
                language: "rust".to_string(),
                runs: runs("fn main() {}")
            }),
            vec!["```rust\nfn main() {}\n```"]
        );
        assert_eq!(
            render_one(ContentNode::CodeBlock {
                language: String::new(),
                runs: runs("x")
            }),
            vec!["```\nx\n```"]
        );
    }

    #[test]
    fn test_callout_icon() {
        assert_eq!(
            render_one(ContentNode::Callout {
                icon: Some("⚠️".to_string()),
                runs: runs("Careful")
            }),
            vec!["⚠️ Careful"]
        );
        assert_eq!(
            render_one(ContentNode::Callout {
                icon: None,
                runs: runs("Tip")
            }),
            vec!["💡 Tip"]
        );

        let renderer = NodeRenderer::new(RenderOptions {
            default_callout_icon: "(i)".to_string(),
        });
        assert_eq!(
            renderer.extract_node(&ContentNode::Callout {
                icon: None,
                runs: runs("Note")
            }),
            vec!["(i) Note"]
        );
    }

    #[test]
    fn test_whitespace_only_blocks_dropped() {
        assert!(render_one(ContentNode::Paragraph(runs("  \n "))).is_empty());
        assert!(render_one(ContentNode::Paragraph(vec![])).is_empty());
        assert!(render_one(ContentNode::Heading {
            level: 9,
            runs: runs(" ")
        })
        .is_empty());
    }

    #[test]
    fn test_paragraph_text_as_is() {
        assert_eq!(
            render_one(ContentNode::Paragraph(runs("  - nested note"))),
            vec!["  - nested note"]
        );
    }

    #[test]
    fn test_unsupported_node_skipped() {
        let nodes = vec![
            ContentNode::Paragraph(runs("Kept")),
            ContentNode::Unsupported("synced_block".to_string()),
        ];
        assert_eq!(NodeRenderer::default().render_document(&nodes), "Kept");
    }

    #[test]
    fn test_empty_tree_renders_empty_string() {
        assert_eq!(NodeRenderer::default().render_document(&[]), "");
    }

    #[test]
    fn test_table_cells_collapse_blocks() {
        let table = ContentNode::Table(vec![
            vec![
                vec![ContentNode::Paragraph(runs("Name"))],
                vec![
                    ContentNode::Paragraph(runs("Owner")),
                    ContentNode::Paragraph(runs("s")),
                ],
            ],
            vec![
                vec![ContentNode::Heading {
                    level: 2,
                    runs: runs("Alpha"),
                }],
                vec![ContentNode::Unsupported("image".to_string())],
            ],
        ]);
        assert_eq!(
            render_one(table),
            vec!["| Name | Owners |\n| --- | --- |\n| ## Alpha |   |"]
        );
    }

    #[test]
    fn test_empty_table_dropped() {
        assert!(render_one(ContentNode::Table(vec![])).is_empty());
    }
}
