//! Text conversion utilities shared by all document sources

use crate::node::RichTextRun;

/// Named entities decoded by [`strip_html`], in decode order
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
];

/// Convert storage-format HTML to plain text
///
/// Drops every `<...>` span without parsing tags, decodes five named
/// entities and trims the result. A `>` inside an attribute value ends the
/// tag early.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        match rest[start + 1..].find('>') {
            Some(len) => {
                text.push_str(&rest[..start]);
                rest = &rest[start + 1 + len + 1..];
            }
            None => break,
        }
    }
    text.push_str(rest);

    let mut decoded = text;
    for (entity, replacement) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }

    decoded.trim().to_string()
}

/// Concatenate the raw text of each run; styles are not emitted
pub fn rich_text_plain(runs: &[RichTextRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

/// Render a grid of cell strings as a Markdown table
///
/// Cells are trimmed and empty cells become a single space. A `---`
/// separator row follows the first row once, provided the first row has
/// at least one column. No trailing newline.
pub fn render_table(rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<&str> = row
            .iter()
            .map(|cell| match cell.trim() {
                "" => " ",
                trimmed => trimmed,
            })
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));

        if i == 0 && !cells.is_empty() {
            let separator = vec!["---"; cells.len()];
            lines.push(format!("| {} |", separator.join(" | ")));
        }
    }

    lines.join("\n")
}

/// Join rendered blocks into document content, one blank line apart
pub fn assemble<I, S>(blocks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut content = String::new();
    for block in blocks {
        if !content.is_empty() {
            content.push_str("\n\n");
        }
        content.push_str(block.as_ref());
    }
    content
}
