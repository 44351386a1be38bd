//! Frontmatter serialization back to markdown.

use serde_yaml::Value;

use super::parser::DELIMITER;
use super::types::{Document, Metadata};

/// Line separator used when writing documents.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Serialize a document back to markdown.
pub fn serialize(doc: &Document) -> String {
    serialize_parts(&doc.metadata, &doc.content)
}

/// Serialize front matter and body into markdown text.
///
/// Layout: opening delimiter, one entry per key in map order, closing
/// delimiter, a blank line, then the body. Lists are written as indented
/// `  - item` lines. Every line, body included, ends with [`LINE_ENDING`].
pub fn serialize_parts(metadata: &Metadata, content: &str) -> String {
    let mut lines = vec![DELIMITER.to_string()];
    for (key, value) in metadata.iter() {
        push_entry(&mut lines, &render_scalar(key), value);
    }
    lines.push(DELIMITER.to_string());
    lines.push(String::new());
    if content.is_empty() {
        lines.push(String::new());
    } else {
        lines.extend(content.lines().map(str::to_string));
    }

    let mut out = lines.join(LINE_ENDING);
    out.push_str(LINE_ENDING);
    out
}

fn push_entry(lines: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Null => lines.push(format!("{key}:")),
        Value::Sequence(items) if !items.is_empty() => {
            lines.push(format!("{key}:"));
            for item in items {
                push_item(lines, item);
            }
        }
        Value::Mapping(map) if !map.is_empty() => {
            lines.push(format!("{key}:"));
            for line in render_block(value).lines() {
                lines.push(format!("  {line}"));
            }
        }
        _ => push_continued(lines, &format!("{key}: "), &render_scalar(value), "  "),
    }
}

fn push_item(lines: &mut Vec<String>, item: &Value) {
    match item {
        Value::Null => lines.push("  -".to_string()),
        Value::Sequence(s) if !s.is_empty() => {
            push_continued(lines, "  - ", &render_block(item), "    ")
        }
        Value::Mapping(m) if !m.is_empty() => {
            push_continued(lines, "  - ", &render_block(item), "    ")
        }
        _ => push_continued(lines, "  - ", &render_scalar(item), "    "),
    }
}

/// Push `first_prefix` + the first line, then the remaining lines indented.
fn push_continued(lines: &mut Vec<String>, first_prefix: &str, text: &str, indent: &str) {
    let mut it = text.lines();
    lines.push(format!("{first_prefix}{}", it.next().unwrap_or_default()));
    for line in it {
        lines.push(format!("{indent}{line}"));
    }
}

/// Render a single value the way the YAML emitter would, without the trailing
/// newline. Quoting is left to the emitter so values survive a re-parse.
fn render_scalar(value: &Value) -> String {
    render_block(value).trim_end_matches('\n').to_string()
}

fn render_block(value: &Value) -> String {
    match serde_yaml::to_string(value) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("failed to render frontmatter value: {}", e);
            String::new()
        }
    }
}
