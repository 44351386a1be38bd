//! Frontmatter parsing from markdown documents.

use serde_yaml::Value;
use thiserror::Error;

use super::types::{Document, Metadata};

/// Delimiter opening and closing the front matter block.
pub const DELIMITER: &str = "---";

/// Errors that can occur during frontmatter parsing.
#[derive(Debug, Error)]
pub enum FrontmatterParseError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("frontmatter must be a mapping of keys to values, found {0}")]
    NotAMapping(&'static str),
}

/// Split markdown text into front matter and body.
///
/// Front matter is recognised only when the text starts with `---`; the
/// block ends at the next `---`:
/// ```markdown
/// ---
/// post_title: Hello
/// ---
///
/// Body text
/// ```
/// Without a closing delimiter the whole text is treated as body. The body is
/// always trimmed.
pub fn parse(raw: &str) -> Result<Document, FrontmatterParseError> {
    let Some(after_open) = raw.strip_prefix(DELIMITER) else {
        return Ok(Document::new(Metadata::new(), raw.trim()));
    };

    let Some(end) = after_open.find(DELIMITER) else {
        return Ok(Document::new(Metadata::new(), raw.trim()));
    };

    let yaml = &after_open[..end];
    let body = &after_open[end + DELIMITER.len()..];

    Ok(Document::new(parse_metadata(yaml)?, body.trim()))
}

fn parse_metadata(yaml: &str) -> Result<Metadata, FrontmatterParseError> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(map) => Ok(Metadata::from_mapping(map)),
        Value::Null => Ok(Metadata::new()),
        Value::Sequence(_) => Err(FrontmatterParseError::NotAMapping("a list")),
        Value::Tagged(_) => Err(FrontmatterParseError::NotAMapping("a tagged value")),
        _ => Err(FrontmatterParseError::NotAMapping("a scalar")),
    }
}
