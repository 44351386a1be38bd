//! Frontmatter parsing and serialization.
//!
//! This module provides functionality to:
//! - Split a markdown file into ordered YAML front matter and a trimmed body
//! - Query the front matter through typed accessors for the post fields
//! - Serialize a document back to markdown, keeping key order

pub mod parser;
pub mod serializer;
pub mod types;

pub use parser::{DELIMITER, FrontmatterParseError, parse};
pub use serializer::{LINE_ENDING, serialize, serialize_parts};
pub use types::{
    CATEGORY_KEY, DATE_KEY, DESCRIPTION_KEY, Document, ID_KEY, Metadata, scalar_to_string,
};
