//! Frontmatter types and data structures.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Key holding the post identifier assigned by the store.
pub const ID_KEY: &str = "ID";
/// Key holding the publication date of a post.
pub const DATE_KEY: &str = "post_date";
/// Key holding the category names of a post.
pub const CATEGORY_KEY: &str = "post_category";
/// Key holding the SEO description of a post.
pub const DESCRIPTION_KEY: &str = "description";

/// Ordered front matter of a markdown document.
///
/// Keys keep the order they had in the file so the document can be written
/// back without reshuffling the author's layout. Unknown keys are carried
/// along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    fields: Mapping,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(fields: Mapping) -> Self {
        Self { fields }
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw value stored under `key`, including explicit nulls.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Value stored under `key`, treating an explicit null as unset.
    pub fn get_set(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Insert or overwrite `key`. Existing keys keep their position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(Value::String(key.into()), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.fields.iter()
    }

    /// Returns a copy with `key` placed first.
    ///
    /// An existing entry is overwritten where it stands instead of being moved.
    pub fn with_leading(&self, key: &str, value: Value) -> Self {
        if self.contains_key(key) {
            let mut fields = self.fields.clone();
            fields.insert(Value::String(key.to_string()), value);
            return Self { fields };
        }

        let mut fields = Mapping::with_capacity(self.fields.len() + 1);
        fields.insert(Value::String(key.to_string()), value);
        for (k, v) in &self.fields {
            fields.insert(k.clone(), v.clone());
        }
        Self { fields }
    }

    /// Split into the entries whose key satisfies `claim` and the rest.
    ///
    /// Both halves keep the original order.
    pub fn partition<F>(&self, mut claim: F) -> (Metadata, Metadata)
    where
        F: FnMut(&str, &Value) -> bool,
    {
        let mut claimed = Mapping::new();
        let mut rest = Mapping::new();
        for (k, v) in &self.fields {
            let take = k.as_str().is_some_and(|key| claim(key, v));
            if take {
                claimed.insert(k.clone(), v.clone());
            } else {
                rest.insert(k.clone(), v.clone());
            }
        }
        (Self { fields: claimed }, Self { fields: rest })
    }

    /// `true` when `ID` is present with a non-null value.
    pub fn has_id(&self) -> bool {
        self.get_set(ID_KEY).is_some()
    }

    /// Post identifier, if it is a positive integer.
    ///
    /// Numeric strings are accepted; zero, blanks and anything else are not.
    pub fn id(&self) -> Option<i64> {
        match self.get_set(ID_KEY)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .filter(|id| *id > 0)
    }

    /// Description text, if set to a scalar.
    pub fn description(&self) -> Option<String> {
        self.get_set(DESCRIPTION_KEY).and_then(scalar_to_string)
    }

    /// `true` when `key` is unset, null, or an empty string.
    pub fn is_blank(&self, key: &str) -> bool {
        match self.get_set(key) {
            None => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    /// Scalar or list value under `key` flattened into strings.
    ///
    /// A bare scalar becomes a one-element list; nulls and blank entries are
    /// skipped.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get_set(key) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(scalar_to_string)
                .filter(|s| !s.trim().is_empty())
                .collect(),
            Some(other) => {
                scalar_to_string(other).filter(|s| !s.trim().is_empty()).into_iter().collect()
            }
            None => Vec::new(),
        }
    }
}

impl From<Mapping> for Metadata {
    fn from(fields: Mapping) -> Self {
        Self::from_mapping(fields)
    }
}

/// Render a YAML scalar as plain text.
///
/// Returns `None` for nulls, sequences and mappings.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// A markdown file split into front matter and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Front matter fields, empty when the file has none.
    pub metadata: Metadata,
    /// The markdown body, trimmed.
    pub content: String,
}

impl Document {
    pub fn new(metadata: Metadata, content: impl Into<String>) -> Self {
        Self { metadata, content: content.into() }
    }
}
