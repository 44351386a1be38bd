//! Field reconciliation for create and update.

use std::collections::BTreeMap;

use serde_yaml::Value;
use tracing::{debug, warn};

use super::ReconcileError;
use crate::frontmatter::{
    CATEGORY_KEY, DATE_KEY, DESCRIPTION_KEY, Document, ID_KEY, Metadata, scalar_to_string,
};
use crate::store::{NewPost, PostId, PostUpdate};

/// Post meta key read by Yoast SEO for the page description.
pub const YOAST_METADESC_KEY: &str = "_yoast_wpseo_metadesc";

/// Front matter keys submitted verbatim as post fields on create.
pub const POST_FIELD_KEYS: &[&str] = &[
    "post_title",
    "post_name",
    "post_author",
    "post_type",
    "post_status",
    DATE_KEY,
    "tags_input",
    "post_excerpt",
];

const TAGS_KEY: &str = "tags_input";

/// Everything needed to create a post from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    /// Fields for the store. `categories` is left empty until the names are
    /// resolved against the taxonomy.
    pub post: NewPost,
    /// Category names from the front matter, deduplicated, in file order.
    pub categories: Vec<String>,
    /// Front matter keys that were not submitted.
    pub remaining: Metadata,
}

/// Everything needed to update a post from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub update: PostUpdate,
    /// Front matter keys that were not resent.
    pub remaining: Metadata,
}

/// Map a document onto a new post.
///
/// A set `ID` means the file was already published: that is refused unless
/// `force` is given, in which case the old identifier is dropped and the
/// store issues a new one.
pub fn reconcile_create(doc: &Document, force: bool) -> Result<CreateRequest, ReconcileError> {
    let meta = &doc.metadata;

    if let Some(id) = meta.get_set(ID_KEY) {
        let shown = scalar_to_string(id).unwrap_or_else(|| "(non-scalar)".to_string());
        if !force {
            return Err(ReconcileError::DuplicateIdentifier(shown));
        }
        debug!("dropping existing ID {} before republishing", shown);
    }

    let (claimed, remaining) = meta.partition(|key, value| {
        !value.is_null()
            && (key == ID_KEY
                || key == CATEGORY_KEY
                || key == DESCRIPTION_KEY
                || POST_FIELD_KEYS.contains(&key))
    });

    let post = NewPost {
        title: text_field(&claimed, "post_title"),
        name: text_field(&claimed, "post_name"),
        author: text_field(&claimed, "post_author"),
        post_type: text_field(&claimed, "post_type"),
        status: text_field(&claimed, "post_status"),
        date: text_field(&claimed, DATE_KEY),
        excerpt: text_field(&claimed, "post_excerpt"),
        content: doc.content.clone(),
        tags: tag_names(&claimed),
        categories: Vec::new(),
        meta: description_meta(claimed.description()),
    };

    let mut categories: Vec<String> = Vec::new();
    for name in claimed.string_list(CATEGORY_KEY) {
        let name = name.trim().to_string();
        if !categories.contains(&name) {
            categories.push(name);
        }
    }

    Ok(CreateRequest { post, categories, remaining })
}

/// Map a document onto an update of an existing post.
///
/// Only the body and the description meta are resent; every other key stays
/// as the store already has it.
pub fn reconcile_update(doc: &Document) -> Result<UpdateRequest, ReconcileError> {
    let meta = &doc.metadata;
    let id: PostId = meta.id().ok_or(ReconcileError::MissingIdentifier)?;

    let description = meta.description().filter(|d| !d.trim().is_empty());
    let (_, remaining) = meta.partition(|key, _| {
        key == ID_KEY || (key == DESCRIPTION_KEY && description.is_some())
    });

    Ok(UpdateRequest {
        update: PostUpdate { id, content: doc.content.clone(), meta: description_meta(description) },
        remaining,
    })
}

/// Front matter to write back after the store created post `id`.
///
/// The original metadata is kept as is, with `ID` put first (or overwritten
/// where it already stands) and `post_date` filled in from the store when the
/// file left it empty.
pub fn stamp_created(original: &Metadata, id: PostId, created: &str) -> Metadata {
    let mut stamped = original.with_leading(ID_KEY, Value::from(id));
    if stamped.is_blank(DATE_KEY) {
        stamped.insert(DATE_KEY, Value::String(created.to_string()));
    }
    stamped
}

fn text_field(claimed: &Metadata, key: &str) -> Option<String> {
    let value = claimed.get_set(key)?;
    let text = scalar_to_string(value);
    if text.is_none() {
        warn!("ignoring '{}': expected a single value", key);
    }
    text
}

/// Tag names from a list, or from a comma separated string.
fn tag_names(claimed: &Metadata) -> Vec<String> {
    claimed
        .string_list(TAGS_KEY)
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn description_meta(description: Option<String>) -> BTreeMap<String, String> {
    description.into_iter().map(|d| (YOAST_METADESC_KEY.to_string(), d)).collect()
}
