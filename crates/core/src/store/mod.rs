//! Post store: the system that owns posts and their taxonomy.
//!
//! Publishing only talks to the [`ContentStore`] trait. The bundled
//! implementation, [`SqliteStore`], keeps posts, terms, term relationships and
//! post meta in a SQLite database laid out after the WordPress tables.
//!
//! # Example
//!
//! ```no_run
//! use wpmd_core::store::{ContentStore, NewPost, SqliteStore};
//! use std::path::Path;
//!
//! let mut store = SqliteStore::open(Path::new("blog.db")).unwrap();
//! let id = store
//!     .insert_post(&NewPost {
//!         title: Some("Hello".into()),
//!         content: "First post".into(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! let post = store.get_post(id).unwrap().unwrap();
//! println!("{} published at {}", post.id, post.date);
//! ```

pub mod db;
pub mod schema;

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

pub use db::SqliteStore;
pub use schema::{SCHEMA_VERSION, SchemaError};

/// Identifier of a post.
pub type PostId = i64;
/// Identifier of a taxonomy term.
pub type TermId = i64;

/// Taxonomy holding post categories.
pub const CATEGORY_TAXONOMY: &str = "category";
/// Taxonomy holding post tags.
pub const TAG_TAXONOMY: &str = "post_tag";
/// Parent id of top-level terms.
pub const ROOT_TERM: TermId = 0;

/// Post statuses accepted by the store.
pub const POST_STATUSES: &[&str] = &["publish", "draft", "pending", "private", "future"];

/// Format of `post_date` and `post_modified` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Content, title, and excerpt are empty.")]
    EmptyContent,

    #[error("Invalid post ID: {0}")]
    InvalidPostId(PostId),

    #[error("Invalid author '{0}': expected a user ID")]
    InvalidAuthor(String),

    #[error("Invalid post status '{0}'")]
    InvalidStatus(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD HH:MM:SS")]
    InvalidDate(String),

    #[error("A term name is required")]
    EmptyTermName,
}

/// Fields submitted when creating a post.
///
/// Text fields are passed through as written in the front matter; the store
/// validates and normalises them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPost {
    pub title: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub post_type: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    /// Tag names, created on demand.
    pub tags: Vec<String>,
    /// Category term ids, already resolved.
    pub categories: Vec<TermId>,
    /// Post meta written alongside the post.
    pub meta: BTreeMap<String, String>,
}

/// Store values of a [`NewPost`] that passed [`NewPost::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedFields {
    /// Author user id; `0` when none was given.
    pub author: i64,
    pub status: &'static str,
    /// Publication date; `None` means "now".
    pub date: Option<NaiveDateTime>,
}

impl NewPost {
    /// Check the fields the store would refuse, without touching the store.
    ///
    /// A post needs a title, content or excerpt. The author, when given, must
    /// be a positive user id, the status one of [`POST_STATUSES`], and the date
    /// in [`DATE_FORMAT`] (minutes or a bare date are accepted too).
    pub fn validate(&self) -> Result<CheckedFields, StoreError> {
        let blank = |field: &Option<String>| field.as_deref().is_none_or(|v| v.trim().is_empty());
        if blank(&self.title) && blank(&self.excerpt) && self.content.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let date = match self.date.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(d) => Some(parse_date(d)?),
            None => None,
        };

        Ok(CheckedFields {
            author: parse_author(self.author.as_deref())?,
            status: parse_status(self.status.as_deref())?,
            date,
        })
    }
}

/// Fields submitted when updating a post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostUpdate {
    pub id: PostId,
    pub content: String,
    pub meta: BTreeMap<String, String>,
}

/// A post as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPost {
    pub id: PostId,
    pub author: i64,
    pub date: String,
    pub modified: String,
    pub title: String,
    pub name: String,
    pub excerpt: String,
    pub content: String,
    pub status: String,
    pub post_type: String,
}

/// A named taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub slug: String,
    pub taxonomy: String,
    pub parent: TermId,
}

/// Operations publishing needs from the post store.
pub trait ContentStore {
    /// Insert a new post and return its identifier.
    fn insert_post(&mut self, post: &NewPost) -> Result<PostId, StoreError>;

    /// Update the content and meta of an existing post.
    fn update_post(&mut self, update: &PostUpdate) -> Result<PostId, StoreError>;

    fn get_post(&self, id: PostId) -> Result<Option<StoredPost>, StoreError>;

    /// Terms of `taxonomy` whose name is exactly one of `names`, ordered by id.
    fn find_terms(&self, taxonomy: &str, names: &[String]) -> Result<Vec<Term>, StoreError>;

    /// Create a term and return its identifier.
    fn insert_term(
        &mut self,
        name: &str,
        taxonomy: &str,
        parent: TermId,
    ) -> Result<TermId, StoreError>;
}

fn parse_author(author: Option<&str>) -> Result<i64, StoreError> {
    match author.map(str::trim).filter(|a| !a.is_empty()) {
        None => Ok(0),
        Some(a) => match a.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(StoreError::InvalidAuthor(a.to_string())),
        },
    }
}

fn parse_status(status: Option<&str>) -> Result<&'static str, StoreError> {
    match status.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok("draft"),
        Some(s) => POST_STATUSES
            .iter()
            .find(|known| **known == s)
            .copied()
            .ok_or_else(|| StoreError::InvalidStatus(s.to_string())),
    }
}

fn parse_date(date: &str) -> Result<NaiveDateTime, StoreError> {
    let date = date.trim();
    NaiveDateTime::parse_from_str(date, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|_| StoreError::InvalidDate(date.to_string()))
}

/// Lowercase, dash-separated slug of `text`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
