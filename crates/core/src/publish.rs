//! Publishing markdown files to the post store.
//!
//! Each operation handles exactly one file: read and parse it, map the front
//! matter onto store fields, run the store operation, and only after the store
//! confirmed success write anything back to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::frontmatter::{
    DATE_KEY, Document, FrontmatterParseError, LINE_ENDING, parse, scalar_to_string,
    serialize_parts,
};
use crate::post::{
    CreateRequest, ReconcileError, reconcile_create, reconcile_update, resolve_categories,
    stamp_created,
};
use crate::store::{ContentStore, DATE_FORMAT, PostId, StoreError, TermId};

/// Extension given to files created by [`new_post_file`].
pub const MARKDOWN_EXT: &str = ".md";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("the file argument is missing")]
    MissingFileArgument,

    #[error("the specified file does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("file already exists: {0} (use --force to overwrite it)")]
    FileExists(PathBuf),

    #[error("ID {0} already exists in the file, add --force to republish it")]
    DuplicateIdentifier(String),

    #[error("ID does not exist or is not set in the file")]
    MissingIdentifier,

    #[error("failed to parse front matter in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: FrontmatterParseError,
    },

    #[error("post store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<ReconcileError> for PublishError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::DuplicateIdentifier(id) => Self::DuplicateIdentifier(id),
            ReconcileError::MissingIdentifier => Self::MissingIdentifier,
        }
    }
}

/// Result of a create or update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishOutcome {
    /// Identifier assigned or reused by the store.
    pub id: PostId,
    pub file: PathBuf,
    /// Publication date written back to the file (create only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Category term ids attached to the post (create only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<TermId>,
}

/// A create that passed every check that needs no store.
#[derive(Debug, Clone)]
pub struct PendingCreate {
    path: PathBuf,
    doc: Document,
    request: CreateRequest,
}

/// Read `path` and check it can be published, without touching a store.
///
/// Fails with [`PublishError::DuplicateIdentifier`] when the file already has
/// an `ID`, unless `force` is set, and with [`PublishError::Store`] when a post
/// field would be refused.
pub fn prepare_create(path: &Path, force: bool) -> Result<PendingCreate, PublishError> {
    let doc = read_document(path)?;
    let request = reconcile_create(&doc, force)?;
    request.post.validate()?;
    if !request.remaining.is_empty() {
        debug!(
            "not submitted: {}",
            request
                .remaining
                .iter()
                .filter_map(|(k, _)| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(PendingCreate { path: path.to_path_buf(), doc, request })
}

impl PendingCreate {
    /// Resolve categories, insert the post and stamp the file with its `ID`.
    pub fn submit<S>(self, store: &mut S) -> Result<PublishOutcome, PublishError>
    where
        S: ContentStore + ?Sized,
    {
        let Self { path, doc, mut request } = self;

        request.post.categories = resolve_categories(store, &request.categories)?;
        let id = store.insert_post(&request.post)?;
        let created = store.get_post(id)?.ok_or(StoreError::InvalidPostId(id))?.date;

        let stamped = stamp_created(&doc.metadata, id, &created);
        write_file(&path, &serialize_parts(&stamped, &doc.content))?;
        info!("published {} as post {}", path.display(), id);

        Ok(PublishOutcome {
            id,
            date: stamped.get_set(DATE_KEY).and_then(scalar_to_string),
            categories: request.post.categories,
            file: path,
        })
    }
}

/// Publish `path` as a new post and stamp the file with the new `ID`.
///
/// Nothing reaches the store unless [`prepare_create`] succeeds.
pub fn create_post<S>(store: &mut S, path: &Path, force: bool) -> Result<PublishOutcome, PublishError>
where
    S: ContentStore + ?Sized,
{
    prepare_create(path, force)?.submit(store)
}

/// Push the body (and description) of `path` to the post named by its `ID`.
///
/// The file itself is left unchanged.
pub fn update_post<S>(store: &mut S, path: &Path) -> Result<PublishOutcome, PublishError>
where
    S: ContentStore + ?Sized,
{
    let doc = read_document(path)?;
    let request = reconcile_update(&doc)?;
    let id = store.update_post(&request.update)?;
    info!("updated post {} from {}", id, path.display());

    Ok(PublishOutcome { id, file: path.to_path_buf(), date: None, categories: Vec::new() })
}

/// Write a front matter template for a new post.
///
/// `.md` is appended unless `name` already ends with it. An existing file is
/// only replaced when `force` is set.
pub fn new_post_file(name: &str, force: bool, now: NaiveDateTime) -> Result<PathBuf, PublishError> {
    if name.trim().is_empty() {
        return Err(PublishError::MissingFileArgument);
    }

    let path = if name.ends_with(MARKDOWN_EXT) {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{name}{MARKDOWN_EXT}"))
    };

    if path.exists() && !force {
        return Err(PublishError::FileExists(path));
    }

    write_file(&path, &post_template(now))?;
    info!("created {}", path.display());
    Ok(path)
}

/// Front matter skeleton listing every key `create` understands.
pub fn post_template(now: NaiveDateTime) -> String {
    let date_line = format!("post_date: {}", now.format(DATE_FORMAT));
    let lines = [
        "---",
        "post_title: ",
        "post_author: ",
        "post_type: post",
        "post_status: publish",
        date_line.as_str(),
        "tags_input:",
        "  - ",
        "post_category: ",
        "  - ",
        "post_excerpt: ",
        "description: ",
        "---",
    ];

    let mut out = lines.join(LINE_ENDING);
    out.push_str(LINE_ENDING);
    out.push_str(LINE_ENDING);
    out
}

/// Read and parse a markdown file.
pub fn read_document(path: &Path) -> Result<Document, PublishError> {
    if !path.is_file() {
        return Err(PublishError::FileNotFound(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path).map_err(|source| PublishError::Io {
        action: "read",
        path: path.to_path_buf(),
        source,
    })?;

    parse(&raw).map_err(|source| PublishError::Parse { path: path.to_path_buf(), source })
}

fn write_file(path: &Path, contents: &str) -> Result<(), PublishError> {
    fs::write(path, contents).map_err(|source| PublishError::Io {
        action: "write",
        path: path.to_path_buf(),
        source,
    })
}
