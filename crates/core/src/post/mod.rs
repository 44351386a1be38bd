//! Mapping front matter onto post store fields.
//!
//! Reconciliation decides which front matter keys are submitted to the store
//! and which stay in the file only. It never mutates the parsed document:
//! every step returns the claimed fields alongside the remaining metadata.

pub mod categories;
pub mod reconcile;

use thiserror::Error;

pub use categories::resolve_categories;
pub use reconcile::{
    CreateRequest, POST_FIELD_KEYS, UpdateRequest, YOAST_METADESC_KEY, reconcile_create,
    reconcile_update, stamp_created,
};

/// Errors raised while mapping front matter onto a store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("ID {0} already exists in the file, add --force to republish it")]
    DuplicateIdentifier(String),

    #[error("ID does not exist or is not set in the file")]
    MissingIdentifier,
}
