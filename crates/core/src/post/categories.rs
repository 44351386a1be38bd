//! Category name resolution against the store's taxonomy.

use tracing::{debug, info};

use crate::store::{CATEGORY_TAXONOMY, ContentStore, ROOT_TERM, StoreError, TermId};

/// Turn category names into term ids, creating the missing categories.
///
/// Names that already exist keep their term id and come first, in the order
/// they were requested; names without a match are created as top-level
/// categories and appended in request order. When several categories share a
/// name the first lookup match (the lowest term id) is used; which of the
/// duplicates was meant is not knowable from the name alone.
pub fn resolve_categories<S>(store: &mut S, names: &[String]) -> Result<Vec<TermId>, StoreError>
where
    S: ContentStore + ?Sized,
{
    let mut wanted: Vec<String> = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !wanted.iter().any(|w| w == name) {
            wanted.push(name.to_string());
        }
    }
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let existing = store.find_terms(CATEGORY_TAXONOMY, &wanted)?;

    let mut ids = Vec::with_capacity(wanted.len());
    let mut missing = Vec::new();
    for name in &wanted {
        match existing.iter().find(|term| &term.name == name) {
            Some(term) => {
                debug!("category '{}' is term {}", name, term.id);
                ids.push(term.id);
            }
            None => missing.push(name),
        }
    }

    for name in missing {
        let id = store.insert_term(name, CATEGORY_TAXONOMY, ROOT_TERM)?;
        info!("created category '{}' (term {})", name, id);
        ids.push(id);
    }

    Ok(ids)
}
