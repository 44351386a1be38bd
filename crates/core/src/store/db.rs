//! SQLite-backed post store.

use std::path::Path;

use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use tracing::debug;

use super::schema::init_schema;
use super::{
    CATEGORY_TAXONOMY, CheckedFields, ContentStore, DATE_FORMAT, NewPost, PostId, PostUpdate,
    ROOT_TERM, StoreError, StoredPost, TAG_TAXONOMY, Term, TermId, slugify,
};

/// Post store database handle.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Terms of `taxonomy` attached to a post, in attachment order.
    pub fn post_terms(&self, post_id: PostId, taxonomy: &str) -> Result<Vec<Term>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT t.term_id, t.name, t.slug, t.taxonomy, t.parent
             FROM terms t JOIN term_relationships r ON r.term_id = t.term_id
             WHERE r.object_id = ?1 AND t.taxonomy = ?2
             ORDER BY r.term_order, t.term_id",
        )?;
        let terms = stmt
            .query_map(params![post_id, taxonomy], Self::row_to_term)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(terms)
    }

    /// Value of a post meta key.
    pub fn post_meta(&self, post_id: PostId, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                "SELECT meta_value FROM postmeta WHERE post_id = ?1 AND meta_key = ?2
                 ORDER BY meta_id DESC LIMIT 1",
                params![post_id, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Number of posts in the store.
    pub fn count_posts(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?)
    }

    fn row_to_post(row: &rusqlite::Row) -> Result<StoredPost, rusqlite::Error> {
        Ok(StoredPost {
            id: row.get(0)?,
            author: row.get(1)?,
            date: row.get(2)?,
            content: row.get(3)?,
            title: row.get(4)?,
            excerpt: row.get(5)?,
            status: row.get(6)?,
            name: row.get(7)?,
            modified: row.get(8)?,
            post_type: row.get(9)?,
        })
    }

    fn row_to_term(row: &rusqlite::Row) -> Result<Term, rusqlite::Error> {
        Ok(Term {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            taxonomy: row.get(3)?,
            parent: row.get(4)?,
        })
    }
}

impl ContentStore for SqliteStore {
    fn insert_post(&mut self, post: &NewPost) -> Result<PostId, StoreError> {
        let CheckedFields { author, status, date } = post.validate()?;
        let title = post.title.as_deref().unwrap_or_default();
        let excerpt = post.excerpt.as_deref().unwrap_or_default();
        let now = Local::now().naive_local();
        let date = date.unwrap_or(now);
        let post_type = post
            .post_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("post");

        let tx = self.conn.transaction()?;

        let slug = match post.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => slugify(name),
            None => slugify(title),
        };
        let slug = unique_post_name(&tx, &slug, post_type)?;

        tx.execute(
            "INSERT INTO posts (post_author, post_date, post_content, post_title, post_excerpt,
                                post_status, post_name, post_modified, post_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                author,
                date.format(DATE_FORMAT).to_string(),
                post.content,
                title,
                excerpt,
                status,
                slug,
                now.format(DATE_FORMAT).to_string(),
                post_type,
            ],
        )?;
        let id = tx.last_insert_rowid();

        for (order, term_id) in post.categories.iter().enumerate() {
            attach_term(&tx, id, *term_id, order)?;
        }

        for (order, tag) in post.tags.iter().enumerate() {
            let term_id = match find_term_id(&tx, TAG_TAXONOMY, tag)? {
                Some(existing) => existing,
                None => create_term(&tx, tag, TAG_TAXONOMY, ROOT_TERM)?,
            };
            attach_term(&tx, id, term_id, order)?;
        }

        for (key, value) in &post.meta {
            set_meta(&tx, id, key, value)?;
        }

        tx.commit()?;
        debug!(
            "inserted post {} ({} categories, {} tags, {} meta)",
            id,
            post.categories.len(),
            post.tags.len(),
            post.meta.len()
        );
        Ok(id)
    }

    fn update_post(&mut self, update: &PostUpdate) -> Result<PostId, StoreError> {
        let tx = self.conn.transaction()?;

        let rows = tx.execute(
            "UPDATE posts SET post_content = ?1, post_modified = ?2 WHERE ID = ?3",
            params![
                update.content,
                Local::now().naive_local().format(DATE_FORMAT).to_string(),
                update.id,
            ],
        )?;
        if rows == 0 {
            return Err(StoreError::InvalidPostId(update.id));
        }

        for (key, value) in &update.meta {
            set_meta(&tx, update.id, key, value)?;
        }

        tx.commit()?;
        debug!("updated post {} ({} meta)", update.id, update.meta.len());
        Ok(update.id)
    }

    fn get_post(&self, id: PostId) -> Result<Option<StoredPost>, StoreError> {
        self.conn
            .query_row(
                "SELECT ID, post_author, post_date, post_content, post_title, post_excerpt,
                        post_status, post_name, post_modified, post_type
                 FROM posts WHERE ID = ?1",
                [id],
                Self::row_to_post,
            )
            .optional()
            .map_err(Into::into)
    }

    fn find_terms(&self, taxonomy: &str, names: &[String]) -> Result<Vec<Term>, StoreError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "SELECT term_id, name, slug, taxonomy, parent FROM terms
             WHERE taxonomy = ? AND name IN ({placeholders})
             ORDER BY term_id"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let args = std::iter::once(taxonomy).chain(names.iter().map(String::as_str));
        let terms = stmt
            .query_map(params_from_iter(args), Self::row_to_term)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(terms)
    }

    fn insert_term(
        &mut self,
        name: &str,
        taxonomy: &str,
        parent: TermId,
    ) -> Result<TermId, StoreError> {
        let tx = self.conn.transaction()?;
        let id = create_term(&tx, name, taxonomy, parent)?;
        tx.commit()?;
        if taxonomy == CATEGORY_TAXONOMY {
            debug!("created category '{}' as term {}", name, id);
        }
        Ok(id)
    }
}

/// Append `-2`, `-3`, ... until the slug is free for this post type.
fn unique_post_name(tx: &Transaction, slug: &str, post_type: &str) -> Result<String, StoreError> {
    if slug.is_empty() {
        return Ok(String::new());
    }

    let taken = |candidate: &str| -> Result<bool, StoreError> {
        Ok(tx.query_row(
            "SELECT COUNT(*) > 0 FROM posts WHERE post_name = ?1 AND post_type = ?2",
            params![candidate, post_type],
            |row| row.get(0),
        )?)
    };

    if !taken(slug)? {
        return Ok(slug.to_string());
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{slug}-{suffix}");
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

fn find_term_id(tx: &Transaction, taxonomy: &str, name: &str) -> Result<Option<TermId>, StoreError> {
    tx.query_row(
        "SELECT term_id FROM terms WHERE taxonomy = ?1 AND name = ?2 ORDER BY term_id LIMIT 1",
        params![taxonomy, name],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

fn create_term(
    tx: &Transaction,
    name: &str,
    taxonomy: &str,
    parent: TermId,
) -> Result<TermId, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyTermName);
    }
    tx.execute(
        "INSERT INTO terms (name, slug, taxonomy, parent) VALUES (?1, ?2, ?3, ?4)",
        params![name, slugify(name), taxonomy, parent],
    )?;
    Ok(tx.last_insert_rowid())
}

fn attach_term(
    tx: &Transaction,
    post_id: PostId,
    term_id: TermId,
    order: usize,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT OR IGNORE INTO term_relationships (object_id, term_id, term_order)
         VALUES (?1, ?2, ?3)",
        params![post_id, term_id, order as i64],
    )?;
    Ok(())
}

/// Replace every value of `key` on the post with `value`.
fn set_meta(tx: &Transaction, post_id: PostId, key: &str, value: &str) -> Result<(), StoreError> {
    tx.execute("DELETE FROM postmeta WHERE post_id = ?1 AND meta_key = ?2", params![post_id, key])?;
    tx.execute(
        "INSERT INTO postmeta (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
        params![post_id, key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::collections::BTreeMap;

    fn sample_post(title: &str) -> NewPost {
        NewPost {
            title: Some(title.to_string()),
            content: "Some body".to_string(),
            status: Some("publish".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_and_get_post() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_post(&sample_post("Useful Git commands")).unwrap();
        assert!(id > 0);

        let post = store.get_post(id).unwrap().unwrap();
        assert_eq!(post.title, "Useful Git commands");
        assert_eq!(post.name, "useful-git-commands");
        assert_eq!(post.status, "publish");
        assert_eq!(post.post_type, "post");
        assert_eq!(post.author, 0);
        assert!(NaiveDateTime::parse_from_str(&post.date, DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_get_missing_post() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_post(42).unwrap().is_none());
    }

    #[test]
    fn test_explicit_fields_are_kept() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let post = NewPost {
            name: Some("custom-slug".into()),
            author: Some("8".into()),
            post_type: Some("page".into()),
            date: Some("2020-01-29 10:11:12".into()),
            excerpt: Some("Short".into()),
            ..sample_post("Title")
        };
        let id = store.insert_post(&post).unwrap();
        let stored = store.get_post(id).unwrap().unwrap();
        assert_eq!(stored.name, "custom-slug");
        assert_eq!(stored.author, 8);
        assert_eq!(stored.post_type, "page");
        assert_eq!(stored.date, "2020-01-29 10:11:12");
        assert_eq!(stored.excerpt, "Short");
    }

    #[test]
    fn test_date_only_is_midnight() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let post = NewPost { date: Some("2021-03-04".into()), ..sample_post("T") };
        let id = store.insert_post(&post).unwrap();
        assert_eq!(store.get_post(id).unwrap().unwrap().date, "2021-03-04 00:00:00");
    }

    #[test]
    fn test_duplicate_slugs_get_suffix() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let a = store.insert_post(&sample_post("Hello")).unwrap();
        let b = store.insert_post(&sample_post("Hello")).unwrap();
        let c = store.insert_post(&sample_post("Hello")).unwrap();
        assert_eq!(store.get_post(a).unwrap().unwrap().name, "hello");
        assert_eq!(store.get_post(b).unwrap().unwrap().name, "hello-2");
        assert_eq!(store.get_post(c).unwrap().unwrap().name, "hello-3");
    }

    #[test]
    fn test_validation_errors() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let empty = NewPost::default();
        assert!(matches!(store.insert_post(&empty), Err(StoreError::EmptyContent)));

        let bad_author = NewPost { author: Some("bob".into()), ..sample_post("T") };
        assert!(matches!(store.insert_post(&bad_author), Err(StoreError::InvalidAuthor(a)) if a == "bob"));

        let bad_status = NewPost { status: Some("live".into()), ..sample_post("T") };
        assert!(matches!(store.insert_post(&bad_status), Err(StoreError::InvalidStatus(_))));

        let bad_date = NewPost { date: Some("yesterday".into()), ..sample_post("T") };
        assert!(matches!(store.insert_post(&bad_date), Err(StoreError::InvalidDate(_))));

        assert_eq!(store.count_posts().unwrap(), 0);
    }

    #[test]
    fn test_categories_tags_and_meta_attached() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let git = store.insert_term("git", CATEGORY_TAXONOMY, ROOT_TERM).unwrap();
        let tools = store.insert_term("tools", CATEGORY_TAXONOMY, ROOT_TERM).unwrap();

        let mut meta = BTreeMap::new();
        meta.insert("_yoast_wpseo_metadesc".to_string(), "About git".to_string());
        let post = NewPost {
            categories: vec![tools, git],
            tags: vec!["basic".into(), "cli".into()],
            meta,
            ..sample_post("Git")
        };
        let id = store.insert_post(&post).unwrap();

        let cats: Vec<_> = store
            .post_terms(id, CATEGORY_TAXONOMY)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(cats, vec![tools, git]);

        let tags: Vec<_> =
            store.post_terms(id, TAG_TAXONOMY).unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(tags, vec!["basic", "cli"]);

        assert_eq!(
            store.post_meta(id, "_yoast_wpseo_metadesc").unwrap().as_deref(),
            Some("About git")
        );
    }

    #[test]
    fn test_tags_are_reused() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let a = store
            .insert_post(&NewPost { tags: vec!["rust".into()], ..sample_post("A") })
            .unwrap();
        let b = store
            .insert_post(&NewPost { tags: vec!["rust".into()], ..sample_post("B") })
            .unwrap();
        let ta = store.post_terms(a, TAG_TAXONOMY).unwrap();
        let tb = store.post_terms(b, TAG_TAXONOMY).unwrap();
        assert_eq!(ta[0].id, tb[0].id);
        assert_eq!(store.find_terms(TAG_TAXONOMY, &["rust".into()]).unwrap().len(), 1);
    }

    #[test]
    fn test_find_terms_is_exact_and_ordered() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = store.insert_term("git", CATEGORY_TAXONOMY, ROOT_TERM).unwrap();
        store.insert_term("Git", CATEGORY_TAXONOMY, ROOT_TERM).unwrap();
        store.insert_term("git", TAG_TAXONOMY, ROOT_TERM).unwrap();
        let second = store.insert_term("git", CATEGORY_TAXONOMY, ROOT_TERM).unwrap();

        let found = store.find_terms(CATEGORY_TAXONOMY, &["git".into()]).unwrap();
        let ids: Vec<_> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert!(found.iter().all(|t| t.slug == "git" && t.parent == ROOT_TERM));

        assert!(store.find_terms(CATEGORY_TAXONOMY, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_term_name_rejected() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.insert_term("  ", CATEGORY_TAXONOMY, ROOT_TERM),
            Err(StoreError::EmptyTermName)
        ));
    }

    #[test]
    fn test_update_post_replaces_content_and_meta() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut meta = BTreeMap::new();
        meta.insert("_yoast_wpseo_metadesc".to_string(), "old".to_string());
        let id = store.insert_post(&NewPost { meta, ..sample_post("T") }).unwrap();

        let mut meta = BTreeMap::new();
        meta.insert("_yoast_wpseo_metadesc".to_string(), "new".to_string());
        let updated = store
            .update_post(&PostUpdate { id, content: "Changed".into(), meta })
            .unwrap();
        assert_eq!(updated, id);

        let post = store.get_post(id).unwrap().unwrap();
        assert_eq!(post.content, "Changed");
        assert_eq!(post.title, "T");
        assert_eq!(store.post_meta(id, "_yoast_wpseo_metadesc").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_update_unknown_post() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .update_post(&PostUpdate { id: 77, content: "x".into(), meta: BTreeMap::new() })
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPostId(77)));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let id = {
            let mut store = SqliteStore::open(&path).unwrap();
            store.insert_post(&sample_post("Persisted")).unwrap()
        };
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get_post(id).unwrap().unwrap().title, "Persisted");
    }
}
