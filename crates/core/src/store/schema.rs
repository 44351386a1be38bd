//! SQLite schema definition.

use rusqlite::Connection;
use thiserror::Error;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema version {found} is newer than supported {supported}")]
    VersionTooNew { found: i32, supported: i32 },
}

/// Create the schema on a fresh database, or check an existing one.
pub fn init_schema(conn: &Connection) -> Result<(), SchemaError> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if version > SCHEMA_VERSION {
        return Err(SchemaError::VersionTooNew {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 =
        conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
        [version],
    )?;
    Ok(())
}

fn create_schema_v1(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(
        r#"
        CREATE TABLE schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        CREATE TABLE posts (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            post_author INTEGER NOT NULL DEFAULT 0,
            post_date TEXT NOT NULL,
            post_content TEXT NOT NULL DEFAULT '',
            post_title TEXT NOT NULL DEFAULT '',
            post_excerpt TEXT NOT NULL DEFAULT '',
            post_status TEXT NOT NULL DEFAULT 'draft',
            post_name TEXT NOT NULL DEFAULT '',
            post_modified TEXT NOT NULL,
            post_type TEXT NOT NULL DEFAULT 'post'
        );

        CREATE INDEX idx_posts_name ON posts(post_name);
        CREATE INDEX idx_posts_type_status ON posts(post_type, post_status);

        -- Categories, tags and any other taxonomy share one table
        CREATE TABLE terms (
            term_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            taxonomy TEXT NOT NULL,
            parent INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX idx_terms_taxonomy_name ON terms(taxonomy, name);

        CREATE TABLE term_relationships (
            object_id INTEGER NOT NULL REFERENCES posts(ID) ON DELETE CASCADE,
            term_id INTEGER NOT NULL REFERENCES terms(term_id) ON DELETE CASCADE,
            term_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (object_id, term_id)
        );

        CREATE TABLE postmeta (
            meta_id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id INTEGER NOT NULL REFERENCES posts(ID) ON DELETE CASCADE,
            meta_key TEXT NOT NULL,
            meta_value TEXT
        );

        CREATE INDEX idx_postmeta_post_key ON postmeta(post_id, meta_key);
        "#,
    )?;

    Ok(())
}
