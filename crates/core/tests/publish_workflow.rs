use std::fs;
use tempfile::tempdir;
use wpmd_core::frontmatter::parse;
use wpmd_core::post::YOAST_METADESC_KEY;
use wpmd_core::publish::{PublishError, create_post, new_post_file, update_post};
use wpmd_core::store::{CATEGORY_TAXONOMY, ContentStore, ROOT_TERM, SqliteStore};

#[test]
fn template_to_published_post() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("blog.db");
    let stem = tmp.path().join("useful-git-commands");

    let now = chrono::NaiveDate::from_ymd_opt(2024, 2, 3)
        .unwrap()
        .and_hms_opt(8, 15, 0)
        .unwrap();
    let path = new_post_file(stem.to_str().unwrap(), false, now).unwrap();

    // Fill in the template the way an author would
    let filled = fs::read_to_string(&path)
        .unwrap()
        .replace("post_title: ", "post_title: Useful Git commands")
        .replace("tags_input:\n  - ", "tags_input:\n  - basic")
        .replace("post_category: \n  - ", "post_category:\n  - git")
        .replace("description: ", "description: Commands worth remembering")
        + "Use `git log --oneline` for a compact history.\n";
    fs::write(&path, &filled).unwrap();

    let git = {
        let mut store = SqliteStore::open(&db_path).unwrap();
        store.insert_term("git", CATEGORY_TAXONOMY, ROOT_TERM).unwrap()
    };

    let mut store = SqliteStore::open(&db_path).unwrap();
    let created = create_post(&mut store, &path, false).unwrap();
    assert_eq!(created.categories, vec![git]);
    assert_eq!(created.date.as_deref(), Some("2024-02-03 08:15:00"));

    let post = store.get_post(created.id).unwrap().unwrap();
    assert_eq!(post.title, "Useful Git commands");
    assert_eq!(post.status, "publish");
    assert_eq!(post.content, "Use `git log --oneline` for a compact history.");
    assert_eq!(
        store.post_meta(created.id, YOAST_METADESC_KEY).unwrap().as_deref(),
        Some("Commands worth remembering")
    );

    // Publishing the same file twice needs --force
    assert!(matches!(
        create_post(&mut store, &path, false),
        Err(PublishError::DuplicateIdentifier(_))
    ));

    let stamped = fs::read_to_string(&path).unwrap();
    assert!(stamped.starts_with(&format!("---\nID: {}\n", created.id)));
    let doc = parse(&stamped).unwrap();
    assert_eq!(doc.metadata.id(), Some(created.id));

    fs::write(&path, stamped.replace("compact history", "one-line history")).unwrap();
    let updated = update_post(&mut store, &path).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(
        store.get_post(created.id).unwrap().unwrap().content,
        "Use `git log --oneline` for a one-line history."
    );
    assert_eq!(store.count_posts().unwrap(), 1);
}
