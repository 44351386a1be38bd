use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use wpmd_core::config::loader::ConfigLoader;

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn load_default_profile_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
database = "/tmp/blog/wpmd.db"

[logging]
level = "warn"
"#;

    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.active_profile, "default");
    assert_eq!(rc.database.display().to_string(), "/tmp/blog/wpmd.db");
    assert_eq!(rc.logging.level, "warn");
    assert!(rc.logging.file.is_none());
}

#[test]
fn load_with_profile_override_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("wpmd/config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
database = "/tmp/def.db"

[profiles.staging]
database = "/tmp/staging.db"
"#;
    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), Some("staging")).expect("should load");
    assert_eq!(rc.active_profile, "staging");
    assert_eq!(rc.database.display().to_string(), "/tmp/staging.db");
}

#[test]
fn profile_defaults_to_default() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    write_file(
        &cfg_path,
        "version = 1\n[profiles.default]\ndatabase = \"/tmp/a.db\"\n[profiles.other]\ndatabase = \"/tmp/b.db\"\n",
    );

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.active_profile, "default");
}
