//! Integration tests for ConfigStore reload behavior.

use belbio_conf::config::{ConfigLoader, ConfigPaths, ConfigStore, FileRole};
use belbio_conf::error::ErrorCode;
use belbio_conf::paths::{MAIN_FILE_NAMES, SECRETS_FILE_NAMES};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// Store rooted at a fresh project directory with an empty home.
fn create_store(temp: &TempDir) -> ConfigStore {
    for dir in temp.path().ancestors().skip(1) {
        for name in MAIN_FILE_NAMES.project.iter().chain(SECRETS_FILE_NAMES.project) {
            assert!(!dir.join(name).exists(), "stray {} in {}", name, dir.display());
        }
    }
    let project = temp.path().join("project");
    let home = temp.path().join("home");
    fs::create_dir_all(&project).unwrap();
    fs::create_dir_all(&home).unwrap();

    let paths = ConfigPaths::with_dirs(project, Some(home));
    let loader = ConfigLoader::new(
        paths,
        json!({"bel_api": {"servers": {"api_url": "http://localhost:8181"}}}),
    );
    ConfigStore::open(loader).expect("Failed to open config store")
}

#[test]
fn test_reload_picks_up_new_file() {
    let temp = TempDir::new().unwrap();
    let store = create_store(&temp);
    assert!(store.current().main_source().is_none());

    fs::write(
        temp.path().join("project/belbio_conf.yaml"),
        "bel_api:\n  servers:\n    api_url: https://api.bel.bio\n",
    )
    .unwrap();
    let reloaded = store.reload().unwrap();

    assert!(Arc::ptr_eq(&reloaded, &store.current()));
    assert_eq!(
        store.current().get("bel_api.servers.api_url"),
        Some(&json!("https://api.bel.bio"))
    );
}

#[test]
fn test_reload_picks_up_secrets_and_their_removal() {
    let temp = TempDir::new().unwrap();
    let store = create_store(&temp);
    let secrets = temp.path().join("home/.belbio_secrets");

    fs::write(&secrets, "arangodb_password: hunter2\n").unwrap();
    store.reload().unwrap();
    assert_eq!(
        store.current().secret("arangodb_password"),
        Some(&json!("hunter2"))
    );

    fs::remove_file(&secrets).unwrap();
    store.reload().unwrap();
    assert!(store.current().secrets().is_none());
}

#[test]
fn test_failed_reload_keeps_previous_snapshot() {
    let temp = TempDir::new().unwrap();
    let store = create_store(&temp);
    let path = temp.path().join("project/belbio_conf.yaml");

    fs::write(&path, "bel_api:\n  servers:\n    api_url: https://a.example\n").unwrap();
    store.reload().unwrap();
    let before = store.current();

    fs::write(&path, "bel_api: [\n").unwrap();
    let err = store.reload().unwrap_err();
    assert_eq!(err.code(), ErrorCode::ParseError);

    let after = store.current();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(
        after.get("bel_api.servers.api_url"),
        Some(&json!("https://a.example"))
    );
}

#[test]
fn test_old_snapshots_are_unaffected_by_reload() {
    let temp = TempDir::new().unwrap();
    let store = create_store(&temp);
    let held = store.current();

    fs::write(
        temp.path().join("project/belbio_conf.yaml"),
        "bel_api:\n  servers:\n    api_url: https://b.example\n",
    )
    .unwrap();
    store.reload().unwrap();

    assert_eq!(
        held.get("bel_api.servers.api_url"),
        Some(&json!("http://localhost:8181"))
    );
    assert!(held.resolved_at() <= store.current().resolved_at());
}

#[test]
fn test_concurrent_readers_see_whole_snapshots() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(create_store(&temp));
    let path = temp.path().join("project/belbio_conf.yaml");

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = store.current();
                    let url = snapshot.get("bel_api.servers.api_url").cloned();
                    let marker = snapshot.get("marker").cloned();
                    // Both keys come from the same file, so they change together.
                    match url.as_ref().and_then(|u| u.as_str()) {
                        Some("http://localhost:8181") => assert_eq!(marker, None),
                        Some(other) => {
                            let n = other.trim_start_matches("https://v");
                            assert_eq!(marker, Some(json!(n)));
                        }
                        None => panic!("api_url missing"),
                    }
                }
            })
        })
        .collect();

    for i in 0..20 {
        fs::write(
            &path,
            format!("marker: '{i}'\nbel_api:\n  servers:\n    api_url: https://v{i}\n"),
        )
        .unwrap();
        store.reload().unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_watch_paths_cover_search_dir_and_home() {
    let temp = TempDir::new().unwrap();
    let store = create_store(&temp);
    let watch = store.watch_paths();

    let project = temp.path().join("project");
    let mut expected: Vec<_> = project.ancestors().map(|d| d.to_path_buf()).collect();
    expected.push(temp.path().join("home"));
    // Every directory the upward search visits, then the home directory
    assert_eq!(watch.dirs, expected);
    assert!(watch.dirs.contains(&temp.path().to_path_buf()));
    assert_eq!(
        watch.role_of(&temp.path().join("project/belbio_conf.yml")),
        Some(FileRole::Main)
    );
    assert_eq!(
        watch.role_of(&temp.path().join("home/.belbio_secrets")),
        Some(FileRole::Secrets)
    );
}
