use std::fs;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tracker_engine::{AssetResponse, CacheError, CacheStorage};

fn response(url: &str, body: &str) -> AssetResponse {
    AssetResponse {
        url: url.to_string(),
        status: 200,
        content_type: Some("text/css".to_string()),
        body: Bytes::from(body.to_string()),
    }
}

#[test]
fn put_then_match_returns_the_snapshot() {
    let temp = TempDir::new().unwrap();
    let storage = CacheStorage::new(temp.path().to_path_buf());
    let cache = storage.open("assets-v1").unwrap();
    let url = "https://host.example/style.css";

    assert_eq!(cache.match_url(url).unwrap(), None);
    cache.put(url, &response(url, "body{}")).unwrap();
    assert_eq!(cache.match_url(url).unwrap(), Some(response(url, "body{}")));

    cache.put(url, &response(url, "p{}")).unwrap();
    assert_eq!(cache.urls().unwrap(), vec![url.to_string()]);
    assert_eq!(&cache.match_url(url).unwrap().unwrap().body[..], b"p{}");

    assert!(cache.delete(url).unwrap());
    assert!(!cache.delete(url).unwrap());
    assert_eq!(cache.match_url(url).unwrap(), None);
}

#[test]
fn keys_skip_files_and_staging_dirs() {
    let temp = TempDir::new().unwrap();
    let storage = CacheStorage::new(temp.path().to_path_buf());
    assert!(storage.keys().unwrap().is_empty());

    storage.open("b-cache").unwrap();
    storage.open("a-cache").unwrap();
    fs::create_dir(temp.path().join(".staging-leftover")).unwrap();
    fs::write(temp.path().join("registration.json"), "{}").unwrap();

    assert_eq!(
        storage.keys().unwrap(),
        vec!["a-cache".to_string(), "b-cache".to_string()]
    );
    assert!(storage.has("a-cache"));
    assert!(!storage.has(".staging-leftover"));
}

#[test]
fn put_all_creates_cache_in_one_step() {
    let temp = TempDir::new().unwrap();
    let storage = CacheStorage::new(temp.path().join("caches"));
    let entries = vec![
        ("https://h.example/".to_string(), response("https://h.example/", "index")),
        ("https://h.example/app.js".to_string(), response("https://h.example/app.js", "js")),
    ];

    let cache = storage.put_all("shell-v1", &entries).unwrap();
    assert_eq!(cache.name(), "shell-v1");
    assert_eq!(cache.urls().unwrap().len(), 2);
    assert_eq!(storage.keys().unwrap(), vec!["shell-v1".to_string()]);

    let leftovers: Vec<_> = fs::read_dir(temp.path().join("caches"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with('.'))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");

    let extra = vec![("https://h.example/x".to_string(), response("https://h.example/x", "x"))];
    storage.put_all("shell-v1", &extra).unwrap();
    assert_eq!(storage.open("shell-v1").unwrap().urls().unwrap().len(), 3);
}

#[test]
fn match_any_searches_caches_in_name_order() {
    let temp = TempDir::new().unwrap();
    let storage = CacheStorage::new(temp.path().to_path_buf());
    let url = "https://h.example/logo.png";
    storage.open("b").unwrap().put(url, &response(url, "from b")).unwrap();
    storage.open("a").unwrap().put(url, &response(url, "from a")).unwrap();

    let hit = storage.match_any(url).unwrap().unwrap();
    assert_eq!(&hit.body[..], b"from a");
    assert_eq!(storage.match_any("https://h.example/none").unwrap(), None);

    assert!(storage.delete("a").unwrap());
    assert!(!storage.delete("a").unwrap());
    assert_eq!(&storage.match_any(url).unwrap().unwrap().body[..], b"from b");
}

#[test]
fn invalid_cache_names_are_rejected() {
    let temp = TempDir::new().unwrap();
    let storage = CacheStorage::new(temp.path().to_path_buf());
    for name in ["", "../escape", ".hidden", "a/b"] {
        assert!(matches!(storage.open(name), Err(CacheError::InvalidName(_))), "{name}");
    }
}
