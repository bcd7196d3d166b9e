mod common;

use common::record;
use hub_sync_core::index::{build_index, unix_now, write_index, IndexDocument};
use std::fs;
use tempfile::tempdir;

const BASE: &str = "https://github.com/espanso/hub/releases/latest/download";

#[test]
fn index_covers_the_whole_catalog_in_order() {
    let mut foo = record("foo", "1.0.0");
    foo.tags = vec!["emoji".to_string()];
    let catalog = vec![record("bar", "2.0.0"), foo];

    let index = build_index(&catalog, BASE, 1_700_000_000);

    assert_eq!(index.last_update, 1_700_000_000);
    let names: Vec<&str> = index.packages.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["bar", "foo"]);

    let foo = &index.packages[1];
    assert_eq!(foo.version, "1.0.0");
    assert_eq!(foo.title, "foo title");
    assert_eq!(foo.description, "The foo package");
    assert_eq!(foo.author, "Jane Doe");
    assert_eq!(foo.tags, vec!["emoji"]);
    assert_eq!(foo.archive_url, format!("{BASE}/foo-1.0.0.zip"));
    assert_eq!(foo.archive_sha256_url, format!("{BASE}/foo-1.0.0-sha256.txt"));
}

#[test]
fn trailing_slash_on_base_url_is_not_doubled() {
    let index = build_index(&[record("foo", "1.0.0")], &format!("{BASE}/"), 0);
    assert_eq!(index.packages[0].archive_url, format!("{BASE}/foo-1.0.0.zip"));
}

#[test]
fn empty_catalog_gives_empty_package_list() {
    let index = build_index(&[], BASE, 42);
    assert!(index.packages.is_empty());
    assert_eq!(index.last_update, 42);
}

#[test]
fn written_index_uses_the_published_field_names() {
    let scratch = tempdir().unwrap();
    let index = build_index(&[record("foo", "1.0.0")], BASE, 1234);

    let path = write_index(&index, scratch.path()).expect("index should be written");
    assert_eq!(path, scratch.path().join("package_index.json"));

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["last_update"], 1234);
    let entry = &raw["packages"][0];
    for key in [
        "name",
        "author",
        "description",
        "title",
        "version",
        "tags",
        "archive_url",
        "archive_sha256_url",
    ] {
        assert!(entry.get(key).is_some(), "missing key {key}");
    }

    let parsed: IndexDocument = serde_json::from_value(raw).unwrap();
    assert_eq!(parsed, index);
}

#[test]
fn unix_now_is_after_2020() {
    assert!(unix_now() > 1_577_836_800);
}
