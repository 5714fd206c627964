use mediadupe::duplicates::{DuplicateFinder, DuplicateGroup, DuplicateIndex};
use mediadupe::export::{ExportError, ExportTarget};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_scan_export_import_round_trip() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"same bytes").unwrap();
    fs::write(dir.path().join("b.jpg"), b"same bytes").unwrap();
    fs::write(dir.path().join("c.avi"), b"other").unwrap();

    let pattern = format!("{}/**", dir.path().display());
    let (index, _) = DuplicateFinder::with_defaults().scan(&pattern).unwrap();

    let out = dir.path().join("index.json");
    index.export(&ExportTarget::File(out.clone())).unwrap();
    let imported = DuplicateIndex::load(&out).unwrap();

    assert_eq!(imported, index);
    assert_eq!(imported.duplicate_group_count(), 1);
}

#[test]
fn test_exported_document_shape() {
    let mut index = DuplicateIndex::new();
    index.record("900150983cd24fb0d6963f7d28e17f72", "a.jpg", 3);
    index.record("900150983cd24fb0d6963f7d28e17f72", "b.jpg", 3);

    let json = index.to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let group = &value["900150983cd24fb0d6963f7d28e17f72"];
    assert_eq!(group["filenames"], serde_json::json!(["a.jpg", "b.jpg"]));
    assert_eq!(group["count"], 2);
    assert_eq!(group["size"], 3);
    assert_eq!(group["total_size"], 6);
    assert!(json.contains("\n    \"900150983cd24fb0d6963f7d28e17f72\": {"));
}

#[test]
fn test_import_document_written_by_hand() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.json");
    fs::write(
        &path,
        r#"{
    "d41d8cd98f00b204e9800998ecf8427e": {
        "filenames": ["x/empty1.thm", "x/empty2.thm"],
        "count": 2,
        "size": 0,
        "total_size": 0
    }
}"#,
    )
    .unwrap();

    let index = DuplicateIndex::load(&path).unwrap();
    let group = index.get("d41d8cd98f00b204e9800998ecf8427e").unwrap();
    assert_eq!(group.representative(), Some("x/empty2.thm"));
    assert_eq!(group.redundant(), ["x/empty1.thm".to_string()]);
}

#[test]
fn test_import_rejects_wrong_types() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{"abc": {"filenames": ["a"], "count": "one", "size": 1, "total_size": 1}}"#,
    )
    .unwrap();

    match DuplicateIndex::load(&path) {
        Err(ExportError::Format(_)) => {}
        other => panic!("Expected Format error, got {:?}", other),
    }
}

#[test]
fn test_import_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");

    match DuplicateIndex::load(&missing) {
        Err(ExportError::Io { target, .. }) => assert!(target.contains("missing.json")),
        other => panic!("Expected Io error, got {:?}", other),
    }
}

#[test]
fn test_export_overwrites_previous_document() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("index.json");

    let mut first = DuplicateIndex::new();
    first.record("aaa", "old.jpg", 1);
    first.save(&out).unwrap();

    let mut second = DuplicateIndex::new();
    second.insert(
        "bbb",
        DuplicateGroup {
            filenames: vec!["new.jpg".to_string()],
            count: 1,
            size: 2,
            total_size: 2,
        },
    );
    second.save(&out).unwrap();

    let loaded = DuplicateIndex::load(&out).unwrap();
    assert!(loaded.get("aaa").is_none());
    assert_eq!(loaded.get("bbb").unwrap().size, 2);
}
