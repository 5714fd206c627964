use mediadupe::duplicates::{DuplicateFinder, FinderConfig};
use mediadupe::scanner::WalkerConfig;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn recursive(dir: &TempDir) -> String {
    format!("{}/**", dir.path().display())
}

fn write(path: &Path, content: &[u8]) -> String {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (index, summary) = finder.scan(&recursive(&dir)).unwrap();

    assert!(index.is_empty());
    assert_eq!(summary.indexed, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.jpg"), b"content a");
    write(&dir.path().join("b.jpg"), b"content b");
    write(&dir.path().join("c.mp4"), b"content c");

    let (index, summary) = DuplicateFinder::with_defaults()
        .scan(&recursive(&dir))
        .unwrap();

    assert_eq!(index.len(), 3);
    assert_eq!(summary.indexed, 3);
    assert_eq!(summary.duplicate_groups, 0);
    assert!(index.iter().all(|(_, g)| g.count == 1));
}

#[test]
fn test_scan_duplicate_files_across_directories() {
    let dir = tempdir().unwrap();
    let a = write(&dir.path().join("a.jpg"), b"duplicate");
    let b = write(&dir.path().join("nested/deeper/b.jpg"), b"duplicate");
    write(&dir.path().join("c.jpg"), b"unique");

    let (index, summary) = DuplicateFinder::with_defaults()
        .scan(&recursive(&dir))
        .unwrap();

    assert_eq!(summary.indexed, 3);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_bytes, 9);

    let (fingerprint, group) = index.duplicates().next().unwrap();
    assert_eq!(fingerprint, "24f1b0a79473250c195c7fb84e393392");
    assert_eq!(group.count, 2);
    assert_eq!(group.size, 9);
    assert_eq!(group.total_size, 18);
    assert!(group.filenames.contains(&a));
    assert!(group.filenames.contains(&b));
}

#[test]
fn test_scan_extension_filter_is_case_insensitive() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("upper.JPG"), b"pic");
    write(&dir.path().join("lower.jpg"), b"pic");
    write(&dir.path().join("notes.txt"), b"pic");

    let (index, summary) = DuplicateFinder::with_defaults()
        .scan(&recursive(&dir))
        .unwrap();

    assert_eq!(summary.indexed, 2);
    assert_eq!(summary.skipped_extension, 1);
    let (_, group) = index.duplicates().next().unwrap();
    assert_eq!(group.count, 2);
    assert!(group.filenames.iter().all(|f| !f.ends_with("notes.txt")));
}

#[test]
fn test_scan_custom_extensions() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"text");
    write(&dir.path().join("b.jpg"), b"text");

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(vec!["TXT".into()]));
    let (index, summary) = DuplicateFinder::new(config)
        .scan(&recursive(&dir))
        .unwrap();

    assert_eq!(summary.indexed, 1);
    assert_eq!(index.len(), 1);
}

#[test]
fn test_scan_accept_all_extensions() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"same");
    write(&dir.path().join("b.bin"), b"same");
    write(&dir.path().join("noext"), b"same");

    let config = FinderConfig::default().with_walker_config(WalkerConfig::accept_all());
    let (index, _) = DuplicateFinder::new(config)
        .scan(&recursive(&dir))
        .unwrap();

    assert_eq!(index.len(), 1);
    let (_, group) = index.iter().next().unwrap();
    assert_eq!(group.count, 3);
}

#[test]
fn test_scan_skips_directories_named_like_media() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("album.jpg")).unwrap();
    write(&dir.path().join("album.jpg/inside.jpg"), b"x");

    let (index, summary) = DuplicateFinder::with_defaults()
        .scan(&recursive(&dir))
        .unwrap();

    assert_eq!(summary.indexed, 1);
    assert_eq!(index.len(), 1);
}

#[test]
fn test_scan_skips_hidden_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join(".hidden.jpg"), b"same");
    write(&dir.path().join("visible.jpg"), b"same");

    let (index, summary) = DuplicateFinder::with_defaults()
        .scan(&recursive(&dir))
        .unwrap();

    assert_eq!(summary.indexed, 1);
    assert!(index.duplicates().next().is_none());
}

#[test]
fn test_scan_same_prefix_different_tail_groups_together() {
    let dir = tempdir().unwrap();
    let mut first = vec![7u8; 40_000];
    let mut second = first.clone();
    first.extend_from_slice(b"tail one");
    second[39_000] = 1;
    write(&dir.path().join("one.mp4"), &first);
    write(&dir.path().join("two.mp4"), &second);

    let (index, _) = DuplicateFinder::with_defaults()
        .scan(&recursive(&dir))
        .unwrap();

    let (_, group) = index.duplicates().next().unwrap();
    assert_eq!(group.count, 2);
    // size comes from the last file recorded
    assert_eq!(group.total_size, group.size * 2);
}

#[test]
fn test_scan_non_recursive_pattern() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("top.jpg"), b"a");
    write(&dir.path().join("sub/below.jpg"), b"a");

    let pattern = format!("{}/*.jpg", dir.path().display());
    let (index, summary) = DuplicateFinder::with_defaults().scan(&pattern).unwrap();

    assert_eq!(summary.indexed, 1);
    assert_eq!(index.len(), 1);
}

#[test]
fn test_scan_is_repeatable() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(&dir.path().join(format!("{i:02}.jpg")), format!("{}", i % 4).as_bytes());
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(6));
    let (first, _) = finder.scan(&recursive(&dir)).unwrap();
    let (second, _) = finder.scan(&recursive(&dir)).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert_eq!(first.duplicate_file_count(), 16);
}
