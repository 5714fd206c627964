use mediadupe::actions::{CleanupConfig, CleanupEngine, CleanupError};
use mediadupe::duplicates::{DuplicateFinder, DuplicateIndex};
use std::fs;
use tempfile::tempdir;

fn scan(dir: &std::path::Path) -> DuplicateIndex {
    let pattern = format!("{}/**", dir.display());
    DuplicateFinder::with_defaults().scan(&pattern).unwrap().0
}

#[test]
fn test_cleanup_two_identical_files() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.jpg");
    let b = dir.path().join("b.jpg");
    fs::write(&a, vec![1u8; 1024]).unwrap();
    fs::write(&b, vec![1u8; 1024]).unwrap();

    let mut index = DuplicateIndex::new();
    index.record("fp", a.to_string_lossy(), 1024);
    index.record("fp", b.to_string_lossy(), 1024);

    let report = CleanupEngine::default().run(&index).unwrap();

    assert!(!a.exists());
    assert!(b.exists());
    assert_eq!(report.total_bytes_freed, 1024);
    assert_eq!(report.files_deleted, 1);
}

#[test]
fn test_cleanup_with_backup_copies_representative() {
    let dir = tempdir().unwrap();
    let media = dir.path().join("media");
    fs::create_dir(&media).unwrap();
    let a = media.join("a.jpg");
    let b = media.join("b.jpg");
    fs::write(&a, vec![9u8; 1024]).unwrap();
    fs::write(&b, vec![9u8; 1024]).unwrap();
    let backup = dir.path().join("bk");

    let mut index = DuplicateIndex::new();
    index.record("fp", a.to_string_lossy(), 1024);
    index.record("fp", b.to_string_lossy(), 1024);

    let engine = CleanupEngine::new(CleanupConfig::default().with_backup_dir(&backup));
    let report = engine.run(&index).unwrap();

    assert!(backup.is_dir());
    assert_eq!(fs::read(backup.join("b.jpg")).unwrap(), vec![9u8; 1024]);
    assert!(!a.exists());
    assert!(b.exists());
    assert_eq!(report.total_bytes_freed, 1024);
    assert_eq!(report.backups.copied, 1);
}

#[test]
fn test_cleanup_existing_backup_dir_is_reused() {
    let dir = tempdir().unwrap();
    let backup = dir.path().join("bk");
    fs::create_dir(&backup).unwrap();
    fs::write(backup.join("unrelated.txt"), b"keep me").unwrap();

    let engine = CleanupEngine::new(CleanupConfig::default().with_backup_dir(&backup));
    let report = engine.run(&DuplicateIndex::new()).unwrap();

    assert_eq!(report.total_bytes_freed, 0);
    assert!(backup.join("unrelated.txt").exists());
}

#[test]
fn test_cleanup_skips_group_with_missing_member() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"dup").unwrap();
    fs::write(dir.path().join("b.jpg"), b"dup").unwrap();
    fs::write(dir.path().join("c.jpg"), b"dup").unwrap();
    let index = scan(dir.path());

    fs::remove_file(dir.path().join("a.jpg")).unwrap();
    let report = CleanupEngine::default().run(&index).unwrap();

    assert!(dir.path().join("b.jpg").exists());
    assert!(dir.path().join("c.jpg").exists());
    assert_eq!(report.total_bytes_freed, 0);
    assert_eq!(report.files_deleted, 0);
    assert_eq!(report.groups_skipped.len(), 1);
    assert_eq!(report.groups_skipped[0].missing.len(), 1);
}

#[test]
fn test_cleanup_leaves_singletons_untouched() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.jpg"), b"1").unwrap();
    fs::write(dir.path().join("two.mp4"), b"2").unwrap();
    let index = scan(dir.path());

    let report = CleanupEngine::default().run(&index).unwrap();

    assert!(dir.path().join("one.jpg").exists());
    assert!(dir.path().join("two.mp4").exists());
    assert_eq!(report.groups_processed, 0);
    assert!(report.groups_skipped.is_empty());
}

#[test]
fn test_cleanup_keeps_one_file_per_group() {
    let dir = tempdir().unwrap();
    for i in 0..9 {
        let content = format!("group {}", i % 3);
        fs::write(dir.path().join(format!("f{i}.jpg")), content).unwrap();
    }
    let index = scan(dir.path());
    let expected_freed: u64 = index.duplicates().map(|(_, g)| g.reclaimable()).sum();

    let report = CleanupEngine::default().run(&index).unwrap();

    let remaining = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(remaining, 3);
    assert_eq!(report.files_deleted, 6);
    assert_eq!(report.groups_processed, 3);
    assert_eq!(report.total_bytes_freed, expected_freed);
    for (_, group) in index.duplicates() {
        assert!(std::path::Path::new(group.representative().unwrap()).exists());
    }
}

#[test]
fn test_cleanup_fails_when_backup_dir_cannot_be_created() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("bk");
    fs::write(&blocker, b"not a dir").unwrap();

    let engine =
        CleanupEngine::new(CleanupConfig::default().with_backup_dir(blocker.join("nested")));
    let result = engine.run(&DuplicateIndex::new());

    assert!(matches!(result, Err(CleanupError::BackupDirectory { .. })));
}

#[test]
fn test_cleanup_report_serializes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"dup").unwrap();
    fs::write(dir.path().join("b.jpg"), b"dup").unwrap();
    let index = scan(dir.path());

    let report = CleanupEngine::default().run(&index).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["total_bytes_freed"], 3);
    assert_eq!(value["files_deleted"], 1);
    assert_eq!(value["backups"]["copied"], 0);
    assert!(value["deletion_failures"].as_array().unwrap().is_empty());
}

#[test]
fn test_backup_into_scanned_folder_still_cleans() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp4"), b"clip").unwrap();
    fs::write(dir.path().join("b.mp4"), b"clip").unwrap();
    let index = scan(dir.path());

    let engine = CleanupEngine::new(CleanupConfig::default().with_backup_dir(dir.path()));
    let report = engine.run(&index).unwrap();

    assert_eq!(report.backups.same_file, 1);
    assert!(!dir.path().join("a.mp4").exists());
    assert_eq!(fs::read(dir.path().join("b.mp4")).unwrap(), b"clip");
    assert_eq!(report.total_bytes_freed, 4);
}

#[test]
fn test_blocked_backup_destination_still_cleans() {
    let dir = tempdir().unwrap();
    let media = dir.path().join("media");
    fs::create_dir(&media).unwrap();
    fs::write(media.join("a.mp4"), b"clip").unwrap();
    fs::write(media.join("b.mp4"), b"clip").unwrap();
    let backup = dir.path().join("bk");
    fs::create_dir_all(backup.join("b.mp4")).unwrap();
    let index = scan(&media);

    let engine = CleanupEngine::new(CleanupConfig::default().with_backup_dir(&backup));
    let report = engine.run(&index).unwrap();

    assert_eq!(report.backups.failed, 1);
    assert!(!media.join("a.mp4").exists());
    assert!(media.join("b.mp4").exists());
    assert_eq!(report.files_deleted, 1);
    assert_eq!(report.total_bytes_freed, 4);
}
