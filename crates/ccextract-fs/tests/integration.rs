use std::io::Write;

use ccextract_fs::{Error, OutputDir, OverwritePolicy, PermissionMode};
use tempfile::tempdir;

#[test]
fn test_force_flag_maps_to_policy() {
    assert_eq!(OverwritePolicy::from_force(false), OverwritePolicy::CreateOnly);
    assert_eq!(OverwritePolicy::from_force(true), OverwritePolicy::TruncateExisting);
}

#[test]
fn test_rerun_with_create_only_keeps_first_output() {
    let dir = tempdir().unwrap();
    let out = OutputDir::open(dir.path()).unwrap();

    let mut first = out
        .create_file("nested/file.txt", OverwritePolicy::CreateOnly, PermissionMode::custom(0o644))
        .unwrap();
    first.write_all(b"first run").unwrap();
    drop(first);

    let second = out.create_file("nested/file.txt", OverwritePolicy::CreateOnly, PermissionMode::custom(0o644));
    assert!(matches!(second, Err(Error::AlreadyExists(_))));
    assert_eq!(std::fs::read(dir.path().join("nested/file.txt")).unwrap(), b"first run");
}

#[test]
fn test_rerun_with_truncate_replaces_output() {
    let dir = tempdir().unwrap();
    let out = OutputDir::open(dir.path()).unwrap();

    for content in [&b"a much longer first payload"[..], &b"short"[..]] {
        let mut file = out
            .create_file("file.txt", OverwritePolicy::TruncateExisting, PermissionMode::Inherit)
            .unwrap();
        file.write_all(content).unwrap();
    }

    assert_eq!(std::fs::read(dir.path().join("file.txt")).unwrap(), b"short");
}

#[test]
fn test_resolve_does_not_touch_disk() {
    let dir = tempdir().unwrap();
    let out = OutputDir::open(dir.path()).unwrap();

    let sanitized = out.resolve("x/y/z").unwrap();
    assert_eq!(sanitized.resolved, dir.path().join("x/y/z"));
    assert!(!dir.path().join("x").exists());
}
