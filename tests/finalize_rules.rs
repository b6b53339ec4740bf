//! Double-finalize rules: commit is single-shot, cleanup is idempotent.

use safe_replace::ReplaceError;
use std::fs;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn close_after_commit_is_a_no_op() {
    let td = tempdir().unwrap();
    let dest = td.path().join("done.txt");

    let mut f = safe_replace::create(&dest, 0o644).unwrap();
    f.write_all(b"committed").unwrap();
    f.commit().unwrap();

    f.close().unwrap();
    f.abandon().unwrap();

    // The committed content must survive the extra cleanup calls.
    assert_eq!(fs::read_to_string(&dest).unwrap(), "committed");
}

#[test]
fn second_commit_is_rejected() {
    let td = tempdir().unwrap();
    let dest = td.path().join("once.txt");

    let mut f = safe_replace::create(&dest, 0o644).unwrap();
    f.write_all(b"payload").unwrap();
    f.commit().unwrap();

    assert!(matches!(f.commit(), Err(ReplaceError::AlreadyFinalized)));
    assert_eq!(fs::read_to_string(&dest).unwrap(), "payload");
}

#[test]
fn commit_after_abandon_is_rejected() {
    let td = tempdir().unwrap();
    let dest = td.path().join("gone.txt");

    let mut f = safe_replace::create(&dest, 0o644).unwrap();
    f.abandon().unwrap();

    assert!(matches!(f.commit(), Err(ReplaceError::AlreadyFinalized)));
    assert!(!dest.exists());
}
