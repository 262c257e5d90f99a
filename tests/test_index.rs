use commitstore::*;

fn d(s: &str) -> Digest {
    Digest::of(s.as_bytes())
}

#[test]
fn new_index_is_empty() {
    let index = StagingIndex::new();
    assert!(index.is_empty());
    assert!(index.entries().is_empty());
    assert!(index.removals().is_empty());
}

#[test]
fn stage_is_idempotent() {
    let mut once = StagingIndex::new();
    once.stage("f", d("x"));
    let mut twice = StagingIndex::new();
    twice.stage("f", d("x"));
    twice.stage("f", d("x"));
    assert_eq!(once, twice);
}

#[test]
fn stage_overwrites() {
    let mut index = StagingIndex::new();
    index.stage("f", d("old"));
    index.stage("f", d("new"));
    assert_eq!(index.entries().get("f"), Some(&d("new")));
    assert_eq!(index.entries().len(), 1);
}

#[test]
fn unstage() {
    let mut index = StagingIndex::new();
    index.stage("f", d("x"));
    assert!(index.unstage("f"));
    assert!(!index.unstage("f"));
    assert!(index.is_empty());
}

#[test]
fn removal_and_staging_are_exclusive() {
    let mut index = StagingIndex::new();
    index.stage("f", d("x"));
    index.mark_removed("f");
    assert!(!index.is_staged("f"));
    assert!(index.is_removed("f"));

    index.stage("f", d("y"));
    assert!(index.is_staged("f"));
    assert!(!index.is_removed("f"));
}

#[test]
fn clear_empties_everything() {
    let mut index = StagingIndex::new();
    index.stage("a", d("a"));
    index.mark_removed("b");
    index.clear();
    assert!(index.is_empty());
}

#[test]
fn status_lists_sorted_names() {
    let mut index = StagingIndex::new();
    index.stage("z", d("z"));
    index.stage("a", d("a"));
    index.mark_removed("m");
    let status = index.status();
    assert_eq!(status.staged.keys().collect::<Vec<_>>(), vec!["a", "z"]);
    assert!(status.removed.contains("m"));
    assert!(!status.is_clean());
    assert_eq!(
        status.to_string(),
        "=== Staged Files ===\na\nz\n\n=== Removed Files ===\nm\n"
    );
}

#[test]
fn save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");
    let mut index = StagingIndex::new();
    index.stage("a.txt", d("a"));
    index.mark_removed("gone.txt");
    index.save(&path).unwrap();

    let loaded = StagingIndex::load(&path).unwrap();
    assert_eq!(loaded, index);
}

#[test]
fn load_missing_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = StagingIndex::load(&dir.path().join("index")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn load_corrupt_is_encoding_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");
    std::fs::write(&path, b"{{{").unwrap();
    assert!(matches!(StagingIndex::load(&path).unwrap_err(), Error::Encoding(_)));
}
