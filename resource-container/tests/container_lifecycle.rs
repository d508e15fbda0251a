//! Integration tests for the container lifecycle.
//!
//! These tests verify the complete flow through the public API:
//! - create → write content → close → open elsewhere → read content
//! - Archive round-trips preserving files, bytes and empty directories
//! - Compatibility gating on load and open
//! - Legacy `package.json` containers
//! - Inspecting directories and archives
//!
//! Run with: `cargo test --test container_lifecycle`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use resource_container::{
    close, create, inspect, load, open, ContainerError, ContainerFactory, ErrorKind,
    FactoryConfig,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Minimal valid creation input for a single-project container.
fn titus_manifest() -> serde_yaml::Value {
    serde_yaml::from_str(
        r#"
dublin_core:
  type: book
  format: text/usfm
  identifier: en-me
  title: English Mock Edition
  language:
    identifier: en
    title: English
    direction: ltr
  rights: CC BY-SA 4.0
projects:
  - identifier: tit
    title: Titus
    sort: 56
    path: ./content
"#,
    )
    .expect("valid yaml")
}

/// Relative path -> file bytes (`None` for directories) under `root`.
fn tree(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_path_buf();
            let contents = e.file_type().is_file().then(|| fs::read(e.path()).unwrap());
            (relative, contents)
        })
        .collect()
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_create_write_close_open_read() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("en-me");

    let rc = create(&dir, &titus_manifest()).unwrap();
    rc.write_chunk(None, "front", "title", "Titus").unwrap();
    assert!(dir.join("content/front/title.usfm").is_file());

    let closed = close(&dir).unwrap();
    assert_eq!(closed.path, temp.path().join("en-me.tsrc"));

    let elsewhere = TempDir::new().unwrap();
    let opened = open(&closed.path, &elsewhere.path().join("opened")).unwrap();

    assert_eq!(opened.read_chunk(None, "front", "title").unwrap(), "Titus");
    assert_eq!(opened.conforms_to().as_deref(), Some("0.2"));
    assert_eq!(opened.chapters(None).unwrap(), vec!["front"]);
    assert_eq!(opened.chunks(None, "front").unwrap(), vec!["title"]);
    assert_eq!(opened.slug().unwrap(), "en_tit_en-me");
}

#[test]
fn test_archive_round_trip_preserves_tree() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("en-me");

    let rc = create(&dir, &titus_manifest()).unwrap();
    rc.write_chunk(None, "01", "01", "\\c 1 \\v 1 Paul, a servant of God")
        .unwrap();
    rc.write_chunk(None, "01", "05", "\\v 5 For this reason").unwrap();
    fs::create_dir_all(dir.join("content/02")).unwrap();
    fs::write(dir.join("content/toc.yml"), "- chapter: '01'\n").unwrap();
    fs::write(dir.join("LICENSE.md"), [0xEFu8, 0xBB, 0xBF, b'#']).unwrap();

    let closed = close(&dir).unwrap();
    let target = temp.path().join("copy");
    open(&closed.path, &target).unwrap();

    assert_eq!(tree(&dir), tree(&target));
    assert!(target.join("content/02").is_dir());
}

#[test]
fn test_close_replaces_existing_archive() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("en-me");
    let rc = create(&dir, &titus_manifest()).unwrap();

    let first = close(&dir).unwrap();
    rc.write_chunk(None, "01", "01", "changed").unwrap();
    let second = close(&dir).unwrap();

    assert_eq!(first.path, second.path);
    assert_ne!(first.checksum, second.checksum);

    let opened = open(&second.path, &temp.path().join("opened")).unwrap();
    assert_eq!(opened.read_chunk(None, "01", "01").unwrap(), "changed");
}

// ============================================================================
// Compatibility
// ============================================================================

#[test]
fn test_newer_container_rejected_on_open() {
    let temp = TempDir::new().unwrap();
    let newer = ContainerFactory::new(FactoryConfig::new().with_conforms_to("0.3"));
    let dir = temp.path().join("future");
    newer.create(&dir, &titus_manifest()).unwrap();
    let closed = newer.close(&dir).unwrap();

    let err = open(&closed.path, &temp.path().join("opened")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VersionUnsupported);

    // Non-strict loading still exposes the content
    let rc = load(&temp.path().join("opened"), false).unwrap();
    assert_eq!(rc.conforms_to().as_deref(), Some("0.3"));
}

#[test]
fn test_older_container_rejected_on_load() {
    let temp = TempDir::new().unwrap();
    let older = ContainerFactory::new(FactoryConfig::new().with_conforms_to("0.1"));
    let dir = temp.path().join("past");
    older.create(&dir, &titus_manifest()).unwrap();

    let err = load(&dir, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VersionOutdated);
    assert!(older.load(&dir, true).is_ok());
}

#[test]
fn test_wildcard_support_accepts_patch_versions() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("patch");
    ContainerFactory::new(FactoryConfig::new().with_conforms_to("0.2.4"))
        .create(&dir, &titus_manifest())
        .unwrap();

    let lenient = ContainerFactory::new(FactoryConfig::new().with_conforms_to("0.2.*"));
    assert!(lenient.load(&dir, true).is_ok());
    assert_eq!(
        load(&dir, true).unwrap_err().kind(),
        ErrorKind::VersionUnsupported
    );
}

// ============================================================================
// Legacy containers
// ============================================================================

#[test]
fn test_legacy_container() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("en_gen_ulb");
    fs::create_dir_all(dir.join("content/01")).unwrap();
    fs::write(
        dir.join("package.json"),
        r#"{
            "package_version": 7,
            "modified_at": 20161201,
            "content_mime_type": "text/usx",
            "language": {"slug": "en", "name": "English", "direction": "ltr"},
            "project": {"slug": "gen", "name": "Genesis", "sort": 1},
            "resource": {"slug": "ulb", "name": "Unlocked Literal Bible", "type": "book",
                         "status": {"license": "CC BY-SA 4.0", "version": "3",
                                    "pub_date": "2016-12-01", "checking_level": "3",
                                    "translate_mode": "all"}}
        }"#,
    )
    .unwrap();
    fs::write(dir.join("content/01/01.usx"), "<usx/>").unwrap();
    fs::write(dir.join("content/toc.yml"), "- chapter: '01'\n  chunks: ['01']\n").unwrap();
    fs::write(dir.join("content/config.yml"), "content: {}\n").unwrap();

    let rc = load(&dir, true).unwrap();

    assert_eq!(rc.slug().unwrap(), "en_gen_ulb");
    assert_eq!(rc.chunk_extension(), "usx");
    assert_eq!(rc.read_chunk(None, "01", "01").unwrap(), "<usx/>");
    assert_eq!(rc.toc(None).unwrap()[0]["chapter"].as_str(), Some("01"));
    assert!(rc.config(None).unwrap().is_mapping());

    let closed = close(&dir).unwrap();
    let opened = open(&closed.path, &temp.path().join("opened")).unwrap();
    assert!(opened.manifest().unwrap().is_legacy());
}

// ============================================================================
// Inspect and error surfaces
// ============================================================================

#[test]
fn test_inspect_archive_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("en-me");
    create(&dir, &titus_manifest()).unwrap();
    let closed = close(&dir).unwrap();
    fs::remove_dir_all(&dir).unwrap();

    let manifest = inspect(&closed.path).unwrap();

    assert_eq!(manifest.resource_info().title, "English Mock Edition");
    assert_eq!(manifest.project_ids(), vec!["tit"]);
    assert!(!dir.exists());
}

#[test]
fn test_open_missing_archive() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");

    let err = open(&temp.path().join("none.tsrc"), &target).unwrap_err();

    assert!(matches!(err, ContainerError::ArchiveNotFound(_)));
    assert!(!target.exists());
}

#[test]
fn test_create_requires_fields_in_order() {
    let temp = TempDir::new().unwrap();
    let mut partial = titus_manifest();
    let dc = partial
        .get_mut("dublin_core")
        .and_then(|v| v.as_mapping_mut())
        .unwrap();
    dc.remove("rights");
    dc.remove("identifier");

    let err = create(&temp.path().join("rc"), &partial).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert_eq!(
        err.to_string(),
        "missing required key: dublin_core.identifier"
    );
}
