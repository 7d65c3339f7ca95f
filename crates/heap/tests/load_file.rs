//! Loading dumps from disk

use heap::{DecodeError, HeapDump};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_from_path_reads_dump() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("heap.json");
    fs::write(
        &path,
        r#"{"nodes": [
            {"id": "1", "type": "table", "name": "t", "fixed": false, "synthesized": false, "color": "white", "memcat": 0},
            {"id": "2", "type": "string", "name": "s", "fixed": true, "synthesized": false, "color": "black", "memcat": 0}
        ], "edges": [{"src": "1", "dst": "2", "name": "key"}]}"#,
    )
    .expect("Failed to write dump");

    let dump = HeapDump::from_path(&path).expect("Failed to load dump");
    assert_eq!(dump.nodes.len(), 2);
    assert_eq!(dump.edges[0].src, "1");
    assert_eq!(dump.edges[0].dst, "2");
}

#[test]
fn test_from_path_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nope.json");

    let err = HeapDump::from_path(&path).unwrap_err();
    match &err {
        DecodeError::Io { path: p, .. } => assert_eq!(p, &path),
        other => panic!("expected Io error, got {other:?}"),
    }
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn test_from_path_truncated_document() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("heap.json");
    fs::write(&path, r#"{"nodes": [{"id": "1""#).expect("Failed to write dump");

    assert!(matches!(HeapDump::from_path(&path), Err(DecodeError::Json(_))));
}
