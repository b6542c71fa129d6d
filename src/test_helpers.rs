//! Shared test utilities for the curio test suite.
//!
//! Provides in-memory fixture constructors for catalog types and a
//! tempdir-based content-tree builder so tests can exercise loading and
//! assembly against an isolated source layout.

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

use crate::catalog::{Item, LinkRef, Links, Tags, Work};

// =========================================================================
// In-memory fixtures
// =========================================================================

/// A work with the given code, order, and cover source. Era/state tags are
/// filler; derived type tags start empty.
pub fn work(code: &str, order: i64, cover: &str, items: Vec<Item>) -> Work {
    Work {
        order,
        code: code.to_string(),
        title: code.to_string(),
        suffix: String::new(),
        cover: cover.to_string(),
        hidden: false,
        tags: Tags {
            era: "early".to_string(),
            state: "available".to_string(),
            types: Vec::new(),
        },
        items,
    }
}

/// An item with explicit link states for both languages.
pub fn item(title: &str, types: &[&str], wiki: &str, ja: LinkRef, zh: LinkRef) -> Item {
    Item {
        title: title.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        links: Links {
            wiki: wiki.to_string(),
            ja,
            zh,
        },
    }
}

// =========================================================================
// Content-tree fixtures
// =========================================================================

/// Create a minimal content source tree in a temp directory:
/// empty `works/`, stock shared data files, a one-file static tree, and an
/// empty `manual/` directory.
pub fn source_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("works")).unwrap();
    fs::create_dir_all(tmp.path().join("data")).unwrap();
    fs::create_dir_all(tmp.path().join("static")).unwrap();
    fs::create_dir_all(tmp.path().join("manual")).unwrap();
    fs::write(tmp.path().join("data/type.yaml"), "- album\n").unwrap();
    fs::write(tmp.path().join("data/download.yaml"), "[]\n").unwrap();
    fs::write(tmp.path().join("static/style.css"), "body {}\n").unwrap();
    tmp
}

/// Write a work record file under `<root>/works/`.
pub fn write_record(root: &Path, name: &str, yaml: &str) {
    fs::write(root.join("works").join(name), yaml).unwrap();
}

/// A complete, minimal record with the given code and order.
pub fn record_yaml(code: &str, order: i64) -> String {
    format!(
        r#"order: {order}
code: {code}
title: {code}
cover: https://img.example/{code}.png
tags: {{ era: early, state: available }}
items:
  - title: {code} (CD)
    type: [album]
    links: {{ wiki: "{code}", ja: true, zh: true }}
"#
    )
}

/// Write a zip archive containing the given `(name, bytes)` entries.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = fs::File::create(path).unwrap();
    let mut archive = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, bytes) in entries {
        archive.start_file(*name, options).unwrap();
        archive.write_all(bytes).unwrap();
    }
    archive.finish().unwrap();
}
