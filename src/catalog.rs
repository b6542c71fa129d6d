//! Catalog loading and the work record data model.
//!
//! Stage 1 of the curio build pipeline. Reads per-work YAML records plus two
//! shared data files, producing an ordered, in-memory catalog for the
//! resolver.
//!
//! ## Source Layout
//!
//! ```text
//! content/
//! ├── works/
//! │   ├── alpha.yaml               # One record per work
//! │   ├── beta.yaml
//! │   └── notes.txt                # Non-record files ignored
//! └── data/
//!     ├── type.yaml                # Vocabulary: flat list of type labels
//!     └── download.yaml            # Alias table pre-seeding known downloads
//! ```
//!
//! ## Record Schema
//!
//! ```yaml
//! order: 2
//! code: alpha
//! title: Alpha
//! suffix: "~ first pressing"
//! cover: https://img.example/alpha.png
//! hidden: false
//! tags: { era: early, state: available }
//! items:
//!   - title: Alpha (CD)
//!     type: [album]
//!     links:
//!       wiki: "Category:Alpha"
//!       ja: true                   # sentinel: no localized text needed
//!       zh: translate/alpha.zh.txt # explicit pre-supplied path
//! ```
//!
//! The per-language link fields accept three states: absent (translation
//! will be synthesized), `true` (no localization needed), or an explicit
//! path. These are distinct — see [`LinkRef`].
//!
//! ## Derived Data
//!
//! Each work's `tags.type` list is computed at load time as the
//! first-occurrence de-duplicated union of its items' `type` entries; it is
//! never recomputed afterwards. Works are sorted ascending by their declared
//! `order` field (stable, so ties keep file-enumeration order).
//!
//! Any unparsable record or missing shared file aborts the load: no partial
//! catalog is ever produced.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// One cataloged creative work.
#[derive(Debug, Clone, Deserialize)]
pub struct Work {
    /// Stable display order, ascending.
    pub order: i64,
    /// Unique identifier, used for generated asset filenames.
    pub code: String,
    pub title: String,
    /// Display suffix shown after the title (subtitle, pressing note).
    #[serde(default)]
    pub suffix: String,
    /// Cover image reference. A source URL in the record; rewritten to an
    /// output-relative path during asset resolution.
    pub cover: String,
    /// Hidden works are loaded and resolved but not listed on the index.
    #[serde(default)]
    pub hidden: bool,
    pub tags: Tags,
    pub items: Vec<Item>,
}

/// A sub-entry of a work: a specific edition or variant.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub title: String,
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    pub links: Links,
}

/// Wiki source reference plus per-language localized-text state.
#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    /// Wiki page identifier, e.g. `"Category:Alpha"`.
    pub wiki: String,
    #[serde(default)]
    pub ja: LinkRef,
    #[serde(default)]
    pub zh: LinkRef,
}

/// Resolution state of one language's localized-text link.
///
/// The record syntax overloads a single field: absent means "fetch a
/// translation", `true` means "no localized text needed", and a string is a
/// pre-supplied path. Modeling the three states as a variant keeps
/// "is it null or is it `true`" out of the resolver: only [`LinkRef::Absent`]
/// ever triggers translation synthesis, and [`LinkRef::UseDefault`] is never
/// overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LinkRef {
    /// No value in the record; resolution backfills a generated path.
    #[default]
    Absent,
    /// The `true` sentinel: this language needs no localized text.
    UseDefault,
    /// An output-relative path, pre-supplied or backfilled.
    Path(String),
}

impl LinkRef {
    pub fn is_absent(&self) -> bool {
        matches!(self, LinkRef::Absent)
    }

    /// The path, if this link resolves to one.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            LinkRef::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for LinkRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct LinkRefVisitor;

        impl serde::de::Visitor<'_> for LinkRefVisitor {
            type Value = LinkRef;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("`true` or a path string")
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<LinkRef, E> {
                if v {
                    Ok(LinkRef::UseDefault)
                } else {
                    Err(E::invalid_value(serde::de::Unexpected::Bool(v), &self))
                }
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<LinkRef, E> {
                Ok(LinkRef::Path(v.to_string()))
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<LinkRef, E> {
                Ok(LinkRef::Absent)
            }
        }

        deserializer.deserialize_any(LinkRefVisitor)
    }
}

/// Era/state labels from the record plus the derived type-label union.
#[derive(Debug, Clone, Deserialize)]
pub struct Tags {
    pub era: String,
    pub state: String,
    /// First-occurrence de-duplicated union of all item `type` entries.
    /// Computed during loading; any value in the record is replaced.
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
}

/// A pending or resolved asset fetch: source locator to output-relative
/// target path. Sources are unique within a download list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Download {
    pub source: String,
    pub target: String,
}

/// Everything the loader produces: ordered works, the type vocabulary, and
/// the pre-seeded download alias table.
#[derive(Debug)]
pub struct Catalog {
    pub works: Vec<Work>,
    pub types: Vec<String>,
    pub downloads: Vec<Download>,
}

const RECORD_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Load the catalog from a works directory and a shared data directory.
pub fn load(works_dir: &Path, data_dir: &Path) -> Result<Catalog, CatalogError> {
    let mut record_paths: Vec<PathBuf> = fs::read_dir(works_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_record(p))
        .collect();
    record_paths.sort();

    let mut works = Vec::with_capacity(record_paths.len());
    for path in &record_paths {
        let mut work: Work = read_yaml(path)?;
        work.tags.types = derive_type_tags(&work.items);
        works.push(work);
    }
    works.sort_by_key(|w| w.order);

    let types: Vec<String> = read_yaml(&data_dir.join("type.yaml"))?;
    let downloads: Vec<Download> = read_yaml(&data_dir.join("download.yaml"))?;

    Ok(Catalog {
        works,
        types,
        downloads,
    })
}

fn is_record(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            RECORD_EXTENSIONS
                .iter()
                .any(|r| ext.eq_ignore_ascii_case(r))
        })
        .unwrap_or(false)
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|source| CatalogError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Union of all item type labels, de-duplicated, first occurrence wins.
fn derive_type_tags(items: &[Item]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        for label in &item.types {
            if !seen.contains(label) {
                seen.push(label.clone());
            }
        }
    }
    seen
}
