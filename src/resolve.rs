//! Asset resolution.
//!
//! Stage 2 of the curio build pipeline, and the only part with nontrivial
//! invariants. Walks the loaded catalog once and decides what the assembler
//! must fetch:
//!
//! - **Covers**: each work's cover source is looked up in the download list
//!   by exact source match. A hit reuses the existing target; a miss
//!   synthesizes `cover/{code}.{ext}` and appends a new entry. Either way
//!   the work's `cover` field is rewritten to the target, so a source shared
//!   by several works is fetched exactly once.
//! - **Translations**: an item with at least one `Absent` language link gets
//!   one [`Translate`] covering both languages, and the absent field(s) are
//!   backfilled with the generated paths. Explicit paths and the `true`
//!   sentinel are left untouched.
//!
//! No network or filesystem I/O happens here; resolution is a pure
//! transformation over in-memory structures, which is what makes the
//! dedup/backfill edge cases unit-testable.

use crate::catalog::{Download, LinkRef, Work};

/// Output subdirectory for fetched cover images.
pub const COVER_ROOT: &str = "cover";
/// Output subdirectory for extracted translation text.
pub const TRANSLATE_ROOT: &str = "translate";

/// A pending fetch of one wiki source document plus its two per-language
/// target paths. Always carries both targets, even when only one language
/// was missing on the originating item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translate {
    /// Remote-cache URL of the source document.
    pub source: String,
    /// Output-relative path of the Japanese text file.
    pub ja: String,
    /// Output-relative path of the Chinese text file.
    pub zh: String,
}

/// The resolver's output: the extended download list and the translation
/// work list. Both are transient; neither is ever persisted.
#[derive(Debug)]
pub struct Resolved {
    pub downloads: Vec<Download>,
    pub translates: Vec<Translate>,
}

/// Resolve all asset references in catalog order.
///
/// Mutates each work in place: `cover` fields end up as output-relative
/// target paths and every previously-absent language link points at a
/// generated translation path.
pub fn resolve(works: &mut [Work], downloads: Vec<Download>, translation_cache: &str) -> Resolved {
    let mut downloads = downloads;
    let mut translates = Vec::new();
    let cache_base = translation_cache.trim_end_matches('/');

    for work in works.iter_mut() {
        work.cover = resolve_cover(&mut downloads, &work.cover, &work.code);

        for item in &mut work.items {
            if !item.links.ja.is_absent() && !item.links.zh.is_absent() {
                continue;
            }
            let slug = wiki_slug(&item.links.wiki);
            let translate = Translate {
                source: format!("{cache_base}/{}", item.links.wiki),
                ja: format!("{TRANSLATE_ROOT}/{slug}.ja.txt"),
                zh: format!("{TRANSLATE_ROOT}/{slug}.zh.txt"),
            };
            if item.links.ja.is_absent() {
                item.links.ja = LinkRef::Path(translate.ja.clone());
            }
            if item.links.zh.is_absent() {
                item.links.zh = LinkRef::Path(translate.zh.clone());
            }
            translates.push(translate);
        }
    }

    Resolved {
        downloads,
        translates,
    }
}

/// Look up a cover source in the download list, synthesizing a new entry on
/// miss. Returns the target path the work should reference.
fn resolve_cover(downloads: &mut Vec<Download>, source: &str, code: &str) -> String {
    if let Some(existing) = downloads.iter().find(|d| d.source == source) {
        return existing.target.clone();
    }
    let target = format!("{COVER_ROOT}/{code}.{}", source_extension(source));
    downloads.push(Download {
        source: source.to_string(),
        target: target.clone(),
    });
    target
}

/// Extension of the file a source locator points at, without the dot.
/// Query strings and fragments are not part of the name. Sources with no
/// extension fall back to `bin`.
fn source_extension(source: &str) -> &str {
    let name = source
        .rsplit('/')
        .next()
        .unwrap_or(source)
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext,
        _ => "bin",
    }
}

/// Derive a filesystem-safe slug from a wiki page identifier.
///
/// Strips the leading namespace (everything through the last `:`), collapses
/// runs of `:`, `/`, `&`, and whitespace into a single underscore, and
/// lowercases. Idempotent: slugging a slug changes nothing.
///
/// `"Category:Foo Bar/Baz&Qux"` → `"foo_bar_baz_qux"`
pub fn wiki_slug(wiki: &str) -> String {
    let rest = match wiki.rfind(':') {
        Some(pos) if pos > 0 => &wiki[pos + 1..],
        _ => wiki,
    };

    let mut slug = String::with_capacity(rest.len());
    let mut in_separator_run = false;
    for c in rest.chars() {
        if matches!(c, ':' | '/' | '&') || c.is_whitespace() {
            in_separator_run = true;
            continue;
        }
        if in_separator_run {
            slug.push('_');
            in_separator_run = false;
        }
        slug.extend(c.to_lowercase());
    }
    if in_separator_run {
        slug.push('_');
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    const CACHE: &str = "https://cache.example";

    #[test]
    fn shared_cover_source_fetched_once() {
        let mut works = vec![
            work("first", 1, "https://img.example/shared.png", vec![]),
            work("second", 2, "https://img.example/shared.png", vec![]),
        ];

        let resolved = resolve(&mut works, Vec::new(), CACHE);

        assert_eq!(resolved.downloads.len(), 1);
        assert_eq!(works[0].cover, "cover/first.png");
        assert_eq!(works[1].cover, works[0].cover);
    }

    #[test]
    fn cover_target_uses_code_and_source_extension() {
        let mut works = vec![work("alpha", 1, "https://img.example/art/scan.jpeg", vec![])];

        let resolved = resolve(&mut works, Vec::new(), CACHE);

        assert_eq!(works[0].cover, "cover/alpha.jpeg");
        assert_eq!(
            resolved.downloads,
            [Download {
                source: "https://img.example/art/scan.jpeg".into(),
                target: "cover/alpha.jpeg".into(),
            }]
        );
    }

    #[test]
    fn alias_table_entry_reused_verbatim() {
        let mut works = vec![work("alpha", 1, "https://img.example/known.png", vec![])];
        let aliases = vec![Download {
            source: "https://img.example/known.png".into(),
            target: "cover/legacy-name.png".into(),
        }];

        let resolved = resolve(&mut works, aliases, CACHE);

        assert_eq!(resolved.downloads.len(), 1);
        assert_eq!(works[0].cover, "cover/legacy-name.png");
    }

    #[test]
    fn extension_fallback_for_bare_sources() {
        assert_eq!(source_extension("https://img.example/raw"), "bin");
        assert_eq!(source_extension("https://img.example/a.png?v=2"), "png");
        assert_eq!(source_extension("https://img.example/.hidden"), "bin");
    }

    #[test]
    fn fully_linked_item_untouched() {
        let mut works = vec![work(
            "alpha",
            1,
            "https://img.example/a.png",
            vec![item(
                "Alpha (CD)",
                &["album"],
                "Alpha",
                LinkRef::Path("translate/custom.ja.txt".into()),
                LinkRef::Path("translate/custom.zh.txt".into()),
            )],
        )];

        let resolved = resolve(&mut works, Vec::new(), CACHE);

        assert!(resolved.translates.is_empty());
        let links = &works[0].items[0].links;
        assert_eq!(links.ja.as_path(), Some("translate/custom.ja.txt"));
        assert_eq!(links.zh.as_path(), Some("translate/custom.zh.txt"));
    }

    #[test]
    fn single_missing_language_backfills_only_that_field() {
        let mut works = vec![work(
            "alpha",
            1,
            "https://img.example/a.png",
            vec![item(
                "Alpha (CD)",
                &["album"],
                "Alpha",
                LinkRef::Path("translate/custom.ja.txt".into()),
                LinkRef::Absent,
            )],
        )];

        let resolved = resolve(&mut works, Vec::new(), CACHE);

        assert_eq!(
            resolved.translates,
            [Translate {
                source: "https://cache.example/Alpha".into(),
                ja: "translate/alpha.ja.txt".into(),
                zh: "translate/alpha.zh.txt".into(),
            }]
        );
        let links = &works[0].items[0].links;
        assert_eq!(links.ja.as_path(), Some("translate/custom.ja.txt"));
        assert_eq!(links.zh.as_path(), Some("translate/alpha.zh.txt"));
    }

    #[test]
    fn sentinel_alone_generates_nothing() {
        let mut works = vec![work(
            "alpha",
            1,
            "https://img.example/a.png",
            vec![item(
                "Alpha (CD)",
                &["album"],
                "Alpha",
                LinkRef::UseDefault,
                LinkRef::Path("translate/custom.zh.txt".into()),
            )],
        )];

        let resolved = resolve(&mut works, Vec::new(), CACHE);

        assert!(resolved.translates.is_empty());
        assert_eq!(works[0].items[0].links.ja, LinkRef::UseDefault);
    }

    #[test]
    fn sentinel_survives_backfill_of_the_other_language() {
        let mut works = vec![work(
            "alpha",
            1,
            "https://img.example/a.png",
            vec![item(
                "Alpha (CD)",
                &["album"],
                "Alpha",
                LinkRef::UseDefault,
                LinkRef::Absent,
            )],
        )];

        let resolved = resolve(&mut works, Vec::new(), CACHE);

        assert_eq!(resolved.translates.len(), 1);
        let links = &works[0].items[0].links;
        assert_eq!(links.ja, LinkRef::UseDefault);
        assert_eq!(links.zh.as_path(), Some("translate/alpha.zh.txt"));
    }

    #[test]
    fn translate_source_templated_with_raw_identifier() {
        let mut works = vec![work(
            "alpha",
            1,
            "https://img.example/a.png",
            vec![item(
                "Alpha (CD)",
                &["album"],
                "Category:Foo Bar",
                LinkRef::Absent,
                LinkRef::Absent,
            )],
        )];

        let resolved = resolve(&mut works, Vec::new(), "https://cache.example/");

        assert_eq!(
            resolved.translates[0].source,
            "https://cache.example/Category:Foo Bar"
        );
        assert_eq!(resolved.translates[0].ja, "translate/foo_bar.ja.txt");
    }

    #[test]
    fn slug_strips_namespace_and_collapses_separators() {
        assert_eq!(wiki_slug("Category:Foo Bar/Baz&Qux"), "foo_bar_baz_qux");
    }

    #[test]
    fn slug_without_namespace() {
        assert_eq!(wiki_slug("Foo Bar"), "foo_bar");
    }

    #[test]
    fn slug_collapses_separator_runs() {
        assert_eq!(wiki_slug("A  B//C& D"), "a_b_c_d");
    }

    #[test]
    fn slug_is_idempotent() {
        let once = wiki_slug("Category:Foo Bar/Baz&Qux");
        assert_eq!(wiki_slug(&once), once);
    }

    #[test]
    fn slug_lowercases_unicode() {
        assert_eq!(wiki_slug("ÉTUDE Op.10"), "étude_op.10");
    }
}
