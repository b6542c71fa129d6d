//! HTML page rendering.
//!
//! Renders the two site pages from the resolved catalog using
//! [maud](https://maud.lambda.xyz/) compile-time templates. Renderers are
//! pure functions from data to `Markup`; the assembler decides where the
//! output lands.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): every visible work in catalog order,
//!   with cover, title, tags, and per-item reference links, plus a type
//!   filter strip built from the shared vocabulary.
//! - **Not-found page** (`/404.html`): minimal, links back to the index.
//!
//! Styling comes from `/style.css` in the verbatim-copied static tree; the
//! templates only emit structure and class names.
//!
//! All asset references in the catalog are output-relative paths by the time
//! rendering runs (the resolver guarantees this), so templates prepend a
//! single `/` to make them site-absolute.

use crate::catalog::{Item, Links, Work};
use maud::{DOCTYPE, Markup, html};

/// Renders the base HTML document structure.
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href="/style.css";
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the catalog index page.
///
/// Hidden works are loaded and resolved like any other but never listed.
pub fn render_index(works: &[Work], types: &[String], wiki_base: &str) -> Markup {
    let content = html! {
        header.site-header {
            h1 { "Catalog" }
            nav.type-filter {
                @for label in types {
                    button.filter data-type=(label) { (label) }
                }
            }
        }
        main.catalog {
            @for work in works.iter().filter(|w| !w.hidden) {
                (render_work(work, wiki_base))
            }
        }
    };

    base_document("Catalog", content)
}

/// Renders the not-found page.
pub fn render_not_found() -> Markup {
    let content = html! {
        main.not-found {
            h1 { "Page not found" }
            p {
                a href="/" { "Back to the catalog" }
            }
        }
    };

    base_document("Not Found", content)
}

fn render_work(work: &Work, wiki_base: &str) -> Markup {
    html! {
        article.work id=(work.code)
            data-era=(work.tags.era)
            data-state=(work.tags.state)
            data-types=(work.tags.types.join(" ")) {
            img.cover src={ "/" (work.cover) } alt=(work.title) loading="lazy";
            header {
                h2 {
                    (work.title)
                    @if !work.suffix.is_empty() {
                        " "
                        span.suffix { (work.suffix) }
                    }
                }
                p.tags {
                    span.era { (work.tags.era) }
                    " "
                    span.state { (work.tags.state) }
                }
            }
            ul.items {
                @for item in &work.items {
                    (render_item(item, wiki_base))
                }
            }
        }
    }
}

fn render_item(item: &Item, wiki_base: &str) -> Markup {
    html! {
        li.item {
            span.item-title { (item.title) }
            @for label in &item.types {
                span.item-type { (label) }
            }
            (render_links(&item.links, wiki_base))
        }
    }
}

/// Reference links for one item. A language whose link resolved to the
/// "no localization needed" sentinel gets no anchor at all.
fn render_links(links: &Links, wiki_base: &str) -> Markup {
    html! {
        span.links {
            a.wiki href={ (wiki_base) "/" (links.wiki) } { "wiki" }
            @if let Some(path) = links.ja.as_path() {
                a.text-ja href={ "/" (path) } { "ja" }
            }
            @if let Some(path) = links.zh.as_path() {
                a.text-zh href={ "/" (path) } { "zh" }
            }
        }
    }
}
