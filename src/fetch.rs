//! HTTP fetching and translation-table extraction.
//!
//! Thin wrappers over a shared [`reqwest::Client`] plus the scraper-based
//! extraction of translation text from wiki markup. A non-success status is
//! an error like any other: there are no retries and the caller is expected
//! to abort the run.
//!
//! ## Translation Extraction
//!
//! Translation source documents are rendered wiki pages. The text we want
//! lives in table cells tagged with a `lang` attribute inside the
//! `.tt-table` content tables of the `#mw-content-text` region. Citation
//! markers (`.reference` elements) appear inside those cells and must never
//! leak into the extracted text, so text collection skips their subtrees.

use scraper::{CaseSensitivity, ElementRef, Html, Selector};
use std::time::Duration;
use thiserror::Error;

/// User-Agent string for all outgoing requests.
const USER_AGENT: &str = concat!("curio/", env!("CARGO_PKG_VERSION"));

/// Marker class of citation footnotes stripped during extraction.
const REFERENCE_CLASS: &str = "reference";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url}: HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Build the HTTP client shared by every fetch in a run.
pub fn client() -> Result<reqwest::Client, FetchError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// Fetch a URL as text, treating non-success statuses as errors.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(response.text().await?)
}

/// Fetch a URL as raw bytes, treating non-success statuses as errors.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(response.bytes().await?.to_vec())
}

/// Per-language text collected from one translation source document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TranslationText {
    pub ja: Vec<String>,
    pub zh: Vec<String>,
}

/// Extract both languages' table-cell text from a translation source page.
///
/// Cells are collected in document order, scoped to `.tt-table` tables
/// inside `#mw-content-text`. A page with no matching cells yields empty
/// lists, not an error.
pub fn extract_translation(html: &str) -> TranslationText {
    let doc = Html::parse_document(html);
    TranslationText {
        ja: collect_cells(&doc, &lang_selector("ja")),
        zh: collect_cells(&doc, &lang_selector("zh")),
    }
}

fn lang_selector(lang: &str) -> Selector {
    let selector = format!(r#"#mw-content-text .tt-table td[lang="{lang}"]"#);
    Selector::parse(&selector).expect("static selector")
}

fn collect_cells(doc: &Html, selector: &Selector) -> Vec<String> {
    doc.select(selector).map(cell_text).collect()
}

/// Text content of a cell, excluding `.reference` subtrees.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut out = String::new();
    append_text(cell, &mut out);
    out
}

fn append_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if child_el
                .value()
                .has_class(REFERENCE_CLASS, CaseSensitivity::CaseSensitive)
            {
                continue;
            }
            append_text(child_el, out);
        }
    }
}
