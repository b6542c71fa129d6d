//! Output assembly.
//!
//! Stage 3 of the curio build pipeline, and the only module that performs
//! filesystem mutation or network I/O. [`build`] runs the whole pipeline in
//! strict step order:
//!
//! 1. Delete the output root if present
//! 2. Create the output root and the `cover/`, `manual/`, `translate/` trees
//! 3. Copy the static-assets tree verbatim
//! 4. Load the catalog and resolve assets
//! 5. Render and write `index.html` and `404.html`
//! 6. Fetch every pending translation (all in flight at once) and write the
//!    extracted per-language text files
//! 7. Fetch every pending download through the bounded runner
//! 8. Obtain and extract the manuals archive(s) into `manual/`
//!
//! Steps 6 and 7 are the only parallel regions; both work lists are fully
//! built before any fetch starts, so no concurrent task ever touches shared
//! state. Any single failure aborts the run and leaves the output directory
//! in whatever partial state it reached.

use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::catalog::{self, Download};
use crate::config::SiteConfig;
use crate::fetch::{self, FetchError};
use crate::render;
use crate::resolve::{self, COVER_ROOT, TRANSLATE_ROOT, Translate};

/// Output subdirectory for extracted manuals.
pub const MANUAL_ROOT: &str = "manual";

/// Filename of the locally cached manuals archive in remote-archive mode.
const MANUAL_CACHE_NAME: &str = "manual.zip";

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Archive error in {path}: {source}")]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },
    #[error("Fetch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Counts reported after a successful build.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub works: usize,
    pub translates: usize,
    pub downloads: usize,
    pub archives: usize,
}

/// Run the full build from a content source tree into the output directory.
pub async fn build(
    source: &Path,
    output: &Path,
    config: &SiteConfig,
) -> Result<BuildSummary, AssembleError> {
    if output.exists() {
        fs::remove_dir_all(output)?;
    }
    fs::create_dir_all(output)?;
    fs::create_dir_all(output.join(COVER_ROOT))?;
    fs::create_dir_all(output.join(MANUAL_ROOT))?;
    fs::create_dir_all(output.join(TRANSLATE_ROOT))?;

    let static_root = source.join("static");
    if static_root.is_dir() {
        copy_static(&static_root, output)?;
    }

    let loaded = catalog::load(&source.join("works"), &source.join("data"))?;
    let mut works = loaded.works;
    let resolved = resolve::resolve(&mut works, loaded.downloads, &config.translation_cache);
    info!(
        works = works.len(),
        translates = resolved.translates.len(),
        downloads = resolved.downloads.len(),
        "catalog resolved"
    );

    info!("rendering pages");
    let index = render::render_index(&works, &loaded.types, &config.wiki_base);
    fs::write(output.join("index.html"), index.into_string())?;
    let not_found = render::render_not_found();
    fs::write(output.join("404.html"), not_found.into_string())?;

    let client = fetch::client()?;

    info!(count = resolved.translates.len(), "fetching translations");
    fetch_translations(&client, &resolved.translates, output).await?;

    info!(count = resolved.downloads.len(), "fetching downloads");
    fetch_downloads(&client, &resolved.downloads, output, config.download_concurrency).await?;

    info!("extracting manuals");
    let archives = extract_manuals(&client, source, output, config).await?;

    Ok(BuildSummary {
        works: works.len(),
        translates: resolved.translates.len(),
        downloads: resolved.downloads.len(),
        archives,
    })
}

/// Run one fallible task per item with at most `limit` in flight at once.
///
/// The limit is enforced with semaphore permits rather than fixed-size
/// batching, so a slow item delays only itself, not its whole group. Fails
/// fast: the first error is returned and remaining tasks are dropped.
pub async fn fetch_bounded<T, F, Fut, E>(items: Vec<T>, limit: usize, run: F) -> Result<(), E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: From<tokio::task::JoinError> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit));
    let mut tasks = JoinSet::new();
    for item in items {
        let semaphore = Arc::clone(&semaphore);
        let task = run(item);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            task.await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined??;
    }
    Ok(())
}

/// Step 6: fetch all translation sources concurrently, no cap, and write
/// both language files for each.
async fn fetch_translations(
    client: &reqwest::Client,
    translates: &[Translate],
    output: &Path,
) -> Result<(), AssembleError> {
    let mut tasks = JoinSet::new();
    for translate in translates.iter().cloned() {
        let client = client.clone();
        let output = output.to_path_buf();
        tasks.spawn(async move { fetch_one_translation(&client, &translate, &output).await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined??;
    }
    Ok(())
}

async fn fetch_one_translation(
    client: &reqwest::Client,
    translate: &Translate,
    output: &Path,
) -> Result<(), AssembleError> {
    debug!(source = %translate.source, "fetching translation");
    let html = fetch::fetch_text(client, &translate.source).await?;
    let text = fetch::extract_translation(&html);
    tokio::fs::write(output.join(&translate.ja), text.ja.join("\n")).await?;
    tokio::fs::write(output.join(&translate.zh), text.zh.join("\n")).await?;
    Ok(())
}

/// Step 7: fetch all downloads through the bounded runner.
async fn fetch_downloads(
    client: &reqwest::Client,
    downloads: &[Download],
    output: &Path,
    limit: usize,
) -> Result<(), AssembleError> {
    let client = client.clone();
    let output = output.to_path_buf();
    fetch_bounded(downloads.to_vec(), limit, move |download: Download| {
        let client = client.clone();
        let output = output.clone();
        async move {
            debug!(source = %download.source, target = %download.target, "fetching download");
            let bytes = fetch::fetch_bytes(&client, &download.source).await?;
            tokio::fs::write(output.join(&download.target), bytes).await?;
            Ok::<(), AssembleError>(())
        }
    })
    .await
}

/// Step 8: obtain the manuals archive(s) and extract them into the output.
///
/// Two deployment modes: with `manual_archive_url` set, the archive is
/// downloaded once and cached next to the pre-supplied archives; otherwise
/// every `*.zip` already present under `<source>/manual/` is extracted.
async fn extract_manuals(
    client: &reqwest::Client,
    source: &Path,
    output: &Path,
    config: &SiteConfig,
) -> Result<usize, AssembleError> {
    let manual_dir = source.join("manual");
    let manual_out = output.join(MANUAL_ROOT);

    let archives: Vec<PathBuf> = if let Some(url) = &config.manual_archive_url {
        let cached = manual_dir.join(MANUAL_CACHE_NAME);
        if !cached.exists() {
            info!(%url, "downloading manuals archive");
            fs::create_dir_all(&manual_dir)?;
            let bytes = fetch::fetch_bytes(client, url).await?;
            tokio::fs::write(&cached, bytes).await?;
        }
        vec![cached]
    } else if manual_dir.is_dir() {
        let mut found: Vec<PathBuf> = fs::read_dir(&manual_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .map(|e| e.eq_ignore_ascii_case("zip"))
                        .unwrap_or(false)
            })
            .collect();
        found.sort();
        found
    } else {
        Vec::new()
    };

    for path in &archives {
        debug!(path = %path.display(), "extracting archive");
        extract_archive(path, &manual_out)?;
    }
    Ok(archives.len())
}

fn extract_archive(path: &Path, dest: &Path) -> Result<(), AssembleError> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| AssembleError::Archive {
        path: path.to_path_buf(),
        source,
    })?;
    archive.extract(dest).map_err(|source| AssembleError::Archive {
        path: path.to_path_buf(),
        source,
    })
}

/// Step 3: copy the static tree verbatim, preserving structure.
fn copy_static(src: &Path, dst: &Path) -> Result<(), AssembleError> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .expect("walked path is under the walk root");
        let dest = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
