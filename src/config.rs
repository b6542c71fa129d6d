//! Site configuration module.
//!
//! Handles loading and validating the optional `config.toml` at the content
//! root. Config files are sparse: override just the values you want, unknown
//! keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # Base URL for translation-source fetches; a pending translation's
//! # source document is fetched from <translation_cache>/<wiki-id>
//! translation_cache = "https://cache.thwiki.cc"
//!
//! # Base URL used when rendering wiki reference links
//! wiki_base = "https://thwiki.cc"
//!
//! # Maximum number of asset downloads in flight at once
//! download_concurrency = 5
//!
//! # Alternate deployment mode: fetch the manuals archive from this URL
//! # (cached at <source>/manual/manual.zip) instead of extracting the
//! # archives already present under <source>/manual/
//! # manual_archive_url = "https://archive.example/manuals.zip"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Base URL of the translation cache host.
    pub translation_cache: String,
    /// Base URL for rendered wiki links.
    pub wiki_base: String,
    /// When set, download the manuals archive from this URL once instead of
    /// scanning `<source>/manual/` for pre-supplied archives.
    pub manual_archive_url: Option<String>,
    /// Bound on concurrent asset downloads.
    pub download_concurrency: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            translation_cache: "https://cache.thwiki.cc".to_string(),
            wiki_base: "https://thwiki.cc".to_string(),
            manual_archive_url: None,
            download_concurrency: 5,
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.download_concurrency == 0 {
            return Err(ConfigError::Validation(
                "download_concurrency must be at least 1".into(),
            ));
        }
        if self.translation_cache.is_empty() {
            return Err(ConfigError::Validation(
                "translation_cache must not be empty".into(),
            ));
        }
        if self.wiki_base.is_empty() {
            return Err(ConfigError::Validation("wiki_base must not be empty".into()));
        }
        Ok(())
    }
}

/// Load config from `<root>/config.toml`, falling back to defaults when the
/// file does not exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join("config.toml");
    let config = if path.exists() {
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// A stock `config.toml` with every option documented, for `gen-config`.
pub fn stock_config_toml() -> String {
    r#"# curio site configuration
# All options are optional - defaults shown below.

# Base URL for translation-source fetches. A pending translation's source
# document is fetched from <translation_cache>/<wiki-id>.
translation_cache = "https://cache.thwiki.cc"

# Base URL used when rendering wiki reference links.
wiki_base = "https://thwiki.cc"

# Maximum number of asset downloads in flight at once.
download_concurrency = 5

# Alternate deployment mode: fetch the manuals archive from this URL
# (cached at <source>/manual/manual.zip) instead of extracting the archives
# already present under <source>/manual/.
# manual_archive_url = "https://archive.example/manuals.zip"
"#
    .to_string()
}
