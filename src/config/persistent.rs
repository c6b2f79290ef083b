//! Catalog overrides persisted between runs
//!
//! The file stores only what the user changed relative to the built-in
//! catalogs, as JSON. Loading layers it over the defaults, so variants or
//! parameters added in a newer build show up even with an old file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::catalog::{CatalogOverride, Catalogs};
use crate::constants::config::{APP_DIR, FILENAME, PATH_ENV};

/// On-disk catalog configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embedding: CatalogOverride,
    #[serde(default)]
    pub alignment: CatalogOverride,
    #[serde(default)]
    pub classifier: CatalogOverride,
}

impl Config {
    /// Default location: `$EMBEDDING_EXPLORER_CONFIG`, else the user config dir
    pub fn path() -> PathBuf {
        if let Ok(path) = std::env::var(PATH_ENV)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push(FILENAME);
        path
    }

    /// Snapshot the full contents of `catalogs` as overrides
    pub fn from_catalogs(catalogs: &Catalogs) -> Self {
        Self {
            embedding: CatalogOverride::from(&catalogs.embedding),
            alignment: CatalogOverride::from(&catalogs.alignment),
            classifier: CatalogOverride::from(&catalogs.classifier),
        }
    }

    /// Read the config at `path`; a missing file means "no overrides"
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using built-in catalogs");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;

        info!(path = %path.display(), "Loaded catalog config");
        Ok(config)
    }

    /// Write the config, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        fs::write(path, json).with_context(|| format!("Failed to write config to {:?}", path))?;

        info!(path = %path.display(), "Saved catalog config");
        Ok(())
    }

    /// Built-in catalogs with this config layered on top
    pub fn into_catalogs(self) -> Catalogs {
        let mut catalogs = Catalogs::default();
        catalogs.embedding.merge(self.embedding);
        catalogs.alignment.merge(self.alignment);
        catalogs.classifier.merge(self.classifier);

        for (kind, selected) in catalogs.dangling_selections() {
            warn!(catalog = %kind, selected = %selected, "Configured selection has no catalog entry");
        }
        catalogs
    }
}
