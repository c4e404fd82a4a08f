//! Settings infrastructure for camel-lsp.
//!
//! Settings come from a `camel-lsp.toml` file found near the workspace root,
//! optionally overridden by the client's `initializationOptions`:
//!
//! ```toml
//! [catalog]
//! version = "4.8.0"
//! path = "catalogs"   # directory holding <version>.json files
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::{BuiltinCatalogSource, DirectoryCatalogSource, BUILTIN_VERSION};
use crate::error::SettingsError;

pub const SETTINGS_FILE: &str = "camel-lsp.toml";

/// Root settings structure.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
}

/// Which catalog documents are checked against.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CatalogSettings {
    /// Catalog version; the built-in catalog when unset.
    pub version: Option<String>,
    /// Directory of `<version>.json` catalog files.
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Make a relative catalog path relative to `base` instead.
    fn resolve_paths(mut self, base: &Path) -> Self {
        if let Some(path) = self.catalog.path.take() {
            self.catalog.path = Some(if path.is_absolute() {
                path
            } else {
                base.join(path)
            });
        }
        self
    }

    /// Apply the client's `initializationOptions` on top of these settings.
    ///
    /// Unrecognized option shapes are ignored.
    pub fn merge_initialization_options(&mut self, options: &serde_json::Value, base: &Path) {
        let overrides = match serde_json::from_value::<Settings>(options.clone()) {
            Ok(overrides) => overrides.resolve_paths(base),
            Err(e) => {
                warn!(error = %e, "ignoring malformed initialization options");
                return;
            }
        };
        if overrides.catalog.version.is_some() {
            self.catalog.version = overrides.catalog.version;
        }
        if overrides.catalog.path.is_some() {
            self.catalog.path = overrides.catalog.path;
        }
    }

    pub fn catalog_version(&self) -> &str {
        self.catalog.version.as_deref().unwrap_or(BUILTIN_VERSION)
    }

    /// The built-in catalog, backed by the configured directory if any.
    pub fn catalog_source(&self) -> BuiltinCatalogSource {
        match &self.catalog.path {
            Some(path) => BuiltinCatalogSource::with_fallback(DirectoryCatalogSource::new(path)),
            None => BuiltinCatalogSource::new(),
        }
    }
}

/// Load settings from a settings file.
///
/// Relative paths inside the file are resolved against its directory.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(settings.resolve_paths(base))
}

/// Discover `camel-lsp.toml` by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// An unusable file is logged and replaced by default settings.
pub fn discover_settings(start_dir: &Path) -> Settings {
    match find_settings_file(start_dir) {
        Some(path) => {
            debug!(path = %path.display(), "loading settings");
            load_settings(&path).unwrap_or_else(|e| {
                warn!(error = %e, "using default settings");
                Settings::default()
            })
        }
        None => Settings::default(),
    }
}

fn find_settings_file(start_dir: &Path) -> Option<PathBuf> {
    // Phase 1: Walk up from start_dir
    let found = start_dir
        .ancestors()
        .map(|dir| dir.join(SETTINGS_FILE))
        .find(|candidate| candidate.is_file());
    if found.is_some() {
        return found;
    }

    // Phase 2: Check immediate child directories
    std::fs::read_dir(start_dir)
        .ok()?
        .flatten()
        .filter(|entry| entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
        .map(|entry| entry.path().join(SETTINGS_FILE))
        .find(|candidate| candidate.is_file())
}
