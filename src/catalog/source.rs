//! Backing stores the catalog provider loads snapshots from.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::CatalogError;

use super::CatalogSnapshot;

/// Version string of the catalog compiled into the server.
pub const BUILTIN_VERSION: &str = "builtin";

const BUILTIN_JSON: &str = include_str!("builtin.json");

/// Where catalog metadata comes from.
#[tower_lsp::async_trait]
pub trait CatalogSource: Send + Sync + 'static {
    async fn load(&self, version: &str) -> Result<CatalogSnapshot, CatalogError>;
}

/// Snapshots held in memory, keyed by version.
#[derive(Debug, Default)]
pub struct InMemoryCatalogSource {
    snapshots: HashMap<String, CatalogSnapshot>,
}

impl InMemoryCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, snapshot: CatalogSnapshot) -> Self {
        self.snapshots.insert(snapshot.version().to_string(), snapshot);
        self
    }
}

#[tower_lsp::async_trait]
impl CatalogSource for InMemoryCatalogSource {
    async fn load(&self, version: &str) -> Result<CatalogSnapshot, CatalogError> {
        self.snapshots
            .get(version)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownVersion(version.to_string()))
    }
}

/// One `<version>.json` file per version under a directory.
#[derive(Debug, Clone)]
pub struct DirectoryCatalogSource {
    root: PathBuf,
}

impl DirectoryCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[tower_lsp::async_trait]
impl CatalogSource for DirectoryCatalogSource {
    async fn load(&self, version: &str) -> Result<CatalogSnapshot, CatalogError> {
        // Versions come from configuration; keep them inside the root.
        if version.is_empty() || version.contains(['/', '\\']) || version.starts_with('.') {
            return Err(CatalogError::UnknownVersion(version.to_string()));
        }

        let path = self.root.join(format!("{version}.json"));
        debug!(path = %path.display(), "reading catalog");
        let json = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CatalogError::UnknownVersion(version.to_string())
            } else {
                CatalogError::Unreachable {
                    version: version.to_string(),
                    message: e.to_string(),
                }
            }
        })?;
        CatalogSnapshot::from_json(version, &json)
    }
}

/// The small catalog shipped inside the binary, under [`BUILTIN_VERSION`].
///
/// Other versions are delegated to `fallback` when one is set.
#[derive(Default)]
pub struct BuiltinCatalogSource {
    fallback: Option<Box<dyn CatalogSource>>,
}

impl BuiltinCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(fallback: impl CatalogSource) -> Self {
        Self {
            fallback: Some(Box::new(fallback)),
        }
    }
}

#[tower_lsp::async_trait]
impl CatalogSource for BuiltinCatalogSource {
    async fn load(&self, version: &str) -> Result<CatalogSnapshot, CatalogError> {
        if version == BUILTIN_VERSION {
            return CatalogSnapshot::from_json(BUILTIN_VERSION, BUILTIN_JSON);
        }
        match &self.fallback {
            Some(fallback) => fallback.load(version).await,
            None => Err(CatalogError::UnknownVersion(version.to_string())),
        }
    }
}

/// A source that never answers, for running without any catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCatalogSource;

#[tower_lsp::async_trait]
impl CatalogSource for UnavailableCatalogSource {
    async fn load(&self, version: &str) -> Result<CatalogSnapshot, CatalogError> {
        Err(CatalogError::Unreachable {
            version: version.to_string(),
            message: "no catalog source configured".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builtin_catalog_parses() {
        let snapshot = BuiltinCatalogSource::new().load(BUILTIN_VERSION).await.unwrap();
        assert!(snapshot.component("timer").is_some());
        assert!(snapshot.component("kafka").is_some());
    }

    #[tokio::test]
    async fn builtin_delegates_other_versions() {
        let memory = InMemoryCatalogSource::new().with_snapshot(CatalogSnapshot::new("4.0", Default::default()));
        let source = BuiltinCatalogSource::with_fallback(memory);
        assert_eq!(source.load("4.0").await.unwrap().version(), "4.0");
        assert_eq!(
            source.load("5.0").await.unwrap_err(),
            CatalogError::UnknownVersion("5.0".to_string())
        );
    }

    #[tokio::test]
    async fn directory_source_reads_version_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("4.8.0.json"),
            r#"{ "components": { "timer": { "title": "Timer" } } }"#,
        )
        .unwrap();

        let source = DirectoryCatalogSource::new(dir.path());
        let snapshot = source.load("4.8.0").await.unwrap();
        assert_eq!(snapshot.component("timer").unwrap().title, "Timer");

        assert_eq!(
            source.load("4.9.0").await.unwrap_err(),
            CatalogError::UnknownVersion("4.9.0".to_string())
        );
        assert!(source.load("../4.8.0").await.is_err());
    }

    #[tokio::test]
    async fn unavailable_source_always_fails() {
        let err = UnavailableCatalogSource.load("1").await.unwrap_err();
        assert!(matches!(err, CatalogError::Unreachable { .. }));
    }
}
