//! Cached, single-flight access to catalog snapshots.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::CatalogError;

use super::{CatalogSnapshot, CatalogSource};

type LoadResult = Result<Arc<CatalogSnapshot>, CatalogError>;
type LoadSlot = watch::Receiver<Option<LoadResult>>;

/// Resolves catalog versions to shared snapshots.
///
/// Each version is loaded at most once at a time: the first request spawns a
/// load task and every other request for that version waits on the same
/// task. Dropping a [`CatalogHandle`] never cancels the load. Successful
/// snapshots stay cached; failed loads are forgotten so a later request
/// tries again.
pub struct CatalogProvider {
    source: Arc<dyn CatalogSource>,
    loads: Arc<DashMap<String, LoadSlot>>,
}

impl CatalogProvider {
    pub fn new(source: impl CatalogSource) -> Self {
        Self {
            source: Arc::new(source),
            loads: Arc::new(DashMap::new()),
        }
    }

    /// Start or join the load of `version`. Never blocks; must be called
    /// from within a Tokio runtime.
    pub fn resolve(&self, version: &str) -> CatalogHandle {
        let slot = self
            .loads
            .entry(version.to_string())
            .or_insert_with(|| self.start_load(version))
            .clone();

        CatalogHandle {
            version: version.to_string(),
            slot,
        }
    }

    fn start_load(&self, version: &str) -> LoadSlot {
        let (tx, rx) = watch::channel(None);
        let source = Arc::clone(&self.source);
        let loads = Arc::clone(&self.loads);
        let version = version.to_string();

        debug!(%version, "starting catalog load");
        tokio::spawn(async move {
            let result = source.load(&version).await.map(Arc::new);
            match &result {
                Ok(snapshot) => info!(
                    %version,
                    components = snapshot.components().count(),
                    "catalog loaded"
                ),
                Err(e) => warn!(%version, error = %e, "catalog unavailable"),
            }
            let failed = result.is_err();
            tx.send_replace(Some(result));
            if failed {
                loads.remove(&version);
            }
        });

        rx
    }
}

/// A pending or completed catalog load.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    version: String,
    slot: LoadSlot,
}

impl CatalogHandle {
    /// Wait for the snapshot.
    pub async fn snapshot(mut self) -> LoadResult {
        match self.slot.wait_for(Option::is_some).await {
            Ok(published) => published
                .as_ref()
                .cloned()
                .unwrap_or_else(|| Err(CatalogError::LoadAborted(self.version.clone()))),
            // The load task went away without publishing.
            Err(_) => Err(CatalogError::LoadAborted(self.version.clone())),
        }
    }
}
