//! Document operations shared by the LSP backend and the tests.
//!
//! The engine owns the open documents and the catalog provider. Requests
//! never fail: an unknown document or an unavailable catalog yields an
//! empty result.

use std::sync::Arc;

use tower_lsp::lsp_types::{CompletionItem, Diagnostic, Hover, Position, Url};
use tracing::debug;

use crate::catalog::{CatalogProvider, CatalogSnapshot, CatalogSource};
use crate::dialect::Dialect;
use crate::document::{DocumentState, DocumentStore};
use crate::lsp;
use crate::settings::Settings;

pub struct Engine {
    documents: DocumentStore,
    catalogs: CatalogProvider,
    /// Version bound to documents opened from now on.
    catalog_version: String,
}

impl Engine {
    pub fn new(source: impl CatalogSource, catalog_version: impl Into<String>) -> Self {
        Self {
            documents: DocumentStore::new(),
            catalogs: CatalogProvider::new(source),
            catalog_version: catalog_version.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.catalog_source(), settings.catalog_version())
    }

    pub fn catalog_version(&self) -> &str {
        &self.catalog_version
    }

    /// Open (or reopen) a document and start loading its catalog.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open_document(
        &self,
        uri: Url,
        dialect: Dialect,
        text: String,
        version: i32,
    ) -> Arc<DocumentState> {
        debug!(%uri, ?dialect, version, "open document");
        let state = self.documents.open(DocumentState::new(
            uri,
            dialect,
            text,
            version,
            self.catalog_version.clone(),
        ));
        // Warm the cache; the load outlives the dropped handle.
        self.catalogs.resolve(&state.catalog_version);
        state
    }

    /// Replace the text of an open document. None if it is not open.
    pub fn change_document(&self, uri: &Url, text: String, version: i32) -> Option<Arc<DocumentState>> {
        let state = self.documents.change(uri, text, version);
        if state.is_none() {
            debug!(%uri, "change for a document that is not open");
        }
        state
    }

    pub fn close_document(&self, uri: &Url) {
        debug!(%uri, "close document");
        self.documents.close(uri);
    }

    pub fn document(&self, uri: &Url) -> Option<Arc<DocumentState>> {
        self.documents.get(uri)
    }

    /// Whether `state` has not been replaced or closed since it was read.
    pub fn is_current(&self, state: &DocumentState) -> bool {
        self.documents.is_current(state)
    }

    async fn snapshot(&self, version: &str) -> Option<Arc<CatalogSnapshot>> {
        match self.catalogs.resolve(version).snapshot().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(error = %e, "no catalog, empty result");
                None
            }
        }
    }

    pub async fn completions(&self, uri: &Url, position: Position) -> Vec<CompletionItem> {
        let Some(state) = self.documents.get(uri) else {
            return Vec::new();
        };
        let Some(position) = state.line_index.normalize(&state.source, position) else {
            return Vec::new();
        };
        let Some(snapshot) = self.snapshot(&state.catalog_version).await else {
            return Vec::new();
        };
        lsp::completion_at_position(&state.model, position, &snapshot, state.dialect)
    }

    /// Diagnostics for the current state of `uri`.
    pub async fn diagnostics(&self, uri: &Url) -> Vec<Diagnostic> {
        match self.documents.get(uri) {
            Some(state) => self.diagnostics_for(&state).await,
            None => Vec::new(),
        }
    }

    /// Diagnostics for one specific parse of a document.
    ///
    /// The document may change while the catalog loads; check
    /// [`Engine::is_current`] before publishing the result.
    pub async fn diagnostics_for(&self, state: &DocumentState) -> Vec<Diagnostic> {
        match self.snapshot(&state.catalog_version).await {
            Some(snapshot) => lsp::validate(&state.model, &snapshot),
            None => Vec::new(),
        }
    }

    pub async fn hover(&self, uri: &Url, position: Position) -> Option<Hover> {
        let state = self.documents.get(uri)?;
        let position = state.line_index.normalize(&state.source, position)?;
        let snapshot = self.snapshot(&state.catalog_version).await?;
        lsp::hover_at_position(&state.model, position, &snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalogSource, UnavailableCatalogSource, BUILTIN_VERSION};

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///app/{}", name)).unwrap()
    }

    fn engine() -> Engine {
        Engine::from_settings(&Settings::default())
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    #[tokio::test]
    async fn component_completion_after_namespace() {
        let engine = engine();
        let uri = uri("application.properties");
        engine.open_document(uri.clone(), Dialect::Properties, "camel.component.".into(), 1);

        let items = engine.completions(&uri, Position::new(0, 16)).await;
        assert_eq!(labels(&items), ["file", "kafka", "log", "timer"]);
    }

    #[tokio::test]
    async fn parameter_completion_filters_by_prefix() {
        let engine = engine();
        let uri = uri("application.properties");
        engine.open_document(uri.clone(), Dialect::Properties, "camel.component.timer.de".into(), 1);

        let items = engine.completions(&uri, Position::new(0, 24)).await;
        assert_eq!(labels(&items), ["delay"]);
    }

    #[tokio::test]
    async fn columns_past_line_end_are_clamped() {
        let engine = engine();
        let uri = uri("application.properties");
        engine.open_document(uri.clone(), Dialect::Properties, "camel.component.".into(), 1);

        let items = engine.completions(&uri, Position::new(0, 400)).await;
        assert_eq!(items.len(), 4);
        assert!(engine.completions(&uri, Position::new(7, 0)).await.is_empty());
    }

    #[tokio::test]
    async fn diagnostics_follow_changes() {
        let engine = engine();
        let uri = uri("application.properties");
        engine.open_document(uri.clone(), Dialect::Properties, "camel.component.tmer.delay=1".into(), 1);
        assert_eq!(engine.diagnostics(&uri).await.len(), 1);

        engine.change_document(&uri, "camel.component.timer.delay=1".into(), 2).unwrap();
        assert!(engine.diagnostics(&uri).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_documents_give_empty_results() {
        let engine = engine();
        let uri = uri("missing.properties");
        assert!(engine.change_document(&uri, String::new(), 1).is_none());
        assert!(engine.completions(&uri, Position::new(0, 0)).await.is_empty());
        assert!(engine.diagnostics(&uri).await.is_empty());
        assert!(engine.hover(&uri, Position::new(0, 0)).await.is_none());
    }

    #[tokio::test]
    async fn closed_documents_are_forgotten() {
        let engine = engine();
        let uri = uri("application.properties");
        engine.open_document(uri.clone(), Dialect::Properties, "camel.component.nope.x=1".into(), 1);
        engine.close_document(&uri);
        assert!(engine.document(&uri).is_none());
        assert!(engine.diagnostics(&uri).await.is_empty());
    }

    #[tokio::test]
    async fn unavailable_catalog_fails_open() {
        let engine = Engine::new(UnavailableCatalogSource, BUILTIN_VERSION);
        let uri = uri("application.properties");
        engine.open_document(uri.clone(), Dialect::Properties, "camel.component.nope.delay=x".into(), 1);

        assert!(engine.diagnostics(&uri).await.is_empty());
        assert!(engine.completions(&uri, Position::new(0, 16)).await.is_empty());
        assert!(engine.hover(&uri, Position::new(0, 18)).await.is_none());
    }

    #[tokio::test]
    async fn documents_keep_the_catalog_version_they_opened_with() {
        let source = InMemoryCatalogSource::new().with_snapshot(CatalogSnapshot::new("empty", Default::default()));
        let engine = Engine::new(source, "empty");
        let uri = uri("application.properties");
        let state = engine.open_document(uri.clone(), Dialect::Properties, "camel.component.timer".into(), 1);
        assert_eq!(state.catalog_version, "empty");

        let changed = engine.change_document(&uri, "camel.component.log".into(), 2).unwrap();
        assert_eq!(changed.catalog_version, "empty");
        assert_eq!(engine.diagnostics(&uri).await.len(), 1);
    }

    #[tokio::test]
    async fn superseded_state_is_not_current() {
        let engine = engine();
        let uri = uri("application.properties");
        let first = engine.open_document(uri.clone(), Dialect::Properties, "a=1".into(), 1);
        assert!(engine.is_current(&first));

        let second = engine.change_document(&uri, "a=2".into(), 2).unwrap();
        assert!(!engine.is_current(&first));
        assert!(engine.is_current(&second));
    }

    #[tokio::test]
    async fn hover_on_yaml_parameter() {
        let engine = engine();
        let uri = uri("application.yaml");
        let text = "camel:\n  component:\n    timer:\n      period: 5s\n";
        engine.open_document(uri.clone(), Dialect::Yaml, text.into(), 1);

        let hover = engine.hover(&uri, Position::new(3, 8)).await.unwrap();
        assert_eq!(hover.range.map(|r| (r.start.character, r.end.character)), Some((6, 12)));
    }
}
