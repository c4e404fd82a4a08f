//! Document state management.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use crate::dialect::Dialect;
use crate::model::InstanceModel;

use super::text::LineIndex;

/// Immutable parse of one version of an open document.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub uri: Url,
    pub dialect: Dialect,
    /// Document version from the client.
    pub version: i32,
    pub source: String,
    pub line_index: LineIndex,
    pub model: InstanceModel,
    /// Catalog version this document is checked against.
    pub catalog_version: String,
}

impl DocumentState {
    /// Parse `source` with the dialect's parser.
    pub fn new(
        uri: Url,
        dialect: Dialect,
        source: String,
        version: i32,
        catalog_version: String,
    ) -> Self {
        let model = dialect.parse(&source);
        let line_index = LineIndex::new(&source);
        Self {
            uri,
            dialect,
            version,
            source,
            line_index,
            model,
            catalog_version,
        }
    }

    /// Re-parse new text, keeping the document's identity and bindings.
    pub fn reparse(&self, source: String, version: i32) -> Self {
        Self::new(
            self.uri.clone(),
            self.dialect,
            source,
            version,
            self.catalog_version.clone(),
        )
    }
}

/// Thread-safe storage for open documents.
///
/// A change builds a complete new state before swapping it in, so readers
/// see either the old or the new parse, never a partial one.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<DocumentState>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open a document, replacing any previous state for the uri.
    pub fn open(&self, state: DocumentState) -> Arc<DocumentState> {
        let state = Arc::new(state);
        self.documents.insert(state.uri.clone(), Arc::clone(&state));
        state
    }

    /// Replace the text of an open document. Returns None for unknown uris.
    pub fn change(&self, uri: &Url, source: String, version: i32) -> Option<Arc<DocumentState>> {
        // Readers of this document wait on the entry lock until the new
        // parse is in place.
        let mut slot = self.documents.get_mut(uri)?;
        let state = Arc::new(slot.reparse(source, version));
        *slot = Arc::clone(&state);
        Some(state)
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentState>> {
        self.documents.get(uri).map(|r| Arc::clone(&r))
    }

    /// Whether `state` is still the published state of its document.
    pub fn is_current(&self, state: &DocumentState) -> bool {
        self.documents
            .get(&state.uri)
            .is_some_and(|current| std::ptr::eq(Arc::as_ptr(&current), state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Url {
        Url::parse("file:///app/application.properties").unwrap()
    }

    fn open(store: &DocumentStore, text: &str) -> Arc<DocumentState> {
        store.open(DocumentState::new(
            uri(),
            Dialect::Properties,
            text.to_string(),
            1,
            "builtin".to_string(),
        ))
    }

    #[test]
    fn open_parses_the_text() {
        let store = DocumentStore::new();
        let state = open(&store, "camel.component.timer.delay=1");
        assert_eq!(state.model.entries().len(), 1);
        assert!(store.get(&uri()).is_some());
    }

    #[test]
    fn change_replaces_the_whole_model() {
        let store = DocumentStore::new();
        let old = open(&store, "camel.component.timer.delay=1");
        let new = store
            .change(&uri(), "camel.component.log.level=INFO\ncamel.component.file.x=1".to_string(), 2)
            .unwrap();

        assert_eq!(new.version, 2);
        assert_eq!(new.model.entries().len(), 2);
        assert_eq!(new.catalog_version, "builtin");
        // Holders of the old state keep a consistent snapshot.
        assert_eq!(old.model.entries().len(), 1);
        assert!(!store.is_current(&old));
        assert!(store.is_current(&new));
    }

    #[test]
    fn change_of_unknown_document() {
        let store = DocumentStore::new();
        assert!(store.change(&uri(), String::new(), 1).is_none());
    }

    #[test]
    fn close_releases() {
        let store = DocumentStore::new();
        let state = open(&store, "");
        store.close(&uri());
        assert!(store.get(&uri()).is_none());
        assert!(!store.is_current(&state));
    }
}
