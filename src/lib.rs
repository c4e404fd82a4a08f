//! Apache Camel configuration Language Server implementation.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};
use tracing::{debug, info, warn};

pub mod catalog;
pub mod dialect;
pub mod document;
pub mod engine;
pub mod error;
pub mod lsp;
pub mod model;
pub mod settings;
pub mod transport;

pub use dialect::Dialect;
pub use document::{DocumentState, LineIndex};
pub use engine::Engine;
pub use settings::{discover_settings, load_settings, Settings};

pub struct Backend {
    client: Client,
    engine: OnceLock<Engine>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            engine: OnceLock::new(),
        }
    }

    /// The engine built at initialization, or a default one for clients
    /// that skip it.
    fn engine(&self) -> &Engine {
        self.engine
            .get_or_init(|| Engine::from_settings(&Settings::default()))
    }

    /// Validate a document and publish the diagnostics unless it changed meanwhile.
    async fn publish_diagnostics_for(&self, state: Arc<DocumentState>) {
        let engine = self.engine();
        let diagnostics = engine.diagnostics_for(&state).await;
        if !engine.is_current(&state) {
            debug!(uri = %state.uri, version = state.version, "discarding stale diagnostics");
            return;
        }
        self.client
            .publish_diagnostics(state.uri.clone(), diagnostics, Some(state.version))
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract workspace root from params
        let workspace_root: Option<PathBuf> = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        let mut settings = match &workspace_root {
            Some(root) => settings::discover_settings(root),
            None => Settings::default(),
        };
        if let Some(options) = &params.initialization_options {
            let base = workspace_root.clone().unwrap_or_default();
            settings.merge_initialization_options(options, &base);
        }
        let engine = Engine::from_settings(&settings);
        info!(
            root = ?workspace_root,
            catalog = engine.catalog_version(),
            "initializing"
        );
        if let Err(ignored) = self.engine.set(engine) {
            warn!(
                catalog = ignored.catalog_version(),
                "server already initialized, keeping the first configuration"
            );
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string(), "=".to_string()]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Camel language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        let Some(dialect) = Dialect::detect(&document.uri, &document.language_id) else {
            debug!(uri = %document.uri, language = %document.language_id, "not a Camel configuration file");
            return;
        };
        let state = self
            .engine()
            .open_document(document.uri, dialect, document.text, document.version);
        self.publish_diagnostics_for(state).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // We use FULL sync, so the last change carries the full text
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        let uri = params.text_document.uri;
        if let Some(state) =
            self.engine()
                .change_document(&uri, change.text, params.text_document.version)
        {
            self.publish_diagnostics_for(state).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.engine().close_document(&params.text_document.uri);
        // Clear diagnostics
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(self.engine().hover(uri, position).await)
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let items = self.engine().completions(uri, position).await;
        debug!(%uri, ?position, items = items.len(), "completion");
        Ok(Some(CompletionResponse::Array(items)))
    }
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::new(Backend::new)
}
