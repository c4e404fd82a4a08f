//! Error types for the Camel language server.
//!
//! None of these cross the document-facing operations of the engine: a
//! missing catalog or malformed document yields empty results instead.

use std::path::PathBuf;

/// The catalog for a version could not be produced.
///
/// Every variant is a "catalog unavailable" condition; resolvers and the
/// validator treat them all alike and return empty results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog version '{0}' is unknown")]
    UnknownVersion(String),

    #[error("catalog source for version '{version}' is unreachable: {message}")]
    Unreachable { version: String, message: String },

    #[error("catalog for version '{version}' is malformed: {message}")]
    Malformed { version: String, message: String },

    #[error("catalog load for version '{0}' ended without a result")]
    LoadAborted(String),
}

/// A settings file exists but cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Rejected command-line arguments.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("the provided port '{0}' is invalid")]
    InvalidPort(String),

    #[error("unknown argument '{0}'")]
    Unknown(String),
}
