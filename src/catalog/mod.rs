//! Versioned component catalog.
//!
//! This module provides:
//! - `CatalogSnapshot`, the immutable metadata of one catalog version
//! - `CatalogSource` and its implementations, where snapshots are loaded from
//! - `CatalogProvider`, the per-version single-flight cache handing out `CatalogHandle`s

mod provider;
mod snapshot;
mod source;

pub use provider::{CatalogHandle, CatalogProvider};
pub use snapshot::{kebab_to_camel, CatalogSnapshot, ComponentModel, ParameterModel, ParameterType};
pub use source::{
    BuiltinCatalogSource, CatalogSource, DirectoryCatalogSource, InMemoryCatalogSource,
    UnavailableCatalogSource, BUILTIN_VERSION,
};
