//! LSP protocol feature implementations.
//!
//! Every feature is a pure function over an instance model and a catalog
//! snapshot:
//! - Completion of component ids, parameter names and values
//! - Diagnostics from validating entries against the catalog
//! - Hover documentation for component and parameter names

mod completion;
mod diagnostics;
mod hover;

pub use completion::{completion_at_position, completions_for_entity};
pub use diagnostics::validate;
pub use hover::hover_at_position;
