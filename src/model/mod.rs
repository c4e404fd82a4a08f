//! Position-aware instance model.
//!
//! This module provides:
//! - `Ranged` and `LineRange`, the single-line range primitive in UTF-16 columns
//! - `InstanceModel`, the entity tree a dialect parser produces for one document

mod instance;
mod range;

pub use instance::{Entity, Entry, EntryDraft, EntryId, InstanceModel, Segment, SegmentKind, Value};
pub use range::{utf16_len, utf16_prefix, LineRange, Ranged};
