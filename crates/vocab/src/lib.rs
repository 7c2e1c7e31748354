//! Runtime-configurable tag vocabulary.
//!
//! Tag categories are data, not code: each [`CategoryDefinition`] describes a
//! category's key, label, and how its values are physically stored on an
//! image document — a direct list field, a nested list field behind a dotted
//! path, or a single free-text field. A [`VocabularySchema`] is fetched once
//! per session, validated, and treated as immutable input for everything
//! downstream (tag diffing, path resolution, search weighting).
//!
//! Adding a category is a configuration change only; nothing in this crate
//! names a specific category.

mod path;
mod schema;
mod state;

pub use crate::path::{read_path, write_path};
pub use crate::schema::{CategoryDefinition, SchemaError, StorageKind, VocabularySchema};
pub use crate::state::{read_state, write_state, TagState, TagValue};
