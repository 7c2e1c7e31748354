//! Category definitions and the session-immutable vocabulary schema.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a tag category's values are physically stored on an image document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageKind {
    /// A list field directly on the document (`storage_path` is a bare
    /// field name).
    DirectArray,
    /// A list field behind a dotted path into a nested container
    /// (`storage_path` like `"group.subfield"`).
    NestedArray,
    /// A single free-text field; never participates in usage accounting.
    Text,
}

/// One tag category, supplied externally as configuration.
///
/// Categories are data, not code: the set of categories and their storage
/// locations can change between sessions without a code change. Within one
/// session a definition is treated as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    /// Stable identifier used as the key in tag states and usage counters.
    pub key: String,
    /// Human-readable name shown by the tagging tool.
    pub label: String,
    pub storage_kind: StorageKind,
    /// Bare field name or dotted path, depending on `storage_kind`.
    pub storage_path: String,
    /// Relative weight when the category participates in search ranking.
    #[serde(default = "CategoryDefinition::default_search_weight")]
    pub search_weight: f32,
}

impl CategoryDefinition {
    pub(crate) fn default_search_weight() -> f32 {
        1.0
    }

    /// True for categories whose values are lists of tags.
    pub fn is_list_valued(&self) -> bool {
        !matches!(self.storage_kind, StorageKind::Text)
    }
}

/// The full set of categories for one session, validated once at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CategoryDefinition>", into = "Vec<CategoryDefinition>")]
pub struct VocabularySchema {
    categories: Vec<CategoryDefinition>,
}

impl VocabularySchema {
    /// Build a schema, rejecting duplicate keys and malformed storage paths.
    pub fn new(categories: Vec<CategoryDefinition>) -> Result<Self, SchemaError> {
        let mut seen = std::collections::BTreeSet::new();
        for cat in &categories {
            if cat.key.trim().is_empty() {
                return Err(SchemaError::EmptyKey);
            }
            if !seen.insert(cat.key.clone()) {
                return Err(SchemaError::DuplicateKey(cat.key.clone()));
            }
            if cat.storage_path.is_empty()
                || cat.storage_path.split('.').any(|seg| seg.is_empty())
            {
                return Err(SchemaError::InvalidPath {
                    key: cat.key.clone(),
                    path: cat.storage_path.clone(),
                });
            }
        }
        Ok(Self { categories })
    }

    /// All categories, in configuration order.
    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    /// Look up one category by key.
    pub fn get(&self, key: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Only the list-valued categories (the ones usage accounting sees).
    pub fn list_valued(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.categories.iter().filter(|c| c.is_list_valued())
    }
}

impl TryFrom<Vec<CategoryDefinition>> for VocabularySchema {
    type Error = SchemaError;

    fn try_from(categories: Vec<CategoryDefinition>) -> Result<Self, Self::Error> {
        Self::new(categories)
    }
}

impl From<VocabularySchema> for Vec<CategoryDefinition> {
    fn from(schema: VocabularySchema) -> Self {
        schema.categories
    }
}

/// Schema-load failures; surfaced at session start, not at request time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("category key must not be empty")]
    EmptyKey,
    #[error("duplicate category key: {0}")]
    DuplicateKey(String),
    #[error("category {key} has invalid storage path {path:?}")]
    InvalidPath { key: String, path: String },
}
