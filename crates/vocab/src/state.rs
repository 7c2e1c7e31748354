//! Tag states: the per-image snapshot of tag selections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::{read_path, write_path};
use crate::schema::{StorageKind, VocabularySchema};

/// The value of one category on one image: a list of tags for list-valued
/// categories, a single string for text categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    List(Vec<String>),
    Text(String),
}

impl TagValue {
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            TagValue::List(list) => Some(list),
            TagValue::Text(_) => None,
        }
    }
}

/// Mapping from category key to that category's value on one image.
pub type TagState = BTreeMap<String, TagValue>;

/// Extract a [`TagState`] from an image document under the given schema.
///
/// Each category's value is read from its configured storage path; absent
/// paths simply produce no entry. Non-string list elements are ignored.
pub fn read_state(doc: &Value, schema: &VocabularySchema) -> TagState {
    let mut state = TagState::new();
    for cat in schema.categories() {
        let Some(value) = read_path(doc, &cat.storage_path) else {
            continue;
        };
        match cat.storage_kind {
            StorageKind::DirectArray | StorageKind::NestedArray => {
                if let Value::Array(items) = value {
                    let tags: Vec<String> = items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect();
                    state.insert(cat.key.clone(), TagValue::List(tags));
                }
            }
            StorageKind::Text => {
                if let Some(text) = value.as_str() {
                    state.insert(cat.key.clone(), TagValue::Text(text.to_string()));
                }
            }
        }
    }
    state
}

/// Write a [`TagState`] back onto an image document, walking or creating
/// each category's storage path. Categories absent from the state are left
/// untouched on the document.
pub fn write_state(doc: &mut Value, state: &TagState, schema: &VocabularySchema) {
    for cat in schema.categories() {
        let Some(value) = state.get(&cat.key) else {
            continue;
        };
        let json = match (cat.storage_kind, value) {
            (StorageKind::DirectArray | StorageKind::NestedArray, TagValue::List(tags)) => {
                Value::Array(tags.iter().cloned().map(Value::String).collect())
            }
            (StorageKind::Text, TagValue::Text(text)) => Value::String(text.clone()),
            // Value shape disagrees with the schema; skip rather than corrupt.
            _ => continue,
        };
        write_path(doc, &cat.storage_path, json);
    }
}
