//! Generic dotted-path resolution over JSON documents.
//!
//! Image documents are modeled as `serde_json::Value` objects; a category's
//! `storage_path` is either a bare field name or a dotted path like
//! `"attributes.mood"`. Resolution is fully generic over the path, so no
//! category name appears anywhere in this module.

use serde_json::{Map, Value};

/// Read the value at a dotted path. Returns `None` when any segment is
/// absent or a non-object intervenes.
pub fn read_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Write `value` at a dotted path, creating intermediate objects as needed.
/// Non-object intermediates are replaced with objects.
pub fn write_path(doc: &mut Value, path: &str, value: Value) {
    let (parents, last) = match path.rsplit_once('.') {
        Some((head, last)) => (head, last),
        None => ("", path),
    };

    let mut current = doc;
    if !parents.is_empty() {
        for segment in parents.split('.') {
            if !matches!(current, Value::Object(_)) {
                *current = Value::Object(Map::new());
            }
            let Value::Object(map) = current else {
                return;
            };
            current = map
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }

    if !matches!(current, Value::Object(_)) {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}
