//! Set-semantics diffing of tag states.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use vocab::{TagState, TagValue, VocabularySchema};

/// The tags added and removed for one category between two tag states.
///
/// Always empty for text-kind categories, which never participate in usage
/// accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute per-category diffs between an old and a new tag state.
///
/// Only list-valued categories appear in the result; text categories are
/// skipped entirely. Comparison uses set semantics, so a tag repeated within
/// one category's value is not double counted. The two interesting special
/// cases fall out naturally: a new image is `old = {}` (everything added) and
/// a deletion is `new = {}` (everything removed).
pub fn diff_tags(
    old: &TagState,
    new: &TagState,
    schema: &VocabularySchema,
) -> BTreeMap<String, TagDiff> {
    let mut diffs = BTreeMap::new();
    for cat in schema.list_valued() {
        let old_set = tag_set(old.get(&cat.key));
        let new_set = tag_set(new.get(&cat.key));
        diffs.insert(
            cat.key.clone(),
            TagDiff {
                added: new_set.difference(&old_set).cloned().collect(),
                removed: old_set.difference(&new_set).cloned().collect(),
            },
        );
    }
    diffs
}

fn tag_set(value: Option<&TagValue>) -> BTreeSet<String> {
    match value {
        Some(TagValue::List(tags)) => tags.iter().cloned().collect(),
        // Text values under a list-valued key contribute nothing.
        Some(TagValue::Text(_)) | None => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab::{CategoryDefinition, StorageKind};

    fn schema() -> VocabularySchema {
        VocabularySchema::new(vec![
            CategoryDefinition {
                key: "style".into(),
                label: "Style".into(),
                storage_kind: StorageKind::DirectArray,
                storage_path: "style".into(),
                search_weight: 1.0,
            },
            CategoryDefinition {
                key: "mood".into(),
                label: "Mood".into(),
                storage_kind: StorageKind::NestedArray,
                storage_path: "attributes.mood".into(),
                search_weight: 1.0,
            },
            CategoryDefinition {
                key: "notes".into(),
                label: "Notes".into(),
                storage_kind: StorageKind::Text,
                storage_path: "notes".into(),
                search_weight: 1.0,
            },
        ])
        .expect("test schema is valid")
    }

    fn list(tags: &[&str]) -> TagValue {
        TagValue::List(tags.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn identical_states_diff_empty() {
        let mut state = TagState::new();
        state.insert("style".into(), list(&["modern", "bold"]));
        let diffs = diff_tags(&state, &state, &schema());
        assert!(diffs.values().all(TagDiff::is_empty));
        // Every list-valued category is present, text is not.
        assert!(diffs.contains_key("style"));
        assert!(diffs.contains_key("mood"));
        assert!(!diffs.contains_key("notes"));
    }

    #[test]
    fn new_image_adds_everything() {
        let mut new = TagState::new();
        new.insert("style".into(), list(&["modern", "bold"]));
        let diffs = diff_tags(&TagState::new(), &new, &schema());
        let style = &diffs["style"];
        assert_eq!(
            style.added,
            ["bold", "modern"].iter().map(|s| s.to_string()).collect()
        );
        assert!(style.removed.is_empty());
    }

    #[test]
    fn deletion_removes_everything() {
        let mut old = TagState::new();
        old.insert("mood".into(), list(&["calm"]));
        let diffs = diff_tags(&old, &TagState::new(), &schema());
        assert_eq!(diffs["mood"].removed.len(), 1);
        assert!(diffs["mood"].added.is_empty());
    }

    #[test]
    fn edit_yields_both_sides() {
        let mut old = TagState::new();
        old.insert("style".into(), list(&["modern", "retro"]));
        let mut new = TagState::new();
        new.insert("style".into(), list(&["modern", "bold"]));
        let diffs = diff_tags(&old, &new, &schema());
        assert_eq!(diffs["style"].added, BTreeSet::from(["bold".to_string()]));
        assert_eq!(diffs["style"].removed, BTreeSet::from(["retro".to_string()]));
    }

    #[test]
    fn duplicate_entries_not_double_counted() {
        let mut new = TagState::new();
        new.insert("style".into(), list(&["modern", "modern", "modern"]));
        let diffs = diff_tags(&TagState::new(), &new, &schema());
        assert_eq!(diffs["style"].added.len(), 1);
    }

    #[test]
    fn text_category_never_diffs() {
        let mut old = TagState::new();
        old.insert("notes".into(), TagValue::Text("before".into()));
        let mut new = TagState::new();
        new.insert("notes".into(), TagValue::Text("after, completely different".into()));
        let diffs = diff_tags(&old, &new, &schema());
        assert!(!diffs.contains_key("notes"));
    }
}
