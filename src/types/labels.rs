//! Label sets attached to emitted points.

use std::collections::BTreeMap;

use serde::Serialize;

/// Mapping from label key to label value.
///
/// Keys are unique, insertion order is irrelevant, and the empty set is
/// valid (no labels attached). Built per request from query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    /// Create an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single label.
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.insert(key, value);
        set
    }

    /// Insert a label, replacing any existing value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a label value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether the set carries no labels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of labels in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over (key, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_valid() {
        let labels = LabelSet::new();
        assert!(labels.is_empty());
        assert_eq!(labels.len(), 0);
    }

    #[test]
    fn single_builds_one_entry() {
        let labels = LabelSet::single("status", "happy");
        assert_eq!(labels.get("status"), Some("happy"));
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut labels = LabelSet::single("status", "happy");
        labels.insert("status", "fussy");
        assert_eq!(labels.get("status"), Some("fussy"));
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn serializes_as_plain_map() {
        let labels = LabelSet::single("status", "happy");
        let json = serde_json::to_string(&labels).unwrap();
        assert_eq!(json, r#"{"status":"happy"}"#);
    }
}
