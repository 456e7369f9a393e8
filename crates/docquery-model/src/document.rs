//! Insertion-ordered document type.
//!
//! Key order is part of the contract: operator documents are emitted in the
//! order operators were recorded, and re-inserting an existing key replaces
//! the value in place without moving it.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::value::Value;

/// An ordered `String -> Value` map.
///
/// Equality ignores key order (two documents with the same entries are
/// equal); iteration and serialization follow insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document(IndexMap<String, Value>);

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Create a document holding a single entry.
    #[must_use]
    pub fn single(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut doc = Self::new();
        doc.insert(key, value);
        doc
    }

    /// Builder-style insert, returning the document.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous value for the key if present.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a value mutably by key.
    #[must_use]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove a key, shifting later entries down to preserve order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the document has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equality ignores order, so hash entries sorted by key.
        let mut pairs: Vec<_> = self.0.iter().collect();
        pairs.sort_by_key(|(k, _)| *k);
        pairs.len().hash(state);
        for (k, v) in pairs {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_preserve_insertion_order() {
        let doc = Document::new().with("b", 1).with("a", 2).with("c", 3);
        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(doc.to_string(), r#"{"b":1,"a":2,"c":3}"#);
    }

    #[test]
    fn test_should_replace_value_in_place() {
        let mut doc = Document::new().with("x", 1).with("y", 2);
        let previous = doc.insert("x", 10);
        assert_eq!(previous, Some(Value::Int32(1)));
        assert_eq!(doc.to_string(), r#"{"x":10,"y":2}"#);
    }

    #[test]
    fn test_should_compare_ignoring_order() {
        let left = Document::new().with("a", 1).with("b", 2);
        let right = Document::new().with("b", 2).with("a", 1);
        assert_eq!(left, right);

        let mut hasher_left = std::collections::hash_map::DefaultHasher::new();
        let mut hasher_right = std::collections::hash_map::DefaultHasher::new();
        left.hash(&mut hasher_left);
        right.hash(&mut hasher_right);
        assert_eq!(hasher_left.finish(), hasher_right.finish());
    }

    #[test]
    fn test_should_remove_preserving_order() {
        let mut doc: Document = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        doc.remove("b");
        assert_eq!(doc.to_string(), r#"{"a":1,"c":3}"#);
    }
}
