use serde::{Serialize, ser::SerializeMap};

/// Results of a batch, keyed by query name, in the order the queries ran.
/// Serializes as a JSON object with the same key order.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedResults<T> {
    entries: Vec<(String, Vec<T>)>,
}

impl<T> NamedResults<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an entry. A repeated name replaces the earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, rows: Vec<T>) {
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = rows;
        } else {
            self.entries.push((name, rows));
        }
    }

    pub fn get(&self, name: &str) -> Option<&[T]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, Vec<T>)> {
        self.entries
    }
}

impl<T> Default for NamedResults<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Serialize for NamedResults<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, rows) in &self.entries {
            map.serialize_entry(name, rows)?;
        }
        map.end()
    }
}
