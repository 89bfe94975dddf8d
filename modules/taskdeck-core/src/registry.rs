//! Insertion-ordered map keyed by task-runner id.

use std::collections::HashMap;

/// Map that iterates in insertion order with O(1) lookup by id.
///
/// Re-inserting an existing id replaces the value in place and keeps its
/// original position.
#[derive(Debug, Clone)]
pub struct RunnerMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> RunnerMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&V> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, value: V) -> Option<V> {
        let id = id.into();
        match self.index.get(&id) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, value));
                None
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<V> {
        let i = self.index.remove(id)?;
        let (_, value) = self.entries.remove(i);
        for (_, slot) in self.index.iter_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(id, v)| (id.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<V> Default for RunnerMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for RunnerMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
