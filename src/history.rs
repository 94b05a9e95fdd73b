//! History Store
//!
//! The collaborator behind `$history`. Index 1 is the most recent entry.
//! Construction has main-thread affinity in the surrounding shell, so the
//! expansion context only carries an optional reference; off the
//! interactive thread the variable is treated as absent.

use std::collections::HashMap;

pub trait HistoryStore {
    fn size(&self) -> usize;

    /// All entries, newest first.
    fn get_history(&self) -> Vec<String>;

    /// Entries at the given 1-based indexes. Indexes with no entry are
    /// absent from the map.
    fn items_at_indexes(&self, indexes: &[usize]) -> HashMap<usize, String>;
}

/// An in-memory history, newest entry last in push order.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    items: Vec<String>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }
}

impl HistoryStore for MemoryHistory {
    fn size(&self) -> usize {
        self.items.len()
    }

    fn get_history(&self) -> Vec<String> {
        self.items.iter().rev().cloned().collect()
    }

    fn items_at_indexes(&self, indexes: &[usize]) -> HashMap<usize, String> {
        let mut map = HashMap::new();
        for &idx in indexes {
            if idx >= 1 && idx <= self.items.len() {
                map.insert(idx, self.items[self.items.len() - idx].clone());
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> MemoryHistory {
        let mut h = MemoryHistory::new();
        h.push("oldest");
        h.push("middle");
        h.push("newest");
        h
    }

    #[test]
    fn test_newest_first() {
        assert_eq!(history().get_history(), vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn test_items_at_indexes() {
        let map = history().items_at_indexes(&[1, 3, 7]);
        assert_eq!(map.get(&1).map(String::as_str), Some("newest"));
        assert_eq!(map.get(&3).map(String::as_str), Some("oldest"));
        assert!(!map.contains_key(&7));
    }
}
