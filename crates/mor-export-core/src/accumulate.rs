use std::collections::HashMap;
use std::hash::Hash;

/// Key for per-day summaries: a day plus a country or destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DayKey {
    pub day: String,
    pub group: String,
}

impl DayKey {
    pub fn new(day: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            group: group.into(),
        }
    }
}

/// Running call counts per key, kept in first-seen key order.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, i64)>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` to `key`'s total, appending the key if it is new.
    pub fn add(&mut self, key: K, count: i64) {
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 += count,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, count));
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<i64> {
        self.index.get(key).map(|&position| self.entries[position].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, i64)> + '_ {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    pub fn into_entries(self) -> Vec<(K, i64)> {
        self.entries
    }
}

impl<K: Eq + Hash + Clone> Extend<(K, i64)> for Tally<K> {
    fn extend<I: IntoIterator<Item = (K, i64)>>(&mut self, iter: I) {
        for (key, count) in iter {
            self.add(key, count);
        }
    }
}

impl<K: Eq + Hash + Clone> FromIterator<(K, i64)> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut tally = Tally::new();
        tally.extend(iter);
        tally
    }
}
