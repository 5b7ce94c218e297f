//! Frequency counting for codec training.
//!
//! Counting keeps first-seen order, so feeding the same samples in the same
//! order always yields the same table. Interning of string samples goes
//! through a [`StringPool`] owned by the caller rather than a hidden cache.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

/// Counts symbol occurrences in first-seen order.
#[derive(Debug, Clone)]
pub struct FrequencyCounter<T> {
    counts: Vec<(T, u64)>,
    index: HashMap<T, usize>,
}

impl<T> Default for FrequencyCounter<T> {
    fn default() -> Self {
        Self {
            counts: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> FrequencyCounter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, symbol: T) {
        self.add_count(symbol, 1);
    }

    pub fn add_count(&mut self, symbol: T, count: u64) {
        match self.index.get(&symbol) {
            Some(&i) => self.counts[i].1 = self.counts[i].1.saturating_add(count),
            None => {
                self.index.insert(symbol.clone(), self.counts.len());
                self.counts.push((symbol, count));
            }
        }
    }

    pub fn count_of(&self, symbol: &T) -> u64 {
        self.index.get(symbol).map_or(0, |&i| self.counts[i].1)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| *c).sum()
    }

    /// `(symbol, count)` pairs in first-seen order.
    pub fn into_frequencies(self) -> Vec<(T, u64)> {
        self.counts
    }
}

impl<T: Clone + Eq + Hash> Extend<T> for FrequencyCounter<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for symbol in iter {
            self.add(symbol);
        }
    }
}

impl<T: Clone + Eq + Hash> FromIterator<T> for FrequencyCounter<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut counter = Self::new();
        counter.extend(iter);
        counter
    }
}

/// Caller-owned string interner used while counting training samples.
#[derive(Debug, Default, Clone)]
pub struct StringPool {
    strings: HashSet<Arc<str>>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to `s`, allocating only the first time it is seen.
    pub fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(s) {
            return existing.clone();
        }
        let interned: Arc<str> = Arc::from(s);
        self.strings.insert(interned.clone());
        interned
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Count whole-string samples, interning them through `pool`.
pub fn count_strings<I, S>(samples: I, pool: &mut StringPool) -> FrequencyCounter<Arc<str>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    samples
        .into_iter()
        .map(|s| pool.intern(s.as_ref()))
        .collect()
}

/// Count characters over all samples. Also returns the number of samples.
pub fn count_chars<I, S>(samples: I) -> (FrequencyCounter<char>, u64)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counter = FrequencyCounter::new();
    let mut strings = 0u64;
    for sample in samples {
        counter.extend(sample.as_ref().chars());
        strings += 1;
    }
    (counter, strings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_keep_first_seen_order() {
        let counter: FrequencyCounter<char> = "banana".chars().collect();
        assert_eq!(
            counter.into_frequencies(),
            vec![('b', 1), ('a', 3), ('n', 2)]
        );
    }

    #[test]
    fn pool_shares_allocations() {
        let mut pool = StringPool::new();
        let a = pool.intern("highway");
        let b = pool.intern("highway");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn count_strings_and_chars() {
        let samples = ["ab", "cd", "ab"];
        let mut pool = StringPool::new();
        let words = count_strings(samples, &mut pool);
        assert_eq!(words.count_of(&Arc::from("ab")), 2);
        assert_eq!(words.total(), 3);
        assert_eq!(pool.len(), 2);

        let (chars, strings) = count_chars(samples);
        assert_eq!(strings, 3);
        assert_eq!(chars.count_of(&'a'), 2);
        assert_eq!(chars.len(), 4);
    }
}
