//! Frequency-ranked symbol tables, the input of the Huffman builder.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{HuffpackError, Result};

/// One ranked symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry<T> {
    pub symbol: T,
    pub frequency: u64,
    /// Position after sorting by descending frequency. Dense over `0..n`.
    pub rank: u32,
}

/// Ranked set of symbols with an optional escape symbol and a minimum code
/// length.
///
/// Ranking is a stable sort on descending frequency, so ties keep the order
/// in which symbols were supplied. Feeding a `BTreeMap` therefore breaks ties
/// by the symbols' natural ordering. Identical inputs always rank identically.
#[derive(Debug, Clone)]
pub struct SymbolTable<T> {
    entries: Vec<SymbolEntry<T>>,
    index: HashMap<T, usize>,
    escape: Option<T>,
    minimum_length: u8,
}

impl<T: Clone + Eq + Hash> SymbolTable<T> {
    /// Rank `frequencies`. Repeated symbols are merged by summing their
    /// counts. An escape symbol missing from `frequencies` is added with
    /// frequency zero; it still receives a code.
    pub fn build<I>(frequencies: I, escape: Option<T>, minimum_length: u8) -> Result<Self>
    where
        I: IntoIterator<Item = (T, u64)>,
    {
        if minimum_length == 0 {
            return Err(HuffpackError::Config(
                "minimum code length must be at least 1".into(),
            ));
        }

        let mut merged: Vec<(T, u64)> = Vec::new();
        let mut seen: HashMap<T, usize> = HashMap::new();
        for (symbol, frequency) in frequencies {
            match seen.get(&symbol) {
                Some(&i) => merged[i].1 = merged[i].1.saturating_add(frequency),
                None => {
                    seen.insert(symbol.clone(), merged.len());
                    merged.push((symbol, frequency));
                }
            }
        }
        if merged.is_empty() {
            return Err(HuffpackError::EmptyAlphabet);
        }
        if let Some(esc) = &escape {
            if !seen.contains_key(esc) {
                merged.push((esc.clone(), 0));
            }
        }

        // stable: equal frequencies keep input order
        merged.sort_by(|a, b| b.1.cmp(&a.1));

        let entries: Vec<SymbolEntry<T>> = merged
            .into_iter()
            .enumerate()
            .map(|(rank, (symbol, frequency))| SymbolEntry {
                symbol,
                frequency,
                rank: rank as u32,
            })
            .collect();
        let index = entries
            .iter()
            .map(|e| (e.symbol.clone(), e.rank as usize))
            .collect();

        Ok(Self {
            entries,
            index,
            escape,
            minimum_length,
        })
    }

    /// Entries in rank order.
    pub fn entries(&self) -> &[SymbolEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: construction rejects empty alphabets.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn escape(&self) -> Option<&T> {
        self.escape.as_ref()
    }

    pub fn minimum_length(&self) -> u8 {
        self.minimum_length
    }

    pub fn rank_of(&self, symbol: &T) -> Option<u32> {
        self.index.get(symbol).map(|&i| i as u32)
    }

    pub fn frequency_of(&self, symbol: &T) -> Option<u64> {
        self.index.get(symbol).map(|&i| self.entries[i].frequency)
    }

    pub fn contains(&self, symbol: &T) -> bool {
        self.index.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry<T>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn ranks_by_descending_frequency() {
        let table =
            SymbolTable::build(vec![("b", 5), ("a", 10), ("c", 1)], None, 1).unwrap();
        let order: Vec<_> = table.iter().map(|e| (e.symbol, e.rank)).collect();
        assert_eq!(order, vec![("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn ties_follow_input_order() {
        let freqs: BTreeMap<char, u64> = [('z', 3), ('a', 3), ('m', 3)].into_iter().collect();
        let table = SymbolTable::build(freqs, None, 1).unwrap();
        let order: Vec<char> = table.iter().map(|e| e.symbol).collect();
        assert_eq!(order, vec!['a', 'm', 'z']);

        let table = SymbolTable::build(vec![('z', 3), ('a', 3)], None, 1).unwrap();
        assert_eq!(table.rank_of(&'z'), Some(0));
        assert_eq!(table.rank_of(&'a'), Some(1));
    }

    #[test]
    fn empty_alphabet_rejected() {
        let empty: Vec<(u8, u64)> = Vec::new();
        assert!(matches!(
            SymbolTable::build(empty, Some(0u8), 1),
            Err(HuffpackError::EmptyAlphabet)
        ));
    }

    #[test]
    fn escape_added_with_zero_frequency() {
        let table = SymbolTable::build(vec![("x", 4), ("y", 2)], Some("esc"), 1).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.frequency_of(&"esc"), Some(0));
        assert_eq!(table.rank_of(&"esc"), Some(2));
        assert_eq!(table.escape(), Some(&"esc"));
    }

    #[test]
    fn escape_already_present_is_not_duplicated() {
        let table = SymbolTable::build(vec![("x", 4), ("esc", 9)], Some("esc"), 1).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rank_of(&"esc"), Some(0));
    }

    #[test]
    fn duplicates_are_merged() {
        let table = SymbolTable::build(vec![(1u8, 2), (2, 3), (1, 2)], None, 1).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.frequency_of(&1), Some(4));
        assert_eq!(table.rank_of(&1), Some(0));
    }

    #[test]
    fn zero_minimum_length_rejected() {
        assert!(matches!(
            SymbolTable::build(vec![(1u8, 1)], None, 0),
            Err(HuffpackError::Config(_))
        ));
    }
}
