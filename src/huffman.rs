//! Canonical Huffman code construction and lookup.
//!
//! Code lengths come from the usual two-smallest merge over a binary heap.
//! Heap keys are `(weight, order)` where leaves use their rank and internal
//! nodes `n + creation index`, so equal weights always merge the same way.
//! When the tree is deeper than the requested maximum, lengths are recomputed
//! with package-merge, which yields the optimal code under that cap.
//!
//! Codes are then assigned canonically: symbols sorted by `(length, rank)`
//! receive consecutive values, the running value being incremented and then
//! shifted left whenever the length grows. A table is thereby fully described
//! by its `(symbol, length)` list, which is what gets persisted.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bits::{BitSink, BitSource};
use crate::error::{HuffpackError, Result};
use crate::symbol_table::SymbolTable;

/// Longest code any table may contain.
pub const MAX_CODE_LENGTH: u8 = 64;

/// A single code word: the low `length` bits of `bits`, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HuffmanCode {
    pub bits: u64,
    pub length: u8,
}

impl HuffmanCode {
    pub fn write_to<S: BitSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.write_bits(self.bits, self.length)
    }

    /// True if `self` is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &HuffmanCode) -> bool {
        self.length <= other.length
            && other.bits >> (other.length - self.length) == self.bits
    }
}

impl fmt::Display for HuffmanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.length).rev() {
            f.write_str(if (self.bits >> i) & 1 == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct LengthBucket {
    first_code: u64,
    offset: usize,
    count: usize,
}

/// Immutable prefix code over symbols of type `T`.
#[derive(Debug, Clone)]
pub struct HuffmanCodeTable<T> {
    codes: HashMap<T, HuffmanCode>,
    /// Symbols sorted by `(length, rank)`.
    canonical: Vec<T>,
    /// Indexed by code length; entry 0 is unused.
    buckets: Vec<LengthBucket>,
    max_length: u8,
    escape: Option<T>,
}

impl<T: Clone + Eq + Hash> HuffmanCodeTable<T> {
    /// Derive a canonical code from a ranked table. No code exceeds
    /// `maximum_length` nor falls short of the table's minimum length.
    pub fn build(table: &SymbolTable<T>, maximum_length: u8) -> Result<Self> {
        let minimum_length = table.minimum_length();
        if maximum_length == 0 || maximum_length > MAX_CODE_LENGTH {
            return Err(HuffpackError::Config(format!(
                "maximum code length must be within 1..={MAX_CODE_LENGTH}, got {maximum_length}"
            )));
        }
        if minimum_length > maximum_length {
            return Err(HuffpackError::Config(format!(
                "minimum code length {minimum_length} exceeds maximum {maximum_length}"
            )));
        }
        let n = table.len();
        if n as u128 > 1u128 << maximum_length {
            return Err(HuffpackError::CodeTooLong {
                symbols: n,
                maximum_length,
            });
        }

        let weights: Vec<u64> = table.iter().map(|e| e.frequency).collect();
        let mut lengths = huffman_lengths(&weights);
        let deepest = lengths.iter().copied().max().unwrap_or(0);
        if deepest > maximum_length as u32 {
            debug!(
                symbols = n,
                deepest,
                maximum_length,
                "huffman tree too deep, limiting code lengths"
            );
            lengths = package_merge_lengths(&weights, maximum_length);
        }

        let ordered: Vec<(T, u8)> = table
            .iter()
            .zip(lengths)
            .map(|(entry, len)| (entry.symbol.clone(), (len as u8).max(minimum_length)))
            .collect();
        let built = Self::assemble(ordered, table.escape().cloned())?;
        debug!(
            symbols = n,
            max_length = built.max_length,
            "built canonical code table"
        );
        Ok(built)
    }

    /// Rebuild a table from `(symbol, length)` pairs alone. List order is the
    /// tie-break among equal lengths, so feeding back [`Self::lengths`]
    /// reproduces the original table exactly.
    pub fn from_lengths(entries: Vec<(T, u8)>, escape: Option<T>) -> Result<Self> {
        if entries.is_empty() {
            return Err(HuffpackError::EmptyAlphabet);
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for (symbol, length) in &entries {
            if *length == 0 || *length > MAX_CODE_LENGTH {
                return Err(HuffpackError::InvalidCodeTable(format!(
                    "code length {length} outside 1..={MAX_CODE_LENGTH}"
                )));
            }
            if !seen.insert(symbol) {
                return Err(HuffpackError::InvalidCodeTable("duplicate symbol".into()));
            }
        }
        let kraft: u128 = entries
            .iter()
            .map(|(_, len)| 1u128 << (MAX_CODE_LENGTH - len))
            .sum();
        if kraft > 1u128 << MAX_CODE_LENGTH {
            return Err(HuffpackError::InvalidCodeTable(
                "code lengths violate the Kraft inequality".into(),
            ));
        }
        if let Some(esc) = &escape {
            if !seen.contains(esc) {
                return Err(HuffpackError::InvalidCodeTable(
                    "escape symbol has no code".into(),
                ));
            }
        }
        Self::assemble(entries, escape)
    }

    fn assemble(mut ordered: Vec<(T, u8)>, escape: Option<T>) -> Result<Self> {
        // stable: equal lengths keep rank order
        ordered.sort_by_key(|(_, len)| *len);
        let max_length = ordered.last().map_or(0, |(_, len)| *len);

        let mut codes = HashMap::with_capacity(ordered.len());
        let mut canonical = Vec::with_capacity(ordered.len());
        let mut buckets = vec![LengthBucket::default(); max_length as usize + 1];

        let mut code = 0u64;
        let mut prev = 0u8;
        for (i, (symbol, len)) in ordered.into_iter().enumerate() {
            if i > 0 {
                code += 1;
                code <<= len - prev;
            }
            prev = len;

            let bucket = &mut buckets[len as usize];
            if bucket.count == 0 {
                bucket.first_code = code;
                bucket.offset = i;
            }
            bucket.count += 1;

            codes.insert(symbol.clone(), HuffmanCode { bits: code, length: len });
            canonical.push(symbol);
        }

        if let Some(esc) = &escape {
            if !codes.contains_key(esc) {
                return Err(HuffpackError::InvalidCodeTable(
                    "escape symbol has no code".into(),
                ));
            }
        }

        Ok(Self {
            codes,
            canonical,
            buckets,
            max_length,
            escape,
        })
    }

    pub fn code_of(&self, symbol: &T) -> Option<HuffmanCode> {
        self.codes.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &T) -> bool {
        self.codes.contains_key(symbol)
    }

    pub fn escape(&self) -> Option<&T> {
        self.escape.as_ref()
    }

    pub fn escape_code(&self) -> Option<HuffmanCode> {
        self.escape.as_ref().and_then(|esc| self.code_of(esc))
    }

    /// Length of the longest code.
    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// `(symbol, code)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, HuffmanCode)> + '_ {
        self.canonical.iter().map(move |s| (s, self.codes[s]))
    }

    /// `(symbol, length)` pairs in canonical order.
    pub fn lengths(&self) -> Vec<(T, u8)> {
        self.iter().map(|(s, c)| (s.clone(), c.length)).collect()
    }

    /// Write the code of `symbol`. Returns false when the symbol has no code.
    pub fn encode_symbol<S: BitSink + ?Sized>(&self, symbol: &T, sink: &mut S) -> Result<bool> {
        match self.codes.get(symbol) {
            Some(code) => {
                code.write_to(sink)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Read one code and return its symbol.
    ///
    /// On success the source is left on the boundary after the code.
    pub fn decode_symbol<S: BitSource + ?Sized>(&self, source: &mut S) -> Result<&T> {
        let start = source.position();
        let mut code = 0u64;
        for len in 1..=self.max_length as usize {
            code = (code << 1) | source.read_bit()? as u64;
            let bucket = &self.buckets[len];
            if bucket.count > 0
                && code >= bucket.first_code
                && code - bucket.first_code < bucket.count as u64
            {
                return Ok(&self.canonical[bucket.offset + (code - bucket.first_code) as usize]);
            }
        }
        Err(HuffpackError::UnknownCode { position: start })
    }

    /// Decode and also report the number of bits the code occupied.
    pub(crate) fn decode_symbol_with_length<S: BitSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<(&T, u8)> {
        let start = source.position();
        let symbol = self.decode_symbol(source)?;
        Ok((symbol, (source.position() - start) as u8))
    }
}

/// Code lengths of an unrestricted Huffman tree, indexed like `weights`.
fn huffman_lengths(weights: &[u64]) -> Vec<u32> {
    let n = weights.len();
    if n <= 1 {
        return vec![1; n];
    }

    let mut parent = vec![0usize; 2 * n - 1];
    let mut heap: BinaryHeap<Reverse<(u128, usize)>> = weights
        .iter()
        .enumerate()
        .map(|(i, &w)| Reverse((w as u128, i)))
        .collect();

    let mut next = n;
    while let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) {
        parent[a] = next;
        parent[b] = next;
        heap.push(Reverse((wa + wb, next)));
        next += 1;
    }

    // the root is the last node created; every other node's parent is younger
    let root = next - 1;
    let mut depth = vec![0u32; next];
    for node in (0..root).rev() {
        depth[node] = depth[parent[node]] + 1;
    }
    depth.truncate(n);
    depth
}

enum Coin {
    Leaf(usize),
    Package(Rc<Coin>, Rc<Coin>),
}

/// Length-limited code lengths via package-merge. Requires `n <= 2^limit`.
fn package_merge_lengths(weights: &[u64], limit: u8) -> Vec<u32> {
    let n = weights.len();
    if n <= 1 {
        return vec![1; n];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| weights[i]);
    let leaves: Vec<(u128, Rc<Coin>)> = order
        .iter()
        .map(|&i| (weights[i] as u128, Rc::new(Coin::Leaf(i))))
        .collect();

    let mut list = leaves.clone();
    for _ in 1..limit {
        let packages: Vec<(u128, Rc<Coin>)> = list
            .chunks_exact(2)
            .map(|pair| {
                (
                    pair[0].0 + pair[1].0,
                    Rc::new(Coin::Package(pair[0].1.clone(), pair[1].1.clone())),
                )
            })
            .collect();
        list = merge_coins(&leaves, packages);
    }

    let mut lengths = vec![0u32; n];
    let mut stack: Vec<&Coin> = list.iter().take(2 * n - 2).map(|(_, c)| c.as_ref()).collect();
    while let Some(coin) = stack.pop() {
        match coin {
            Coin::Leaf(i) => lengths[*i] += 1,
            Coin::Package(a, b) => {
                stack.push(a);
                stack.push(b);
            }
        }
    }
    lengths
}

/// Merge by weight; on ties leaves come first.
fn merge_coins(
    leaves: &[(u128, Rc<Coin>)],
    packages: Vec<(u128, Rc<Coin>)>,
) -> Vec<(u128, Rc<Coin>)> {
    let mut out = Vec::with_capacity(leaves.len() + packages.len());
    let mut leaves = leaves.iter().cloned().peekable();
    let mut packages = packages.into_iter().peekable();
    loop {
        let take_leaf = match (leaves.peek(), packages.peek()) {
            (Some(l), Some(p)) => l.0 <= p.0,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let item = if take_leaf { leaves.next() } else { packages.next() };
        out.extend(item);
    }
    out
}
