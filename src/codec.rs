//! Streaming protocol shared by every codec.
//!
//! Encoding pulls symbols from a [`SymbolProducer`] and writes them to a
//! [`BitSink`]. Decoding reads a [`BitSource`] and pushes `(index, symbol)`
//! pairs to a [`SymbolConsumer`], which answers with a [`Directive`]. A
//! `Stop` ends the decode right after the symbol it was returned for, so the
//! source is left on a code boundary. Nothing in the encoded stream says how
//! many symbols it holds; the caller decides when to stop.

use std::iter::Peekable;

use crate::bits::{BitArray, BitSink, BitSource};
use crate::error::Result;

/// Consumer answer after each decoded symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Continue,
    Stop,
}

/// Pull-based source of symbols to encode.
pub trait SymbolProducer<T> {
    fn has_next(&mut self) -> bool;
    fn next_symbol(&mut self) -> Option<T>;
}

impl<I: Iterator> SymbolProducer<I::Item> for Peekable<I> {
    fn has_next(&mut self) -> bool {
        self.peek().is_some()
    }

    fn next_symbol(&mut self) -> Option<I::Item> {
        self.next()
    }
}

/// Push-based sink of decoded symbols.
pub trait SymbolConsumer<T> {
    fn on_symbol(&mut self, index: usize, value: T) -> Directive;
}

impl<T, F> SymbolConsumer<T> for F
where
    F: FnMut(usize, T) -> Directive,
{
    fn on_symbol(&mut self, index: usize, value: T) -> Directive {
        self(index, value)
    }
}

/// Collects decoded symbols, stopping after `limit` of them when set.
#[derive(Debug, Clone)]
pub struct Collector<T> {
    pub items: Vec<T>,
    limit: Option<usize>,
}

impl<T> Collector<T> {
    pub fn unbounded() -> Self {
        Self {
            items: Vec::new(),
            limit: None,
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> SymbolConsumer<T> for Collector<T> {
    fn on_symbol(&mut self, _index: usize, value: T) -> Directive {
        self.items.push(value);
        match self.limit {
            Some(limit) if self.items.len() >= limit => Directive::Stop,
            _ => Directive::Continue,
        }
    }
}

/// Uniform encode/decode contract.
///
/// Implementations are immutable after construction, so one codec may serve
/// any number of concurrent calls as long as each uses its own bit storage.
pub trait Codec<T> {
    /// Encode every symbol the producer yields.
    fn encode<P, W>(&self, producer: &mut P, sink: &mut W) -> Result<()>
    where
        P: SymbolProducer<T> + ?Sized,
        W: BitSink + ?Sized;

    /// Decode until the consumer stops or the source runs dry. Returns the
    /// number of symbols delivered.
    fn decode<R, C>(&self, source: &mut R, consumer: &mut C) -> Result<usize>
    where
        R: BitSource + ?Sized,
        C: SymbolConsumer<T> + ?Sized;
}

/// Encode `items` into a fresh [`BitArray`] positioned at bit 0.
pub fn encode_to_bits<T, C, I>(codec: &C, items: I) -> Result<BitArray>
where
    C: Codec<T> + ?Sized,
    I: IntoIterator<Item = T>,
{
    let mut bits = BitArray::new();
    codec.encode(&mut items.into_iter().peekable(), &mut bits)?;
    bits.rewind()?;
    Ok(bits)
}

/// Decode at most `limit` symbols, or until the source is exhausted.
pub fn decode_from_bits<T, C, R>(codec: &C, source: &mut R, limit: Option<usize>) -> Result<Vec<T>>
where
    C: Codec<T> + ?Sized,
    R: BitSource + ?Sized,
{
    let mut collector = match limit {
        Some(0) => return Ok(Vec::new()),
        Some(n) => Collector::with_limit(n),
        None => Collector::unbounded(),
    };
    codec.decode(source, &mut collector)?;
    Ok(collector.into_items())
}
