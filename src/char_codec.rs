//! Character-level codec with ESCAPE and END_OF_STRING sentinels.
//!
//! Characters present in the trained alphabet are written as their Huffman
//! code. Anything else is written as the ESCAPE code followed by the raw
//! character value in [`RAW_CHAR_BITS`] bits, so every `char` is encodable.
//! Strings end with the END_OF_STRING code instead of carrying a length.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bits::{BitSink, BitSource};
use crate::codec::{Codec, Directive, SymbolConsumer, SymbolProducer};
use crate::config::CodecConfig;
use crate::error::{HuffpackError, Result};
use crate::huffman::{HuffmanCode, HuffmanCodeTable};
use crate::observer::{self, CodecObserver};
use crate::symbol_table::SymbolTable;
use crate::training::count_chars;

/// Width of an escaped literal; covers every Unicode scalar value.
pub const RAW_CHAR_BITS: u8 = 21;

/// Alphabet of the character code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharSymbol {
    Char(char),
    Escape,
    EndOfString,
}

/// One decoded unit of a character stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharToken {
    Char(char),
    EndOfString,
}

#[derive(Debug, Clone)]
pub struct CharacterCodec {
    table: HuffmanCodeTable<CharSymbol>,
    escape: HuffmanCode,
    end_of_string: HuffmanCode,
    observer: Arc<dyn CodecObserver>,
}

impl CharacterCodec {
    /// Build from character counts. `end_of_string_frequency` is usually the
    /// number of strings in the training data.
    pub fn from_frequencies<I>(
        frequencies: I,
        end_of_string_frequency: u64,
        config: &CodecConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (char, u64)>,
    {
        config.validate()?;
        let mut entries: Vec<(CharSymbol, u64)> = frequencies
            .into_iter()
            .map(|(c, f)| (CharSymbol::Char(c), f))
            .collect();
        if entries.is_empty() {
            return Err(HuffpackError::EmptyAlphabet);
        }
        entries.push((CharSymbol::EndOfString, end_of_string_frequency));

        let symbols = SymbolTable::build(entries, Some(CharSymbol::Escape), config.minimum_length)?;
        let table = HuffmanCodeTable::build(&symbols, config.maximum_length)?;
        debug!(
            alphabet = symbols.len() - 2,
            max_length = table.max_length(),
            "trained character codec"
        );
        Self::from_table(table)
    }

    /// Train on sample strings.
    pub fn train<I, S>(samples: I, config: &CodecConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (chars, strings) = count_chars(samples);
        Self::from_frequencies(chars.into_frequencies(), strings.max(1), config)
    }

    /// Wrap an existing table. Both sentinels must have codes and ESCAPE must
    /// be the table's escape symbol.
    pub fn from_table(table: HuffmanCodeTable<CharSymbol>) -> Result<Self> {
        if table.escape() != Some(&CharSymbol::Escape) {
            return Err(HuffpackError::InvalidCodeTable(
                "character table must use ESCAPE as its escape symbol".into(),
            ));
        }
        let escape = table.code_of(&CharSymbol::Escape).ok_or_else(|| {
            HuffpackError::InvalidCodeTable("character table lacks ESCAPE".into())
        })?;
        let end_of_string = table.code_of(&CharSymbol::EndOfString).ok_or_else(|| {
            HuffpackError::InvalidCodeTable("character table lacks END_OF_STRING".into())
        })?;
        Ok(Self {
            table,
            escape,
            end_of_string,
            observer: observer::noop(),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn CodecObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn table(&self) -> &HuffmanCodeTable<CharSymbol> {
        &self.table
    }

    /// True when `c` has its own code (no escape needed).
    pub fn contains(&self, c: char) -> bool {
        self.table.contains(&CharSymbol::Char(c))
    }

    pub fn encode_char<S: BitSink + ?Sized>(&self, c: char, sink: &mut S) -> Result<()> {
        if let Some(code) = self.table.code_of(&CharSymbol::Char(c)) {
            code.write_to(sink)?;
            self.observer.on_encode(code.length as u64, false);
            return Ok(());
        }
        trace!(literal = %c.escape_unicode(), "escaping character");
        self.escape.write_to(sink)?;
        sink.write_bits(c as u64, RAW_CHAR_BITS)?;
        self.observer
            .on_encode(self.escape.length as u64 + RAW_CHAR_BITS as u64, true);
        Ok(())
    }

    pub fn encode_end_of_string<S: BitSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        self.end_of_string.write_to(sink)?;
        self.observer.on_encode(self.end_of_string.length as u64, false);
        Ok(())
    }

    /// Encode every character of `s` followed by END_OF_STRING.
    pub fn encode_str<S: BitSink + ?Sized>(&self, s: &str, sink: &mut S) -> Result<()> {
        for c in s.chars() {
            self.encode_char(c, sink)?;
        }
        self.encode_end_of_string(sink)
    }

    /// Bits `encode_str` would write for `s`.
    pub fn encoded_len(&self, s: &str) -> u64 {
        let body: u64 = s
            .chars()
            .map(|c| match self.table.code_of(&CharSymbol::Char(c)) {
                Some(code) => code.length as u64,
                None => self.escape.length as u64 + RAW_CHAR_BITS as u64,
            })
            .sum();
        body + self.end_of_string.length as u64
    }

    pub fn decode_token<S: BitSource + ?Sized>(&self, source: &mut S) -> Result<CharToken> {
        let (symbol, length) = self.table.decode_symbol_with_length(source)?;
        match *symbol {
            CharSymbol::Char(c) => {
                self.observer.on_decode(length as u64, false);
                Ok(CharToken::Char(c))
            }
            CharSymbol::EndOfString => {
                self.observer.on_decode(length as u64, false);
                Ok(CharToken::EndOfString)
            }
            CharSymbol::Escape => {
                let raw = source.read_bits(RAW_CHAR_BITS)? as u32;
                let c = char::from_u32(raw).ok_or(HuffpackError::InvalidLiteral(raw))?;
                self.observer
                    .on_decode(length as u64 + RAW_CHAR_BITS as u64, true);
                Ok(CharToken::Char(c))
            }
        }
    }

    /// Decode characters up to and including the next END_OF_STRING.
    pub fn decode_str<S: BitSource + ?Sized>(&self, source: &mut S) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.decode_token(source)? {
                CharToken::Char(c) => out.push(c),
                CharToken::EndOfString => return Ok(out),
            }
        }
    }
}

/// Raw character stream: no sentinel is written, and decoding ends at the
/// first END_OF_STRING, at a `Stop`, or when the source runs out.
impl Codec<char> for CharacterCodec {
    fn encode<P, W>(&self, producer: &mut P, sink: &mut W) -> Result<()>
    where
        P: SymbolProducer<char> + ?Sized,
        W: BitSink + ?Sized,
    {
        while producer.has_next() {
            let Some(c) = producer.next_symbol() else {
                break;
            };
            self.encode_char(c, sink)?;
        }
        Ok(())
    }

    fn decode<R, C>(&self, source: &mut R, consumer: &mut C) -> Result<usize>
    where
        R: BitSource + ?Sized,
        C: SymbolConsumer<char> + ?Sized,
    {
        let mut index = 0;
        while !source.is_exhausted()? {
            match self.decode_token(source)? {
                CharToken::EndOfString => break,
                CharToken::Char(c) => {
                    let directive = consumer.on_symbol(index, c);
                    index += 1;
                    if directive == Directive::Stop {
                        break;
                    }
                }
            }
        }
        Ok(index)
    }
}
