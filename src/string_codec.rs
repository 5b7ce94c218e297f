//! Whole-string codec with character-level fallback.
//!
//! A string from the trained vocabulary costs a single code. Any other string
//! is written as the table's escape code followed by its characters through
//! the shared [`CharacterCodec`], terminated by END_OF_STRING.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bits::{BitSink, BitSource};
use crate::char_codec::CharacterCodec;
use crate::codec::{Codec, Directive, SymbolConsumer, SymbolProducer};
use crate::config::CodecConfig;
use crate::error::{HuffpackError, Result};
use crate::huffman::{HuffmanCode, HuffmanCodeTable};
use crate::observer::{self, CodecObserver};
use crate::symbol_table::SymbolTable;
use crate::training::{count_strings, StringPool};

/// Alphabet of the string code table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StringSymbol {
    Word(String),
    Escape,
}

#[derive(Debug, Clone)]
pub struct StringCodec {
    table: HuffmanCodeTable<StringSymbol>,
    /// Word codes keyed by plain `String` so lookups borrow `&str`.
    words: HashMap<String, HuffmanCode>,
    escape: HuffmanCode,
    chars: Arc<CharacterCodec>,
    observer: Arc<dyn CodecObserver>,
}

impl StringCodec {
    /// Build from whole-string counts. Out-of-vocabulary strings fall back to
    /// `chars`.
    pub fn from_frequencies<I, S>(
        frequencies: I,
        chars: Arc<CharacterCodec>,
        config: &CodecConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        config.validate()?;
        let entries: Vec<(StringSymbol, u64)> = frequencies
            .into_iter()
            .map(|(s, f)| (StringSymbol::Word(s.as_ref().to_owned()), f))
            .collect();
        if entries.is_empty() {
            return Err(HuffpackError::EmptyAlphabet);
        }

        let symbols =
            SymbolTable::build(entries, Some(StringSymbol::Escape), config.minimum_length)?;
        let table = HuffmanCodeTable::build(&symbols, config.maximum_length)?;
        debug!(
            vocabulary = symbols.len() - 1,
            max_length = table.max_length(),
            "trained string codec"
        );
        Self::from_table(table, chars)
    }

    /// Train on sample strings, interning them through the caller's pool.
    pub fn train<I, S>(
        samples: I,
        pool: &mut StringPool,
        chars: Arc<CharacterCodec>,
        config: &CodecConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let counts = count_strings(samples, pool);
        Self::from_frequencies(counts.into_frequencies(), chars, config)
    }

    /// Wrap an existing table whose escape symbol is [`StringSymbol::Escape`].
    pub fn from_table(
        table: HuffmanCodeTable<StringSymbol>,
        chars: Arc<CharacterCodec>,
    ) -> Result<Self> {
        if table.escape() != Some(&StringSymbol::Escape) {
            return Err(HuffpackError::InvalidCodeTable(
                "string table must use ESCAPE as its escape symbol".into(),
            ));
        }
        let escape = table.code_of(&StringSymbol::Escape).ok_or_else(|| {
            HuffpackError::InvalidCodeTable("string table lacks ESCAPE".into())
        })?;
        let words = table
            .iter()
            .filter_map(|(symbol, code)| match symbol {
                StringSymbol::Word(w) => Some((w.clone(), code)),
                StringSymbol::Escape => None,
            })
            .collect();
        Ok(Self {
            table,
            words,
            escape,
            chars,
            observer: observer::noop(),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn CodecObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn table(&self) -> &HuffmanCodeTable<StringSymbol> {
        &self.table
    }

    pub fn character_codec(&self) -> &Arc<CharacterCodec> {
        &self.chars
    }

    /// True when `s` is part of the trained vocabulary.
    pub fn contains(&self, s: &str) -> bool {
        self.words.contains_key(s)
    }

    pub fn encode_str<W: BitSink + ?Sized>(&self, s: &str, sink: &mut W) -> Result<()> {
        if let Some(code) = self.words.get(s) {
            code.write_to(sink)?;
            self.observer.on_encode(code.length as u64, false);
            return Ok(());
        }
        trace!(len = s.len(), "escaping string");
        // the character codec reports its own codes
        self.escape.write_to(sink)?;
        self.observer.on_encode(self.escape.length as u64, true);
        self.chars.encode_str(s, sink)
    }

    /// Bits `encode_str` would write for `s`.
    pub fn encoded_len(&self, s: &str) -> u64 {
        match self.words.get(s) {
            Some(code) => code.length as u64,
            None => self.escape.length as u64 + self.chars.encoded_len(s),
        }
    }

    /// Decode exactly one string.
    pub fn decode_string<R: BitSource + ?Sized>(&self, source: &mut R) -> Result<String> {
        let (symbol, length) = self.table.decode_symbol_with_length(source)?;
        match symbol {
            StringSymbol::Word(w) => {
                self.observer.on_decode(length as u64, false);
                Ok(w.clone())
            }
            StringSymbol::Escape => {
                self.observer.on_decode(length as u64, true);
                self.chars.decode_str(source)
            }
        }
    }
}

impl Codec<String> for StringCodec {
    fn encode<P, W>(&self, producer: &mut P, sink: &mut W) -> Result<()>
    where
        P: SymbolProducer<String> + ?Sized,
        W: BitSink + ?Sized,
    {
        while producer.has_next() {
            let Some(s) = producer.next_symbol() else {
                break;
            };
            self.encode_str(&s, sink)?;
        }
        Ok(())
    }

    fn decode<R, C>(&self, source: &mut R, consumer: &mut C) -> Result<usize>
    where
        R: BitSource + ?Sized,
        C: SymbolConsumer<String> + ?Sized,
    {
        let mut index = 0;
        while !source.is_exhausted()? {
            let value = self.decode_string(source)?;
            let directive = consumer.on_symbol(index, value);
            index += 1;
            if directive == Directive::Stop {
                break;
            }
        }
        Ok(index)
    }
}
