//! Sequences of strings written back to back.
//!
//! No element count is stored. Each string is self-delimiting (one code, or
//! escape + characters + END_OF_STRING), and the caller decides how many
//! elements to read back.

use std::sync::Arc;

use crate::bits::{BitArray, BitSink, BitSource};
use crate::char_codec::CharacterCodec;
use crate::codec::{Codec, Collector, SymbolConsumer, SymbolProducer};
use crate::error::Result;
use crate::string_codec::StringCodec;

#[derive(Debug, Clone)]
pub struct ListCodec {
    strings: Arc<StringCodec>,
    chars: Arc<CharacterCodec>,
}

impl ListCodec {
    /// Compose over `strings`, sharing its character codec.
    pub fn new(strings: Arc<StringCodec>) -> Self {
        let chars = strings.character_codec().clone();
        Self { strings, chars }
    }

    pub fn string_codec(&self) -> &Arc<StringCodec> {
        &self.strings
    }

    pub fn character_codec(&self) -> &Arc<CharacterCodec> {
        &self.chars
    }

    /// Encode `items` into a fresh array.
    pub fn encode_list<I, S>(&self, items: I) -> Result<BitArray>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bits = BitArray::new();
        for item in items {
            self.strings.encode_str(item.as_ref(), &mut bits)?;
        }
        bits.rewind()?;
        Ok(bits)
    }

    /// Decode the first `count` elements of `bits`.
    pub fn decode_list(&self, bits: &mut BitArray, count: usize) -> Result<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut collector = Collector::with_limit(count);
        self.decode(bits, &mut collector)?;
        Ok(collector.into_items())
    }

    /// Bits needed to encode `items`.
    pub fn encoded_len<I, S>(&self, items: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .map(|s| self.strings.encoded_len(s.as_ref()))
            .sum()
    }
}

impl Codec<String> for ListCodec {
    fn encode<P, W>(&self, producer: &mut P, sink: &mut W) -> Result<()>
    where
        P: SymbolProducer<String> + ?Sized,
        W: BitSink + ?Sized,
    {
        while producer.has_next() {
            let Some(s) = producer.next_symbol() else {
                break;
            };
            self.strings.encode_str(&s, sink)?;
        }
        Ok(())
    }

    /// Rewind the source, then stream elements with their 0-based index until
    /// the consumer stops or the source is exhausted.
    fn decode<R, C>(&self, source: &mut R, consumer: &mut C) -> Result<usize>
    where
        R: BitSource + ?Sized,
        C: SymbolConsumer<String> + ?Sized,
    {
        source.rewind()?;
        self.strings.decode(source, consumer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;

    fn list_codec() -> ListCodec {
        let config = CodecConfig::default();
        let chars = Arc::new(CharacterCodec::train(["abc", "def", "ghi", "jkl"], &config).unwrap());
        let strings = StringCodec::from_frequencies(
            [("abc", 1000u64), ("def", 100), ("ghi", 10), ("jkl", 1)],
            chars,
            &config,
        )
        .unwrap();
        ListCodec::new(Arc::new(strings))
    }

    #[test]
    fn shares_character_codec() {
        let codec = list_codec();
        assert!(Arc::ptr_eq(
            codec.character_codec(),
            codec.string_codec().character_codec()
        ));
    }

    #[test]
    fn decode_rewinds_before_reading() {
        let codec = list_codec();
        let mut bits = codec.encode_list(["abc", "zzz", "def"]).unwrap();
        bits.seek(bits.len_bits()).unwrap();
        assert_eq!(
            codec.decode_list(&mut bits, 3).unwrap(),
            vec!["abc", "zzz", "def"]
        );
        assert!(bits.is_exhausted().unwrap());
    }

    #[test]
    fn count_bounds_the_decode() {
        let codec = list_codec();
        let mut bits = codec.encode_list(["ghi", "jkl", "abc", "abc"]).unwrap();
        assert_eq!(bits.len_bits(), codec.encoded_len(["ghi", "jkl", "abc", "abc"]));
        assert_eq!(codec.decode_list(&mut bits, 2).unwrap(), vec!["ghi", "jkl"]);
        assert_eq!(codec.decode_list(&mut bits, 0).unwrap(), Vec::<String>::new());
        assert_eq!(codec.decode_list(&mut bits, 10).unwrap().len(), 4);
    }
}
