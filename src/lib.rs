//! Core logic for the huffpack symbol codecs.
//!
//! A trained codec turns symbols into canonical Huffman codes packed into a
//! big-endian bit stream. Three codecs are layered on one another:
//!
//! - [`CharacterCodec`]: single characters, with ESCAPE for characters
//!   outside the trained alphabet and END_OF_STRING to terminate strings;
//! - [`StringCodec`]: whole strings from a trained vocabulary, escaping to
//!   the character codec for anything else;
//! - [`ListCodec`]: strings back to back, with no count stored.
//!
//! ```
//! use std::sync::Arc;
//! use huffpack::{CharacterCodec, CodecConfig, ListCodec, StringCodec};
//!
//! let config = CodecConfig::default();
//! let chars = Arc::new(CharacterCodec::train(["abc", "def"], &config).unwrap());
//! let strings =
//!     StringCodec::from_frequencies([("abc", 10u64), ("def", 3)], chars, &config).unwrap();
//! let codec = ListCodec::new(Arc::new(strings));
//!
//! let mut bits = codec.encode_list(["abc", "xyz", "def"]).unwrap();
//! assert_eq!(codec.decode_list(&mut bits, 3).unwrap(), vec!["abc", "xyz", "def"]);
//! ```

pub mod bits;
pub mod char_codec;
pub mod codebook;
pub mod codec;
pub mod config;
pub mod error;
pub mod huffman;
pub mod io_utils;
pub mod list_codec;
pub mod observer;
pub mod string_codec;
pub mod symbol_table;
pub mod training;

pub use bits::{BitArray, BitSink, BitSource, BitStreamReader, BitStreamWriter};
pub use char_codec::{CharSymbol, CharToken, CharacterCodec, RAW_CHAR_BITS};
pub use codebook::{Codebook, PersistedCodeTable};
pub use codec::{
    decode_from_bits, encode_to_bits, Codec, Collector, Directive, SymbolConsumer, SymbolProducer,
};
pub use config::CodecConfig;
pub use error::{HuffpackError, Result};
pub use huffman::{HuffmanCode, HuffmanCodeTable, MAX_CODE_LENGTH};
pub use list_codec::ListCodec;
pub use observer::{CodecObserver, CodecStats, NoopObserver, StatsSnapshot};
pub use string_codec::{StringCodec, StringSymbol};
pub use symbol_table::{SymbolEntry, SymbolTable};
pub use training::{FrequencyCounter, StringPool};
