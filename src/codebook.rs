//! Persisted code tables.
//!
//! A canonical code is fully determined by its `(symbol, length)` list, so
//! that list plus the escape symbol is all that gets stored. Tables are saved
//! with bincode, or exported as JSON for inspection.

use std::fs;
use std::hash::Hash;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::char_codec::{CharSymbol, CharacterCodec};
use crate::error::Result;
use crate::huffman::HuffmanCodeTable;
use crate::list_codec::ListCodec;
use crate::observer::{self, CodecObserver};
use crate::string_codec::{StringCodec, StringSymbol};

/// Serializable form of a [`HuffmanCodeTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCodeTable<T> {
    /// `(symbol, code length)` in canonical order.
    pub entries: Vec<(T, u8)>,
    pub escape: Option<T>,
}

impl<T: Clone + Eq + Hash> PersistedCodeTable<T> {
    pub fn from_table(table: &HuffmanCodeTable<T>) -> Self {
        Self {
            entries: table.lengths(),
            escape: table.escape().cloned(),
        }
    }

    /// Rebuild the working table; no frequencies needed.
    pub fn to_table(&self) -> Result<HuffmanCodeTable<T>> {
        HuffmanCodeTable::from_lengths(self.entries.clone(), self.escape.clone())
    }
}

/// Both tables behind a [`ListCodec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codebook {
    pub characters: PersistedCodeTable<CharSymbol>,
    pub strings: PersistedCodeTable<StringSymbol>,
}

impl Codebook {
    pub fn from_list_codec(codec: &ListCodec) -> Self {
        Self {
            characters: PersistedCodeTable::from_table(codec.character_codec().table()),
            strings: PersistedCodeTable::from_table(codec.string_codec().table()),
        }
    }

    pub fn to_list_codec(&self) -> Result<ListCodec> {
        self.to_observed_list_codec(observer::noop())
    }

    /// Rebuild the codecs with `observer` attached to both layers.
    pub fn to_observed_list_codec(&self, observer: Arc<dyn CodecObserver>) -> Result<ListCodec> {
        let chars = CharacterCodec::from_table(self.characters.to_table()?)?
            .with_observer(Arc::clone(&observer));
        let strings = StringCodec::from_table(self.strings.to_table()?, Arc::new(chars))?
            .with_observer(observer);
        Ok(ListCodec::new(Arc::new(strings)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_bincode(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_bincode(self, path)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

pub fn save_bincode<V: Serialize, P: AsRef<Path>>(value: &V, path: P) -> Result<()> {
    let data = bincode::serialize(value)?;
    fs::write(path, data)?;
    Ok(())
}

pub fn load_bincode<V: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<V> {
    let data = fs::read(path)?;
    Ok(bincode::deserialize(&data)?)
}
