use thiserror::Error;

/// Crate-wide error type.
///
/// Construction-time failures (`EmptyAlphabet`, `CodeTooLong`, `Config`,
/// `InvalidCodeTable`) point at a configuration problem on the caller's side.
/// Decode-time failures (`OutOfBits`, `UnknownCode`, `InvalidLiteral`) abort the
/// decode in progress; symbols already delivered to a consumer stay valid.
#[derive(Error, Debug)]
pub enum HuffpackError {
    /// No frequencies were supplied to a symbol table.
    #[error("empty alphabet: cannot build a code table without symbols")]
    EmptyAlphabet,

    /// The alphabet cannot be coded within the maximum code length.
    #[error("{symbols} symbols cannot be coded with codes of at most {maximum_length} bits")]
    CodeTooLong { symbols: usize, maximum_length: u8 },

    /// A read asked for more bits than remain in the storage.
    #[error("out of bits: requested {requested}, available {available}")]
    OutOfBits { requested: u8, available: u64 },

    /// A bit pattern matched no entry of the code table.
    #[error("unknown code at bit position {position}")]
    UnknownCode { position: u64 },

    /// A stream writer was closed while holding a partial byte.
    #[error("stream closed with {pending} unflushed bits")]
    UnflushedBits { pending: u8 },

    /// Bit counts are limited to 1..=64.
    #[error("invalid bit count: {0}")]
    InvalidBitCount(u32),

    /// Seek target lies beyond the stored bits.
    #[error("seek to bit {position} past end of storage ({size} bits)")]
    SeekPastEnd { position: u64, size: u64 },

    /// The bit source cannot be repositioned.
    #[error("bit source does not support seeking")]
    Unseekable,

    /// An escaped literal is not a Unicode scalar value.
    #[error("escaped literal {0:#x} is not a valid character")]
    InvalidLiteral(u32),

    /// A persisted or supplied code table is inconsistent.
    #[error("invalid code table: {0}")]
    InvalidCodeTable(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary (de)serialization of persisted tables.
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    /// JSON (de)serialization of persisted tables or configuration.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, HuffpackError>;
