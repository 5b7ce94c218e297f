//! Bit-level storage used by every codec.
//!
//! All widths are written and read MSB-first, so the encoded output is a flat
//! big-endian bit stream:
//!
//! ```text
//! write(0b101, 3); write(0b11, 2)   ->   10111___
//! ```
//!
//! [`BitArray`] is the in-memory, cursor-seekable store. [`BitStreamWriter`]
//! and [`BitStreamReader`] adapt byte sinks and sources, buffering a single
//! pending byte. A stream cannot be patched after the fact, so closing a
//! writer that still holds a partial byte fails with
//! [`HuffpackError::UnflushedBits`] unless the caller pads explicitly.

use std::io::{self, Read, Write};

use crate::error::{HuffpackError, Result};

/// Largest number of bits moved by a single read or write.
pub const MAX_BIT_COUNT: u8 = 64;

/// Bytes of bit-length header in front of a framed [`BitArray`].
pub const FRAME_HEADER_LEN: usize = 8;

fn check_count(count: u8) -> Result<()> {
    if count == 0 || count > MAX_BIT_COUNT {
        return Err(HuffpackError::InvalidBitCount(count as u32));
    }
    Ok(())
}

fn low_mask(count: u32) -> u64 {
    if count >= 64 {
        u64::MAX
    } else {
        (1u64 << count) - 1
    }
}

/// Destination for encoded bits.
pub trait BitSink {
    /// Append the low `count` bits of `value`, most significant first.
    fn write_bits(&mut self, value: u64, count: u8) -> Result<()>;

    /// Append a single bit.
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Number of bits written so far.
    fn bits_written(&self) -> u64;
}

/// Source of encoded bits.
pub trait BitSource {
    /// Read `count` bits, most significant first.
    fn read_bits(&mut self, count: u8) -> Result<u64>;

    /// Read a single bit.
    fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Bit offset of the next read.
    fn position(&self) -> u64;

    /// True once no further bit can be read.
    fn is_exhausted(&mut self) -> Result<bool>;

    /// Move back to the first bit.
    fn rewind(&mut self) -> Result<()> {
        Err(HuffpackError::Unseekable)
    }
}

/// Growable, cursor-addressed sequence of bits.
///
/// # Invariants
/// - `cursor <= size_in_bits`
/// - `bytes.len() == ceil(size_in_bits / 8)`
/// - bits past `size_in_bits` in the final byte are zero
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitArray {
    bytes: Vec<u8>,
    size_in_bits: u64,
    cursor: u64,
}

impl BitArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: u64) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8) as usize),
            size_in_bits: 0,
            cursor: 0,
        }
    }

    /// Wrap raw bytes; every bit of every byte counts as stored.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let size_in_bits = bytes.len() as u64 * 8;
        Self {
            bytes,
            size_in_bits,
            cursor: 0,
        }
    }

    /// Wrap raw bytes holding exactly `size_in_bits` meaningful bits.
    pub fn from_bytes_with_len(mut bytes: Vec<u8>, size_in_bits: u64) -> Result<Self> {
        let available = bytes.len() as u64 * 8;
        if size_in_bits > available {
            return Err(HuffpackError::SeekPastEnd {
                position: size_in_bits,
                size: available,
            });
        }
        bytes.truncate(size_in_bits.div_ceil(8) as usize);
        let tail = (size_in_bits % 8) as u32;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= !(0xFFu8 >> tail);
            }
        }
        Ok(Self {
            bytes,
            size_in_bits,
            cursor: 0,
        })
    }

    /// Serialize as an 8-byte big-endian bit length followed by the bytes,
    /// so padding in the last byte is never mistaken for data.
    pub fn to_framed_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FRAME_HEADER_LEN + self.bytes.len());
        out.extend_from_slice(&self.size_in_bits.to_be_bytes());
        out.extend_from_slice(&self.bytes);
        out
    }

    /// Inverse of [`Self::to_framed_bytes`].
    pub fn from_framed_bytes(mut framed: Vec<u8>) -> Result<Self> {
        if framed.len() < FRAME_HEADER_LEN {
            return Err(HuffpackError::OutOfBits {
                requested: 64,
                available: framed.len() as u64 * 8,
            });
        }
        let mut header = [0u8; FRAME_HEADER_LEN];
        header.copy_from_slice(&framed[..FRAME_HEADER_LEN]);
        let bytes = framed.split_off(FRAME_HEADER_LEN);
        Self::from_bytes_with_len(bytes, u64::from_be_bytes(header))
    }

    pub fn len_bits(&self) -> u64 {
        self.size_in_bits
    }

    pub fn is_empty(&self) -> bool {
        self.size_in_bits == 0
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Bits left between the cursor and the end of storage.
    pub fn remaining(&self) -> u64 {
        self.size_in_bits - self.cursor
    }

    /// Reposition the cursor. Writing after a backward seek overwrites.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        if position > self.size_in_bits {
            return Err(HuffpackError::SeekPastEnd {
                position,
                size: self.size_in_bits,
            });
        }
        self.cursor = position;
        Ok(())
    }

    /// Backing bytes; the final byte is zero padded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Read `count` bits and sign-extend them from bit `count - 1`.
    pub fn read_bits_signed(&mut self, count: u8) -> Result<i64> {
        let raw = self.read_bits(count)?;
        let shift = 64 - count as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Render the stored bits as `0`/`1` characters.
    pub fn to_bit_string(&self) -> String {
        (0..self.size_in_bits)
            .map(|i| {
                let byte = self.bytes[(i / 8) as usize];
                if (byte >> (7 - (i % 8))) & 1 == 1 {
                    '1'
                } else {
                    '0'
                }
            })
            .collect()
    }
}

impl BitSink for BitArray {
    fn write_bits(&mut self, value: u64, count: u8) -> Result<()> {
        check_count(count)?;
        let mut remaining = count as u32;
        while remaining > 0 {
            let byte_idx = (self.cursor / 8) as usize;
            let bit_offset = (self.cursor % 8) as u32;
            if byte_idx == self.bytes.len() {
                self.bytes.push(0);
            }

            let room = 8 - bit_offset;
            let take = remaining.min(room);
            let shift = remaining - take;
            let chunk = ((value >> shift) & low_mask(take)) as u8;
            let pos = room - take;
            let mask = (low_mask(take) as u8) << pos;
            self.bytes[byte_idx] = (self.bytes[byte_idx] & !mask) | (chunk << pos);

            self.cursor += take as u64;
            remaining -= take;
        }
        self.size_in_bits = self.size_in_bits.max(self.cursor);
        Ok(())
    }

    fn bits_written(&self) -> u64 {
        self.size_in_bits
    }
}

impl BitSource for BitArray {
    fn read_bits(&mut self, count: u8) -> Result<u64> {
        check_count(count)?;
        let available = self.remaining();
        if count as u64 > available {
            return Err(HuffpackError::OutOfBits {
                requested: count,
                available,
            });
        }

        let mut result = 0u64;
        let mut remaining = count as u32;
        while remaining > 0 {
            let byte = self.bytes[(self.cursor / 8) as usize];
            let bits_in_byte = 8 - (self.cursor % 8) as u32;
            let take = remaining.min(bits_in_byte);
            let bits = (byte as u64 >> (bits_in_byte - take)) & low_mask(take);
            result = (result << take) | bits;
            self.cursor += take as u64;
            remaining -= take;
        }
        Ok(result)
    }

    fn position(&self) -> u64 {
        self.cursor
    }

    fn is_exhausted(&mut self) -> Result<bool> {
        Ok(self.cursor >= self.size_in_bits)
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }
}

/// Writes bits to a byte sink one byte at a time.
#[derive(Debug)]
pub struct BitStreamWriter<W: Write> {
    inner: W,
    /// Partial byte, MSB-aligned.
    pending: u8,
    /// Bits held in `pending`; 8 only while a failed flush awaits retry.
    fill: u8,
    written: u64,
}

impl<W: Write> BitStreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: 0,
            fill: 0,
            written: 0,
        }
    }

    /// Bits buffered but not yet handed to the sink.
    pub fn pending_bits(&self) -> u8 {
        self.fill
    }

    /// Hand a full pending byte to the sink. On failure the byte stays
    /// pending and the next write retries it.
    fn flush_pending(&mut self) -> Result<()> {
        self.inner.write_all(&[self.pending])?;
        self.pending = 0;
        self.fill = 0;
        Ok(())
    }

    /// Flush a partial byte, padding it with zero bits. Returns the padding width.
    pub fn pad_to_byte(&mut self) -> Result<u8> {
        if self.fill == 0 {
            return Ok(0);
        }
        let padding = 8 - self.fill;
        self.flush_pending()?;
        Ok(padding)
    }

    /// Flush and return the sink. Fails while a partial byte is pending.
    pub fn close(mut self) -> Result<W> {
        if self.fill != 0 {
            return Err(HuffpackError::UnflushedBits {
                pending: self.fill,
            });
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> BitSink for BitStreamWriter<W> {
    fn write_bits(&mut self, value: u64, count: u8) -> Result<()> {
        check_count(count)?;
        let mut remaining = count as u32;
        while remaining > 0 {
            if self.fill == 8 {
                self.flush_pending()?;
            }
            let room = 8 - self.fill as u32;
            let take = remaining.min(room);
            let shift = remaining - take;
            let chunk = ((value >> shift) & low_mask(take)) as u8;
            self.pending |= chunk << (room - take);
            self.fill += take as u8;
            self.written += take as u64;
            remaining -= take;
        }
        if self.fill == 8 {
            self.flush_pending()?;
        }
        Ok(())
    }

    /// Bits accepted so far, including any a failed write left in the
    /// pending byte.
    fn bits_written(&self) -> u64 {
        self.written
    }
}

/// Reads bits from a byte source one byte at a time.
#[derive(Debug)]
pub struct BitStreamReader<R: Read> {
    inner: R,
    pending: u8,
    /// Unread bits left in `pending` (0-8).
    fill: u8,
    read: u64,
}

impl<R: Read> BitStreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: 0,
            fill: 0,
            read: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Load the next byte. Returns false at end of input.
    fn fetch(&mut self) -> Result<bool> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(false),
                Ok(_) => {
                    self.pending = buf[0];
                    self.fill = 8;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: Read> BitSource for BitStreamReader<R> {
    fn read_bits(&mut self, count: u8) -> Result<u64> {
        check_count(count)?;
        let mut result = 0u64;
        let mut remaining = count as u32;
        while remaining > 0 {
            if self.fill == 0 && !self.fetch()? {
                return Err(HuffpackError::OutOfBits {
                    requested: count,
                    available: (count as u32 - remaining) as u64,
                });
            }
            let take = remaining.min(self.fill as u32);
            let bits = (self.pending as u64 >> (self.fill as u32 - take)) & low_mask(take);
            result = (result << take) | bits;
            self.fill -= take as u8;
            self.read += take as u64;
            remaining -= take;
        }
        Ok(result)
    }

    fn position(&self) -> u64 {
        self.read
    }

    fn is_exhausted(&mut self) -> Result<bool> {
        if self.fill > 0 {
            return Ok(false);
        }
        Ok(!self.fetch()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_partial_bits() {
        let mut bits = BitArray::new();
        bits.write_bits(0b101, 3).unwrap();
        bits.write_bits(0b11, 2).unwrap();
        assert_eq!(bits.len_bits(), 5);
        assert_eq!(bits.as_bytes(), &[0b1011_1000]);

        bits.rewind().unwrap();
        assert_eq!(bits.read_bits(3).unwrap(), 0b101);
        assert_eq!(bits.read_bits(2).unwrap(), 0b11);
        assert!(bits.is_exhausted().unwrap());
    }

    #[test]
    fn full_width_values() {
        let mut bits = BitArray::new();
        bits.write_bit(true).unwrap();
        bits.write_bits(0x1234_5678_9ABC_DEF0, 64).unwrap();
        bits.write_bits(u64::MAX, 64).unwrap();
        bits.seek(0).unwrap();
        assert!(bits.read_bit().unwrap());
        assert_eq!(bits.read_bits(64).unwrap(), 0x1234_5678_9ABC_DEF0);
        assert_eq!(bits.read_bits(64).unwrap(), u64::MAX);
    }

    #[test]
    fn sign_bit_is_raw() {
        let mut bits = BitArray::new();
        bits.write_bits((-5i32) as u32 as u64, 32).unwrap();
        bits.seek(0).unwrap();
        assert_eq!(bits.read_bits(32).unwrap(), 0xFFFF_FFFB);
        bits.seek(0).unwrap();
        assert_eq!(bits.read_bits_signed(32).unwrap(), -5);
    }

    #[test]
    fn read_past_end_consumes_nothing() {
        let mut bits = BitArray::new();
        bits.write_bits(0b1010, 4).unwrap();
        bits.seek(1).unwrap();
        match bits.read_bits(4) {
            Err(HuffpackError::OutOfBits {
                requested: 4,
                available: 3,
            }) => {}
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(bits.cursor(), 1);
        assert_eq!(bits.read_bits(3).unwrap(), 0b010);
    }

    #[test]
    fn invalid_counts_rejected() {
        let mut bits = BitArray::new();
        assert!(matches!(
            bits.write_bits(0, 0),
            Err(HuffpackError::InvalidBitCount(0))
        ));
        assert!(matches!(
            bits.write_bits(0, 65),
            Err(HuffpackError::InvalidBitCount(65))
        ));
    }

    #[test]
    fn backward_seek_overwrites() {
        let mut bits = BitArray::new();
        bits.write_bits(0xFF, 8).unwrap();
        bits.write_bits(0xF, 4).unwrap();
        bits.seek(2).unwrap();
        bits.write_bits(0b000, 3).unwrap();
        assert_eq!(bits.len_bits(), 12);
        assert_eq!(bits.to_bit_string(), "110001111111");
        assert!(bits.seek(13).is_err());
    }

    #[test]
    fn from_bytes_with_len_masks_tail() {
        let bits = BitArray::from_bytes_with_len(vec![0xFF, 0xFF, 0xFF], 10).unwrap();
        assert_eq!(bits.as_bytes(), &[0xFF, 0b1100_0000]);
        assert_eq!(bits.len_bits(), 10);
        assert!(BitArray::from_bytes_with_len(vec![0], 9).is_err());
    }

    #[test]
    fn stream_roundtrip() {
        let mut writer = BitStreamWriter::new(Vec::new());
        writer.write_bits(0b1, 1).unwrap();
        writer.write_bits(0xABCD, 16).unwrap();
        writer.write_bits(0x7F, 7).unwrap();
        assert_eq!(writer.pending_bits(), 0);
        let bytes = writer.close().unwrap();
        assert_eq!(bytes.len(), 3);

        let mut reader = BitStreamReader::new(bytes.as_slice());
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(16).unwrap(), 0xABCD);
        assert_eq!(reader.read_bits(7).unwrap(), 0x7F);
        assert_eq!(reader.position(), 24);
        assert!(reader.is_exhausted().unwrap());
        assert!(matches!(
            reader.read_bits(1),
            Err(HuffpackError::OutOfBits { .. })
        ));
    }

    #[test]
    fn stream_close_with_partial_byte_fails() {
        let mut writer = BitStreamWriter::new(Vec::new());
        writer.write_bits(0b101, 3).unwrap();
        assert!(matches!(
            writer.close(),
            Err(HuffpackError::UnflushedBits { pending: 3 })
        ));

        let mut writer = BitStreamWriter::new(Vec::new());
        writer.write_bits(0b101, 3).unwrap();
        assert_eq!(writer.pad_to_byte().unwrap(), 5);
        assert_eq!(writer.close().unwrap(), vec![0b1010_0000]);
    }

    #[test]
    fn framed_bytes_keep_exact_length() {
        let mut bits = BitArray::new();
        bits.write_bits(0b10, 2).unwrap();
        let framed = bits.to_framed_bytes();
        assert_eq!(framed, vec![0, 0, 0, 0, 0, 0, 0, 2, 0b1000_0000]);

        let mut restored = BitArray::from_framed_bytes(framed).unwrap();
        assert_eq!(restored.len_bits(), 2);
        assert_eq!(restored.as_bytes(), bits.as_bytes());
        assert_eq!(restored.read_bits(2).unwrap(), 0b10);
        assert!(restored.is_exhausted().unwrap());
    }

    #[test]
    fn framed_bytes_reject_bad_headers() {
        assert!(matches!(
            BitArray::from_framed_bytes(vec![0, 0, 0]),
            Err(HuffpackError::OutOfBits { .. })
        ));
        assert!(matches!(
            BitArray::from_framed_bytes(vec![0, 0, 0, 0, 0, 0, 0, 9, 0xFF]),
            Err(HuffpackError::SeekPastEnd { position: 9, size: 8 })
        ));
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_keeps_count_in_step() {
        let mut writer = BitStreamWriter::new(FailingSink);
        writer.write_bits(0b101, 3).unwrap();
        assert!(matches!(
            writer.write_bits(0xFFF, 12),
            Err(HuffpackError::Io(_))
        ));
        // the first 5 bits of the second write completed the pending byte
        assert_eq!(writer.bits_written(), 8);
        assert_eq!(writer.pending_bits(), 8);

        // the stuck byte is retried before any new bit is accepted
        assert!(writer.write_bits(1, 1).is_err());
        assert_eq!(writer.bits_written(), 8);
    }

    #[test]
    fn stream_reader_cannot_rewind() {
        let mut reader = BitStreamReader::new(&[0u8][..]);
        assert!(matches!(reader.rewind(), Err(HuffpackError::Unseekable)));
    }
}
