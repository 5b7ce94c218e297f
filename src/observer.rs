//! Optional instrumentation hook for codecs.
//!
//! Codecs report each code they write or read to a [`CodecObserver`]. The
//! default is [`NoopObserver`]; [`CodecStats`] keeps atomic counters that can
//! be shared across threads and inspected after a run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

/// Receives one event per symbol handled by a codec.
pub trait CodecObserver: Send + Sync + std::fmt::Debug {
    /// A symbol was written using `bits` bits. `escaped` marks symbols that
    /// went through an escape path.
    fn on_encode(&self, bits: u64, escaped: bool) {
        let _ = (bits, escaped);
    }

    /// A symbol was read using `bits` bits.
    fn on_decode(&self, bits: u64, escaped: bool) {
        let _ = (bits, escaped);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CodecObserver for NoopObserver {}

pub(crate) fn noop() -> Arc<dyn CodecObserver> {
    Arc::new(NoopObserver)
}

/// Counters over every encode and decode event.
#[derive(Debug, Default)]
pub struct CodecStats {
    symbols_encoded: AtomicU64,
    bits_encoded: AtomicU64,
    escapes_encoded: AtomicU64,
    symbols_decoded: AtomicU64,
    bits_decoded: AtomicU64,
    escapes_decoded: AtomicU64,
}

/// Point-in-time copy of [`CodecStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub symbols_encoded: u64,
    pub bits_encoded: u64,
    pub escapes_encoded: u64,
    pub symbols_decoded: u64,
    pub bits_decoded: u64,
    pub escapes_decoded: u64,
}

impl CodecStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            symbols_encoded: self.symbols_encoded.load(Ordering::Relaxed),
            bits_encoded: self.bits_encoded.load(Ordering::Relaxed),
            escapes_encoded: self.escapes_encoded.load(Ordering::Relaxed),
            symbols_decoded: self.symbols_decoded.load(Ordering::Relaxed),
            bits_decoded: self.bits_decoded.load(Ordering::Relaxed),
            escapes_decoded: self.escapes_decoded.load(Ordering::Relaxed),
        }
    }

    pub fn report(&self) {
        let s = self.snapshot();
        let avg = if s.symbols_encoded == 0 {
            0.0
        } else {
            s.bits_encoded as f64 / s.symbols_encoded as f64
        };
        info!(
            symbols_encoded = s.symbols_encoded,
            bits_encoded = s.bits_encoded,
            escapes_encoded = s.escapes_encoded,
            symbols_decoded = s.symbols_decoded,
            escapes_decoded = s.escapes_decoded,
            avg_bits = avg,
            "codec statistics"
        );
    }
}

impl CodecObserver for CodecStats {
    fn on_encode(&self, bits: u64, escaped: bool) {
        self.symbols_encoded.fetch_add(1, Ordering::Relaxed);
        self.bits_encoded.fetch_add(bits, Ordering::Relaxed);
        if escaped {
            self.escapes_encoded.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn on_decode(&self, bits: u64, escaped: bool) {
        self.symbols_decoded.fetch_add(1, Ordering::Relaxed);
        self.bits_decoded.fetch_add(bits, Ordering::Relaxed);
        if escaped {
            self.escapes_decoded.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_accumulate() {
        let stats = CodecStats::new();
        stats.on_encode(3, false);
        stats.on_encode(25, true);
        stats.on_decode(3, false);
        let s = stats.snapshot();
        assert_eq!(s.symbols_encoded, 2);
        assert_eq!(s.bits_encoded, 28);
        assert_eq!(s.escapes_encoded, 1);
        assert_eq!(s.symbols_decoded, 1);
        assert_eq!(s.escapes_decoded, 0);
    }
}
