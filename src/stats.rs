//! Transport statistics.
//!
//! Nothing in the transport is fatal: a full ring drops the byte and the
//! device keeps running. These counters make those drops visible.

use core::sync::atomic::{AtomicU32, Ordering};

/// Lock-free event counters.
///
/// Written from both contexts (each counter only from one), read anywhere.
///
/// ```ignore
/// let snap = port.stats().snapshot();
/// if snap.rx_overflow > 0 {
///     // peer ignored XOFF or flow control is off
/// }
/// ```
pub struct TransportStats {
    /// Received bytes dropped because the RX ring was full (ISR).
    rx_overflow: AtomicU32,

    /// Bytes cut off by `write_fast` on a full TX ring (foreground).
    tx_dropped: AtomicU32,

    /// XOFF bytes put on the wire (ISR).
    xoff_sent: AtomicU32,

    /// XON bytes put on the wire (ISR).
    xon_sent: AtomicU32,

    /// XOFF bytes received from the peer (ISR).
    peer_pauses: AtomicU32,
}

impl TransportStats {
    pub const fn new() -> Self {
        Self {
            rx_overflow: AtomicU32::new(0),
            tx_dropped: AtomicU32::new(0),
            xoff_sent: AtomicU32::new(0),
            xon_sent: AtomicU32::new(0),
            peer_pauses: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn record_rx_overflow(&self) {
        self.rx_overflow.fetch_add(1, Ordering::Relaxed);
    }

    /// Add `count` dropped bytes, saturating at `u32::MAX`.
    #[inline]
    pub fn record_tx_dropped(&self, count: usize) {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        let _ = self
            .tx_dropped
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_add(count))
            });
    }

    #[inline]
    pub fn record_xoff_sent(&self) {
        self.xoff_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_xon_sent(&self) {
        self.xon_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_peer_pause(&self) {
        self.peer_pauses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn rx_overflow(&self) -> u32 {
        self.rx_overflow.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn tx_dropped(&self) -> u32 {
        self.tx_dropped.load(Ordering::Relaxed)
    }

    /// Zero every counter (e.g., after reporting).
    pub fn reset(&self) {
        self.rx_overflow.store(0, Ordering::Relaxed);
        self.tx_dropped.store(0, Ordering::Relaxed);
        self.xoff_sent.store(0, Ordering::Relaxed);
        self.xon_sent.store(0, Ordering::Relaxed);
        self.peer_pauses.store(0, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters at a point in time.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            rx_overflow: self.rx_overflow(),
            tx_dropped: self.tx_dropped(),
            xoff_sent: self.xoff_sent.load(Ordering::Relaxed),
            xon_sent: self.xon_sent.load(Ordering::Relaxed),
            peer_pauses: self.peer_pauses.load(Ordering::Relaxed),
        }
    }
}

impl Default for TransportStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the transport counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub rx_overflow: u32,
    pub tx_dropped: u32,
    pub xoff_sent: u32,
    pub xon_sent: u32,
    pub peer_pauses: u32,
}

impl StatsSnapshot {
    /// Bytes lost in either direction.
    pub fn bytes_lost(&self) -> u32 {
        self.rx_overflow.saturating_add(self.tx_dropped)
    }
}
