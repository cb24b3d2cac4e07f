//! Lock-free SPSC (Single Producer, Single Consumer) byte ring.
//!
//! One ring carries received bytes from the UART interrupt to the
//! foreground, the other carries outgoing bytes the opposite way.
//!
//! ```text
//! ISR ──push──▶ [ RX ring ] ──pop──▶ LineReader
//! put_char ──push──▶ [ TX ring ] ──pop──▶ ISR
//! ```
//!
//! # Rules
//!
//! - Exactly one context calls `push`, exactly one calls `pop`
//! - `push` on a full ring never blocks and never overwrites
//! - Bytes come out in the order they went in

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::error::TransportError;

/// Default ring capacity.
pub const DEFAULT_RING_SIZE: usize = 128;

/// Slots kept free above the high-water mark.
///
/// Room for the bytes a peer may still send after it has been asked to
/// stop (line latency plus its own FIFO).
pub const DEFAULT_HIGH_WATER_RESERVE: usize = 8;

/// Fixed-capacity byte queue shared between interrupt and foreground.
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to use because:
/// - Single producer owns `write_idx` (enforced by design, not by type system)
/// - Single consumer owns `read_idx`
/// - A slot is only written while outside the `[read, write)` window
///
/// # Memory Ordering
///
/// - Producer publishes a byte with a `Release` store of `write_idx`
/// - Consumer frees a slot with a `Release` store of `read_idx`
/// - Each side `Acquire`-loads the other side's index
pub struct ByteRing<const N: usize = DEFAULT_RING_SIZE> {
    slots: UnsafeCell<[u8; N]>,

    /// Next write position (monotonically increasing, wraps via mask).
    write_idx: AtomicUsize,

    /// Next read position (monotonically increasing, wraps via mask).
    read_idx: AtomicUsize,

    /// Occupancy at which the ring reports almost full.
    high_water: usize,
}

// SAFETY: Single producer, single consumer, atomic coordination.
unsafe impl<const N: usize> Sync for ByteRing<N> {}
unsafe impl<const N: usize> Send for ByteRing<N> {}

impl<const N: usize> ByteRing<N> {
    const MASK: usize = N - 1;

    /// Create an empty ring with the default high-water reserve.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        let mark = if N > DEFAULT_HIGH_WATER_RESERVE {
            N - DEFAULT_HIGH_WATER_RESERVE
        } else {
            N
        };
        Self::with_high_water(mark)
    }

    /// Create an empty ring that reports almost full at `mark` bytes.
    pub const fn with_high_water(mark: usize) -> Self {
        assert!(N.is_power_of_two(), "Ring size must be power of 2");
        assert!(mark <= N, "High-water mark exceeds capacity");

        Self {
            slots: UnsafeCell::new([0u8; N]),
            write_idx: AtomicUsize::new(0),
            read_idx: AtomicUsize::new(0),
            high_water: mark,
        }
    }

    /// Reset occupancy and both cursors to zero.
    ///
    /// Only call while neither side can touch the ring (interrupt source
    /// disabled), e.g. during transport init.
    pub fn clear(&self) {
        self.read_idx.store(0, Ordering::Relaxed);
        self.write_idx.store(0, Ordering::Release);
    }

    /// Append a byte (producer side).
    ///
    /// Returns `Err(TransportError::Overflow)` without touching the ring
    /// when it is full.
    #[inline]
    pub fn push(&self, byte: u8) -> Result<(), TransportError> {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N {
            return Err(TransportError::Overflow);
        }

        // SAFETY: Single producer; slot is outside the readable window.
        unsafe {
            (*self.slots.get())[write & Self::MASK] = byte;
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Remove the oldest byte (consumer side).
    ///
    /// Returns `None` if the ring is empty.
    #[inline]
    pub fn pop(&self) -> Option<u8> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: Single consumer; slot was published by the producer.
        let byte = unsafe { (*self.slots.get())[read & Self::MASK] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Look at the oldest byte without removing it (consumer side).
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: Single consumer; slot was published by the producer.
        Some(unsafe { (*self.slots.get())[read & Self::MASK] })
    }

    /// Number of bytes waiting.
    #[inline]
    pub fn len(&self) -> usize {
        let read = self.read_idx.load(Ordering::Acquire);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read).min(N)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same as `!is_empty()`; reads better at "is there input?" call sites.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.len() > 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// True once occupancy reaches the high-water mark.
    #[inline]
    pub fn is_almost_full(&self) -> bool {
        self.len() >= self.high_water
    }

    /// Free slots left.
    #[inline]
    pub fn available(&self) -> usize {
        N - self.len()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub const fn high_water(&self) -> usize {
        self.high_water
    }

    /// Slot the next `pop` reads from.
    #[inline]
    pub fn read_cursor(&self) -> usize {
        self.read_idx.load(Ordering::Acquire) & Self::MASK
    }

    /// Slot the next `push` writes to.
    #[inline]
    pub fn write_cursor(&self) -> usize {
        self.write_idx.load(Ordering::Acquire) & Self::MASK
    }
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
