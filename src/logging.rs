//! ISR-safe logging for the UART transport.
//!
//! # Architecture
//!
//! ```text
//! ISR / foreground        LogStream            Foreground drain
//! ────────────────        ─────────            ────────────────
//!
//! serial_log!() ───────▶ [L0][L1][L2] ──────▶ write_fast() to UART
//! non-blocking             lock-free           best-effort
//! ```
//!
//! # Rules
//!
//! - The interrupt handler never waits on a log call
//! - Messages may be dropped if the ring is full
//! - Log output goes through the same TX ring as data, but never blocks it

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 120;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 32;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    /// Log level.
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text, or a marker if it was cut inside a UTF-8 sequence.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log stream (multiple producers, single consumer).
///
/// - Interrupt and foreground can both push (slot reserved by CAS)
/// - Push never blocks (drops message if full)
/// - A slot becomes visible to the drain only after its commit flag is set
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    committed: [AtomicBool; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Producers own distinct slots (reserved via compare_exchange),
// single consumer only reads committed slots.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            committed: [const { AtomicBool::new(false) }; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry (ISR-safe, never blocks).
    ///
    /// Returns `true` if message was queued, `false` if dropped (ring full).
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let mut write = self.write_idx.load(Ordering::Relaxed);

        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }

            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => write = current,
            }
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: Slot reserved by the successful compare_exchange above;
        // the drain skips it until `committed` is set.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
            entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
        }

        self.committed[idx].store(true, Ordering::Release);
        true
    }

    /// Drain next log entry (single consumer).
    ///
    /// Returns `None` if no entries are available or the oldest one is
    /// still being written.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;
        if !self.committed[idx].load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: Single consumer, slot committed by its producer
        let entry = unsafe { (*self.entries.get())[idx] };

        self.committed[idx].store(false, Ordering::Relaxed);
        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Check if there are entries to drain.
    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() > 0
    }

    /// Get number of entries reserved but not yet drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer.
///
/// Returns the number of bytes written; output past the end is cut off.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    let mut writer = SliceWriter { buf, pos: 0 };
    let _ = writer.write_fmt(args);
    writer.pos
}

/// `core::fmt::Write` into a fixed byte slice, truncating.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl core::fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
#[inline]
pub fn timestamp_us() -> i64 {
    // SAFETY: esp_timer_get_time is always safe to call, also from ISRs
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

/// Host builds have no boot clock.
#[cfg(not(target_os = "espidf"))]
#[inline]
pub fn timestamp_us() -> i64 {
    0
}

/// ISR-safe log macro.
///
/// # Example
///
/// ```ignore
/// serial_log!(LogLevel::Warn, PORT_LOG_STREAM, "rx overflow: {:#04x}", byte);
/// ```
#[macro_export]
macro_rules! serial_log {
    ($level:expr, $stream:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($crate::logging::timestamp_us(), $level, &buf[..len]);
    }};
}

/// ISR-safe error log.
#[macro_export]
macro_rules! serial_error {
    ($stream:expr, $($arg:tt)*) => {
        $crate::serial_log!($crate::logging::LogLevel::Error, $stream, $($arg)*)
    };
}

/// ISR-safe warning log.
#[macro_export]
macro_rules! serial_warn {
    ($stream:expr, $($arg:tt)*) => {
        $crate::serial_log!($crate::logging::LogLevel::Warn, $stream, $($arg)*)
    };
}

/// ISR-safe info log.
#[macro_export]
macro_rules! serial_info {
    ($stream:expr, $($arg:tt)*) => {
        $crate::serial_log!($crate::logging::LogLevel::Info, $stream, $($arg)*)
    };
}

/// ISR-safe debug log.
#[macro_export]
macro_rules! serial_debug {
    ($stream:expr, $($arg:tt)*) => {
        $crate::serial_log!($crate::logging::LogLevel::Debug, $stream, $($arg)*)
    };
}

/// ISR-safe trace log (maximum verbosity).
#[macro_export]
macro_rules! serial_trace {
    ($stream:expr, $($arg:tt)*) => {
        $crate::serial_log!($crate::logging::LogLevel::Trace, $stream, $($arg)*)
    };
}
