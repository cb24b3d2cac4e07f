//! Log output over the transport itself.
//!
//! Drains [`LogStream`] entries and writes them through
//! [`SerialPort::write_fast`], so a burst of log lines can be cut short
//! but never stalls the foreground.
//!
//! # Output
//!
//! ```text
//! [   1234567] WARN: rx overflow, dropped 0x41
//! ```

use crate::hal::uart::UartPeripheral;
use crate::logging::{format_to_buffer, LogEntry, LogStream};
use crate::port::SerialPort;

/// Size of one formatted line.
pub const LINE_BUF_SIZE: usize = 160;

/// Format log entry to string.
///
/// Format: `[timestamp_us] LEVEL: message\r\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    format_to_buffer(
        buf,
        format_args!(
            "[{:10}] {}: {}\r\n",
            entry.timestamp_us,
            entry.level.as_str(),
            entry.message()
        ),
    )
}

/// Write every pending entry to the port (foreground).
///
/// Reports and resets the stream's dropped count afterwards. Returns the
/// number of entries written.
pub fn drain_to_port<U: UartPeripheral, const RX: usize, const TX: usize, const N: usize>(
    port: &SerialPort<U, RX, TX>,
    stream: &LogStream<N>,
) -> usize {
    let mut format_buf = [0u8; LINE_BUF_SIZE];
    let mut written = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut format_buf);
        port.write_fast(&format_buf[..len]);
        written += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let len = format_to_buffer(
            &mut format_buf,
            format_args!("[WARN] Dropped: LOG={}\r\n", dropped),
        );
        port.write_fast(&format_buf[..len]);
        stream.reset_dropped();
    }

    written
}
