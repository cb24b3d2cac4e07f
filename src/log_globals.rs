//! Global log stream instance.
//!
//! One stream for the whole transport: the UART interrupt and the
//! foreground both produce, the foreground drain consumes.

use crate::logging::LogStream;

/// Transport event log.
///
/// Producers: UART interrupt handler, foreground transport calls.
/// Consumer: `log_drain::drain_to_port`.
pub static PORT_LOG_STREAM: LogStream = LogStream::new();
