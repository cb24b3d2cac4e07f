//! # UartRingTransport
//!
//! Interrupt-driven UART transport with XON/XOFF flow control.
//!
//! ## Architecture
//!
//! All serial traffic flows through [`SerialPort`]:
//! - The UART interrupt fills the RX ring and drains the TX ring
//! - The foreground queues output and reads lines with [`LineReader`]
//! - [`FlowControl`] is the only state both sides write
//! - No locks, no heap, no blocking in interrupt context

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod flow;
pub mod hal;
pub mod line;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod port;
pub mod ring;
pub mod stats;

pub use config::{Settings, TransportConfig, UartConfig};
pub use error::TransportError;
pub use flow::{FlowControl, FlowState, PendingSignal, XOFF, XON};
pub use line::LineReader;
pub use log_globals::PORT_LOG_STREAM;
pub use port::SerialPort;
pub use ring::ByteRing;
pub use stats::{StatsSnapshot, TransportStats};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");
