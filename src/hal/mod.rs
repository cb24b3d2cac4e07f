//! Hardware Abstraction Layer for the UART transport.
//!
//! Thin peripheral wrappers. Buffering and flow control stay in core
//! modules, HAL is just I/O.

pub mod sim;
pub mod uart;

#[cfg(target_os = "espidf")]
pub mod esp;

pub use sim::SimUart;
pub use uart::{Direction, UartPeripheral};

#[cfg(target_os = "espidf")]
pub use esp::EspUart;
