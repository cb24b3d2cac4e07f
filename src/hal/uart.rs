//! UART peripheral interface.
//!
//! The transport never touches registers directly; it drives the
//! peripheral through this trait. All methods take `&self` because the
//! same peripheral is used from the interrupt and from the foreground.

use crate::config::UartConfig;

/// Interrupt source direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Receive data available.
    Rx,
    /// Transmitter ready for another byte.
    Tx,
}

/// Serial peripheral driver consumed by [`crate::port::SerialPort`].
pub trait UartPeripheral {
    /// Error reported by `configure`.
    type Error;

    /// Apply baud rate and frame format.
    fn configure(&self, config: &UartConfig) -> Result<(), Self::Error>;

    /// Set vector priority and sub-priority.
    fn set_priority(&self, priority: u8, sub_priority: u8);

    /// A received byte is waiting in the data register.
    fn is_receive_ready(&self) -> bool;

    /// Read one byte from the data register.
    fn read_byte(&self) -> u8;

    /// The transmitter can take another byte.
    fn is_transmit_ready(&self) -> bool;

    /// Hand one byte to the transmitter.
    fn write_byte(&self, byte: u8);

    /// Enable or disable an interrupt source.
    fn enable_interrupt(&self, dir: Direction, enable: bool);

    /// Interrupt flag of a source is raised.
    fn interrupt_flag(&self, dir: Direction) -> bool;

    /// Acknowledge an interrupt source.
    fn clear_interrupt_flag(&self, dir: Direction);

    /// Raise an interrupt flag by software, forcing the handler to run.
    fn set_interrupt_flag(&self, dir: Direction);
}
