//! Module: config
//!
//! Purpose: Configuration for the UART transport.
//!
//! Architecture:
//! - `UartConfig`: line settings handed to the peripheral once at init
//! - `TransportConfig`: runtime toggles flipped by foreground calls
//! - All runtime config atomically accessible (lock-free)
//!
//! Safety: ISR-safe. All access via atomics, no locks.

use core::sync::atomic::{AtomicBool, Ordering};

/// Default line speed.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default interrupt priority level of the UART vector.
pub const DEFAULT_IRQ_PRIORITY: u8 = 5;

/// Number of data bits
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum DataBits {
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
}

/// Parity check
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum StopBits {
    One,
    Two,
}

/// Line and interrupt settings for the serial peripheral.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UartConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// Interrupt vector priority.
    pub priority: u8,
    /// Sub-priority within `priority`.
    pub sub_priority: u8,
}

impl UartConfig {
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    pub fn priority(mut self, priority: u8, sub_priority: u8) -> Self {
        self.priority = priority;
        self.sub_priority = sub_priority;
        self
    }

    /// Bits on the wire per character, start bit included.
    pub fn symbol_length(&self) -> u8 {
        let mut length: u8 = 1; // start bit
        length += self.data_bits as u8;
        length += match self.parity {
            Parity::None => 0,
            _ => 1,
        };
        length += match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        length
    }

    /// Characters per second the line can carry.
    pub fn chars_per_second(&self) -> u32 {
        self.baud_rate / self.symbol_length() as u32
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            priority: DEFAULT_IRQ_PRIORITY,
            sub_priority: 0,
        }
    }
}

/// Plain copy of the runtime toggles.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Send every input byte back out.
    pub echo: bool,
    /// Fold CR and CR-LF into a single LF.
    pub eol_fix: bool,
    /// Never wait for input, even where the caller allows it.
    pub always_nonblocking: bool,
    /// XON/XOFF handling on receive and transmit.
    pub flow_control: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            echo: false,
            eol_fix: true,
            always_nonblocking: false,
            flow_control: true,
        }
    }
}

/// Runtime toggles, readable from the interrupt handler.
pub struct TransportConfig {
    echo: AtomicBool,
    eol_fix: AtomicBool,
    always_nonblocking: AtomicBool,
    flow_control: AtomicBool,
}

impl TransportConfig {
    pub const fn new() -> Self {
        Self {
            echo: AtomicBool::new(false),
            eol_fix: AtomicBool::new(true),
            always_nonblocking: AtomicBool::new(false),
            flow_control: AtomicBool::new(true),
        }
    }

    #[inline]
    pub fn echo(&self) -> bool {
        self.echo.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_echo(&self, enable: bool) {
        self.echo.store(enable, Ordering::Relaxed);
    }

    #[inline]
    pub fn eol_fix(&self) -> bool {
        self.eol_fix.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_eol_fix(&self, enable: bool) {
        self.eol_fix.store(enable, Ordering::Relaxed);
    }

    #[inline]
    pub fn always_nonblocking(&self) -> bool {
        self.always_nonblocking.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_always_nonblocking(&self, enable: bool) {
        self.always_nonblocking.store(enable, Ordering::Relaxed);
    }

    #[inline]
    pub fn flow_control(&self) -> bool {
        self.flow_control.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_flow_control(&self, enable: bool) {
        self.flow_control.store(enable, Ordering::Relaxed);
    }

    /// Get a snapshot of all toggles.
    pub fn snapshot(&self) -> Settings {
        Settings {
            echo: self.echo(),
            eol_fix: self.eol_fix(),
            always_nonblocking: self.always_nonblocking(),
            flow_control: self.flow_control(),
        }
    }

    /// Overwrite all toggles.
    pub fn apply(&self, settings: Settings) {
        self.set_echo(settings.echo);
        self.set_eol_fix(settings.eol_fix);
        self.set_always_nonblocking(settings.always_nonblocking);
        self.set_flow_control(settings.flow_control);
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}
