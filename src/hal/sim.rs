//! Simulated UART for host builds and tests.
//!
//! Models a peripheral with level-triggered RX (the flag stays up while
//! bytes are waiting) and a TX flag that rises again every time a byte has
//! been handed to the transmitter. Both wires are byte rings, so a test
//! thread can play the remote peer while another thread plays the
//! interrupt.
//!
//! ```text
//! receive() ──▶ [wire_rx] ──read_byte()──▶ ISR
//! ISR ──write_byte()──▶ [wire_tx] ──pop_transmitted()──▶ test
//! ```

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use super::uart::{Direction, UartPeripheral};
use crate::config::UartConfig;
use crate::port::SerialPort;
use crate::ring::ByteRing;

/// Default size of each simulated wire.
pub const DEFAULT_WIRE_SIZE: usize = 256;

/// Upper bound on handler runs per `run_until_idle` call.
pub const MAX_SERVICE_ROUNDS: usize = 1 << 16;

/// In-memory UART.
pub struct SimUart<const N: usize = DEFAULT_WIRE_SIZE> {
    wire_rx: ByteRing<N>,
    wire_tx: ByteRing<N>,
    /// Software-forced RX flag; the data level is read from `wire_rx`.
    rx_flag: AtomicBool,
    tx_flag: AtomicBool,
    rx_enabled: AtomicBool,
    tx_enabled: AtomicBool,
    tx_ready: AtomicBool,
    /// Transmitted bytes lost because `wire_tx` was full.
    tx_lost: AtomicU32,
    baud_rate: AtomicU32,
    priority: AtomicU8,
    sub_priority: AtomicU8,
}

impl<const N: usize> SimUart<N> {
    pub const fn new() -> Self {
        Self {
            wire_rx: ByteRing::new(),
            wire_tx: ByteRing::new(),
            rx_flag: AtomicBool::new(false),
            tx_flag: AtomicBool::new(false),
            rx_enabled: AtomicBool::new(false),
            tx_enabled: AtomicBool::new(false),
            tx_ready: AtomicBool::new(true),
            tx_lost: AtomicU32::new(0),
            baud_rate: AtomicU32::new(0),
            priority: AtomicU8::new(0),
            sub_priority: AtomicU8::new(0),
        }
    }

    /// Peer sends one byte. Returns `false` if the wire is saturated.
    pub fn receive(&self, byte: u8) -> bool {
        self.wire_rx.push(byte).is_ok()
    }

    /// Peer sends several bytes. Returns how many made it onto the wire.
    pub fn receive_all(&self, bytes: &[u8]) -> usize {
        bytes.iter().take_while(|&&b| self.receive(b)).count()
    }

    /// Bytes the peer has sent that the handler has not read yet.
    pub fn unread(&self) -> usize {
        self.wire_rx.len()
    }

    /// Oldest byte put on the wire by the transport.
    pub fn pop_transmitted(&self) -> Option<u8> {
        self.wire_tx.pop()
    }

    /// Move transmitted bytes into `out`. Returns the count.
    pub fn take_transmitted(&self, out: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in out.iter_mut() {
            match self.wire_tx.pop() {
                Some(b) => {
                    *slot = b;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    pub fn transmitted_len(&self) -> usize {
        self.wire_tx.len()
    }

    pub fn tx_lost(&self) -> u32 {
        self.tx_lost.load(Ordering::Relaxed)
    }

    /// Hold the transmitter busy (`false`) or let it accept bytes.
    pub fn set_transmit_ready(&self, ready: bool) {
        self.tx_ready.store(ready, Ordering::Release);
    }

    pub fn interrupt_enabled(&self, dir: Direction) -> bool {
        match dir {
            Direction::Rx => self.rx_enabled.load(Ordering::Acquire),
            Direction::Tx => self.tx_enabled.load(Ordering::Acquire),
        }
    }

    /// The CPU would enter the handler now.
    pub fn interrupt_pending(&self) -> bool {
        (self.interrupt_flag(Direction::Rx) && self.interrupt_enabled(Direction::Rx))
            || (self.interrupt_flag(Direction::Tx) && self.interrupt_enabled(Direction::Tx))
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate.load(Ordering::Relaxed)
    }

    pub fn priority(&self) -> (u8, u8) {
        (
            self.priority.load(Ordering::Relaxed),
            self.sub_priority.load(Ordering::Relaxed),
        )
    }
}

impl<const N: usize> Default for SimUart<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> UartPeripheral for SimUart<N> {
    type Error = Infallible;

    fn configure(&self, config: &UartConfig) -> Result<(), Self::Error> {
        self.baud_rate.store(config.baud_rate, Ordering::Relaxed);
        Ok(())
    }

    fn set_priority(&self, priority: u8, sub_priority: u8) {
        self.priority.store(priority, Ordering::Relaxed);
        self.sub_priority.store(sub_priority, Ordering::Relaxed);
    }

    fn is_receive_ready(&self) -> bool {
        self.wire_rx.has_data()
    }

    fn read_byte(&self) -> u8 {
        // Empty data register reads as zero
        self.wire_rx.pop().unwrap_or(0)
    }

    fn is_transmit_ready(&self) -> bool {
        self.tx_ready.load(Ordering::Acquire)
    }

    fn write_byte(&self, byte: u8) {
        if self.wire_tx.push(byte).is_err() {
            self.tx_lost.fetch_add(1, Ordering::Relaxed);
        }
        // Shift register drained: transmitter ready again
        self.tx_flag.store(true, Ordering::Release);
    }

    fn enable_interrupt(&self, dir: Direction, enable: bool) {
        match dir {
            Direction::Rx => self.rx_enabled.store(enable, Ordering::Release),
            Direction::Tx => self.tx_enabled.store(enable, Ordering::Release),
        }
    }

    fn interrupt_flag(&self, dir: Direction) -> bool {
        match dir {
            // Level-triggered: up while data is waiting, or forced by software
            Direction::Rx => self.rx_flag.load(Ordering::Acquire) || self.wire_rx.has_data(),
            Direction::Tx => self.tx_flag.load(Ordering::Acquire),
        }
    }

    fn clear_interrupt_flag(&self, dir: Direction) {
        match dir {
            Direction::Rx => self.rx_flag.store(false, Ordering::Release),
            Direction::Tx => self.tx_flag.store(false, Ordering::Release),
        }
    }

    fn set_interrupt_flag(&self, dir: Direction) {
        match dir {
            Direction::Rx => self.rx_flag.store(true, Ordering::Release),
            Direction::Tx => self.tx_flag.store(true, Ordering::Release),
        }
    }
}

/// Run the interrupt handler for as long as the CPU would keep entering it.
///
/// Returns the number of handler invocations.
pub fn run_until_idle<const N: usize, const RX: usize, const TX: usize>(
    port: &SerialPort<SimUart<N>, RX, TX>,
) -> usize {
    let mut rounds = 0;
    while port.uart().interrupt_pending() && rounds < MAX_SERVICE_ROUNDS {
        port.on_interrupt();
        rounds += 1;
    }
    rounds
}
