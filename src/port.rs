//! Interrupt-driven serial port.
//!
//! This is the heart of the transport. Two execution contexts share it:
//!
//! ```text
//! foreground                    SerialPort                 UART ISR
//! ──────────                    ──────────                 ────────
//! put_char / write_fast ──▶ [TX ring] ─────────────▶ write_byte
//! LineReader ◀──────────── [RX ring] ◀───────────── read_byte
//!                             FlowControl ◀──────▶ XON / XOFF
//! ```
//!
//! # Context ownership
//!
//! | item            | producer / writer | consumer / reader |
//! |-----------------|-------------------|-------------------|
//! | `rx`            | ISR               | foreground        |
//! | `tx`            | foreground        | ISR               |
//! | `flow`          | see [`FlowControl`] |                 |
//! | `stats`         | per counter       | anyone            |
//!
//! # Rules
//!
//! - `on_interrupt` never blocks and never loops on peripheral readiness
//! - Foreground calls may spin (`put_char` on a full ring, blocking reads)
//! - A byte that does not fit is dropped and counted, never retried inside
//!   the handler

use core::hint::spin_loop;

use crate::config::{TransportConfig, UartConfig};
use crate::flow::{ControlByte, FlowControl, PendingSignal};
use crate::hal::uart::{Direction, UartPeripheral};
use crate::log_globals::PORT_LOG_STREAM;
use crate::ring::{ByteRing, DEFAULT_RING_SIZE};
use crate::stats::TransportStats;
use crate::{serial_debug, serial_info, serial_warn};

/// UART with interrupt-fed RX and TX rings.
///
/// Meant to live in a `static`: every method takes `&self`. Methods
/// documented "ISR" must only run in the UART interrupt; all others in the
/// single foreground context.
pub struct SerialPort<U, const RX: usize = DEFAULT_RING_SIZE, const TX: usize = DEFAULT_RING_SIZE> {
    uart: U,
    rx: ByteRing<RX>,
    tx: ByteRing<TX>,
    flow: FlowControl,
    config: TransportConfig,
    stats: TransportStats,
}

impl<U, const RX: usize, const TX: usize> SerialPort<U, RX, TX> {
    /// Wrap a peripheral. Nothing is touched until [`SerialPort::init`].
    pub const fn new(uart: U) -> Self {
        Self {
            uart,
            rx: ByteRing::new(),
            tx: ByteRing::new(),
            flow: FlowControl::new(),
            config: TransportConfig::new(),
            stats: TransportStats::new(),
        }
    }

    /// Wrap a peripheral with a custom RX high-water mark.
    pub const fn with_rx_high_water(uart: U, mark: usize) -> Self {
        Self {
            uart,
            rx: ByteRing::with_high_water(mark),
            tx: ByteRing::new(),
            flow: FlowControl::new(),
            config: TransportConfig::new(),
            stats: TransportStats::new(),
        }
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    /// Receive ring (ISR produces, foreground consumes).
    pub fn rx(&self) -> &ByteRing<RX> {
        &self.rx
    }

    /// Transmit ring (foreground produces, ISR consumes).
    pub fn tx(&self) -> &ByteRing<TX> {
        &self.tx
    }

    pub fn flow(&self) -> &FlowControl {
        &self.flow
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn stats(&self) -> &TransportStats {
        &self.stats
    }

    /// Occupancy at which the foreground asks the peer to resume.
    #[inline]
    pub fn resume_level(&self) -> usize {
        self.rx.high_water() / 2
    }

    #[inline]
    fn flow_enabled(&self) -> bool {
        self.config.flow_control()
    }
}

impl<U: UartPeripheral, const RX: usize, const TX: usize> SerialPort<U, RX, TX> {
    /// Bring the transport up.
    ///
    /// Masks both interrupt sources, empties the rings, resets flow
    /// control, configures the line and then enables RX and TX interrupts.
    pub fn init(&self, cfg: &UartConfig) -> Result<(), U::Error> {
        self.uart.enable_interrupt(Direction::Rx, false);
        self.uart.enable_interrupt(Direction::Tx, false);

        self.rx.clear();
        self.tx.clear();
        self.flow.reset();

        self.uart.configure(cfg)?;

        self.uart.clear_interrupt_flag(Direction::Rx);
        self.uart.clear_interrupt_flag(Direction::Tx);
        self.uart.set_priority(cfg.priority, cfg.sub_priority);

        self.uart.enable_interrupt(Direction::Tx, true);
        self.uart.enable_interrupt(Direction::Rx, true);

        serial_info!(PORT_LOG_STREAM, "uart up: {} baud", cfg.baud_rate);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Interrupt context
    // ---------------------------------------------------------------------

    /// UART interrupt service routine (ISR).
    ///
    /// Handles at most one received byte and at most one transmitted byte
    /// per call.
    #[inline]
    pub fn on_interrupt(&self) {
        if self.uart.interrupt_flag(Direction::Rx) {
            self.service_receive();
        }

        if self.uart.interrupt_flag(Direction::Tx) {
            self.service_transmit();
        }
    }

    fn service_receive(&self) {
        if self.uart.is_receive_ready() {
            let byte = self.uart.read_byte();

            let kind = if self.flow_enabled() {
                self.flow.on_received(byte)
            } else {
                ControlByte::Data(byte)
            };

            match kind {
                ControlByte::Pause => {
                    self.stats.record_peer_pause();
                    serial_debug!(PORT_LOG_STREAM, "peer paused");
                }
                ControlByte::Resume => {
                    serial_debug!(PORT_LOG_STREAM, "peer resumed");
                    if self.tx.has_data() {
                        self.arm_transmit();
                    }
                }
                ControlByte::Data(b) => {
                    if self.rx.push(b).is_err() {
                        self.stats.record_rx_overflow();
                        serial_warn!(PORT_LOG_STREAM, "rx overflow, dropped {:#04x}", b);
                    }

                    if self.flow_enabled() && self.rx.is_almost_full() {
                        self.flow.request_pause();
                        self.arm_transmit();
                    }
                }
            }
        }

        self.uart.clear_interrupt_flag(Direction::Rx);
    }

    fn service_transmit(&self) {
        self.uart.clear_interrupt_flag(Direction::Tx);

        let flow = self.flow_enabled();
        // Flow signals do not wait for queued data
        let signal_waiting = flow && self.flow.pending() != PendingSignal::None;

        if self.tx.is_empty() && !signal_waiting {
            // Nothing to send; put_char re-arms
            self.uart.enable_interrupt(Direction::Tx, false);
            return;
        }

        if !self.uart.is_transmit_ready() {
            return;
        }

        let signal = if flow {
            self.flow.take_pending()
        } else {
            PendingSignal::None
        };

        if let Some(control) = signal.control_byte() {
            self.uart.write_byte(control);
            self.flow.mark_sent(signal);
            match signal {
                PendingSignal::Pause => self.stats.record_xoff_sent(),
                _ => self.stats.record_xon_sent(),
            }
            return;
        }

        if flow && self.flow.peer_requested_pause() {
            // Peer said stop: hold data until XON re-arms us
            self.uart.enable_interrupt(Direction::Tx, false);
            return;
        }

        if let Some(byte) = self.tx.pop() {
            self.uart.write_byte(byte);
        }
    }

    // ---------------------------------------------------------------------
    // Foreground context
    // ---------------------------------------------------------------------

    /// Enable the TX interrupt and force it pending so the handler runs
    /// even if the transmitter was idle.
    #[inline]
    pub fn arm_transmit(&self) {
        self.uart.enable_interrupt(Direction::Tx, true);
        self.uart.set_interrupt_flag(Direction::Tx);
    }

    /// Queue one byte, spinning while the TX ring is full.
    pub fn put_char(&self, byte: u8) {
        let mut waiting_for_resume = false;

        while self.tx.push(byte).is_err() {
            if self.flow_enabled() && self.flow.peer_requested_pause() {
                if !waiting_for_resume {
                    serial_debug!(PORT_LOG_STREAM, "tx full, waiting for XON");
                }
                waiting_for_resume = true;
            } else {
                waiting_for_resume = false;
                self.arm_transmit();
            }
            spin_loop();
        }

        self.arm_transmit();
    }

    /// Queue bytes in order, spinning as needed.
    pub fn write_bytes(&self, bytes: &[u8]) {
        for &b in bytes {
            self.put_char(b);
        }
    }

    pub fn put_str(&self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Queue as much of `bytes` as fits without waiting.
    ///
    /// Returns the number of bytes queued; the rest is dropped and counted.
    pub fn write_fast(&self, bytes: &[u8]) -> usize {
        if self.tx.is_full() {
            self.stats.record_tx_dropped(bytes.len());
            return 0;
        }

        let mut queued = 0;
        for &b in bytes {
            if self.tx.push(b).is_err() {
                break;
            }
            queued += 1;
        }

        let dropped = bytes.len() - queued;
        if dropped > 0 {
            self.stats.record_tx_dropped(dropped);
        }

        if self.tx.has_data() {
            self.arm_transmit();
        }
        queued
    }

    /// Received data is waiting.
    #[inline]
    pub fn has_input(&self) -> bool {
        self.rx.has_data()
    }

    /// Take one received byte if there is one.
    ///
    /// Checks for a due XON on every call, also when RX is empty: the XOFF
    /// may have left after the ring was already drained.
    pub fn try_get_byte(&self) -> Option<u8> {
        let byte = self.rx.pop();
        self.release_backpressure();
        byte
    }

    /// Spin until a received byte is available.
    pub fn wait_byte(&self) -> u8 {
        loop {
            if let Some(byte) = self.try_get_byte() {
                return byte;
            }
            spin_loop();
        }
    }

    /// Ask the peer to resume once RX has drained after an XOFF.
    fn release_backpressure(&self) {
        if !self.flow_enabled() || !self.flow.local_paused() {
            return;
        }

        if self.rx.len() <= self.resume_level() && self.flow.request_resume() {
            serial_debug!(PORT_LOG_STREAM, "rx drained to {}, sending XON", self.rx.len());
            self.arm_transmit();
        }
    }

    /// `core::fmt::Write` adapter over `put_str`.
    pub fn writer(&self) -> PortWriter<'_, U, RX, TX> {
        PortWriter { port: self }
    }
}

/// Formatting sink that blocks like `put_char`.
pub struct PortWriter<'a, U, const RX: usize, const TX: usize> {
    port: &'a SerialPort<U, RX, TX>,
}

impl<U: UartPeripheral, const RX: usize, const TX: usize> core::fmt::Write for PortWriter<'_, U, RX, TX> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.port.put_str(s);
        Ok(())
    }
}
