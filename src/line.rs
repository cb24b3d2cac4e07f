//! Line input on top of the RX ring.
//!
//! Foreground only. Handles backspace editing, CR / CR-LF folding, echo,
//! and Ctrl-C / Ctrl-D cancellation.

use crate::error::TransportError;
use crate::hal::uart::UartPeripheral;
use crate::port::SerialPort;

/// Ctrl-C: cancel the current read.
pub const ETX: u8 = 0x03;
/// Ctrl-D: end of input when typed on an empty line.
pub const EOT: u8 = 0x04;
/// Ctrl-H.
pub const BACKSPACE: u8 = 0x08;
/// DEL, sent by most terminals for the backspace key.
pub const DELETE: u8 = 0x7F;

/// Line-ending folding state carried between bytes and between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EolState {
    Idle,
    /// Last byte was CR; a LF right after it belongs to the same newline.
    AfterCr,
}

/// Assembles lines from a [`SerialPort`].
pub struct LineReader {
    eol: EolState,
}

impl LineReader {
    pub const fn new() -> Self {
        Self { eol: EolState::Idle }
    }

    /// Read one character.
    ///
    /// With `blocking` (and always-non-blocking mode off) this spins for
    /// input and applies line-ending folding and echo. Otherwise it returns
    /// the next raw byte, or `None` if nothing has arrived.
    pub fn get_char<U: UartPeripheral, const RX: usize, const TX: usize>(
        &mut self,
        port: &SerialPort<U, RX, TX>,
        blocking: bool,
    ) -> Option<u8> {
        if !blocking || port.config().always_nonblocking() {
            return port.try_get_byte();
        }
        self.next_cooked(port, true)
    }

    /// Next input byte after line-ending folding, echoed if enabled.
    fn next_cooked<U: UartPeripheral, const RX: usize, const TX: usize>(
        &mut self,
        port: &SerialPort<U, RX, TX>,
        blocking: bool,
    ) -> Option<u8> {
        loop {
            let raw = if blocking {
                port.wait_byte()
            } else {
                port.try_get_byte()?
            };

            let byte = if port.config().eol_fix() {
                match (self.eol, raw) {
                    (EolState::AfterCr, b'\n') => {
                        // Second half of CR-LF, already delivered as LF
                        self.eol = EolState::Idle;
                        continue;
                    }
                    (_, b'\r') => {
                        self.eol = EolState::AfterCr;
                        b'\n'
                    }
                    (_, b) => {
                        self.eol = EolState::Idle;
                        b
                    }
                }
            } else {
                self.eol = EolState::Idle;
                raw
            };

            if port.config().echo() {
                port.put_char(byte);
            }
            return Some(byte);
        }
    }

    /// Read a line into `buf`.
    ///
    /// At most `buf.len() - 1` bytes are collected; the line ends at CR, LF,
    /// EOT, a full buffer, or (non-blocking mode) when input runs dry. The
    /// terminator is not stored and the buffer is NUL-terminated after the
    /// line.
    ///
    /// # Errors
    ///
    /// - `Interrupted`: Ctrl-C was read (echoes `^C` if `interactive`)
    /// - `EndOfTransmission`: Ctrl-D on an empty interactive line (echoes `^D`)
    /// - `NoData`: non-blocking mode and no input at all
    pub fn read_line<'b, U: UartPeripheral, const RX: usize, const TX: usize>(
        &mut self,
        port: &SerialPort<U, RX, TX>,
        buf: &'b mut [u8],
        interactive: bool,
    ) -> Result<&'b [u8], TransportError> {
        let limit = buf.len().saturating_sub(1);
        let blocking = !port.config().always_nonblocking();
        let mut len = 0;

        while len < limit {
            let Some(byte) = self.next_cooked(port, blocking) else {
                if len == 0 {
                    return Err(TransportError::NoData);
                }
                break;
            };

            match byte {
                BACKSPACE | DELETE => {
                    len = len.saturating_sub(1);
                    buf[len] = 0;
                }
                ETX => {
                    if interactive {
                        port.put_str("^C");
                    }
                    return Err(TransportError::Interrupted);
                }
                EOT if len == 0 && interactive => {
                    port.put_str("^D");
                    return Err(TransportError::EndOfTransmission);
                }
                b'\r' | b'\n' | EOT => break,
                b => {
                    buf[len] = b;
                    len += 1;
                    buf[len] = 0;
                }
            }
        }

        if let Some(end) = buf.get_mut(len) {
            *end = 0;
        }
        Ok(&buf[..len])
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}
