//! ESP-IDF backed UART peripheral.
//!
//! ESP-IDF owns the real UART interrupt and its own driver FIFOs, so the
//! interrupt flags here are emulated: RX is level-triggered on driver data,
//! TX rises after every byte. A high-priority task calls
//! [`SerialPort::on_interrupt`](crate::port::SerialPort::on_interrupt)
//! whenever [`EspUart::interrupt_pending`] is true.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use esp_idf_svc::hal::uart::{config as uart_config, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;

use super::uart::{Direction, UartPeripheral};
use crate::config::{DataBits, Parity, StopBits, UartConfig};

/// Marks `held` as carrying a byte.
const HELD_VALID: u16 = 0x100;

/// Non-blocking read timeout (ticks).
const NO_WAIT: u32 = 0;

pub struct EspUart<'d> {
    driver: UartDriver<'d>,
    /// One byte read ahead from the driver to answer `is_receive_ready`.
    held: AtomicU16,
    rx_flag: AtomicBool,
    tx_flag: AtomicBool,
    rx_enabled: AtomicBool,
    tx_enabled: AtomicBool,
    /// Bytes the driver refused or only partly accepted.
    tx_lost: AtomicU32,
}

// SAFETY: uart_read_bytes / uart_write_bytes lock internally; every other
// field is atomic. RX is only read from the interrupt task.
unsafe impl Sync for EspUart<'_> {}

impl<'d> EspUart<'d> {
    pub fn new(driver: UartDriver<'d>) -> Self {
        Self {
            driver,
            held: AtomicU16::new(0),
            rx_flag: AtomicBool::new(false),
            tx_flag: AtomicBool::new(false),
            rx_enabled: AtomicBool::new(false),
            tx_enabled: AtomicBool::new(false),
            tx_lost: AtomicU32::new(0),
        }
    }

    /// The handler should run now.
    pub fn interrupt_pending(&self) -> bool {
        (self.rx_enabled.load(Ordering::Acquire) && self.interrupt_flag(Direction::Rx))
            || (self.tx_enabled.load(Ordering::Acquire) && self.interrupt_flag(Direction::Tx))
    }

    pub fn tx_lost(&self) -> u32 {
        self.tx_lost.load(Ordering::Relaxed)
    }

    fn fill_held(&self) -> bool {
        if self.held.load(Ordering::Acquire) & HELD_VALID != 0 {
            return true;
        }

        let mut byte = [0u8; 1];
        match self.driver.read(&mut byte, NO_WAIT) {
            Ok(1) => {
                self.held.store(HELD_VALID | byte[0] as u16, Ordering::Release);
                true
            }
            _ => false,
        }
    }
}

impl UartPeripheral for EspUart<'_> {
    type Error = EspError;

    fn configure(&self, config: &UartConfig) -> Result<(), Self::Error> {
        self.driver.change_baudrate(Hertz(config.baud_rate))?;
        self.driver.change_data_bits(match config.data_bits {
            DataBits::Five => uart_config::DataBits::DataBits5,
            DataBits::Six => uart_config::DataBits::DataBits6,
            DataBits::Seven => uart_config::DataBits::DataBits7,
            DataBits::Eight => uart_config::DataBits::DataBits8,
        })?;
        self.driver.change_parity(match config.parity {
            Parity::None => uart_config::Parity::ParityNone,
            Parity::Even => uart_config::Parity::ParityEven,
            Parity::Odd => uart_config::Parity::ParityOdd,
        })?;
        self.driver.change_stop_bits(match config.stop_bits {
            StopBits::One => uart_config::StopBits::STOP1,
            StopBits::Two => uart_config::StopBits::STOP2,
        })?;
        Ok(())
    }

    fn set_priority(&self, _priority: u8, _sub_priority: u8) {
        // Fixed by the driver's interrupt allocation and the service task
    }

    fn is_receive_ready(&self) -> bool {
        self.fill_held()
    }

    fn read_byte(&self) -> u8 {
        if !self.fill_held() {
            return 0;
        }
        (self.held.swap(0, Ordering::AcqRel) & 0xFF) as u8
    }

    fn is_transmit_ready(&self) -> bool {
        true
    }

    fn write_byte(&self, byte: u8) {
        if !matches!(self.driver.write(&[byte]), Ok(1)) {
            self.tx_lost.fetch_add(1, Ordering::Relaxed);
        }
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
            Direction::Rx => self.rx_flag.load(Ordering::Acquire) || self.fill_held(),
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
