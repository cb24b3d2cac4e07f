//! UartShell - Main entry point
//!
//! Line-echo shell over the interrupt-driven transport:
//! 1. Bring up the UART and the transport
//! 2. Service the UART interrupt from a dedicated high-priority context
//! 3. Read lines in the foreground and echo them back
//!
//! On the device the peripheral is UART1 through ESP-IDF; on host the same
//! loop runs against the simulated UART with scripted input.

use core::fmt::Write;

use uart_ring_transport::hal::UartPeripheral;
use uart_ring_transport::{
    log_drain, LineReader, SerialPort, TransportError, PORT_LOG_STREAM, VERSION,
};

/// Longest accepted input line, terminator slot included.
const LINE_SIZE: usize = 64;

/// Handle one prompt / read / reply round. Returns `false` on Ctrl-D.
fn shell_round<U: UartPeripheral, const RX: usize, const TX: usize>(
    port: &SerialPort<U, RX, TX>,
    reader: &mut LineReader,
) -> bool {
    let mut line = [0u8; LINE_SIZE];
    port.put_str("> ");

    let keep_going = match reader.read_line(port, &mut line, true) {
        Ok(text) => {
            let text = core::str::from_utf8(text).unwrap_or("<binary>");
            let _ = write!(port.writer(), "\r\n{} ({} bytes)\r\n", text, text.len());
            true
        }
        Err(TransportError::EndOfTransmission) => false,
        Err(e) => {
            let _ = write!(port.writer(), "\r\n{}\r\n", e);
            true
        }
    };

    log_drain::drain_to_port(port, &PORT_LOG_STREAM);
    keep_going
}

#[cfg(target_os = "espidf")]
fn main() -> Result<(), esp_idf_svc::sys::EspError> {
    use esp_idf_svc::hal::gpio;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{config::Config, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use uart_ring_transport::hal::EspUart;
    use uart_ring_transport::UartConfig;

    // Initialize ESP-IDF
    esp_idf_svc::sys::link_patches();

    let peripherals = Peripherals::take()?;
    let line_cfg = UartConfig::default();

    let driver = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &Config::default().baudrate(Hertz(line_cfg.baud_rate)),
    )?;

    let port: &'static SerialPort<EspUart<'static>> =
        Box::leak(Box::new(SerialPort::new(EspUart::new(driver))));
    port.init(&line_cfg)?;
    port.config().set_echo(true);

    // Interrupt context: never blocks, yields one tick when idle
    std::thread::Builder::new()
        .name("uart-isr".into())
        .stack_size(4096)
        .spawn(move || loop {
            if port.uart().interrupt_pending() {
                port.on_interrupt();
            } else {
                // SAFETY: vTaskDelay is always safe to call from a task
                unsafe { esp_idf_svc::sys::vTaskDelay(1) };
            }
        })
        .map_err(|_| esp_idf_svc::sys::EspError::from_infallible::<{ esp_idf_svc::sys::ESP_FAIL }>())?;

    let _ = write!(port.writer(), "\r\n{}\r\n", VERSION);

    let mut reader = LineReader::new();
    loop {
        if !shell_round(port, &mut reader) {
            port.put_str("\r\nbye\r\n");
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use uart_ring_transport::hal::sim::{run_until_idle, SimUart};
    use uart_ring_transport::UartConfig;

    static PORT: SerialPort<SimUart> = SerialPort::new(SimUart::new());

    let port = &PORT;
    match port.init(&UartConfig::default()) {
        Ok(()) => {}
        Err(never) => match never {},
    }
    port.config().set_echo(true);

    let _ = write!(port.writer(), "{}\r\n", VERSION);

    let script: &[&[u8]] = &[b"help\r\n", b"hellp\x7f\x7fo\r", b"ab\x03", b"\x04"];
    let mut reader = LineReader::new();
    let mut wire = [0u8; 256];

    for input in script {
        port.uart().receive_all(input);
        run_until_idle(port);

        let running = shell_round(port, &mut reader);
        run_until_idle(port);

        let n = port.uart().take_transmitted(&mut wire);
        print!("{}", String::from_utf8_lossy(&wire[..n]));

        if !running {
            println!("\nbye");
            break;
        }
    }

    let stats = port.stats().snapshot();
    println!("stats: {:?}", stats);
}
