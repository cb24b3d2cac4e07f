//! UART interrupt handler tests
//!
//! Drive `SerialPort::on_interrupt` against the simulated peripheral.

use uart_ring_transport::hal::sim::{run_until_idle, SimUart};
use uart_ring_transport::hal::{Direction, UartPeripheral};
use uart_ring_transport::{FlowState, SerialPort, UartConfig, XOFF, XON};

fn port() -> SerialPort<SimUart> {
    let port = SerialPort::new(SimUart::new());
    port.init(&UartConfig::default()).unwrap();
    port
}

fn transmitted(port: &SerialPort<SimUart>) -> Vec<u8> {
    core::iter::from_fn(|| port.uart().pop_transmitted()).collect()
}

// ============================================================================
// Receive path
// ============================================================================

#[test]
fn test_receive_single_byte() {
    let port = port();

    port.uart().receive(b'A');
    port.on_interrupt();

    assert_eq!(port.rx().len(), 1);
    assert_eq!(port.rx().peek(), Some(b'A'));
    assert!(!port.uart().interrupt_flag(Direction::Rx));
    assert!(!port.flow().send_xoff_pending());
}

#[test]
fn test_receive_one_byte_per_interrupt() {
    let port = port();

    port.uart().receive_all(b"abc");
    port.on_interrupt();
    assert_eq!(port.rx().len(), 1);
    assert_eq!(port.uart().unread(), 2);

    // Level-triggered: still pending while bytes wait
    assert!(port.uart().interrupt_pending());
    run_until_idle(&port);
    assert_eq!(port.rx().len(), 3);
}

#[test]
fn test_receive_flag_without_data() {
    let port = port();

    port.uart().set_interrupt_flag(Direction::Rx);
    port.on_interrupt();

    assert!(port.rx().is_empty());
    assert!(!port.uart().interrupt_flag(Direction::Rx));
}

#[test]
fn test_receive_overflow_drops_and_counts() {
    let port = port();
    port.config().set_flow_control(false);

    let input: Vec<u8> = (0..130).map(|i| b'a' + (i % 26) as u8).collect();
    assert_eq!(port.uart().receive_all(&input), 130);
    run_until_idle(&port);

    assert!(port.rx().is_full());
    assert_eq!(port.stats().rx_overflow(), 2);

    // The oldest bytes survive, the last two are gone
    let kept: Vec<u8> = core::iter::from_fn(|| port.try_get_byte()).collect();
    assert_eq!(kept, input[..128].to_vec());
}

#[test]
fn test_almost_full_requests_pause() {
    let port = port();
    port.uart().set_transmit_ready(false);

    port.uart().receive_all(&[b'x'; 119]);
    run_until_idle(&port);
    assert!(!port.flow().send_xoff_pending());

    port.uart().receive(b'x');
    run_until_idle(&port);
    assert_eq!(port.rx().len(), 120);
    assert!(port.flow().send_xoff_pending());
    assert_eq!(port.flow().state(), FlowState::PauseRequested);

    // Busy transmitter: the signal waits
    assert!(transmitted(&port).is_empty());

    port.uart().set_transmit_ready(true);
    port.arm_transmit();
    run_until_idle(&port);

    assert_eq!(transmitted(&port), vec![XOFF]);
    assert!(port.flow().local_paused());
    assert_eq!(port.stats().snapshot().xoff_sent, 1);
}

#[test]
fn test_xoff_sent_on_quiet_port() {
    let port = port();

    port.uart().receive_all(&[b'x'; 120]);
    run_until_idle(&port);

    assert_eq!(transmitted(&port), vec![XOFF]);
    assert!(!port.flow().send_xoff_pending());
    assert!(!port.uart().interrupt_enabled(Direction::Tx));
}

#[test]
fn test_peer_xoff_not_stored() {
    let port = port();

    port.uart().receive(XOFF);
    run_until_idle(&port);

    assert!(port.rx().is_empty());
    assert!(port.flow().peer_requested_pause());
    assert_eq!(port.flow().state(), FlowState::PeerPaused);
    assert_eq!(port.stats().snapshot().peer_pauses, 1);

    port.uart().receive(XON);
    run_until_idle(&port);

    assert!(port.rx().is_empty());
    assert!(!port.flow().peer_requested_pause());
}

#[test]
fn test_control_bytes_are_data_without_flow_control() {
    let port = port();
    port.config().set_flow_control(false);

    port.uart().receive_all(&[XOFF, XON]);
    run_until_idle(&port);

    assert_eq!(port.try_get_byte(), Some(XOFF));
    assert_eq!(port.try_get_byte(), Some(XON));
    assert!(!port.flow().peer_requested_pause());
}

// ============================================================================
// Transmit path
// ============================================================================

#[test]
fn test_pending_xoff_goes_before_data() {
    let port = port();

    port.tx().push(b'H').unwrap();
    port.tx().push(b'i').unwrap();
    port.flow().request_pause();
    port.uart().set_interrupt_flag(Direction::Tx);

    port.on_interrupt();

    assert_eq!(transmitted(&port), vec![XOFF]);
    assert_eq!(port.tx().len(), 2);
    assert!(!port.flow().send_xoff_pending());

    run_until_idle(&port);
    assert_eq!(transmitted(&port), b"Hi".to_vec());
}

#[test]
fn test_one_byte_per_interrupt() {
    let port = port();

    port.tx().push(b'a').unwrap();
    port.tx().push(b'b').unwrap();
    port.uart().set_interrupt_flag(Direction::Tx);

    port.on_interrupt();
    assert_eq!(port.uart().transmitted_len(), 1);
    assert_eq!(port.tx().len(), 1);
}

#[test]
fn test_empty_ring_disables_tx_interrupt() {
    let port = port();

    port.arm_transmit();
    port.on_interrupt();

    assert!(!port.uart().interrupt_enabled(Direction::Tx));
    assert!(!port.uart().interrupt_flag(Direction::Tx));
    assert_eq!(port.uart().transmitted_len(), 0);
}

#[test]
fn test_peer_pause_holds_data_until_xon() {
    let port = port();

    port.uart().receive(XOFF);
    run_until_idle(&port);

    port.put_str("ab");
    run_until_idle(&port);

    assert!(transmitted(&port).is_empty());
    assert_eq!(port.tx().len(), 2);
    assert!(!port.uart().interrupt_enabled(Direction::Tx));

    port.uart().receive(XON);
    run_until_idle(&port);

    assert_eq!(transmitted(&port), b"ab".to_vec());
    assert!(port.tx().is_empty());
}

#[test]
fn test_control_byte_sent_while_peer_paused() {
    let port = port();

    port.uart().receive(XOFF);
    run_until_idle(&port);
    port.put_char(b'z');

    port.flow().request_pause();
    port.arm_transmit();
    run_until_idle(&port);

    // Flow signals are not data; only the data byte is held
    assert_eq!(transmitted(&port), vec![XOFF]);
    assert_eq!(port.tx().len(), 1);
}

#[test]
fn test_transmitter_not_ready() {
    let port = port();
    port.uart().set_transmit_ready(false);

    port.put_str("ok");
    run_until_idle(&port);

    assert_eq!(port.tx().len(), 2);
    assert_eq!(port.uart().transmitted_len(), 0);

    port.uart().set_transmit_ready(true);
    port.arm_transmit();
    run_until_idle(&port);

    assert_eq!(transmitted(&port), b"ok".to_vec());
}

#[test]
fn test_flow_disabled_ignores_pending_signal() {
    let port = port();
    port.config().set_flow_control(false);

    port.flow().request_pause();
    port.put_char(b'q');
    run_until_idle(&port);

    assert_eq!(transmitted(&port), vec![b'q']);
}
