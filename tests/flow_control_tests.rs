//! XON/XOFF state tests

use uart_ring_transport::flow::{ControlByte, FlowControl, FlowState, PendingSignal, XOFF, XON};

#[test]
fn test_flow_initial_state() {
    let flow = FlowControl::new();

    assert_eq!(flow.state(), FlowState::Normal);
    assert!(!flow.send_xoff_pending());
    assert!(!flow.send_xon_pending());
    assert!(!flow.peer_requested_pause());
    assert!(!flow.local_paused());
}

#[test]
fn test_flow_pause_request() {
    let flow = FlowControl::new();

    flow.request_pause();
    assert!(flow.send_xoff_pending());
    assert!(!flow.send_xon_pending());
    assert_eq!(flow.state(), FlowState::PauseRequested);

    assert_eq!(flow.take_pending(), PendingSignal::Pause);
    assert_eq!(flow.take_pending(), PendingSignal::None);
    assert_eq!(flow.state(), FlowState::Normal);
}

#[test]
fn test_flow_resume_does_not_override_pause() {
    let flow = FlowControl::new();

    flow.request_pause();
    assert!(!flow.request_resume());
    assert!(flow.send_xoff_pending());
    assert!(!flow.send_xon_pending());
}

#[test]
fn test_flow_pause_overrides_resume() {
    let flow = FlowControl::new();

    assert!(flow.request_resume());
    assert_eq!(flow.state(), FlowState::ResumeRequested);

    flow.request_pause();
    assert!(flow.send_xoff_pending());
    assert!(!flow.send_xon_pending());
}

#[test]
fn test_flow_pending_flags_never_both_set() {
    let flow = FlowControl::new();

    for step in 0..32 {
        match step % 3 {
            0 => flow.request_pause(),
            1 => {
                flow.request_resume();
            }
            _ => {
                flow.take_pending();
            }
        }
        assert!(!(flow.send_xoff_pending() && flow.send_xon_pending()));
    }
}

#[test]
fn test_flow_received_control_bytes() {
    let flow = FlowControl::new();

    assert_eq!(flow.on_received(XOFF), ControlByte::Pause);
    assert!(flow.peer_requested_pause());
    assert_eq!(flow.state(), FlowState::PeerPaused);

    assert_eq!(flow.on_received(b'x'), ControlByte::Data(b'x'));
    assert!(flow.peer_requested_pause());

    assert_eq!(flow.on_received(XON), ControlByte::Resume);
    assert!(!flow.peer_requested_pause());
    assert_eq!(flow.state(), FlowState::Normal);
}

#[test]
fn test_flow_pending_signal_shown_before_peer_pause() {
    let flow = FlowControl::new();

    flow.on_received(XOFF);
    flow.request_pause();
    assert_eq!(flow.state(), FlowState::PauseRequested);

    flow.take_pending();
    assert_eq!(flow.state(), FlowState::PeerPaused);
}

#[test]
fn test_flow_mark_sent_tracks_local_pause() {
    let flow = FlowControl::new();

    flow.mark_sent(PendingSignal::Pause);
    assert!(flow.local_paused());

    flow.mark_sent(PendingSignal::None);
    assert!(flow.local_paused());

    flow.mark_sent(PendingSignal::Resume);
    assert!(!flow.local_paused());
}

#[test]
fn test_flow_reset() {
    let flow = FlowControl::new();
    flow.request_pause();
    flow.on_received(XOFF);
    flow.mark_sent(PendingSignal::Pause);

    flow.reset();
    assert_eq!(flow.state(), FlowState::Normal);
    assert!(!flow.local_paused());
}

#[test]
fn test_control_bytes() {
    assert_eq!(XOFF, 0x13);
    assert_eq!(XON, 0x11);
    assert_eq!(PendingSignal::Pause.control_byte(), Some(XOFF));
    assert_eq!(PendingSignal::Resume.control_byte(), Some(XON));
    assert_eq!(PendingSignal::None.control_byte(), None);
}
