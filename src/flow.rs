//! XON/XOFF software flow control state.
//!
//! Shared between the UART interrupt and the foreground:
//!
//! | field         | written by                      | read by    |
//! |---------------|---------------------------------|------------|
//! | `pending`     | ISR (pause), foreground (resume), ISR (take) | ISR |
//! | `peer_paused` | ISR                             | both       |
//! | `local_paused`| ISR                             | foreground |
//!
//! The outbound request lives in one atomic slot, so a pause request and a
//! resume request can never be pending at the same time. Every transition
//! is a single atomic read-modify-write.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Control byte asking the peer to stop sending (DC3, Ctrl-S).
pub const XOFF: u8 = 0x13;

/// Control byte allowing the peer to send again (DC1, Ctrl-Q).
pub const XON: u8 = 0x11;

/// Outbound control byte waiting for the transmitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PendingSignal {
    None = 0,
    /// Send XOFF next.
    Pause = 1,
    /// Send XON next.
    Resume = 2,
}

impl PendingSignal {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PendingSignal::Pause,
            2 => PendingSignal::Resume,
            _ => PendingSignal::None,
        }
    }

    /// Wire byte for this signal.
    pub fn control_byte(self) -> Option<u8> {
        match self {
            PendingSignal::None => None,
            PendingSignal::Pause => Some(XOFF),
            PendingSignal::Resume => Some(XON),
        }
    }
}

/// Tagged view of the flow-control state.
///
/// A pending outbound signal takes precedence over the peer state because
/// the transmitter services it first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    Normal,
    PauseRequested,
    ResumeRequested,
    PeerPaused,
}

/// What a received byte meant to flow control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlByte {
    /// Peer asked us to stop.
    Pause,
    /// Peer allowed us to continue.
    Resume,
    /// Ordinary data.
    Data(u8),
}

impl ControlByte {
    #[inline]
    pub fn classify(byte: u8) -> Self {
        match byte {
            XOFF => ControlByte::Pause,
            XON => ControlByte::Resume,
            b => ControlByte::Data(b),
        }
    }
}

/// Lock-free XON/XOFF flags.
pub struct FlowControl {
    /// Raw `PendingSignal`.
    pending: AtomicU8,

    /// Peer sent XOFF and has not released it yet.
    peer_paused: AtomicBool,

    /// We sent XOFF and have not sent XON since.
    local_paused: AtomicBool,
}

impl FlowControl {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(PendingSignal::None as u8),
            peer_paused: AtomicBool::new(false),
            local_paused: AtomicBool::new(false),
        }
    }

    /// Back to `Normal`. Only during init.
    pub fn reset(&self) {
        self.pending.store(PendingSignal::None as u8, Ordering::Relaxed);
        self.peer_paused.store(false, Ordering::Relaxed);
        self.local_paused.store(false, Ordering::Release);
    }

    /// Queue an XOFF. Replaces a pending XON: stopping wins.
    #[inline]
    pub fn request_pause(&self) {
        self.pending.store(PendingSignal::Pause as u8, Ordering::Release);
    }

    /// Queue an XON unless some signal is already pending.
    ///
    /// Returns `true` if the request was queued.
    #[inline]
    pub fn request_resume(&self) -> bool {
        self.pending
            .compare_exchange(
                PendingSignal::None as u8,
                PendingSignal::Resume as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Take the pending signal for transmission, leaving `None`.
    #[inline]
    pub fn take_pending(&self) -> PendingSignal {
        PendingSignal::from_u8(self.pending.swap(PendingSignal::None as u8, Ordering::AcqRel))
    }

    #[inline]
    pub fn pending(&self) -> PendingSignal {
        PendingSignal::from_u8(self.pending.load(Ordering::Acquire))
    }

    /// Record that a control byte actually went out on the wire.
    #[inline]
    pub fn mark_sent(&self, signal: PendingSignal) {
        match signal {
            PendingSignal::Pause => self.local_paused.store(true, Ordering::Release),
            PendingSignal::Resume => self.local_paused.store(false, Ordering::Release),
            PendingSignal::None => {}
        }
    }

    /// Apply a received byte (ISR side).
    ///
    /// Returns the classification; control bytes must not be queued as data.
    #[inline]
    pub fn on_received(&self, byte: u8) -> ControlByte {
        let kind = ControlByte::classify(byte);
        match kind {
            ControlByte::Pause => self.peer_paused.store(true, Ordering::Release),
            ControlByte::Resume => self.peer_paused.store(false, Ordering::Release),
            ControlByte::Data(_) => {}
        }
        kind
    }

    #[inline]
    pub fn send_xoff_pending(&self) -> bool {
        self.pending() == PendingSignal::Pause
    }

    #[inline]
    pub fn send_xon_pending(&self) -> bool {
        self.pending() == PendingSignal::Resume
    }

    #[inline]
    pub fn peer_requested_pause(&self) -> bool {
        self.peer_paused.load(Ordering::Acquire)
    }

    /// We have told the peer to stop and not yet released it.
    #[inline]
    pub fn local_paused(&self) -> bool {
        self.local_paused.load(Ordering::Acquire)
    }

    /// Current state as a tagged value.
    pub fn state(&self) -> FlowState {
        match self.pending() {
            PendingSignal::Pause => FlowState::PauseRequested,
            PendingSignal::Resume => FlowState::ResumeRequested,
            PendingSignal::None if self.peer_requested_pause() => FlowState::PeerPaused,
            PendingSignal::None => FlowState::Normal,
        }
    }
}

impl Default for FlowControl {
    fn default() -> Self {
        Self::new()
    }
}
