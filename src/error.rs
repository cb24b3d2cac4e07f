//! Transport error types

/// Transport error with code and message
///
/// All conditions are local: they come back as return values and never
/// stop the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// E01: Ring full, byte not queued
    Overflow,
    /// E02: Line read cancelled by Ctrl-C (0x03)
    Interrupted,
    /// E03: Line read cancelled by Ctrl-D (0x04) on an empty line
    EndOfTransmission,
    /// E04: Non-blocking read found no input
    NoData,
}

impl TransportError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Overflow => "E01",
            Self::Interrupted => "E02",
            Self::EndOfTransmission => "E03",
            Self::NoData => "E04",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Overflow => "buffer full",
            Self::Interrupted => "interrupted",
            Self::EndOfTransmission => "end of transmission",
            Self::NoData => "no data",
        }
    }

    /// True for the results that mean "no line, nothing went wrong".
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Interrupted | Self::EndOfTransmission)
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
