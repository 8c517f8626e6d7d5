//! Core types used throughout civlink.

use std::fmt;
use std::str::FromStr;

/// Operating mode of the transceiver.
///
/// The closed set of modes understood by the CI-V mode commands. Translation
/// to and from the on-wire mode byte lives in the protocol engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Lower sideband voice.
    LSB,
    /// Upper sideband voice.
    USB,
    /// Amplitude modulation.
    AM,
    /// CW (morse), upper sideband offset.
    CW,
    /// Radio teletype (FSK).
    RTTY,
    /// Narrow frequency modulation.
    FM,
    /// Wide (broadcast) frequency modulation.
    WFM,
    /// CW reverse (lower sideband offset).
    CWR,
    /// Radio teletype, reverse shift.
    RTTYR,
}

impl Mode {
    /// All modes, in CI-V mode byte order.
    pub const ALL: [Mode; 9] = [
        Mode::LSB,
        Mode::USB,
        Mode::AM,
        Mode::CW,
        Mode::RTTY,
        Mode::FM,
        Mode::WFM,
        Mode::CWR,
        Mode::RTTYR,
    ];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::LSB => "LSB",
            Mode::USB => "USB",
            Mode::AM => "AM",
            Mode::CW => "CW",
            Mode::RTTY => "RTTY",
            Mode::FM => "FM",
            Mode::WFM => "WFM",
            Mode::CWR => "CWR",
            Mode::RTTYR => "RTTYR",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string cannot be parsed into a [`Mode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(String);

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mode: {}", self.0)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LSB" => Ok(Mode::LSB),
            "USB" => Ok(Mode::USB),
            "AM" => Ok(Mode::AM),
            "CW" => Ok(Mode::CW),
            "RTTY" => Ok(Mode::RTTY),
            "FM" => Ok(Mode::FM),
            "WFM" => Ok(Mode::WFM),
            "CWR" | "CW-R" => Ok(Mode::CWR),
            "RTTYR" | "RTTY-R" => Ok(Mode::RTTYR),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
