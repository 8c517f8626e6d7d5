//! Frame validation and dispatch outcomes.
//!
//! A completed raw frame is checked in a fixed order:
//!
//! 1. Length, preamble, and terminator. Failure is a framing error.
//! 2. Destination address equal to the rig's address. This is our own
//!    outbound frame reflected by the half-duplex bus, so it is skipped
//!    quietly.
//! 3. Source address equal to the rig's address. Anything else on the bus
//!    is a framing error.
//!
//! What a valid frame does to the session state is decided by
//! [`ProtocolState::dispatch`](crate::state::ProtocolState::dispatch).

use civlink_core::{Error, Result};

use crate::civ::{CivFrame, MIN_FRAME_LEN, PREAMBLE, StatusCode, TERMINATOR};

/// Result of validating a raw frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Our own transmission seen on the bus.
    Echo,
    /// A frame from the rig.
    Frame(CivFrame<'a>),
}

/// Validate a completed raw frame against the rig's bus address.
pub fn validate(raw: &[u8], rig_address: u8) -> Result<Inbound<'_>> {
    let Some(frame) = CivFrame::parse(raw) else {
        return Err(Error::Framing(format!(
            "frame too short ({} bytes, need {MIN_FRAME_LEN})",
            raw.len()
        )));
    };

    if raw[0] != PREAMBLE || raw[1] != PREAMBLE {
        return Err(Error::Framing("missing preamble".into()));
    }
    if raw[raw.len() - 1] != TERMINATOR {
        return Err(Error::Framing("missing terminator".into()));
    }

    if frame.dst_addr == rig_address {
        return Ok(Inbound::Echo);
    }

    if frame.src_addr != rig_address {
        return Err(Error::Framing(format!(
            "unexpected source address 0x{:02X} (rig is 0x{rig_address:02X})",
            frame.src_addr
        )));
    }

    Ok(Inbound::Frame(frame))
}

/// What dispatching a frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// No completed frame was waiting.
    Idle,
    /// The rig reported its frequency; the stored frequency was updated.
    Frequency(u32),
    /// The rig reported its mode; the stored mode byte was updated.
    Mode(u8),
    /// Our own transmission echoed back by the bus. Discarded.
    Echo,
    /// A payload-free status frame (OK, NG, collision). Nothing stored.
    Status(StatusCode),
    /// A valid frame with a command this engine does not handle.
    Ignored(u8),
}

impl Dispatch {
    /// Whether the stored frequency or mode changed.
    pub fn is_update(&self) -> bool {
        matches!(self, Dispatch::Frequency(_) | Dispatch::Mode(_))
    }
}
