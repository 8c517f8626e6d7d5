//! Per-session protocol state.
//!
//! [`ProtocolState`] owns everything one CI-V session needs between calls:
//! the bus addresses, the frame receiver, and the last frequency and mode
//! the rig reported. The receiver is the only writer of the buffer and the
//! completion flag; [`ProtocolState::dispatch`] is the only writer of the
//! stored frequency and mode (apart from the invalidation done by the set
//! commands).

use civlink_core::{Error, Mode, Result, format_hex};
use tracing::{debug, trace, warn};

use crate::civ::{
    self, CONTROLLER_ADDR, Command, FREQ_LEN, INVALID_FREQUENCY, INVALID_MODE,
};
use crate::dispatch::{self, Dispatch, Inbound};
use crate::receiver::FrameReceiver;

/// Bus addressing for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// CI-V address of the rig (e.g. `0x58` for an IC-706MkIIG).
    pub rig_address: u8,
    /// Our own CI-V address, used as the source of outbound frames.
    pub own_address: u8,
}

impl SessionConfig {
    /// Addressing for a rig at `rig_address`, with the standard controller
    /// address as our own.
    pub fn new(rig_address: u8) -> Self {
        SessionConfig {
            rig_address,
            own_address: CONTROLLER_ADDR,
        }
    }
}

/// Receive buffer plus the last confirmed rig frequency and mode.
#[derive(Debug)]
pub struct ProtocolState {
    config: SessionConfig,
    receiver: FrameReceiver,
    frequency: u32,
    mode: u8,
}

impl ProtocolState {
    /// Create the state for a new session. Frequency and mode start unknown.
    pub fn new(config: SessionConfig) -> Self {
        ProtocolState {
            config,
            receiver: FrameReceiver::new(),
            frequency: INVALID_FREQUENCY,
            mode: INVALID_MODE,
        }
    }

    /// The session's bus addressing.
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Feed one received byte into the frame receiver.
    ///
    /// Returns `Ok(true)` when a frame is complete and should be passed to
    /// [`dispatch`](Self::dispatch).
    pub fn receive(&mut self, byte: u8) -> Result<bool> {
        self.receiver.push(byte)
    }

    /// Whether a completed frame is waiting for [`dispatch`](Self::dispatch).
    pub fn is_complete(&self) -> bool {
        self.receiver.is_complete()
    }

    /// The frame receiver, for inspection.
    pub fn receiver(&self) -> &FrameReceiver {
        &self.receiver
    }

    /// Validate the completed frame and apply it.
    ///
    /// Returns [`Dispatch::Idle`] if no frame is complete. Otherwise the
    /// completion flag is consumed, and whatever the outcome the buffer is
    /// emptied before returning.
    ///
    /// # Example
    ///
    /// ```
    /// use civlink_icom::dispatch::Dispatch;
    /// use civlink_icom::state::{ProtocolState, SessionConfig};
    ///
    /// let mut state = ProtocolState::new(SessionConfig::new(0x58));
    /// for &b in &[0xFE, 0xFE, 0xE0, 0x58, 0x04, 0x03, 0x01, 0xFD] {
    ///     state.receive(b).unwrap();
    /// }
    /// assert_eq!(state.dispatch().unwrap(), Dispatch::Mode(0x03));
    /// assert_eq!(state.mode(), Some(civlink_core::Mode::CW));
    /// ```
    pub fn dispatch(&mut self) -> Result<Dispatch> {
        if !self.receiver.take_complete() {
            return Ok(Dispatch::Idle);
        }
        let result = self.apply_frame();
        if let Err(e) = &result {
            warn!(frame = %format_hex(self.receiver.frame()), error = %e, "discarding CI-V frame");
        }
        self.receiver.clear();
        result
    }

    fn apply_frame(&mut self) -> Result<Dispatch> {
        let raw = self.receiver.frame();
        trace!(rx = %format_hex(raw), "CI-V frame received");

        let frame = match dispatch::validate(raw, self.config.rig_address)? {
            Inbound::Frame(frame) => frame,
            Inbound::Echo => {
                debug!("skipping CI-V echo frame");
                return Ok(Dispatch::Echo);
            }
        };

        if let Some(status) = frame.status() {
            debug!(?status, "CI-V status frame");
            return Ok(Dispatch::Status(status));
        }

        match Command::from_byte(frame.cmd) {
            Some(Command::TransferFrequency | Command::ReadFrequency) => {
                let bcd: &[u8; FREQ_LEN] = frame
                    .payload
                    .get(..FREQ_LEN)
                    .and_then(|p| p.try_into().ok())
                    .ok_or_else(|| {
                        Error::Framing(format!(
                            "frequency payload has {} bytes, need {FREQ_LEN}",
                            frame.payload.len()
                        ))
                    })?;
                let freq = civ::decode_frequency(bcd);
                self.frequency = freq;
                debug!(freq, "rig frequency update");
                Ok(Dispatch::Frequency(freq))
            }
            Some(Command::TransferMode | Command::ReadMode) => {
                // A second payload byte, when present, is the filter
                // selection. It is not tracked.
                let Some(&mode) = frame.payload.first() else {
                    return Err(Error::Framing("mode payload is empty".into()));
                };
                self.mode = mode;
                debug!(mode, "rig mode update");
                Ok(Dispatch::Mode(mode))
            }
            _ => {
                debug!(cmd = frame.cmd, "ignoring CI-V command");
                Ok(Dispatch::Ignored(frame.cmd))
            }
        }
    }

    /// Last confirmed frequency, or `None` if unknown.
    pub fn frequency(&self) -> Option<u32> {
        (self.frequency != INVALID_FREQUENCY).then_some(self.frequency)
    }

    /// Stored frequency, [`INVALID_FREQUENCY`] when unknown.
    pub fn raw_frequency(&self) -> u32 {
        self.frequency
    }

    /// Last confirmed mode, or `None` if unknown or outside the known set.
    pub fn mode(&self) -> Option<Mode> {
        civ::civ_to_mode(self.mode)
    }

    /// Stored mode byte, [`INVALID_MODE`] when unknown.
    pub fn raw_mode(&self) -> u8 {
        self.mode
    }

    /// Forget the stored frequency until the rig reports it again.
    pub fn invalidate_frequency(&mut self) {
        self.frequency = INVALID_FREQUENCY;
    }

    /// Forget the stored mode until the rig reports it again.
    pub fn invalidate_mode(&mut self) {
        self.mode = INVALID_MODE;
    }

    /// Abandon any partial frame and return the receiver to idle.
    ///
    /// Stored frequency and mode are kept.
    pub fn reset(&mut self) {
        self.receiver.reset();
    }
}
