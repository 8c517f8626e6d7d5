//! CivSession -- the CI-V protocol engine bound to a transport.
//!
//! A session owns one [`Transport`] and one [`ProtocolState`]. It is driven
//! entirely by the caller: [`poll`](CivSession::poll) moves one received byte
//! through the frame receiver, and the request methods build a frame and
//! send it. Nothing blocks, and there are no timers or retries at this
//! layer.
//!
//! The CI-V bus is half-duplex, so our own bytes come back on the receive
//! side while we transmit. Before each outbound byte the send primitive
//! drains whatever is pending through the receiver, dispatching completed
//! frames as it goes, so neither the echo nor a rig frame that raced our
//! transmission is lost.

use civlink_core::{Error, Mode, Result, Transport, format_hex};
use tracing::{debug, trace, warn};

use crate::commands;
use crate::dispatch::Dispatch;
use crate::state::{ProtocolState, SessionConfig};

/// One CI-V session with one rig over one transport.
#[derive(Debug)]
pub struct CivSession<T: Transport> {
    transport: T,
    state: ProtocolState,
}

impl<T: Transport> CivSession<T> {
    /// Create a session over `transport`. Prefer
    /// [`SessionBuilder`](crate::builder::SessionBuilder), which validates
    /// the addressing.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        CivSession {
            transport,
            state: ProtocolState::new(config),
        }
    }

    /// Process at most one received byte.
    ///
    /// Returns [`Dispatch::Idle`] when nothing was pending or the byte did
    /// not complete a frame. When it did, the frame is validated and applied
    /// before returning.
    pub fn poll(&mut self) -> Result<Dispatch> {
        Ok(self.poll_byte()?.unwrap_or(Dispatch::Idle))
    }

    /// `Ok(None)` if no byte was read.
    fn poll_byte(&mut self) -> Result<Option<Dispatch>> {
        let Some(byte) = self.transport.read_byte()? else {
            return Ok(None);
        };
        if self.state.receive(byte)? {
            return self.state.dispatch().map(Some);
        }
        Ok(Some(Dispatch::Idle))
    }

    /// Feed every pending inbound byte through the receiver.
    ///
    /// Malformed or oversized frames are logged and do not stop the
    /// transmission that called this. A failed read ends the drain and
    /// leaves the remaining bytes for a later [`poll`](Self::poll).
    fn drain(&mut self) {
        loop {
            match self.transport.bytes_available() {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "cannot query pending bytes while transmitting");
                    break;
                }
            }
            match self.poll_byte() {
                Ok(Some(Dispatch::Status(status))) => {
                    debug!(?status, "CI-V status frame consumed while transmitting");
                }
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e @ (Error::Framing(_) | Error::FrameTooLong { .. })) => {
                    warn!(error = %e, "receive error while transmitting");
                }
                Err(e) => {
                    warn!(error = %e, "read failed while transmitting, leaving bytes pending");
                    break;
                }
            }
        }
    }

    /// Send a raw frame one byte at a time.
    ///
    /// Pending inbound bytes are drained before each byte is written. Frames
    /// completed during the drain update the stored frequency and mode, but
    /// their [`Dispatch`] outcome is not returned: a status reply (`FB`/`FA`)
    /// that lands here is only logged. The first rejected write aborts the
    /// send and its error is returned; nothing is retried.
    pub fn send(&mut self, frame: &[u8]) -> Result<()> {
        if frame.is_empty() {
            return Err(Error::InvalidParameter("cannot send an empty frame".into()));
        }
        trace!(tx = %format_hex(frame), "CI-V frame sent");

        for &byte in frame {
            self.drain();
            if let Err(e) = self.transport.write_byte(byte) {
                warn!(byte, error = %e, "CI-V write failed, aborting send");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Ask the rig for its operating frequency.
    pub fn request_frequency(&mut self) -> Result<()> {
        let cmd = commands::cmd_read_frequency(&self.state.config());
        self.send(&cmd)
    }

    /// Ask the rig for its operating mode.
    pub fn request_mode(&mut self) -> Result<()> {
        let cmd = commands::cmd_read_mode(&self.state.config());
        self.send(&cmd)
    }

    /// Set the rig's operating frequency.
    ///
    /// The stored frequency becomes unknown immediately and stays so until
    /// the rig reports a frequency again.
    pub fn write_frequency(&mut self, freq_hz: u32) -> Result<()> {
        let cmd = commands::cmd_set_frequency(&self.state.config(), freq_hz);
        self.state.invalidate_frequency();
        self.send(&cmd)
    }

    /// Set the rig's operating mode.
    ///
    /// The stored mode becomes unknown immediately and stays so until the
    /// rig reports a mode again.
    pub fn write_mode(&mut self, mode: Mode) -> Result<()> {
        let cmd = commands::cmd_set_mode(&self.state.config(), mode);
        self.state.invalidate_mode();
        self.send(&cmd)
    }

    /// Last confirmed rig frequency.
    pub fn frequency(&self) -> Option<u32> {
        self.state.frequency()
    }

    /// Last confirmed rig mode.
    pub fn mode(&self) -> Option<Mode> {
        self.state.mode()
    }

    /// Whether a completed frame is waiting to be dispatched.
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// The session's protocol state.
    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    /// Mutable access to the protocol state (e.g. for [`ProtocolState::reset`]).
    pub fn state_mut(&mut self) -> &mut ProtocolState {
        &mut self.state
    }

    /// Mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// End the session and hand back the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civ::StatusCode;
    use civlink_test_harness::MockBus;

    const RIG: u8 = 0x58;

    fn session(bus: MockBus) -> CivSession<MockBus> {
        CivSession::new(bus, SessionConfig::new(RIG))
    }

    /// Poll until the bus is empty, collecting every non-idle outcome.
    fn run(session: &mut CivSession<MockBus>) -> Vec<Dispatch> {
        let mut out = Vec::new();
        while session.transport_mut().pending() > 0 {
            let d = session.poll().unwrap();
            if d != Dispatch::Idle {
                out.push(d);
            }
        }
        out
    }

    #[test]
    fn poll_with_nothing_pending_is_idle() {
        let mut s = session(MockBus::new());
        assert_eq!(s.poll().unwrap(), Dispatch::Idle);
    }

    #[test]
    fn poll_completes_on_final_byte_only() {
        let mut bus = MockBus::new();
        bus.push_inbound(&[0xFE, 0xFE, 0xE0, RIG, 0x04, 0x01, 0x02, 0xFD]);
        let mut s = session(bus);
        for _ in 0..7 {
            assert_eq!(s.poll().unwrap(), Dispatch::Idle);
        }
        assert_eq!(s.poll().unwrap(), Dispatch::Mode(0x01));
        assert_eq!(s.mode(), Some(Mode::USB));
    }

    #[test]
    fn request_frequency_round_trip_over_echoing_bus() {
        let mut bus = MockBus::new().with_echo();
        bus.expect(
            &[0xFE, 0xFE, RIG, 0xE0, 0x03, 0xFD],
            &[0xFE, 0xFE, 0xE0, RIG, 0x03, 0x00, 0x50, 0x19, 0x14, 0x00, 0xFD],
        );
        let mut s = session(bus);

        s.request_frequency().unwrap();
        assert_eq!(s.transport_mut().written(), &[0xFE, 0xFE, RIG, 0xE0, 0x03, 0xFD]);

        let outcomes = run(&mut s);
        assert_eq!(outcomes, vec![Dispatch::Echo, Dispatch::Frequency(14_195_000)]);
        assert_eq!(s.frequency(), Some(14_195_000));
    }

    #[test]
    fn echo_is_drained_while_transmitting() {
        let mut s = session(MockBus::new().with_echo());
        s.request_mode().unwrap();
        // All but the last echoed byte were fed through the receiver
        // before the following byte was written.
        assert_eq!(s.state().receiver().frame(), &[0xFE, 0xFE, RIG, 0xE0, 0x04]);
        assert_eq!(s.transport_mut().pending(), 1);
        assert_eq!(s.poll().unwrap(), Dispatch::Echo);
    }

    #[test]
    fn write_frequency_invalidates_before_reply() {
        let mut bus = MockBus::new().with_echo();
        bus.push_inbound(&[0xFE, 0xFE, 0x00, RIG, 0x00, 0x00, 0x00, 0x00, 0x07, 0x00, 0xFD]);
        let mut s = session(bus);
        run(&mut s);
        assert_eq!(s.frequency(), Some(7_000_000));

        s.transport_mut().expect(
            &[0xFE, 0xFE, RIG, 0xE0, 0x05, 0x00, 0x50, 0x19, 0x14, 0x00, 0xFD],
            &[0xFE, 0xFE, 0xE0, RIG, 0xFB, 0xFD],
        );
        s.write_frequency(14_195_000).unwrap();
        assert_eq!(s.frequency(), None);
        assert_eq!(s.state().raw_frequency(), crate::civ::INVALID_FREQUENCY);

        let outcomes = run(&mut s);
        assert_eq!(outcomes, vec![Dispatch::Echo, Dispatch::Status(StatusCode::Ok)]);
        // An OK is not a frequency report.
        assert_eq!(s.frequency(), None);
    }

    #[test]
    fn write_mode_invalidates_and_sends_mode_byte() {
        let mut bus = MockBus::new();
        bus.push_inbound(&[0xFE, 0xFE, 0xE0, RIG, 0x04, 0x00, 0x01, 0xFD]);
        let mut s = session(bus);
        run(&mut s);
        assert_eq!(s.mode(), Some(Mode::LSB));

        s.write_mode(Mode::RTTY).unwrap();
        assert_eq!(s.mode(), None);
        assert_eq!(
            s.transport_mut().written(),
            &[0xFE, 0xFE, RIG, 0xE0, 0x06, 0x04, 0xFD]
        );
    }

    #[test]
    fn rig_frame_racing_transmission_is_dispatched() {
        let mut bus = MockBus::new();
        bus.push_inbound(&[0xFE, 0xFE, 0x00, RIG, 0x01, 0x03, 0xFD]);
        let mut s = session(bus);

        s.request_frequency().unwrap();
        assert_eq!(s.mode(), Some(Mode::CW));
        assert_eq!(s.transport_mut().pending(), 0);
    }

    #[test]
    fn drain_survives_receive_errors() {
        let mut bus = MockBus::new();
        // Frame from a foreign device: a framing error, logged and skipped.
        bus.push_inbound(&[0xFE, 0xFE, 0xE0, 0x94, 0x03, 0xFD]);
        let mut s = session(bus);

        s.request_mode().unwrap();
        assert_eq!(s.transport_mut().written().len(), 6);
        assert!(s.state().receiver().is_empty());
    }

    #[test]
    fn read_failure_does_not_stall_send() {
        let mut bus = MockBus::new();
        bus.push_inbound(&[0xFE, 0xFE, 0xE0]);
        bus.fail_reads();
        let mut s = session(bus);

        s.request_mode().unwrap();
        assert_eq!(
            s.transport_mut().written(),
            &[0xFE, 0xFE, RIG, 0xE0, 0x04, 0xFD]
        );
        assert_eq!(s.transport_mut().pending(), 3);
        assert!(matches!(s.poll(), Err(Error::Transport(_))));
    }

    #[test]
    fn status_reply_during_send_is_consumed() {
        let mut bus = MockBus::new();
        bus.push_inbound(&[0xFE, 0xFE, 0xE0, RIG, 0xFA, 0xFD]);
        let mut s = session(bus);

        s.request_frequency().unwrap();
        assert_eq!(s.transport_mut().pending(), 0);
        assert!(s.state().receiver().is_empty());
        assert_eq!(s.frequency(), None);
        assert_eq!(s.poll().unwrap(), Dispatch::Idle);
    }

    #[test]
    fn write_failure_aborts_send() {
        let mut bus = MockBus::new();
        bus.fail_writes_after(3);
        let mut s = session(bus);

        let err = s.write_frequency(14_195_000).unwrap_err();
        assert!(matches!(err, Error::WriteFailed(0xE0)));
        assert_eq!(s.transport_mut().written(), &[0xFE, 0xFE, RIG]);
        assert_eq!(s.frequency(), None);
    }

    #[test]
    fn send_rejects_empty_frame() {
        let mut s = session(MockBus::new());
        assert!(matches!(s.send(&[]), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn poll_reports_framing_error_and_recovers() {
        let mut bus = MockBus::new();
        bus.push_inbound(&[0xFE, 0xFE, 0xE0, 0x94, 0x03, 0xFD]);
        bus.push_inbound(&[0xFE, 0xFE, 0xE0, RIG, 0x04, 0x05, 0xFD]);
        let mut s = session(bus);

        for _ in 0..5 {
            assert_eq!(s.poll().unwrap(), Dispatch::Idle);
        }
        assert!(matches!(s.poll(), Err(Error::Framing(_))));
        assert!(s.state().receiver().is_empty());
        assert_eq!(run(&mut s), vec![Dispatch::Mode(0x05)]);
    }

    #[test]
    fn poll_reports_overflow() {
        let mut bus = MockBus::new();
        bus.push_inbound(&[0xFE, 0xFE]);
        bus.push_inbound(&[0x11; 19]);
        let mut s = session(bus);

        let mut result = Ok(Dispatch::Idle);
        while s.transport_mut().pending() > 0 && result.is_ok() {
            result = s.poll();
        }
        assert!(matches!(result, Err(Error::FrameTooLong { .. })));
        assert!(s.state().receiver().is_empty());
        assert!(!s.is_complete());
    }

    #[test]
    fn disconnected_transport_propagates() {
        let mut bus = MockBus::new();
        bus.set_connected(false);
        let mut s = session(bus);
        assert!(matches!(s.poll(), Err(Error::NotConnected)));
        assert!(matches!(s.request_mode(), Err(Error::NotConnected)));
    }

    #[test]
    fn into_transport_returns_bus() {
        let mut s = session(MockBus::new());
        s.request_mode().unwrap();
        let bus = s.into_transport();
        assert_eq!(bus.written().len(), 6);
    }
}
