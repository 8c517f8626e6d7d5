//! Incremental CI-V frame receiver.
//!
//! [`FrameReceiver`] assembles raw frames from an unbounded byte stream, one
//! byte per call. It never blocks and never backtracks: it only tracks how
//! many preamble bytes it has seen, what it has buffered so far, and whether
//! a terminator has closed the frame.
//!
//! Bytes arriving before two preamble bytes have been seen are dropped. Once
//! armed, every byte is buffered until the terminator, so a `0xFE` inside a
//! payload is plain data. A `0xFD` inside a payload ends the frame early;
//! the wire format has no escaping for it.

use bytes::{BufMut, BytesMut};
use civlink_core::{Error, Result};
use tracing::warn;

use crate::civ::{MAX_FRAME_LEN, PREAMBLE, TERMINATOR};

/// Byte-at-a-time frame assembler.
///
/// One receiver belongs to exactly one bus session.
#[derive(Debug)]
pub struct FrameReceiver {
    buf: BytesMut,
    preambles: u8,
    complete: bool,
}

impl FrameReceiver {
    /// Create an idle receiver with an empty buffer.
    pub fn new() -> Self {
        FrameReceiver {
            buf: BytesMut::with_capacity(MAX_FRAME_LEN + 1),
            preambles: 0,
            complete: false,
        }
    }

    /// Feed one byte from the bus.
    ///
    /// Returns `Ok(true)` once a terminator has closed the frame. If the
    /// frame grows past [`MAX_FRAME_LEN`] it is discarded, the receiver is
    /// reset, and [`Error::FrameTooLong`] is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use civlink_icom::receiver::FrameReceiver;
    ///
    /// let mut rx = FrameReceiver::new();
    /// let mut done = false;
    /// for &b in &[0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD] {
    ///     done = rx.push(b).unwrap();
    /// }
    /// assert!(done);
    /// assert_eq!(rx.frame(), &[0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD]);
    /// ```
    pub fn push(&mut self, byte: u8) -> Result<bool> {
        if byte == PREAMBLE && self.preambles < 2 {
            self.buf.put_u8(byte);
            self.preambles += 1;
        } else if self.preambles == 2 {
            self.buf.put_u8(byte);
        }

        if byte == TERMINATOR {
            self.preambles = 0;
            self.complete = true;
        }

        if self.buf.len() > MAX_FRAME_LEN {
            warn!(max = MAX_FRAME_LEN, "CI-V frame too long, receiver reset");
            self.reset();
            return Err(Error::FrameTooLong { max: MAX_FRAME_LEN });
        }

        Ok(self.complete)
    }

    /// Whether a terminated frame is waiting to be dispatched.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Consume the completion flag, returning its previous value.
    pub fn take_complete(&mut self) -> bool {
        std::mem::replace(&mut self.complete, false)
    }

    /// Bytes buffered so far.
    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes buffered so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop the buffered bytes, ready for the next frame.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Return to the idle state, abandoning any partial frame.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.preambles = 0;
        self.complete = false;
    }
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(rx: &mut FrameReceiver, bytes: &[u8]) -> Vec<bool> {
        bytes.iter().map(|&b| rx.push(b).unwrap()).collect()
    }

    #[test]
    fn completes_on_terminator_only() {
        let mut rx = FrameReceiver::new();
        let flags = feed(&mut rx, &[0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD]);
        assert_eq!(flags, vec![false, false, false, false, false, true]);
        assert!(rx.is_complete());
        assert_eq!(rx.len(), 6);
    }

    #[test]
    fn drops_bytes_before_preamble() {
        let mut rx = FrameReceiver::new();
        feed(&mut rx, &[0x12, 0x34, 0xFE, 0xFE, 0xE0, 0x58, 0xFB, 0xFD]);
        assert_eq!(rx.frame(), &[0xFE, 0xFE, 0xE0, 0x58, 0xFB, 0xFD]);
    }

    #[test]
    fn preamble_value_in_body_is_data() {
        let mut rx = FrameReceiver::new();
        feed(&mut rx, &[0xFE, 0xFE, 0xE0, 0x58, 0x01, 0xFE, 0xFD]);
        assert!(rx.is_complete());
        assert_eq!(rx.frame(), &[0xFE, 0xFE, 0xE0, 0x58, 0x01, 0xFE, 0xFD]);
    }

    #[test]
    fn terminator_in_payload_ends_frame_early() {
        let mut rx = FrameReceiver::new();
        let flags = feed(&mut rx, &[0xFE, 0xFE, 0xE0, 0x58, 0x00, 0xFD]);
        assert_eq!(flags.last(), Some(&true));
        assert_eq!(rx.len(), 6);
    }

    #[test]
    fn overflow_resets_and_reports() {
        let mut rx = FrameReceiver::new();
        feed(&mut rx, &[0xFE, 0xFE]);
        for _ in 0..(MAX_FRAME_LEN - 2) {
            assert!(!rx.push(0x11).unwrap());
        }
        assert_eq!(rx.len(), MAX_FRAME_LEN);

        let err = rx.push(0x11).unwrap_err();
        assert!(matches!(err, Error::FrameTooLong { max: MAX_FRAME_LEN }));
        assert_eq!(rx.len(), 0);
        assert!(!rx.is_complete());

        // Disarmed: further body bytes are dropped until a new preamble.
        assert!(!rx.push(0x11).unwrap());
        assert!(rx.is_empty());
    }

    #[test]
    fn max_length_frame_is_accepted() {
        let mut rx = FrameReceiver::new();
        let mut frame = vec![0xFE, 0xFE, 0xE0, 0x58, 0x00];
        frame.resize(MAX_FRAME_LEN - 1, 0x00);
        frame.push(0xFD);
        let flags = feed(&mut rx, &frame);
        assert_eq!(flags.last(), Some(&true));
        assert_eq!(rx.len(), MAX_FRAME_LEN);
    }

    #[test]
    fn take_complete_is_one_shot() {
        let mut rx = FrameReceiver::new();
        feed(&mut rx, &[0xFE, 0xFE, 0xE0, 0x58, 0xFB, 0xFD]);
        assert!(rx.take_complete());
        assert!(!rx.take_complete());
        assert_eq!(rx.len(), 6);
        rx.clear();
        assert!(rx.is_empty());
    }

    #[test]
    fn back_to_back_frames() {
        let mut rx = FrameReceiver::new();
        feed(&mut rx, &[0xFE, 0xFE, 0xE0, 0x58, 0xFB, 0xFD]);
        rx.take_complete();
        rx.clear();
        let flags = feed(&mut rx, &[0xFE, 0xFE, 0xE0, 0x58, 0xFA, 0xFD]);
        assert_eq!(flags, vec![false, false, false, false, false, true]);
        assert_eq!(rx.frame(), &[0xFE, 0xFE, 0xE0, 0x58, 0xFA, 0xFD]);
    }

    #[test]
    fn reset_abandons_partial_frame() {
        let mut rx = FrameReceiver::new();
        feed(&mut rx, &[0xFE, 0xFE, 0xE0]);
        rx.reset();
        assert!(rx.is_empty());
        // Body byte without a fresh preamble is dropped.
        rx.push(0x58).unwrap();
        assert!(rx.is_empty());
    }
}
