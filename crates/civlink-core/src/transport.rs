//! Transport trait for rig communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a transceiver.
//! Implementations exist for serial ports (`civlink-transport`) and for the
//! in-memory mock bus used in tests (`civlink-test-harness`).
//!
//! The protocol engine is a cooperative polling design: it moves at most one
//! byte per call and never waits. Every method here must therefore return
//! immediately.

use crate::error::Result;

/// Non-blocking, byte-oriented transport to a rig.
///
/// On a CI-V bus the line is shared and half-duplex, so every byte written
/// is usually also seen on the receive side. The transport does not filter
/// that echo; the protocol engine recognises and skips it.
pub trait Transport {
    /// Number of received bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read one received byte.
    ///
    /// Returns `Ok(None)` when nothing is pending. Callers normally check
    /// [`bytes_available`](Transport::bytes_available) first.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Write one byte to the bus.
    ///
    /// An error means the byte was not accepted. Implementations must not
    /// retry on their own.
    fn write_byte(&mut self, byte: u8) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }
}
