//! Mock CI-V bus for deterministic testing of the protocol engine.
//!
//! [`MockBus`] implements the non-blocking [`Transport`] trait over
//! in-memory queues. It can model the half-duplex bus echo (every written
//! byte shows up on the receive side), answer scripted requests from a
//! simulated rig, and reject writes on demand.
//!
//! # Example
//!
//! ```
//! use civlink_test_harness::MockBus;
//!
//! let mut bus = MockBus::new().with_echo();
//! // When the engine sends this request, the rig answers with this frame.
//! bus.expect(&[0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD],
//!            &[0xFE, 0xFE, 0xE0, 0x58, 0x03, 0x00, 0x50, 0x19, 0x14, 0x00, 0xFD]);
//! ```

use std::collections::VecDeque;

use civlink_core::error::{Error, Result};
use civlink_core::transport::Transport;

/// A scripted request/response pair.
#[derive(Debug, Clone)]
struct Expectation {
    /// Bytes that complete the request once written.
    request: Vec<u8>,
    /// Bytes queued on the receive side when the request completes.
    response: Vec<u8>,
}

/// An in-memory [`Transport`] that behaves like a shared CI-V bus.
#[derive(Debug)]
pub struct MockBus {
    /// Bytes waiting to be read.
    inbound: VecDeque<u8>,
    /// Every byte accepted by `write_byte`, in order.
    written: Vec<u8>,
    /// Written bytes since the last matched expectation.
    pending_request: Vec<u8>,
    /// Ordered queue of scripted replies.
    expectations: VecDeque<Expectation>,
    /// Loop written bytes back to the receive side.
    echo: bool,
    /// Number of writes still allowed to succeed, if limited.
    writes_remaining: Option<usize>,
    /// Whether the bus is "connected".
    connected: bool,
    /// Fail every read while still reporting pending bytes.
    fail_reads: bool,
}

impl MockBus {
    /// Create an empty, connected bus without echo.
    pub fn new() -> Self {
        MockBus {
            inbound: VecDeque::new(),
            written: Vec::new(),
            pending_request: Vec::new(),
            expectations: VecDeque::new(),
            echo: false,
            writes_remaining: None,
            connected: true,
            fail_reads: false,
        }
    }

    /// Loop every written byte back to the receive side, as a real
    /// half-duplex CI-V bus does.
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Queue bytes on the receive side, as if the rig had sent them.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// Script a rig reply.
    ///
    /// Once the written bytes end with `request`, `response` is queued on
    /// the receive side (after any echo of the request itself).
    /// Expectations are consumed in order.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Let the next `n` writes succeed and reject every write after that.
    pub fn fail_writes_after(&mut self, n: usize) {
        self.writes_remaining = Some(n);
    }

    /// Make every later read fail with [`Error::Transport`]. Pending bytes
    /// are still reported by `bytes_available`.
    pub fn fail_reads(&mut self) {
        self.fail_reads = true;
    }

    /// All bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of bytes waiting on the receive side.
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    /// Number of scripted replies not yet triggered.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state. A disconnected bus fails every call with
    /// [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    fn match_expectation(&mut self) {
        let matched = self
            .expectations
            .front()
            .is_some_and(|exp| self.pending_request.ends_with(&exp.request));
        if matched {
            if let Some(exp) = self.expectations.pop_front() {
                self.inbound.extend(exp.response);
            }
            self.pending_request.clear();
        }
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockBus {
    fn bytes_available(&mut self) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        Ok(self.inbound.len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.fail_reads {
            return Err(Error::Transport("mock read failure".into()));
        }
        Ok(self.inbound.pop_front())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if let Some(remaining) = self.writes_remaining.as_mut() {
            if *remaining == 0 {
                return Err(Error::WriteFailed(byte));
            }
            *remaining -= 1;
        }

        self.written.push(byte);
        self.pending_request.push(byte);
        if self.echo {
            self.inbound.push_back(byte);
        }
        self.match_expectation();
        Ok(())
    }
}
