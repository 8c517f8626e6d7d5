//! Transport implementations for civlink.
//!
//! This crate provides concrete implementations of the
//! [`Transport`](civlink_core::Transport) trait from `civlink-core`:
//!
//! - [`SerialTransport`]: USB virtual COM ports and CI-V level converters on
//!   RS-232 serial ports

pub mod serial;

pub use serial::{SerialConfig, SerialTransport};
pub use serialport::{DataBits, FlowControl, Parity, StopBits};
