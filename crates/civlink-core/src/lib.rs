//! civlink-core: Core traits, types, and error definitions for civlink.
//!
//! This crate holds the pieces shared by the CI-V protocol engine and the
//! transports that feed it. It has no protocol knowledge of its own.
//!
//! # Key types
//!
//! - [`Transport`] -- non-blocking byte-level communication channel
//! - [`Mode`] -- operating mode of the rig
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod helpers;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use helpers::{format_freq_mhz, format_hex};
pub use transport::Transport;
pub use types::*;
