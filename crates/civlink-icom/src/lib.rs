//! Icom CI-V protocol engine for civlink.
//!
//! This crate implements the controller side of the Icom CI-V
//! (Communication Interface V) protocol on a shared half-duplex bus:
//!
//! - **Wire format** ([`civ`]) -- constants, command and status codes, frame
//!   encoding, and the 5-byte BCD frequency codec.
//! - **Frame receiver** ([`receiver`]) -- byte-at-a-time frame assembly with
//!   a bounded buffer.
//! - **Validation** ([`dispatch`]) -- structural checks, bus echo detection,
//!   and the [`Dispatch`] outcome type.
//! - **Protocol state** ([`state`]) -- receive buffer plus the last
//!   frequency and mode reported by the rig.
//! - **Command builders** ([`commands`]) -- read/set frequency and mode
//!   request frames.
//! - **CivSession** ([`session`]) -- ties the engine to a
//!   [`Transport`](civlink_core::Transport), with the echo-draining send
//!   primitive.
//! - **SessionBuilder** ([`builder`]) and **models** ([`models`]) --
//!   configuration.
//!
//! # Example
//!
//! ```
//! use civlink_icom::{Dispatch, SessionBuilder};
//! use civlink_icom::models::ic_706mk2g;
//! use civlink_test_harness::MockBus;
//!
//! let mut bus = MockBus::new().with_echo();
//! bus.expect(
//!     &[0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD],
//!     &[0xFE, 0xFE, 0xE0, 0x58, 0x03, 0x00, 0x50, 0x19, 0x14, 0x00, 0xFD],
//! );
//! let mut session = SessionBuilder::new(ic_706mk2g()).build(bus).unwrap();
//!
//! session.request_frequency().unwrap();
//! while session.transport_mut().pending() > 0 {
//!     if let Dispatch::Frequency(hz) = session.poll().unwrap() {
//!         assert_eq!(hz, 14_195_000);
//!     }
//! }
//! assert_eq!(session.frequency(), Some(14_195_000));
//! ```

pub mod builder;
pub mod civ;
pub mod commands;
pub mod dispatch;
pub mod models;
pub mod receiver;
pub mod session;
pub mod state;

pub use builder::SessionBuilder;
pub use dispatch::Dispatch;
pub use session::CivSession;
pub use state::{ProtocolState, SessionConfig};
