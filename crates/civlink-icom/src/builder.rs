//! SessionBuilder -- fluent builder for constructing [`CivSession`] instances.
//!
//! Separates configuration from construction so that callers can override
//! the rig's CI-V address, our own controller address, and serial port
//! parameters before the session is created.
//!
//! # Example
//!
//! ```
//! use civlink_icom::builder::SessionBuilder;
//! use civlink_icom::models::ic_706mk2g;
//! use civlink_test_harness::MockBus;
//!
//! # fn example() -> civlink_core::Result<()> {
//! let session = SessionBuilder::new(ic_706mk2g())
//!     .own_address(0xE0)
//!     .build(MockBus::new())?;
//! assert_eq!(session.state().config().rig_address, 0x58);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use civlink_core::error::{Error, Result};
use civlink_core::transport::Transport;
use civlink_transport::SerialTransport;

use crate::civ::{CONTROLLER_ADDR, is_reserved};
use crate::models::IcomModel;
use crate::session::CivSession;
use crate::state::SessionConfig;

/// Fluent builder for [`CivSession`].
///
/// All configuration has defaults derived from the [`IcomModel`], so the
/// simplest usage is `SessionBuilder::new(ic_7300()).build(transport)`.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    model: IcomModel,
    rig_address: Option<u8>,
    own_address: u8,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
}

impl SessionBuilder {
    /// Create a new builder for the given Icom model.
    pub fn new(model: IcomModel) -> Self {
        SessionBuilder {
            model,
            rig_address: None,
            own_address: CONTROLLER_ADDR,
            serial_port: None,
            baud_rate: None,
        }
    }

    /// Override the model's default CI-V address.
    ///
    /// Use this when the rig's CI-V address has been changed from the
    /// factory default in the rig's menu settings.
    pub fn rig_address(mut self, addr: u8) -> Self {
        self.rig_address = Some(addr);
        self
    }

    /// Override our own controller address (default `0xE0`).
    pub fn own_address(mut self, addr: u8) -> Self {
        self.own_address = addr;
        self
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate for this model.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = Some(baud);
        self
    }

    /// The validated bus addressing this builder would use.
    pub fn config(&self) -> Result<SessionConfig> {
        let config = SessionConfig {
            rig_address: self.rig_address.unwrap_or(self.model.default_civ_address),
            own_address: self.own_address,
        };

        if is_reserved(config.rig_address) {
            return Err(Error::InvalidParameter(format!(
                "rig address 0x{:02X} is a reserved CI-V byte",
                config.rig_address
            )));
        }
        if is_reserved(config.own_address) {
            return Err(Error::InvalidParameter(format!(
                "own address 0x{:02X} is a reserved CI-V byte",
                config.own_address
            )));
        }
        if config.rig_address == config.own_address {
            return Err(Error::InvalidParameter(format!(
                "rig and own address are both 0x{:02X}",
                config.rig_address
            )));
        }
        Ok(config)
    }

    /// Build a [`CivSession`] over a caller-provided transport.
    ///
    /// This is the entry point for tests (pass a `MockBus` from
    /// `civlink-test-harness`) and for callers that manage the transport
    /// themselves.
    pub fn build<T: Transport>(self, transport: T) -> Result<CivSession<T>> {
        let config = self.config()?;
        tracing::debug!(
            model = self.model.name,
            rig_address = config.rig_address,
            own_address = config.own_address,
            "CI-V session created"
        );
        Ok(CivSession::new(transport, config))
    }

    /// Open the configured serial port and build a session over it.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    /// The baud rate defaults to the model's default if not overridden.
    pub fn open(self) -> Result<CivSession<SerialTransport>> {
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for open()".into()))?;
        let baud = self.baud_rate.unwrap_or(self.model.default_baud_rate);

        // Validate before touching the port.
        self.config()?;
        let transport = SerialTransport::open(port, baud)?;
        self.build(transport)
    }
}
