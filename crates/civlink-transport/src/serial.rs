//! Serial port transport for CI-V communication.
//!
//! This module provides [`SerialTransport`], which implements the
//! non-blocking [`Transport`] trait over a USB virtual COM port or a CI-V
//! level converter on an RS-232 port. CI-V rigs typically run at 9600,
//! 19200, or 115200 baud.
//!
//! # Example
//!
//! ```no_run
//! use civlink_core::Transport;
//! use civlink_transport::SerialTransport;
//!
//! # fn example() -> civlink_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 19200)?;
//!
//! for &b in &[0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD] {
//!     transport.write_byte(b)?;
//! }
//! while let Some(b) = transport.read_byte()? {
//!     println!("{b:02X}");
//! }
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};
use std::time::Duration;

use civlink_core::error::{Error, Result};
use civlink_core::transport::Transport;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

/// Read/write timeout on the underlying port. Reads only happen when bytes
/// are already buffered, so this is only a backstop.
const IO_TIMEOUT: Duration = Duration::from_millis(10);

/// Serial port configuration.
///
/// Defaults match a factory-fresh CI-V interface: 9600 baud, 8 data bits,
/// 1 stop bit, no parity, no flow control. Line settings use the
/// `serialport` types directly.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate (e.g., 9600, 19200, 115200)
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// Flow control (None for CI-V)
    pub flow_control: FlowControl,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

/// Serial port transport for a CI-V bus.
pub struct SerialTransport {
    /// The underlying serial port, `None` once closed.
    port: Option<Box<dyn SerialPort>>,
    /// Port name for logging/debugging
    port_name: String,
}

impl SerialTransport {
    /// Open a serial port with the given baud rate and default settings.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0" on Linux, "COM3" on Windows)
    /// * `baud_rate` - Baud rate (e.g., 9600, 19200, 115200)
    pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
        let config = SerialConfig {
            baud_rate,
            ..Default::default()
        };
        Self::open_with_config(port, config)
    }

    /// Open a serial port with full configuration control.
    pub fn open_with_config(port: &str, config: SerialConfig) -> Result<Self> {
        tracing::debug!(
            port = %port,
            baud_rate = config.baud_rate,
            data_bits = ?config.data_bits,
            stop_bits = ?config.stop_bits,
            parity = ?config.parity,
            flow_control = ?config.flow_control,
            "Opening serial port"
        );

        let mut serial = serialport::new(port, config.baud_rate)
            .data_bits(config.data_bits)
            .stop_bits(config.stop_bits)
            .parity(config.parity)
            .flow_control(config.flow_control)
            .timeout(IO_TIMEOUT)
            .open()
            .map_err(|e| {
                tracing::error!(port = %port, error = %e, "Failed to open serial port");
                Error::Transport(format!("Failed to open serial port {port}: {e}"))
            })?;

        // Many CI-V interfaces route DTR/RTS to PTT or CW key inputs; keep
        // them de-asserted.
        if let Err(e) = serial.write_data_terminal_ready(false) {
            tracing::warn!(port = %port, error = %e, "Failed to de-assert DTR");
        }
        if let Err(e) = serial.write_request_to_send(false) {
            tracing::warn!(port = %port, error = %e, "Failed to de-assert RTS");
        }

        tracing::info!(port = %port, baud_rate = config.baud_rate, "Serial port opened successfully");

        Ok(Self::from_port(serial, port))
    }

    /// Wrap a port the caller has already opened and configured.
    pub fn from_port(port: Box<dyn SerialPort>, name: &str) -> Self {
        Self {
            port: Some(port),
            port_name: name.to_string(),
        }
    }

    /// Get the name of the serial port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Whether the port is still open.
    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Close the port. Later calls return [`Error::NotConnected`].
    pub fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::info!(port = %self.port_name, "Serial port closed");
        }
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(Error::NotConnected)
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> Result<usize> {
        let port = self.port_mut()?;
        let n = port
            .bytes_to_read()
            .map_err(|e| Error::Transport(format!("bytes_to_read failed: {e}")))?;
        Ok(n as usize)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.bytes_available()? == 0 {
            return Ok(None);
        }
        let port = self.port_mut()?;
        let mut buf = [0u8; 1];
        match port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => {
                tracing::trace!(port = %self.port_name, byte = buf[0], "Received byte");
                Ok(Some(buf[0]))
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => {
                tracing::error!(port = %self.port_name, error = %e, "Failed to receive data");
                Err(Error::Io(e))
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        let port = self.port_mut()?;
        match port.write(&[byte]) {
            Ok(1) => Ok(()),
            Ok(_) => Err(Error::WriteFailed(byte)),
            Err(e) => {
                tracing::error!(port = %self.port_name, error = %e, "Failed to send data");
                Err(Error::Io(e))
            }
        }
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.port_name)
            .field("connected", &self.is_connected())
            .finish()
    }
}
