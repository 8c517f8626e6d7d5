//! Error types for civlink.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer and protocol-layer
//! failures are both captured here.
//!
//! Two receive-side outcomes are deliberately *not* errors: a bus echo of our
//! own transmission and a well-formed frame carrying a command the engine
//! does not handle. Those are reported through the protocol engine's
//! dispatch outcome instead.

/// The error type for all civlink operations.
///
/// No variant is fatal. After any receive-side error the protocol engine is
/// back in its idle state and ready for the next frame.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A completed frame failed structural validation: bad preamble, bad
    /// terminator, unexpected source address, or a truncated payload.
    #[error("framing error: {0}")]
    Framing(String),

    /// An in-progress frame grew past the maximum frame length and was
    /// discarded.
    #[error("frame exceeds maximum length of {max} bytes")]
    FrameTooLong {
        /// Maximum accepted frame length in bytes.
        max: usize,
    },

    /// A transport-level error (serial port, mock bus).
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport rejected an outbound byte. The send was aborted.
    #[error("write failed at byte 0x{0:02X}")]
    WriteFailed(u8),

    /// An invalid parameter was passed to a builder or command.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the rig has been established.
    #[error("not connected")]
    NotConnected,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_framing() {
        let e = Error::Framing("bad terminator".into());
        assert_eq!(e.to_string(), "framing error: bad terminator");
    }

    #[test]
    fn error_display_frame_too_long() {
        let e = Error::FrameTooLong { max: 20 };
        assert_eq!(e.to_string(), "frame exceeds maximum length of 20 bytes");
    }

    #[test]
    fn error_display_write_failed() {
        let e = Error::WriteFailed(0xFD);
        assert_eq!(e.to_string(), "write failed at byte 0xFD");
    }

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("port busy".into());
        assert_eq!(e.to_string(), "transport error: port busy");
    }

    #[test]
    fn error_display_invalid_parameter() {
        let e = Error::InvalidParameter("rig address 0xFE is reserved".into());
        assert_eq!(
            e.to_string(),
            "invalid parameter: rig address 0xFE is reserved"
        );
    }

    #[test]
    fn error_display_not_connected() {
        assert_eq!(Error::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
