//! CI-V command builders.
//!
//! Pure functions that build the outbound request frames for the four
//! supported operations. They perform no I/O; [`CivSession`] sends them.
//!
//! Every request has the shape
//! `FE FE <rig> <own> <cmd> [payload...] FD`.
//!
//! [`CivSession`]: crate::session::CivSession

use civlink_core::Mode;

use crate::civ::{Command, encode_frame, encode_frequency, mode_to_civ};
use crate::state::SessionConfig;

/// Build a "read operating frequency" request (cmd 0x03, no payload).
///
/// The rig answers with a 0x03 frame carrying a 5-byte BCD frequency.
///
/// # Example
///
/// ```
/// use civlink_icom::commands::cmd_read_frequency;
/// use civlink_icom::state::SessionConfig;
///
/// let cmd = cmd_read_frequency(&SessionConfig::new(0x58));
/// assert_eq!(cmd, vec![0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD]);
/// ```
pub fn cmd_read_frequency(config: &SessionConfig) -> Vec<u8> {
    request(config, Command::ReadFrequency, &[])
}

/// Build a "read operating mode" request (cmd 0x04, no payload).
///
/// The rig answers with a 0x04 frame carrying a mode byte and a filter byte.
pub fn cmd_read_mode(config: &SessionConfig) -> Vec<u8> {
    request(config, Command::ReadMode, &[])
}

/// Build a "set operating frequency" request (cmd 0x05, 5-byte BCD payload).
///
/// The rig answers with an OK or NG status frame.
pub fn cmd_set_frequency(config: &SessionConfig, freq_hz: u32) -> Vec<u8> {
    request(config, Command::SetFrequency, &encode_frequency(freq_hz))
}

/// Build a "set operating mode" request (cmd 0x06, one mode byte).
///
/// No filter byte is sent, so the rig keeps its current filter.
pub fn cmd_set_mode(config: &SessionConfig, mode: Mode) -> Vec<u8> {
    request(config, Command::SetMode, &[mode_to_civ(mode)])
}

fn request(config: &SessionConfig, cmd: Command, data: &[u8]) -> Vec<u8> {
    encode_frame(
        config.rig_address,
        config.own_address,
        cmd.as_byte(),
        None,
        data,
    )
}
