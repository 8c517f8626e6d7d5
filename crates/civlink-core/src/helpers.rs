//! Formatting helpers for diagnostic output.
//!
//! These are used by the protocol engine's trace logging and are handy for
//! applications that display rig state.

/// Format a frequency in hertz as a human-readable MHz string.
///
/// Returns a string like `"14.074000 MHz"` with six decimal places.
///
/// # Example
///
/// ```
/// use civlink_core::format_freq_mhz;
///
/// assert_eq!(format_freq_mhz(14_074_000), "14.074000 MHz");
/// assert_eq!(format_freq_mhz(432_100_000), "432.100000 MHz");
/// ```
pub fn format_freq_mhz(freq_hz: u32) -> String {
    let mhz = freq_hz as f64 / 1_000_000.0;
    format!("{mhz:.6} MHz")
}

/// Format raw bus bytes as space-separated, upper-case hex pairs.
///
/// Used for Rx/Tx frame dumps in trace logs.
///
/// # Example
///
/// ```
/// use civlink_core::format_hex;
///
/// assert_eq!(format_hex(&[0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD]), "FE FE 58 E0 03 FD");
/// assert_eq!(format_hex(&[]), "");
/// ```
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
