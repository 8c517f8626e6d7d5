//! CI-V wire format: constants, command codes, frame encoding, and the BCD
//! frequency codec.
//!
//! The Icom CI-V (Communication Interface V) protocol uses binary frames on a
//! half-duplex bus. Everything in this module is pure byte-level work with
//! no I/O and no state.
//!
//! # Frame format
//!
//! ```text
//! Outbound: 0xFE 0xFE <rig> <own=0xE0> <cmd> [<sub>] [<data>...] 0xFD
//! Inbound:  0xFE 0xFE <own> <rig>      <cmd> [<data>...]          0xFD
//! ```
//!
//! - Preamble: two `0xFE` bytes
//! - Destination and source bus addresses
//! - `cmd`: command byte, or a status code (`0xFB` OK, `0xFA` NG, `0xFC`
//!   collision) for payload-free status frames
//! - Terminator: `0xFD`
//!
//! There is no escaping. A payload byte equal to `0xFD` would end the frame
//! early; real frequency and mode payloads never contain one.

use bytes::{BufMut, BytesMut};
use civlink_core::Mode;

/// Preamble byte repeated twice at the start of every CI-V frame.
pub const PREAMBLE: u8 = 0xFE;

/// Frame terminator byte.
pub const TERMINATOR: u8 = 0xFD;

/// Standard PC controller CI-V address.
pub const CONTROLLER_ADDR: u8 = 0xE0;

/// Broadcast address. Rigs send unsolicited transceive frames here.
pub const BROADCAST_ADDR: u8 = 0x00;

/// Maximum length of a raw frame, preamble and terminator included.
pub const MAX_FRAME_LEN: usize = 20;

/// Shortest well-formed frame: preamble, two addresses, command, terminator.
pub const MIN_FRAME_LEN: usize = 6;

/// Number of payload bytes in a BCD frequency.
pub const FREQ_LEN: usize = 5;

/// Stored frequency meaning "unknown or not yet confirmed".
pub const INVALID_FREQUENCY: u32 = 0xFFFF_FFFF;

/// Stored mode byte meaning "unknown or not yet confirmed".
pub const INVALID_MODE: u8 = 0xFF;

/// CI-V command codes handled by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Unsolicited frequency broadcast (transceive), 5-byte BCD payload.
    TransferFrequency = 0x00,
    /// Unsolicited mode broadcast (transceive), mode byte + optional filter.
    TransferMode = 0x01,
    /// Read operating frequency. Request has no payload.
    ReadFrequency = 0x03,
    /// Read operating mode. Request has no payload.
    ReadMode = 0x04,
    /// Set operating frequency, 5-byte BCD payload.
    SetFrequency = 0x05,
    /// Set operating mode, mode byte payload.
    SetMode = 0x06,
}

impl Command {
    /// Look up a command by its wire byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Command::TransferFrequency),
            0x01 => Some(Command::TransferMode),
            0x03 => Some(Command::ReadFrequency),
            0x04 => Some(Command::ReadMode),
            0x05 => Some(Command::SetFrequency),
            0x06 => Some(Command::SetMode),
            _ => None,
        }
    }

    /// The wire byte for this command.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Status codes carried in the command position of payload-free frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StatusCode {
    /// Positive acknowledgement (`0xFB`).
    Ok = 0xFB,
    /// Negative acknowledgement, "not good" (`0xFA`).
    NotGood = 0xFA,
    /// Bus collision indicator (`0xFC`).
    Collision = 0xFC,
}

impl StatusCode {
    /// Look up a status code by its wire byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0xFB => Some(StatusCode::Ok),
            0xFA => Some(StatusCode::NotGood),
            0xFC => Some(StatusCode::Collision),
            _ => None,
        }
    }
}

/// Returns `true` if `byte` has a fixed meaning on the wire and cannot be
/// used as a bus address.
pub fn is_reserved(byte: u8) -> bool {
    (0xFA..=0xFE).contains(&byte)
}

/// A borrowed view of a structurally complete inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivFrame<'a> {
    /// Destination CI-V address.
    pub dst_addr: u8,
    /// Source CI-V address.
    pub src_addr: u8,
    /// Command or status byte.
    pub cmd: u8,
    /// Bytes between the command byte and the terminator.
    pub payload: &'a [u8],
}

impl<'a> CivFrame<'a> {
    /// Split a raw frame into its fields.
    ///
    /// Only the length is checked here; preamble, terminator, and address
    /// checks belong to the dispatcher. Returns `None` for frames shorter
    /// than [`MIN_FRAME_LEN`].
    pub fn parse(raw: &'a [u8]) -> Option<Self> {
        if raw.len() < MIN_FRAME_LEN {
            return None;
        }
        Some(CivFrame {
            dst_addr: raw[2],
            src_addr: raw[3],
            cmd: raw[4],
            payload: &raw[5..raw.len() - 1],
        })
    }

    /// The status code, if this is a payload-free status frame.
    pub fn status(&self) -> Option<StatusCode> {
        if self.payload.is_empty() {
            StatusCode::from_byte(self.cmd)
        } else {
            None
        }
    }
}

/// Encode a CI-V frame into raw bytes ready for transmission.
///
/// # Example
///
/// ```
/// use civlink_icom::civ::{encode_frame, CONTROLLER_ADDR};
///
/// // Read-frequency request to an IC-706MkIIG (addr 0x58)
/// let bytes = encode_frame(0x58, CONTROLLER_ADDR, 0x03, None, &[]);
/// assert_eq!(bytes, vec![0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD]);
/// ```
pub fn encode_frame(
    dst_addr: u8,
    src_addr: u8,
    cmd: u8,
    sub_cmd: Option<u8>,
    data: &[u8],
) -> Vec<u8> {
    let capacity = 4 + 1 + sub_cmd.is_some() as usize + data.len() + 1;
    let mut buf = BytesMut::with_capacity(capacity);
    buf.put_u8(PREAMBLE);
    buf.put_u8(PREAMBLE);
    buf.put_u8(dst_addr);
    buf.put_u8(src_addr);
    buf.put_u8(cmd);
    if let Some(sub) = sub_cmd {
        buf.put_u8(sub);
    }
    buf.put_slice(data);
    buf.put_u8(TERMINATOR);
    buf.to_vec()
}

/// Order in which the ten BCD nibbles of a frequency payload are read,
/// most significant digit first.
///
/// Nibble `n` lives in payload byte `n / 2`; even nibbles are the high half.
/// The last byte carries the most significant digit pair, and within each
/// byte the high nibble is the more significant digit.
const FREQ_NIBBLE_ORDER: [usize; 10] = [8, 9, 6, 7, 4, 5, 2, 3, 0, 1];

/// Decimal digit positions (of a zero-padded 10-digit string) packed into
/// each payload byte, as `(high nibble, low nibble)`. Inverse of
/// [`FREQ_NIBBLE_ORDER`].
const FREQ_DIGIT_PAIRS: [(usize, usize); FREQ_LEN] = [(8, 9), (6, 7), (4, 5), (2, 3), (0, 1)];

fn nibble(payload: &[u8; FREQ_LEN], index: usize) -> u32 {
    let byte = payload[index / 2];
    let half = if index % 2 == 0 { byte >> 4 } else { byte };
    (half & 0x0F) as u32
}

/// Decode a 5-byte BCD frequency payload.
///
/// Nibbles are not range-checked. A nibble above 9 yields a wrong value, and
/// ten digits can exceed `u32`; both wrap rather than panic.
///
/// # Example
///
/// ```
/// use civlink_icom::civ::decode_frequency;
///
/// assert_eq!(decode_frequency(&[0x00, 0x50, 0x19, 0x14, 0x00]), 14_195_000);
/// ```
pub fn decode_frequency(payload: &[u8; FREQ_LEN]) -> u32 {
    FREQ_NIBBLE_ORDER.iter().fold(0u32, |freq, &index| {
        freq.wrapping_mul(10).wrapping_add(nibble(payload, index))
    })
}

/// Encode a frequency as a 5-byte BCD payload.
///
/// Exact inverse of [`decode_frequency`] for every `u32`.
///
/// # Example
///
/// ```
/// use civlink_icom::civ::encode_frequency;
///
/// assert_eq!(encode_frequency(14_195_000), [0x00, 0x50, 0x19, 0x14, 0x00]);
/// ```
pub fn encode_frequency(freq: u32) -> [u8; FREQ_LEN] {
    // u32::MAX has ten digits, so the padded string is always exactly ten long.
    let digits = format!("{freq:010}");
    let digits = digits.as_bytes();

    let mut payload = [0u8; FREQ_LEN];
    for (byte, &(hi, lo)) in payload.iter_mut().zip(FREQ_DIGIT_PAIRS.iter()) {
        *byte = ((digits[hi] - b'0') << 4) | (digits[lo] - b'0');
    }
    payload
}

/// Translate a [`Mode`] to its CI-V mode byte.
pub fn mode_to_civ(mode: Mode) -> u8 {
    match mode {
        Mode::LSB => 0x00,
        Mode::USB => 0x01,
        Mode::AM => 0x02,
        Mode::CW => 0x03,
        Mode::RTTY => 0x04,
        Mode::FM => 0x05,
        Mode::WFM => 0x06,
        Mode::CWR => 0x07,
        Mode::RTTYR => 0x08,
    }
}

/// Translate a CI-V mode byte to a [`Mode`].
///
/// Returns `None` for bytes outside the known set, including
/// [`INVALID_MODE`].
pub fn civ_to_mode(byte: u8) -> Option<Mode> {
    match byte {
        0x00 => Some(Mode::LSB),
        0x01 => Some(Mode::USB),
        0x02 => Some(Mode::AM),
        0x03 => Some(Mode::CW),
        0x04 => Some(Mode::RTTY),
        0x05 => Some(Mode::FM),
        0x06 => Some(Mode::WFM),
        0x07 => Some(Mode::CWR),
        0x08 => Some(Mode::RTTYR),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // BCD frequency codec
    // ---------------------------------------------------------------

    #[test]
    fn bcd_14_195_mhz() {
        let bcd = encode_frequency(14_195_000);
        assert_eq!(bcd, [0x00, 0x50, 0x19, 0x14, 0x00]);
        assert_eq!(decode_frequency(&bcd), 14_195_000);
    }

    #[test]
    fn bcd_7_000_mhz() {
        let bcd = encode_frequency(7_000_000);
        assert_eq!(bcd, [0x00, 0x00, 0x00, 0x07, 0x00]);
        assert_eq!(decode_frequency(&bcd), 7_000_000);
    }

    #[test]
    fn bcd_432_100_mhz() {
        // 0432100000 => pairs 04 32 10 00 00, most significant pair last.
        let bcd = encode_frequency(432_100_000);
        assert_eq!(bcd, [0x00, 0x00, 0x10, 0x32, 0x04]);
        assert_eq!(decode_frequency(&bcd), 432_100_000);
    }

    #[test]
    fn bcd_1hz_resolution() {
        let bcd = encode_frequency(14_074_123);
        assert_eq!(bcd, [0x23, 0x41, 0x07, 0x14, 0x00]);
        assert_eq!(decode_frequency(&bcd), 14_074_123);
    }

    #[test]
    fn bcd_zero() {
        assert_eq!(encode_frequency(0), [0x00; 5]);
        assert_eq!(decode_frequency(&[0x00; 5]), 0);
    }

    #[test]
    fn bcd_u32_max_uses_all_ten_digits() {
        // 4294967295 => pairs 42 94 96 72 95
        let bcd = encode_frequency(u32::MAX);
        assert_eq!(bcd, [0x95, 0x72, 0x96, 0x94, 0x42]);
        assert_eq!(decode_frequency(&bcd), u32::MAX);
    }

    #[test]
    fn bcd_round_trip_spread() {
        let mut f: u32 = 1;
        while f < u32::MAX / 7 {
            assert_eq!(decode_frequency(&encode_frequency(f)), f, "f = {f}");
            f = f * 7 + 3;
        }
    }

    #[test]
    fn bcd_decode_transceive_payload() {
        // Payload of FE FE 00 58 03 15 73 45 01 00 FD
        assert_eq!(decode_frequency(&[0x15, 0x73, 0x45, 0x01, 0x00]), 1_457_315);
    }

    #[test]
    fn bcd_decode_non_bcd_nibble_does_not_panic() {
        // 0xAF in the lowest byte: digits 10 and 15 feed straight into the sum.
        assert_eq!(decode_frequency(&[0xAF, 0x00, 0x00, 0x00, 0x00]), 115);
    }

    #[test]
    fn bcd_decode_overflow_wraps() {
        let all_nines = decode_frequency(&[0x99; 5]);
        assert_eq!(all_nines, (9_999_999_999u64 % (1u64 << 32)) as u32);
    }

    // ---------------------------------------------------------------
    // Frame encoding and parsing
    // ---------------------------------------------------------------

    #[test]
    fn encode_read_frequency() {
        let bytes = encode_frame(0x58, CONTROLLER_ADDR, 0x03, None, &[]);
        assert_eq!(bytes, vec![0xFE, 0xFE, 0x58, 0xE0, 0x03, 0xFD]);
    }

    #[test]
    fn encode_with_sub_cmd_and_data() {
        let bytes = encode_frame(0x94, CONTROLLER_ADDR, 0x1C, Some(0x00), &[0x01]);
        assert_eq!(bytes, vec![0xFE, 0xFE, 0x94, 0xE0, 0x1C, 0x00, 0x01, 0xFD]);
    }

    #[test]
    fn parse_frame_fields() {
        let raw = [0xFE, 0xFE, 0xE0, 0x58, 0x04, 0x01, 0x02, 0xFD];
        let frame = CivFrame::parse(&raw).unwrap();
        assert_eq!(frame.dst_addr, 0xE0);
        assert_eq!(frame.src_addr, 0x58);
        assert_eq!(frame.cmd, 0x04);
        assert_eq!(frame.payload, &[0x01, 0x02]);
        assert_eq!(frame.status(), None);
    }

    #[test]
    fn parse_frame_too_short() {
        assert!(CivFrame::parse(&[0xFE, 0xFE, 0xE0, 0x58, 0xFD]).is_none());
        assert!(CivFrame::parse(&[]).is_none());
    }

    #[test]
    fn parse_status_frames() {
        let ok = [0xFE, 0xFE, 0xE0, 0x58, 0xFB, 0xFD];
        let ng = [0xFE, 0xFE, 0xE0, 0x58, 0xFA, 0xFD];
        let col = [0xFE, 0xFE, 0xE0, 0x58, 0xFC, 0xFD];
        assert_eq!(CivFrame::parse(&ok).unwrap().status(), Some(StatusCode::Ok));
        assert_eq!(CivFrame::parse(&ng).unwrap().status(), Some(StatusCode::NotGood));
        assert_eq!(
            CivFrame::parse(&col).unwrap().status(),
            Some(StatusCode::Collision)
        );
    }

    // ---------------------------------------------------------------
    // Codes and modes
    // ---------------------------------------------------------------

    #[test]
    fn command_byte_round_trip() {
        for byte in 0x00..=0xFF {
            if let Some(cmd) = Command::from_byte(byte) {
                assert_eq!(cmd.as_byte(), byte);
            }
        }
        assert_eq!(Command::from_byte(0x02), None);
        assert_eq!(Command::from_byte(0x07), None);
    }

    #[test]
    fn reserved_bytes() {
        assert!(is_reserved(PREAMBLE));
        assert!(is_reserved(TERMINATOR));
        assert!(is_reserved(0xFA));
        assert!(!is_reserved(CONTROLLER_ADDR));
        assert!(!is_reserved(INVALID_MODE));
    }

    #[test]
    fn mode_byte_mapping() {
        for (byte, mode) in Mode::ALL.iter().enumerate() {
            assert_eq!(mode_to_civ(*mode), byte as u8);
            assert_eq!(civ_to_mode(byte as u8), Some(*mode));
        }
        assert_eq!(civ_to_mode(0x17), None);
        assert_eq!(civ_to_mode(INVALID_MODE), None);
    }
}
