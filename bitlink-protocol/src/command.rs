//! Inbound command frame decoding
//!
//! Command frames are variable length; byte 0 is the opcode. The decoder
//! validates lengths up front so a short frame is dropped instead of read
//! out of bounds, and borrows its payload from the caller's buffer - a
//! decoded command never outlives the dispatch call.

use heapless::Vec;

/// Configure an edge pin: `[opcode, pin, mode, value]`
pub const CMD_PIN_CONFIG: u8 = 0x80;
/// Show text on the display: `[opcode, bytes...]`
pub const CMD_DISPLAY_TEXT: u8 = 0x81;
/// Paint the display from row masks: `[opcode, row bytes...]`
pub const CMD_DISPLAY_BITMAP: u8 = 0x82;

/// Maximum inbound frame size the transport can deliver
pub const MAX_COMMAND_SIZE: usize = 20;

/// Number of display rows a bitmap command addresses
///
/// The host protocol writes four rows starting at row 0; the bottom row
/// of the 5x5 display is never addressed by this command.
pub const MAX_BITMAP_ROWS: usize = 4;

/// Errors that can occur while decoding a command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Zero-length frame
    Empty,
    /// Frame shorter than its opcode requires
    Truncated,
    /// Opcode not part of the protocol
    UnknownOpcode,
}

/// A decoded command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Set an edge pin's mode and drive value
    ///
    /// Fields are raw wire bytes; range checking and the
    /// degrade-to-safe-value policy belong to the pin table.
    PinConfig { pin: u8, mode: u8, value: u8 },
    /// Display a text string (scrolled when longer than one byte)
    DisplayText(&'a [u8]),
    /// Paint display rows from 5-bit column masks, row byte i -> row i
    DisplayBitmap(&'a [u8]),
}

impl<'a> Command<'a> {
    /// Decode a command from raw frame bytes
    pub fn decode(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let (&opcode, payload) = bytes.split_first().ok_or(DecodeError::Empty)?;

        match opcode {
            CMD_PIN_CONFIG => {
                if payload.len() < 3 {
                    return Err(DecodeError::Truncated);
                }
                Ok(Command::PinConfig {
                    pin: payload[0],
                    mode: payload[1],
                    value: payload[2],
                })
            }
            CMD_DISPLAY_TEXT => Ok(Command::DisplayText(payload)),
            CMD_DISPLAY_BITMAP => {
                let rows = payload.len().min(MAX_BITMAP_ROWS);
                Ok(Command::DisplayBitmap(&payload[..rows]))
            }
            _ => Err(DecodeError::UnknownOpcode),
        }
    }

    /// Encode this command into frame bytes (for testing or simulation)
    pub fn encode(&self) -> Vec<u8, MAX_COMMAND_SIZE> {
        let mut frame = Vec::new();
        match self {
            Command::PinConfig { pin, mode, value } => {
                let _ = frame.extend_from_slice(&[CMD_PIN_CONFIG, *pin, *mode, *value]);
            }
            Command::DisplayText(text) => {
                let _ = frame.push(CMD_DISPLAY_TEXT);
                let _ = frame.extend_from_slice(text);
            }
            Command::DisplayBitmap(rows) => {
                let _ = frame.push(CMD_DISPLAY_BITMAP);
                let _ = frame.extend_from_slice(rows);
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pin_config() {
        let cmd = Command::decode(&[CMD_PIN_CONFIG, 1, 2, 50]).unwrap();
        assert_eq!(
            cmd,
            Command::PinConfig {
                pin: 1,
                mode: 2,
                value: 50
            }
        );
    }

    #[test]
    fn test_pin_config_truncated() {
        assert_eq!(
            Command::decode(&[CMD_PIN_CONFIG, 1, 2]),
            Err(DecodeError::Truncated)
        );
        assert_eq!(
            Command::decode(&[CMD_PIN_CONFIG]),
            Err(DecodeError::Truncated)
        );
    }

    #[test]
    fn test_pin_config_ignores_trailing_bytes() {
        // Hosts pad frames to the characteristic size
        let cmd = Command::decode(&[CMD_PIN_CONFIG, 0, 1, 100, 0, 0]).unwrap();
        assert_eq!(
            cmd,
            Command::PinConfig {
                pin: 0,
                mode: 1,
                value: 100
            }
        );
    }

    #[test]
    fn test_decode_display_text() {
        let cmd = Command::decode(b"\x81Hi").unwrap();
        assert_eq!(cmd, Command::DisplayText(b"Hi"));
    }

    #[test]
    fn test_display_text_empty_payload() {
        let cmd = Command::decode(&[CMD_DISPLAY_TEXT]).unwrap();
        assert_eq!(cmd, Command::DisplayText(&[]));
    }

    #[test]
    fn test_decode_display_bitmap() {
        let cmd = Command::decode(&[CMD_DISPLAY_BITMAP, 0b00001, 0b00010]).unwrap();
        assert_eq!(cmd, Command::DisplayBitmap(&[0b00001, 0b00010]));
    }

    #[test]
    fn test_display_bitmap_caps_rows() {
        // Known quirk: only four rows are addressable, extra row bytes
        // are dropped rather than reaching the bottom display row
        let cmd = Command::decode(&[CMD_DISPLAY_BITMAP, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(cmd, Command::DisplayBitmap(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(Command::decode(&[0x7F]), Err(DecodeError::UnknownOpcode));
        assert_eq!(
            Command::decode(&[0x83, 1, 2]),
            Err(DecodeError::UnknownOpcode)
        );
    }

    #[test]
    fn test_empty_frame() {
        assert_eq!(Command::decode(&[]), Err(DecodeError::Empty));
    }

    #[test]
    fn test_roundtrip() {
        let original = Command::PinConfig {
            pin: 2,
            mode: 3,
            value: 90,
        };
        let encoded = original.encode();
        assert_eq!(Command::decode(&encoded).unwrap(), original);
    }
}
