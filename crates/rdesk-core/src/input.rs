//! Input datagram header (C1) — 4 bytes, followed by one of four
//! variable-size payload variants selected by [`InputHeader::input_type`].
//!
//! ```text
//! [0]    ver_type: version(2) | type(6), type is always INPUT (0x30)
//! [1]    input_type
//! [2-3]  payload_length   (big-endian)
//! ```
//!
//! `payload_length` is the declared size of the trailing payload, checked
//! against the buffer the same way [`crate::qos`] and [`crate::clipboard`]
//! check their variable tails. Unrecognized `input_type` bytes are not
//! rejected by the header decode itself; [`InputPayload::decode`] surfaces
//! them as [`InputPayload::Unknown`] with the raw trailing bytes so a caller
//! can still forward or log the datagram.

use crate::error::CodecError;

pub const INPUT_HEADER_SIZE: usize = 4;

/// The embedded type tag carried in the low six bits of `ver_type`.
pub const INPUT_TYPE_TAG: u8 = 0x30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InputKind {
    MouseMove = 1,
    MouseButton = 2,
    Key = 3,
    Scroll = 4,
}

impl InputKind {
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::MouseMove),
            2 => Some(Self::MouseButton),
            3 => Some(Self::Key),
            4 => Some(Self::Scroll),
            _ => None,
        }
    }
}

/// The bit-packed `ver_type` octet: top 2 bits are version, low 6 bits are
/// the embedded type tag (always [`INPUT_TYPE_TAG`] for a well-formed input
/// header, but preserved verbatim on decode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputVerType(pub u8);

impl InputVerType {
    pub fn new(version: u8) -> Self {
        Self(((version & 0x03) << 6) | (INPUT_TYPE_TAG & 0x3F))
    }

    pub fn from_raw(byte: u8) -> Self {
        Self(byte)
    }

    pub fn version(self) -> u8 {
        (self.0 >> 6) & 0x03
    }

    pub fn type_tag(self) -> u8 {
        self.0 & 0x3F
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputHeader {
    pub ver_type: InputVerType,
    pub input_type: u8,
    pub payload_length: u16,
}

impl InputHeader {
    pub const ENCODED_LEN: usize = INPUT_HEADER_SIZE;

    pub fn encode(&self) -> [u8; INPUT_HEADER_SIZE] {
        let mut buf = [0u8; INPUT_HEADER_SIZE];
        buf[0] = self.ver_type.0;
        buf[1] = self.input_type;
        buf[2..4].copy_from_slice(&self.payload_length.to_be_bytes());
        buf
    }

    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        if data.len() < INPUT_HEADER_SIZE {
            return Err(CodecError::TooShort {
                expected: INPUT_HEADER_SIZE,
                got: data.len(),
            });
        }
        let header = Self {
            ver_type: InputVerType::from_raw(data[0]),
            input_type: data[1],
            payload_length: u16::from_be_bytes([data[2], data[3]]),
        };

        let declared = INPUT_HEADER_SIZE + header.payload_length as usize;
        if data.len() < declared {
            return Err(CodecError::Truncated {
                declared,
                available: data.len(),
            });
        }

        Ok((header, &data[INPUT_HEADER_SIZE..declared]))
    }
}

/// Button/key press state, shared by [`InputPayload::MouseButton`] and
/// [`InputPayload::Key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressState {
    Released,
    Pressed,
}

impl PressState {
    fn to_u8(self) -> u8 {
        match self {
            Self::Released => 0,
            Self::Pressed => 1,
        }
    }

    fn from_u8(b: u8) -> Self {
        if b == 0 {
            Self::Released
        } else {
            Self::Pressed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPayload {
    /// Relative pointer motion, in device units, plus the currently-held
    /// button bitmask.
    MouseMove { dx: i16, dy: i16, buttons: u8 },
    MouseButton { button: u8, state: PressState },
    Key { keycode: u16, state: PressState, modifiers: u8 },
    Scroll { dx: i16, dy: i16 },
    /// An unrecognized [`InputHeader::input_type`] — the raw trailing bytes
    /// are kept so the datagram can still be forwarded or logged.
    Unknown(Vec<u8>),
}

const MOUSE_MOVE_SIZE: usize = 5;
const MOUSE_BUTTON_SIZE: usize = 2;
const KEY_SIZE: usize = 4;
const SCROLL_SIZE: usize = 4;

impl InputPayload {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::MouseMove { dx, dy, buttons } => {
                let mut buf = Vec::with_capacity(MOUSE_MOVE_SIZE);
                buf.extend_from_slice(&dx.to_be_bytes());
                buf.extend_from_slice(&dy.to_be_bytes());
                buf.push(*buttons);
                buf
            }
            Self::Scroll { dx, dy } => {
                let mut buf = Vec::with_capacity(SCROLL_SIZE);
                buf.extend_from_slice(&dx.to_be_bytes());
                buf.extend_from_slice(&dy.to_be_bytes());
                buf
            }
            Self::MouseButton { button, state } => {
                vec![*button, state.to_u8()]
            }
            Self::Key { keycode, state, modifiers } => {
                let mut buf = Vec::with_capacity(KEY_SIZE);
                buf.extend_from_slice(&keycode.to_be_bytes());
                buf.push(state.to_u8());
                buf.push(*modifiers);
                buf
            }
            Self::Unknown(raw) => raw.clone(),
        }
    }

    pub fn decode(input_type: u8, data: &[u8]) -> Result<Self, CodecError> {
        let Some(parsed_kind) = InputKind::from_u8(input_type) else {
            return Ok(Self::Unknown(data.to_vec()));
        };

        let expected = match parsed_kind {
            InputKind::MouseMove => MOUSE_MOVE_SIZE,
            InputKind::MouseButton => MOUSE_BUTTON_SIZE,
            InputKind::Key => KEY_SIZE,
            InputKind::Scroll => SCROLL_SIZE,
        };
        if data.len() < expected {
            return Err(CodecError::TooShort { expected, got: data.len() });
        }

        Ok(match parsed_kind {
            InputKind::MouseMove => Self::MouseMove {
                dx: i16::from_be_bytes([data[0], data[1]]),
                dy: i16::from_be_bytes([data[2], data[3]]),
                buttons: data[4],
            },
            InputKind::Scroll => Self::Scroll {
                dx: i16::from_be_bytes([data[0], data[1]]),
                dy: i16::from_be_bytes([data[2], data[3]]),
            },
            InputKind::MouseButton => Self::MouseButton {
                button: data[0],
                state: PressState::from_u8(data[1]),
            },
            InputKind::Key => Self::Key {
                keycode: u16::from_be_bytes([data[0], data[1]]),
                state: PressState::from_u8(data[2]),
                modifiers: data[3],
            },
        })
    }
}

/// Build a header for `payload`, filling in `payload_length` from its
/// encoded size.
pub fn make_header(version: u8, kind: InputKind, payload: &InputPayload) -> InputHeader {
    InputHeader {
        ver_type: InputVerType::new(version),
        input_type: kind as u8,
        payload_length: payload.encode().len() as u16,
    }
}

/// Encode a full input datagram: header followed by its payload.
pub fn encode_input(header: &InputHeader, payload: &InputPayload) -> Vec<u8> {
    let encoded_payload = payload.encode();
    let mut buf = Vec::with_capacity(INPUT_HEADER_SIZE + encoded_payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(&encoded_payload);
    buf
}

/// Decode a full input datagram.
pub fn decode_input(data: &[u8]) -> Result<(InputHeader, InputPayload), CodecError> {
    let (header, rest) = InputHeader::decode(data)?;
    let payload = InputPayload::decode(header.input_type, rest)?;
    Ok((header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(kind: InputKind, payload: InputPayload) -> (InputHeader, InputPayload) {
        let header = make_header(1, kind, &payload);
        let bytes = encode_input(&header, &payload);
        decode_input(&bytes).unwrap()
    }

    #[test]
    fn roundtrip_mouse_move() {
        let payload = InputPayload::MouseMove { dx: -5, dy: 12, buttons: 0x01 };
        let (dh, dp) = roundtrip(InputKind::MouseMove, payload.clone());
        assert_eq!(dh.input_type, InputKind::MouseMove as u8);
        assert_eq!(dh.payload_length as usize, MOUSE_MOVE_SIZE);
        assert_eq!(dp, payload);
    }

    #[test]
    fn roundtrip_mouse_button() {
        let payload = InputPayload::MouseButton { button: 2, state: PressState::Pressed };
        let (_, dp) = roundtrip(InputKind::MouseButton, payload.clone());
        assert_eq!(dp, payload);
    }

    #[test]
    fn roundtrip_key() {
        let payload = InputPayload::Key { keycode: 0x41, state: PressState::Released, modifiers: 0x02 };
        let (_, dp) = roundtrip(InputKind::Key, payload.clone());
        assert_eq!(dp, payload);
    }

    #[test]
    fn roundtrip_scroll() {
        let payload = InputPayload::Scroll { dx: 0, dy: -3 };
        let (_, dp) = roundtrip(InputKind::Scroll, payload.clone());
        assert_eq!(dp, payload);
    }

    #[test]
    fn unknown_kind_preserves_raw_bytes() {
        let header = InputHeader {
            ver_type: InputVerType::new(1),
            input_type: 0xEE,
            payload_length: 5,
        };
        let mut bytes = header.encode().to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4, 5]);
        let (_, payload) = decode_input(&bytes).unwrap();
        assert_eq!(payload, InputPayload::Unknown(vec![1, 2, 3, 4, 5]));
    }

    #[test]
    fn too_short_header() {
        let err = decode_input(&[0u8; 2]).unwrap_err();
        assert_eq!(err, CodecError::TooShort { expected: 4, got: 2 });
    }

    #[test]
    fn too_short_payload() {
        let header = InputHeader {
            ver_type: InputVerType::new(1),
            input_type: InputKind::Key as u8,
            payload_length: 4,
        };
        let bytes = header.encode();
        let err = decode_input(&bytes).unwrap_err();
        assert_eq!(
            err,
            CodecError::Truncated { declared: INPUT_HEADER_SIZE + 4, available: INPUT_HEADER_SIZE }
        );
    }
}
