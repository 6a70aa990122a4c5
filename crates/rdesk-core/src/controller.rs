//! Controller state datagram (C1) — 16 bytes, one full gamepad snapshot per
//! datagram. Four independent controller slots (0-3) share this wire format;
//! [`ControllerState::slot`] selects which one a given datagram targets.
//!
//! ```text
//! [0]     tag (0x40)
//! [1]     slot (0-3)
//! [2-3]   sequence_number   (big-endian)
//! [4-5]   buttons           (big-endian bitmask)
//! [6]     left_trigger
//! [7]     right_trigger
//! [8-9]   left_thumb_x      (big-endian, signed)
//! [10-11] left_thumb_y      (big-endian, signed)
//! [12-13] right_thumb_x     (big-endian, signed)
//! [14-15] right_thumb_y     (big-endian, signed)
//! ```

use crate::error::CodecError;

pub const CONTROLLER_TAG: u8 = 0x40;
pub const CONTROLLER_STATE_SIZE: usize = 16;
pub const MAX_SLOT: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub slot: u8,
    pub seq: u16,
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_thumb_x: i16,
    pub left_thumb_y: i16,
    pub right_thumb_x: i16,
    pub right_thumb_y: i16,
}

impl ControllerState {
    pub const ENCODED_LEN: usize = CONTROLLER_STATE_SIZE;

    pub fn encode(&self) -> [u8; CONTROLLER_STATE_SIZE] {
        let mut buf = [0u8; CONTROLLER_STATE_SIZE];
        buf[0] = CONTROLLER_TAG;
        buf[1] = self.slot;
        buf[2..4].copy_from_slice(&self.seq.to_be_bytes());
        buf[4..6].copy_from_slice(&self.buttons.to_be_bytes());
        buf[6] = self.left_trigger;
        buf[7] = self.right_trigger;
        buf[8..10].copy_from_slice(&self.left_thumb_x.to_be_bytes());
        buf[10..12].copy_from_slice(&self.left_thumb_y.to_be_bytes());
        buf[12..14].copy_from_slice(&self.right_thumb_x.to_be_bytes());
        buf[14..16].copy_from_slice(&self.right_thumb_y.to_be_bytes());
        buf
    }

    /// Decode a controller datagram, including its leading tag byte.
    ///
    /// `slot` is not validated against [`MAX_SLOT`] here — an out-of-range
    /// slot is a routing decision for the ingest layer (C5), not a codec
    /// error.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        if data.len() < CONTROLLER_STATE_SIZE {
            return Err(CodecError::TooShort {
                expected: CONTROLLER_STATE_SIZE,
                got: data.len(),
            });
        }

        Ok(Self {
            slot: data[1],
            seq: u16::from_be_bytes([data[2], data[3]]),
            buttons: u16::from_be_bytes([data[4], data[5]]),
            left_trigger: data[6],
            right_trigger: data[7],
            left_thumb_x: i16::from_be_bytes([data[8], data[9]]),
            left_thumb_y: i16::from_be_bytes([data[10], data[11]]),
            right_thumb_x: i16::from_be_bytes([data[12], data[13]]),
            right_thumb_y: i16::from_be_bytes([data[14], data[15]]),
        })
    }

    pub fn slot_in_range(&self) -> bool {
        self.slot <= MAX_SLOT
    }
}
