//! Audio datagram header (C1) — 8 bytes on the wire. Audio frames are never
//! fragmented, so (unlike [`crate::video`]) there is no fragment index/total
//! or payload-length field; the payload is simply everything after the
//! header.
//!
//! ```text
//! [0]    ver_type: version(2) | type(6), type is always AUDIO (0x20)
//! [1]    channel_id
//! [2-3]  sequence_number  (big-endian)
//! [4-7]  timestamp_us     (big-endian)
//! ```
//!
//! The low six bits of `ver_type` double as the embedded [`PacketType::Audio`]
//! tag [`identify`](crate::identify::identify) masks for — there's no
//! separate codec selector in this header, unlike video's `codec` byte.

use crate::error::CodecError;

pub const AUDIO_HEADER_SIZE: usize = 8;

/// The embedded type tag carried in the low six bits of `ver_type`.
pub const AUDIO_TYPE_TAG: u8 = 0x20;

/// The bit-packed `ver_type` octet: top 2 bits are version, low 6 bits are
/// the embedded type tag (always [`AUDIO_TYPE_TAG`] for a well-formed audio
/// header, but preserved verbatim on decode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioVerType(pub u8);

impl AudioVerType {
    pub fn new(version: u8) -> Self {
        Self(((version & 0x03) << 6) | (AUDIO_TYPE_TAG & 0x3F))
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHeader {
    pub ver_type: AudioVerType,
    pub channel_id: u8,
    pub seq: u16,
    pub ts_us: u32,
}

impl AudioHeader {
    pub const ENCODED_LEN: usize = AUDIO_HEADER_SIZE;

    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(AUDIO_HEADER_SIZE + payload.len());
        buf.push(self.ver_type.0);
        buf.push(self.channel_id);
        buf.extend_from_slice(&self.seq.to_be_bytes());
        buf.extend_from_slice(&self.ts_us.to_be_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        if data.len() < AUDIO_HEADER_SIZE {
            return Err(CodecError::TooShort {
                expected: AUDIO_HEADER_SIZE,
                got: data.len(),
            });
        }

        let header = Self {
            ver_type: AudioVerType::from_raw(data[0]),
            channel_id: data[1],
            seq: u16::from_be_bytes([data[2], data[3]]),
            ts_us: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
        };

        Ok((header, &data[AUDIO_HEADER_SIZE..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AudioHeader {
        AudioHeader {
            ver_type: AudioVerType::new(1),
            channel_id: 0,
            seq: 0x00FF,
            ts_us: 0x0001_E240,
        }
    }

    #[test]
    fn roundtrip_audio_header() {
        let header = sample();
        let payload = vec![0x11; 160];
        let bytes = header.encode(&payload);

        assert_eq!(bytes.len(), AUDIO_HEADER_SIZE + 160);
        // version(1)<<6=0x40 | type_tag(0x20) -> 0x60
        assert_eq!(bytes[0], 0x60);
        assert_eq!(bytes[1], 0);
        assert_eq!(&bytes[2..4], &[0x00, 0xFF]);

        let (decoded, payload_out) = AudioHeader::decode(&bytes).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(payload_out, payload.as_slice());
    }

    #[test]
    fn too_short_is_reported() {
        let err = AudioHeader::decode(&[0u8; 3]).unwrap_err();
        assert_eq!(err, CodecError::TooShort { expected: 8, got: 3 });
    }

    #[test]
    fn ver_type_accessors() {
        let vt = AudioVerType::new(3);
        assert_eq!(vt.version(), 3);
        assert_eq!(vt.type_tag(), AUDIO_TYPE_TAG);
    }

    #[test]
    fn channel_id_preserved_on_decode() {
        let mut bytes = sample().encode(&[]);
        bytes[1] = 0x05;
        let (decoded, _) = AudioHeader::decode(&bytes).unwrap();
        assert_eq!(decoded.channel_id, 0x05);
    }
}
