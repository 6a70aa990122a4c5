//! Clipboard sync datagrams (C1): a content header plus a lightweight ACK
//! used by C6's retry-until-acked reliability sub-protocol. Unlike
//! controller and QoS datagrams, content and ACK each get their own
//! dedicated tag byte rather than sharing one with a marker bit.
//!
//! Content header, 12 bytes:
//! ```text
//! [0]    tag (0x50)
//! [1]    direction
//! [2-3]  sequence_number   (big-endian)
//! [4]    format
//! [5-7]  reserved (preserved on decode, zero on fresh encode)
//! [8-11] content_length    (big-endian)
//! ```
//!
//! ACK, 4 bytes:
//! ```text
//! [0]    tag (0x51)
//! [1]    reserved
//! [2-3]  acked_sequence_number  (big-endian)
//! ```

use crate::error::CodecError;

pub const CLIPBOARD_TAG: u8 = 0x50;
pub const CLIPBOARD_ACK_TAG: u8 = 0x51;
pub const CLIPBOARD_HEADER_SIZE: usize = 12;
pub const CLIPBOARD_ACK_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ClipboardFormat {
    Text = 1,
}

impl ClipboardFormat {
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Text),
            _ => None,
        }
    }
}

/// Which side originated a content datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ClipboardDirection {
    ViewerToHost = 0,
    HostToViewer = 1,
}

impl ClipboardDirection {
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::ViewerToHost),
            1 => Some(Self::HostToViewer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardHeader {
    pub direction: u8,
    pub seq: u16,
    pub format: u8,
    /// Reserved bytes; zero on freshly constructed headers, preserved
    /// verbatim on decode.
    pub reserved: [u8; 3],
    pub content_length: u32,
}

impl ClipboardHeader {
    pub const ENCODED_LEN: usize = CLIPBOARD_HEADER_SIZE;

    pub fn encode(&self, content: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(CLIPBOARD_HEADER_SIZE + content.len());
        buf.push(CLIPBOARD_TAG);
        buf.push(self.direction);
        buf.extend_from_slice(&self.seq.to_be_bytes());
        buf.push(self.format);
        buf.extend_from_slice(&self.reserved);
        buf.extend_from_slice(&self.content_length.to_be_bytes());
        buf.extend_from_slice(content);
        buf
    }

    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        if data.len() < CLIPBOARD_HEADER_SIZE {
            return Err(CodecError::TooShort {
                expected: CLIPBOARD_HEADER_SIZE,
                got: data.len(),
            });
        }

        let header = Self {
            direction: data[1],
            seq: u16::from_be_bytes([data[2], data[3]]),
            format: data[4],
            reserved: [data[5], data[6], data[7]],
            content_length: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
        };

        let declared = CLIPBOARD_HEADER_SIZE + header.content_length as usize;
        if data.len() < declared {
            return Err(CodecError::Truncated {
                declared,
                available: data.len(),
            });
        }

        Ok((header, &data[CLIPBOARD_HEADER_SIZE..declared]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardAck {
    pub acked_seq: u16,
}

impl ClipboardAck {
    pub const ENCODED_LEN: usize = CLIPBOARD_ACK_SIZE;

    pub fn encode(&self) -> [u8; CLIPBOARD_ACK_SIZE] {
        let mut buf = [0u8; CLIPBOARD_ACK_SIZE];
        buf[0] = CLIPBOARD_ACK_TAG;
        buf[2..4].copy_from_slice(&self.acked_seq.to_be_bytes());
        buf
    }

    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        if data.len() < CLIPBOARD_ACK_SIZE {
            return Err(CodecError::TooShort {
                expected: CLIPBOARD_ACK_SIZE,
                got: data.len(),
            });
        }
        Ok(Self {
            acked_seq: u16::from_be_bytes([data[2], data[3]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_header() {
        let header = ClipboardHeader {
            direction: ClipboardDirection::ViewerToHost as u8,
            seq: 5,
            format: ClipboardFormat::Text as u8,
            reserved: [0; 3],
            content_length: 11,
        };
        let bytes = header.encode(b"hello world");
        assert_eq!(bytes[0], CLIPBOARD_TAG);
        let (decoded, content) = ClipboardHeader::decode(&bytes).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(content, b"hello world");
    }

    #[test]
    fn truncated_content() {
        let header = ClipboardHeader {
            direction: ClipboardDirection::HostToViewer as u8,
            seq: 1,
            format: ClipboardFormat::Text as u8,
            reserved: [0; 3],
            content_length: 100,
        };
        let bytes = header.encode(b"short");
        let err = ClipboardHeader::decode(&bytes).unwrap_err();
        assert_eq!(
            err,
            CodecError::Truncated {
                declared: CLIPBOARD_HEADER_SIZE + 100,
                available: CLIPBOARD_HEADER_SIZE + 5,
            }
        );
    }

    #[test]
    fn roundtrip_ack() {
        let ack = ClipboardAck { acked_seq: 7 };
        let bytes = ack.encode();
        assert_eq!(bytes[0], CLIPBOARD_ACK_TAG);
        let decoded = ClipboardAck::decode(&bytes).unwrap();
        assert_eq!(decoded, ack);
    }

    #[test]
    fn direction_roundtrips() {
        let header = ClipboardHeader {
            direction: ClipboardDirection::HostToViewer as u8,
            seq: 1,
            format: ClipboardFormat::Text as u8,
            reserved: [0; 3],
            content_length: 0,
        };
        let bytes = header.encode(&[]);
        let (decoded, _) = ClipboardHeader::decode(&bytes).unwrap();
        assert_eq!(ClipboardDirection::from_u8(decoded.direction), Some(ClipboardDirection::HostToViewer));
    }
}
