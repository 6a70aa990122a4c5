//! QoS feedback datagram (C1) — 22-byte fixed packet with two NACK slots
//! inlined in the header, followed by a variable-length tail holding any
//! NACKs beyond those first two.
//!
//! ```text
//! [0]     tag (0xFB)
//! [1]     flags
//! [2-3]   last_seq_received   (big-endian)
//! [4-7]   estimated_bw_kbps   (big-endian)
//! [8-9]   packet_loss_x100    (big-endian, loss fraction * 10000, e.g. 250 = 2.50%)
//! [10-11] avg_jitter_us       (big-endian)
//! [12-15] delay_gradient_us   (big-endian, signed)
//! [16-17] nack_count          (big-endian)
//! [18-19] nack_seq_0          (big-endian, zero if nack_count < 1)
//! [20-21] nack_seq_1          (big-endian, zero if nack_count < 2)
//! [22..]  (nack_count - 2).max(0) * 2 bytes, one u16 sequence number each
//! ```
//!
//! `0xFC`/`0xFD` are the dedicated FEC and NACK-only tags; this module only
//! produces and consumes `0xFB`.

use crate::error::CodecError;

pub const QOS_TAG: u8 = 0xFB;
pub const QOS_FIXED_SIZE: usize = 22;

/// The number of NACKs carried inline in the fixed part of the packet
/// before the variable tail begins.
const INLINE_NACKS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QosFeedback {
    pub flags: u8,
    pub last_seq_received: u16,
    pub estimated_bw_kbps: u32,
    pub packet_loss_x100: u16,
    pub avg_jitter_us: u16,
    pub delay_gradient_us: i32,
    pub nacks: Vec<u16>,
}

impl QosFeedback {
    pub fn encode(&self) -> Vec<u8> {
        let tail_len = self.nacks.len().saturating_sub(INLINE_NACKS);
        let mut buf = Vec::with_capacity(QOS_FIXED_SIZE + tail_len * 2);
        buf.push(QOS_TAG);
        buf.push(self.flags);
        buf.extend_from_slice(&self.last_seq_received.to_be_bytes());
        buf.extend_from_slice(&self.estimated_bw_kbps.to_be_bytes());
        buf.extend_from_slice(&self.packet_loss_x100.to_be_bytes());
        buf.extend_from_slice(&self.avg_jitter_us.to_be_bytes());
        buf.extend_from_slice(&self.delay_gradient_us.to_be_bytes());
        buf.extend_from_slice(&(self.nacks.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.nacks.first().copied().unwrap_or(0).to_be_bytes());
        buf.extend_from_slice(&self.nacks.get(1).copied().unwrap_or(0).to_be_bytes());
        for seq in self.nacks.iter().skip(INLINE_NACKS) {
            buf.extend_from_slice(&seq.to_be_bytes());
        }
        buf
    }

    /// Decode a full QoS datagram, including its leading tag byte.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        if data.len() < QOS_FIXED_SIZE {
            return Err(CodecError::TooShort {
                expected: QOS_FIXED_SIZE,
                got: data.len(),
            });
        }

        let nack_count = u16::from_be_bytes([data[16], data[17]]) as usize;
        let tail_count = nack_count.saturating_sub(INLINE_NACKS);
        let declared = QOS_FIXED_SIZE + tail_count * 2;
        if data.len() < declared {
            return Err(CodecError::Truncated {
                declared,
                available: data.len(),
            });
        }

        let nack_seq_0 = u16::from_be_bytes([data[18], data[19]]);
        let nack_seq_1 = u16::from_be_bytes([data[20], data[21]]);

        let mut nacks = Vec::with_capacity(nack_count);
        if nack_count >= 1 {
            nacks.push(nack_seq_0);
        }
        if nack_count >= 2 {
            nacks.push(nack_seq_1);
        }
        for i in 0..tail_count {
            let off = QOS_FIXED_SIZE + i * 2;
            nacks.push(u16::from_be_bytes([data[off], data[off + 1]]));
        }

        Ok(Self {
            flags: data[1],
            last_seq_received: u16::from_be_bytes([data[2], data[3]]),
            estimated_bw_kbps: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            packet_loss_x100: u16::from_be_bytes([data[8], data[9]]),
            avg_jitter_us: u16::from_be_bytes([data[10], data[11]]),
            delay_gradient_us: i32::from_be_bytes([data[12], data[13], data[14], data[15]]),
            nacks,
        })
    }
}
