//! Packet-type dispatcher (C2): given a raw UDP datagram, decide which of
//! the nine datagram classes it is without fully decoding it.
//!
//! Controller, clipboard, clipboard-ack, QoS, FEC, and NACK datagrams carry
//! a dedicated leading tag byte, checked first (with a minimum-length guard
//! for the classes that have a multi-byte header). Audio and input have no
//! dedicated tag byte of their own; instead the low six bits of their first
//! byte embed the same tag value their standalone `PacketType` variant would
//! use (0x20, 0x30), packed alongside a 2-bit version in the top bits. Video
//! has neither a tag nor an embedded marker; it's the fallback once nothing
//! else matched, sniffed by checking that the second byte is a valid codec.

use crate::audio::{AUDIO_HEADER_SIZE, AUDIO_TYPE_TAG};
use crate::clipboard::{CLIPBOARD_ACK_SIZE, CLIPBOARD_ACK_TAG, CLIPBOARD_HEADER_SIZE, CLIPBOARD_TAG};
use crate::controller::{CONTROLLER_STATE_SIZE, CONTROLLER_TAG};
use crate::input::{INPUT_HEADER_SIZE, INPUT_TYPE_TAG};
use crate::qos::QOS_TAG;
use crate::video::{CodecType, VIDEO_HEADER_SIZE};

/// The dedicated tag for forward-error-correction datagrams. `identify`
/// recognizes it; no encode/decode is implemented for this class.
pub const FEC_TAG: u8 = 0xFC;

/// The dedicated tag for standalone NACK datagrams. `identify` recognizes
/// it; no encode/decode is implemented for this class.
pub const NACK_TAG: u8 = 0xFD;

const TYPE_TAG_MASK: u8 = 0x3F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Video,
    Audio,
    Input,
    Controller,
    Clipboard,
    ClipboardAck,
    Qos,
    Fec,
    Nack,
    /// Too short, or matched none of the above — the caller should drop it.
    Unknown,
}

/// Identify a raw datagram's class. Never fails: an unrecognized or
/// malformed datagram simply yields [`PacketType::Unknown`].
pub fn identify(data: &[u8]) -> PacketType {
    let Some(&first) = data.first() else {
        return PacketType::Unknown;
    };

    if first == QOS_TAG {
        return PacketType::Qos;
    }
    if first == FEC_TAG {
        return PacketType::Fec;
    }
    if first == NACK_TAG {
        return PacketType::Nack;
    }
    if first == CONTROLLER_TAG && data.len() >= CONTROLLER_STATE_SIZE {
        return PacketType::Controller;
    }
    if first == CLIPBOARD_TAG && data.len() >= CLIPBOARD_HEADER_SIZE {
        return PacketType::Clipboard;
    }
    if first == CLIPBOARD_ACK_TAG && data.len() >= CLIPBOARD_ACK_SIZE {
        return PacketType::ClipboardAck;
    }

    let type_tag = first & TYPE_TAG_MASK;
    if type_tag == AUDIO_TYPE_TAG && data.len() >= AUDIO_HEADER_SIZE {
        return PacketType::Audio;
    }
    if type_tag == INPUT_TYPE_TAG && data.len() >= INPUT_HEADER_SIZE {
        return PacketType::Input;
    }

    if data.len() >= VIDEO_HEADER_SIZE {
        if let Some(&codec_byte) = data.get(1) {
            if CodecType::from_u8(codec_byte).is_some() {
                return PacketType::Video;
            }
        }
    }

    PacketType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioHeader, AudioVerType};
    use crate::clipboard::{ClipboardAck, ClipboardDirection, ClipboardFormat, ClipboardHeader};
    use crate::controller::ControllerState;
    use crate::input::{encode_input, make_header, InputKind, InputPayload};
    use crate::qos::QosFeedback;
    use crate::video::{CodecType, VideoFlags, VideoHeader};

    #[test]
    fn identifies_qos() {
        let qos = QosFeedback {
            flags: 0,
            last_seq_received: 1,
            estimated_bw_kbps: 1,
            packet_loss_x100: 0,
            avg_jitter_us: 0,
            delay_gradient_us: 0,
            nacks: vec![],
        };
        assert_eq!(identify(&qos.encode()), PacketType::Qos);
    }

    #[test]
    fn identifies_fec_and_nack_tags() {
        assert_eq!(identify(&[FEC_TAG, 0, 0]), PacketType::Fec);
        assert_eq!(identify(&[NACK_TAG, 0, 0]), PacketType::Nack);
    }

    #[test]
    fn identifies_controller() {
        let state = ControllerState {
            slot: 0,
            seq: 1,
            buttons: 0,
            left_trigger: 0,
            right_trigger: 0,
            left_thumb_x: 0,
            left_thumb_y: 0,
            right_thumb_x: 0,
            right_thumb_y: 0,
        };
        assert_eq!(identify(&state.encode()), PacketType::Controller);
    }

    #[test]
    fn identifies_clipboard_content_and_ack() {
        let header = ClipboardHeader {
            direction: ClipboardDirection::ViewerToHost as u8,
            seq: 1,
            format: ClipboardFormat::Text as u8,
            reserved: [0; 3],
            content_length: 3,
        };
        assert_eq!(identify(&header.encode(b"abc")), PacketType::Clipboard);

        let ack = ClipboardAck { acked_seq: 1 };
        assert_eq!(identify(&ack.encode()), PacketType::ClipboardAck);
    }

    #[test]
    fn identifies_input_by_embedded_type_tag() {
        let payload = InputPayload::MouseMove { dx: 1, dy: 1, buttons: 0 };
        let header = make_header(1, InputKind::MouseMove, &payload);
        assert_eq!(identify(&encode_input(&header, &payload)), PacketType::Input);
    }

    #[test]
    fn identifies_video_by_codec_byte_sniff() {
        let header = VideoHeader {
            flags: VideoFlags::new(1, 0, false),
            codec: CodecType::H264 as u8,
            seq: 1,
            ts_us: 0,
            frame_no: 0,
            fragment_index: 0,
            fragment_total: 1,
            payload_length: 4,
        };
        assert_eq!(identify(&header.encode(&[1, 2, 3, 4])), PacketType::Video);
    }

    #[test]
    fn identifies_audio_by_embedded_type_tag() {
        let header = AudioHeader {
            ver_type: AudioVerType::new(1),
            channel_id: 0,
            seq: 1,
            ts_us: 0,
        };
        assert_eq!(identify(&header.encode(&[0u8; 100])), PacketType::Audio);
    }

    #[test]
    fn empty_and_tiny_buffers_are_unknown() {
        assert_eq!(identify(&[]), PacketType::Unknown);
        assert_eq!(identify(&[0x01, 0x02]), PacketType::Unknown);
    }

    #[test]
    fn short_controller_tagged_buffer_is_unknown() {
        assert_eq!(identify(&[CONTROLLER_TAG, 0, 0]), PacketType::Unknown);
    }
}
