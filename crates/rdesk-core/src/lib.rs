//! Wire format and packet identifier for the remote-desktop streaming
//! transport protocol.
//!
//! This crate is pure codec: it turns typed Rust values into the exact
//! bytes that go out on the wire and back, and tells datagrams apart
//! ([`identify`]) without assuming anything about sockets, encryption, or
//! threads. Everything stateful — the UDP socket, DTLS, retransmission,
//! controller/clipboard session state — lives in the crates built on top
//! of this one.
//!
//! Datagrams fall into several classes, one module each: [`video`],
//! [`audio`], [`input`], [`qos`] (the feedback channel), [`controller`], and
//! [`clipboard`]. Forward-error-correction and standalone-NACK datagrams are
//! recognized by [`identify`] but have no dedicated codec module — nothing
//! in this crate encodes or decodes them yet. [`seq`] and [`version`] hold
//! small pieces shared across more than one of the above.

pub mod audio;
pub mod clipboard;
pub mod controller;
pub mod error;
pub mod identify;
pub mod input;
pub mod qos;
pub mod seq;
pub mod version;
pub mod video;

pub use error::CodecError;
pub use identify::{identify, PacketType};
