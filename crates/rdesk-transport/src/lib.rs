//! UDP transport engine: DTLS channel (C3), retransmission cache, and the
//! socket loop (C4) that sits between the wire codec in `rdesk-core` and a
//! live network peer.

pub mod cache;
pub mod dtls;
pub mod error;
pub mod transport;

pub use dtls::{DtlsChannel, DtlsError, OpensslDtlsChannel, Role};
pub use error::TransportError;
pub use transport::UdpTransport;
