use thiserror::Error;

use crate::dtls::DtlsError;

/// Transport-layer failures. Like [`DtlsError`], these are fatal: the
/// caller is expected to drop the [`crate::transport::UdpTransport`] and
/// rebuild the session rather than attempt recovery in place.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Dtls(#[from] DtlsError),
}
