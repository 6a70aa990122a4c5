//! DTLS channel (C3): encrypts/decrypts datagrams independently of the live
//! socket, so [`crate::transport::UdpTransport`] can treat DTLS as a pure
//! buffer transform. Grounded on the original host's `DtlsContext`, which
//! wraps a raw OpenSSL `SSL*` the same way.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::path::Path;

use openssl::ssl::{
    HandshakeError, MidHandshakeSslStream, Ssl, SslContext, SslContextBuilder, SslFiletype,
    SslMethod, SslStream, SslVerifyMode,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DtlsError {
    #[error("failed to build DTLS context: {0}")]
    ContextInit(#[source] openssl::error::ErrorStack),

    #[error("DTLS handshake failed: {0}")]
    Handshake(String),

    #[error("DTLS I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("operation attempted before the handshake completed")]
    NotReady,
}

/// Which side of the handshake this channel plays. The host is always the
/// DTLS server (SPEC_FULL.md Open Question Decisions: host-first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Server,
    Client,
}

/// A `Read + Write` endpoint backed by two in-memory queues instead of a
/// socket. `write()` appends to the outbound queue for the caller to drain
/// with [`BioTransport::take_outbound`]; `read()` drains bytes the caller
/// fed in with [`BioTransport::feed_inbound`], reporting `WouldBlock` when
/// nothing is buffered (DTLS's record layer is built to tolerate that).
#[derive(Debug, Default)]
struct BioTransport {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
}

impl BioTransport {
    fn feed_inbound(&mut self, data: &[u8]) {
        self.inbound.extend(data.iter().copied());
    }

    fn take_outbound(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}

impl Read for BioTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.inbound.is_empty() {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "no inbound data buffered"));
        }
        let n = self.inbound.len().min(buf.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.inbound.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl Write for BioTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

enum State {
    Uninit,
    Handshaking(MidHandshakeSslStream<BioTransport>),
    Ready(SslStream<BioTransport>),
}

/// A trait so call sites (and tests) can swap in a fake channel without
/// pulling in OpenSSL.
pub trait DtlsChannel: Send {
    /// Build the SSL object and attempt to drive the handshake as far as
    /// it will go without any peer input. Returns bytes to send out, if
    /// any (the client's ClientHello, for example).
    fn init(&mut self) -> Result<Vec<u8>, DtlsError>;

    /// Feed bytes received from the peer and advance the handshake.
    /// Returns bytes to send back. Call repeatedly (feeding `None` to
    /// retry a send-only step) until [`DtlsChannel::is_ready`] is true.
    fn handshake(&mut self, incoming: Option<&[u8]>) -> Result<Vec<u8>, DtlsError>;

    fn is_ready(&self) -> bool;

    fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, DtlsError>;

    fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, DtlsError>;
}

pub struct OpensslDtlsChannel {
    role: Role,
    ctx: SslContext,
    state: State,
}

impl OpensslDtlsChannel {
    /// Build a server-role (host) channel from a cert/key pair.
    pub fn new_server(cert_path: &Path, key_path: &Path) -> Result<Self, DtlsError> {
        let mut builder = SslContextBuilder::new(SslMethod::dtls()).map_err(DtlsError::ContextInit)?;
        builder
            .set_certificate_file(cert_path, SslFiletype::PEM)
            .map_err(DtlsError::ContextInit)?;
        builder
            .set_private_key_file(key_path, SslFiletype::PEM)
            .map_err(DtlsError::ContextInit)?;
        builder.check_private_key().map_err(DtlsError::ContextInit)?;
        builder.set_verify(SslVerifyMode::NONE);
        Ok(Self {
            role: Role::Server,
            ctx: builder.build(),
            state: State::Uninit,
        })
    }

    /// Build a client-role (viewer) channel. No local certificate is
    /// presented; the host doesn't ask for one (`SslVerifyMode::NONE`
    /// mirrors the original implementation, which pins identity via the
    /// pairing handshake rather than the X.509 chain).
    pub fn new_client() -> Result<Self, DtlsError> {
        let mut builder = SslContextBuilder::new(SslMethod::dtls()).map_err(DtlsError::ContextInit)?;
        builder.set_verify(SslVerifyMode::NONE);
        Ok(Self {
            role: Role::Client,
            ctx: builder.build(),
            state: State::Uninit,
        })
    }

    fn advance(
        &mut self,
        result: Result<SslStream<BioTransport>, HandshakeError<BioTransport>>,
    ) -> Result<Vec<u8>, DtlsError> {
        match result {
            Ok(mut stream) => {
                let out = stream.get_mut().take_outbound();
                self.state = State::Ready(stream);
                Ok(out)
            }
            Err(HandshakeError::WouldBlock(mut mid)) => {
                let out = mid.get_mut().take_outbound();
                self.state = State::Handshaking(mid);
                Ok(out)
            }
            Err(HandshakeError::Failure(mid)) => {
                let msg = mid.error().to_string();
                self.state = State::Uninit;
                Err(DtlsError::Handshake(msg))
            }
            Err(HandshakeError::SetupFailure(e)) => {
                self.state = State::Uninit;
                Err(DtlsError::ContextInit(e))
            }
        }
    }
}

impl DtlsChannel for OpensslDtlsChannel {
    fn init(&mut self) -> Result<Vec<u8>, DtlsError> {
        let ssl = Ssl::new(&self.ctx).map_err(DtlsError::ContextInit)?;
        let transport = BioTransport::default();
        let result = match self.role {
            Role::Server => ssl.accept(transport),
            Role::Client => ssl.connect(transport),
        };
        self.advance(result)
    }

    fn handshake(&mut self, incoming: Option<&[u8]>) -> Result<Vec<u8>, DtlsError> {
        match std::mem::replace(&mut self.state, State::Uninit) {
            State::Handshaking(mut mid) => {
                if let Some(data) = incoming {
                    mid.get_mut().feed_inbound(data);
                }
                let result = mid.handshake();
                self.advance(result)
            }
            ready @ State::Ready(_) => {
                self.state = ready;
                Ok(Vec::new())
            }
            State::Uninit => Err(DtlsError::NotReady),
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, DtlsError> {
        match &mut self.state {
            State::Ready(stream) => {
                stream.write_all(plaintext)?;
                Ok(stream.get_mut().take_outbound())
            }
            _ => Err(DtlsError::NotReady),
        }
    }

    fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, DtlsError> {
        match &mut self.state {
            State::Ready(stream) => {
                stream.get_mut().feed_inbound(ciphertext);
                let mut out = Vec::new();
                let mut chunk = [0u8; 2048];
                loop {
                    match stream.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => out.extend_from_slice(&chunk[..n]),
                        Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                        Err(e) => return Err(DtlsError::Io(e)),
                    }
                }
                Ok(out)
            }
            _ => Err(DtlsError::NotReady),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bio_transport_feed_and_drain() {
        let mut t = BioTransport::default();
        t.feed_inbound(&[1, 2, 3]);
        let mut buf = [0u8; 8];
        let n = t.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[1, 2, 3]);

        t.write_all(&[9, 9]).unwrap();
        assert_eq!(t.take_outbound(), vec![9, 9]);
        assert!(t.take_outbound().is_empty());
    }

    #[test]
    fn bio_transport_read_would_block_when_empty() {
        let mut t = BioTransport::default();
        let mut buf = [0u8; 4];
        let err = t.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn encrypt_before_ready_is_not_ready() {
        let mut channel = OpensslDtlsChannel::new_client().expect("client context builds");
        assert!(!channel.is_ready());
        let err = channel.encrypt(b"hello").unwrap_err();
        assert!(matches!(err, DtlsError::NotReady));
    }
}
