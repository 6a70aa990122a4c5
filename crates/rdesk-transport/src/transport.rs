//! UDP transport (C4): sends pre-built datagrams, encrypting through DTLS
//! when one is configured, and retransmits on NACK from the 512-slot ring
//! cache. Grounded on the original host's `UdpTransport`/`CachedPacket` and
//! the teacher's `run_udp_loop` for the async-socket idiom.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tracing::{debug, trace, warn};

use crate::cache::RetransmitCache;
use crate::dtls::DtlsChannel;
use crate::error::TransportError;

/// Total UDP payload budget, matching the original host's MTU target.
pub const MAX_MTU_SIZE: usize = 1400;
pub const MAX_VIDEO_PAYLOAD: usize = MAX_MTU_SIZE - rdesk_core::video::VIDEO_HEADER_SIZE;
pub const MAX_AUDIO_PAYLOAD: usize = MAX_MTU_SIZE - rdesk_core::audio::AUDIO_HEADER_SIZE;

const RECV_BUFFER_SIZE: usize = 1500;

/// Socket recv/send buffer size set before handing the socket to tokio,
/// large enough to absorb a burst of queued video packets without drops.
pub const SOCKET_BUFFER_SIZE: usize = 2 * 1024 * 1024;

pub type RecvCallback = Box<dyn Fn(&[u8], SocketAddr) + Send + Sync>;

/// One peer-to-peer UDP channel: a bound socket, a fixed peer address, and
/// an optional DTLS layer. Safe to share across tasks via `Arc`; the
/// stateful pieces (DTLS, retransmit cache, receive callback) are each
/// guarded independently rather than behind one coarse lock, since they're
/// touched on largely independent paths (send vs. receive).
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    peer_addr: SocketAddr,
    dtls: Mutex<Option<Box<dyn DtlsChannel>>>,
    cache: RetransmitCache,
    bytes_sent: AtomicU64,
    recv_cb: Mutex<Option<RecvCallback>>,
}

impl UdpTransport {
    pub fn new(socket: Arc<UdpSocket>, peer_addr: SocketAddr) -> Self {
        Self {
            socket,
            peer_addr,
            dtls: Mutex::new(None),
            cache: RetransmitCache::new(),
            bytes_sent: AtomicU64::new(0),
            recv_cb: Mutex::new(None),
        }
    }

    /// Bind a UDP socket with [`SOCKET_BUFFER_SIZE`] recv/send buffers,
    /// matching the teacher's `main.rs` socket2 setup, then wrap it for use
    /// with a fixed peer. Buffer sizing must happen before the socket is
    /// handed to tokio, since `set_nonblocking` and `UdpSocket::from_std`
    /// take ownership of the raw fd.
    pub fn bind(local_addr: SocketAddr, peer_addr: SocketAddr) -> Result<Self, TransportError> {
        let socket = Socket::new(Domain::for_address(local_addr), Type::DGRAM, Some(Protocol::UDP))?;
        let _ = socket.set_recv_buffer_size(SOCKET_BUFFER_SIZE);
        let _ = socket.set_send_buffer_size(SOCKET_BUFFER_SIZE);
        socket.bind(&local_addr.into())?;
        socket.set_nonblocking(true)?;

        let std_socket: std::net::UdpSocket = socket.into();
        let socket = Arc::new(UdpSocket::from_std(std_socket)?);

        Ok(Self::new(socket, peer_addr))
    }

    /// Install (or replace) the DTLS channel used to encrypt outgoing and
    /// decrypt incoming datagrams. Passing no channel at all (never calling
    /// this) sends everything in the clear — used in tests and whenever an
    /// outer tunnel already provides encryption.
    pub fn set_dtls(&self, channel: Box<dyn DtlsChannel>) {
        *self.dtls.lock().expect("dtls mutex poisoned") = Some(channel);
    }

    pub fn set_recv_callback(&self, cb: RecvCallback) {
        *self.recv_cb.lock().expect("recv callback mutex poisoned") = Some(cb);
    }

    pub fn total_bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    /// Send a pre-encoded datagram (header + payload already built by the
    /// caller), caching it by `seq` for NACK retransmission.
    pub async fn send_packet(&self, data: &[u8], seq: u16) -> Result<(), TransportError> {
        self.cache.insert(seq, data);
        self.send_raw(data).await
    }

    /// Handle a NACK: resend whatever of `seqs` is still in cache, skipping
    /// anything whose slot has since been overwritten (stale NACK) without
    /// treating that as an error.
    pub async fn on_nack(&self, seqs: &[u16]) {
        for &seq in seqs {
            match self.cache.get(seq) {
                Some(data) => {
                    if let Err(e) = self.send_raw(&data).await {
                        warn!(seq, error = %e, "NACK retransmit failed");
                    }
                }
                None => trace!(seq, "NACK for stale or unknown slot, skipping"),
            }
        }
    }

    async fn send_raw(&self, data: &[u8]) -> Result<(), TransportError> {
        let out = {
            let mut guard = self.dtls.lock().expect("dtls mutex poisoned");
            match guard.as_mut() {
                Some(channel) => channel.encrypt(data).map_err(TransportError::from)?,
                None => data.to_vec(),
            }
        };
        let n = self.socket.send_to(&out, self.peer_addr).await?;
        self.bytes_sent.fetch_add(n as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Receive and dispatch one incoming datagram (non-blocking from the
    /// caller's perspective: this simply awaits the next one). Decrypts
    /// through DTLS first if configured, then invokes the receive
    /// callback with the plaintext. Returns `Ok(())` once one datagram has
    /// been handled.
    pub async fn receive_one(&self) -> Result<(), TransportError> {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        let (len, src) = self.socket.recv_from(&mut buf).await?;
        buf.truncate(len);

        let plaintext = {
            let mut guard = self.dtls.lock().expect("dtls mutex poisoned");
            match guard.as_mut() {
                Some(channel) => channel.decrypt(&buf).map_err(TransportError::from)?,
                None => buf,
            }
        };

        if plaintext.is_empty() {
            debug!(%src, "dropping empty datagram after decrypt");
            return Ok(());
        }

        let cb_guard = self.recv_cb.lock().expect("recv callback mutex poisoned");
        if let Some(cb) = cb_guard.as_ref() {
            cb(&plaintext, src);
        }
        Ok(())
    }
}
