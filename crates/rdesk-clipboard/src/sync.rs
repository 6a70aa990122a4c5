//! Clipboard sync (C6): polls the local clipboard at 200ms intervals with a
//! 200ms send debounce, loop-suppresses changes that originated from a
//! remote update, and retries unacked sends up to three times before
//! giving up. Runs on a plain `std::thread`, matching the original's
//! dedicated monitor thread rather than an async task — there's no socket
//! readiness to await here, just a timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rdesk_core::clipboard::{ClipboardAck, ClipboardDirection, ClipboardFormat, ClipboardHeader};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::ClipboardBackend;

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(200);
const RETRY_INTERVAL: Duration = Duration::from_millis(200);
const MAX_RETRIES: u32 = 3;
/// Matches the original's `kMaxClipboardBytes`; larger pastes aren't synced.
const MAX_CLIPBOARD_BYTES: usize = 65536;

#[derive(Debug, Error)]
pub enum ClipboardSyncError {
    #[error("clipboard sync is already running")]
    AlreadyRunning,

    /// Logged at WARN and otherwise ignored — per spec.md §7 this never
    /// tears down the session.
    #[error("gave up on clipboard send (seq={seq}) after {retries} retries")]
    RetryExhausted { seq: u16, retries: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Local,
    Remote,
}

struct SharedState {
    last_text: String,
    last_origin: Origin,
    send_seq: u16,
    waiting_ack: bool,
    pending_ack_seq: u16,
    pending_packet: Vec<u8>,
    retry_count: u32,
    last_send_time: Instant,
}

pub type SendFn = Box<dyn Fn(Vec<u8>) + Send + Sync>;

/// Drives clipboard polling and the ACK/retry protocol for one peer
/// connection. Generic over the backend so tests can substitute
/// [`crate::backend::FakeBackend`] for the real OS clipboard.
pub struct ClipboardSync<B: ClipboardBackend + 'static> {
    backend: Arc<Mutex<B>>,
    send_fn: Arc<SendFn>,
    shared: Arc<Mutex<SharedState>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    /// The direction this side stamps on outgoing content datagrams —
    /// `HostToViewer` if this is the host's sync instance, `ViewerToHost`
    /// if it's the viewer's.
    local_direction: ClipboardDirection,
}

impl<B: ClipboardBackend + 'static> ClipboardSync<B> {
    pub fn new(
        backend: B,
        local_direction: ClipboardDirection,
        send_fn: impl Fn(Vec<u8>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
            send_fn: Arc::new(Box::new(send_fn)),
            shared: Arc::new(Mutex::new(SharedState {
                last_text: String::new(),
                last_origin: Origin::Local,
                send_seq: 0,
                waiting_ack: false,
                pending_ack_seq: 0,
                pending_packet: Vec::new(),
                retry_count: 0,
                last_send_time: Instant::now(),
            })),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            local_direction,
        }
    }

    /// Start the monitor thread. Seeds `last_text` from the current
    /// clipboard contents so the first poll doesn't immediately fire a
    /// send for whatever was already on the clipboard.
    pub fn start(&mut self) -> Result<(), ClipboardSyncError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ClipboardSyncError::AlreadyRunning);
        }

        {
            let initial = self.backend.lock().expect("clipboard mutex poisoned").get_text();
            let mut shared = self.shared.lock().expect("clipboard state mutex poisoned");
            shared.last_text = initial.unwrap_or_default();
            shared.last_origin = Origin::Local;
        }

        let backend = Arc::clone(&self.backend);
        let send_fn = Arc::clone(&self.send_fn);
        let shared = Arc::clone(&self.shared);
        let running = Arc::clone(&self.running);
        let local_direction = self.local_direction;

        self.handle =
            Some(thread::spawn(move || monitor_loop(backend, send_fn, shared, running, local_direction)));
        info!("clipboard sync started");
        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        info!("clipboard sync stopped");
    }

    /// Handle a decoded content datagram from the peer: apply it to the
    /// local clipboard (marking the change as remote-originated so the
    /// monitor thread doesn't echo it back) and send an ACK.
    pub fn on_content_received(&self, header: &ClipboardHeader, content: &[u8]) {
        if ClipboardFormat::from_u8(header.format) != Some(ClipboardFormat::Text) {
            warn!(format = header.format, "clipboard datagram has unrecognized format, dropping");
            return;
        }

        if header.direction == self.local_direction as u8 {
            warn!(direction = header.direction, "received a clipboard datagram tagged with our own direction, dropping");
            return;
        }

        if content.len() > MAX_CLIPBOARD_BYTES {
            warn!(len = content.len(), max = MAX_CLIPBOARD_BYTES, "clipboard content exceeds size limit, dropping");
            return;
        }

        let Ok(text) = std::str::from_utf8(content) else {
            warn!("clipboard content is not valid UTF-8, dropping");
            return;
        };

        {
            let mut shared = self.shared.lock().expect("clipboard state mutex poisoned");
            shared.last_origin = Origin::Remote;
            shared.last_text = text.to_owned();
        }

        self.backend.lock().expect("clipboard mutex poisoned").set_text(text);

        let ack = ClipboardAck { acked_seq: header.seq };
        (self.send_fn)(ack.encode().to_vec());
        debug!(seq = header.seq, len = content.len(), "clipboard content applied, ack sent");
    }

    /// Handle a decoded ACK: if it matches our pending send, stop
    /// retrying.
    pub fn on_ack_received(&self, ack: &ClipboardAck) {
        let mut shared = self.shared.lock().expect("clipboard state mutex poisoned");
        if shared.waiting_ack && shared.pending_ack_seq == ack.acked_seq {
            shared.waiting_ack = false;
            shared.pending_packet.clear();
            debug!(seq = ack.acked_seq, "clipboard ack received");
        }
    }
}

impl<B: ClipboardBackend + 'static> Drop for ClipboardSync<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn monitor_loop(
    backend: Arc<Mutex<impl ClipboardBackend>>,
    send_fn: Arc<SendFn>,
    shared: Arc<Mutex<SharedState>>,
    running: Arc<AtomicBool>,
    local_direction: ClipboardDirection,
) {
    let mut last_send_at = Instant::now();

    while running.load(Ordering::SeqCst) {
        thread::sleep(POLL_INTERVAL);
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let current = backend.lock().expect("clipboard mutex poisoned").get_text().unwrap_or_default();
        let mut state = shared.lock().expect("clipboard state mutex poisoned");

        if current != state.last_text {
            if state.last_origin == Origin::Remote {
                state.last_origin = Origin::Local;
                state.last_text = current;
            } else {
                let now = Instant::now();
                if now.duration_since(last_send_at) >= DEBOUNCE_INTERVAL {
                    last_send_at = now;
                    state.last_text = current.clone();
                    if !current.is_empty() && current.len() <= MAX_CLIPBOARD_BYTES {
                        send_local_change(&mut state, current, local_direction, &send_fn);
                    }
                }
            }
        }

        if state.waiting_ack {
            if state.retry_count < MAX_RETRIES {
                if state.last_send_time.elapsed() >= RETRY_INTERVAL {
                    debug!(
                        attempt = state.retry_count + 1,
                        max = MAX_RETRIES,
                        seq = state.pending_ack_seq,
                        "retrying clipboard send"
                    );
                    if !state.pending_packet.is_empty() {
                        send_fn(state.pending_packet.clone());
                    }
                    state.last_send_time = Instant::now();
                    state.retry_count += 1;
                }
            } else {
                warn!(
                    seq = state.pending_ack_seq,
                    retries = MAX_RETRIES,
                    "giving up on clipboard send after exhausting retries"
                );
                state.waiting_ack = false;
                state.pending_packet.clear();
            }
        }
    }
}

fn send_local_change(state: &mut SharedState, text: String, local_direction: ClipboardDirection, send_fn: &SendFn) {
    let seq = state.send_seq;
    state.send_seq = state.send_seq.wrapping_add(1);

    let header = ClipboardHeader {
        direction: local_direction as u8,
        seq,
        format: ClipboardFormat::Text as u8,
        reserved: [0; 3],
        content_length: text.len() as u32,
    };
    let packet = header.encode(text.as_bytes());

    state.pending_packet = packet.clone();
    state.pending_ack_seq = seq;
    state.waiting_ack = true;
    state.retry_count = 0;
    state.last_send_time = Instant::now();

    send_fn(packet);
    debug!(seq, len = text.len(), "sent local clipboard change");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FakeBackend;
    use std::sync::mpsc;

    fn sync_with_direction(
        direction: ClipboardDirection,
    ) -> (ClipboardSync<FakeBackend>, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let sync = ClipboardSync::new(FakeBackend::default(), direction, move |b| {
            let _ = tx.send(b);
        });
        (sync, rx)
    }

    #[test]
    fn start_twice_errors() {
        let (mut sync, _rx) = sync_with_direction(ClipboardDirection::HostToViewer);
        sync.start().unwrap();
        assert!(matches!(sync.start(), Err(ClipboardSyncError::AlreadyRunning)));
        sync.stop();
    }

    #[test]
    fn remote_content_updates_backend_and_sends_ack() {
        let (sync, rx) = sync_with_direction(ClipboardDirection::HostToViewer);

        let header = ClipboardHeader {
            direction: ClipboardDirection::ViewerToHost as u8,
            seq: 9,
            format: ClipboardFormat::Text as u8,
            reserved: [0; 3],
            content_length: 5,
        };
        sync.on_content_received(&header, b"hello");

        assert_eq!(sync.backend.lock().unwrap().content, Some("hello".to_string()));
        let sent = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        let ack = ClipboardAck::decode(&sent).unwrap();
        assert_eq!(ack.acked_seq, 9);
    }

    #[test]
    fn own_direction_content_is_dropped() {
        let (sync, rx) = sync_with_direction(ClipboardDirection::HostToViewer);

        let header = ClipboardHeader {
            direction: ClipboardDirection::HostToViewer as u8,
            seq: 9,
            format: ClipboardFormat::Text as u8,
            reserved: [0; 3],
            content_length: 5,
        };
        sync.on_content_received(&header, b"hello");

        assert_eq!(sync.backend.lock().unwrap().content, None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn matching_ack_clears_waiting_state() {
        let (sync, _rx) = sync_with_direction(ClipboardDirection::ViewerToHost);
        {
            let mut shared = sync.shared.lock().unwrap();
            shared.waiting_ack = true;
            shared.pending_ack_seq = 3;
            shared.pending_packet = vec![1, 2, 3];
        }
        sync.on_ack_received(&ClipboardAck { acked_seq: 3 });
        let shared = sync.shared.lock().unwrap();
        assert!(!shared.waiting_ack);
        assert!(shared.pending_packet.is_empty());
    }

    #[test]
    fn mismatched_ack_is_ignored() {
        let (sync, _rx) = sync_with_direction(ClipboardDirection::ViewerToHost);
        {
            let mut shared = sync.shared.lock().unwrap();
            shared.waiting_ack = true;
            shared.pending_ack_seq = 3;
        }
        sync.on_ack_received(&ClipboardAck { acked_seq: 99 });
        assert!(sync.shared.lock().unwrap().waiting_ack);
    }
}
