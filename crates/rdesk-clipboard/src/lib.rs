//! Clipboard sync (C6): a polling monitor thread that mirrors local
//! clipboard changes to the peer and applies incoming ones, with
//! loop-suppression and an ACK/retry reliability layer on top of the
//! otherwise-unreliable transport.

pub mod backend;
pub mod sync;

pub use backend::{ArboardBackend, ClipboardBackend, FakeBackend};
pub use sync::{ClipboardSync, ClipboardSyncError};
