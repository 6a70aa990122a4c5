//! The external clipboard collaborator. [`ClipboardBackend`] is the seam
//! between the sync state machine and the actual OS clipboard, grounded on
//! the original's platform-specific `getClipboardText`/`setClipboardText`
//! pair — here backed by the cross-platform `arboard` crate instead of
//! hand-rolled `WinAPI`/`pbpaste` calls.

use tracing::warn;

/// Reads and writes the local system clipboard's text contents. Failures
/// are never fatal: both methods degrade to a no-op/empty result, matching
/// the original returning `""` when `OpenClipboard` fails.
pub trait ClipboardBackend: Send {
    fn get_text(&mut self) -> Option<String>;
    fn set_text(&mut self, text: &str);
}

/// An `arboard`-backed implementation.
pub struct ArboardBackend {
    clipboard: Option<arboard::Clipboard>,
}

impl ArboardBackend {
    pub fn new() -> Self {
        let clipboard = match arboard::Clipboard::new() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(error = %e, "failed to open system clipboard");
                None
            }
        };
        Self { clipboard }
    }
}

impl Default for ArboardBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardBackend for ArboardBackend {
    fn get_text(&mut self) -> Option<String> {
        self.clipboard.as_mut().and_then(|cb| cb.get_text().ok())
    }

    fn set_text(&mut self, text: &str) {
        if let Some(cb) = self.clipboard.as_mut() {
            if let Err(e) = cb.set_text(text.to_owned()) {
                warn!(error = %e, "failed to set system clipboard");
            }
        }
    }
}

/// An in-memory test double.
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub content: Option<String>,
}

impl ClipboardBackend for FakeBackend {
    fn get_text(&mut self) -> Option<String> {
        self.content.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.content = Some(text.to_owned());
    }
}
