use arboard::Clipboard;
use parking_lot::Mutex;
use tracing::warn;

/// Something that can receive clipboard text.
pub trait ClipboardBackend: Send {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// The OS clipboard. Construction never fails; an unavailable clipboard
/// (headless session) reports an error on every copy instead.
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let clipboard = Clipboard::new().ok();
        Self { clipboard }
    }

    pub fn is_available(&self) -> bool {
        self.clipboard.is_some()
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardBackend for SystemClipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        match &mut self.clipboard {
            Some(clipboard) => clipboard
                .set_text(text)
                .map_err(|e| anyhow::anyhow!("Failed to copy to clipboard: {e}")),
            None => Err(anyhow::anyhow!("Clipboard not available")),
        }
    }
}

/// Copies the wallet address and tracks the "copied" indicator.
///
/// The indicator stays set until [`ClipboardHelper::clear_copied`] is called;
/// arming a display timer is the caller's job.
pub struct ClipboardHelper {
    backend: Mutex<Box<dyn ClipboardBackend>>,
    copied: bool,
}

impl ClipboardHelper {
    pub fn new(backend: Box<dyn ClipboardBackend>) -> Self {
        Self {
            backend: Mutex::new(backend),
            copied: false,
        }
    }

    /// Write `text` to the clipboard. Returns whether it succeeded.
    pub fn copy(&mut self, text: &str) -> bool {
        match self.backend.get_mut().set_text(text) {
            Ok(()) => {
                self.copied = true;
                true
            }
            Err(e) => {
                warn!("clipboard copy failed: {e}");
                false
            }
        }
    }

    pub fn is_copied(&self) -> bool {
        self.copied
    }

    pub fn clear_copied(&mut self) {
        self.copied = false;
    }
}
