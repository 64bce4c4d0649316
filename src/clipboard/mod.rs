// Clipboard access and per-section "copied" indicators

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

mod exporter;

pub use exporter::ClipboardExporter;

use crate::errors::ClipboardError;

#[async_trait]
pub trait ClipboardBackend: Send + Sync {
    async fn write_text(&self, text: String) -> Result<(), ClipboardError>;
}

/// The system clipboard via `arboard`. The handle is opened per write on a
/// blocking thread since some platforms block while the clipboard owner
/// hands over the contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[async_trait]
impl ClipboardBackend for SystemClipboard {
    async fn write_text(&self, text: String) -> Result<(), ClipboardError> {
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::Write(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::Write(e.to_string()))?
    }
}

/// In-process clipboard for headless sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    failing: AtomicBool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes always fail.
    pub fn failing() -> Self {
        Self {
            contents: Mutex::new(None),
            failing: AtomicBool::new(true),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClipboardBackend for MemoryClipboard {
    async fn write_text(&self, text: String) -> Result<(), ClipboardError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClipboardError::Write("clipboard rejected write".to_string()));
        }
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| ClipboardError::Write(e.to_string()))?;
        *contents = Some(text);
        Ok(())
    }
}
