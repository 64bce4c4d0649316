// Clipboard exporter
//
// Each copy target owns at most one indicator timer. Copying the same
// target again cancels the running timer and starts a fresh window; timers
// for different targets never touch each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::ClipboardBackend;
use crate::config::constants::DEFAULT_COPY_INDICATOR_MS;
use crate::document::{CopyTarget, ReviewDocument, SectionKey};

#[derive(Debug)]
struct CopyMark {
    token: u64,
    cancel: CancellationToken,
}

type Marks = Arc<Mutex<HashMap<CopyTarget, CopyMark>>>;

#[derive(Clone)]
pub struct ClipboardExporter {
    backend: Arc<dyn ClipboardBackend>,
    indicator: Duration,
    marks: Marks,
    next_token: Arc<AtomicU64>,
}

impl ClipboardExporter {
    pub fn new(backend: Arc<dyn ClipboardBackend>) -> Self {
        Self::with_indicator(backend, Duration::from_millis(DEFAULT_COPY_INDICATOR_MS))
    }

    pub fn with_indicator(backend: Arc<dyn ClipboardBackend>, indicator: Duration) -> Self {
        Self {
            backend,
            indicator,
            marks: Arc::new(Mutex::new(HashMap::new())),
            next_token: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Write `text` to the clipboard and mark `target` as copied. Failures
    /// are logged and reported as `false`; they never reach the user.
    pub async fn copy_section(&self, target: impl Into<CopyTarget>, text: impl Into<String>) -> bool {
        let target = target.into();
        match self.backend.write_text(text.into()).await {
            Ok(()) => {
                tracing::debug!("Copied {} to clipboard", target);
                self.mark(target);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to copy {}: {}", target, e);
                false
            }
        }
    }

    /// Copy every capability entry, in document order, as one write.
    pub async fn copy_all_capabilities(&self, document: &ReviewDocument) -> bool {
        let text = document.section_text(SectionKey::Capabilities);
        self.copy_section(SectionKey::Capabilities, text).await
    }

    pub fn is_copied(&self, target: &CopyTarget) -> bool {
        self.marks
            .lock()
            .map(|marks| marks.contains_key(target))
            .unwrap_or(false)
    }

    /// Targets currently showing as copied.
    pub fn copied_targets(&self) -> Vec<CopyTarget> {
        self.marks
            .lock()
            .map(|marks| marks.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop every mark and cancel its timer.
    pub fn clear(&self) {
        if let Ok(mut marks) = self.marks.lock() {
            for (_, mark) in marks.drain() {
                mark.cancel.cancel();
            }
        }
    }

    fn mark(&self, target: CopyTarget) {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        if let Ok(mut marks) = self.marks.lock() {
            let previous = marks.insert(
                target.clone(),
                CopyMark {
                    token,
                    cancel: cancel.clone(),
                },
            );
            if let Some(previous) = previous {
                previous.cancel.cancel();
            }
        }

        let marks = Arc::clone(&self.marks);
        let indicator = self.indicator;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(indicator) => {
                    if let Ok(mut marks) = marks.lock() {
                        // A newer copy of the same target owns the slot now.
                        if marks.get(&target).map(|m| m.token) == Some(token) {
                            marks.remove(&target);
                        }
                    }
                }
            }
        });
    }
}
