//! Hand-off between renderer worker threads and the UI thread.
//!
//! Workers never touch display state. They hold a [`UiHandle`] and enqueue
//! [`UiUpdate`] messages; the UI thread is the single consumer of the
//! [`UiQueue`] and applies them between frames.

use crate::domain::{FrameSequence, Notification, PaneKey, Severity, TableData};
use ratatui::text::Line;
use tokio::sync::mpsc;
use tracing::debug;

/// A display mutation produced off the UI thread
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Text {
        pane: PaneKey,
        lines: Vec<Line<'static>>,
    },
    Table {
        pane: PaneKey,
        table: TableData,
    },
    Animate {
        pane: PaneKey,
        frames: FrameSequence,
    },
    Notify(Notification),
}

impl UiUpdate {
    pub fn pane(&self) -> Option<&PaneKey> {
        match self {
            UiUpdate::Text { pane, .. }
            | UiUpdate::Table { pane, .. }
            | UiUpdate::Animate { pane, .. } => Some(pane),
            UiUpdate::Notify(_) => None,
        }
    }
}

/// Display-update and notification capability handed to each renderer
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiUpdate>,
}

impl UiHandle {
    fn post(&self, update: UiUpdate) {
        // The receiver only goes away once the UI has exited
        if self.tx.send(update).is_err() {
            debug!("UI queue closed, dropping update");
        }
    }

    pub fn show_text(&self, pane: &PaneKey, lines: Vec<Line<'static>>) {
        self.post(UiUpdate::Text {
            pane: pane.clone(),
            lines,
        });
    }

    pub fn show_table(&self, pane: &PaneKey, table: TableData) {
        self.post(UiUpdate::Table {
            pane: pane.clone(),
            table,
        });
    }

    pub fn animate(&self, pane: &PaneKey, frames: FrameSequence) {
        self.post(UiUpdate::Animate {
            pane: pane.clone(),
            frames,
        });
    }

    pub fn notify(&self, severity: Severity, message: impl Into<String>) {
        self.post(UiUpdate::Notify(Notification::new(severity, message)));
    }
}

/// Single-consumer queue owned by the UI thread
#[derive(Debug)]
pub struct UiQueue {
    tx: mpsc::UnboundedSender<UiUpdate>,
    rx: mpsc::UnboundedReceiver<UiUpdate>,
}

impl UiQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> UiHandle {
        UiHandle {
            tx: self.tx.clone(),
        }
    }

    /// Takes every update queued so far without blocking
    pub fn drain(&mut self) -> Vec<UiUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// Blocks the calling thread until an update arrives or the timeout passes
    #[cfg(test)]
    pub(crate) fn recv_timeout(&mut self, timeout: std::time::Duration) -> Option<UiUpdate> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            match self.rx.try_recv() {
                Ok(update) => return Some(update),
                Err(mpsc::error::TryRecvError::Disconnected) => return None,
                Err(mpsc::error::TryRecvError::Empty) => {
                    if std::time::Instant::now() >= deadline {
                        return None;
                    }
                    std::thread::sleep(std::time::Duration::from_millis(5));
                }
            }
        }
    }
}

impl Default for UiQueue {
    fn default() -> Self {
        Self::new()
    }
}
