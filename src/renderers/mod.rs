//! Format-specific renderers and the plumbing they share.
//!
//! A renderer declares its panes in [`Renderer::compose`] and starts filling
//! them in [`Renderer::load`]. Anything slow runs on the renderer's single
//! worker thread (see [`spawn_worker`]); results travel back through the
//! [`UiHandle`] it was constructed with.

pub mod archive;
pub mod audio;
pub mod document;
pub mod image;
pub mod media;
pub mod pdf;
pub mod pixels;
pub mod spreadsheet;
pub mod svg;
pub mod tabular;
pub mod text;
pub mod video;

use crate::domain::{PaneKey, TableData};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use crate::tui::colors;
use ratatui::text::{Line, Span};
use std::panic::{self, AssertUnwindSafe};
use std::process::Command;
use std::thread;
use tracing::{debug, error, warn};

pub trait Renderer: Send {
    /// Short name used in logs and the status bar
    fn name(&self) -> &'static str;

    /// Declares the display surface. Called once, before `load`.
    fn compose(&mut self) -> Surface;

    /// Starts populating the panes declared by `compose`. Called once.
    fn load(&mut self);

    /// Releases resources owned by this renderer. Must be safe to call twice.
    fn teardown(&mut self) {}
}

/// What a pane shows right now
#[derive(Debug, Clone, PartialEq)]
pub enum PaneContent {
    Loading,
    Text(Vec<Line<'static>>),
    Table(TableData),
}

#[derive(Debug, Clone)]
pub struct PaneSpec {
    pub key: PaneKey,
    pub title: String,
    pub content: PaneContent,
}

impl PaneSpec {
    pub fn new(key: PaneKey, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            content: PaneContent::Loading,
        }
    }

    pub fn with_content(mut self, content: PaneContent) -> Self {
        self.content = content;
        self
    }
}

/// The panes a renderer contributes to the screen
#[derive(Debug, Clone)]
pub struct Surface {
    pub tabbed: bool,
    pub panes: Vec<PaneSpec>,
}

impl Surface {
    pub fn single(pane: PaneSpec) -> Self {
        Self {
            tabbed: false,
            panes: vec![pane],
        }
    }

    pub fn tabbed(panes: Vec<PaneSpec>) -> Self {
        debug_assert!(
            {
                let mut keys: Vec<_> = panes.iter().map(|p| &p.key).collect();
                keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                keys.windows(2).all(|w| w[0] != w[1])
            },
            "pane keys must be unique"
        );
        Self {
            tabbed: true,
            panes,
        }
    }

    /// A single text pane showing an error, used when compose itself fails
    pub fn error(key: PaneKey, err: &ViewerError) -> Self {
        Self::single(PaneSpec::new(key, "Error").with_content(PaneContent::Text(error_lines(err))))
    }
}

/// Inline rendering of an error, with install guidance when there is any
pub fn error_lines(err: &ViewerError) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("Error: {}", err),
        colors::error(),
    ))];

    if let Some(hint) = err.hint() {
        lines.push(Line::from(""));
        for hint_line in hint.lines() {
            lines.push(Line::from(Span::styled(
                hint_line.to_string(),
                colors::warning(),
            )));
        }
    }

    lines
}

/// Runs `job` on a dedicated, named worker thread.
///
/// The thread is never joined. Errors and panics are caught here and shown
/// inline on `pane`, so a failing decode never takes the process down.
pub fn spawn_worker<F>(label: &'static str, ui: UiHandle, pane: PaneKey, job: F)
where
    F: FnOnce(&UiHandle) -> Result<()> + Send + 'static,
{
    let fallback_ui = ui.clone();
    let fallback_pane = pane.clone();

    let spawned = thread::Builder::new()
        .name(format!("quickview-{}", label))
        .spawn(move || {
            match panic::catch_unwind(AssertUnwindSafe(|| job(&ui))) {
                Ok(Ok(())) => debug!(renderer = label, "load finished"),
                Ok(Err(e)) => {
                    warn!(renderer = label, error = %e, "load failed");
                    ui.show_text(&pane, error_lines(&e));
                }
                Err(payload) => {
                    let reason = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!(renderer = label, %reason, "worker panicked");
                    ui.show_text(
                        &pane,
                        error_lines(&ViewerError::malformed("file", format!("worker panicked: {}", reason))),
                    );
                }
            }
        });

    if let Err(e) = spawned {
        error!(renderer = label, error = %e, "failed to spawn worker thread");
        fallback_ui.show_text(&fallback_pane, error_lines(&ViewerError::Io(e)));
    }
}

/// Fails with [`ViewerError::MissingTool`] when `tool -version` cannot be run
pub fn require_tool(tool: &str, hint: &str) -> Result<()> {
    match Command::new(tool).arg("-version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => {
            debug!(tool, status = ?output.status, "tool probe returned failure");
            Err(ViewerError::MissingTool {
                tool: tool.to_string(),
                hint: hint.to_string(),
            })
        }
        Err(e) => {
            debug!(tool, error = %e, "tool probe failed to spawn");
            Err(ViewerError::MissingTool {
                tool: tool.to_string(),
                hint: hint.to_string(),
            })
        }
    }
}

/// Human readable byte count
pub fn format_size(bytes: u64) -> String {
    bytesize::ByteSize(bytes).to_string()
}

/// `Label: name` header line shared by the media renderers
pub fn title_line(label: &str, name: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), colors::bold()),
        Span::styled(name.to_string(), colors::heading()),
    ])
}

pub fn info_line(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), colors::dim()))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::shell::{UiQueue, UiUpdate};

    #[test]
    fn test_error_lines_include_hint() {
        let err = ViewerError::MissingTool {
            tool: "ffmpeg".into(),
            hint: "line one\nline two".into(),
        };
        let lines = error_lines(&err);
        let text = all_text(&lines);
        assert!(text.contains("Error: ffmpeg not found"));
        assert!(text.contains("line one"));
        assert!(text.contains("line two"));
    }

    #[test]
    fn test_worker_error_becomes_inline_message() {
        let mut queue = UiQueue::new();
        let pane = PaneKey::new("main");

        spawn_worker("test", queue.handle(), pane.clone(), |_| {
            Err(ViewerError::malformed("thing", "broken"))
        });

        let updates = collect_until(&mut queue, |u| !u.is_empty());
        match &updates[0] {
            UiUpdate::Text { pane: key, lines } => {
                assert_eq!(key, &pane);
                assert!(all_text(lines).contains("Error loading thing: broken"));
            }
            other => panic!("Expected text update, got {:?}", other),
        }
    }

    #[test]
    fn test_worker_panic_is_contained() {
        let mut queue = UiQueue::new();
        spawn_worker("test", queue.handle(), PaneKey::new("main"), |_| {
            panic!("decoder exploded")
        });

        let updates = collect_until(&mut queue, |u| !u.is_empty());
        match &updates[0] {
            UiUpdate::Text { lines, .. } => {
                assert!(all_text(lines).contains("decoder exploded"));
            }
            other => panic!("Expected text update, got {:?}", other),
        }
    }

    #[test]
    fn test_require_tool_missing() {
        let err = require_tool("quickview-no-such-tool", "install it").unwrap_err();
        assert!(matches!(err, ViewerError::MissingTool { .. }));
    }

    #[test]
    fn test_format_size_nonempty() {
        assert!(!format_size(0).is_empty());
        assert!(format_size(2048).contains('2'));
    }
}
