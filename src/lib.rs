//! QuickView - a terminal file viewer library
//!
//! A [`registry::Registry`] picks a renderer by file extension. The renderer
//! declares its panes, fills them from a worker thread through a
//! [`shell::UiHandle`], and the [`app::App`] applies those updates and draws
//! them with ratatui.

pub mod animation;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod registry;
pub mod renderers;
pub mod shell;
pub mod tui;

// Re-export primary types for convenience
pub use app::App;
pub use config::{ImageMode, ViewerConfig};
pub use domain::{FileTarget, Frame, FrameSequence, Notification, PaneKey, Severity, TableData};
pub use error::{Result, ViewerError};
pub use registry::Registry;
