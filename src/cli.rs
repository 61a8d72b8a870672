// CLI module for argument parsing and configuration

use crate::config::{ImageMode, ViewerConfig};
use crate::error::{Result, ViewerError};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Supported file types:
  CSV/TSV   - Tabular view with navigation
  Excel     - .xlsx, .xls, .xlsm, .ods with tabbed sheets
  PDF       - Text extraction with page tabs
  Word      - .docx text and table extraction
  ZIP       - Archive contents listing
  Audio     - MP3, WAV, FLAC, OGG, M4A (waveform, needs ffmpeg)
  Images    - JPEG, PNG, GIF, BMP, WebP, SVG
  Video     - MP4, MKV, MOV, WebM (animated preview, needs ffmpeg)
  Text      - Fallback for everything else

Controls:
  q/Esc     - Quit
  ↑/↓       - Navigate rows
  ←/→       - Scroll horizontally
  PgUp/PgDn - Page navigation
  Home/End  - Jump to start/end
  Tab       - Switch sheets/pages";

/// QuickView - Terminal File Viewer
#[derive(Parser, Debug, Clone)]
#[command(name = "quickview")]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Args {
    /// File to view
    pub file: PathBuf,

    /// Field delimiter for CSV-like files (detected automatically when omitted)
    #[arg(short = 'd', long = "delimiter", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// How images are drawn
    #[arg(long = "image-mode", value_enum, default_value = "color")]
    pub image_mode: ImageModeArg,

    /// Disable syntax highlighting in the plain text view
    #[arg(long = "no-highlight", action = ArgAction::SetTrue)]
    pub no_highlight: bool,

    /// Write logs here instead of the cache directory
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ImageModeArg {
    /// Grayscale ASCII density art
    Ascii,
    /// 24-bit color half blocks
    #[default]
    Color,
}

impl From<ImageModeArg> for ImageMode {
    fn from(arg: ImageModeArg) -> Self {
        match arg {
            ImageModeArg::Ascii => ImageMode::Ascii,
            ImageModeArg::Color => ImageMode::TrueColor,
        }
    }
}

/// Accepts a single ASCII character, or the escapes `\t` and `tab`
fn parse_delimiter(value: &str) -> std::result::Result<u8, String> {
    match value {
        "\\t" | "tab" => return Ok(b'\t'),
        _ => {}
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(format!(
            "delimiter must be a single ASCII character, got '{}'",
            value
        )),
    }
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Checks the file argument before any UI is started. Only a missing
    /// path is fatal; anything unreadable is reported inside the viewer.
    pub fn validate(&self) -> Result<()> {
        if !self.file.exists() {
            return Err(ViewerError::Invocation(format!(
                "File not found: {}",
                self.file.display()
            )));
        }
        Ok(())
    }

    pub fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            delimiter: self.delimiter,
            image_mode: self.image_mode.into(),
            highlight: !self.no_highlight,
            ..ViewerConfig::default()
        }
    }
}
