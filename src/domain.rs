use ratatui::style::Style;
use ratatui::text::Line;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The file being viewed. Built once from the command line and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    pub path: PathBuf,
    /// Lowercased extension including the leading dot, empty when absent
    pub extension: String,
    pub name: String,
    pub size: u64,
}

impl FileTarget {
    pub fn new(path: &Path) -> io::Result<Self> {
        let path = fs::canonicalize(path)?;
        let size = fs::metadata(&path)?.len();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(FileTarget {
            extension: normalize_extension(&path),
            path,
            name,
            size,
        })
    }
}

/// Returns `.ext` in lowercase, or an empty string for extensionless paths
pub fn normalize_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Stable identifier of a pane within one renderer's surface
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaneKey(String);

impl PaneKey {
    pub fn new(key: impl Into<String>) -> Self {
        PaneKey(key.into())
    }

    /// Turns an arbitrary sheet/page name into a safe identifier:
    /// non-alphanumerics become `_`, a leading digit gets an `s` prefix.
    pub fn sanitized(name: &str) -> Self {
        let mut key: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        if key.starts_with(|c: char| c.is_ascii_digit()) {
            key.insert(0, 's');
        }
        if key.is_empty() {
            key.push_str("sheet");
        }

        PaneKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sanitizes every name and appends `_2`, `_3`, ... to later collisions so
/// that the returned keys are pairwise distinct.
pub fn unique_pane_keys<S: AsRef<str>>(names: &[S]) -> Vec<PaneKey> {
    let mut seen = HashSet::new();
    let mut keys = Vec::with_capacity(names.len());

    for name in names {
        let base = PaneKey::sanitized(name.as_ref()).0;
        let mut candidate = base.clone();
        let mut suffix = 2;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        keys.push(PaneKey(candidate));
    }

    keys
}

/// One cell of a tabular pane
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub style: Style,
}

impl TableCell {
    pub fn plain(text: impl Into<String>) -> Self {
        TableCell {
            text: text.into(),
            style: Style::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        TableCell {
            text: text.into(),
            style,
        }
    }
}

/// Header plus rows. Rows are normalized to the header width on insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<TableCell>>,
    /// Fixed column widths; computed from content when absent
    pub widths: Option<Vec<u16>>,
}

impl TableData {
    pub fn new(headers: Vec<String>) -> Self {
        TableData {
            headers,
            rows: Vec::new(),
            widths: None,
        }
    }

    pub fn with_widths(mut self, widths: Vec<u16>) -> Self {
        self.widths = Some(widths);
        self
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Pads short rows with empty cells and truncates long ones
    pub fn push_row(&mut self, mut row: Vec<TableCell>) {
        let width = self.width();
        row.resize_with(width, || TableCell::plain(""));
        self.rows.push(row);
    }

    pub fn push_plain_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(cells.into_iter().map(TableCell::plain).collect());
    }

    /// A one-column table holding a single error row
    pub fn error(message: impl Into<String>, style: Style) -> Self {
        let mut table = TableData::new(vec!["Error".to_string()]);
        table.push_row(vec![TableCell::styled(message, style)]);
        table
    }
}

/// One rendered animation frame and how long it stays on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub lines: Vec<Line<'static>>,
    pub duration: Duration,
}

/// Non-empty, cyclic list of frames
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>) -> Option<Self> {
        if frames.is_empty() {
            None
        } else {
            Some(FrameSequence { frames })
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, index: usize) -> &Frame {
        &self.frames[index % self.frames.len()]
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.frames.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Notification {
            severity,
            message: message.into(),
        }
    }
}
