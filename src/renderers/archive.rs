//! ZIP listing: one row per entry plus a compression summary

use super::{format_size, spawn_worker, PaneSpec, Renderer, Surface};
use crate::config::ViewerConfig;
use crate::domain::{FileTarget, PaneKey, Severity, TableCell, TableData};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use crate::tui::colors;
use chrono::NaiveDate;
use std::fs::File;
use std::path::Path;
use tracing::info;
use zip::result::ZipError;
use zip::ZipArchive;

pub const EXTENSIONS: &[&str] = &[".zip", ".jar"];

const COLUMN_WIDTHS: [u16; 4] = [50, 12, 12, 20];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub compressed_size: u64,
    /// `%Y-%m-%d %H:%M`, or `-` when the stored timestamp is unusable
    pub modified: String,
    pub is_dir: bool,
}

/// Totals across every entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub count: usize,
    pub size: u64,
    pub compressed_size: u64,
}

impl ArchiveSummary {
    pub fn of(entries: &[ArchiveEntry]) -> Self {
        ArchiveSummary {
            count: entries.len(),
            size: entries.iter().map(|e| e.size).sum(),
            compressed_size: entries.iter().map(|e| e.compressed_size).sum(),
        }
    }

    /// Share of the uncompressed size saved by compression, 0 for empty archives
    pub fn saved_percent(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_size as f64 / self.size as f64) * 100.0
    }

    pub fn message(&self) -> String {
        format!(
            "{} files, {} → {} ({:.1}% saved)",
            self.count,
            format_size(self.size),
            format_size(self.compressed_size),
            self.saved_percent()
        )
    }
}

fn format_timestamp(stamp: Option<zip::DateTime>) -> String {
    stamp
        .and_then(|t| {
            NaiveDate::from_ymd_opt(t.year() as i32, t.month() as u32, t.day() as u32)?
                .and_hms_opt(t.hour() as u32, t.minute() as u32, t.second() as u32)
        })
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn corrupt_or_io(e: ZipError) -> ViewerError {
    match e {
        ZipError::Io(io) => ViewerError::Io(io),
        ZipError::InvalidArchive(reason) => ViewerError::CorruptArchive(reason.to_string()),
        other => ViewerError::malformed("archive", other),
    }
}

/// Reads the central directory; entries come back sorted by name
pub fn read_entries(path: &Path) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(corrupt_or_io)?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(corrupt_or_io)?;
        entries.push(ArchiveEntry {
            name: entry.name().to_string(),
            size: entry.size(),
            compressed_size: entry.compressed_size(),
            modified: format_timestamp(entry.last_modified()),
            is_dir: entry.is_dir(),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

pub fn entries_table(entries: &[ArchiveEntry]) -> TableData {
    let headers = ["Name", "Size", "Compressed", "Modified"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut table = TableData::new(headers).with_widths(COLUMN_WIDTHS.to_vec());

    for entry in entries {
        let name = if entry.is_dir {
            TableCell::styled(entry.name.clone(), colors::directory())
        } else {
            TableCell::plain(entry.name.clone())
        };
        table.push_row(vec![
            name,
            TableCell::plain(format_size(entry.size)),
            TableCell::plain(format_size(entry.compressed_size)),
            TableCell::plain(entry.modified.clone()),
        ]);
    }

    table
}

pub struct ArchiveRenderer {
    target: FileTarget,
    ui: UiHandle,
    pane: PaneKey,
}

impl ArchiveRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, _config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            pane: PaneKey::new("zip-table"),
        }
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(ArchiveRenderer::new(target, ui, config))
}

impl Renderer for ArchiveRenderer {
    fn name(&self) -> &'static str {
        "archive"
    }

    fn compose(&mut self) -> Surface {
        Surface::single(PaneSpec::new(self.pane.clone(), self.target.name.clone()))
    }

    fn load(&mut self) {
        let path = self.target.path.clone();
        let pane = self.pane.clone();

        spawn_worker("archive", self.ui.clone(), self.pane.clone(), move |ui| {
            let entries = read_entries(&path)?;
            let summary = ArchiveSummary::of(&entries);
            info!(entries = summary.count, "archive listed");

            ui.show_table(&pane, entries_table(&entries));
            ui.notify(Severity::Information, summary.message());
            Ok(())
        });
    }
}
