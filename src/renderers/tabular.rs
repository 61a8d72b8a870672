//! Delimited text (CSV/TSV) rendered as a single table

use super::{spawn_worker, PaneSpec, Renderer, Surface};
use crate::config::ViewerConfig;
use crate::domain::{FileTarget, PaneKey, TableData};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use crate::tui::colors;
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const EXTENSIONS: &[&str] = &[".csv", ".tsv"];

/// Delimiters considered by detection, in tie-break preference order
const CANDIDATES: &[u8] = b",\t;|";

pub struct TabularRenderer {
    target: FileTarget,
    ui: UiHandle,
    delimiter: Option<u8>,
    sample_bytes: usize,
    pane: PaneKey,
}

impl TabularRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            delimiter: config.delimiter,
            sample_bytes: config.sniff_sample_bytes,
            pane: PaneKey::new("csv-table"),
        }
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(TabularRenderer::new(target, ui, config))
}

impl Renderer for TabularRenderer {
    fn name(&self) -> &'static str {
        "table"
    }

    fn compose(&mut self) -> Surface {
        Surface::single(PaneSpec::new(self.pane.clone(), self.target.name.clone()))
    }

    fn load(&mut self) {
        let path = self.target.path.clone();
        let extension = self.target.extension.clone();
        let explicit = self.delimiter;
        let sample_bytes = self.sample_bytes;
        let pane = self.pane.clone();

        spawn_worker("table", self.ui.clone(), self.pane.clone(), move |ui| {
            let table = match load_table(&path, &extension, explicit, sample_bytes) {
                Ok(table) => table,
                Err(e) => TableData::error(e.to_string(), colors::error()),
            };
            ui.show_table(&pane, table);
            Ok(())
        });
    }
}

fn load_table(
    path: &Path,
    extension: &str,
    explicit: Option<u8>,
    sample_bytes: usize,
) -> Result<TableData> {
    let bytes = fs::read(path).map_err(|e| ViewerError::malformed("file", e))?;
    let content = String::from_utf8_lossy(&bytes);

    let delimiter = match explicit {
        Some(d) => d,
        None if extension == ".tsv" => b'\t',
        None => {
            let (sample, truncated) = read_sample(&content, sample_bytes);
            sniff_delimiter(sample, truncated).unwrap_or_else(|| count_delimiter(sample))
        }
    };
    debug!(delimiter = %(delimiter as char).escape_default(), "parsing delimited file");

    parse_table(&content, delimiter)
}

/// A prefix of at most `limit` bytes, cut on a char boundary, and whether
/// anything was cut off
fn read_sample(content: &str, limit: usize) -> (&str, bool) {
    if content.len() <= limit {
        return (content, false);
    }
    let mut end = limit;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    (&content[..end], true)
}

/// Sniffs the delimiter of a complete text first, then falls back to raw
/// character counts
pub fn detect_delimiter(text: &str) -> u8 {
    sniff_delimiter(text, false).unwrap_or_else(|| count_delimiter(text))
}

/// A candidate is consistent when it occurs the same, non-zero number of
/// times (outside quotes) on every complete non-empty line of the sample.
/// The consistent candidate with the highest per-line count wins.
///
/// When `truncated` is set the last line may be partial and is ignored.
pub fn sniff_delimiter(sample: &str, truncated: bool) -> Option<u8> {
    let mut lines: Vec<&str> = sample.lines().filter(|l| !l.trim().is_empty()).collect();
    if truncated && lines.len() > 1 && !sample.ends_with('\n') {
        lines.pop();
    }
    if lines.is_empty() {
        return None;
    }

    let mut best: Option<(u8, usize)> = None;
    for &candidate in CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_unquoted(line, candidate))
            .collect();
        let first = counts[0];
        if first == 0 || counts.iter().any(|&c| c != first) {
            continue;
        }
        if best.map_or(true, |(_, n)| first > n) {
            best = Some((candidate, first));
        }
    }

    best.map(|(d, _)| d)
}

/// Most frequent candidate over the whole sample. A partial tie goes to the
/// earliest candidate; `,` when nothing occurs or every candidate ties.
pub fn count_delimiter(sample: &str) -> u8 {
    let counts: Vec<(u8, usize)> = CANDIDATES
        .iter()
        .map(|&c| (c, sample.bytes().filter(|&b| b == c).count()))
        .collect();

    let max = counts.iter().map(|&(_, n)| n).max().unwrap_or(0);
    if max == 0 || counts.iter().all(|&(_, n)| n == max) {
        return b',';
    }

    counts
        .iter()
        .find(|&&(_, n)| n == max)
        .map_or(b',', |&(c, _)| c)
}

fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// First record is the header; blank header cells become "Col N"
pub fn parse_table(content: &str, delimiter: u8) -> Result<TableData> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers = match records.next() {
        Some(record) => record
            .map_err(|e| ViewerError::malformed("file", e))?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if h.is_empty() {
                    format!("Col {}", i + 1)
                } else {
                    h.to_string()
                }
            })
            .collect(),
        None => return Ok(TableData::default()),
    };

    let mut table = TableData::new(headers);
    for record in records {
        let record = record.map_err(|e| ViewerError::malformed("file", e))?;
        table.push_plain_row(record.iter());
    }

    Ok(table)
}
