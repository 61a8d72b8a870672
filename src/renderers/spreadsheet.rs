//! Workbooks: one table per sheet, tabbed when there is more than one

use super::{error_lines, spawn_worker, PaneSpec, Renderer, Surface};
use crate::config::ViewerConfig;
use crate::domain::{unique_pane_keys, FileTarget, PaneKey, Severity, TableCell, TableData};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const EXTENSIONS: &[&str] = &[".xlsx", ".xls", ".xlsm", ".ods"];

pub struct SpreadsheetRenderer {
    target: FileTarget,
    ui: UiHandle,
    sheets: Vec<(String, PaneKey)>,
}

impl SpreadsheetRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, _config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            sheets: Vec::new(),
        }
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(SpreadsheetRenderer::new(target, ui, config))
}

/// Only reads the workbook's sheet list
fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook =
        open_workbook_auto(path).map_err(|e| ViewerError::malformed("spreadsheet", e))?;
    Ok(workbook.sheet_names())
}

impl Renderer for SpreadsheetRenderer {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn compose(&mut self) -> Surface {
        let names = match sheet_names(&self.target.path) {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "cannot read sheet list");
                return Surface::error(PaneKey::new("table-error"), &e);
            }
        };
        debug!(sheets = names.len(), "workbook opened");

        let keys = unique_pane_keys(&names);
        self.sheets = names.into_iter().zip(keys).collect();

        match self.sheets.as_slice() {
            [] => Surface::single(PaneSpec::new(PaneKey::new("table-empty"), self.target.name.clone())),
            [(name, key)] => Surface::single(PaneSpec::new(key.clone(), name.clone())),
            sheets => Surface::tabbed(
                sheets
                    .iter()
                    .map(|(name, key)| PaneSpec::new(key.clone(), name.clone()))
                    .collect(),
            ),
        }
    }

    fn load(&mut self) {
        let Some((_, first)) = self.sheets.first() else {
            return;
        };
        let path: PathBuf = self.target.path.clone();
        let sheets = self.sheets.clone();

        spawn_worker("spreadsheet", self.ui.clone(), first.clone(), move |ui| {
            let mut workbook =
                open_workbook_auto(&path).map_err(|e| ViewerError::malformed("spreadsheet", e))?;

            for (name, key) in &sheets {
                match workbook.worksheet_range(name) {
                    Ok(range) => ui.show_table(key, sheet_table(&range)),
                    Err(e) => {
                        warn!(sheet = %name, error = %e, "sheet failed to load");
                        let err = ViewerError::malformed(format!("sheet {}", name), e);
                        ui.show_text(key, error_lines(&err));
                        ui.notify(Severity::Error, err.to_string());
                    }
                }
            }
            Ok(())
        });
    }
}

/// Spreadsheet column label: A..Z, AA, AB, ...
pub fn col_name(index: usize) -> String {
    let mut n = index as i64;
    let mut name = Vec::new();
    while n >= 0 {
        name.push(b'A' + (n % 26) as u8);
        n = n / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| matches!(cell, Data::Empty))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Lettered columns; the first row is data, not a header. Blank rows dropped.
pub fn sheet_table(range: &Range<Data>) -> TableData {
    let rows: Vec<&[Data]> = range.rows().filter(|row| !is_blank_row(row)).collect();
    let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);

    let mut table = TableData::new((0..width).map(col_name).collect());
    for row in rows {
        table.push_row(row.iter().map(|c| TableCell::plain(cell_text(c))).collect());
    }
    table
}
