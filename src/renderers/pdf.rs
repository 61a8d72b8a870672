//! PDF text extraction through a runtime-bound libpdfium, one pane per page

use super::{spawn_worker, PaneContent, PaneSpec, Renderer, Surface};
use crate::config::ViewerConfig;
use crate::domain::{FileTarget, PaneKey, Severity};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use crate::tui::colors;
use pdfium_render::prelude::*;
use ratatui::text::{Line, Span};
use std::path::Path;
use tracing::{debug, info, warn};

pub const EXTENSIONS: &[&str] = &[".pdf"];

const PDFIUM_HINT: &str = "Install libpdfium where the dynamic loader can find it,\nor set PDFIUM_DYNAMIC_LIB_PATH to the directory that contains it.\nPrebuilt binaries: https://github.com/bblanchon/pdfium-binaries";

/// Attempts to create a Pdfium instance using explicit binding (no panic)
fn try_create_pdfium() -> Option<Pdfium> {
    // System library paths first, then PDFIUM_DYNAMIC_LIB_PATH, then bundled
    // locations next to the binary
    if let Ok(bindings) = Pdfium::bind_to_system_library() {
        return Some(Pdfium::new(bindings));
    }

    if let Ok(lib_path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        if let Ok(bindings) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&lib_path))
        {
            return Some(Pdfium::new(bindings));
        }
    }

    for dir in ["./lib/", "./"] {
        if let Ok(bindings) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        {
            return Some(Pdfium::new(bindings));
        }
    }

    None
}

pub fn is_pdfium_available() -> bool {
    try_create_pdfium().is_some()
}

fn require_pdfium() -> Result<Pdfium> {
    try_create_pdfium().ok_or_else(|| ViewerError::MissingCapability {
        capability: "PDF support (libpdfium)".to_string(),
        hint: PDFIUM_HINT.to_string(),
    })
}

fn page_count(path: &Path) -> Result<usize> {
    let pdfium = require_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| ViewerError::malformed("PDF", e))?;
    Ok(document.pages().len() as usize)
}

/// What a page yielded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageText {
    Text(String),
    /// No text but at least one embedded image, most likely a scan
    ImageOnly,
    Empty,
}

impl PageText {
    pub fn classify(text: String, has_images: bool) -> Self {
        if !text.trim().is_empty() {
            PageText::Text(text)
        } else if has_images {
            PageText::ImageOnly
        } else {
            PageText::Empty
        }
    }

    pub fn is_blank(&self) -> bool {
        !matches!(self, PageText::Text(_))
    }
}

/// Banner, blank line, then the page body
pub fn page_lines(page: &PageText, number: usize, total: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("─── Page {} of {} ───", number, total),
            colors::heading(),
        )),
        Line::from(""),
    ];

    match page {
        PageText::Text(text) => {
            lines.extend(text.lines().map(|l| Line::from(Span::raw(l.to_string()))));
        }
        PageText::ImageOnly => {
            lines.push(Line::from(Span::styled(
                "⚠ This page contains images only - text extraction not supported.",
                colors::warning(),
            )));
            lines.push(Line::from(Span::styled(
                "   Consider using OCR software for scanned documents.",
                colors::warning(),
            )));
        }
        PageText::Empty => {
            lines.push(Line::from(Span::styled("<Empty page>", colors::dim())));
        }
    }

    lines
}

/// Document-level warning once every page has been looked at
pub fn advisory(empty_pages: usize, total_pages: usize) -> Option<String> {
    if total_pages == 0 {
        None
    } else if empty_pages == total_pages {
        Some(
            "This PDF appears to be image-based (scanned). Text extraction is not supported."
                .to_string(),
        )
    } else if empty_pages * 2 > total_pages {
        Some(format!(
            "{} of {} pages have no extractable text.",
            empty_pages, total_pages
        ))
    } else {
        None
    }
}

fn extract_page(page: &PdfPage) -> PageText {
    let text = match page.text() {
        Ok(text_page) => text_page.all(),
        Err(e) => {
            debug!(error = %e, "page has no text layer");
            String::new()
        }
    };
    let has_images = page
        .objects()
        .iter()
        .any(|object| matches!(object, PdfPageObject::Image(_)));

    PageText::classify(text, has_images)
}

pub struct PdfRenderer {
    target: FileTarget,
    ui: UiHandle,
    panes: Vec<PaneKey>,
}

impl PdfRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, _config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            panes: Vec::new(),
        }
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(PdfRenderer::new(target, ui, config))
}

impl Renderer for PdfRenderer {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn compose(&mut self) -> Surface {
        let pages = match page_count(&self.target.path) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(error = %e, "cannot open PDF");
                return Surface::error(PaneKey::new("pdf-error"), &e);
            }
        };
        info!(pages, "PDF opened");

        match pages {
            0 => Surface::single(
                PaneSpec::new(PaneKey::new("pdf-single"), self.target.name.clone()).with_content(
                    PaneContent::Text(vec![Line::from(Span::styled(
                        "<Empty document>",
                        colors::dim(),
                    ))]),
                ),
            ),
            1 => {
                let key = PaneKey::new("pdf-single");
                self.panes = vec![key.clone()];
                Surface::single(PaneSpec::new(key, self.target.name.clone()))
            }
            n => {
                self.panes = (0..n)
                    .map(|i| PaneKey::new(format!("pdf-page-{}", i)))
                    .collect();
                Surface::tabbed(
                    self.panes
                        .iter()
                        .enumerate()
                        .map(|(i, key)| PaneSpec::new(key.clone(), format!("Page {}", i + 1)))
                        .collect(),
                )
            }
        }
    }

    fn load(&mut self) {
        let Some(first) = self.panes.first().cloned() else {
            return;
        };
        let path = self.target.path.clone();
        let panes = self.panes.clone();

        spawn_worker("pdf", self.ui.clone(), first, move |ui| {
            let pdfium = require_pdfium()?;
            let document = pdfium
                .load_pdf_from_file(&path, None)
                .map_err(|e| ViewerError::malformed("PDF", e))?;

            let total = panes.len();
            let mut empty_pages = 0;

            for (index, page) in document.pages().iter().enumerate().take(total) {
                let text = extract_page(&page);
                if text.is_blank() {
                    empty_pages += 1;
                }
                ui.show_text(&panes[index], page_lines(&text, index + 1, total));
            }

            if let Some(message) = advisory(empty_pages, total) {
                ui.notify(Severity::Warning, message);
            }
            Ok(())
        });
    }
}
