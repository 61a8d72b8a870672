//! Word documents as flowing text: paragraphs, headings and tables in document order

use super::{spawn_worker, PaneSpec, Renderer, Surface};
use crate::config::ViewerConfig;
use crate::domain::{FileTarget, PaneKey};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use crate::tui::colors;
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};
use ratatui::text::{Line, Span};
use std::fs;
use tracing::debug;

pub const EXTENSIONS: &[&str] = &[".docx"];

const RULE_WIDTH: usize = 40;

/// Content pulled out of a document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: usize, text: String },
    Paragraph(String),
    Table(Vec<Vec<String>>),
}

/// Heading level from a style such as `Heading2` or `Heading 3`; `None` for
/// body styles. A style without a trailing digit is level 1.
pub fn heading_level(style: &str) -> Option<usize> {
    if !style.to_ascii_lowercase().starts_with("heading") {
        return None;
    }
    let level = style
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as usize)
        .filter(|&d| d > 0)
        .unwrap_or(1);
    Some(level)
}

fn collect_text(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for piece in &run.children {
                    match piece {
                        RunChild::Text(text) => out.push_str(&text.text),
                        RunChild::Tab(_) => out.push('\t'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_text(&link.children, out),
            _ => {}
        }
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    collect_text(&paragraph.children, &mut text);
    text.trim().to_string()
}

fn paragraph_block(paragraph: &Paragraph) -> Option<Block> {
    let text = paragraph_text(paragraph);
    if text.is_empty() {
        return None;
    }

    let level = paragraph
        .property
        .style
        .as_ref()
        .and_then(|style| heading_level(&style.val));

    Some(match level {
        Some(level) => Block::Heading { level, text },
        None => Block::Paragraph(text),
    })
}

fn table_block(table: &Table) -> Block {
    let rows = table
        .rows
        .iter()
        .map(|TableChild::TableRow(row)| {
            row.cells
                .iter()
                .map(|TableRowChild::TableCell(cell)| {
                    cell.children
                        .iter()
                        .filter_map(|content| match content {
                            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                            _ => None,
                        })
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect()
        })
        .collect();

    Block::Table(rows)
}

/// Parses a .docx and returns its non-empty blocks in document order
pub fn extract_blocks(bytes: &[u8]) -> Result<Vec<Block>> {
    let docx = read_docx(bytes).map_err(|e| ViewerError::malformed("Word document", e))?;

    let blocks: Vec<Block> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => paragraph_block(p),
            DocumentChild::Table(t) => Some(table_block(t)),
            _ => None,
        })
        .collect();

    debug!(blocks = blocks.len(), "document parsed");
    Ok(blocks)
}

/// Headings are styled spans; document text is never interpreted as markup
pub fn render_blocks(blocks: &[Block]) -> Vec<Line<'static>> {
    if blocks.is_empty() {
        return vec![Line::from(Span::styled("<Empty document>", colors::dim()))];
    }

    let rule = || Line::from(Span::styled("─".repeat(RULE_WIDTH), colors::dim()));
    let mut lines = Vec::new();

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                lines.push(Line::from(Span::styled(
                    format!("{} {}", "#".repeat(*level), text),
                    colors::heading(),
                )));
            }
            Block::Paragraph(text) => {
                lines.extend(text.lines().map(|l| Line::from(Span::raw(l.to_string()))));
            }
            Block::Table(rows) => {
                lines.push(rule());
                for row in rows {
                    lines.push(Line::from(Span::raw(row.join(" │ "))));
                }
                lines.push(rule());
            }
        }
        lines.push(Line::from(""));
    }

    lines
}

pub struct DocumentRenderer {
    target: FileTarget,
    ui: UiHandle,
    pane: PaneKey,
}

impl DocumentRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, _config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            pane: PaneKey::new("docx-content"),
        }
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(DocumentRenderer::new(target, ui, config))
}

impl Renderer for DocumentRenderer {
    fn name(&self) -> &'static str {
        "document"
    }

    fn compose(&mut self) -> Surface {
        Surface::single(PaneSpec::new(self.pane.clone(), self.target.name.clone()))
    }

    fn load(&mut self) {
        let path = self.target.path.clone();
        let pane = self.pane.clone();

        spawn_worker("document", self.ui.clone(), self.pane.clone(), move |ui| {
            let bytes = fs::read(&path)?;
            let blocks = extract_blocks(&bytes)?;
            ui.show_text(&pane, render_blocks(&blocks));
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{all_text, collect_until};
    use super::*;
    use crate::shell::{UiQueue, UiUpdate};
    use docx_rs::{Docx, Run, TableCell, TableRow};
    use tempfile::TempDir;

    fn build_docx(docx: Docx) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    fn text_paragraph(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    mod heading_tests {
        use super::*;

        #[test]
        fn test_numbered_headings() {
            assert_eq!(heading_level("Heading1"), Some(1));
            assert_eq!(heading_level("Heading 3"), Some(3));
        }

        #[test]
        fn test_heading_without_digit_is_level_one() {
            assert_eq!(heading_level("Heading"), Some(1));
            assert_eq!(heading_level("HeadingTitle"), Some(1));
        }

        #[test]
        fn test_body_styles_are_not_headings() {
            assert_eq!(heading_level("Normal"), None);
            assert_eq!(heading_level("Title"), None);
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_empty_document_placeholder() {
            let lines = render_blocks(&[]);
            assert_eq!(all_text(&lines), "<Empty document>");
        }

        #[test]
        fn test_heading_prefix_matches_level() {
            let lines = render_blocks(&[Block::Heading {
                level: 2,
                text: "Overview".into(),
            }]);
            assert_eq!(lines[0].spans[0].content, "## Overview");
            assert_eq!(lines[0].spans[0].style, colors::heading());
        }

        #[test]
        fn test_body_text_is_unstyled() {
            let lines = render_blocks(&[Block::Paragraph("[red]literal[/red]".into())]);
            assert_eq!(lines[0].spans[0].content, "[red]literal[/red]");
            assert_eq!(lines[0].spans[0].style, ratatui::style::Style::default());
        }

        #[test]
        fn test_table_between_rules() {
            let lines = render_blocks(&[Block::Table(vec![
                vec!["a".into(), "b".into()],
                vec!["1".into(), "2".into()],
            ])]);
            let text = all_text(&lines);
            let rule = "─".repeat(RULE_WIDTH);
            assert_eq!(text, format!("{rule}\na │ b\n1 │ 2\n{rule}\n"));
        }
    }

    mod extraction_tests {
        use super::*;

        #[test]
        fn test_blocks_in_document_order() {
            let table = docx_rs::Table::new(vec![TableRow::new(vec![
                TableCell::new().add_paragraph(text_paragraph("x")),
                TableCell::new().add_paragraph(text_paragraph("y")),
            ])]);
            let docx = Docx::new()
                .add_paragraph(text_paragraph("Intro").style("Heading2"))
                .add_paragraph(text_paragraph("   "))
                .add_table(table)
                .add_paragraph(text_paragraph("Body text"));

            let blocks = extract_blocks(&build_docx(docx)).unwrap();
            assert_eq!(
                blocks,
                vec![
                    Block::Heading {
                        level: 2,
                        text: "Intro".into()
                    },
                    Block::Table(vec![vec!["x".into(), "y".into()]]),
                    Block::Paragraph("Body text".into()),
                ]
            );
        }

        #[test]
        fn test_runs_are_concatenated() {
            let paragraph = Paragraph::new()
                .add_run(Run::new().add_text("Hello, "))
                .add_run(Run::new().add_text("world"));
            let blocks = extract_blocks(&build_docx(Docx::new().add_paragraph(paragraph))).unwrap();
            assert_eq!(blocks, vec![Block::Paragraph("Hello, world".into())]);
        }

        #[test]
        fn test_not_a_docx() {
            let err = extract_blocks(b"plain bytes").unwrap_err();
            assert!(err.to_string().starts_with("Error loading Word document"));
        }
    }

    mod renderer_tests {
        use super::*;

        #[test]
        fn test_renderer_posts_document_text() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("notes.docx");
            let docx = Docx::new().add_paragraph(text_paragraph("Meeting notes"));
            std::fs::write(&path, build_docx(docx)).unwrap();

            let mut queue = UiQueue::new();
            let mut renderer =
                DocumentRenderer::new(FileTarget::new(&path).unwrap(), queue.handle(), &ViewerConfig::default());
            renderer.compose();
            renderer.load();

            let updates = collect_until(&mut queue, |u| !u.is_empty());
            match &updates[0] {
                UiUpdate::Text { lines, .. } => assert!(all_text(lines).contains("Meeting notes")),
                other => panic!("Expected document text, got {:?}", other),
            }
        }
    }
}
