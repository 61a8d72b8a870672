//! Fallback renderer: any file as numbered, optionally highlighted text

use super::{spawn_worker, PaneSpec, Renderer, Surface};
use crate::config::ViewerConfig;
use crate::domain::{FileTarget, PaneKey};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use crate::tui::colors;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::fs;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use tracing::debug;

const THEME: &str = "base16-ocean.dark";
const TAB: &str = "    ";

fn gutter(number: usize) -> Span<'static> {
    Span::styled(format!("{:5} │ ", number), colors::dim())
}

fn convert_style(style: syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

/// Numbered lines without colors
pub fn plain_lines(content: &str) -> Vec<Line<'static>> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| Line::from(vec![gutter(i + 1), Span::raw(line.replace('\t', TAB))]))
        .collect()
}

fn find_syntax<'a>(set: &'a SyntaxSet, extension: &str, content: &str) -> Option<&'a SyntaxReference> {
    let by_extension = set.find_syntax_by_extension(extension.trim_start_matches('.'));
    let by_first_line = || content.lines().next().and_then(|l| set.find_syntax_by_first_line(l));
    by_extension
        .or_else(by_first_line)
        .filter(|s| s.name != set.find_syntax_plain_text().name)
}

/// Highlights the first `limit` lines; the rest stay plain.
/// Returns `None` when no grammar matches.
pub fn highlighted_lines(content: &str, extension: &str, limit: usize) -> Result<Option<Vec<Line<'static>>>> {
    let syntax_set = SyntaxSet::load_defaults_newlines();
    let Some(syntax) = find_syntax(&syntax_set, extension, content) else {
        return Ok(None);
    };
    debug!(syntax = %syntax.name, "highlighting");

    let theme_set = ThemeSet::load_defaults();
    let theme = theme_set
        .themes
        .get(THEME)
        .ok_or_else(|| ViewerError::malformed("theme", format!("{} missing", THEME)))?;
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut lines = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if i >= limit {
            lines.push(Line::from(vec![gutter(i + 1), Span::raw(line.replace('\t', TAB))]));
            continue;
        }

        let with_newline = format!("{}\n", line);
        let ranges = highlighter
            .highlight_line(&with_newline, &syntax_set)
            .map_err(|e| ViewerError::malformed("file", format!("Syntax highlighting error: {}", e)))?;

        let mut spans = vec![gutter(i + 1)];
        for (style, text) in ranges {
            let text = text.trim_end_matches('\n').replace('\t', TAB);
            if !text.is_empty() {
                spans.push(Span::styled(text, convert_style(style)));
            }
        }
        lines.push(Line::from(spans));
    }

    Ok(Some(lines))
}

pub struct TextRenderer {
    target: FileTarget,
    ui: UiHandle,
    highlight: bool,
    line_limit: usize,
    pane: PaneKey,
}

impl TextRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            highlight: config.highlight,
            line_limit: config.highlight_line_limit,
            pane: PaneKey::new("text-content"),
        }
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(TextRenderer::new(target, ui, config))
}

impl Renderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn compose(&mut self) -> Surface {
        Surface::single(PaneSpec::new(self.pane.clone(), self.target.name.clone()))
    }

    fn load(&mut self) {
        let path = self.target.path.clone();
        let extension = self.target.extension.clone();
        let highlight = self.highlight;
        let limit = self.line_limit;
        let pane = self.pane.clone();

        spawn_worker("text", self.ui.clone(), self.pane.clone(), move |ui| {
            let bytes = fs::read(&path).map_err(|e| ViewerError::malformed("file", e))?;
            let content = String::from_utf8_lossy(&bytes);

            let lines = if highlight {
                highlighted_lines(&content, &extension, limit)?
            } else {
                None
            };
            ui.show_text(&pane, lines.unwrap_or_else(|| plain_lines(&content)));
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{collect_until, line_text};
    use super::*;
    use crate::shell::{UiQueue, UiUpdate};
    use tempfile::TempDir;

    mod plain_tests {
        use super::*;

        #[test]
        fn test_line_numbers() {
            let lines = plain_lines("first\nsecond\n");
            assert_eq!(lines.len(), 2);
            assert_eq!(line_text(&lines[0]), "    1 │ first");
            assert_eq!(line_text(&lines[1]), "    2 │ second");
            assert_eq!(lines[0].spans[0].style, colors::dim());
        }

        #[test]
        fn test_markup_characters_stay_literal() {
            let lines = plain_lines("[bold]x[/bold]");
            assert_eq!(lines[0].spans[1].content, "[bold]x[/bold]");
            assert_eq!(lines[0].spans[1].style, Style::default());
        }

        #[test]
        fn test_tabs_expanded() {
            let lines = plain_lines("a\tb");
            assert_eq!(lines[0].spans[1].content, "a    b");
        }
    }

    mod highlight_tests {
        use super::*;

        #[test]
        fn test_rust_is_highlighted() {
            let lines = highlighted_lines("fn main() {}\n", ".rs", 100).unwrap().unwrap();
            assert_eq!(lines.len(), 1);
            assert_eq!(line_text(&lines[0]), "    1 │ fn main() {}");
            assert!(lines[0].spans.len() > 2);
            assert!(matches!(lines[0].spans[1].style.fg, Some(Color::Rgb(..))));
        }

        #[test]
        fn test_unknown_extension_has_no_grammar() {
            assert!(highlighted_lines("hello", ".qqq", 100).unwrap().is_none());
        }

        #[test]
        fn test_shebang_selects_grammar() {
            let lines = highlighted_lines("#!/bin/bash\necho hi\n", "", 100).unwrap();
            assert!(lines.is_some());
        }

        #[test]
        fn test_lines_past_limit_are_plain() {
            let lines = highlighted_lines("let a = 1;\nlet b = 2;\n", ".rs", 1).unwrap().unwrap();
            assert_eq!(lines[1].spans.len(), 2);
            assert_eq!(lines[1].spans[1].style, Style::default());
        }
    }

    mod renderer_tests {
        use super::*;

        fn render(path: &std::path::Path, config: &ViewerConfig) -> Vec<Line<'static>> {
            let mut queue = UiQueue::new();
            let mut renderer = TextRenderer::new(FileTarget::new(path).unwrap(), queue.handle(), config);
            renderer.compose();
            renderer.load();
            match collect_until(&mut queue, |u| !u.is_empty()).into_iter().next() {
                Some(UiUpdate::Text { lines, .. }) => lines,
                other => panic!("Expected text, got {:?}", other),
            }
        }

        #[test]
        fn test_directory_reports_inline() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("notes");
            fs::create_dir(&path).unwrap();

            let lines = render(&path, &ViewerConfig::default());
            assert!(line_text(&lines[0]).starts_with("Error: Error loading file"));
        }

        #[test]
        fn test_invalid_utf8_is_replaced() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("notes");
            fs::write(&path, b"caf\xe9\n").unwrap();

            let lines = render(&path, &ViewerConfig::default());
            assert_eq!(line_text(&lines[0]), "    1 │ caf\u{fffd}");
        }

        #[test]
        fn test_no_highlight_flag() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("main.rs");
            fs::write(&path, "fn main() {}\n").unwrap();

            let config = ViewerConfig {
                highlight: false,
                ..ViewerConfig::default()
            };
            let lines = render(&path, &config);
            assert_eq!(lines[0].spans.len(), 2);
        }

        #[test]
        fn test_empty_file() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("empty.txt");
            fs::write(&path, "").unwrap();

            assert!(render(&path, &ViewerConfig::default()).is_empty());
        }
    }
}
