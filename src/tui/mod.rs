// TUI module for rendering the terminal interface
pub mod colors;
pub mod input;
pub mod screen;

// Re-exports
pub use colors::*;
pub use input::{handle_key_event, KeyAction};
pub use screen::{Pane, Screen, Toast, TOAST_DURATION};

use crate::domain::{Severity, TableData};
use crate::renderers::PaneContent;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame,
};

const MIN_COLUMN_WIDTH: usize = 3;
const MAX_COLUMN_WIDTH: usize = 40;
/// Rows inspected when sizing columns that have no fixed width
const WIDTH_SAMPLE_ROWS: usize = 200;
const TOAST_WIDTH: u16 = 48;

/// Renders the whole screen
pub fn render(frame: &mut Frame, screen: &mut Screen) {
    let tabs_height = if screen.tabbed { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),           // Header
            Constraint::Length(tabs_height), // Sheet/page tabs
            Constraint::Min(0),              // Active pane
            Constraint::Length(3),           // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], screen);
    if screen.tabbed {
        render_tabs(frame, chunks[1], screen);
    }
    if let Some(pane) = screen.active_pane_mut() {
        render_pane(frame, chunks[2], pane);
    }
    render_footer(frame, chunks[3], screen.tabbed);

    let area = frame.area();
    render_toasts(frame, area, screen.toasts());
}

fn render_header(frame: &mut Frame, area: Rect, screen: &Screen) {
    let title = Line::from(vec![
        Span::styled(
            format!(" {}", screen.title),
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("({})", screen.subtitle), Style::default().fg(TEXT_SECONDARY)),
    ]);

    let header = Paragraph::new(title)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Left);

    frame.render_widget(header, area);
}

fn render_tabs(frame: &mut Frame, area: Rect, screen: &Screen) {
    let titles: Vec<Line> = screen
        .panes()
        .iter()
        .map(|p| Line::from(p.title.clone()))
        .collect();

    let tabs = Tabs::new(titles)
        .select(screen.active())
        .style(Style::default().fg(TEXT_SECONDARY))
        .highlight_style(
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider(Span::styled("│", Style::default().fg(BORDER_COLOR)));

    frame.render_widget(tabs, area);
}

fn pane_block(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
}

fn render_pane(frame: &mut Frame, area: Rect, pane: &mut Pane) {
    let block = pane_block(&pane.title);
    let inner = block.inner(area);

    match &pane.content {
        PaneContent::Loading => {
            pane.viewport = inner.height as usize;
            let loading = Paragraph::new(Line::from(Span::styled("Loading...", dim())))
                .block(block)
                .alignment(Alignment::Center);
            frame.render_widget(loading, area);
        }
        PaneContent::Text(lines) => {
            pane.viewport = inner.height as usize;
            let visible: Vec<Line> = lines
                .iter()
                .skip(pane.scroll)
                .take(inner.height as usize)
                .cloned()
                .collect();
            let column = pane.column.min(u16::MAX as usize) as u16;
            let paragraph = Paragraph::new(visible).block(block).scroll((0, column));
            frame.render_widget(paragraph, area);
        }
        PaneContent::Table(table) => {
            // One line goes to the header row
            let body = inner.height.saturating_sub(1) as usize;
            pane.viewport = body;
            if pane.scroll < pane.offset {
                pane.offset = pane.scroll;
            } else if body > 0 && pane.scroll >= pane.offset + body {
                pane.offset = pane.scroll + 1 - body;
            }

            let widget = table_widget(table, pane.offset, body, pane.column).block(block);
            let mut state = TableState::default().with_selected(Some(pane.scroll - pane.offset));
            frame.render_stateful_widget(widget, area, &mut state);
        }
    }
}

/// Fixed widths when the renderer supplied them, otherwise sized from the
/// header and a sample of rows
pub fn column_widths(table: &TableData) -> Vec<u16> {
    if let Some(widths) = &table.widths {
        return widths.clone();
    }

    table
        .headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let cells = table
                .rows
                .iter()
                .take(WIDTH_SAMPLE_ROWS)
                .filter_map(|row| row.get(i))
                .map(|cell| cell.text.chars().count())
                .max()
                .unwrap_or(0);
            header
                .chars()
                .count()
                .max(cells)
                .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as u16
        })
        .collect()
}

/// Builds the visible window of a table: `height` rows from `offset`,
/// columns from `first_column` on, zebra striped
fn table_widget(table: &TableData, offset: usize, height: usize, first_column: usize) -> Table<'static> {
    let widths = column_widths(table);

    let header = Row::new(
        table
            .headers
            .iter()
            .skip(first_column)
            .map(|h| Cell::from(h.clone())),
    )
    .style(
        Style::default()
            .fg(ACCENT_HIGHLIGHT)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, row)| {
            let cells = row
                .iter()
                .skip(first_column)
                .map(|cell| Cell::from(Span::styled(cell.text.clone(), cell.style)));
            let stripe = if i % 2 == 1 {
                Style::default().bg(BG_STRIPE)
            } else {
                Style::default()
            };
            Row::new(cells).style(stripe)
        })
        .collect();

    let constraints: Vec<Constraint> = widths
        .iter()
        .skip(first_column)
        .map(|w| Constraint::Length(*w))
        .collect();

    Table::new(rows, constraints)
        .header(header)
        .column_spacing(1)
        .highlight_style(Style::default().bg(BORDER_COLOR).add_modifier(Modifier::BOLD))
}

fn severity_style(severity: Severity) -> (&'static str, Color) {
    match severity {
        Severity::Information => ("Info", ACCENT_HIGHLIGHT),
        Severity::Warning => ("Warning", ACCENT_WARNING),
        Severity::Error => ("Error", ACCENT_PRIMARY),
    }
}

/// Stacks toasts down the top-right corner, dropping any that do not fit
fn render_toasts(frame: &mut Frame, area: Rect, toasts: &[Toast]) {
    let width = TOAST_WIDTH.min(area.width);
    let text_width = width.saturating_sub(2).max(1) as usize;
    let mut y = area.y + 1;

    for toast in toasts {
        let text_lines = toast
            .notification
            .message
            .lines()
            .map(|l| l.chars().count().div_ceil(text_width).max(1))
            .sum::<usize>()
            .max(1);
        let height = text_lines as u16 + 2;
        if y + height > area.bottom() {
            break;
        }

        let rect = Rect::new(area.right().saturating_sub(width + 1), y, width, height);
        let (label, color) = severity_style(toast.notification.severity);
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", label),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(BG_DARK));

        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(toast.notification.message.clone())
                .block(block)
                .style(Style::default().fg(TEXT_PRIMARY))
                .wrap(Wrap { trim: false }),
            rect,
        );
        y += height;
    }
}

fn render_footer(frame: &mut Frame, area: Rect, tabbed: bool) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
    };
    let label = |l: &'static str| Span::styled(l, Style::default().fg(TEXT_SECONDARY));

    let mut spans = vec![
        key(" ↑↓ "),
        label("Scroll"),
        Span::raw(" │ "),
        key("←→ "),
        label("Columns"),
        Span::raw(" │ "),
        key("PgUp/PgDn "),
        label("Page"),
        Span::raw(" │ "),
        key("g/G "),
        label("Top/End"),
    ];
    if tabbed {
        spans.extend([Span::raw(" │ "), key("Tab "), label("Switch")]);
    }
    spans.extend([Span::raw(" │ "), key("q "), label("Quit")]);

    let footer = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}
