//! Display state owned by the UI thread: the panes declared by the active
//! renderer, which one is showing, where each is scrolled to, and the
//! notification toasts currently on screen.

use super::input::KeyAction;
use crate::domain::{Notification, PaneKey};
use crate::renderers::{PaneContent, Surface};
use std::time::{Duration, Instant};
use tracing::debug;

/// How long a notification stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(4);
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone)]
pub struct Pane {
    pub key: PaneKey,
    pub title: String,
    pub content: PaneContent,
    /// First visible line for text, selected row for tables
    pub scroll: usize,
    /// Characters for text, whole columns for tables
    pub column: usize,
    /// First table row drawn; kept so the cursor does not jump around
    pub(crate) offset: usize,
    /// Rows available at the last draw, used for paging
    pub(crate) viewport: usize,
}

impl Pane {
    fn new(key: PaneKey, title: String, content: PaneContent) -> Self {
        Self {
            key,
            title,
            content,
            scroll: 0,
            column: 0,
            offset: 0,
            viewport: 0,
        }
    }

    pub fn len(&self) -> usize {
        match &self.content {
            PaneContent::Loading => 0,
            PaneContent::Text(lines) => lines.len(),
            PaneContent::Table(table) => table.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn max_scroll(&self) -> usize {
        self.len().saturating_sub(1)
    }

    fn max_column(&self) -> usize {
        match &self.content {
            PaneContent::Loading => 0,
            PaneContent::Text(lines) => lines
                .iter()
                .map(|l| l.width())
                .max()
                .unwrap_or(0)
                .saturating_sub(1),
            PaneContent::Table(table) => table.width().saturating_sub(1),
        }
    }

    fn set_content(&mut self, content: PaneContent) {
        self.content = content;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
        self.column = self.column.min(self.max_column());
        self.offset = self.offset.min(self.scroll);
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll = self.scroll.saturating_add_signed(delta).min(self.max_scroll());
    }

    fn page_size(&self) -> isize {
        self.viewport.max(1) as isize
    }
}

/// A notification with its expiry
#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub expires: Instant,
}

#[derive(Debug)]
pub struct Screen {
    pub title: String,
    pub subtitle: String,
    pub tabbed: bool,
    panes: Vec<Pane>,
    active: usize,
    toasts: Vec<Toast>,
}

impl Screen {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, surface: Surface) -> Self {
        let panes = surface
            .panes
            .into_iter()
            .map(|spec| Pane::new(spec.key, spec.title, spec.content))
            .collect();

        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            tabbed: surface.tabbed,
            panes,
            active: 0,
            toasts: Vec::new(),
        }
    }

    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_pane(&self) -> Option<&Pane> {
        self.panes.get(self.active)
    }

    pub(crate) fn active_pane_mut(&mut self) -> Option<&mut Pane> {
        self.panes.get_mut(self.active)
    }

    pub fn pane(&self, key: &PaneKey) -> Option<&Pane> {
        self.panes.iter().find(|p| &p.key == key)
    }

    pub fn has_pane(&self, key: &PaneKey) -> bool {
        self.pane(key).is_some()
    }

    /// Replaces a pane's content. Updates for panes this screen does not
    /// have are dropped and `false` is returned.
    pub fn set_content(&mut self, key: &PaneKey, content: PaneContent) -> bool {
        match self.panes.iter_mut().find(|p| &p.key == key) {
            Some(pane) => {
                pane.set_content(content);
                true
            }
            None => {
                debug!(pane = %key, "update for unknown pane ignored");
                false
            }
        }
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn notify(&mut self, notification: Notification, now: Instant) {
        self.toasts.push(Toast {
            notification,
            expires: now + TOAST_DURATION,
        });
        if self.toasts.len() > MAX_TOASTS {
            self.toasts.remove(0);
        }
    }

    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires > now);
    }

    pub fn next_pane(&mut self) {
        if !self.panes.is_empty() {
            self.active = (self.active + 1) % self.panes.len();
        }
    }

    pub fn previous_pane(&mut self) {
        if !self.panes.is_empty() {
            self.active = (self.active + self.panes.len() - 1) % self.panes.len();
        }
    }

    /// Applies a navigation key to the active pane. Keys that make no sense
    /// for what is showing are ignored.
    pub fn navigate(&mut self, action: KeyAction) {
        match action {
            KeyAction::NextPane => return self.next_pane(),
            KeyAction::PreviousPane => return self.previous_pane(),
            _ => {}
        }

        let Some(pane) = self.active_pane_mut() else {
            return;
        };

        match action {
            KeyAction::Top => pane.scroll = 0,
            KeyAction::Bottom => pane.scroll = pane.max_scroll(),
            KeyAction::LineUp => pane.scroll_by(-1),
            KeyAction::LineDown => pane.scroll_by(1),
            KeyAction::PageUp => pane.scroll_by(-pane.page_size()),
            KeyAction::PageDown => pane.scroll_by(pane.page_size()),
            KeyAction::ScrollLeft => pane.column = pane.column.saturating_sub(1),
            KeyAction::ScrollRight => pane.column = (pane.column + 1).min(pane.max_column()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Severity, TableData};
    use crate::renderers::PaneSpec;
    use ratatui::text::Line;

    fn text(count: usize) -> PaneContent {
        PaneContent::Text((0..count).map(|i| Line::from(format!("line {}", i))).collect())
    }

    fn table(columns: usize, rows: usize) -> PaneContent {
        let mut table = TableData::new((0..columns).map(|i| format!("C{}", i)).collect());
        for r in 0..rows {
            table.push_plain_row((0..columns).map(|c| format!("{}:{}", r, c)));
        }
        PaneContent::Table(table)
    }

    fn single(content: PaneContent) -> Screen {
        let pane = PaneSpec::new(PaneKey::new("main"), "main").with_content(content);
        Screen::new("QuickView", "", Surface::single(pane))
    }

    fn tabbed(count: usize) -> Screen {
        let panes = (0..count)
            .map(|i| PaneSpec::new(PaneKey::new(format!("p{}", i)), format!("Page {}", i + 1)))
            .collect();
        Screen::new("QuickView", "", Surface::tabbed(panes))
    }

    mod content_tests {
        use super::*;

        #[test]
        fn test_panes_start_loading() {
            let screen = tabbed(2);
            assert!(screen.tabbed);
            assert_eq!(screen.panes().len(), 2);
            assert_eq!(screen.panes()[0].content, PaneContent::Loading);
            assert_eq!(screen.active(), 0);
        }

        #[test]
        fn test_set_content_on_known_pane() {
            let mut screen = tabbed(2);
            assert!(screen.set_content(&PaneKey::new("p1"), text(3)));
            assert_eq!(screen.pane(&PaneKey::new("p1")).unwrap().len(), 3);
            assert!(screen.pane(&PaneKey::new("p0")).unwrap().is_empty());
        }

        #[test]
        fn test_unknown_pane_is_ignored() {
            let mut screen = tabbed(1);
            assert!(!screen.set_content(&PaneKey::new("nope"), text(3)));
            assert_eq!(screen.panes()[0].content, PaneContent::Loading);
        }

        #[test]
        fn test_shorter_content_clamps_scroll() {
            let mut screen = single(text(50));
            screen.navigate(KeyAction::Bottom);
            assert_eq!(screen.active_pane().unwrap().scroll, 49);

            screen.set_content(&PaneKey::new("main"), text(5));
            assert_eq!(screen.active_pane().unwrap().scroll, 4);
        }
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_line_scrolling_is_bounded() {
            let mut screen = single(text(3));
            screen.navigate(KeyAction::LineUp);
            assert_eq!(screen.active_pane().unwrap().scroll, 0);

            for _ in 0..10 {
                screen.navigate(KeyAction::LineDown);
            }
            assert_eq!(screen.active_pane().unwrap().scroll, 2);
        }

        #[test]
        fn test_top_and_bottom() {
            let mut screen = single(table(2, 10));
            screen.navigate(KeyAction::Bottom);
            assert_eq!(screen.active_pane().unwrap().scroll, 9);
            screen.navigate(KeyAction::Top);
            assert_eq!(screen.active_pane().unwrap().scroll, 0);
        }

        #[test]
        fn test_paging_uses_viewport() {
            let mut screen = single(text(100));
            screen.active_pane_mut().unwrap().viewport = 20;

            screen.navigate(KeyAction::PageDown);
            assert_eq!(screen.active_pane().unwrap().scroll, 20);
            screen.navigate(KeyAction::PageUp);
            screen.navigate(KeyAction::PageUp);
            assert_eq!(screen.active_pane().unwrap().scroll, 0);
        }

        #[test]
        fn test_paging_before_first_draw_moves_one_line() {
            let mut screen = single(text(10));
            screen.navigate(KeyAction::PageDown);
            assert_eq!(screen.active_pane().unwrap().scroll, 1);
        }

        #[test]
        fn test_table_columns_scroll_within_width() {
            let mut screen = single(table(3, 1));
            for _ in 0..5 {
                screen.navigate(KeyAction::ScrollRight);
            }
            assert_eq!(screen.active_pane().unwrap().column, 2);

            screen.navigate(KeyAction::ScrollLeft);
            assert_eq!(screen.active_pane().unwrap().column, 1);
        }

        #[test]
        fn test_loading_pane_ignores_navigation() {
            let mut screen = tabbed(1);
            screen.navigate(KeyAction::Bottom);
            screen.navigate(KeyAction::ScrollRight);
            let pane = screen.active_pane().unwrap();
            assert_eq!((pane.scroll, pane.column), (0, 0));
        }

        #[test]
        fn test_pane_switching_wraps() {
            let mut screen = tabbed(3);
            screen.navigate(KeyAction::PreviousPane);
            assert_eq!(screen.active(), 2);
            screen.navigate(KeyAction::NextPane);
            assert_eq!(screen.active(), 0);
            screen.navigate(KeyAction::NextPane);
            assert_eq!(screen.active(), 1);
        }

        #[test]
        fn test_scroll_is_per_pane() {
            let mut screen = tabbed(2);
            screen.set_content(&PaneKey::new("p0"), text(10));
            screen.set_content(&PaneKey::new("p1"), text(10));

            screen.navigate(KeyAction::LineDown);
            screen.navigate(KeyAction::NextPane);
            assert_eq!(screen.active_pane().unwrap().scroll, 0);
            screen.navigate(KeyAction::PreviousPane);
            assert_eq!(screen.active_pane().unwrap().scroll, 1);
        }
    }

    mod toast_tests {
        use super::*;

        #[test]
        fn test_toast_expires() {
            let now = Instant::now();
            let mut screen = single(text(1));
            screen.notify(Notification::new(Severity::Warning, "careful"), now);
            assert_eq!(screen.toasts().len(), 1);

            screen.expire_toasts(now + Duration::from_secs(1));
            assert_eq!(screen.toasts().len(), 1);

            screen.expire_toasts(now + TOAST_DURATION);
            assert!(screen.toasts().is_empty());
        }

        #[test]
        fn test_oldest_toast_dropped_when_full() {
            let now = Instant::now();
            let mut screen = single(text(1));
            for i in 0..6 {
                screen.notify(Notification::new(Severity::Information, format!("n{}", i)), now);
            }
            assert_eq!(screen.toasts().len(), MAX_TOASTS);
            assert_eq!(screen.toasts()[0].notification.message, "n2");
        }
    }
}
