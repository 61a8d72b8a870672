//! The running viewer: one renderer, the screen it draws into, and the
//! animations currently playing on that screen.
//!
//! Everything here runs on the UI thread. [`App::tick`] drains the UI queue,
//! advances animations and expires toasts; the terminal loop calls it once
//! per iteration between input polling and drawing.

use crate::animation::AnimationDriver;
use crate::config::ViewerConfig;
use crate::domain::{FileTarget, PaneKey, Severity};
use crate::registry::Registry;
use crate::renderers::{format_size, PaneContent, Renderer};
use crate::shell::{UiQueue, UiUpdate};
use crate::tui::{self, handle_key_event, KeyAction, Screen};
use crossterm::event::KeyEvent;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct App {
    screen: Screen,
    queue: UiQueue,
    renderer: Box<dyn Renderer>,
    animations: HashMap<PaneKey, AnimationDriver>,
    loaded: bool,
    closed: bool,
}

impl App {
    /// Composes the renderer's surface into a fresh screen
    pub fn new(target: &FileTarget, queue: UiQueue, mut renderer: Box<dyn Renderer>) -> Self {
        let surface = renderer.compose();
        info!(
            renderer = renderer.name(),
            panes = surface.panes.len(),
            tabbed = surface.tabbed,
            "surface composed"
        );

        let screen = Screen::new(
            format!("QuickView - {}", target.name),
            format!("{} • {}", renderer.name(), format_size(target.size)),
            surface,
        );

        Self {
            screen,
            queue,
            renderer,
            animations: HashMap::new(),
            loaded: false,
            closed: false,
        }
    }

    /// Picks a renderer for `target` and composes it
    pub fn open(target: FileTarget, registry: &Registry, config: &ViewerConfig) -> Self {
        let queue = UiQueue::new();
        let renderer = registry.dispatch(target.clone(), queue.handle(), config);
        Self::new(&target, queue, renderer)
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    /// Starts the renderer's load. Only the first call has any effect.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        self.renderer.load();
    }

    pub fn is_animating(&self, pane: &PaneKey) -> bool {
        self.animations.get(pane).is_some_and(|d| d.is_running())
    }

    pub fn tick(&mut self, now: Instant) {
        for update in self.queue.drain() {
            self.apply(update, now);
        }

        for (pane, driver) in self.animations.iter_mut() {
            if let Some(frame) = driver.poll(now) {
                self.screen
                    .set_content(pane, PaneContent::Text(frame.lines.clone()));
            }
        }

        self.screen.expire_toasts(now);
    }

    pub fn apply(&mut self, update: UiUpdate, now: Instant) {
        match update {
            UiUpdate::Text { pane, lines } => {
                self.stop_animation(&pane);
                self.screen.set_content(&pane, PaneContent::Text(lines));
            }
            UiUpdate::Table { pane, table } => {
                self.stop_animation(&pane);
                self.screen.set_content(&pane, PaneContent::Table(table));
            }
            UiUpdate::Animate { pane, frames } => {
                if !self.screen.has_pane(&pane) {
                    debug!(pane = %pane, "animation for unknown pane ignored");
                    return;
                }
                self.stop_animation(&pane);

                debug!(pane = %pane, frames = frames.len(), "starting animation");
                let mut driver = AnimationDriver::new(frames);
                if let Some(frame) = driver.start(now) {
                    self.screen
                        .set_content(&pane, PaneContent::Text(frame.lines.clone()));
                }
                self.animations.insert(pane, driver);
            }
            UiUpdate::Notify(notification) => {
                match notification.severity {
                    Severity::Information => info!(text = %notification.message, "notification"),
                    Severity::Warning => warn!(text = %notification.message, "notification"),
                    Severity::Error => error!(text = %notification.message, "notification"),
                }
                self.screen.notify(notification, now);
            }
        }
    }

    fn stop_animation(&mut self, pane: &PaneKey) {
        if let Some(mut driver) = self.animations.remove(pane) {
            driver.stop();
        }
    }

    /// Returns `true` when the key asks to quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match handle_key_event(key) {
            KeyAction::Quit => true,
            KeyAction::None => false,
            action => {
                self.screen.navigate(action);
                false
            }
        }
    }

    pub fn draw(&mut self, frame: &mut ratatui::Frame) {
        tui::render(frame, &mut self.screen);
    }

    /// Stops every animation and tears the renderer down. Safe to call twice.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        for (_, mut driver) in self.animations.drain() {
            driver.stop();
        }
        self.renderer.teardown();
        info!(renderer = self.renderer.name(), "renderer torn down");
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
