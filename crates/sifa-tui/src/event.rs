use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

/// Terminal events the form reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Poll timeout. The loop uses it to drain suggestion results.
    Tick,
}

/// Polls the terminal with a short tick so background results show up
/// without waiting for a key press.
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn next(&self) -> Result<AppEvent> {
        if !event::poll(self.tick_rate)? {
            return Ok(AppEvent::Tick);
        }
        match event::read()? {
            // Windows reports releases too.
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Ok(AppEvent::Key(key)),
            CrosstermEvent::Resize(w, h) => Ok(AppEvent::Resize(w, h)),
            _ => Ok(AppEvent::Tick),
        }
    }
}
