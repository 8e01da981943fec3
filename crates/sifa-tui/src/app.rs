use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use sifa_core::{ClickTarget, FieldId, FormState, OrderDraft, SuggestConfig, TextValue};
use sifa_suggest::{SessionEvent, SuggestionFetcher, SuggestionSession};

use crate::theme::NordTheme;

/// What currently receives key presses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Field(FieldId),
    Cell { row: usize, cell: usize },
}

/// Application state for the terminal form.
pub struct App {
    pub form: FormState,
    pub session: SuggestionSession,
    events: UnboundedReceiver<SessionEvent>,
    pub focus: Option<Focus>,
    pub status_message: String,
    pub should_quit: bool,
    /// Set once the form validated and was submitted.
    pub submitted: Option<OrderDraft>,
    pub theme: NordTheme,
}

impl App {
    /// Must be called inside a tokio runtime: the session spawns its timers
    /// and fetches there.
    pub fn new(form: FormState, fetcher: Arc<dyn SuggestionFetcher>, config: &SuggestConfig) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let mut app = Self {
            form,
            session: SuggestionSession::from_config(fetcher, tx, config),
            events,
            focus: None,
            status_message: String::new(),
            should_quit: false,
            submitted: None,
            theme: NordTheme::default(),
        };
        app.normalize_focus();
        app
    }

    /// Apply every result the background tasks posted so far. Returns `true`
    /// when the panel changed.
    pub fn drain_session_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            changed |= self.session.handle(event, &mut self.form);
        }
        changed
    }

    // ─── Focus ─────────────────────────────────────────────

    /// Everything the user can currently tab to, in screen order.
    pub fn focus_targets(&self) -> Vec<Focus> {
        let mut targets: Vec<Focus> = self
            .form
            .fields()
            .iter()
            .filter(|f| !f.disabled)
            .map(|f| Focus::Field(f.id.clone()))
            .collect();
        for (row, r) in self.form.rows.rows().iter().enumerate() {
            for cell in 0..r.cells.len() {
                targets.push(Focus::Cell { row, cell });
            }
        }
        targets
    }

    pub fn query_focused(&self) -> bool {
        match (&self.focus, self.form.query_field_id()) {
            (Some(Focus::Field(id)), Some(query)) => id == query,
            _ => false,
        }
    }

    /// Move focus `step` targets forward (negative for backwards), running
    /// the blur and focus hooks of the query input.
    pub fn cycle_focus(&mut self, step: isize) {
        let targets = self.focus_targets();
        if targets.is_empty() {
            self.focus = None;
            return;
        }
        let current = self
            .focus
            .as_ref()
            .and_then(|f| targets.iter().position(|t| t == f))
            .unwrap_or(0) as isize;
        let len = targets.len() as isize;
        let next = targets[(current + step).rem_euclid(len) as usize].clone();
        self.set_focus(Some(next));
    }

    pub fn set_focus(&mut self, focus: Option<Focus>) {
        let was_query = self.query_focused();
        self.focus = focus;
        let is_query = self.query_focused();

        if was_query && !is_query {
            if self.form.profile().hides_on_blur() {
                self.session.on_blur(&mut self.form);
            } else {
                self.session.on_click(&mut self.form, ClickTarget::Elsewhere);
            }
        } else if !was_query && is_query {
            self.session.on_focus(&mut self.form);
        }
    }

    /// Keep focus on something that can still take input after a mode
    /// switch or a row removal.
    pub fn normalize_focus(&mut self) {
        let targets = self.focus_targets();
        let valid = self.focus.as_ref().is_some_and(|f| targets.contains(f));
        if !valid {
            self.focus = targets.into_iter().next();
        }
    }

    /// Text input under focus, if it is a text input.
    pub fn focused_text_mut(&mut self) -> Option<&mut TextValue> {
        match self.focus.clone()? {
            Focus::Field(id) => self.form.field_mut(id.as_str())?.as_text_mut(),
            Focus::Cell { row, cell } => self
                .form
                .rows
                .row_mut(row)
                .and_then(|r| r.cells.get_mut(cell))
                .map(|c| &mut c.value),
        }
    }

    // ─── Form actions ──────────────────────────────────────

    pub fn toggle_mode(&mut self) {
        if !self.form.toggle_mode() {
            self.status_message = "This form has no mode toggle".to_string();
            return;
        }
        self.session.invalidate(&mut self.form);
        if let Some(mode) = self.form.mode() {
            self.status_message = format!("Mode: {mode}");
        }
        self.normalize_focus();
        if self.query_focused() {
            self.session.on_focus(&mut self.form);
        }
    }

    pub fn pick_highlighted(&mut self) {
        let label = self
            .form
            .panel()
            .and_then(|p| p.highlighted().and_then(|i| p.rows().get(i)))
            .map(|r| r.suggestion.label().to_string());
        if self.session.pick_highlighted(&mut self.form) {
            if let Some(label) = label {
                self.status_message = format!("Picked {label}");
            }
            // A local pick leaves create mode and disables the query input.
            self.normalize_focus();
        }
    }

    pub fn add_row(&mut self) {
        match self.form.rows.add_row() {
            Some(index) => {
                self.set_focus(Some(Focus::Cell { row: index, cell: 0 }));
                self.status_message = format!("Added row {}", index + 1);
            }
            None => self.status_message = "This form has no rows".to_string(),
        }
    }

    /// Remove the focused row, or the last one when focus is elsewhere.
    pub fn remove_row(&mut self) {
        let index = match &self.focus {
            Some(Focus::Cell { row, .. }) => Some(*row),
            _ => self.form.rows.len().checked_sub(1),
        };
        let Some(index) = index else {
            return;
        };
        if self.form.rows.remove_row(index).is_some() {
            self.status_message = format!("Removed row {}", index + 1);
            self.normalize_focus();
        }
    }

    pub fn submit(&mut self) {
        match self.form.draft() {
            Ok(draft) => {
                tracing::info!(product = ?draft.product, "form submitted");
                self.submitted = Some(draft);
                self.should_quit = true;
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }
}
