use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use sifa_core::{ClickTarget, FormState, Suggestion, SuggestConfig};

use crate::fetcher::SuggestionFetcher;
use crate::scheduler::Debouncer;

/// Messages the session's background tasks post back to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The query debounce timer elapsed.
    Fired { ticket: u64 },
    /// A fetch completed.
    Loaded {
        generation: u64,
        query: String,
        suggestions: Vec<Suggestion>,
    },
    /// The post-blur hide delay elapsed.
    BlurElapsed { ticket: u64 },
}

/// Suggestion state attached to one query input.
///
/// Owns the debounce timer and the generation counter. All methods run on
/// the event loop that owns the form; the timer and fetch tasks only post
/// [`SessionEvent`]s back through `tx`.
pub struct SuggestionSession {
    fetcher: Arc<dyn SuggestionFetcher>,
    tx: UnboundedSender<SessionEvent>,
    query_timer: Debouncer,
    blur_timer: Debouncer,
    min_chars: usize,
    generation: u64,
}

impl SuggestionSession {
    pub fn new(
        fetcher: Arc<dyn SuggestionFetcher>,
        tx: UnboundedSender<SessionEvent>,
        debounce: Duration,
        blur_delay: Duration,
        min_chars: usize,
    ) -> Self {
        Self {
            fetcher,
            tx,
            query_timer: Debouncer::new(debounce),
            blur_timer: Debouncer::new(blur_delay),
            min_chars,
            generation: 0,
        }
    }

    pub fn from_config(
        fetcher: Arc<dyn SuggestionFetcher>,
        tx: UnboundedSender<SessionEvent>,
        config: &SuggestConfig,
    ) -> Self {
        Self::new(
            fetcher,
            tx,
            Duration::from_millis(config.debounce_ms),
            Duration::from_millis(config.blur_hide_ms),
            config.min_chars,
        )
    }

    /// Latest generation issued or invalidated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.query_timer.is_pending()
    }

    /// The query input changed.
    pub fn on_input(&mut self, form: &mut FormState) {
        self.blur_timer.cancel();
        if !form.actively_searching() || !self.long_enough(form) {
            self.query_timer.cancel();
            self.invalidate(form);
            return;
        }
        let tx = self.tx.clone();
        self.query_timer.schedule(move |ticket| {
            let _ = tx.send(SessionEvent::Fired { ticket });
        });
    }

    /// The query input gained focus.
    pub fn on_focus(&mut self, form: &mut FormState) {
        self.blur_timer.cancel();
        if form.profile().searches_on_focus() {
            self.on_input(form);
        }
    }

    /// The query input lost focus. The quick-add form hides the panel after
    /// a short delay so a pick in progress can still land.
    pub fn on_blur(&mut self, form: &mut FormState) {
        if !form.profile().hides_on_blur() {
            return;
        }
        let tx = self.tx.clone();
        self.blur_timer.schedule(move |ticket| {
            let _ = tx.send(SessionEvent::BlurElapsed { ticket });
        });
    }

    /// A click somewhere on the page.
    pub fn on_click(&mut self, form: &mut FormState, target: ClickTarget) {
        let Some(panel) = form.panel_mut() else {
            return;
        };
        panel.click(target);
        if target == ClickTarget::Elsewhere {
            self.query_timer.cancel();
            self.generation += 1;
        }
    }

    /// Pick panel row `index`. Nothing in flight may reopen the panel.
    pub fn pick(&mut self, form: &mut FormState, index: usize) -> bool {
        let picked = form.pick(index);
        if picked {
            self.query_timer.cancel();
            self.blur_timer.cancel();
            self.generation += 1;
        }
        picked
    }

    pub fn pick_highlighted(&mut self, form: &mut FormState) -> bool {
        match form.panel().and_then(|p| p.highlighted()) {
            Some(index) => self.pick(form, index),
            None => false,
        }
    }

    /// Drop whatever is in flight and hide the panel.
    pub fn invalidate(&mut self, form: &mut FormState) {
        self.generation += 1;
        form.clear_panel();
    }

    /// Dispatch one event from the background tasks. Returns `true` when the
    /// panel changed.
    pub fn handle(&mut self, event: SessionEvent, form: &mut FormState) -> bool {
        match event {
            SessionEvent::Fired { ticket } => self.on_fired(ticket, form),
            SessionEvent::Loaded {
                generation,
                query,
                suggestions,
            } => self.on_loaded(generation, &query, suggestions, form),
            SessionEvent::BlurElapsed { ticket } => {
                if !self.blur_timer.settle(ticket) {
                    return false;
                }
                self.invalidate(form);
                true
            }
        }
    }

    fn long_enough(&self, form: &FormState) -> bool {
        form.query_text()
            .map(|q| q.trim().chars().count() >= self.min_chars)
            .unwrap_or(false)
    }

    fn on_fired(&mut self, ticket: u64, form: &mut FormState) -> bool {
        if !self.query_timer.settle(ticket) {
            debug!(ticket, "ignoring cancelled debounce timer");
            return false;
        }
        // Read the input now, not when the keystroke was scheduled.
        if !form.actively_searching() || !self.long_enough(form) {
            self.invalidate(form);
            return true;
        }
        let query = form.query_text().unwrap_or_default().trim().to_string();

        self.generation += 1;
        let generation = self.generation;
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        info!(generation, %query, "dispatching suggestion query");

        tokio::spawn(async move {
            let suggestions = fetcher.fetch(&query).await;
            let _ = tx.send(SessionEvent::Loaded {
                generation,
                query,
                suggestions,
            });
        });
        false
    }

    fn on_loaded(
        &mut self,
        generation: u64,
        query: &str,
        suggestions: Vec<Suggestion>,
        form: &mut FormState,
    ) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                latest = self.generation,
                %query,
                "discarding superseded suggestions"
            );
            return false;
        }
        if !form.actively_searching() {
            debug!(%query, "discarding suggestions, no longer searching");
            return false;
        }
        debug!(generation, count = suggestions.len(), "rendering suggestions");
        match form.panel_mut() {
            Some(panel) => {
                panel.render(suggestions);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use tokio::time::sleep;

    use sifa_core::{FormMode, ProductDetails, ids};

    use super::*;

    /// Answers every query with one external suggestion named after it,
    /// optionally after a per-query delay.
    #[derive(Default)]
    struct ScriptedFetcher {
        calls: Mutex<Vec<String>>,
        delays: HashMap<String, Duration>,
        empty: bool,
    }

    impl ScriptedFetcher {
        fn with_delays(delays: &[(&str, u64)]) -> Self {
            Self {
                delays: delays
                    .iter()
                    .map(|(q, ms)| (q.to_string(), Duration::from_millis(*ms)))
                    .collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SuggestionFetcher for ScriptedFetcher {
        async fn fetch(&self, query: &str) -> Vec<Suggestion> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                sleep(*delay).await;
            }
            if self.empty {
                return Vec::new();
            }
            vec![Suggestion::External {
                provider: "cima".to_string(),
                label: format!("{query} result"),
                details: ProductDetails::default(),
            }]
        }
    }

    fn session(
        fetcher: Arc<ScriptedFetcher>,
    ) -> (SuggestionSession, UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = SuggestionSession::new(
            fetcher,
            tx,
            Duration::from_millis(220),
            Duration::from_millis(180),
            2,
        );
        (session, rx)
    }

    fn type_text(form: &mut FormState, session: &mut SuggestionSession, text: &str) {
        form.query_input_mut().unwrap().set(text);
        session.on_input(form);
    }

    fn labels(form: &FormState) -> Vec<String> {
        form.panel()
            .unwrap()
            .rows()
            .iter()
            .map(|r| r.suggestion.label().to_string())
            .collect()
    }

    async fn pump(
        session: &mut SuggestionSession,
        rx: &mut UnboundedReceiver<SessionEvent>,
        form: &mut FormState,
        events: usize,
    ) {
        for _ in 0..events {
            let event = rx.recv().await.unwrap();
            session.handle(event, form);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_never_fetches_and_hides_panel() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::product_quick();

        type_text(&mut form, &mut session, "ibu");
        pump(&mut session, &mut rx, &mut form, 2).await;
        assert!(form.panel().unwrap().is_visible());

        type_text(&mut form, &mut session, "i");
        assert!(!form.panel().unwrap().is_visible());
        type_text(&mut form, &mut session, " a  ");
        assert!(!session.is_pending());

        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(fetcher.calls(), ["ibu"]);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_fire_once_with_last_text() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::product_quick();

        for text in ["pa", "par", "para", "parac"] {
            type_text(&mut form, &mut session, text);
            sleep(Duration::from_millis(100)).await;
        }
        pump(&mut session, &mut rx, &mut form, 2).await;

        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(fetcher.calls(), ["parac"]);
        assert_eq!(labels(&form), ["parac result"]);
    }

    #[tokio::test(start_paused = true)]
    async fn query_is_read_when_the_timer_fires() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::product_quick();

        type_text(&mut form, &mut session, "ome");
        form.query_input_mut().unwrap().set("omeprazol");
        pump(&mut session, &mut rx, &mut form, 2).await;

        assert_eq!(fetcher.calls(), ["omeprazol"]);
    }

    #[tokio::test(start_paused = true)]
    async fn later_issued_request_wins_over_late_arrival() {
        let fetcher = Arc::new(ScriptedFetcher::with_delays(&[("ab", 300), ("abc", 10)]));
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::product_quick();

        type_text(&mut form, &mut session, "ab");
        pump(&mut session, &mut rx, &mut form, 1).await; // fire "ab"
        type_text(&mut form, &mut session, "abc");
        pump(&mut session, &mut rx, &mut form, 1).await; // fire "abc"

        let first = rx.recv().await.unwrap();
        assert!(matches!(&first, SessionEvent::Loaded { query, .. } if query == "abc"));
        assert!(session.handle(first, &mut form));

        let late = rx.recv().await.unwrap();
        assert!(matches!(&late, SessionEvent::Loaded { query, .. } if query == "ab"));
        assert!(!session.handle(late, &mut form));

        assert_eq!(fetcher.calls(), ["ab", "abc"]);
        assert_eq!(labels(&form), ["abc result"]);
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_create_mode_discards_in_flight_response() {
        let fetcher = Arc::new(ScriptedFetcher::with_delays(&[("ibu", 100)]));
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::medication_order(Vec::new(), true);

        type_text(&mut form, &mut session, "ibu");
        pump(&mut session, &mut rx, &mut form, 1).await;
        form.set_mode(FormMode::SelectExisting);
        pump(&mut session, &mut rx, &mut form, 1).await;

        assert_eq!(fetcher.calls(), ["ibu"]);
        assert!(!form.panel().unwrap().is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn select_mode_does_not_search() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::medication_order(Vec::new(), false);

        // The name input is disabled here, but programmatic input must still
        // not trigger a query.
        type_text(&mut form, &mut session, "ibuprofeno");
        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_response_hides_panel() {
        let fetcher = Arc::new(ScriptedFetcher {
            empty: true,
            ..ScriptedFetcher::default()
        });
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::product_quick();
        form.panel_mut().unwrap().render(vec![Suggestion::External {
            provider: "cima".to_string(),
            label: "stale".to_string(),
            details: ProductDetails::default(),
        }]);

        type_text(&mut form, &mut session, "xyz");
        pump(&mut session, &mut rx, &mut form, 2).await;

        assert!(!form.panel().unwrap().is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn pick_binds_and_blocks_in_flight_results() {
        let fetcher = Arc::new(ScriptedFetcher::with_delays(&[("ibup", 100)]));
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::medication_order(Vec::new(), true);

        type_text(&mut form, &mut session, "ibu");
        pump(&mut session, &mut rx, &mut form, 2).await;
        assert_eq!(labels(&form), ["ibu result"]);

        // A newer query is in flight when the user picks.
        type_text(&mut form, &mut session, "ibup");
        pump(&mut session, &mut rx, &mut form, 1).await;
        assert!(session.pick_highlighted(&mut form));
        assert_eq!(form.field(ids::NEW_NAME).unwrap().value(), "ibu result");

        pump(&mut session, &mut rx, &mut form, 1).await;
        assert!(!form.panel().unwrap().is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn focus_searches_only_on_order_form() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let (mut session, mut rx) = session(fetcher.clone());

        let mut order = FormState::medication_order(Vec::new(), true);
        order.query_input_mut().unwrap().set("amox");
        session.on_focus(&mut order);
        pump(&mut session, &mut rx, &mut order, 2).await;
        assert_eq!(labels(&order), ["amox result"]);

        let mut quick = FormState::product_quick();
        quick.query_input_mut().unwrap().set("amox");
        session.on_focus(&mut quick);
        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(fetcher.calls(), ["amox"]);
    }

    #[tokio::test(start_paused = true)]
    async fn blur_hides_quick_form_panel_after_delay() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::product_quick();

        type_text(&mut form, &mut session, "ator");
        pump(&mut session, &mut rx, &mut form, 2).await;

        session.on_blur(&mut form);
        sleep(Duration::from_millis(100)).await;
        assert!(form.panel().unwrap().is_visible());

        pump(&mut session, &mut rx, &mut form, 1).await;
        assert!(!form.panel().unwrap().is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn refocus_cancels_pending_blur_hide() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::product_quick();

        type_text(&mut form, &mut session, "ator");
        pump(&mut session, &mut rx, &mut form, 2).await;

        session.on_blur(&mut form);
        session.on_focus(&mut form);
        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert!(form.panel().unwrap().is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn outside_click_dismisses_and_invalidates() {
        let fetcher = Arc::new(ScriptedFetcher::with_delays(&[("losa", 100)]));
        let (mut session, mut rx) = session(fetcher.clone());
        let mut form = FormState::medication_order(Vec::new(), true);

        type_text(&mut form, &mut session, "los");
        pump(&mut session, &mut rx, &mut form, 2).await;
        type_text(&mut form, &mut session, "losa");
        pump(&mut session, &mut rx, &mut form, 1).await;

        session.on_click(&mut form, ClickTarget::QueryInput);
        assert!(form.panel().unwrap().is_visible());
        session.on_click(&mut form, ClickTarget::Elsewhere);
        assert!(!form.panel().unwrap().is_visible());

        pump(&mut session, &mut rx, &mut form, 1).await;
        assert!(!form.panel().unwrap().is_visible());
    }
}
