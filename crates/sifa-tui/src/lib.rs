pub mod app;
pub mod event;
pub mod keys;
pub mod theme;
pub mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use app::App;
use event::{AppEvent, EventHandler};

/// Suggestion results are drained at least this often.
const TICK: Duration = Duration::from_millis(50);

/// Run the terminal form until the user submits or quits.
///
/// Blocks the calling thread; the session's timers and fetches need a
/// multi-threaded tokio runtime to make progress meanwhile.
pub fn run_tui(app: &mut App) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        original_hook(info);
    }));

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let events = EventHandler::new(TICK);
    let result = event_loop(&mut terminal, &events, app);

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    events: &EventHandler,
    app: &mut App,
) -> Result<()> {
    loop {
        app.drain_session_events();
        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => keys::handle_key(app, key.code, key.modifiers),
            AppEvent::Resize(_, _) | AppEvent::Tick => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
