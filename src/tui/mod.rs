//! Terminal user interface
//!
//! Event loop: draw the current state, poll the terminal with a short
//! timeout, then drain any results that background gateway tasks have
//! pushed onto the application channel.
//!
//! Key bindings:
//! - `Enter` send message / submit focused widget
//! - `Tab` cycle focus (input / widget / sidebar), `Esc` back to input
//! - `Ctrl+N` new chat, `Ctrl+D` delete chat, `Ctrl+J`/`Ctrl+K` switch chat
//! - `Space` toggle task / select option, `a` toggle all tasks
//! - `Ctrl+T` toggle theme, `Ctrl+Y` copy the last code block
//! - `1`-`4` on an empty chat send a starter prompt
//! - `Ctrl+C` / `Ctrl+Q` quit

pub mod app;
pub mod events;
pub mod markdown;
pub mod renderer;
pub mod theme;

pub use app::{App, Focus};
pub use events::{AppEvent, Event, EventHandler};
pub use theme::Theme;

use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the interface until the user quits.
pub async fn run(
    mut app: App,
    mut app_events: mpsc::UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &mut app_events, tick_rate).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    app_events: &mut mpsc::UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
) -> Result<()> {
    let handler = EventHandler::new(tick_rate);

    loop {
        let theme = Theme::from_preference(app.theme_pref);
        terminal.draw(|frame| renderer::draw(frame, app, &theme))?;

        match handler.next()? {
            Event::Key(key) => app.handle_key(key),
            Event::Resize(_, _) | Event::Mouse(_) | Event::Tick => {}
        }

        while let Ok(event) = app_events.try_recv() {
            app.handle_app_event(event);
        }

        if app.should_quit {
            break;
        }

        // Yield so spawned gateway tasks make progress on this runtime
        tokio::task::yield_now().await;
    }

    Ok(())
}
