//! Event handling for the TUI
//!
//! Terminal events come from crossterm polling; application events arrive
//! on a channel from the background tasks spawned by the send pipeline.

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::time::Duration;

/// Terminal events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard event
    Key(KeyEvent),
    /// Mouse event
    Mouse(MouseEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick for animations
    Tick,
}

/// Event handler for polling terminal events
pub struct EventHandler {
    /// Tick rate for animations (milliseconds)
    tick_rate: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl EventHandler {
    /// Create a new event handler with specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Poll for the next event
    pub fn next(&self) -> std::io::Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CrosstermEvent::Key(key) => Ok(Event::Key(key)),
                CrosstermEvent::Mouse(mouse) => Ok(Event::Mouse(mouse)),
                CrosstermEvent::Resize(w, h) => Ok(Event::Resize(w, h)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

/// Results delivered asynchronously by background tasks.
///
/// Every variant carries the chat id it belongs to, so patches still land
/// correctly when the user has switched chats in the meantime.
#[derive(Debug)]
pub enum AppEvent {
    /// The gateway produced a reply for a sent message
    CompletionOk { chat_id: String, text: String },
    /// The gateway call failed
    CompletionFailed { chat_id: String, error: String },
    /// A generated title for a chat's first message is ready
    TitleReady { chat_id: String, title: String },
}
