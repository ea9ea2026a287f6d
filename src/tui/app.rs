//! Application state and the send pipeline
//!
//! `App` owns the in-memory store, the persistence adapter, and the gateway
//! handle. Gateway calls run on spawned tasks and report back through the
//! [`AppEvent`] channel, so the UI never blocks on the network.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::llm::{Gateway, Turn, DEFAULT_TITLE};
use crate::storage::{ArchitectStorage, ThemePreference};
use crate::store::{extract_widget, ChatStore, Message, MessageWidget};

use super::events::AppEvent;

/// Which pane receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
    Widget,
}

pub struct App {
    pub store: ChatStore,
    storage: ArchitectStorage,
    gateway: Arc<dyn Gateway>,
    events_tx: mpsc::UnboundedSender<AppEvent>,

    pub input: String,
    pub focus: Focus,
    /// Cursor row inside the pending widget
    pub widget_cursor: usize,
    /// A completion is in flight; sends are gated until it lands
    pub is_loading: bool,
    pub error: Option<String>,
    /// Transient status line, e.g. after copying a prompt
    pub status: Option<String>,
    pub theme_pref: ThemePreference,
    pub scroll_offset: u16,
    pub should_quit: bool,

    suggestions: Vec<String>,
}

impl App {
    pub fn new(
        storage: ArchitectStorage,
        gateway: Arc<dyn Gateway>,
        events_tx: mpsc::UnboundedSender<AppEvent>,
        suggestions: Vec<String>,
    ) -> Self {
        let state = storage.load();
        Self {
            store: state.store,
            storage,
            gateway,
            events_tx,
            input: String::new(),
            focus: Focus::Input,
            widget_cursor: 0,
            is_loading: false,
            error: None,
            status: None,
            theme_pref: state.theme,
            scroll_offset: 0,
            should_quit: false,
            suggestions,
        }
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// The unsubmitted widget shown at the bottom of the active transcript,
    /// with the id of the message carrying it.
    pub fn pending_widget(&self) -> Option<(&str, &MessageWidget)> {
        let chat = self.store.active_chat()?;
        chat.messages
            .iter()
            .rev()
            .find_map(|m| m.pending_widget().map(|w| (m.id.as_str(), w)))
    }

    /// Send a user message through the gateway.
    ///
    /// Appends optimistically, then spawns the completion call and, for the
    /// first message of a chat, a title generation call. No-op while a
    /// completion is already in flight or when the text is blank.
    pub fn send_message(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() || self.is_loading {
            return;
        }
        let Some(chat_id) = self.store.active_chat_id().map(str::to_string) else {
            return;
        };

        self.error = None;
        self.status = None;

        let history: Vec<Turn> = self
            .store
            .chat(&chat_id)
            .map(|c| c.messages.iter().map(Turn::from).collect())
            .unwrap_or_default();
        let is_first_message = history.is_empty();

        self.store.append_message(&chat_id, Message::user(text));
        self.persist_chats();
        self.is_loading = true;
        self.scroll_offset = 0;

        let gateway = self.gateway.clone();
        let tx = self.events_tx.clone();
        let message = text.to_string();
        let id = chat_id.clone();
        tokio::spawn(async move {
            let event = match gateway.complete(&history, &message).await {
                Ok(text) => AppEvent::CompletionOk { chat_id: id, text },
                Err(e) => AppEvent::CompletionFailed {
                    chat_id: id,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(event);
        });

        if is_first_message {
            let gateway = self.gateway.clone();
            let tx = self.events_tx.clone();
            let first_message = text.to_string();
            tokio::spawn(async move {
                let title = match gateway.summarize_title(&first_message).await {
                    Ok(title) => title,
                    Err(e) => {
                        tracing::warn!("Title generation failed: {}", e);
                        DEFAULT_TITLE.to_string()
                    }
                };
                let _ = tx.send(AppEvent::TitleReady { chat_id, title });
            });
        }
    }

    /// Apply one background-task result to the store.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CompletionOk { chat_id, text } => {
                let (display_text, widget) = extract_widget(&text);
                self.store
                    .append_message(&chat_id, Message::assistant(&display_text).with_widget(widget));
                self.is_loading = false;
                self.widget_cursor = 0;
                self.persist_chats();
            }
            AppEvent::CompletionFailed { chat_id: _, error } => {
                self.is_loading = false;
                self.error = Some(error);
            }
            AppEvent::TitleReady { chat_id, title } => {
                self.store.set_title(&chat_id, &title);
                self.persist_chats();
            }
        }
    }

    pub fn new_chat(&mut self) {
        self.store.create_chat();
        self.focus = Focus::Input;
        self.scroll_offset = 0;
        self.persist_chats();
        self.persist_active();
    }

    pub fn delete_active_chat(&mut self) {
        if let Some(id) = self.store.active_chat_id().map(str::to_string) {
            self.store.delete_chat(&id);
            self.persist_chats();
            self.persist_active();
        }
    }

    pub fn select_next_chat(&mut self) {
        self.store.select_next_chat();
        self.scroll_offset = 0;
        self.persist_active();
    }

    pub fn select_prev_chat(&mut self) {
        self.store.select_prev_chat();
        self.scroll_offset = 0;
        self.persist_active();
    }

    pub fn toggle_theme(&mut self) {
        self.theme_pref = self.theme_pref.toggled();
        if let Err(e) = self.storage.save_theme(self.theme_pref) {
            tracing::warn!("Failed to persist theme: {}", e);
        }
    }

    /// Copy the last fenced code block of the newest assistant reply.
    pub fn copy_final_prompt(&mut self) {
        let block = self.store.active_chat().and_then(|chat| {
            chat.messages
                .iter()
                .rev()
                .find(|m| m.role == crate::store::Role::Model)
                .and_then(|m| super::markdown::last_code_block(&m.text))
        });
        let Some(block) = block else {
            self.status = Some("No prompt block to copy".to_string());
            return;
        };
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(block)) {
            Ok(()) => self.status = Some("Prompt copied to clipboard".to_string()),
            Err(e) => self.error = Some(format!("Clipboard unavailable: {}", e)),
        }
    }

    /// Route a key event based on the focused pane.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Global shortcuts first
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('n') => {
                    self.new_chat();
                    return;
                }
                KeyCode::Char('d') => {
                    self.delete_active_chat();
                    return;
                }
                KeyCode::Char('t') => {
                    self.toggle_theme();
                    return;
                }
                KeyCode::Char('y') => {
                    self.copy_final_prompt();
                    return;
                }
                KeyCode::Char('j') => {
                    self.select_next_chat();
                    return;
                }
                KeyCode::Char('k') => {
                    self.select_prev_chat();
                    return;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Esc => {
                if self.error.is_some() || self.status.is_some() {
                    self.error = None;
                    self.status = None;
                } else if self.focus != Focus::Input {
                    self.focus = Focus::Input;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            KeyCode::Tab => {
                self.cycle_focus();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::Widget => self.handle_widget_key(key),
            Focus::Sidebar => self.handle_sidebar_key(key),
        }
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input if self.pending_widget().is_some() => Focus::Widget,
            Focus::Input => Focus::Sidebar,
            Focus::Widget => Focus::Sidebar,
            Focus::Sidebar => Focus::Input,
        };
        self.widget_cursor = 0;
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                self.send_message(&text);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                // Digit shortcuts pick a starter prompt on an empty chat
                if self.input.is_empty()
                    && self
                        .store
                        .active_chat()
                        .is_some_and(|chat| chat.messages.is_empty())
                {
                    if let Some(d) = c.to_digit(10) {
                        let idx = d.wrapping_sub(1) as usize;
                        if let Some(suggestion) = self.suggestions.get(idx).cloned() {
                            self.send_message(&suggestion);
                            return;
                        }
                    }
                }
                self.input.push(c);
            }
            KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_add(1),
            KeyCode::Down => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_add(10),
            KeyCode::PageDown => self.scroll_offset = self.scroll_offset.saturating_sub(10),
            _ => {}
        }
    }

    fn handle_widget_key(&mut self, key: KeyEvent) {
        let Some((message_id, widget)) = self
            .pending_widget()
            .map(|(id, w)| (id.to_string(), w.clone()))
        else {
            self.focus = Focus::Input;
            return;
        };
        let Some(chat_id) = self.store.active_chat_id().map(str::to_string) else {
            return;
        };
        let rows = widget.row_count();

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.widget_cursor = self.widget_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.widget_cursor + 1 < rows {
                    self.widget_cursor += 1;
                }
            }
            KeyCode::Char(' ') => match &widget {
                MessageWidget::Checklist(list) => {
                    if let Some(task) = list.tasks.get(self.widget_cursor) {
                        let task_id = task.id.clone();
                        self.store.toggle_task(&chat_id, &message_id, &task_id);
                        self.persist_chats();
                    }
                }
                MessageWidget::OptionPicker(picker) => {
                    if let Some(option) = picker.options.get(self.widget_cursor) {
                        let option_id = option.id.clone();
                        self.store.select_option(&chat_id, &message_id, &option_id);
                        self.persist_chats();
                    }
                }
            },
            KeyCode::Char('a') => {
                if matches!(widget, MessageWidget::Checklist(_)) {
                    self.store.toggle_all_tasks(&chat_id, &message_id);
                    self.persist_chats();
                }
            }
            KeyCode::Enter => {
                if self.is_loading {
                    return;
                }
                let submission = match &widget {
                    MessageWidget::Checklist(_) => {
                        self.store.submit_checklist(&chat_id, &message_id)
                    }
                    MessageWidget::OptionPicker(_) => {
                        self.store.submit_picker(&chat_id, &message_id)
                    }
                };
                if let Some(text) = submission {
                    self.persist_chats();
                    self.focus = Focus::Input;
                    self.send_message(&text);
                }
            }
            _ => {}
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_prev_chat(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next_chat(),
            KeyCode::Enter => self.focus = Focus::Input,
            KeyCode::Char('d') => self.delete_active_chat(),
            KeyCode::Char('n') => self.new_chat(),
            _ => {}
        }
    }

    fn persist_chats(&self) {
        if let Err(e) = self.storage.save_chats(self.store.chats()) {
            tracing::warn!("Failed to persist chats: {}", e);
        }
    }

    fn persist_active(&self) {
        if let Err(e) = self.storage.save_active_chat(self.store.active_chat_id()) {
            tracing::warn!("Failed to persist active chat: {}", e);
        }
    }
}
