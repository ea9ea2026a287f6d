//! Conversation store - chats, messages, and the active selection
//!
//! Single source of truth for all conversation state. Every mutation is a
//! whole-chat replacement: the affected chat is rebuilt and swapped into the
//! collection, so snapshots handed to persistence or rendering never observe
//! a half-applied update. Mutations are keyed by chat id, which lets the
//! asynchronous title and completion patches land in either order.

pub mod widgets;

pub use widgets::{extract_widget, MessageWidget, OptionPicker, PickerOption, Task, TaskList};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to brand-new chats until the gateway produces one
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Title of the chat seeded on first run (and the title fallback)
pub const SEED_CHAT_TITLE: &str = "New Conversation";

/// Who authored a message (wire roles: `user` / `model`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn in a chat, optionally carrying an interactive widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub widget: Option<MessageWidget>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: format!("msg_{}", uuid::Uuid::new_v4()),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            widget: None,
        }
    }

    pub fn with_widget(mut self, widget: Option<MessageWidget>) -> Self {
        self.widget = widget;
        self
    }

    /// The message's widget, unless it has already been submitted
    pub fn pending_widget(&self) -> Option<&MessageWidget> {
        self.widget.as_ref().filter(|w| !w.is_submitted())
    }
}

/// One independent conversation thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Chat {
    pub fn new() -> Self {
        Self::with_title(DEFAULT_CHAT_TITLE)
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("chat_{}", uuid::Uuid::new_v4()),
            title: title.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the chat collection and the active-chat pointer.
///
/// Invariant: the active pointer always names a chat present in the
/// collection, or is `None` iff the collection is empty.
#[derive(Debug, Clone, Default)]
pub struct ChatStore {
    chats: Vec<Chat>,
    active: Option<String>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a single seeded empty chat, selected (first-run state)
    pub fn seeded() -> Self {
        let chat = Chat::with_title(SEED_CHAT_TITLE);
        let active = Some(chat.id.clone());
        Self {
            chats: vec![chat],
            active,
        }
    }

    /// Rebuild a store from persisted parts, repairing the active pointer
    /// if it no longer resolves.
    pub fn from_parts(chats: Vec<Chat>, active: Option<String>) -> Self {
        if chats.is_empty() {
            return Self::seeded();
        }
        let active = active
            .filter(|id| chats.iter().any(|c| &c.id == id))
            .or_else(|| chats.first().map(|c| c.id.clone()));
        Self { chats, active }
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn active_chat_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.active.as_deref().and_then(|id| self.chat(id))
    }

    pub fn chat(&self, id: &str) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == id)
    }

    /// Insert a new empty chat at the front and make it active.
    pub fn create_chat(&mut self) -> String {
        let chat = Chat::new();
        let id = chat.id.clone();
        self.chats.insert(0, chat);
        self.active = Some(id.clone());
        id
    }

    /// Remove a chat; idempotent. If it was active, the first remaining
    /// chat becomes active, or none when the collection empties.
    pub fn delete_chat(&mut self, id: &str) {
        self.chats.retain(|c| c.id != id);
        if self.active.as_deref() == Some(id) {
            self.active = self.chats.first().map(|c| c.id.clone());
        }
    }

    /// Point the active selection at an existing chat; no-op if absent.
    pub fn select_chat(&mut self, id: &str) {
        if self.chats.iter().any(|c| c.id == id) {
            self.active = Some(id.to_string());
        }
    }

    pub fn select_next_chat(&mut self) {
        self.select_offset(1);
    }

    pub fn select_prev_chat(&mut self) {
        self.select_offset(-1);
    }

    fn select_offset(&mut self, delta: isize) {
        let Some(active) = self.active.as_deref() else {
            return;
        };
        let Some(pos) = self.chats.iter().position(|c| c.id == active) else {
            return;
        };
        let len = self.chats.len() as isize;
        let next = (pos as isize + delta).rem_euclid(len) as usize;
        self.active = Some(self.chats[next].id.clone());
    }

    pub fn append_message(&mut self, chat_id: &str, message: Message) {
        self.update_chat(chat_id, |mut chat| {
            chat.messages.push(message);
            chat
        });
    }

    pub fn set_title(&mut self, chat_id: &str, title: &str) {
        self.update_chat(chat_id, |mut chat| {
            chat.title = title.to_string();
            chat
        });
    }

    /// Flip one task's completion; no-op if any id fails to resolve or the
    /// checklist was already submitted.
    pub fn toggle_task(&mut self, chat_id: &str, message_id: &str, task_id: &str) {
        self.update_checklist(chat_id, message_id, |list| {
            list.toggle(task_id);
        });
    }

    /// Mass-uncheck when every task is complete, mass-check otherwise.
    pub fn toggle_all_tasks(&mut self, chat_id: &str, message_id: &str) {
        self.update_checklist(chat_id, message_id, |list| {
            list.toggle_all();
        });
    }

    /// Select one picker option. Ids outside the declared option set are
    /// rejected so the selection always resolves.
    pub fn select_option(&mut self, chat_id: &str, message_id: &str, option_id: &str) {
        self.update_message(chat_id, message_id, |mut msg| {
            if let Some(MessageWidget::OptionPicker(picker)) = &mut msg.widget {
                if !picker.submitted {
                    picker.select(option_id);
                }
            }
            msg
        });
    }

    /// Freeze a checklist and return the outbound summary text.
    pub fn submit_checklist(&mut self, chat_id: &str, message_id: &str) -> Option<String> {
        let text = match self.chat(chat_id)?.message(message_id)?.pending_widget()? {
            MessageWidget::Checklist(list) => list.submission_text(),
            MessageWidget::OptionPicker(_) => return None,
        };
        self.mark_submitted(chat_id, message_id);
        Some(text)
    }

    /// Freeze a picker and return the outbound text; `None` (and no state
    /// change) while nothing is selected.
    pub fn submit_picker(&mut self, chat_id: &str, message_id: &str) -> Option<String> {
        let text = match self.chat(chat_id)?.message(message_id)?.pending_widget()? {
            MessageWidget::OptionPicker(picker) => picker.submission_text()?,
            MessageWidget::Checklist(_) => return None,
        };
        self.mark_submitted(chat_id, message_id);
        Some(text)
    }

    fn mark_submitted(&mut self, chat_id: &str, message_id: &str) {
        self.update_message(chat_id, message_id, |mut msg| {
            if let Some(widget) = &mut msg.widget {
                widget.mark_submitted();
            }
            msg
        });
    }

    fn update_chat<F>(&mut self, chat_id: &str, update: F)
    where
        F: FnOnce(Chat) -> Chat,
    {
        if let Some(slot) = self.chats.iter_mut().find(|c| c.id == chat_id) {
            let mut chat = update(slot.clone());
            chat.updated_at = Utc::now();
            *slot = chat;
        }
    }

    fn update_message<F>(&mut self, chat_id: &str, message_id: &str, update: F)
    where
        F: FnOnce(Message) -> Message,
    {
        self.update_chat(chat_id, |mut chat| {
            if let Some(slot) = chat.messages.iter_mut().find(|m| m.id == message_id) {
                *slot = update(slot.clone());
            }
            chat
        });
    }

    fn update_checklist<F>(&mut self, chat_id: &str, message_id: &str, update: F)
    where
        F: FnOnce(&mut TaskList),
    {
        self.update_message(chat_id, message_id, |mut msg| {
            if let Some(MessageWidget::Checklist(list)) = &mut msg.widget {
                if !list.submitted {
                    update(list);
                }
            }
            msg
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checklist_message(items: &[&str]) -> Message {
        Message::assistant("Here is your checklist.").with_widget(Some(
            MessageWidget::Checklist(TaskList::new(items.iter().map(|s| s.to_string()))),
        ))
    }

    #[test]
    fn test_create_chat_becomes_active_and_front() {
        let mut store = ChatStore::seeded();
        let seeded = store.chats()[0].id.clone();
        let id = store.create_chat();

        assert_eq!(store.active_chat_id(), Some(id.as_str()));
        assert_eq!(store.chats()[0].id, id);
        assert_eq!(store.chats()[1].id, seeded);
        assert_eq!(store.chats()[0].title, DEFAULT_CHAT_TITLE);
    }

    #[test]
    fn test_delete_active_repoints_to_first_remaining() {
        let mut store = ChatStore::new();
        let a = store.create_chat();
        let b = store.create_chat();
        // b was created last, so it's at the front and active
        assert_eq!(store.active_chat_id(), Some(b.as_str()));

        store.delete_chat(&b);
        assert_eq!(store.active_chat_id(), Some(a.as_str()));

        store.delete_chat(&a);
        assert_eq!(store.active_chat_id(), None);
        assert!(store.chats().is_empty());
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let mut store = ChatStore::new();
        let a = store.create_chat();
        let b = store.create_chat();

        store.delete_chat(&a);
        assert_eq!(store.active_chat_id(), Some(b.as_str()));
        assert_eq!(store.chats().len(), 1);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut store = ChatStore::seeded();
        store.delete_chat("chat_nope");
        assert_eq!(store.chats().len(), 1);
        assert!(store.active_chat().is_some());
    }

    #[test]
    fn test_select_missing_chat_is_noop() {
        let mut store = ChatStore::new();
        let a = store.create_chat();
        store.select_chat("chat_missing");
        assert_eq!(store.active_chat_id(), Some(a.as_str()));
    }

    #[test]
    fn test_append_to_unknown_chat_is_noop() {
        let mut store = ChatStore::seeded();
        store.append_message("chat_missing", Message::user("hello"));
        assert!(store.chats()[0].messages.is_empty());
    }

    #[test]
    fn test_set_title_targets_one_chat() {
        let mut store = ChatStore::new();
        let a = store.create_chat();
        let b = store.create_chat();

        store.set_title(&a, "Viral Campaign");
        assert_eq!(store.chat(&a).unwrap().title, "Viral Campaign");
        assert_eq!(store.chat(&b).unwrap().title, DEFAULT_CHAT_TITLE);
    }

    #[test]
    fn test_title_and_append_commute() {
        // The title patch and the completion patch may land in either
        // order; both orders must converge on the same state.
        let mut forward = ChatStore::new();
        let id = forward.create_chat();
        forward.append_message(&id, Message::user("hi"));
        let mut reverse = forward.clone();

        forward.set_title(&id, "Greetings");
        forward.append_message(&id, Message::assistant("hello"));

        reverse.append_message(&id, Message::assistant("hello"));
        reverse.set_title(&id, "Greetings");

        let f = forward.chat(&id).unwrap();
        let r = reverse.chat(&id).unwrap();
        assert_eq!(f.title, r.title);
        assert_eq!(f.messages.len(), r.messages.len());
        assert_eq!(f.messages[1].text, r.messages[1].text);
    }

    #[test]
    fn test_toggle_task_flips_exactly_one() {
        let mut store = ChatStore::new();
        let chat_id = store.create_chat();
        let msg = checklist_message(&["define scope", "pick a tone"]);
        let msg_id = msg.id.clone();
        store.append_message(&chat_id, msg);

        let task_id = {
            let Some(MessageWidget::Checklist(list)) =
                &store.chat(&chat_id).unwrap().message(&msg_id).unwrap().widget
            else {
                panic!("expected checklist");
            };
            list.tasks[0].id.clone()
        };

        store.toggle_task(&chat_id, &msg_id, &task_id);
        let Some(MessageWidget::Checklist(list)) =
            &store.chat(&chat_id).unwrap().message(&msg_id).unwrap().widget
        else {
            panic!("expected checklist");
        };
        assert!(list.tasks[0].completed);
        assert!(!list.tasks[1].completed);

        // Unknown ids resolve to nothing and change nothing
        let mut untouched = store.clone();
        untouched.toggle_task(&chat_id, &msg_id, "task_nope");
        untouched.toggle_task(&chat_id, "msg_nope", &task_id);
        let Some(MessageWidget::Checklist(after)) = &untouched
            .chat(&chat_id)
            .unwrap()
            .message(&msg_id)
            .unwrap()
            .widget
        else {
            panic!("expected checklist");
        };
        assert_eq!(after.tasks[0].completed, list.tasks[0].completed);
        assert_eq!(after.tasks[1].completed, list.tasks[1].completed);
    }

    #[test]
    fn test_toggle_all_checks_on_mixed_state() {
        let mut store = ChatStore::new();
        let chat_id = store.create_chat();
        let msg = checklist_message(&["one", "two"]);
        let msg_id = msg.id.clone();
        let first_task = match &msg.widget {
            Some(MessageWidget::Checklist(l)) => l.tasks[0].id.clone(),
            _ => unreachable!(),
        };
        store.append_message(&chat_id, msg);

        store.toggle_task(&chat_id, &msg_id, &first_task);
        store.toggle_all_tasks(&chat_id, &msg_id);

        let Some(MessageWidget::Checklist(list)) =
            &store.chat(&chat_id).unwrap().message(&msg_id).unwrap().widget
        else {
            panic!("expected checklist");
        };
        assert!(list.tasks.iter().all(|t| t.completed));
    }

    #[test]
    fn test_select_option_rejects_foreign_id() {
        let mut store = ChatStore::new();
        let chat_id = store.create_chat();
        let picker = OptionPicker::new(
            "Pick an aesthetic",
            ["Minimalist", "Brutalist"].iter().map(|s| s.to_string()),
        );
        let good = picker.options[0].id.clone();
        let msg = Message::assistant("Choose one.")
            .with_widget(Some(MessageWidget::OptionPicker(picker)));
        let msg_id = msg.id.clone();
        store.append_message(&chat_id, msg);

        store.select_option(&chat_id, &msg_id, "opt_not_there");
        let Some(MessageWidget::OptionPicker(p)) =
            &store.chat(&chat_id).unwrap().message(&msg_id).unwrap().widget
        else {
            panic!("expected picker");
        };
        assert_eq!(p.selected_id, None);

        store.select_option(&chat_id, &msg_id, &good);
        let Some(MessageWidget::OptionPicker(p)) =
            &store.chat(&chat_id).unwrap().message(&msg_id).unwrap().widget
        else {
            panic!("expected picker");
        };
        assert_eq!(p.selected_id.as_deref(), Some(good.as_str()));
    }

    #[test]
    fn test_submit_picker_requires_selection() {
        let mut store = ChatStore::new();
        let chat_id = store.create_chat();
        let picker = OptionPicker::new("Aesthetic", ["Minimalist"].iter().map(|s| s.to_string()));
        let opt = picker.options[0].id.clone();
        let msg =
            Message::assistant("Choose.").with_widget(Some(MessageWidget::OptionPicker(picker)));
        let msg_id = msg.id.clone();
        store.append_message(&chat_id, msg);

        assert_eq!(store.submit_picker(&chat_id, &msg_id), None);

        store.select_option(&chat_id, &msg_id, &opt);
        let text = store.submit_picker(&chat_id, &msg_id).unwrap();
        assert_eq!(text, "I've selected the Minimalist aesthetic.");

        // Submission freezes the widget: no second submit, no more toggles
        assert_eq!(store.submit_picker(&chat_id, &msg_id), None);
    }

    #[test]
    fn test_submitted_checklist_rejects_toggles() {
        let mut store = ChatStore::new();
        let chat_id = store.create_chat();
        let msg = checklist_message(&["alpha"]);
        let msg_id = msg.id.clone();
        let task_id = match &msg.widget {
            Some(MessageWidget::Checklist(l)) => l.tasks[0].id.clone(),
            _ => unreachable!(),
        };
        store.append_message(&chat_id, msg);

        assert!(store.submit_checklist(&chat_id, &msg_id).is_some());
        store.toggle_task(&chat_id, &msg_id, &task_id);

        let Some(MessageWidget::Checklist(list)) =
            &store.chat(&chat_id).unwrap().message(&msg_id).unwrap().widget
        else {
            panic!("expected checklist");
        };
        assert!(!list.tasks[0].completed);
        assert!(list.submitted);
    }

    #[test]
    fn test_from_parts_repairs_dangling_active() {
        let a = Chat::new();
        let first = a.id.clone();
        let store = ChatStore::from_parts(vec![a, Chat::new()], Some("chat_gone".into()));
        assert_eq!(store.active_chat_id(), Some(first.as_str()));
    }

    #[test]
    fn test_from_parts_empty_seeds() {
        let store = ChatStore::from_parts(Vec::new(), None);
        assert_eq!(store.chats().len(), 1);
        assert_eq!(store.chats()[0].title, SEED_CHAT_TITLE);
        assert!(store.chats()[0].messages.is_empty());
        assert_eq!(store.active_chat_id(), Some(store.chats()[0].id.as_str()));
    }

    #[test]
    fn test_select_next_prev_wraps() {
        let mut store = ChatStore::new();
        let a = store.create_chat();
        let b = store.create_chat();
        // Order: [b, a], active = b
        store.select_next_chat();
        assert_eq!(store.active_chat_id(), Some(a.as_str()));
        store.select_next_chat();
        assert_eq!(store.active_chat_id(), Some(b.as_str()));
        store.select_prev_chat();
        assert_eq!(store.active_chat_id(), Some(a.as_str()));
    }
}
