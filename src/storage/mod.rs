//! Durable storage for conversation state
//!
//! Three independent slots under the user data directory:
//!
//! ~/.local/share/qai/            (platform equivalent via ProjectDirs)
//! ├── chats.json                 # versioned chat collection
//! ├── active_chat                # active chat id, plain string
//! └── theme                      # "dark" | "light", plain string
//!
//! Writes are whole-value overwrites and best-effort; the application is
//! the single writer, so the last write wins. Missing or malformed data is
//! treated as absence and replaced by the seeded default on load.

use crate::store::{Chat, ChatStore};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CHATS_FILE: &str = "chats.json";
const ACTIVE_FILE: &str = "active_chat";
const THEME_FILE: &str = "theme";

/// Schema version for the chats slot; bump on incompatible layout changes.
const STORAGE_VERSION: u32 = 1;

/// Display theme preference, persisted as a plain string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    #[default]
    Dark,
    Light,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Dark => "dark",
            ThemePreference::Light => "light",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemePreference::Dark => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
        }
    }
}

impl FromStr for ThemePreference {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(ThemePreference::Dark),
            "light" => Ok(ThemePreference::Light),
            _ => Err(()),
        }
    }
}

/// Versioned on-disk wrapper for the chat collection
#[derive(Debug, Serialize, Deserialize)]
struct ChatsSlot {
    version: u32,
    chats: Vec<Chat>,
}

/// Everything restored at startup
#[derive(Debug)]
pub struct PersistedState {
    pub store: ChatStore,
    pub theme: ThemePreference,
}

/// Persistence adapter over the data directory
pub struct ArchitectStorage {
    root: PathBuf,
}

impl ArchitectStorage {
    /// Storage at the platform data directory
    pub fn new() -> Result<Self> {
        let root = if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "qai") {
            proj_dirs.data_dir().to_path_buf()
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".qai")
        };
        Self::at(root)
    }

    /// Storage rooted at an explicit directory (tests, `--data-dir`)
    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Restore the full persisted state. Every slot degrades independently:
    /// a broken chats slot seeds a single empty chat, a dangling active id
    /// falls back to the first chat, a broken theme slot defaults to dark.
    pub fn load(&self) -> PersistedState {
        let chats = self.load_chats();
        let active = self.load_active_chat_id();
        PersistedState {
            store: ChatStore::from_parts(chats, active),
            theme: self.load_theme(),
        }
    }

    fn load_chats(&self) -> Vec<Chat> {
        let path = self.root.join(CHATS_FILE);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Vec::new();
        };
        match serde_json::from_str::<ChatsSlot>(&content) {
            Ok(slot) if slot.version == STORAGE_VERSION => slot.chats,
            Ok(slot) => {
                tracing::warn!(
                    version = slot.version,
                    "Unsupported chats schema version, starting fresh"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Discarding malformed {}: {}", CHATS_FILE, e);
                Vec::new()
            }
        }
    }

    fn load_active_chat_id(&self) -> Option<String> {
        std::fs::read_to_string(self.root.join(ACTIVE_FILE))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn load_theme(&self) -> ThemePreference {
        std::fs::read_to_string(self.root.join(THEME_FILE))
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Overwrite the chat collection slot.
    pub fn save_chats(&self, chats: &[Chat]) -> Result<()> {
        let slot = ChatsSlot {
            version: STORAGE_VERSION,
            chats: chats.to_vec(),
        };
        let content = serde_json::to_string_pretty(&slot)?;
        std::fs::write(self.root.join(CHATS_FILE), content)
            .with_context(|| format!("Failed to write {}", CHATS_FILE))
    }

    /// Overwrite the active-chat pointer; `None` clears the slot.
    pub fn save_active_chat(&self, id: Option<&str>) -> Result<()> {
        let path = self.root.join(ACTIVE_FILE);
        match id {
            Some(id) => std::fs::write(&path, id)
                .with_context(|| format!("Failed to write {}", ACTIVE_FILE)),
            None => {
                if path.exists() {
                    std::fs::remove_file(&path)
                        .with_context(|| format!("Failed to clear {}", ACTIVE_FILE))?;
                }
                Ok(())
            }
        }
    }

    pub fn save_theme(&self, theme: ThemePreference) -> Result<()> {
        std::fs::write(self.root.join(THEME_FILE), theme.as_str())
            .with_context(|| format!("Failed to write {}", THEME_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Message, MessageWidget, TaskList, SEED_CHAT_TITLE};

    fn storage() -> (tempfile::TempDir, ArchitectStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = ArchitectStorage::at(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_load_empty_directory_seeds_one_active_chat() {
        let (_dir, storage) = storage();
        let state = storage.load();

        assert_eq!(state.store.chats().len(), 1);
        let chat = &state.store.chats()[0];
        assert_eq!(chat.title, SEED_CHAT_TITLE);
        assert!(chat.messages.is_empty());
        assert_eq!(state.store.active_chat_id(), Some(chat.id.as_str()));
        assert_eq!(state.theme, ThemePreference::Dark);
    }

    #[test]
    fn test_load_corrupt_chats_seeds() {
        let (_dir, storage) = storage();
        std::fs::write(storage.root().join(CHATS_FILE), "{not json").unwrap();

        let state = storage.load();
        assert_eq!(state.store.chats().len(), 1);
        assert_eq!(state.store.chats()[0].title, SEED_CHAT_TITLE);
    }

    #[test]
    fn test_load_future_schema_version_seeds() {
        let (_dir, storage) = storage();
        std::fs::write(
            storage.root().join(CHATS_FILE),
            r#"{"version": 99, "chats": []}"#,
        )
        .unwrap();

        let state = storage.load();
        assert_eq!(state.store.chats().len(), 1);
        assert!(state.store.chats()[0].messages.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let (_dir, storage) = storage();
        let mut store = ChatStore::new();
        let chat_id = store.create_chat();
        store.append_message(&chat_id, Message::user("Hello"));
        store.append_message(
            &chat_id,
            Message::assistant("Checklist time.").with_widget(Some(MessageWidget::Checklist(
                TaskList::new(["a".to_string(), "b".to_string()]),
            ))),
        );
        store.set_title(&chat_id, "Greeting Design");

        storage.save_chats(store.chats()).unwrap();
        storage.save_active_chat(Some(&chat_id)).unwrap();

        let restored = storage.load();
        assert_eq!(restored.store.chats().len(), 1);
        let chat = &restored.store.chats()[0];
        assert_eq!(chat.id, chat_id);
        assert_eq!(chat.title, "Greeting Design");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].text, "Hello");
        match &chat.messages[1].widget {
            Some(MessageWidget::Checklist(list)) => assert_eq!(list.tasks.len(), 2),
            other => panic!("widget lost in round trip: {other:?}"),
        }
        assert_eq!(restored.store.active_chat_id(), Some(chat_id.as_str()));
    }

    #[test]
    fn test_dangling_active_pointer_falls_back_to_first() {
        let (_dir, storage) = storage();
        let mut store = ChatStore::new();
        let chat_id = store.create_chat();
        storage.save_chats(store.chats()).unwrap();
        storage
            .save_active_chat(Some("chat_deleted_elsewhere"))
            .unwrap();

        let restored = storage.load();
        assert_eq!(restored.store.active_chat_id(), Some(chat_id.as_str()));
    }

    #[test]
    fn test_theme_round_trip_and_garbage_default() {
        let (_dir, storage) = storage();
        storage.save_theme(ThemePreference::Light).unwrap();
        assert_eq!(storage.load_theme(), ThemePreference::Light);

        std::fs::write(storage.root().join(THEME_FILE), "solarized").unwrap();
        assert_eq!(storage.load_theme(), ThemePreference::Dark);
    }

    #[test]
    fn test_clear_active_slot() {
        let (_dir, storage) = storage();
        storage.save_active_chat(Some("chat_x")).unwrap();
        storage.save_active_chat(None).unwrap();
        assert_eq!(storage.load_active_chat_id(), None);
    }
}
