//! QAI - a prompt-architecting chat client for the terminal
//!
//! Wraps a generative-language API in a guided conversation: the assistant
//! interviews the user, tracks requirements through inline checklists and
//! option pickers, and ends with a copyable final prompt.

pub mod config;
pub mod llm;
pub mod storage;
pub mod store;
pub mod tui;

pub use config::Config;
pub use llm::{create_gateway, Gateway, GatewayError};
pub use storage::{ArchitectStorage, ThemePreference};
pub use store::{Chat, ChatStore, Message, MessageWidget, Role};
