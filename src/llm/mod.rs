//! Inference gateway - the external completion service behind the chat
//!
//! The rest of the application only sees the [`Gateway`] trait; the one
//! production implementation talks to the Google generative-language API.
//! Keeping the seam here lets tests substitute a scripted gateway.

mod error;
mod gemini;

pub use error::GatewayError;
pub use gemini::GeminiClient;

use crate::config::GatewayConfig;
use crate::store::{Message, Role};
use async_trait::async_trait;
use std::sync::Arc;

/// Fallback chat label when title generation fails
pub const DEFAULT_TITLE: &str = "New Conversation";

/// One prior conversation turn, as sent over the wire
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl From<&Message> for Turn {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            text: msg.text.clone(),
        }
    }
}

/// Completion service consumed by the send pipeline
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Provider name, for logging
    fn name(&self) -> &str;

    /// Send the full prior history plus one new user message and return
    /// the assistant's reply text. An answer without usable text is an
    /// error, not an empty string.
    async fn complete(&self, history: &[Turn], message: &str) -> Result<String, GatewayError>;

    /// Ask for a 2-4 word label for a chat whose first message is given.
    /// Best-effort: the caller degrades to [`DEFAULT_TITLE`] on error.
    async fn summarize_title(&self, first_message: &str) -> Result<String, GatewayError>;
}

/// Build the production gateway from configuration.
pub fn create_gateway(config: &GatewayConfig) -> Arc<dyn Gateway> {
    Arc::new(GeminiClient::new(config))
}
