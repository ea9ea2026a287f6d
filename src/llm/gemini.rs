//! Google generative-language API client
//!
//! SECURITY: the API key is only ever sent to the official Google endpoint.

use super::{Gateway, GatewayError, Turn};
use crate::config::GatewayConfig;
use crate::store::Role;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;

/// Official Google generative-language API endpoint
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// System instruction establishing the prompt-architect persona
const ARCHITECT_PERSONA: &str = r#"You are QAI, the world's most advanced Prompt Architect.
Your goal is to help users create "masterpiece" prompts for AI models.

CRITICAL RULES:
1. DO NOT give the final prompt immediately.
2. Ask simple, engaging questions ONE BY ONE to understand the user's vision.
3. Be precise, encouraging, and exciting.
4. Once you have enough information (usually after 3-5 questions), craft a "piece of art" final prompt.
5. The final prompt MUST be enclosed in a markdown code block for easy copying.
6. Use elegant language and maintain a sophisticated, professional, yet fun persona.

If the user is vague, ask clarifying questions about:
- The desired output format
- The tone and style
- The target audience
- Specific constraints or data to include"#;

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_key_env: String,
    model: String,
    max_output_tokens: usize,
    system_instruction: String,
}

impl GeminiClient {
    /// Build the client. A missing key is recorded, not fatal: requests
    /// fail with `MissingCredential` at call time instead.
    pub fn new(config: &GatewayConfig) -> Self {
        let api_key = env::var(&config.api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "{} is not set; gateway calls will fail until it is provided",
                config.api_key_env
            );
        }

        Self {
            client: reqwest::Client::new(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            system_instruction: config
                .persona
                .clone()
                .unwrap_or_else(|| ARCHITECT_PERSONA.to_string()),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn convert_history(history: &[Turn], new_message: &str) -> Vec<GeminiContent> {
        let mut contents: Vec<GeminiContent> = history
            .iter()
            .map(|turn| GeminiContent {
                role: match turn.role {
                    Role::User => "user".to_string(),
                    Role::Model => "model".to_string(),
                },
                parts: vec![GeminiPart {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        contents.push(GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                text: new_message.to_string(),
            }],
        });
        contents
    }

    async fn send_request(&self, request: GeminiRequest) -> Result<GeminiResponse, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::MissingCredential(self.api_key_env.clone()))?;

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(GatewayError::from_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::from_http_status(status, error_text));
        }

        response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| GatewayError::Other(anyhow::anyhow!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Gateway for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, history: &[Turn], message: &str) -> Result<String, GatewayError> {
        let request = GeminiRequest {
            contents: Self::convert_history(history, message),
            system_instruction: Some(GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: self.system_instruction.clone(),
                }],
            }),
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(self.max_output_tokens),
                temperature: Some(1.0),
            }),
        };

        let response = self.send_request(request).await?;
        response.text().ok_or(GatewayError::EmptyResponse)
    }

    async fn summarize_title(&self, first_message: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            "Create a very short, 2-4 word title for a chat that starts with this prompt: \
             \"{}\". Return ONLY the title text, no quotes or punctuation.",
            first_message
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: prompt }],
            }],
            system_instruction: None,
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(32),
                temperature: Some(0.4),
            }),
        };

        let response = self.send_request(request).await?;
        response
            .text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(GatewayError::EmptyResponse)
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiResponse {
    /// Joined candidate text; `None` when there is nothing usable.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}
