use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::error::GatewayError;
use crate::model::chat::{ChatTurn, Speaker};

/// Stand-in reply when the model returns nothing usable.
pub const NO_CONTENT_REPLY: &str = "[AI did not return any content.]";

pub const DEFAULT_CHAT_URL: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_MODEL: &str = "llama3";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The narrow contract the session depends on. One synchronous call,
/// one text reply; everything about transport stays behind it.
pub trait TeammateGateway {
    fn reply(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Result<String, GatewayError>;
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Blocking client for Ollama's `/api/chat`.
pub struct OllamaGateway {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl OllamaGateway {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            url: url.into(),
            model: model.into(),
        }
    }

    fn wire_messages(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);

        messages.push(WireMessage {
            role: "system",
            content: system_prompt.to_string(),
        });

        for turn in history {
            messages.push(WireMessage {
                role: match turn.speaker {
                    Speaker::Participant => "user",
                    Speaker::Ai => "assistant",
                },
                content: turn.text.clone(),
            });
        }

        messages.push(WireMessage {
            role: "user",
            content: user_message.to_string(),
        });

        messages
    }
}

impl TeammateGateway for OllamaGateway {
    fn reply(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: self.wire_messages(system_prompt, history, user_message),
            stream: false,
        };

        debug!(url = %self.url, model = %self.model, turns = history.len(), "teammate request");

        let response: ChatResponse = self
            .client
            .post(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        let text = response
            .message
            .map(|m| m.content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            Ok(NO_CONTENT_REPLY.to_string())
        } else {
            Ok(text)
        }
    }
}
