use serde::{Deserialize, Serialize};

/// Who produced a chat turn. A tagged variant rather than a free-form
/// role string, so adding a third party later cannot silently misroute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Participant,
    Ai,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Participant => "participant",
            Speaker::Ai => "ai",
        }
    }
}

/// One utterance in a round's chat. Histories are append-only and
/// scoped to exactly one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatTurn {
    pub fn participant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Participant,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Ai,
            text: text.into(),
        }
    }
}
