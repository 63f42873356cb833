use serde::{Deserialize, Serialize};

use crate::model::chat::ChatTurn;
use crate::model::scenario::{OptionLabel, Outcome};

/// The durable audit row for one completed round.
/// Created exactly once per round, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub timestamp: String,
    pub participant_id: String,
    pub round_num: i32,
    pub scenario_id: String,
    pub choice: OptionLabel,
    pub outcome: Outcome,
    pub chat_history: Vec<ChatTurn>,

    /// Raw instruction supplied after the decision; empty if skipped.
    pub instruction_text: String,
}

impl RoundRecord {
    /// The chat history as an ordered list of (role, text) pairs,
    /// matching the `chat_history_json` log column.
    pub fn chat_history_json(&self) -> String {
        let pairs: Vec<(&str, &str)> = self
            .chat_history
            .iter()
            .map(|turn| (turn.speaker.as_str(), turn.text.as_str()))
            .collect();

        // Serializing (&str, &str) tuples cannot fail.
        serde_json::to_string(&pairs).unwrap_or_else(|_| "[]".to_string())
    }

    /// The record as the 12 log columns, in header order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.participant_id.clone(),
            self.round_num.to_string(),
            self.scenario_id.clone(),
            self.choice.to_string(),
            self.outcome.safety.to_string(),
            self.outcome.equity.to_string(),
            self.outcome.cost.to_string(),
            self.outcome.political.to_string(),
            self.outcome.total.to_string(),
            self.chat_history_json(),
            self.instruction_text.clone(),
        ]
    }
}
