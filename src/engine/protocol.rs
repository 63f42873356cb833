use std::path::PathBuf;

use crate::engine::session::DecisionSummary;
use crate::model::chat::ChatTurn;
use crate::model::record::RoundRecord;
use crate::model::scenario::Scenario;

/// Requests from the interactive shell to the engine worker.
/// One command per user action; the worker answers every command.
pub enum EngineCommand {
    StartSession {
        participant_id: String,
        scenario_path: PathBuf,
        log_path: PathBuf,
        chat_url: String,
        model: String,
    },
    BeginRound,
    Chat(String),
    ReadyToDecide,
    Decide(String),
    SubmitInstruction(String),
    CloseRound,
}

/// What the worker sends back for the shell to render.
pub enum EngineResponse {
    SessionStarted {
        participant_id: String,
        rounds_total: usize,
    },
    RoundStarted {
        scenario: Scenario,
        rounds_completed: usize,
        rounds_total: usize,
        total_score: i64,
    },
    ChatUpdated(Vec<ChatTurn>),
    DecisionPending,
    Decided(DecisionSummary),
    InvalidDecision(String),
    RoundClosed {
        record: RoundRecord,
        total_score: i64,
    },
    SessionComplete {
        total_score: i64,
    },

    /// Unrecoverable failure (catalog load, log write). The shell
    /// shows it and stops driving the session.
    Fatal(String),
}
