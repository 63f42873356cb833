use thiserror::Error;

/// Failures while turning the scenario source into a catalog.
/// All of these abort session start; a partial catalog is never used.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read scenario source {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scenario source is missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("scenario source has no data rows")]
    EmptyCatalog,

    #[error("row {row}: {reason}")]
    MalformedScenario { row: usize, reason: String },

    #[error("row {row}, column {column}: {reason}")]
    MalformedOutcome {
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("duplicate round number {0}")]
    DuplicateRound(i32),

    #[error("duplicate scenario id {0:?}")]
    DuplicateScenarioId(String),
}

/// The teammate call failed at the transport or protocol level.
/// Recovered by the session: the failure text becomes an in-band chat
/// turn and the round continues.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// A decision label outside the valid option set.
/// The shell re-prompts; nothing is mutated and nothing is logged.
#[derive(Debug, Error)]
#[error("invalid decision label {label:?}; expected one of A, B, C, D")]
pub struct InvalidDecisionError {
    pub label: String,
}

/// The session log could not be written. Fatal: losing the record
/// defeats the experiment's purpose.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot initialize log {path}: {source}")]
    Init {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot append to log {path}: {source}")]
    Append {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a shell can get back from driving the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidDecision(#[from] InvalidDecisionError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("{op} is not valid while the session is {phase}")]
    OutOfPhase { op: &'static str, phase: &'static str },
}
