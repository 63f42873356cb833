use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::engine::csv;
use crate::engine::error::LogError;
use crate::model::record::RoundRecord;

pub const LOG_HEADER: [&str; 12] = [
    "timestamp",
    "participant_id",
    "round_num",
    "scenario_id",
    "choice",
    "safety",
    "equity",
    "cost",
    "political",
    "total",
    "chat_history_json",
    "instruction_text",
];

/// Append-only durable record of completed rounds.
///
/// `init` is idempotent: it writes the header only when the file does
/// not exist yet and never truncates. Each `append` writes one fully
/// formatted row in a single call, so rows cannot interleave within a
/// process. No read-back, no rotation.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn init(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref().to_path_buf();

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let header: Vec<String> = LOG_HEADER.iter().map(|c| c.to_string()).collect();
                file.write_all(csv::write_row(&header).as_bytes())
                    .and_then(|_| file.flush())
                    .map_err(|source| LogError::Init {
                        path: path.display().to_string(),
                        source,
                    })?;
                info!(path = %path.display(), "session log created");
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                // Existing log: keep appending below the old rows.
            }
            Err(source) => {
                return Err(LogError::Init {
                    path: path.display().to_string(),
                    source,
                });
            }
        }

        Ok(Self { path })
    }

    pub fn append(&self, record: &RoundRecord) -> Result<(), LogError> {
        let row = csv::write_row(&record.to_row());

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| LogError::Append {
                path: self.path.display().to_string(),
                source,
            })?;

        file.write_all(row.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| LogError::Append {
                path: self.path.display().to_string(),
                source,
            })?;

        info!(
            round = record.round_num,
            scenario = %record.scenario_id,
            choice = %record.choice,
            "round logged"
        );

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::chat::ChatTurn;
    use crate::model::scenario::{OptionLabel, Outcome};

    fn record(round: i32) -> RoundRecord {
        RoundRecord {
            timestamp: "2026-01-05 10:30:00".into(),
            participant_id: "p01".into(),
            round_num: round,
            scenario_id: format!("scenario_{round}"),
            choice: OptionLabel::A,
            outcome: Outcome {
                safety: 2,
                equity: 1,
                cost: 2,
                political: 1,
                total: 6,
            },
            chat_history: vec![ChatTurn::participant("hi"), ChatTurn::ai("hello")],
            instruction_text: "be brief, please".into(),
        }
    }

    #[test]
    fn init_writes_header_once_and_reinit_never_duplicates_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let log = SessionLog::init(&path).unwrap();
        log.append(&record(1)).unwrap();

        // Second init must not truncate or re-write the header.
        let log = SessionLog::init(&path).unwrap();
        log.append(&record(2)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let rows = csv::parse(&contents);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], LOG_HEADER.to_vec());
        assert_eq!(rows[1][2], "1");
        assert_eq!(rows[2][2], "2");
    }

    #[test]
    fn appended_row_round_trips_through_the_csv_dialect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let log = SessionLog::init(&path).unwrap();
        log.append(&record(1)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let rows = csv::parse(&contents);
        let row = &rows[1];

        assert_eq!(row.len(), 12);
        assert_eq!(row[4], "A");
        assert_eq!(row[10], r#"[["participant","hi"],["ai","hello"]]"#);
        assert_eq!(row[11], "be brief, please");
    }

    #[test]
    fn init_fails_on_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("log.csv");
        assert!(matches!(SessionLog::init(&path), Err(LogError::Init { .. })));
    }
}
