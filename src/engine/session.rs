use tracing::{info, warn};

use crate::engine::catalog::ScenarioCatalog;
use crate::engine::error::SessionError;
use crate::engine::gateway::TeammateGateway;
use crate::engine::log::SessionLog;
use crate::engine::prompt_builder::build_system_prompt;
use crate::model::chat::ChatTurn;
use crate::model::memory::TeamMemory;
use crate::model::record::RoundRecord;
use crate::model::scenario::{OptionLabel, Outcome, Scenario};

/// Participant id used when the shell supplies a blank one.
pub const ANONYMOUS_PARTICIPANT: &str = "anonymous";

/// Marker prefixed to the in-band chat turn that stands in for the
/// AI reply when the gateway call fails.
pub const GATEWAY_ERROR_PREFIX: &str = "[Error contacting AI teammate: ";

/// Where the session currently is. Round phases and session phases
/// are folded into one ladder; there is always at most one open round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Between rounds; `begin_round` starts the next one.
    Awaiting,
    /// In a round, exchanging messages with the teammate.
    Chatting,
    /// The shell signalled "ready to decide"; waiting for a label.
    Deciding,
    /// A decision is recorded; instruction and round close may follow.
    Decided,
    /// Catalog exhausted; the session is over.
    Complete,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Awaiting => "awaiting a round",
            Phase::Chatting => "chatting",
            Phase::Deciding => "awaiting a decision",
            Phase::Decided => "closing a round",
            Phase::Complete => "complete",
        }
    }
}

/// What a successful decision produced, for the shell to render.
#[derive(Debug, Clone, Copy)]
pub struct DecisionSummary {
    pub choice: OptionLabel,
    pub outcome: Outcome,
    pub cumulative_score: i64,
}

/// The experiment engine: one participant, one ordered catalog, one
/// team memory, one log. Both shells drive this and only this; they
/// contain no decision, scoring, or prompt logic of their own.
///
/// Single-threaded: the gateway call is the only blocking operation,
/// and it suspends the round, not the process.
pub struct Session<G: TeammateGateway> {
    participant_id: String,
    catalog: ScenarioCatalog,
    gateway: G,
    log: SessionLog,

    memory: TeamMemory,
    total_score: i64,
    index: usize,
    phase: Phase,

    chat: Vec<ChatTurn>,
    pending_choice: Option<(OptionLabel, Outcome)>,
    instruction_text: String,
    instruction_taken: bool,
}

impl<G: TeammateGateway> Session<G> {
    pub fn new(
        participant_id: impl Into<String>,
        catalog: ScenarioCatalog,
        gateway: G,
        log: SessionLog,
    ) -> Self {
        let participant_id = participant_id.into();
        let participant_id = if participant_id.trim().is_empty() {
            ANONYMOUS_PARTICIPANT.to_string()
        } else {
            participant_id.trim().to_string()
        };

        Self {
            participant_id,
            catalog,
            gateway,
            log,
            memory: TeamMemory::default(),
            total_score: 0,
            index: 0,
            phase: Phase::Awaiting,
            chat: Vec::new(),
            pending_choice: None,
            instruction_text: String::new(),
            instruction_taken: false,
        }
    }

    /* ---------- round flow ---------- */

    /// Starts the next round. `Ok(None)` means the catalog is
    /// exhausted and the session is complete.
    pub fn begin_round(&mut self) -> Result<Option<&Scenario>, SessionError> {
        if self.phase == Phase::Complete {
            return Ok(None);
        }
        self.expect_phase(Phase::Awaiting, "begin_round")?;

        if self.index >= self.catalog.len() {
            self.phase = Phase::Complete;
            info!(total = self.total_score, "session complete");
            return Ok(None);
        }

        self.phase = Phase::Chatting;
        self.chat.clear();
        self.pending_choice = None;
        self.instruction_text.clear();
        self.instruction_taken = false;

        let scenario = self
            .catalog
            .get(self.index)
            .expect("index checked against catalog length");
        info!(
            round = scenario.round_num,
            scenario = %scenario.scenario_id,
            "round started"
        );
        Ok(Some(scenario))
    }

    /// One chat exchange: the participant turn, then the teammate
    /// turn, appended in that order. A gateway failure never escapes;
    /// it becomes the reply text so the round keeps its integrity.
    pub fn chat(&mut self, text: &str) -> Result<&ChatTurn, SessionError> {
        self.expect_phase(Phase::Chatting, "chat")?;

        let scenario = self
            .current_scenario()
            .expect("chatting phase always has a scenario");
        let prompt = build_system_prompt(scenario, &self.memory);

        let reply = match self.gateway.reply(&prompt, &self.chat, text) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "teammate call failed; continuing round");
                format!("{GATEWAY_ERROR_PREFIX}{e}]")
            }
        };

        self.chat.push(ChatTurn::participant(text));
        self.chat.push(ChatTurn::ai(reply));

        Ok(self.chat.last().expect("turn was just appended"))
    }

    /// The shell's explicit "ready to decide" signal.
    pub fn ready_to_decide(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Chatting, "ready_to_decide")?;
        self.phase = Phase::Deciding;
        Ok(())
    }

    /// Accepts one option label. An invalid label is rejected without
    /// touching score, chat, or memory; the shell should re-prompt.
    pub fn decide(&mut self, raw_label: &str) -> Result<DecisionSummary, SessionError> {
        self.expect_phase(Phase::Deciding, "decide")?;

        let choice: OptionLabel = raw_label.parse()?;
        let (round_num, outcome) = {
            let scenario = self
                .current_scenario()
                .expect("deciding phase always has a scenario");
            (scenario.round_num, scenario.outcomes.for_label(choice))
        };

        self.total_score += i64::from(outcome.total);
        self.pending_choice = Some((choice, outcome));
        self.phase = Phase::Decided;

        info!(
            round = round_num,
            choice = %choice,
            round_total = outcome.total,
            cumulative = self.total_score,
            "decision recorded"
        );

        Ok(DecisionSummary {
            choice,
            outcome,
            cumulative_score: self.total_score,
        })
    }

    /// Takes the round's optional adaptation instruction, at most
    /// once. Empty text is recorded as "no instruction" and changes
    /// nothing.
    pub fn submit_instruction(&mut self, text: &str) -> Result<(), SessionError> {
        self.expect_phase(Phase::Decided, "submit_instruction")?;
        if self.instruction_taken {
            return Err(SessionError::OutOfPhase {
                op: "submit_instruction",
                phase: self.phase.as_str(),
            });
        }

        let text = text.trim();
        self.instruction_text = text.to_string();
        self.instruction_taken = true;

        if !text.is_empty() {
            self.memory.apply_instruction(text);
            info!(
                length = ?self.memory.explanation_length,
                focus_equity = self.memory.focus_equity,
                "team memory updated"
            );
        }

        Ok(())
    }

    /// Writes the round's record and advances. The record is returned
    /// for the shell to render; a write failure is fatal.
    pub fn close_round(&mut self) -> Result<RoundRecord, SessionError> {
        self.expect_phase(Phase::Decided, "close_round")?;

        let (choice, outcome) = self
            .pending_choice
            .expect("decided phase always has a pending choice");
        let scenario = self
            .current_scenario()
            .expect("decided phase always has a scenario");

        let record = RoundRecord {
            timestamp: now_timestamp(),
            participant_id: self.participant_id.clone(),
            round_num: scenario.round_num,
            scenario_id: scenario.scenario_id.clone(),
            choice,
            outcome,
            chat_history: self.chat.clone(),
            instruction_text: self.instruction_text.clone(),
        };

        self.log.append(&record)?;

        self.chat.clear();
        self.pending_choice = None;
        self.index += 1;
        self.phase = if self.index < self.catalog.len() {
            Phase::Awaiting
        } else {
            Phase::Complete
        };

        if self.phase == Phase::Complete {
            info!(total = self.total_score, "session complete");
        }

        Ok(record)
    }

    /* ---------- shell views ---------- */

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn current_scenario(&self) -> Option<&Scenario> {
        match self.phase {
            Phase::Chatting | Phase::Deciding | Phase::Decided => self.catalog.get(self.index),
            Phase::Awaiting | Phase::Complete => None,
        }
    }

    pub fn chat_history(&self) -> &[ChatTurn] {
        &self.chat
    }

    pub fn total_score(&self) -> i64 {
        self.total_score
    }

    pub fn memory(&self) -> &TeamMemory {
        &self.memory
    }

    pub fn rounds_total(&self) -> usize {
        self.catalog.len()
    }

    pub fn rounds_completed(&self) -> usize {
        self.index
    }

    fn expect_phase(&self, wanted: Phase, op: &'static str) -> Result<(), SessionError> {
        if self.phase == wanted {
            Ok(())
        } else {
            Err(SessionError::OutOfPhase {
                op,
                phase: self.phase.as_str(),
            })
        }
    }
}

fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::engine::error::GatewayError;
    use crate::model::memory::ExplanationLength;

    /// Gateway that replays scripted results in order.
    struct ScriptedGateway {
        replies: RefCell<Vec<Result<String, GatewayError>>>,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                replies: RefCell::new(replies),
            }
        }

        fn always(reply: &str) -> Self {
            Self::new((0..8).map(|_| Ok(reply.to_string())).collect())
        }
    }

    impl TeammateGateway for ScriptedGateway {
        fn reply(
            &self,
            _system_prompt: &str,
            _history: &[ChatTurn],
            _user_message: &str,
        ) -> Result<String, GatewayError> {
            self.replies.borrow_mut().remove(0)
        }
    }

    fn catalog() -> ScenarioCatalog {
        let header = "round,scenario_id,scenario_title,options,human_private_info,\
ai_private_info,option_A_outcome,option_B_outcome,option_C_outcome,option_D_outcome";
        let row = |round: i32, id: &str| {
            format!(
                "{round},{id},Title,options text,human memo,ai memo,\
\"A: safety=2,equity=1,cost=2,political=1,total=6\",\
\"B: safety=1,equity=1,cost=0,political=1,total=3\",\
\"C: safety=0,equity=0,cost=1,political=0,total=1\",\
\"D: safety=-1,equity=0,cost=0,political=-1,total=-2\""
            )
        };
        ScenarioCatalog::from_csv(&format!("{header}\n{}\n{}\n", row(1, "s1"), row(2, "s2")))
            .unwrap()
    }

    fn session(gateway: ScriptedGateway) -> (Session<ScriptedGateway>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::init(dir.path().join("log.csv")).unwrap();
        (Session::new("tester", catalog(), gateway, log), dir)
    }

    #[test]
    fn blank_participant_id_becomes_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::init(dir.path().join("log.csv")).unwrap();
        let s = Session::new("   ", catalog(), ScriptedGateway::always("ok"), log);
        assert_eq!(s.participant_id(), ANONYMOUS_PARTICIPANT);
    }

    #[test]
    fn chat_appends_participant_then_ai_in_order() {
        let (mut s, _dir) = session(ScriptedGateway::always("sounds reasonable"));
        s.begin_round().unwrap();

        s.chat("what does the memo say?").unwrap();

        let history = s.chat_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], ChatTurn::participant("what does the memo say?"));
        assert_eq!(history[1], ChatTurn::ai("sounds reasonable"));
    }

    #[test]
    fn gateway_failure_becomes_in_band_turn_and_round_still_decides() {
        let (mut s, _dir) = session(ScriptedGateway::new(vec![Err(GatewayError::Protocol(
            "connection refused".into(),
        ))]));
        s.begin_round().unwrap();

        s.chat("hello?").unwrap();

        let history = s.chat_history();
        assert_eq!(history.len(), 2);
        assert!(history[1].text.starts_with(GATEWAY_ERROR_PREFIX));
        assert!(history[1].text.contains("connection refused"));

        s.ready_to_decide().unwrap();
        let summary = s.decide("A").unwrap();
        assert_eq!(summary.outcome.total, 6);
    }

    #[test]
    fn invalid_label_mutates_nothing_and_allows_retry() {
        let (mut s, _dir) = session(ScriptedGateway::always("ok"));
        s.begin_round().unwrap();
        s.chat("hm").unwrap();
        s.ready_to_decide().unwrap();

        let before_chat = s.chat_history().to_vec();
        let err = s.decide("E").unwrap_err();
        assert!(matches!(err, SessionError::InvalidDecision(_)));

        assert_eq!(s.total_score(), 0);
        assert_eq!(s.chat_history(), before_chat.as_slice());
        assert_eq!(s.memory().instructions.len(), 0);
        assert_eq!(s.phase(), Phase::Deciding);

        // Re-prompt succeeds.
        assert!(s.decide("b ").is_ok());
        assert_eq!(s.total_score(), 3);
    }

    #[test]
    fn two_rounds_accumulate_score_and_advance_in_order() {
        let (mut s, _dir) = session(ScriptedGateway::always("ok"));

        let first = s.begin_round().unwrap().unwrap();
        assert_eq!(first.round_num, 1);
        s.ready_to_decide().unwrap();
        s.decide("A").unwrap();
        s.submit_instruction("").unwrap();
        let record = s.close_round().unwrap();
        assert_eq!(record.round_num, 1);
        assert_eq!(record.instruction_text, "");

        let second = s.begin_round().unwrap().unwrap();
        assert_eq!(second.round_num, 2);
        s.ready_to_decide().unwrap();
        let summary = s.decide("B").unwrap();
        assert_eq!(summary.cumulative_score, 9);
        s.submit_instruction("be more concise").unwrap();
        s.close_round().unwrap();

        assert!(s.is_complete());
        assert_eq!(s.total_score(), 9);
        assert_eq!(s.memory().explanation_length, ExplanationLength::Short);

        // Once complete, there is no further round to start.
        assert!(s.begin_round().unwrap().is_none());
    }

    #[test]
    fn out_of_phase_calls_are_refused() {
        let (mut s, _dir) = session(ScriptedGateway::always("ok"));

        assert!(matches!(
            s.chat("too early"),
            Err(SessionError::OutOfPhase { .. })
        ));
        assert!(matches!(
            s.decide("A"),
            Err(SessionError::OutOfPhase { .. })
        ));

        s.begin_round().unwrap();
        assert!(matches!(
            s.close_round(),
            Err(SessionError::OutOfPhase { .. })
        ));
    }

    #[test]
    fn instruction_is_taken_at_most_once_per_round() {
        let (mut s, _dir) = session(ScriptedGateway::always("ok"));
        s.begin_round().unwrap();
        s.ready_to_decide().unwrap();
        s.decide("C").unwrap();

        s.submit_instruction("focus on fairness").unwrap();
        assert!(s.memory().focus_equity);
        assert!(s.submit_instruction("again").is_err());
    }
}
