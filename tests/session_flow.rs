//! End-to-end round flow: chat, decide, adapt, log, across a whole
//! session, with a scripted teammate gateway instead of a live model.

use std::cell::RefCell;

use policy_teamlab::engine::catalog::ScenarioCatalog;
use policy_teamlab::engine::csv;
use policy_teamlab::engine::error::GatewayError;
use policy_teamlab::engine::gateway::TeammateGateway;
use policy_teamlab::engine::log::{SessionLog, LOG_HEADER};
use policy_teamlab::engine::session::{Session, GATEWAY_ERROR_PREFIX};
use policy_teamlab::model::chat::ChatTurn;

struct ScriptedGateway {
    replies: RefCell<Vec<Result<String, GatewayError>>>,
}

impl TeammateGateway for ScriptedGateway {
    fn reply(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        _user_message: &str,
    ) -> Result<String, GatewayError> {
        // The engine must hand the gateway the teammate's memo, never
        // the participant's, and only prior turns.
        assert!(system_prompt.contains("technical memo"));
        assert!(history.len() % 2 == 0, "history must hold whole exchanges");

        self.replies.borrow_mut().remove(0)
    }
}

fn scenario_csv() -> String {
    let header = "round,scenario_id,scenario_title,options,human_private_info,\
ai_private_info,option_A_outcome,option_B_outcome,option_C_outcome,option_D_outcome";
    let row = |round: i32, id: &str| {
        format!(
            "{round},{id},Scenario {id},\"A) act now\nB) wait\",\"mayors, unions\",sensor data,\
\"A: safety=2,equity=1,cost=2,political=1,total=6\",\
\"B: safety=1,equity=1,cost=0,political=1,total=3\",\
\"C: safety=0,equity=0,cost=1,political=0,total=1\",\
\"D: safety=-1,equity=0,cost=0,political=-1,total=-2\""
        )
    };
    format!("{header}\n{}\n{}\n", row(1, "levee"), row(2, "transit"))
}

#[test]
fn full_session_scores_logs_and_adapts() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("experiment_log.csv");

    let catalog = ScenarioCatalog::from_csv(&scenario_csv()).unwrap();
    let gateway = ScriptedGateway {
        replies: RefCell::new(vec![
            Ok("The sensor data favors acting now.".to_string()),
            Err(GatewayError::Protocol("connection reset".to_string())),
        ]),
    };
    let log = SessionLog::init(&log_path).unwrap();

    let mut session = Session::new("p42", catalog, gateway, log);

    // Round 1: one good exchange, decide A, ask for brevity.
    let scenario = session.begin_round().unwrap().unwrap();
    assert_eq!(scenario.round_num, 1);

    session.chat("what does the data say?").unwrap();
    session.ready_to_decide().unwrap();
    let summary = session.decide("a").unwrap();
    assert_eq!(summary.outcome.total, 6);
    assert_eq!(summary.cumulative_score, 6);
    session.submit_instruction("please be concise").unwrap();
    let record = session.close_round().unwrap();
    assert_eq!(record.round_num, 1);
    assert_eq!(record.instruction_text, "please be concise");

    // Round 2: the gateway fails, the round must still complete.
    let scenario = session.begin_round().unwrap().unwrap();
    assert_eq!(scenario.round_num, 2);

    let turn = session.chat("still there?").unwrap();
    assert!(turn.text.starts_with(GATEWAY_ERROR_PREFIX));

    session.ready_to_decide().unwrap();
    let summary = session.decide("B").unwrap();
    assert_eq!(summary.cumulative_score, 9);
    session.submit_instruction("").unwrap();
    session.close_round().unwrap();

    assert!(session.begin_round().unwrap().is_none());
    assert!(session.is_complete());
    assert_eq!(session.total_score(), 9);

    // The log: header plus one row per round, in round order.
    let contents = std::fs::read_to_string(&log_path).unwrap();
    let rows = csv::parse(&contents);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], LOG_HEADER.to_vec());

    let first = &rows[1];
    assert_eq!(first[1], "p42");
    assert_eq!(first[2], "1");
    assert_eq!(first[3], "levee");
    assert_eq!(first[4], "A");
    assert_eq!(first[9], "6");
    assert_eq!(
        first[10],
        r#"[["participant","what does the data say?"],["ai","The sensor data favors acting now."]]"#
    );
    assert_eq!(first[11], "please be concise");

    let second = &rows[2];
    assert_eq!(second[2], "2");
    assert_eq!(second[3], "transit");
    assert_eq!(second[4], "B");
    assert_eq!(second[11], "");

    // The error-marker exchange is preserved in the second round's history.
    assert!(second[10].contains("connection reset"));

    // Adaptation carried across rounds.
    assert_eq!(
        session.memory().instructions,
        vec!["please be concise".to_string()]
    );
    assert!(!session.memory().focus_equity);
}

#[test]
fn reopening_the_log_for_a_second_session_keeps_one_header() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("experiment_log.csv");

    for participant in ["p1", "p2"] {
        let catalog = ScenarioCatalog::from_csv(&scenario_csv()).unwrap();
        let gateway = ScriptedGateway {
            replies: RefCell::new(Vec::new()),
        };
        let log = SessionLog::init(&log_path).unwrap();
        let mut session = Session::new(participant, catalog, gateway, log);

        session.begin_round().unwrap();
        session.ready_to_decide().unwrap();
        session.decide("C").unwrap();
        session.submit_instruction("").unwrap();
        session.close_round().unwrap();
    }

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let rows = csv::parse(&contents);

    assert_eq!(rows.len(), 3);
    let header_rows = rows
        .iter()
        .filter(|r| r.first().map(String::as_str) == Some("timestamp"))
        .count();
    assert_eq!(header_rows, 1);
    assert_eq!(rows[1][1], "p1");
    assert_eq!(rows[2][1], "p2");
}
