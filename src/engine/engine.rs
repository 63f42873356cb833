use std::sync::mpsc::{Receiver, Sender};

use tracing::error;

use crate::engine::catalog::ScenarioCatalog;
use crate::engine::error::SessionError;
use crate::engine::gateway::OllamaGateway;
use crate::engine::log::SessionLog;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::Session;

/// Runs the session on its own thread so the interactive shell's
/// event loop never blocks on a teammate call. Pure forwarding: every
/// decision, score, and prompt lives in `Session`, not here.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    session: Option<Session<OllamaGateway>>,
}

impl Engine {
    pub fn new(rx: Receiver<EngineCommand>, tx: Sender<EngineResponse>) -> Self {
        Self {
            rx,
            tx,
            session: None,
        }
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                EngineCommand::StartSession {
                    participant_id,
                    scenario_path,
                    log_path,
                    chat_url,
                    model,
                } => {
                    let catalog = match ScenarioCatalog::load(&scenario_path) {
                        Ok(c) => c,
                        Err(e) => {
                            error!(error = %e, "scenario load failed");
                            let _ = self.tx.send(EngineResponse::Fatal(e.to_string()));
                            continue;
                        }
                    };

                    let log = match SessionLog::init(&log_path) {
                        Ok(l) => l,
                        Err(e) => {
                            error!(error = %e, "log init failed");
                            let _ = self.tx.send(EngineResponse::Fatal(e.to_string()));
                            continue;
                        }
                    };

                    let gateway = OllamaGateway::new(chat_url, model);
                    let session = Session::new(participant_id, catalog, gateway, log);

                    let _ = self.tx.send(EngineResponse::SessionStarted {
                        participant_id: session.participant_id().to_string(),
                        rounds_total: session.rounds_total(),
                    });
                    self.session = Some(session);
                }

                EngineCommand::BeginRound => self.with_session(|session, tx| {
                    let started = session.begin_round().map(|scenario| scenario.cloned());
                    match started {
                        Ok(Some(scenario)) => {
                            let _ = tx.send(EngineResponse::RoundStarted {
                                scenario,
                                rounds_completed: session.rounds_completed(),
                                rounds_total: session.rounds_total(),
                                total_score: session.total_score(),
                            });
                        }
                        Ok(None) => {
                            let _ = tx.send(EngineResponse::SessionComplete {
                                total_score: session.total_score(),
                            });
                        }
                        Err(e) => send_error(tx, e),
                    }
                }),

                EngineCommand::Chat(text) => self.with_session(|session, tx| {
                    let exchanged = session.chat(&text).map(|_| ());
                    match exchanged {
                        Ok(()) => {
                            let _ = tx.send(EngineResponse::ChatUpdated(
                                session.chat_history().to_vec(),
                            ));
                        }
                        Err(e) => send_error(tx, e),
                    }
                }),

                EngineCommand::ReadyToDecide => self.with_session(|session, tx| {
                    match session.ready_to_decide() {
                        Ok(()) => {
                            let _ = tx.send(EngineResponse::DecisionPending);
                        }
                        Err(e) => send_error(tx, e),
                    }
                }),

                EngineCommand::Decide(label) => self.with_session(|session, tx| {
                    match session.decide(&label) {
                        Ok(summary) => {
                            let _ = tx.send(EngineResponse::Decided(summary));
                        }
                        Err(SessionError::InvalidDecision(e)) => {
                            let _ = tx.send(EngineResponse::InvalidDecision(e.to_string()));
                        }
                        Err(e) => send_error(tx, e),
                    }
                }),

                EngineCommand::SubmitInstruction(text) => self.with_session(|session, tx| {
                    if let Err(e) = session.submit_instruction(&text) {
                        send_error(tx, e);
                    }
                }),

                EngineCommand::CloseRound => self.with_session(|session, tx| {
                    match session.close_round() {
                        Ok(record) => {
                            let _ = tx.send(EngineResponse::RoundClosed {
                                record,
                                total_score: session.total_score(),
                            });
                        }
                        Err(e) => send_error(tx, e),
                    }
                }),
            }
        }
    }

    fn with_session(
        &mut self,
        f: impl FnOnce(&mut Session<OllamaGateway>, &Sender<EngineResponse>),
    ) {
        match self.session.as_mut() {
            Some(session) => f(session, &self.tx),
            None => {
                let _ = self
                    .tx
                    .send(EngineResponse::Fatal("no session started".to_string()));
            }
        }
    }
}

fn send_error(tx: &Sender<EngineResponse>, e: SessionError) {
    error!(error = %e, "session command failed");
    let _ = tx.send(EngineResponse::Fatal(e.to_string()));
}
