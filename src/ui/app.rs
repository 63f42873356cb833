use eframe::egui;
use egui::Layout;
use std::path::PathBuf;
use std::sync::mpsc;

use crate::engine::engine::Engine;
use crate::engine::gateway::{DEFAULT_CHAT_URL, DEFAULT_MODEL};
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::DecisionSummary;
use crate::model::chat::{ChatTurn, Speaker};
use crate::model::scenario::{OptionLabel, Scenario};
use crate::ui::settings::UiSettings;
use crate::ui::settings_io::{load_settings, save_settings};

/* =========================
   Pages
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Setup,
    Chat,
    Decide,
    Outcome,
    Complete,
}

/* =========================
   UI State
   ========================= */

pub struct UiState {
    pub page: Page,

    // Setup form
    pub participant_id: String,
    pub scenario_path: Option<PathBuf>,
    pub log_path: String,
    pub chat_url: String,
    pub model: String,

    // Round rendering
    pub scenario: Option<Scenario>,
    pub chat: Vec<ChatTurn>,
    pub input_text: String,
    pub awaiting_reply: bool,
    pub summary: Option<DecisionSummary>,
    pub instruction_text: String,

    pub total_score: i64,
    pub rounds_completed: usize,
    pub rounds_total: usize,

    pub decision_hint: Option<String>,
    pub fatal: Option<String>,
    pub should_auto_scroll: bool,

    /// A phase-changing command is in flight; hold the buttons until
    /// the worker answers.
    pub busy: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            page: Page::Setup,
            participant_id: String::new(),
            scenario_path: None,
            log_path: "experiment_log.csv".into(),
            chat_url: DEFAULT_CHAT_URL.into(),
            model: DEFAULT_MODEL.into(),
            scenario: None,
            chat: Vec::new(),
            input_text: String::new(),
            awaiting_reply: false,
            summary: None,
            instruction_text: String::new(),
            total_score: 0,
            rounds_completed: 0,
            rounds_total: 0,
            decision_hint: None,
            fatal: None,
            should_auto_scroll: false,
            busy: false,
        }
    }
}

/* =========================
   App
   ========================= */

pub struct MyApp {
    pub ui: UiState,
    pub settings: UiSettings,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl MyApp {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        std::thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx);
            engine.run();
        });

        let settings = load_settings();
        let mut ui = UiState::default();
        ui.scenario_path = settings.last_scenario_path.clone();

        Self {
            ui,
            settings,
            cmd_tx,
            resp_rx,
        }
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    pub fn start_session(&mut self) {
        let Some(scenario_path) = self.ui.scenario_path.clone() else {
            self.ui.fatal = Some("Choose a scenario CSV first.".into());
            return;
        };
        self.ui.fatal = None;

        self.settings.last_scenario_path = Some(scenario_path.clone());
        save_settings(&self.settings);

        self.send_command(EngineCommand::StartSession {
            participant_id: self.ui.participant_id.clone(),
            scenario_path,
            log_path: PathBuf::from(self.ui.log_path.clone()),
            chat_url: self.ui.chat_url.clone(),
            model: self.ui.model.clone(),
        });
    }

    pub fn send_chat(&mut self) {
        let text = self.ui.input_text.trim().to_string();
        if text.is_empty() || self.ui.awaiting_reply {
            return;
        }

        self.ui.awaiting_reply = true;
        self.ui.input_text.clear();
        self.send_command(EngineCommand::Chat(text));
    }

    pub fn request_decision(&mut self) {
        self.ui.busy = true;
        self.send_command(EngineCommand::ReadyToDecide);
    }

    pub fn choose_option(&mut self, label: OptionLabel) {
        self.ui.decision_hint = None;
        self.ui.busy = true;
        self.send_command(EngineCommand::Decide(label.to_string()));
    }

    pub fn finish_round(&mut self) {
        self.ui.busy = true;
        self.send_command(EngineCommand::SubmitInstruction(
            self.ui.instruction_text.clone(),
        ));
        self.send_command(EngineCommand::CloseRound);
        self.ui.instruction_text.clear();
    }

    fn handle_response(&mut self, resp: EngineResponse) {
        match resp {
            EngineResponse::SessionStarted { rounds_total, .. } => {
                self.ui.rounds_total = rounds_total;
                self.send_command(EngineCommand::BeginRound);
            }
            EngineResponse::RoundStarted {
                scenario,
                rounds_completed,
                rounds_total,
                total_score,
            } => {
                self.ui.page = Page::Chat;
                self.ui.scenario = Some(scenario);
                self.ui.chat.clear();
                self.ui.summary = None;
                self.ui.rounds_completed = rounds_completed;
                self.ui.rounds_total = rounds_total;
                self.ui.total_score = total_score;
                self.ui.should_auto_scroll = true;
                self.ui.busy = false;
            }
            EngineResponse::ChatUpdated(chat) => {
                self.ui.chat = chat;
                self.ui.awaiting_reply = false;
                self.ui.should_auto_scroll = true;
            }
            EngineResponse::DecisionPending => {
                self.ui.page = Page::Decide;
                self.ui.busy = false;
            }
            EngineResponse::Decided(summary) => {
                self.ui.summary = Some(summary);
                self.ui.total_score = summary.cumulative_score;
                self.ui.page = Page::Outcome;
                self.ui.busy = false;
            }
            EngineResponse::InvalidDecision(msg) => {
                self.ui.decision_hint = Some(msg);
                self.ui.busy = false;
            }
            EngineResponse::RoundClosed { total_score, .. } => {
                self.ui.total_score = total_score;
                self.send_command(EngineCommand::BeginRound);
            }
            EngineResponse::SessionComplete { total_score } => {
                self.ui.total_score = total_score;
                self.ui.page = Page::Complete;
                self.ui.busy = false;
            }
            EngineResponse::Fatal(msg) => {
                self.ui.fatal = Some(msg);
                self.ui.busy = false;
            }
        }
    }

    pub fn draw_message(&self, ui: &mut egui::Ui, turn: &ChatTurn) {
        let (color, right, text) = match turn.speaker {
            Speaker::Participant => (
                self.settings.color("Participant"),
                true,
                format!("You: {}", turn.text),
            ),
            Speaker::Ai => (self.settings.color("Ai"), false, format!("AI: {}", turn.text)),
        };

        ui.add_space(6.0);

        if right {
            ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, color, &text);
            });
        } else {
            bubble(ui, color, &text);
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        // Engine responses arrive on their own thread; poll soon again.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));

        while let Ok(resp) = self.resp_rx.try_recv() {
            self.handle_response(resp);
        }

        crate::ui::side_panels::draw_session_panel(ctx, self);
        if self.ui.page != Page::Setup {
            crate::ui::side_panels::draw_scenario_panel(ctx, self);
        }
        crate::ui::center_panel::draw_center_panel(ctx, self);

        self.ui.should_auto_scroll = false;
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        save_settings(&self.settings);
    }
}

/* =========================
   UI Helpers
   ========================= */

pub fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::none()
        .fill(color)
        .rounding(egui::Rounding::same(8.0))
        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}
