use eframe::egui;

use crate::model::scenario::OptionLabel;
use super::app::{MyApp, Page};

pub fn draw_center_panel(ctx: &egui::Context, app: &mut MyApp) {
    match app.ui.page {
        Page::Setup => draw_setup(ctx, app),
        Page::Chat => draw_chat(ctx, app),
        Page::Decide => draw_decide(ctx, app),
        Page::Outcome => draw_outcome(ctx, app),
        Page::Complete => draw_complete(ctx, app),
    }
}

/* =========================
   Setup
   ========================= */

fn draw_setup(ctx: &egui::Context, app: &mut MyApp) {
    let mut begin = false;

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Human-AI Policy Decision Experiment");
        ui.add_space(8.0);

        ui.label("Participant ID (leave blank to stay anonymous)");
        ui.text_edit_singleline(&mut app.ui.participant_id);

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Choose scenario CSV…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("CSV", &["csv"])
                    .pick_file()
                {
                    app.ui.scenario_path = Some(path);
                }
            }
            match &app.ui.scenario_path {
                Some(path) => ui.label(path.display().to_string()),
                None => ui.label("no file chosen"),
            };
        });

        ui.add_space(8.0);
        ui.label("Log file");
        ui.text_edit_singleline(&mut app.ui.log_path);

        ui.collapsing("AI teammate endpoint", |ui| {
            ui.label("Chat URL");
            ui.text_edit_singleline(&mut app.ui.chat_url);
            ui.label("Model");
            ui.text_edit_singleline(&mut app.ui.model);
        });

        ui.add_space(12.0);
        if ui.button("Begin experiment").clicked() {
            begin = true;
        }

        if let Some(msg) = &app.ui.fatal {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::LIGHT_RED, msg);
        }
    });

    if begin {
        app.start_session();
    }
}

/* =========================
   Chat
   ========================= */

fn draw_chat(ctx: &egui::Context, app: &mut MyApp) {
    let input_id = egui::Id::new("chat_input_box");
    let mut send_now = false;
    let mut decide_now = false;

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let response = ui.add_sized(
                [ui.available_width() - 180.0, 60.0],
                egui::TextEdit::multiline(&mut app.ui.input_text)
                    .id(input_id)
                    .hint_text("Ask your AI teammate…")
                    .lock_focus(true),
            );

            // Enter vs Shift+Enter
            if response.has_focus() {
                let input = ui.input(|i| i.clone());
                if input.key_pressed(egui::Key::Enter) && !input.modifiers.shift {
                    send_now = true;
                }
            }

            if ui.button("Send").clicked() {
                send_now = true;
            }
            let ready = egui::Button::new("Ready to decide");
            if ui.add_enabled(!app.ui.busy, ready).clicked() {
                decide_now = true;
            }
        });
        ui.add_space(4.0);
    });

    // ---------- Chat history ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for turn in &app.ui.chat {
                    app.draw_message(ui, turn);
                }
                if app.ui.awaiting_reply {
                    ui.add_space(6.0);
                    ui.label("AI teammate is thinking…");
                }
            });
    });

    if send_now {
        app.send_chat();
        ctx.memory_mut(|m| m.request_focus(input_id));
    }
    if decide_now {
        app.request_decision();
    }
}

/* =========================
   Decide
   ========================= */

fn draw_decide(ctx: &egui::Context, app: &mut MyApp) {
    let mut chosen: Option<OptionLabel> = None;

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Your decision");
        ui.add_space(4.0);
        ui.label("Pick the policy option for this round.");
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            for label in OptionLabel::ALL {
                let button = egui::Button::new(
                    egui::RichText::new(format!("Option {label}")).size(18.0),
                )
                .min_size(egui::vec2(110.0, 48.0));
                if ui.add_enabled(!app.ui.busy, button).clicked() {
                    chosen = Some(label);
                }
            }
        });

        if let Some(hint) = &app.ui.decision_hint {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::LIGHT_RED, hint);
        }
    });

    if let Some(label) = chosen {
        app.choose_option(label);
    }
}

/* =========================
   Outcome
   ========================= */

fn draw_outcome(ctx: &egui::Context, app: &mut MyApp) {
    let mut continue_now = false;

    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(summary) = app.ui.summary else {
            ui.label("Waiting for the outcome…");
            return;
        };

        ui.heading("Round outcome");
        ui.add_space(8.0);

        ui.label(format!("Your choice: {}", summary.choice));
        ui.add_space(4.0);

        egui::Grid::new("outcome_grid").striped(true).show(ui, |ui| {
            ui.label("Safety impact");
            ui.label(summary.outcome.safety.to_string());
            ui.end_row();
            ui.label("Equity impact");
            ui.label(summary.outcome.equity.to_string());
            ui.end_row();
            ui.label("Cost impact");
            ui.label(summary.outcome.cost.to_string());
            ui.end_row();
            ui.label("Political impact");
            ui.label(summary.outcome.political.to_string());
            ui.end_row();
            ui.label("Round total");
            ui.label(summary.outcome.total.to_string());
            ui.end_row();
            ui.label("Cumulative total");
            ui.label(summary.cumulative_score.to_string());
            ui.end_row();
        });

        ui.add_space(12.0);
        ui.label("Optional: what should your AI teammate do differently next round?");
        ui.label("(e.g. 'be more concise', 'focus more on equity', 'explain more detail')");
        ui.text_edit_multiline(&mut app.ui.instruction_text);

        ui.add_space(8.0);
        let button = egui::Button::new("Continue");
        if ui.add_enabled(!app.ui.busy, button).clicked() {
            continue_now = true;
        }
    });

    if continue_now {
        app.finish_round();
    }
}

/* =========================
   Complete
   ========================= */

fn draw_complete(ctx: &egui::Context, app: &mut MyApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Experiment complete");
        ui.add_space(8.0);
        ui.label(format!("Final total score: {}", app.ui.total_score));
        ui.label(format!("Data saved to: {}", app.ui.log_path));

        if let Some(msg) = &app.ui.fatal {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::LIGHT_RED, msg);
        }
    });
}
