use eframe::egui;

use super::app::{MyApp, Page};
use crate::ui::settings_io::save_settings;

pub fn draw_session_panel(ctx: &egui::Context, app: &mut MyApp) {
    egui::SidePanel::left("session")
        .resizable(false)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Session");
            ui.separator();

            if app.ui.page != Page::Setup {
                ui.label(format!(
                    "Round {} of {}",
                    (app.ui.rounds_completed + 1).min(app.ui.rounds_total),
                    app.ui.rounds_total
                ));
                ui.label(format!("Cumulative score: {}", app.ui.total_score));
                ui.separator();
            }

            ui.label("UI Scale");
            let response = ui.add(egui::Slider::new(&mut app.settings.ui_scale, 0.75..=2.0));
            if response.changed() {
                save_settings(&app.settings);
            }
        });
}

pub fn draw_scenario_panel(ctx: &egui::Context, app: &mut MyApp) {
    egui::SidePanel::right("scenario")
        .resizable(true)
        .default_width(340.0)
        .min_width(260.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let Some(scenario) = &app.ui.scenario else {
                    ui.label("Waiting for the next round…");
                    return;
                };

                ui.heading(format!("Round {}", scenario.round_num));
                ui.label(egui::RichText::new(&scenario.title).strong());
                ui.separator();

                ui.label(egui::RichText::new("Your private memo (stakeholders/politics)").strong());
                ui.label(&scenario.human_private_info);
                ui.add_space(8.0);

                ui.label(egui::RichText::new("Policy options").strong());
                ui.label(&scenario.options_text);
                ui.add_space(8.0);

                ui.small("Your AI teammate sees a different, technical memo.");
            });
        });
}
