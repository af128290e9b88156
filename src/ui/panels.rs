use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use reflectance_classifier::config::DEFAULT_EXPORT_PATH;

use crate::color::label_color;
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Left side panel – classification results
// ---------------------------------------------------------------------------

/// Render the per-model classification panel.
pub fn side_panel(ui: &mut Ui, state: &DashboardState) {
    ui.heading("Results");
    ui.separator();

    let Some(report) = &state.report else {
        ui.label("No data yet. Press Refresh.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for outcome in &report.outcomes {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new("■").color(state.color_map.color_for(&outcome.entry.label)));
                    ui.label(
                        RichText::new(format!(
                            "{} type ({}):",
                            state.config.display.analyte, outcome.entry.label
                        ))
                        .size(20.0)
                        .strong(),
                    );
                });

                match &outcome.result {
                    Ok(prediction) => {
                        ui.label(
                            RichText::new(prediction.display_label())
                                .size(40.0)
                                .strong()
                                .color(label_color(prediction.label)),
                        );
                        ui.label(format!("score {:.4}", prediction.score));
                        if let Some(format) = outcome.format {
                            ui.label(RichText::new(format!("{format} model")).weak());
                        }
                    }
                    Err(e) => {
                        ui.label(RichText::new(format!("{e}")).color(Color32::RED));
                    }
                }
                ui.add_space(8.0);
            }

            if !report.reflectance.mismatched.is_empty() {
                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "Channels missing on one side: {}",
                        report.reflectance.mismatched.join(", ")
                    ))
                    .color(Color32::YELLOW),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut DashboardState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let can_export = state.report.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui.button("Refresh").clicked() {
            state.refresh();
        }

        if let Some(report) = &state.report {
            ui.separator();
            ui.label(format!("Time: {}", report.timestamp()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut DashboardState) {
    let file = rfd::FileDialog::new()
        .set_title("Export reflectance")
        .set_file_name(DEFAULT_EXPORT_PATH)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_csv(&path);
    }
}
