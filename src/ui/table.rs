use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use reflectance_classifier::data::model::SpectralRow;

use super::format_reading;
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Reflectance table (bottom panel)
// ---------------------------------------------------------------------------

/// Render the reflectance row, optionally with the raw input rows, as a
/// one-column-per-wavelength table.
pub fn reflectance_table(ui: &mut Ui, state: &mut DashboardState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Reflectance:");
        ui.checkbox(&mut state.show_inputs, "Show background / sample");
    });

    let Some(report) = &state.report else {
        return;
    };

    let mut rows: Vec<(&str, &SpectralRow)> = vec![("Reflectance", &report.reflectance.row)];
    if state.show_inputs {
        rows.push(("Background", &report.background));
        rows.push(("Sample", &report.sample));
    }
    let labels: Vec<&str> = report.reflectance.row.labels().collect();

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(90.0))
            .columns(Column::auto().at_least(60.0), labels.len())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("");
                });
                for label in &labels {
                    header.col(|ui| {
                        ui.strong(*label);
                    });
                }
            })
            .body(|mut body| {
                for (name, row) in &rows {
                    body.row(18.0, |mut table_row| {
                        table_row.col(|ui| {
                            ui.label(*name);
                        });
                        for label in &labels {
                            table_row.col(|ui| {
                                ui.label(format_reading(row.get(label).flatten()));
                            });
                        }
                    });
                }
            });
    });
}
