use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoints, Points};

use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Reflectance plot (central panel)
// ---------------------------------------------------------------------------

const LINE_COLOR: Color32 = Color32::from_rgb(0, 0, 255);

/// Render wavelength vs reflectance as a line with point markers.
pub fn reflectance_plot(ui: &mut Ui, state: &DashboardState) {
    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No reflectance data yet  (Refresh to fetch)");
        });
        return;
    };

    let row = &report.reflectance.row;
    let x_label = if row.has_numeric_wavelengths() {
        "Wavelength (nm)"
    } else {
        "Channel"
    };
    let points = row.plot_points();

    Plot::new("reflectance_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label(x_label)
        .y_axis_label("Reflectance")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let line = Line::new(PlotPoints::from(points.clone()))
                .name("reflectance")
                .color(LINE_COLOR)
                .width(1.5);
            plot_ui.line(line);

            let markers = Points::new(PlotPoints::from(points))
                .color(LINE_COLOR)
                .radius(3.0);
            plot_ui.points(markers);
        });
}
