use std::path::Path;

use reflectance_classifier::config::Config;
use reflectance_classifier::data::export::{self, ExportError};
use reflectance_classifier::pipeline::{self, RunReport};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct DashboardState {
    /// Sources, models and display settings for every run.
    pub config: Config,

    /// Last successful run (kept when a later refresh fails).
    pub report: Option<RunReport>,

    /// Swatch colour per configured model.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether the table also lists the raw background and sample rows.
    pub show_inputs: bool,
}

impl DashboardState {
    pub fn new(config: Config) -> Self {
        let color_map = ColorMap::new(&config.models);
        Self {
            config,
            report: None,
            color_map,
            status_message: None,
            show_inputs: false,
        }
    }

    /// Run the pipeline synchronously and ingest the result.
    pub fn refresh(&mut self) {
        match pipeline::run(&self.config) {
            Ok(report) => {
                self.status_message = None;
                if let Some(path) = &self.config.output.csv {
                    if let Err(e) = write_csv(&report, path) {
                        self.status_message = Some(format!("Error: {e}"));
                    }
                }
                self.report = Some(report);
            }
            Err(e) => {
                log::error!("Run failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Export the current reflectance table. Does nothing before the first run.
    pub fn export_csv(&mut self, path: &Path) {
        let Some(report) = &self.report else {
            return;
        };
        if let Err(e) = write_csv(report, path) {
            self.status_message = Some(format!("Error: {e}"));
        }
    }
}

fn write_csv(report: &RunReport, path: &Path) -> Result<(), ExportError> {
    export::export_csv(&report.reflectance, path).map_err(|e| {
        log::error!("Failed to export {}: {e}", path.display());
        e
    })
}
