//! One synchronous run: fetch → reflectance → models → labels.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};

use crate::config::{Config, ModelEntry};
use crate::data::model::{PredictionResult, ReflectanceRow, SpectralRow};
use crate::data::reflectance::{self, ReflectanceError};
use crate::inference::{ModelError, ModelFormat, ModelLoader, OrtLoader};
use crate::source::{FetchError, RowSource, SourceSpec};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{role} retrieval from {location} failed: {source}")]
    Fetch {
        role: &'static str,
        location: String,
        source: FetchError,
    },

    #[error(transparent)]
    Reflectance(#[from] ReflectanceError),
}

/// Result of one configured model.
#[derive(Debug)]
pub struct ModelOutcome {
    pub entry: ModelEntry,
    /// Format of the loaded model; `None` when loading failed.
    pub format: Option<ModelFormat>,
    pub result: Result<PredictionResult, ModelError>,
}

/// Everything a run produced, ready for display or export.
#[derive(Debug)]
pub struct RunReport {
    pub taken_at: DateTime<FixedOffset>,
    pub background: SpectralRow,
    pub sample: SpectralRow,
    pub reflectance: ReflectanceRow,
    pub outcomes: Vec<ModelOutcome>,
}

impl RunReport {
    pub fn timestamp(&self) -> String {
        self.taken_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Successful predictions in model order.
    pub fn predictions(&self) -> impl Iterator<Item = &PredictionResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

/// Options for [`run_with`] that do not concern sources or models.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub strict_keys: bool,
    pub offset: FixedOffset,
}

/// Run the pipeline described by `config` against the ORT runtime.
pub fn run(config: &Config) -> Result<RunReport, PipelineError> {
    let timeout = config.sources.timeout();
    let background = build_source("background", config.sources.background_spec(), timeout)?;
    let sample = build_source("sample", config.sources.sample_spec(), timeout)?;
    let loader = OrtLoader::new(config.inference.clone());
    let options = RunOptions {
        strict_keys: config.reflectance.strict_keys,
        offset: config.display.offset(),
    };
    run_with(background.as_ref(), sample.as_ref(), &config.models, &loader, &options)
}

fn build_source(
    role: &'static str,
    spec: SourceSpec,
    timeout: Duration,
) -> Result<Box<dyn RowSource>, PipelineError> {
    let location = spec.to_string();
    spec.into_source(timeout).map_err(|source| PipelineError::Fetch {
        role,
        location,
        source,
    })
}

/// Run the pipeline with explicit collaborators.
///
/// A failed retrieval aborts the run. A failing model is recorded in its
/// outcome and the remaining models still run.
pub fn run_with(
    background: &dyn RowSource,
    sample: &dyn RowSource,
    models: &[ModelEntry],
    loader: &dyn ModelLoader,
    options: &RunOptions,
) -> Result<RunReport, PipelineError> {
    let background_row = fetch("background", background)?;
    let sample_row = fetch("sample", sample)?;

    let reflectance = if options.strict_keys {
        reflectance::compute_strict(&background_row, &sample_row)?
    } else {
        reflectance::compute(&background_row, &sample_row)
    };

    let outcomes = models
        .iter()
        .map(|entry| {
            let (format, result) = score(entry, loader, &reflectance);
            match &result {
                Ok(prediction) => log::info!(
                    "Model {}: score {} → {}",
                    entry.label,
                    prediction.score,
                    prediction.display_label()
                ),
                Err(e) => log::warn!("Model {} failed: {e}", entry.label),
            }
            ModelOutcome {
                entry: entry.clone(),
                format,
                result,
            }
        })
        .collect();

    Ok(RunReport {
        taken_at: Utc::now().with_timezone(&options.offset),
        background: background_row,
        sample: sample_row,
        reflectance,
        outcomes,
    })
}

fn fetch(role: &'static str, source: &dyn RowSource) -> Result<SpectralRow, PipelineError> {
    match source.fetch() {
        Ok(row) => {
            log::info!("Fetched {} {role} channels from {}", row.len(), source.describe());
            Ok(row)
        }
        Err(e) => {
            log::error!("Error in {role} retrieval: {e}");
            Err(PipelineError::Fetch {
                role,
                location: source.describe(),
                source: e,
            })
        }
    }
}

fn score(
    entry: &ModelEntry,
    loader: &dyn ModelLoader,
    reflectance: &ReflectanceRow,
) -> (Option<ModelFormat>, Result<PredictionResult, ModelError>) {
    let mut model = match loader.load(entry) {
        Ok(model) => model,
        Err(e) => return (None, Err(e)),
    };
    let format = model.format();
    log::debug!("Scoring with {format} model {}", entry.label);
    let result = model
        .predict(&reflectance.row)
        .map(|score| PredictionResult::new(entry.label.clone(), score));
    (Some(format), result)
}

// ---------------------------------------------------------------------------
// Text report (headless mode)
// ---------------------------------------------------------------------------

/// Plain-text rendering of a report, labelled with the analyte name.
pub struct TextReport<'a> {
    pub report: &'a RunReport,
    pub analyte: &'a str,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "Time: {}", report.timestamp())?;
        writeln!(f)?;
        writeln!(f, "Reflectance:")?;
        for channel in report.reflectance.row.channels() {
            match channel.value {
                Some(v) => writeln!(f, "  {:>10}  {v:.6}", channel.label)?,
                None => writeln!(f, "  {:>10}  <missing>", channel.label)?,
            }
        }
        writeln!(f)?;
        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(p) => match outcome.format {
                    Some(format) => writeln!(
                        f,
                        "{} type ({}, {format}): {}",
                        self.analyte,
                        outcome.entry.label,
                        p.display_label()
                    )?,
                    None => writeln!(
                        f,
                        "{} type ({}): {}",
                        self.analyte,
                        outcome.entry.label,
                        p.display_label()
                    )?,
                },
                Err(e) => writeln!(f, "{} type ({}): error: {e}", self.analyte, outcome.entry.label)?,
            }
        }
        Ok(())
    }
}
