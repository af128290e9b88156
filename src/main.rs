mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::DashboardApp;
use reflectance_classifier::config::{Config, ModelEntry};
use reflectance_classifier::data::export;
use reflectance_classifier::pipeline::{self, TextReport};

/// Fetch background and sample readings, compute reflectance and classify it.
#[derive(Parser, Debug)]
#[command(name = "reflectance-classifier", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Background source (URL or .json/.csv/.parquet file)
    #[arg(long, value_name = "SRC")]
    background: Option<String>,

    /// Sample source (URL or .json/.csv/.parquet file)
    #[arg(long, value_name = "SRC")]
    sample: Option<String>,

    /// Model to score, repeatable; replaces the configured list
    #[arg(short, long = "model", value_name = "LABEL=PATH")]
    models: Vec<String>,

    /// Print the report to stdout instead of opening the dashboard
    #[arg(long)]
    headless: bool,

    /// Write the reflectance table to this CSV after each run
    #[arg(long, value_name = "FILE", conflicts_with = "no_export")]
    export: Option<PathBuf>,

    /// Do not write the reflectance CSV after each run
    #[arg(long)]
    no_export: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(background) = &self.background {
            config.sources.background = background.clone();
        }
        if let Some(sample) = &self.sample {
            config.sources.sample = sample.clone();
        }
        if !self.models.is_empty() {
            config.models = self.models.iter().map(|m| ModelEntry::parse(m)).collect();
        }
        if let Some(export) = &self.export {
            config.output.csv = Some(export.clone());
        }
        if self.no_export {
            config.output.csv = None;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    if cli.headless {
        return run_headless(&config);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Reflectance Classifier",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard failed: {e}"))
}

fn run_headless(config: &Config) -> Result<()> {
    let report = pipeline::run(config).context("pipeline run failed")?;

    print!(
        "{}",
        TextReport {
            report: &report,
            analyte: &config.display.analyte,
        }
    );

    if let Some(path) = &config.output.csv {
        export::export_csv(&report.reflectance, path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
