//! TOML configuration for a pipeline run.
//!
//! Every field is optional; the defaults reproduce the production dashboard
//! (the two instrument endpoints and a single full-graph model):
//!
//! ```toml
//! # reflectance.toml
//! [sources]
//! background = "https://x8ki-letl-twmt.n7.xano.io/api:3Ws6ADLi/bgdata"
//! sample = "data/sample.parquet"   # URL or local file
//! timeout_secs = 30
//!
//! [reflectance]
//! strict_keys = false
//!
//! [inference]
//! feature_count = 19
//!
//! [[models]]
//! label = "m3"
//! path = "models/reva-paracetamol.onnx"
//!
//! [display]
//! analyte = "Paracetamol"
//! utc_offset_hours = 8
//!
//! [output]
//! csv = "absorbance_data.csv"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::inference::InferenceOptions;
use crate::source::SourceSpec;

pub const DEFAULT_BACKGROUND_URL: &str = "https://x8ki-letl-twmt.n7.xano.io/api:3Ws6ADLi/bgdata";
pub const DEFAULT_SAMPLE_URL: &str = "https://x8ki-letl-twmt.n7.xano.io/api:Qc5crfn2/spectraldata";
pub const DEFAULT_EXPORT_PATH: &str = "absorbance_data.csv";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub reflectance: ReflectanceConfig,
    pub inference: InferenceOptions,
    /// Models scored on every run, in order.
    pub models: Vec<ModelEntry>,
    pub display: DisplayConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            reflectance: ReflectanceConfig::default(),
            inference: InferenceOptions::default(),
            models: vec![ModelEntry {
                label: "m3".to_string(),
                path: PathBuf::from("models/reva-paracetamol.csv_best_model_2024-04-25_15-33-09"),
            }],
            display: DisplayConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Where the background and sample readings come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// URL or file path of the background reading.
    pub background: String,
    /// URL or file path of the sample reading.
    pub sample: String,
    /// HTTP request timeout.
    pub timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND_URL.to_string(),
            sample: DEFAULT_SAMPLE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl SourcesConfig {
    pub fn background_spec(&self) -> SourceSpec {
        SourceSpec::parse(&self.background)
    }

    pub fn sample_spec(&self) -> SourceSpec {
        SourceSpec::parse(&self.sample)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReflectanceConfig {
    /// Reject background/sample rows whose channels differ instead of
    /// padding the mismatched channels with missing values.
    pub strict_keys: bool,
}

/// One model to score, as `label = path`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelEntry {
    pub label: String,
    pub path: PathBuf,
}

impl ModelEntry {
    /// Parse a CLI `LABEL=PATH` pair. A bare path is labelled by its file stem.
    pub fn parse(s: &str) -> Self {
        match s.split_once('=') {
            Some((label, path)) => Self {
                label: label.trim().to_string(),
                path: PathBuf::from(path.trim()),
            },
            None => {
                let path = PathBuf::from(s.trim());
                let label = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| s.trim().to_string());
                Self { label, path }
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Shown as "<analyte> type :" next to each label.
    pub analyte: String,
    /// Offset applied to the run timestamp.
    pub utc_offset_hours: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            analyte: "Paracetamol".to_string(),
            utc_offset_hours: 8,
        }
    }
}

impl DisplayConfig {
    /// Fixed offset for timestamps; out-of-range offsets fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                log::warn!("utc_offset_hours = {} is out of range, using UTC", self.utc_offset_hours);
                Utc.fix()
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Export the reflectance table here after every successful run.
    /// An empty string turns the export off.
    #[serde(deserialize_with = "non_empty_path")]
    pub csv: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv: Some(PathBuf::from(DEFAULT_EXPORT_PATH)),
        }
    }
}

fn non_empty_path<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok((!raw.trim().is_empty()).then(|| PathBuf::from(raw)))
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
