//! Model runner: a uniform `predict(row) -> f64` over two artifact formats.
//!
//! * [`ModelFormat::Quantized`] – ONNX Runtime flat-buffer models (`.ort`),
//!   fed one `f32` row as-is.
//! * [`ModelFormat::FullGraph`] – full ONNX graphs (`.onnx`, or a directory
//!   holding `model.onnx`), fed `f64` rows reshaped to `[-1, feature_count]`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::ModelEntry;
use crate::data::model::SpectralRow;

mod graph;
mod quantized;
mod session;

pub use graph::GraphModel;
pub use quantized::QuantizedModel;

/// File name looked up inside a full-graph model directory.
pub const GRAPH_FILE_NAME: &str = "model.onnx";

/// Features per row expected by the full-graph models.
pub const DEFAULT_FEATURE_COUNT: usize = 19;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot reshape {len} features into rows of {feature_count}")]
    Shape { len: usize, feature_count: usize },

    #[error("model produced no output")]
    EmptyOutput,

    #[error("inference runtime error: {0}")]
    Runtime(String),
}

impl ModelError {
    pub(crate) fn runtime(err: impl fmt::Display) -> Self {
        ModelError::Runtime(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Quantized,
    FullGraph,
}

impl ModelFormat {
    /// `.ort` is quantized, anything else is a full graph.
    pub fn detect(path: &Path) -> Self {
        let is_ort = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ort"));
        if is_ort {
            ModelFormat::Quantized
        } else {
            ModelFormat::FullGraph
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::Quantized => write!(f, "quantized"),
            ModelFormat::FullGraph => write!(f, "full-graph"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// A loaded model that scores one spectral row.
pub trait Classifier {
    fn format(&self) -> ModelFormat;

    /// Score of the row: the first element of the first model output.
    fn predict(&mut self, row: &SpectralRow) -> Result<f64, ModelError>;
}

/// Runtime options shared by all models.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceOptions {
    /// Row width the full-graph models are reshaped to.
    pub feature_count: usize,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            feature_count: DEFAULT_FEATURE_COUNT,
        }
    }
}

/// Resolve the file to load: a full-graph directory maps to its
/// `model.onnx`. Missing files are reported before the runtime is touched.
pub fn resolve_model_path(path: &Path) -> Result<(ModelFormat, PathBuf), ModelError> {
    let format = ModelFormat::detect(path);
    let file = if format == ModelFormat::FullGraph && path.is_dir() {
        path.join(GRAPH_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    if !file.is_file() {
        return Err(ModelError::NotFound(file));
    }
    Ok((format, file))
}

/// Load a model, choosing the implementation from the path.
pub fn load_model(path: &Path, options: &InferenceOptions) -> Result<Box<dyn Classifier>, ModelError> {
    let (format, file) = resolve_model_path(path)?;
    log::info!("Loading {format} model from {}", file.display());
    Ok(match format {
        ModelFormat::Quantized => Box::new(QuantizedModel::load(&file)?),
        ModelFormat::FullGraph => Box::new(GraphModel::load(&file, options.feature_count)?),
    })
}

// ---------------------------------------------------------------------------
// Loader seam used by the pipeline
// ---------------------------------------------------------------------------

/// Turns a configured model entry into a ready classifier.
pub trait ModelLoader {
    fn load(&self, entry: &ModelEntry) -> Result<Box<dyn Classifier>, ModelError>;
}

/// Production loader backed by ONNX Runtime.
#[derive(Debug, Clone, Default)]
pub struct OrtLoader {
    pub options: InferenceOptions,
}

impl OrtLoader {
    pub fn new(options: InferenceOptions) -> Self {
        Self { options }
    }
}

impl ModelLoader for OrtLoader {
    fn load(&self, entry: &ModelEntry) -> Result<Box<dyn Classifier>, ModelError> {
        load_model(&entry.path, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ModelFormat::detect(Path::new("m.ort")), ModelFormat::Quantized);
        assert_eq!(ModelFormat::detect(Path::new("m.ORT")), ModelFormat::Quantized);
        assert_eq!(ModelFormat::detect(Path::new("m.onnx")), ModelFormat::FullGraph);
        assert_eq!(
            ModelFormat::detect(Path::new("reva-paracetamol.csv_best_model_2024-04-25_15-33-09")),
            ModelFormat::FullGraph
        );
    }

    #[test]
    fn test_resolve_directory_to_graph_file() {
        let dir = tempfile::tempdir().unwrap();
        let graph = dir.path().join(GRAPH_FILE_NAME);
        std::fs::write(&graph, b"placeholder").unwrap();

        let (format, file) = resolve_model_path(dir.path()).unwrap();
        assert_eq!(format, ModelFormat::FullGraph);
        assert_eq!(file, graph);
    }

    #[test]
    fn test_missing_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let err = resolve_model_path(&dir.path().join("absent.ort")).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));

        // A directory without model.onnx inside
        let err = load_model(dir.path(), &InferenceOptions::default()).err().unwrap();
        assert!(matches!(err, ModelError::NotFound(p) if p.ends_with(GRAPH_FILE_NAME)));
    }
}
