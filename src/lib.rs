//! Reflectance classification: fetch a background and a sample spectral
//! reading, compute `(sample / background)²` per channel and classify the
//! result with one or more ONNX models.

pub mod config;
pub mod data;
pub mod inference;
pub mod pipeline;
pub mod source;

pub use config::Config;
pub use data::model::{Label, PredictionResult, ReflectanceRow, SpectralRow};
pub use data::reflectance::{classify, compute};
pub use pipeline::{run, run_with, RunReport};
