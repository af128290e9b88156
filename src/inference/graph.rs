use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;

use super::{session, Classifier, ModelError, ModelFormat};
use crate::data::model::SpectralRow;

/// Full-graph ONNX model. The row is fed as `f64`, reshaped to
/// `[-1, feature_count]`.
pub struct GraphModel {
    session: Session,
    feature_count: usize,
}

impl GraphModel {
    pub fn load(path: &Path, feature_count: usize) -> Result<Self, ModelError> {
        Ok(Self {
            session: session::open(path)?,
            feature_count,
        })
    }
}

/// Input tensor layout for a full-graph model.
pub(super) fn input(row: &SpectralRow, feature_count: usize) -> Result<([usize; 2], Vec<f64>), ModelError> {
    let data = row.features();
    if feature_count == 0 || data.is_empty() || data.len() % feature_count != 0 {
        return Err(ModelError::Shape {
            len: data.len(),
            feature_count,
        });
    }
    Ok(([data.len() / feature_count, feature_count], data))
}

impl Classifier for GraphModel {
    fn format(&self) -> ModelFormat {
        ModelFormat::FullGraph
    }

    fn predict(&mut self, row: &SpectralRow) -> Result<f64, ModelError> {
        let (shape, data) = input(row, self.feature_count)?;
        log::debug!("full-graph input shape {shape:?}");
        let tensor = Tensor::from_array((shape, data)).map_err(ModelError::runtime)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(ModelError::runtime)?;
        if outputs.len() == 0 {
            return Err(ModelError::EmptyOutput);
        }
        session::first_scalar(&outputs[0])
    }
}
