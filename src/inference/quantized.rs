use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;

use super::{session, Classifier, ModelError, ModelFormat};
use crate::data::model::SpectralRow;

/// Quantized flat-buffer model (`.ort`). The row is fed as a single `f32`
/// tensor of shape `[1, n]`.
pub struct QuantizedModel {
    session: Session,
}

impl QuantizedModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        Ok(Self {
            session: session::open(path)?,
        })
    }
}

/// Input tensor layout for a quantized model.
pub(super) fn input(row: &SpectralRow) -> ([usize; 2], Vec<f32>) {
    let data: Vec<f32> = row.features().into_iter().map(|v| v as f32).collect();
    ([1, data.len()], data)
}

impl Classifier for QuantizedModel {
    fn format(&self) -> ModelFormat {
        ModelFormat::Quantized
    }

    fn predict(&mut self, row: &SpectralRow) -> Result<f64, ModelError> {
        let (shape, data) = input(row);
        log::debug!("quantized input shape {shape:?}");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_is_single_f32_row() {
        let row: SpectralRow = [("400", Some(0.5)), ("500", None), ("600", Some(2.0))]
            .into_iter()
            .collect();
        let (shape, data) = input(&row);
        assert_eq!(shape, [1, 3]);
        assert_eq!(data[0], 0.5);
        assert!(data[1].is_nan());
        assert_eq!(data[2], 2.0);
    }
}
