use std::path::Path;

use ort::session::Session;
use ort::value::DynValue;

use super::ModelError;

/// Open an ONNX Runtime session on a single intra-op thread.
pub(super) fn open(path: &Path) -> Result<Session, ModelError> {
    let builder = Session::builder().map_err(ModelError::runtime)?;
    let builder = builder.with_intra_threads(1).map_err(ModelError::runtime)?;
    builder.commit_from_file(path).map_err(ModelError::runtime)
}

/// First element of an output tensor, `predictions[0][0]` for a `[n, 1]`
/// prediction. Accepts `f32` and `f64` outputs.
pub(super) fn first_scalar(value: &DynValue) -> Result<f64, ModelError> {
    if let Ok((_, data)) = value.try_extract_tensor::<f32>() {
        return data.first().map(|v| f64::from(*v)).ok_or(ModelError::EmptyOutput);
    }
    let (_, data) = value
        .try_extract_tensor::<f64>()
        .map_err(ModelError::runtime)?;
    data.first().copied().ok_or(ModelError::EmptyOutput)
}
