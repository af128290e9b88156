use super::model::{Label, Reading, ReflectanceRow, SpectralRow};

/// Scores at or above this value are [`Label::Optizorb`].
pub const CLASS_THRESHOLD: f64 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum ReflectanceError {
    #[error(
        "background and sample channels differ (only in background: {only_background:?}, only in sample: {only_sample:?})"
    )]
    KeyMismatch {
        only_background: Vec<String>,
        only_sample: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Reflectance
// ---------------------------------------------------------------------------

/// Element-wise reflectance: `(sample[k] / background[k])²` for every key.
///
/// Keys follow the sample's order, followed by background-only keys. A key
/// present on one side only, or a missing cell on either side, gives a
/// missing reading. `x / 0` squares to `+inf`; `0 / 0` is missing.
pub fn compute(background: &SpectralRow, sample: &SpectralRow) -> ReflectanceRow {
    let mut row = SpectralRow::new();
    let mut mismatched = Vec::new();

    for channel in sample.channels() {
        let value = match background.get(&channel.label) {
            Some(bg) => ratio_squared(channel.value, bg),
            None => {
                mismatched.push(channel.label.clone());
                None
            }
        };
        row.insert(channel.label.clone(), value);
    }

    for label in background.labels() {
        if !sample.contains(label) {
            mismatched.push(label.to_string());
            row.insert(label, None);
        }
    }

    if !mismatched.is_empty() {
        log::warn!(
            "{} channel(s) present on one side only, set to missing: {mismatched:?}",
            mismatched.len()
        );
    }

    ReflectanceRow { row, mismatched }
}

/// Same as [`compute`] but rejects rows whose key sets differ.
pub fn compute_strict(
    background: &SpectralRow,
    sample: &SpectralRow,
) -> Result<ReflectanceRow, ReflectanceError> {
    let only_background: Vec<String> = background
        .labels()
        .filter(|l| !sample.contains(l))
        .map(str::to_string)
        .collect();
    let only_sample: Vec<String> = sample
        .labels()
        .filter(|l| !background.contains(l))
        .map(str::to_string)
        .collect();

    if !only_background.is_empty() || !only_sample.is_empty() {
        return Err(ReflectanceError::KeyMismatch {
            only_background,
            only_sample,
        });
    }
    Ok(compute(background, sample))
}

fn ratio_squared(sample: Reading, background: Reading) -> Reading {
    let (s, b) = (sample?, background?);
    let value = (s / b).powi(2);
    (!value.is_nan()).then_some(value)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Map a model score to its label. Exactly `1.0` is `Optizorb`.
pub fn classify(score: f64) -> Label {
    if score < CLASS_THRESHOLD {
        Label::Regular
    } else {
        Label::Optizorb
    }
}
