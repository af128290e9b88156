use std::fmt;

// ---------------------------------------------------------------------------
// Reading – a single cell of a spectral row
// ---------------------------------------------------------------------------

/// A single intensity reading. `None` is the missing-value marker produced
/// when a cell is absent, non-numeric or undefined (e.g. `0 / 0`).
pub type Reading = Option<f64>;

/// Parse a numeric wavelength (nm) out of a channel label.
///
/// Accepts plain numbers (`"410"`, `"410.5"`) and an optional `nm` suffix
/// (`"410nm"`, `"410 nm"`). Anything else yields `None`.
pub fn wavelength_nm(label: &str) -> Option<f64> {
    let trimmed = label.trim();
    let lower = trimmed.to_ascii_lowercase();
    let numeric = lower.strip_suffix("nm").unwrap_or(&lower).trim_end();
    numeric.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Channel / SpectralRow
// ---------------------------------------------------------------------------

/// One spectral channel: wavelength label plus reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub label: String,
    pub value: Reading,
}

/// Ordered mapping wavelength label → reading.
///
/// Insertion order is kept exactly as delivered by the data source, which
/// for the instrument endpoints is ascending wavelength.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectralRow {
    channels: Vec<Channel>,
}

impl SpectralRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reading. An existing label keeps its position and gets the
    /// new value.
    pub fn insert(&mut self, label: impl Into<String>, value: Reading) {
        let label = label.into();
        match self.channels.iter_mut().find(|c| c.label == label) {
            Some(channel) => channel.value = value,
            None => self.channels.push(Channel { label, value }),
        }
    }

    /// `None` when the label is absent, `Some(None)` when the cell is missing.
    pub fn get(&self, label: &str) -> Option<Reading> {
        self.channels
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.value)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.channels.iter().any(|c| c.label == label)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Readings as a dense feature vector, missing cells as NaN.
    pub fn features(&self) -> Vec<f64> {
        self.channels
            .iter()
            .map(|c| c.value.unwrap_or(f64::NAN))
            .collect()
    }

    /// Whether every label parses as a wavelength in nm.
    pub fn has_numeric_wavelengths(&self) -> bool {
        !self.is_empty() && self.channels.iter().all(|c| wavelength_nm(&c.label).is_some())
    }

    /// Chart points `[x, y]`. The x axis is the wavelength when every label
    /// is numeric, otherwise the channel index. Missing and non-finite
    /// readings are skipped.
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        let numeric_x = self.has_numeric_wavelengths();
        self.channels
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                let y = c.value.filter(|v| v.is_finite())?;
                let x = if numeric_x {
                    wavelength_nm(&c.label)?
                } else {
                    i as f64
                };
                Some([x, y])
            })
            .collect()
    }
}

impl<L: Into<String>> FromIterator<(L, Reading)> for SpectralRow {
    fn from_iter<I: IntoIterator<Item = (L, Reading)>>(iter: I) -> Self {
        let mut row = SpectralRow::new();
        for (label, value) in iter {
            row.insert(label, value);
        }
        row
    }
}

// ---------------------------------------------------------------------------
// ReflectanceRow – derived (sample / background)² row
// ---------------------------------------------------------------------------

/// A reflectance row plus the keys that were present on one side only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReflectanceRow {
    pub row: SpectralRow,
    /// Labels found in only one of background / sample.
    pub mismatched: Vec<String>,
}

impl ReflectanceRow {
    pub fn get(&self, label: &str) -> Option<Reading> {
        self.row.get(label)
    }

    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Label / PredictionResult
// ---------------------------------------------------------------------------

/// Two-valued classification of a model score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Regular,
    Optizorb,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Regular => write!(f, "Regular"),
            Label::Optizorb => write!(f, "Optizorb"),
        }
    }
}

/// Score of one model on one reflectance row.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Model label from the configuration (e.g. `m3`).
    pub model: String,
    pub score: f64,
    /// `None` for a NaN score, which no threshold can place.
    pub label: Option<Label>,
}

impl PredictionResult {
    pub fn new(model: impl Into<String>, score: f64) -> Self {
        let label = (!score.is_nan()).then(|| super::reflectance::classify(score));
        Self {
            model: model.into(),
            score,
            label,
        }
    }

    /// Text shown to the user: the label, or the raw score if unlabelled.
    pub fn display_label(&self) -> String {
        match self.label {
            Some(label) => label.to_string(),
            None => format!("{}", self.score),
        }
    }
}
