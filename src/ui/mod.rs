pub mod panels;
pub mod plot;
pub mod table;

use reflectance_classifier::data::model::Reading;

/// Cell text for a reading, `NaN` for the missing marker.
pub fn format_reading(value: Reading) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "NaN".to_string(),
    }
}
