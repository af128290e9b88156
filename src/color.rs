use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use reflectance_classifier::config::ModelEntry;
use reflectance_classifier::data::model::Label;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Colour of the big classification text.
pub fn label_color(label: Option<Label>) -> Color32 {
    match label {
        Some(Label::Regular) => Color32::from_rgb(0, 0, 255),
        Some(Label::Optizorb) => Color32::from_rgb(220, 0, 0),
        None => Color32::GRAY,
    }
}

// ---------------------------------------------------------------------------
// Color mapping: model label → Color32
// ---------------------------------------------------------------------------

/// Maps configured model labels to distinct swatch colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(models: &[ModelEntry]) -> Self {
        let palette = generate_palette(models.len());
        let mapping = models
            .iter()
            .zip(palette)
            .map(|(m, c)| (m.label.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, model: &str) -> Color32 {
        self.mapping
            .get(model)
            .copied()
            .unwrap_or(self.default_color)
    }
}
