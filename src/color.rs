use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Mean markers, as in the legend of the box plots.
pub const MEAN_COLOR: Color32 = Color32::from_rgb(128, 0, 128);

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

// ---------------------------------------------------------------------------
// Series colours: legend label → Color32
// ---------------------------------------------------------------------------

/// Gives every series label its own colour, stable across panels.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl SeriesColors {
    /// Assign colours to labels in first-seen order.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ordered: Vec<&str> = Vec::new();
        for label in labels {
            if !ordered.contains(&label) {
                ordered.push(label);
            }
        }
        let palette = generate_palette(ordered.len());
        let mapping = ordered
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();

        SeriesColors {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.mapping.keys().map(String::as_str)
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}
