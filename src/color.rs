use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
            let hsl = Hsl::new(hue, 0.7, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Heat colour for a normalized magnitude in `[0, 1]`: pale wash at 0,
/// saturated blue at 1.
pub fn heat_color(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let hsl = Hsl::new(212.0, 0.65, 0.92 - 0.55 * t);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color mapping: agency name → Color32
// ---------------------------------------------------------------------------

/// Maps each agency to a distinct colour for the charts.
#[derive(Debug, Clone)]
pub struct AgencyColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl AgencyColors {
    /// Build a colour map over the sorted set of agencies.
    pub fn new(agencies: &BTreeSet<String>) -> Self {
        let palette = generate_palette(agencies.len());
        let mapping: BTreeMap<String, Color32> =
            agencies.iter().cloned().zip(palette).collect();

        AgencyColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for an agency.
    pub fn color_for(&self, agency: &str) -> Color32 {
        self.mapping
            .get(agency)
            .copied()
            .unwrap_or(self.default_color)
    }
}
