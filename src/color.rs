use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

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
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps category labels (continents, countries) to distinct colours.
///
/// Built once from the full dataset so a continent keeps its colour however
/// the filters change.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let palette = generate_palette(labels.len());
        let mapping = labels
            .iter()
            .zip(palette)
            .map(|(label, c)| (label.as_ref().to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

/// A continuous colour scale sampled by linear interpolation between stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuousScale {
    Viridis,
    Plasma,
    /// Diverging blue → grey → red, centred on the middle of the domain.
    Coolwarm,
}

impl ContinuousScale {
    fn stops(self) -> &'static [[u8; 3]] {
        match self {
            ContinuousScale::Viridis => &[
                [0x44, 0x01, 0x54],
                [0x3b, 0x52, 0x8b],
                [0x21, 0x91, 0x8c],
                [0x5e, 0xc9, 0x62],
                [0xfd, 0xe7, 0x25],
            ],
            ContinuousScale::Plasma => &[
                [0x0d, 0x08, 0x87],
                [0x7e, 0x03, 0xa8],
                [0xcc, 0x47, 0x78],
                [0xf8, 0x95, 0x40],
                [0xf0, 0xf9, 0x21],
            ],
            ContinuousScale::Coolwarm => &[
                [0x3b, 0x4c, 0xc0],
                [0xdd, 0xdc, 0xdc],
                [0xb4, 0x04, 0x26],
            ],
        }
    }

    /// Colour at position `t` in `[0, 1]`; out-of-range input is clamped.
    pub fn sample(self, t: f64) -> Color32 {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f64;
        let lo = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = (scaled - lo as f64) as f32;

        let a = linear(stops[lo]);
        let b = linear(stops[lo + 1]);
        to_color32(Srgb::from_linear(a.mix(b, frac)))
    }

    /// Colour for `value` within `[lo, hi]`. A degenerate domain maps to the
    /// middle of the scale.
    pub fn map(self, value: f64, lo: f64, hi: f64) -> Color32 {
        let span = hi - lo;
        if span.abs() < f64::EPSILON {
            return self.sample(0.5);
        }
        self.sample((value - lo) / span)
    }
}

fn linear([r, g, b]: [u8; 3]) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

/// Black or white, whichever reads better on `background`.
pub fn contrasting_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct() {
        let p = generate_palette(6);
        assert_eq!(p.len(), 6);
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn color_map_falls_back_to_grey() {
        let cm = ColorMap::new(&["Europe", "Asia"]);
        assert_ne!(cm.color_for("Europe"), cm.color_for("Asia"));
        assert_eq!(cm.color_for("Atlantis"), Color32::GRAY);
    }

    #[test]
    fn scale_endpoints_hit_first_and_last_stop() {
        assert_eq!(
            ContinuousScale::Viridis.sample(0.0),
            Color32::from_rgb(0x44, 0x01, 0x54)
        );
        assert_eq!(
            ContinuousScale::Plasma.sample(1.0),
            Color32::from_rgb(0xf0, 0xf9, 0x21)
        );
        assert_eq!(
            ContinuousScale::Plasma.sample(7.0),
            ContinuousScale::Plasma.sample(1.0)
        );
    }

    #[test]
    fn degenerate_domain_maps_to_middle() {
        let mid = ContinuousScale::Coolwarm.map(0.3, 0.3, 0.3);
        assert_eq!(mid, ContinuousScale::Coolwarm.sample(0.5));
    }

    #[test]
    fn text_contrast() {
        assert_eq!(contrasting_text(Color32::WHITE), Color32::BLACK);
        assert_eq!(contrasting_text(Color32::from_rgb(0x0d, 0x08, 0x87)), Color32::WHITE);
    }
}
