use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

pub const TREND_COLOR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
pub const RECOMMENDED_COLOR: Color32 = Color32::from_rgb(0x2c, 0xa0, 0x2c);
pub const THRESHOLD_COLOR: Color32 = Color32::from_rgb(0xd6, 0x27, 0x28);

// ---------------------------------------------------------------------------
// Sequential colour scale for the heatmap
// ---------------------------------------------------------------------------

/// Yellow → orange → red, light for quiet cells and dark for busy ones.
const YL_OR_RD: [(u8, u8, u8); 8] = [
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xb1, 0x00, 0x26),
];

/// Piecewise-linear colour scale, interpolated in linear RGB.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<LinSrgb>,
}

impl ColorScale {
    pub fn yl_or_rd() -> Self {
        let stops = YL_OR_RD
            .iter()
            .map(|&(r, g, b)| Srgb::new(r, g, b).into_linear())
            .collect();
        ColorScale { stops }
    }

    /// Colour at position `t` in `[0, 1]` (clamped).
    pub fn at(&self, t: f32) -> Color32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let segments = (self.stops.len() - 1) as f32;
        let pos = t * segments;
        let idx = (pos.floor() as usize).min(self.stops.len() - 2);
        let mixed = self.stops[idx].mix(self.stops[idx + 1], pos - idx as f32);
        let rgb: Srgb<u8> = Srgb::from_linear(mixed);
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }

    /// Colour for `value` within `[min, max]`. A flat range maps to the middle.
    pub fn color_for(&self, value: f64, min: f64, max: f64) -> Color32 {
        let range = max - min;
        if range.abs() < f64::EPSILON {
            return self.at(0.5);
        }
        self.at(((value - min) / range) as f32)
    }
}
