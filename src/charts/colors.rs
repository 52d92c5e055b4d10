//! Continuous color scales for brightness markers.

use clap::ValueEnum;
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Plotly "Reds", light to dark.
const REDS: [(u8, u8, u8); 9] = [
    (255, 245, 240),
    (254, 224, 210),
    (252, 187, 161),
    (252, 146, 114),
    (251, 106, 74),
    (239, 59, 44),
    (203, 24, 29),
    (165, 15, 21),
    (103, 0, 13),
];

/// Plotly "YlOrRd", yellow to dark red.
const YL_OR_RD: [(u8, u8, u8); 9] = [
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
];

/// Marker color scale, selectable from the CLI or the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ColorScale {
    /// Dark red for dim detections, pale for the brightest
    #[default]
    #[serde(rename = "reds-r")]
    #[value(name = "reds-r")]
    RedsReversed,
    #[serde(rename = "reds")]
    #[value(name = "reds")]
    Reds,
    #[serde(rename = "yl-or-rd")]
    #[value(name = "yl-or-rd")]
    YlOrRd,
}

impl ColorScale {
    /// Color at position `t` in [0, 1]; out-of-range input is clamped.
    pub fn color_at(self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        match self {
            ColorScale::Reds => interpolate(&REDS, t),
            ColorScale::RedsReversed => interpolate(&REDS, 1.0 - t),
            ColorScale::YlOrRd => interpolate(&YL_OR_RD, t),
        }
    }
}

fn interpolate(stops: &[(u8, u8, u8)], t: f64) -> RGBColor {
    let pos = t * (stops.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(stops.len() - 1);
    let frac = pos - lower as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (r0, g0, b0) = stops[lower];
    let (r1, g1, b1) = stops[upper];

    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}
