//! # Display Math Module
//!
//! Pure helpers that turn live state into the numbers a UI draws: normalized
//! bar heights, heat colors, timeline scroll offsets and the zoomed spectrum
//! trace. Nothing here owns state or touches the connection.
//!
//! ## Degenerate input
//! Normalizing against a zero, negative or non-finite maximum yields zeros
//! rather than NaN or infinity.

use std::time::Duration;

use crate::protocol::ChordInference;
use crate::theory::pitch_class_label;

/// Width of the spectrum view box.
pub const FFT_VIEW_WIDTH: f32 = 200.0;
/// Height of the spectrum view box.
pub const FFT_VIEW_HEIGHT: f32 = 50.0;
/// Upper bound on the number of fft bins drawn at full zoom.
const FFT_MAX_POINTS: f32 = 10_000.0;

/// Divides every value by the largest one.
pub fn normalize_to_max(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() || max <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| clamp_unit(v / max)).collect()
}

/// Scales a magnitude by the boost factor into `0.0..=1.0`.
pub fn boosted(value: f32, boost: f32) -> f32 {
    clamp_unit(value * boost)
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// An sRGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Heat-map color for an intensity in `0.0..=1.0`.
///
/// Hue sweeps from 190° through red as the value rises, saturation goes from
/// 50% to 100% and lightness from white towards a full color.
pub fn heat_color(value: f32) -> Rgb {
    let v = clamp_unit(value);
    let hue = (380.0 * (0.5 + 0.5 * v)).rem_euclid(360.0);
    let saturation = (50.0 + 50.0 * v) / 100.0;
    let lightness = (100.0 - 50.0 * v) / 100.0;
    hsl_to_rgb(hue, saturation, lightness)
}

/// Converts HSL (hue in degrees, saturation and lightness in `0..=1`) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    Rgb {
        r: clamp_unit(r + m),
        g: clamp_unit(g + m),
        b: clamp_unit(b + m),
    }
}

/// Distance in pixels a timeline entry has scrolled after `age`.
pub fn timeline_offset(age: Duration, px_per_ms: f32) -> f32 {
    age.as_secs_f32() * 1000.0 * px_per_ms
}

/// The leading slice of the spectrum shown at a zoom level.
///
/// Zoom is capped so that at most 10 000 bins are drawn.
pub fn zoomed_fft(fft: &[f32], zoom: f32) -> &[f32] {
    if fft.is_empty() {
        return fft;
    }
    let zoom = zoom.min(FFT_MAX_POINTS / fft.len() as f32).max(0.0);
    let count = (fft.len() as f32 * zoom).round() as usize;
    &fft[..count.min(fft.len())]
}

/// Maps spectrum bins onto a polyline in the 200×50 view box, y pointing up.
pub fn fft_polyline(bins: &[f32]) -> Vec<(f32, f32)> {
    let heights = normalize_to_max(bins);
    let count = heights.len().max(1) as f32;
    heights
        .iter()
        .enumerate()
        .map(|(i, h)| (i as f32 / count * FFT_VIEW_WIDTH, h * FFT_VIEW_HEIGHT))
        .collect()
}

/// Peak magnitude and bin count of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FftSummary {
    pub max: f32,
    pub len: usize,
}

pub fn fft_summary(fft: &[f32]) -> FftSummary {
    let max = fft.iter().copied().filter(|v| v.is_finite()).fold(0.0, f32::max);
    FftSummary {
        max,
        len: fft.len(),
    }
}

/// One bar of a chord inference's weight chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaBar {
    pub label: Option<&'static str>,
    pub weight: f32,
    pub height: f32,
}

/// Weight bars for one inference, in pitch-class order.
pub fn chroma_bars(inference: &ChordInference) -> Vec<ChromaBar> {
    let heights = normalize_to_max(&inference.weights);
    inference
        .weights
        .iter()
        .zip(heights)
        .enumerate()
        .map(|(position, (weight, height))| ChromaBar {
            label: pitch_class_label(position),
            weight: *weight,
            height,
        })
        .collect()
}
