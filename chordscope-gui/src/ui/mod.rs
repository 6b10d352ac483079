//! # UI Module
//!
//! This module contains all UI components for the ChordScope application.

pub mod beat_indicator;
pub mod chord_timeline;
pub mod chroma_chart;
pub mod fft_plot;
pub mod heat_grid;
pub mod main_display;
pub mod piano_keyboard;

use chordscope_core::display::Rgb;
use iced::Color;

/// Converts a core display color into an Iced color.
pub fn to_color(rgb: Rgb) -> Color {
    Color::from_rgb(rgb.r, rgb.g, rgb.b)
}
