//! # Piano Keyboard Widget
//!
//! This module provides an 88-key piano keyboard that shows what is being
//! played right now.
//!
//! ## Features
//! - Raw MIDI notes highlighted in green
//! - Mapped (solo-mode) notes highlighted in red
//! - A heat strip along the bottom of each key from the bucketed spectrum

use iced::widget::canvas::{self, Fill, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{Color, Element, Point, Rectangle, Renderer, Size, Theme, mouse};

use chordscope_core::display::heat_color;

use super::to_color;

/// Number of white keys on an 88-key piano.
const WHITE_KEY_COUNT: usize = 52;
/// MIDI number of the lowest key (A0).
const LOWEST_MIDI: i32 = 21;
/// MIDI number of the highest key (C8).
const HIGHEST_MIDI: i32 = 108;

/// Pattern indicating which pitch classes are black keys, starting at C.
const IS_BLACK: [bool; 12] = [
    false, true, false, true, false, false, true, false, true, false, true, false,
];

const ACTIVE_COLOR: Color = Color::from_rgb(0.204, 0.859, 0.596); // Green
const MAPPED_COLOR: Color = Color::from_rgb(1.0, 0.2, 0.2); // Red

/// Keyboard showing held notes and per-pitch-class heat.
#[derive(Debug, Clone)]
pub struct PianoKeyboard {
    /// Raw MIDI notes currently held
    active: Vec<i32>,
    /// Notes the engine mapped them to
    mapped: Vec<i32>,
    /// Heat per pitch class (C = 0) in `0.0..=1.0`
    heat: [f32; 12],
}

impl PianoKeyboard {
    pub fn new(active: Vec<i32>, mapped: Vec<i32>, heat: [f32; 12]) -> Self {
        Self {
            active,
            mapped,
            heat,
        }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(120.0)),
        )
        .into()
    }

    fn key_color(&self, midi: i32, base: Color) -> Color {
        if self.mapped.contains(&midi) {
            MAPPED_COLOR
        } else if self.active.contains(&midi) {
            ACTIVE_COLOR
        } else {
            base
        }
    }

    fn heat_strip(&self, midi: i32) -> Option<Color> {
        let heat = self.heat[pitch_class(midi)];
        (heat > 0.0).then(|| to_color(heat_color(heat)))
    }
}

fn pitch_class(midi: i32) -> usize {
    midi.rem_euclid(12) as usize
}

impl<Message> canvas::Program<Message> for PianoKeyboard {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let white_key_width = bounds.width / WHITE_KEY_COUNT as f32;
        let black_key_width = white_key_width * 0.6;
        let black_key_height = bounds.height * 0.6;
        let strip_height = bounds.height * 0.15;

        // Draw white keys
        let mut white_key_x = 0.0;
        for midi in LOWEST_MIDI..=HIGHEST_MIDI {
            if IS_BLACK[pitch_class(midi)] {
                continue;
            }
            frame.fill_rectangle(
                Point::new(white_key_x, 0.0),
                Size::new(white_key_width, bounds.height),
                Fill::from(self.key_color(midi, Color::WHITE)),
            );
            if let Some(color) = self.heat_strip(midi) {
                frame.fill_rectangle(
                    Point::new(white_key_x, bounds.height - strip_height),
                    Size::new(white_key_width, strip_height),
                    Fill::from(color),
                );
            }
            frame.stroke(
                &Path::rectangle(
                    Point::new(white_key_x, 0.0),
                    Size::new(white_key_width, bounds.height),
                ),
                Stroke::default().with_color(Color::BLACK),
            );
            white_key_x += white_key_width;
        }

        // Draw black keys on top, centered on the boundary to their left
        let mut white_keys_passed: f32 = 0.0;
        for midi in LOWEST_MIDI..=HIGHEST_MIDI {
            if !IS_BLACK[pitch_class(midi)] {
                white_keys_passed += 1.0;
                continue;
            }
            let key_x = white_keys_passed * white_key_width - black_key_width / 2.0;
            frame.fill_rectangle(
                Point::new(key_x, 0.0),
                Size::new(black_key_width, black_key_height),
                Fill::from(self.key_color(midi, Color::BLACK)),
            );
            if let Some(color) = self.heat_strip(midi) {
                frame.fill_rectangle(
                    Point::new(key_x, black_key_height - strip_height / 2.0),
                    Size::new(black_key_width, strip_height / 2.0),
                    Fill::from(color),
                );
            }
        }

        vec![frame.into_geometry()]
    }
}
