//! # Beat Indicator Widget
//!
//! A lamp that lights up for a short pulse every time the engine reports a
//! beat. The pulse timing lives in the core; this widget only draws it.

use iced::widget::canvas::{self, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{Color, Element, Rectangle, Renderer, Theme, mouse};

/// Diameter of the lamp in pixels.
const LAMP_SIZE: f32 = 28.0;

pub struct BeatIndicator {
    /// Whether a beat pulse is currently active
    on: bool,
}

impl BeatIndicator {
    pub fn new(on: bool) -> Self {
        Self { on }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fixed(LAMP_SIZE + 4.0))
                .height(iced::Length::Fixed(LAMP_SIZE + 4.0)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for BeatIndicator {
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

        let lamp = Path::circle(frame.center(), LAMP_SIZE / 2.0);
        let color = if self.on {
            Color::from_rgb8(0xFF, 0x33, 0x33) // Red
        } else {
            Color::WHITE
        };
        frame.fill(&lamp, color);
        frame.stroke(
            &lamp,
            Stroke::default().with_width(1.5).with_color(Color::BLACK),
        );

        vec![frame.into_geometry()]
    }
}
