//! # Chord Timeline Widget
//!
//! A strip of chord labels scrolling to the left. Each label sits at the
//! offset its age gives it, measured from the right edge, so the newest chord
//! enters on the right and older ones drift out on the left.

use iced::widget::canvas::{self, Fill, Frame, Geometry, Text};
use iced::widget::container;
use iced::{Color, Element, Point, Rectangle, Renderer, Size, Theme};

/// Approximate glyph width used to size label chips.
const CHAR_WIDTH: f32 = 9.0;
const CHIP_PADDING: f32 = 6.0;
const CHIP_HEIGHT: f32 = 26.0;

/// A chord label and how far it has scrolled from the right edge.
pub struct TimelineItem {
    pub label: String,
    pub offset: f32,
}

pub struct ChordTimeline {
    items: Vec<TimelineItem>,
}

impl ChordTimeline {
    pub fn new(items: Vec<TimelineItem>) -> Self {
        Self { items }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(48.0)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for ChordTimeline {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Fill::from(Color::from_rgb8(0x6B, 0x72, 0x80)),
        );

        let top = (bounds.height - CHIP_HEIGHT) / 2.0;
        // Oldest first so newer chips are painted over older ones
        for item in &self.items {
            let chip_width = item.label.chars().count() as f32 * CHAR_WIDTH + 2.0 * CHIP_PADDING;
            let left = bounds.width - item.offset - chip_width;
            if left + chip_width < 0.0 {
                continue;
            }

            frame.fill_rectangle(
                Point::new(left, top),
                Size::new(chip_width, CHIP_HEIGHT),
                Fill::from(Color::WHITE),
            );
            frame.fill_text(Text {
                content: item.label.clone(),
                position: Point::new(left + chip_width / 2.0, top + CHIP_HEIGHT / 2.0),
                color: Color::BLACK,
                size: 15.0.into(),
                font: iced::Font::MONOSPACE,
                horizontal_alignment: iced::alignment::Horizontal::Center,
                vertical_alignment: iced::alignment::Vertical::Center,
                ..Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}
