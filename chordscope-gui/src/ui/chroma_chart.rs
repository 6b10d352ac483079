//! # Chroma Chart Widget
//!
//! Shows the weight vectors of the most recent chord inferences, one row per
//! inference (newest on top). Each row is labeled with the inferred chord and
//! carries 13 bars: the 12 pitch classes plus the unlabeled extra weight.

use iced::widget::canvas::{self, Geometry, Path, Text};
use iced::widget::container;
use iced::{Color, Element, Point, Rectangle, Renderer, Size, Theme, mouse};

use chordscope_core::display::{ChromaBar, heat_color};

use super::to_color;

/// Width reserved on the left for the chord label.
const LABEL_WIDTH: f32 = 48.0;
/// Vertical gap between rows.
const ROW_GAP: f32 = 2.0;

/// One inference row: the chord it names and its weight bars.
pub struct ChromaRow {
    pub chord: String,
    pub bars: Vec<ChromaBar>,
}

pub struct ChromaChart {
    rows: Vec<ChromaRow>,
}

impl ChromaChart {
    pub fn new(rows: Vec<ChromaRow>) -> Self {
        Self { rows }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fill),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for ChromaChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let text_color = theme.palette().text;

        if !bounds.width.is_finite() || !bounds.height.is_finite() {
            return vec![frame.into_geometry()];
        }

        if self.rows.is_empty() {
            frame.fill_text(Text {
                content: "Waiting for inferences".to_string(),
                position: frame.center(),
                color: text_color,
                size: 14.0.into(),
                horizontal_alignment: iced::alignment::Horizontal::Center,
                vertical_alignment: iced::alignment::Vertical::Center,
                ..Text::default()
            });
            return vec![frame.into_geometry()];
        }

        let row_height = bounds.height / self.rows.len() as f32;
        let bar_area = (bounds.width - LABEL_WIDTH).max(0.0);

        for (i, row) in self.rows.iter().enumerate() {
            let top = i as f32 * row_height;
            let usable = (row_height - ROW_GAP).max(0.0);

            frame.fill_text(Text {
                content: row.chord.clone(),
                position: Point::new(4.0, top + usable / 2.0),
                color: text_color,
                size: 14.0.into(),
                horizontal_alignment: iced::alignment::Horizontal::Left,
                vertical_alignment: iced::alignment::Vertical::Center,
                ..Text::default()
            });

            if row.bars.is_empty() {
                continue;
            }
            let bar_width = bar_area / row.bars.len() as f32;
            for (j, bar) in row.bars.iter().enumerate() {
                let height = bar.height * usable;
                let x = LABEL_WIDTH + j as f32 * bar_width;
                if height > 0.0 {
                    let rect = Path::rectangle(
                        Point::new(x + 1.0, top + usable - height),
                        Size::new((bar_width - 2.0).max(1.0), height),
                    );
                    frame.fill(&rect, to_color(heat_color(bar.height)));
                }
                // Pitch-class labels on the newest row only
                if i == 0 {
                    if let Some(label) = bar.label {
                        frame.fill_text(Text {
                            content: label.to_string(),
                            position: Point::new(x + bar_width / 2.0, top + 2.0),
                            color: Color { a: 0.7, ..text_color },
                            size: 10.0.into(),
                            horizontal_alignment: iced::alignment::Horizontal::Center,
                            vertical_alignment: iced::alignment::Vertical::Top,
                            ..Text::default()
                        });
                    }
                }
            }
        }

        vec![frame.into_geometry()]
    }
}
