//! # Heat Grid Widget
//!
//! A grid of labeled, heat-colored cells laid out in columns. Used for the
//! Q spectrum (one column per note, headed by its bucketed magnitude) and
//! for the engine's observations (one column per observation, footed by the
//! chord it was labeled with).

use iced::widget::canvas::{self, Fill, Geometry, Path, Stroke, Text};
use iced::widget::container;
use iced::{Color, Element, Point, Rectangle, Renderer, Size, Theme, mouse};

use chordscope_core::display::heat_color;

use super::to_color;

/// A labeled cell with an intensity in `0.0..=1.0`.
#[derive(Debug, Clone)]
pub struct Cell {
    pub label: String,
    pub value: f32,
}

/// One column of the grid, drawn top to bottom.
#[derive(Debug, Clone, Default)]
pub struct GridColumn {
    pub header: Option<Cell>,
    pub cells: Vec<Cell>,
    /// Uncolored label below the cells
    pub footer: Option<String>,
}

impl GridColumn {
    fn row_count(&self) -> usize {
        self.header.is_some() as usize + self.cells.len() + self.footer.is_some() as usize
    }
}

pub struct HeatGrid {
    columns: Vec<GridColumn>,
}

impl HeatGrid {
    pub fn new(columns: Vec<GridColumn>) -> Self {
        Self { columns }
    }

    pub fn view(self, height: f32) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(height)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for HeatGrid {
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

        let rows = self.columns.iter().map(GridColumn::row_count).max().unwrap_or(0);
        if self.columns.is_empty() || rows == 0 {
            return vec![frame.into_geometry()];
        }

        let cell_width = bounds.width / self.columns.len() as f32;
        let cell_height = bounds.height / rows as f32;
        let label_size = (cell_height * 0.6).clamp(8.0, 14.0);

        for (i, column) in self.columns.iter().enumerate() {
            let x = i as f32 * cell_width;
            let mut y = 0.0;

            let colored = column.header.iter().chain(column.cells.iter());
            for cell in colored {
                let origin = Point::new(x, y);
                let size = Size::new(cell_width, cell_height);
                frame.fill_rectangle(origin, size, Fill::from(to_color(heat_color(cell.value))));
                frame.stroke(
                    &Path::rectangle(origin, size),
                    Stroke::default().with_color(Color::BLACK),
                );
                if !cell.label.is_empty() {
                    frame.fill_text(Text {
                        content: cell.label.clone(),
                        position: Point::new(x + cell_width / 2.0, y + cell_height / 2.0),
                        color: Color::BLACK,
                        size: label_size.into(),
                        horizontal_alignment: iced::alignment::Horizontal::Center,
                        vertical_alignment: iced::alignment::Vertical::Center,
                        ..Text::default()
                    });
                }
                y += cell_height;
            }

            if let Some(footer) = &column.footer {
                frame.fill_text(Text {
                    content: footer.clone(),
                    position: Point::new(x + cell_width / 2.0, y + cell_height / 2.0),
                    color: theme.palette().text,
                    size: label_size.into(),
                    horizontal_alignment: iced::alignment::Horizontal::Center,
                    vertical_alignment: iced::alignment::Vertical::Center,
                    ..Text::default()
                });
            }
        }

        vec![frame.into_geometry()]
    }
}
