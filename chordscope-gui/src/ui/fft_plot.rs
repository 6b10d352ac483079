//! # FFT Plot Widget
//!
//! Draws the engine's raw spectrum as a single polyline. Points arrive in the
//! 200×50 view box with y pointing up and are stretched to the canvas here.

use iced::widget::canvas::{self, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{Element, Point, Rectangle, Renderer, Theme, mouse};

use chordscope_core::display::{FFT_VIEW_HEIGHT, FFT_VIEW_WIDTH};

pub struct FftPlot {
    /// Polyline vertices in view-box coordinates
    points: Vec<(f32, f32)>,
}

impl FftPlot {
    pub fn new(points: Vec<(f32, f32)>) -> Self {
        Self { points }
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

impl<Message> canvas::Program<Message> for FftPlot {
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

        if !bounds.width.is_finite() || !bounds.height.is_finite() || self.points.len() < 2 {
            return vec![frame.into_geometry()];
        }

        let scale_x = bounds.width / FFT_VIEW_WIDTH;
        let scale_y = bounds.height / FFT_VIEW_HEIGHT;
        let to_canvas = |(x, y): (f32, f32)| Point::new(x * scale_x, bounds.height - y * scale_y);

        let trace = Path::new(|builder| {
            let mut points = self.points.iter().copied().map(to_canvas);
            if let Some(first) = points.next() {
                builder.move_to(first);
                for point in points {
                    builder.line_to(point);
                }
            }
        });
        frame.stroke(
            &trace,
            Stroke::default()
                .with_width(1.0)
                .with_color(theme.palette().text),
        );

        vec![frame.into_geometry()]
    }
}
