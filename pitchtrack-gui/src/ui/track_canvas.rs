//! # Track Canvas
//!
//! Canvas widget stroking the detected pitch paths: one polyline per
//! path, each edge colored green with a saturation that follows the
//! tone's loudness. Octave labels along the left edge give the vertical
//! axis its meaning.

use iced::widget::canvas::{self, Geometry, LineCap, Path, Stroke, stroke};
use iced::widget::container;
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Theme, mouse};

use pitchtrack_core::pixels::PixelMapper;
use pitchtrack_core::render::{Segment, path_segments};
use pitchtrack_core::scale::MusicalScale;
use pitchtrack_core::store::Snapshot;

/// Pen width in pixels, matching the chunky look of the pitch graph.
const PEN_WIDTH: f32 = 8.0;

/// Canvas program holding the precomputed segment geometry of one
/// snapshot.
pub struct TrackCanvas {
    segments: Vec<Segment>,
    mapper: PixelMapper,
    scale: MusicalScale,
    width: f32,
    height: f32,
}

impl TrackCanvas {
    pub fn new(
        snapshot: &Snapshot,
        mapper: &PixelMapper,
        scale: &MusicalScale,
        width: f32,
        height: f32,
    ) -> Self {
        let segments = snapshot
            .paths
            .iter()
            .flat_map(|path| path_segments(path, mapper))
            .collect();
        Self {
            segments,
            mapper: *mapper,
            scale: *scale,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        let (width, height) = (self.width, self.height);
        container(
            canvas::Canvas::new(self)
                .width(Length::Fixed(width))
                .height(Length::Fixed(height)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for TrackCanvas {
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

        if !bounds.width.is_finite() || !bounds.height.is_finite() {
            return vec![frame.into_geometry()];
        }

        // octave markers: every C note that falls inside the canvas
        for octave in 0..10 {
            let note = octave as f32 * 12.0;
            let y = self.mapper.note_to_y(note);
            if y == 0 || y as f32 >= self.height {
                continue;
            }
            frame.fill_text(canvas::Text {
                content: self.scale.note_label(note).to_string(),
                position: Point::new(4.0, y as f32),
                color: Color::from_rgb8(0x60, 0x60, 0x60),
                size: 12.0.into(),
                ..canvas::Text::default()
            });
        }

        for segment in &self.segments {
            let line = Path::line(
                Point::new(segment.x0 as f32, segment.y0 as f32),
                Point::new(segment.x1 as f32, segment.y1 as f32),
            );
            let color = Color::from_rgb8(32, segment.saturation, 32);
            frame.stroke(
                &line,
                Stroke {
                    style: stroke::Style::Solid(color),
                    width: PEN_WIDTH,
                    line_cap: LineCap::Round,
                    ..Stroke::default()
                },
            );
        }

        vec![frame.into_geometry()]
    }
}
