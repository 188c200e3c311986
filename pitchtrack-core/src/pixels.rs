//! # Pixel Mapping
//!
//! Pure conversions between analysis units (seconds, note numbers,
//! frequency) and the renderer's pixel space. Built once per run from
//! the configuration; holds nothing but the scale constants.

use crate::config::AnalysisConfig;
use crate::scale::MusicalScale;

/// Maps domain values into an unsigned pixel coordinate space. Outputs
/// are not clamped to the canvas; clipping is the renderer's concern.
#[derive(Debug, Clone, Copy)]
pub struct PixelMapper {
    canvas_height: f32,
    note_pixel_height: f32,
    pixels_per_second: f32,
}

impl PixelMapper {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            canvas_height: config.canvas_height,
            note_pixel_height: config.note_pixel_height,
            pixels_per_second: config.pixels_per_second(),
        }
    }

    /// Vertical pixel for a continuous note number; higher notes map to
    /// smaller y values.
    pub fn note_to_y(&self, note: f32) -> u32 {
        (self.canvas_height - (note * self.note_pixel_height).round()) as u32
    }

    /// Continuous note number at a vertical pixel.
    pub fn y_to_note(&self, y: u32) -> f32 {
        (self.canvas_height - y as f32) / self.note_pixel_height
    }

    /// Horizontal pixel for a timestamp in seconds.
    pub fn time_to_x(&self, time: f32) -> u32 {
        (time * self.pixels_per_second) as u32
    }

    /// Timestamp in seconds at a horizontal pixel.
    pub fn x_to_time(&self, x: u32) -> f32 {
        x as f32 / self.pixels_per_second
    }

    /// Vertical pixel for a frequency, via the musical scale.
    pub fn freq_to_y(&self, freq: f32, scale: &MusicalScale) -> u32 {
        self.note_to_y(scale.note_from_freq(freq))
    }

    pub fn pixels_per_second(&self) -> f32 {
        self.pixels_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> PixelMapper {
        PixelMapper::new(&AnalysisConfig::default())
    }

    #[test]
    fn note_round_trip_within_rounding_tolerance() {
        let mapper = mapper();
        // rounding to whole pixels costs at most half a pixel
        let tolerance = 0.5 / 16.0 + 1e-4;
        let mut note = 1.0_f32;
        while note < 127.0 {
            let back = mapper.y_to_note(mapper.note_to_y(note));
            assert!(
                (back - note).abs() <= tolerance,
                "note {note} round-tripped to {back}"
            );
            note += 0.37;
        }
    }

    #[test]
    fn higher_notes_sit_higher_on_screen() {
        let mapper = mapper();
        assert!(mapper.note_to_y(40.0) < mapper.note_to_y(20.0));
        assert_eq!(mapper.note_to_y(0.0), 2048);
        // A4 sits comfortably inside the canvas
        assert_eq!(mapper.note_to_y(69.0), 2048 - 69 * 16);
    }

    #[test]
    fn time_round_trip_within_one_pixel() {
        let mapper = mapper();
        let tolerance = 1.0 / mapper.pixels_per_second() + 1e-6;
        for time in [0.0_f32, 0.5, 1.25, 30.0, 181.5] {
            let back = mapper.x_to_time(mapper.time_to_x(time));
            assert!(
                (back - time).abs() <= tolerance,
                "time {time} round-tripped to {back}"
            );
        }
    }

    #[test]
    fn frequency_goes_through_the_scale() {
        let mapper = mapper();
        let scale = MusicalScale::default();
        assert_eq!(
            mapper.freq_to_y(440.0, &scale),
            mapper.note_to_y(69.0)
        );
    }
}
