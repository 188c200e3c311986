//! # Musical Scale
//!
//! Conversions between frequency, continuous note numbers and display
//! names, plus the level-to-decibel transform used when assembling
//! pitch paths. Note numbers follow the MIDI convention: A4 at the
//! scale's base frequency maps to 69.0, one unit per semitone.

use once_cell::sync::Lazy;

/// Names of the twelve chromatic notes, starting at C.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Statically computed display labels for note numbers 0..=127
/// ("C-1" through "G9"), built once at first use.
static NOTE_LABELS: Lazy<Vec<String>> = Lazy::new(|| {
    (0..128)
        .map(|n: i32| {
            let octave = n / 12 - 1;
            format!("{}{}", NOTE_NAMES[(n % 12) as usize], octave)
        })
        .collect()
});

/// Converts a linear tone magnitude to a decibel value.
///
/// Monotonic in `level`; a full-scale level of 1.0 maps to 0 dB.
pub fn level_to_db(level: f32) -> f32 {
    20.0 * level.log10()
}

/// Maps frequencies to continuous note numbers and back.
#[derive(Debug, Clone, Copy)]
pub struct MusicalScale {
    /// Frequency of A4 in Hz.
    pub base_freq: f32,
}

impl Default for MusicalScale {
    fn default() -> Self {
        Self { base_freq: 440.0 }
    }
}

impl MusicalScale {
    pub fn new(base_freq: f32) -> Self {
        Self { base_freq }
    }

    /// Continuous note number for a frequency (A4 = `base_freq` = 69.0).
    pub fn note_from_freq(&self, freq: f32) -> f32 {
        69.0 + 12.0 * (freq / self.base_freq).log2()
    }

    /// Frequency in Hz for a continuous note number.
    pub fn freq_from_note(&self, note: f32) -> f32 {
        self.base_freq * 2.0_f32.powf((note - 69.0) / 12.0)
    }

    /// Display name of the chromatic note nearest to `note`.
    pub fn note_label(&self, note: f32) -> &'static str {
        let index = (note.round() as i64).clamp(0, 127) as usize;
        NOTE_LABELS[index].as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concert_pitch_is_note_69() {
        let scale = MusicalScale::default();
        assert!((scale.note_from_freq(440.0) - 69.0).abs() < 1e-5);
        // one octave up is twelve note units up
        assert!((scale.note_from_freq(880.0) - 81.0).abs() < 1e-5);
    }

    #[test]
    fn note_frequency_round_trip() {
        let scale = MusicalScale::default();
        for note in [21.0, 45.5, 60.0, 69.0, 100.25] {
            let back = scale.note_from_freq(scale.freq_from_note(note));
            assert!((back - note).abs() < 1e-4, "note {note} round-tripped to {back}");
        }
    }

    #[test]
    fn note_labels() {
        let scale = MusicalScale::default();
        assert_eq!(scale.note_label(69.0), "A4");
        assert_eq!(scale.note_label(60.2), "C4");
        assert_eq!(scale.note_label(-3.0), "C-1");
    }

    #[test]
    fn level_to_db_is_monotonic() {
        assert!((level_to_db(1.0)).abs() < 1e-6);
        assert!(level_to_db(0.5) < 0.0);
        assert!(level_to_db(0.1) < level_to_db(0.2));
        assert!((level_to_db(0.1) + 20.0).abs() < 1e-4);
    }
}
