//! # Analysis Configuration
//!
//! Tunable parameters for one pitch-track analysis run. The defaults
//! reproduce the visual scale the renderer was designed around; a
//! configuration can be persisted to and restored from a JSON profile.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Decoder output sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per analysis block; each block produces one moment.
    pub block_step: usize,
    /// Horizontal pixels drawn per analysis block.
    pub pix_scale: u32,
    /// Vertical pixels per note-number unit.
    pub note_pixel_height: f32,
    /// Canvas height in pixels; the default spans the full 128-note
    /// range at the default vertical scale.
    pub canvas_height: f32,
    /// Minimum fragments a tone chain needs to be kept. Shorter chains
    /// are discarded as spurious detections.
    pub min_path_len: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_step: 1024,
            pix_scale: 8,
            note_pixel_height: 16.0,
            canvas_height: 2048.0,
            min_path_len: 5,
        }
    }
}

impl AnalysisConfig {
    /// Seconds of audio covered by one analysis block.
    pub fn block_seconds(&self) -> f32 {
        self.block_step as f32 / self.sample_rate as f32
    }

    /// Horizontal pixels per second of audio.
    pub fn pixels_per_second(&self) -> f32 {
        self.pix_scale as f32 * self.sample_rate as f32 / self.block_step as f32
    }

    /// Loads a configuration profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config profile {}", path.display()))?;
        serde_json::from_str(&data).context("invalid config profile")
    }

    /// Saves this configuration as a JSON profile.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write config profile {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pixel_density() {
        let config = AnalysisConfig::default();
        // 8 px per 1024-sample block at 44100 Hz
        assert!((config.pixels_per_second() - 344.53125).abs() < 1e-3);
        assert!((config.block_seconds() - 0.02322).abs() < 1e-4);
    }

    #[test]
    fn json_round_trip() {
        let config = AnalysisConfig {
            min_path_len: 7,
            ..AnalysisConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.min_path_len, 7);
        assert_eq!(back.sample_rate, config.sample_rate);
    }
}
