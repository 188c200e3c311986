//! # Tone Analyzer
//!
//! The detection seam of the pipeline: anything that consumes mono
//! blocks and produces a linked [`Moments`] sequence can drive the
//! pitch-track extraction.
//!
//! [`SpectralAnalyzer`] is the reference implementation. Per block it
//! computes a Hann-windowed FFT over a rolling window, turns spectral
//! magnitude peaks into tones (with parabolic interpolation for sub-bin
//! frequency accuracy) and links tones of consecutive moments that lie
//! within a fixed semitone distance of each other.

use crate::fft::FftProcessor;
use crate::moments::{Moment, Moments, Tone, ToneId};
use std::cmp::Ordering;

/// Minimum linear level for a spectral peak to count as a tone (-60 dB).
const MIN_TONE_LEVEL: f32 = 1e-3;
/// Strongest tones kept per moment; weaker peaks beyond this are dropped.
const MAX_TONES_PER_MOMENT: usize = 8;
/// Maximum distance in note-number units for two tones in consecutive
/// moments to be considered the same physical tone.
const LINK_TOLERANCE_NOTES: f32 = 0.5;
/// FFT window length in analysis blocks. A longer window trades time
/// resolution for the frequency resolution low notes need.
const WINDOW_BLOCKS: usize = 4;
/// Lowest frequency accepted as a tone, in Hz.
const MIN_TONE_FREQ: f32 = 20.0;

/// Consumes mono audio blocks and exposes the detected tone structure.
pub trait ToneAnalyzer {
    /// Enqueues one mono block.
    fn input(&mut self, samples: &[f32]);

    /// Runs detection for one enqueued block, appending one moment.
    fn process(&mut self);

    /// The full ordered moment sequence produced so far.
    fn moments(&self) -> &Moments;
}

/// FFT peak tracker implementing [`ToneAnalyzer`].
pub struct SpectralAnalyzer {
    sample_rate: u32,
    step: usize,
    fft: FftProcessor,
    /// Mono samples queued by `input` and not yet analyzed.
    queue: Vec<f32>,
    /// Rolling analysis window over the most recent blocks.
    window: Vec<f32>,
    moments: Moments,
}

impl SpectralAnalyzer {
    pub fn new(sample_rate: u32, step: usize) -> Self {
        let window_len = WINDOW_BLOCKS * step;
        Self {
            sample_rate,
            step,
            fft: FftProcessor::new(window_len),
            queue: Vec::new(),
            window: vec![0.0; window_len],
            moments: Moments::new(),
        }
    }

    /// Picks local magnitude maxima above the level floor and turns them
    /// into unlinked tones, strongest first, capped per moment.
    fn detect_tones(&self, magnitudes: &[f32]) -> Vec<Tone> {
        let window_len = self.window.len() as f32;
        let mut tones: Vec<Tone> = Vec::new();

        for bin in 2..magnitudes.len().saturating_sub(1) {
            if magnitudes[bin] <= magnitudes[bin - 1] || magnitudes[bin] < magnitudes[bin + 1] {
                continue;
            }
            // Hann-windowed sine of amplitude A peaks at about A * N / 4
            let level = 4.0 * magnitudes[bin] / window_len;
            if level < MIN_TONE_LEVEL {
                continue;
            }
            let freq = self.interpolate_peak(magnitudes, bin);
            if !freq.is_finite() || freq < MIN_TONE_FREQ {
                continue;
            }
            tones.push(Tone::new(freq, level));
        }

        tones.sort_by(|a, b| b.level.partial_cmp(&a.level).unwrap_or(Ordering::Equal));
        tones.truncate(MAX_TONES_PER_MOMENT);
        tones.sort_by(|a, b| a.freq.partial_cmp(&b.freq).unwrap_or(Ordering::Equal));
        tones
    }

    /// Refines a peak bin to a frequency using parabolic interpolation
    /// over the log magnitudes of the three bins around it.
    fn interpolate_peak(&self, magnitudes: &[f32], peak_bin: usize) -> f32 {
        let bin_hz = self.sample_rate as f32 / self.window.len() as f32;
        if peak_bin == 0 || peak_bin + 1 >= magnitudes.len() {
            return peak_bin as f32 * bin_hz;
        }

        let y1 = magnitudes[peak_bin - 1].ln();
        let y2 = magnitudes[peak_bin].ln();
        let y3 = magnitudes[peak_bin + 1].ln();
        if !y1.is_finite() || !y2.is_finite() || !y3.is_finite() {
            return peak_bin as f32 * bin_hz;
        }

        let denominator = 2.0 * y2 - y1 - y3;
        if denominator.abs() < 1e-6 {
            return peak_bin as f32 * bin_hz;
        }

        let peak_shift = (y3 - y1) / (2.0 * denominator);
        (peak_bin as f32 + peak_shift) * bin_hz
    }

    /// Links the newest moment's tones to the previous moment's: pairs
    /// are matched greedily by note distance, closest first, one
    /// predecessor and one successor per tone.
    fn link_latest_moment(&mut self) {
        let current = self.moments.len() - 1;
        if current == 0 {
            return;
        }
        let previous = current - 1;

        let mut candidates: Vec<(f32, usize, usize)> = Vec::new();
        for (i, a) in self.moments.moment(previous).tones.iter().enumerate() {
            for (j, b) in self.moments.moment(current).tones.iter().enumerate() {
                let distance = 12.0 * (b.freq / a.freq).log2().abs();
                if distance <= LINK_TOLERANCE_NOTES {
                    candidates.push((distance, i, j));
                }
            }
        }
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut previous_taken = vec![false; self.moments.moment(previous).tones.len()];
        let mut current_taken = vec![false; self.moments.moment(current).tones.len()];
        for (_, i, j) in candidates {
            if previous_taken[i] || current_taken[j] {
                continue;
            }
            previous_taken[i] = true;
            current_taken[j] = true;
            self.moments.link(
                ToneId { moment: previous, tone: i },
                ToneId { moment: current, tone: j },
            );
        }
    }
}

impl ToneAnalyzer for SpectralAnalyzer {
    fn input(&mut self, samples: &[f32]) {
        self.queue.extend_from_slice(samples);
    }

    fn process(&mut self) {
        if self.queue.len() < self.step {
            return;
        }
        let block: Vec<f32> = self.queue.drain(..self.step).collect();
        self.window.drain(..self.step);
        self.window.extend_from_slice(&block);

        let magnitudes = self.fft.magnitudes(&self.window);
        let time = self.moments.len() as f32 * self.step as f32 / self.sample_rate as f32;
        let tones = self.detect_tones(&magnitudes);

        self.moments.push(Moment { time, tones });
        self.link_latest_moment();
    }

    fn moments(&self) -> &Moments {
        &self.moments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::chain_from;

    fn feed_sine(analyzer: &mut SpectralAnalyzer, freq: f32, amplitude: f32, blocks: usize) {
        let rate = analyzer.sample_rate as f32;
        let step = analyzer.step;
        let mut phase = 0.0_f32;
        let delta = 2.0 * std::f32::consts::PI * freq / rate;
        for _ in 0..blocks {
            let block: Vec<f32> = (0..step)
                .map(|_| {
                    let sample = phase.sin() * amplitude;
                    phase += delta;
                    sample
                })
                .collect();
            analyzer.input(&block);
            analyzer.process();
        }
    }

    #[test]
    fn tracks_a_steady_sine() {
        let mut analyzer = SpectralAnalyzer::new(44100, 1024);
        feed_sine(&mut analyzer, 440.0, 0.5, 12);

        let moments = analyzer.moments();
        assert_eq!(moments.len(), 12);

        // the strongest tone of the last moment sits near 440 Hz
        let last = moments.moment(11);
        let (index, tone) = last
            .tones
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.level.partial_cmp(&b.1.level).unwrap())
            .expect("a tone was detected");
        assert!(
            (tone.freq - 440.0).abs() < 5.0,
            "detected {} Hz instead of 440",
            tone.freq
        );

        // and it continues backwards through earlier moments as one chain
        assert!(tone.prev.is_some());
        let mut id = ToneId { moment: 11, tone: index };
        while let Some(prev) = moments.tone(id).prev {
            id = prev;
        }
        let chain = chain_from(moments, id);
        assert!(chain.len() >= 8, "chain only spans {} moments", chain.len());
    }

    #[test]
    fn silence_produces_empty_moments() {
        let mut analyzer = SpectralAnalyzer::new(44100, 1024);
        let block = vec![0.0_f32; 1024];
        for _ in 0..4 {
            analyzer.input(&block);
            analyzer.process();
        }

        let moments = analyzer.moments();
        assert_eq!(moments.len(), 4);
        assert!(moments.iter().all(|m| m.tones.is_empty()));
    }

    #[test]
    fn moment_timestamps_advance_by_one_block() {
        let mut analyzer = SpectralAnalyzer::new(44100, 1024);
        feed_sine(&mut analyzer, 220.0, 0.3, 5);

        let moments = analyzer.moments();
        let step_seconds = 1024.0 / 44100.0;
        for i in 1..moments.len() {
            let delta = moments.moment(i).time - moments.moment(i - 1).time;
            assert!((delta - step_seconds).abs() < 1e-6);
        }
    }
}
