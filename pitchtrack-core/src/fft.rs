//! # Fast Fourier Transform (FFT) Module
//!
//! Frequency-domain processing for the spectral analyzer: DC offset
//! removal, Hann windowing and magnitude spectrum calculation. The
//! forward plan is built once per processor and reused for every block.

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Removes the DC offset from a signal by making its average value zero.
///
/// A DC component shows up as a large bin at 0 Hz and smears into the
/// low end of the spectrum; centering the signal avoids that.
fn remove_dc_offset(signal: &mut [f32]) {
    let len = signal.len();
    if len == 0 {
        return;
    }
    let avg = signal.iter().sum::<f32>() / len as f32;
    if avg.abs() > 1e-6 {
        for sample in signal.iter_mut() {
            *sample -= avg;
        }
    }
}

/// Applies a Hann window to the buffer to reduce spectral leakage.
fn apply_hann_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n == 0 {
        return;
    }
    let n_minus_1 = (n - 1) as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let multiplier = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos());
        *sample *= multiplier;
    }
}

/// Forward FFT with a plan built once for a fixed window length.
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    size: usize,
}

impl FftProcessor {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(size),
            size,
        }
    }

    /// Window length this processor was planned for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Magnitude spectrum of one block: DC removal, Hann window, forward
    /// FFT, then the first `size / 2` bin magnitudes (everything up to
    /// the Nyquist frequency).
    ///
    /// `signal` must be exactly `size` samples long.
    pub fn magnitudes(&self, signal: &[f32]) -> Vec<f32> {
        debug_assert_eq!(signal.len(), self.size);

        let mut processed = signal.to_vec();
        remove_dc_offset(&mut processed);
        apply_hann_window(&mut processed);

        let mut buffer: Vec<Complex<f32>> = processed
            .into_iter()
            .map(|sample| Complex { re: sample, im: 0.0 })
            .collect();
        self.fft.process(&mut buffer);

        buffer.iter().take(self.size / 2).map(|c| c.norm()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_peaks_at_its_bin() {
        let size = 1024;
        let rate = 44100.0;
        let freq = rate / size as f32 * 64.0; // exactly bin 64
        let signal: Vec<f32> = (0..size)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate).sin())
            .collect();

        let processor = FftProcessor::new(size);
        let magnitudes = processor.magnitudes(&signal);
        assert_eq!(magnitudes.len(), size / 2);

        let peak_bin = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_bin, 64);
    }

    #[test]
    fn dc_signal_has_no_low_bin_energy() {
        let size = 512;
        let signal = vec![0.75_f32; size];
        let processor = FftProcessor::new(size);
        let magnitudes = processor.magnitudes(&signal);
        // a constant input is removed entirely by the DC correction
        assert!(magnitudes.iter().all(|&m| m < 1e-2));
    }
}
