//! # Audio Decoding
//!
//! The decoder seam of the pipeline and its file-backed implementation.
//! [`FileDecoder`] probes and decodes the whole file up front through
//! symphonia, converting every sample format and channel layout to
//! interleaved stereo f32 at the requested rate; [`AudioDecoder::fill`]
//! then serves fixed-size blocks from that buffer.

use anyhow::{Context, Result, anyhow};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::IntoSample;
use symphonia::core::errors::Error;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Pull-based source of interleaved stereo samples.
pub trait AudioDecoder {
    /// Estimated duration of the stream in seconds.
    fn duration(&self) -> f32;

    /// Fills `buffer` with interleaved stereo samples starting at
    /// `offset_samples` (an interleaved sample offset, two per frame).
    /// Returns `false` on a short read at end of stream; whatever
    /// samples remain are copied and the rest of the buffer is zeroed.
    fn fill(&mut self, buffer: &mut [f32], offset_samples: usize) -> bool;
}

/// Whole-file decoder backed by symphonia.
pub struct FileDecoder {
    /// Interleaved stereo samples at `sample_rate`.
    samples: Vec<f32>,
    sample_rate: u32,
}

impl FileDecoder {
    /// Opens `path` and decodes it completely, converting to interleaved
    /// stereo f32 at `sample_rate`.
    pub fn open(path: &Path, sample_rate: u32) -> Result<Self> {
        let src = File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mss = MediaSourceStream::new(Box::new(src), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .context("unsupported container format")?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| anyhow!("no supported audio track"))?;
        let track_id = track.id;
        let native_rate = track.codec_params.sample_rate.unwrap_or(sample_rate);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .context("unsupported codec")?;

        let mut stereo: Vec<f32> = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(err) => return Err(err).context("error reading packet"),
            };
            if packet.track_id() != track_id {
                continue;
            }
            match decoder.decode(&packet) {
                Ok(decoded) => append_stereo(&decoded, &mut stereo),
                // Recoverable per-packet problems: skip the packet.
                Err(Error::IoError(_)) | Err(Error::DecodeError(_)) => continue,
                Err(err) => return Err(err).context("error decoding packet"),
            }
        }

        let samples = if native_rate == sample_rate {
            stereo
        } else {
            resample_stereo(&stereo, native_rate, sample_rate)
        };
        log::debug!(
            "decoded {} frames at {} Hz",
            samples.len() / 2,
            sample_rate
        );

        Ok(Self { samples, sample_rate })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioDecoder for FileDecoder {
    fn duration(&self) -> f32 {
        (self.samples.len() / 2) as f32 / self.sample_rate as f32
    }

    fn fill(&mut self, buffer: &mut [f32], offset_samples: usize) -> bool {
        let end = offset_samples + buffer.len();
        if end <= self.samples.len() {
            buffer.copy_from_slice(&self.samples[offset_samples..end]);
            return true;
        }
        let available = self.samples.len().saturating_sub(offset_samples);
        buffer[..available].copy_from_slice(&self.samples[offset_samples..]);
        buffer[available..].fill(0.0);
        false
    }
}

/// Appends one decoded buffer as interleaved stereo.
fn append_stereo(decoded: &AudioBufferRef<'_>, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => push_stereo(buf.as_ref(), out),
        AudioBufferRef::U16(buf) => push_stereo(buf.as_ref(), out),
        AudioBufferRef::U24(buf) => push_stereo(buf.as_ref(), out),
        AudioBufferRef::U32(buf) => push_stereo(buf.as_ref(), out),
        AudioBufferRef::S8(buf) => push_stereo(buf.as_ref(), out),
        AudioBufferRef::S16(buf) => push_stereo(buf.as_ref(), out),
        AudioBufferRef::S24(buf) => push_stereo(buf.as_ref(), out),
        AudioBufferRef::S32(buf) => push_stereo(buf.as_ref(), out),
        AudioBufferRef::F32(buf) => push_stereo(buf.as_ref(), out),
        AudioBufferRef::F64(buf) => push_stereo(buf.as_ref(), out),
    }
}

/// Converts one typed buffer to stereo f32: mono is duplicated into both
/// channels, the first two channels of wider layouts are kept.
fn push_stereo<S>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
where
    S: Sample + IntoSample<f32> + Copy,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    match channels {
        0 => {}
        1 => {
            for i in 0..frames {
                let sample: f32 = buf.chan(0)[i].into_sample();
                out.push(sample);
                out.push(sample);
            }
        }
        _ => {
            for i in 0..frames {
                let left: f32 = buf.chan(0)[i].into_sample();
                let right: f32 = buf.chan(1)[i].into_sample();
                out.push(left);
                out.push(right);
            }
        }
    }
}

/// Linear-interpolation resampler for interleaved stereo.
fn resample_stereo(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    let in_frames = input.len() / 2;
    if in_frames == 0 || from_rate == to_rate {
        return input.to_vec();
    }

    let out_frames = (in_frames as u64 * to_rate as u64 / from_rate as u64) as usize;
    let ratio = from_rate as f64 / to_rate as f64;
    let mut out = Vec::with_capacity(out_frames * 2);
    for frame in 0..out_frames {
        let pos = frame as f64 * ratio;
        let base = (pos as usize).min(in_frames - 1);
        let next = (base + 1).min(in_frames - 1);
        let frac = (pos - base as f64) as f32;
        for ch in 0..2 {
            let a = input[base * 2 + ch];
            let b = input[next * 2 + ch];
            out.push(a + (b - a) * frac);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_file_fails() {
        let result = FileDecoder::open(Path::new("/no/such/file.ogg"), 44100);
        assert!(result.is_err());
    }

    #[test]
    fn fill_reports_short_read_at_end() {
        let mut decoder = FileDecoder {
            samples: (0..10).map(|i| i as f32).collect(),
            sample_rate: 44100,
        };

        let mut buffer = vec![0.0_f32; 8];
        assert!(decoder.fill(&mut buffer, 0));
        assert_eq!(buffer[0], 0.0);
        assert_eq!(buffer[7], 7.0);

        // only two samples left past offset 8
        assert!(!decoder.fill(&mut buffer, 8));
        assert_eq!(buffer[0], 8.0);
        assert_eq!(buffer[1], 9.0);
        assert!(buffer[2..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn resampling_halves_the_frame_count() {
        // one second of a ramp at 8 kHz, downsampled to 4 kHz
        let input: Vec<f32> = (0..8000).flat_map(|i| [i as f32, i as f32]).collect();
        let out = resample_stereo(&input, 8000, 4000);
        assert_eq!(out.len() / 2, 4000);
        // every second frame survives, interpolation keeps the ramp
        assert!((out[2] - 2.0).abs() < 1e-3);
        assert!((out[200] - 200.0).abs() < 1e-3);
    }
}
