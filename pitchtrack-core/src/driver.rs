//! # Analysis Driver
//!
//! Owns one background analysis run: the decode loop, the tone-chain
//! extraction pass and completion signaling. The worker never lets a
//! failure cross the thread boundary; errors become one diagnostic
//! message and the run still completes, so pollers are never left
//! waiting.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Result;

use crate::analyzer::{SpectralAnalyzer, ToneAnalyzer};
use crate::config::AnalysisConfig;
use crate::decode::{AudioDecoder, FileDecoder};
use crate::moments::ToneId;
use crate::scale::MusicalScale;
use crate::store::{Snapshot, TrackStore};
use crate::track::{assemble_path, chain_from};

/// Receiver for human-readable failure reports from the analysis thread.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Default sink: forwards reports to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, message: &str) {
        log::error!("{message}");
    }
}

/// Handle to one background pitch-track analysis run.
///
/// Dropping the handle cancels the run and joins the worker thread.
pub struct PitchTrack {
    store: Arc<TrackStore>,
    worker: Option<JoinHandle<()>>,
}

impl PitchTrack {
    /// Starts analyzing `path` on a dedicated background thread and
    /// returns immediately. Results accumulate in the store and can be
    /// observed through [`PitchTrack::snapshot`] while the run
    /// proceeds.
    pub fn start(path: PathBuf, config: AnalysisConfig) -> Self {
        let store = Arc::new(TrackStore::new());
        let worker_store = store.clone();
        let worker = thread::Builder::new()
            .name("pitch-analysis".to_string())
            .spawn(move || {
                let scale = MusicalScale::default();
                let analyzer = SpectralAnalyzer::new(config.sample_rate, config.block_step);
                let decoder = FileDecoder::open(&path, config.sample_rate);
                run_analysis(decoder, analyzer, &scale, &config, &worker_store, &LogSink);
            })
            .expect("failed to spawn analysis thread");
        log::info!("analysis thread started");

        Self {
            store,
            worker: Some(worker),
        }
    }

    /// A consistent view of the results so far.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Current canvas width in pixels.
    pub fn width(&self) -> usize {
        self.store.width()
    }

    /// Requests early termination; partial results stay available.
    pub fn cancel(&self) {
        self.store.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(|w| w.is_finished())
    }

    /// The shared store, for embedders that poll from another thread.
    pub fn store(&self) -> Arc<TrackStore> {
        self.store.clone()
    }
}

impl Drop for PitchTrack {
    fn drop(&mut self) {
        self.store.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Runs one complete analysis against the given collaborators.
///
/// The decoder is passed as a `Result` so that open failures flow
/// through the same reporting path as mid-run errors. Whatever happens,
/// the store is marked complete on return.
pub fn run_analysis<D, A>(
    decoder: Result<D>,
    mut analyzer: A,
    scale: &MusicalScale,
    config: &AnalysisConfig,
    store: &TrackStore,
    sink: &dyn DiagnosticSink,
) where
    D: AudioDecoder,
    A: ToneAnalyzer,
{
    if let Err(err) = try_run(decoder, &mut analyzer, scale, config, store) {
        sink.report(&format!("Error loading audio: {err:#}"));
    }
    store.mark_complete();
    log::debug!("analysis run finished");
}

fn try_run<D, A>(
    decoder: Result<D>,
    analyzer: &mut A,
    scale: &MusicalScale,
    config: &AnalysisConfig,
    store: &TrackStore,
) -> Result<()>
where
    D: AudioDecoder,
    A: ToneAnalyzer,
{
    let mut decoder = decoder?;
    let step = config.block_step;

    // provisional width from the duration estimate; replaced by the
    // actual moment count once decoding is done
    let estimated = (config.pixels_per_second() * decoder.duration()) as usize;
    store.set_width(estimated);
    store.set_progress(0);

    let mut block = vec![0.0_f32; step * 2];
    let mut cursor = 0_usize;
    while decoder.fill(&mut block, cursor * step * 2) {
        // mix interleaved stereo down to mono in place
        for i in 0..step {
            block[i] = 0.5 * (block[2 * i] + block[2 * i + 1]);
        }
        analyzer.input(&block[..step]);
        analyzer.process();
        cursor += 1;
        store.set_progress(cursor);
        if store.is_cancelled() {
            log::info!("analysis cancelled after {cursor} blocks");
            return Ok(());
        }
    }

    let moments = analyzer.moments();
    let width = config.pix_scale as usize * moments.len();
    store.set_width(width);
    log::debug!("extracting tone chains from {} moments", moments.len());

    for index in 0..moments.len().min(width) {
        for tone_index in 0..moments.moment(index).tones.len() {
            let id = ToneId {
                moment: index,
                tone: tone_index,
            };
            if moments.tone(id).prev.is_some() {
                continue; // the tone does not begin at this moment
            }
            let chain = chain_from(moments, id);
            if let Some(path) = assemble_path(moments, &chain, scale, config.min_path_len) {
                store.append(path);
            }
        }
        store.set_progress(index + 1);
        if store.is_cancelled() {
            log::info!("analysis cancelled during extraction at moment {index}");
            return Ok(());
        }
    }

    Ok(())
}
