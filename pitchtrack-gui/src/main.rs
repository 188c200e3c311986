//! # Pitch Track Viewer
//!
//! Opens the audio file named on the command line, runs the background
//! pitch analysis and draws the detected tone tracks as they arrive.
//!
//! ## Architecture
//! - **Main Thread**: Iced application polling the result store on a timer
//! - **Analysis Thread**: spawned by pitchtrack-core, owns decode and detection
//! - **Shared State**: the mutex-guarded track store, read via snapshots

mod ui;

use iced::{Element, Subscription, Theme};
use pitchtrack_core::config::AnalysisConfig;
use pitchtrack_core::driver::PitchTrack;
use pitchtrack_core::pixels::PixelMapper;
use pitchtrack_core::scale::MusicalScale;
use pitchtrack_core::store::Snapshot;
use std::path::PathBuf;

/// Snapshot poll interval (roughly 30 FPS).
const TICK_MS: u64 = 33;

pub fn main() -> iced::Result {
    env_logger::init();
    iced::application("Pitch Track", ViewerApp::update, ViewerApp::view)
        .subscription(ViewerApp::subscription)
        .theme(ViewerApp::theme)
        .run()
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    /// Timer tick: poll the store for fresh results.
    Tick,
    /// Stop the running analysis, keeping what was found so far.
    CancelAnalysis,
}

/// Main application state for the viewer.
pub struct ViewerApp {
    /// Handle to the background analysis run, if a file was given.
    track: Option<PitchTrack>,
    config: AnalysisConfig,
    mapper: PixelMapper,
    scale: MusicalScale,
    /// Last snapshot taken from the store.
    snapshot: Snapshot,
    /// Canvas width reported by the run, in pixels.
    width: usize,
    file_name: String,
}

impl Default for ViewerApp {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        let mapper = PixelMapper::new(&config);

        let (track, file_name) = match std::env::args().nth(1).map(PathBuf::from) {
            Some(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                log::info!("analyzing {}", path.display());
                (Some(PitchTrack::start(path, config.clone())), name)
            }
            None => {
                log::error!("usage: pitchtrack-gui <audio-file>");
                (None, String::from("no file given"))
            }
        };

        Self {
            track,
            config,
            mapper,
            scale: MusicalScale::default(),
            snapshot: Snapshot::default(),
            width: 0,
            file_name,
        }
    }
}

impl ViewerApp {
    fn update(&mut self, message: Message) {
        match message {
            Message::Tick => {
                if let Some(track) = &self.track {
                    self.width = track.width();
                    let snapshot = track.snapshot();
                    if snapshot.more_available || snapshot.cursor != self.snapshot.cursor {
                        self.snapshot = snapshot;
                    }
                }
            }
            Message::CancelAnalysis => {
                if let Some(track) = &self.track {
                    log::info!("cancel requested");
                    track.cancel();
                }
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        ui::viewer_view(self)
    }

    /// Timer subscription driving the snapshot polling.
    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(std::time::Duration::from_millis(TICK_MS)).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl ViewerApp {
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn mapper(&self) -> &PixelMapper {
        &self.mapper
    }

    pub fn scale(&self) -> &MusicalScale {
        &self.scale
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Fraction of the run finished, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.width == 0 {
            return 0.0;
        }
        (self.snapshot.cursor as f32 / self.width as f32).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.track.as_ref().is_none_or(|t| t.is_finished())
    }
}
