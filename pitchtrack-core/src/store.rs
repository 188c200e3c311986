//! # Result Store
//!
//! The single piece of state shared between the analysis thread and its
//! consumers: completed pitch paths, progress counters and the
//! cancellation flag, all behind one mutex. Readers get a cloned
//! snapshot, so a path is either invisible or complete — never partial.

use crate::PitchPath;
use std::sync::{Mutex, MutexGuard};

/// A consistent view of the analysis results at one instant.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// All paths completed so far, in chronological order of their
    /// starting moment.
    pub paths: Vec<PitchPath>,
    /// True once new data (or completion) has been published.
    pub more_available: bool,
    /// Index of the moment currently being processed; equals the canvas
    /// width once the run has completed.
    pub cursor: usize,
}

#[derive(Debug, Default)]
struct StoreInner {
    paths: Vec<PitchPath>,
    more_available: bool,
    cursor: usize,
    width: usize,
    cancelled: bool,
}

/// Mutex-guarded shared state for one analysis run.
///
/// Mutators are only ever called from the analysis thread; readers may
/// poll from any thread.
#[derive(Debug, Default)]
pub struct TrackStore {
    inner: Mutex<StoreInner>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clones the current results under the lock.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        Snapshot {
            paths: inner.paths.clone(),
            more_available: inner.more_available,
            cursor: inner.cursor,
        }
    }

    /// Current canvas width in pixels.
    pub fn width(&self) -> usize {
        self.lock().width
    }

    pub fn set_width(&self, width: usize) {
        self.lock().width = width;
    }

    /// Publishes one completed path and flags new data.
    pub fn append(&self, path: PitchPath) {
        let mut inner = self.lock();
        inner.paths.push(path);
        inner.more_available = true;
    }

    pub fn set_progress(&self, cursor: usize) {
        self.lock().cursor = cursor;
    }

    /// Marks the run finished: flags data available and pushes the
    /// cursor to the full canvas width.
    pub fn mark_complete(&self) {
        let mut inner = self.lock();
        inner.more_available = true;
        inner.cursor = inner.width;
    }

    /// Requests termination; the analysis thread honors it within one
    /// block of work.
    pub fn cancel(&self) {
        self.lock().cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // paths are appended whole, so the data behind a poisoned lock
        // is still structurally consistent
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
