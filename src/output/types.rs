//! Output-side types shared between the controller and the rodio thread.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::OutputError;

/// Asynchronous notifications from the output resource.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// The source finished loading; carries its length when known.
    Loaded { duration: Option<f64> },
    /// The playback clock moved.
    TimeUpdate,
    /// The source played to its end.
    Ended,
    /// Loading or playing failed.
    Error(OutputError),
}

/// A single audio-output capability addressable by locator.
///
/// Commands return immediately; their audible effect is eventually consistent
/// and failures that happen later arrive as [`OutputEvent::Error`].
/// `poll_event` never yields events that belong to a superseded `load`.
pub trait AudioOutput {
    /// Point the output at a new source. Supersedes any previous load.
    fn load(&mut self, locator: &str) -> Result<(), OutputError>;
    fn play(&mut self) -> Result<(), OutputError>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64) -> Result<(), OutputError>;
    fn set_volume(&mut self, volume: f32);
    /// Drop the current source entirely.
    fn unload(&mut self);
    /// Live playback position in seconds.
    fn current_time(&self) -> f64;
    /// Length of the loaded source in seconds, once known.
    fn duration(&self) -> Option<f64>;
    fn poll_event(&mut self) -> Option<OutputEvent>;
}

#[derive(Debug)]
pub(super) enum OutputCmd {
    /// Replace the current source; the tag identifies events that belong to it.
    Load { path: PathBuf, generation: u64 },
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    Unload,
    /// Quit the output thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Playback clock published by the output thread.
///
/// The thread only publishes on state changes and ticks; readers extrapolate
/// from `since` so the position moves at whatever rate it is polled.
#[derive(Debug, Clone, Default)]
pub(super) struct OutputClock {
    /// Position at `since`, or the frozen position while paused.
    pub position: Duration,
    /// When playback last resumed; `None` while paused or stopped.
    pub since: Option<Instant>,
    pub duration: Option<Duration>,
}

impl OutputClock {
    /// Live position, capped at the source length when known.
    pub fn now(&self) -> Duration {
        let p = self.position + self.since.map_or(Duration::ZERO, |t| t.elapsed());
        match self.duration {
            Some(d) => p.min(d),
            None => p,
        }
    }
}

pub(super) type ClockHandle = Arc<Mutex<OutputClock>>;
