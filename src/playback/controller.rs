use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, warn};

use crate::catalog::{Catalog, Track};
use crate::config::Settings;
use crate::error::{OutputError, PlaybackError, Result};
use crate::output::{AudioOutput, OutputEvent};

use super::order::{self, Step};
use super::recent::{DEFAULT_RECENT_CAPACITY, RecentlyPlayed};
use super::types::{RepeatMode, SessionSnapshot, TransportState};
use super::volume::{DEFAULT_VOLUME, VolumeState};

/// Session defaults applied when a controller is created.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub initial_volume: f32,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    /// Correct `is_playing` to false when the output fails, instead of keeping the user's intent.
    pub stop_on_error: bool,
    pub recent_capacity: usize,
    /// Fixed shuffle seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            initial_volume: DEFAULT_VOLUME,
            shuffle: false,
            repeat: RepeatMode::Off,
            stop_on_error: false,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            seed: None,
        }
    }
}

impl From<&Settings> for SessionOptions {
    fn from(s: &Settings) -> Self {
        Self {
            initial_volume: s.audio.initial_volume,
            shuffle: s.playback.shuffle,
            repeat: s.playback.repeat_mode.into(),
            stop_on_error: s.playback.stop_on_error,
            recent_capacity: s.playback.recent_capacity,
            seed: None,
        }
    }
}

/// Owns one audio output and the session state derived from it.
///
/// All operations update state synchronously; the output catches up
/// asynchronously and reports back through [`PlaybackController::handle_event`].
pub struct PlaybackController<O: AudioOutput> {
    catalog: Catalog,
    output: O,
    rng: StdRng,

    current: Option<usize>,
    is_playing: bool,
    // Output has confirmed the current source loaded.
    ready: bool,
    position: f64,
    duration: f64,
    volume: VolumeState,
    shuffle: bool,
    repeat: RepeatMode,
    recent: RecentlyPlayed,

    stop_on_error: bool,
    last_error: Option<PlaybackError>,
    revision: u64,
}

impl<O: AudioOutput> PlaybackController<O> {
    /// Start a session over `catalog`. Nothing is loaded until a track is selected.
    pub fn new(catalog: Catalog, mut output: O, options: SessionOptions) -> Self {
        let volume = VolumeState::new(options.initial_volume);
        output.set_volume(volume.effective());

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            catalog,
            output,
            rng,
            current: None,
            is_playing: false,
            ready: false,
            position: 0.0,
            duration: 0.0,
            volume,
            shuffle: options.shuffle,
            repeat: options.repeat,
            recent: RecentlyPlayed::with_capacity(options.recent_capacity),
            stop_on_error: options.stop_on_error,
            last_error: None,
            revision: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.catalog.get(i))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> &VolumeState {
        &self.volume
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn recently_played(&self) -> Vec<usize> {
        self.recent.to_vec()
    }

    /// The most recent failure reported by the output, if any.
    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn transport(&self) -> TransportState {
        match (self.current, self.is_playing, self.ready) {
            (None, _, _) => TransportState::Idle,
            (Some(_), false, _) => TransportState::Paused,
            (Some(_), true, false) => TransportState::Loading,
            (Some(_), true, true) => TransportState::Playing,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_index: self.current,
            track_id: self.current_track().map(|t| t.id),
            is_playing: self.is_playing,
            transport: self.transport(),
            position: self.position,
            duration: self.duration,
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
            shuffle: self.shuffle,
            repeat: self.repeat,
            recently_played: self.recent.to_vec(),
            revision: self.revision,
        }
    }

    /// Give the output back, ending the session.
    pub fn into_output(self) -> O {
        self.output
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &O {
        &self.output
    }

    #[cfg(test)]
    pub(crate) fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // ---- transport ----

    /// Load and start the track at `index`.
    ///
    /// Selecting the current track again restarts it from 0. An `Output` error
    /// means state was updated but the output refused; it is also recorded in
    /// [`last_error`](Self::last_error).
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        let len = self.catalog.len();
        if index >= len {
            warn!(index, len, "select_track: index out of range");
            return Err(PlaybackError::IndexOutOfRange { index, len });
        }
        self.load_and_play(index)
    }

    /// Toggle between playing and paused. No-op when nothing is selected.
    pub fn play_pause(&mut self) -> Result<()> {
        if self.current.is_none() {
            debug!("play_pause: no track selected");
            return Ok(());
        }
        self.is_playing = !self.is_playing;
        self.touch();

        if self.is_playing {
            debug!("resume");
            self.output.play().map_err(|e| self.report(e))
        } else {
            debug!("pause");
            self.output.pause();
            Ok(())
        }
    }

    /// Advance using the forward policy (shuffle and repeat aware).
    ///
    /// At the end of the catalog with repeat off, playback stops and the
    /// current index is kept.
    pub fn next(&mut self) -> Result<()> {
        let Some(cur) = self.current else {
            return Ok(());
        };
        let step = order::forward(
            cur,
            self.catalog.len(),
            self.shuffle,
            self.repeat,
            &mut self.rng,
        );
        self.apply(step)
    }

    /// Go to the sequentially previous track, wrapping to the last one.
    /// Shuffle does not apply here.
    pub fn previous(&mut self) -> Result<()> {
        let Some(cur) = self.current else {
            return Ok(());
        };
        let prev = order::backward(cur, self.catalog.len());
        self.load_and_play(prev)
    }

    /// Jump to `target` seconds, clamped to the track length once known.
    pub fn seek(&mut self, target: f64) -> Result<()> {
        if !target.is_finite() || target < 0.0 {
            warn!(target, "seek: rejected invalid target");
            return Err(PlaybackError::InvalidSeek(target));
        }
        if self.current.is_none() {
            debug!("seek: no track selected");
            return Ok(());
        }
        let target = if self.duration > 0.0 {
            target.min(self.duration)
        } else {
            target
        };
        self.position = target;
        self.touch();
        self.output.seek(target).map_err(|e| self.report(e))
    }

    /// Set the volume level, clamped to `[0, 1]`.
    ///
    /// Writing the current effective volume again is a no-op.
    pub fn set_volume(&mut self, v: f32) -> Result<()> {
        if !v.is_finite() {
            warn!(v, "set_volume: rejected non-finite volume");
            return Err(PlaybackError::InvalidVolume(v));
        }
        if let Some(effective) = self.volume.set(v) {
            self.output.set_volume(effective);
            self.touch();
        }
        Ok(())
    }

    pub fn toggle_mute(&mut self) {
        let effective = self.volume.toggle_mute();
        self.output.set_volume(effective);
        self.touch();
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.shuffle != enabled {
            self.shuffle = enabled;
            self.touch();
        }
    }

    /// `Off -> All -> One -> Off`. Returns the new mode.
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.touch();
        self.repeat
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        if self.repeat != mode {
            self.repeat = mode;
            self.touch();
        }
    }

    /// Unload the current track and return to idle.
    pub fn stop(&mut self) {
        if self.current.is_none() && !self.is_playing {
            return;
        }
        debug!("stop");
        self.current = None;
        self.is_playing = false;
        self.ready = false;
        self.position = 0.0;
        self.duration = 0.0;
        self.output.unload();
        self.touch();
    }

    // ---- output events ----

    /// Drain and handle every event the output has queued.
    pub fn pump(&mut self) {
        while let Some(ev) = self.output.poll_event() {
            self.handle_event(ev);
        }
    }

    pub fn handle_event(&mut self, ev: OutputEvent) {
        match ev {
            OutputEvent::Loaded { .. } if self.current.is_none() => {}
            OutputEvent::Loaded { duration } => {
                self.ready = true;
                self.duration = sanitize(duration);
                self.clamp_position();
                self.touch();
            }
            OutputEvent::TimeUpdate => self.on_time_update(),
            OutputEvent::Ended => self.on_track_ended(),
            OutputEvent::Error(e) => {
                self.report(e);
            }
        }
    }

    /// Frame-rate driver: re-sync progress while playing, nothing otherwise.
    pub fn tick(&mut self) {
        if self.is_playing {
            self.on_time_update();
        }
    }

    /// Pull position and length from the output's clock.
    pub fn on_time_update(&mut self) {
        if self.current.is_none() {
            return;
        }
        let duration = sanitize(self.output.duration());
        let position = self.output.current_time();
        let position = if position.is_finite() { position.max(0.0) } else { 0.0 };

        if duration > 0.0 {
            self.ready = true;
        }
        if duration == self.duration && position == self.position {
            return;
        }
        self.duration = duration;
        self.position = position;
        self.clamp_position();
        self.touch();
    }

    /// Auto-advance once the current track has played out.
    pub fn on_track_ended(&mut self) {
        let Some(cur) = self.current else {
            return;
        };
        let step = order::after_end(
            cur,
            self.catalog.len(),
            self.shuffle,
            self.repeat,
            &mut self.rng,
        );
        // Failures are already logged and kept in `last_error`.
        let _ = self.apply(step);
    }

    // ---- internals ----

    fn apply(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Play(i) => self.load_and_play(i),
            Step::Restart => self.restart(),
            Step::Stop => {
                self.halt();
                Ok(())
            }
        }
    }

    fn load_and_play(&mut self, index: usize) -> Result<()> {
        self.current = Some(index);
        self.position = 0.0;
        self.duration = 0.0;
        self.ready = false;
        self.is_playing = true;
        self.recent.push(index);
        self.touch();

        let source = match self.catalog.get(index) {
            Some(t) => {
                debug!(index, id = t.id, title = %t.title, "loading track");
                t.source.clone()
            }
            None => return Ok(()),
        };

        let started = self
            .output
            .load(&source)
            .and_then(|()| self.output.play());
        started.map_err(|e| self.report(e))
    }

    fn restart(&mut self) -> Result<()> {
        debug!(index = ?self.current, "repeat current track");
        self.position = 0.0;
        self.is_playing = true;
        self.touch();
        let started = self.output.seek(0.0).and_then(|()| self.output.play());
        started.map_err(|e| self.report(e))
    }

    fn halt(&mut self) {
        debug!("reached end of catalog");
        self.is_playing = false;
        self.output.pause();
        self.touch();
    }

    fn clamp_position(&mut self) {
        if self.duration > 0.0 {
            self.position = self.position.clamp(0.0, self.duration);
        }
    }

    fn report(&mut self, e: OutputError) -> PlaybackError {
        error!(error = %e, index = ?self.current, "audio output failure");
        if self.stop_on_error {
            self.is_playing = false;
        }
        let err = PlaybackError::Output(e);
        self.last_error = Some(err.clone());
        self.touch();
        err
    }
}

fn sanitize(duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => 0.0,
    }
}
