//! Transport enums and the read-only snapshot handed to surfaces.

use crate::config::RepeatModeSetting;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RepeatMode {
    /// Stop after the last track.
    #[default]
    Off,
    /// Wrap around to the first track.
    All,
    /// Repeat the current track when it ends.
    One,
}

impl RepeatMode {
    /// `Off -> All -> One -> Off`.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

impl From<RepeatModeSetting> for RepeatMode {
    fn from(s: RepeatModeSetting) -> Self {
        match s {
            RepeatModeSetting::Off => RepeatMode::Off,
            RepeatModeSetting::All => RepeatMode::All,
            RepeatModeSetting::One => RepeatMode::One,
        }
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportState {
    /// No track selected.
    Idle,
    /// A track is selected and wanted, but the output has not reported it ready.
    Loading,
    Playing,
    Paused,
}

/// Copy of the session state for display surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub current_index: Option<usize>,
    pub track_id: Option<u32>,
    pub is_playing: bool,
    pub transport: TransportState,
    /// Seconds into the current track.
    pub position: f64,
    /// Track length in seconds; 0 until the output reports it.
    pub duration: f64,
    pub volume: f32,
    pub is_muted: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub recently_played: Vec<usize>,
    /// Bumped on every observable change.
    pub revision: u64,
}

impl SessionSnapshot {
    /// Progress through the current track in percent, `0` while the length is unknown.
    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0) * 100.0
        } else {
            0.0
        }
    }

    /// What actually reaches the speakers.
    pub fn effective_volume(&self) -> f32 {
        if self.is_muted { 0.0 } else { self.volume }
    }
}
