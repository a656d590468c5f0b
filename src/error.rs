//! Error types shared across the player.
//!
//! Nothing here is fatal: every failure is reported, logged and leaves the
//! session usable for the next user action.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by the audio output resource.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutputError {
    /// The locator scheme cannot be played by this output (e.g. `https://`).
    #[error("unsupported source locator: {0}")]
    UnsupportedSource(String),

    /// The source file could not be opened.
    #[error("failed to open {path:?}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// The source was opened but could not be decoded.
    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// A play/seek was requested before any source was loaded.
    #[error("no source loaded")]
    NothingLoaded,

    /// The output thread is gone.
    #[error("audio output disconnected")]
    Disconnected,

    /// No usable audio device.
    #[error("audio device error: {0}")]
    Device(String),
}

/// Errors returned by the playback session controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("track index {index} out of range (catalog has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid seek target: {0}")]
    InvalidSeek(f64),

    #[error("invalid volume: {0}")]
    InvalidVolume(f32),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Errors raised while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("track id {0} must be positive")]
    InvalidId(u32),

    #[error("duplicate track id {0}")]
    DuplicateId(u32),

    #[error("unknown playlist {0:?}")]
    UnknownPlaylist(String),

    #[error("unknown artist {0:?}")]
    UnknownArtist(String),

    #[error("unknown album {0:?}")]
    UnknownAlbum(String),

    #[error("unknown genre {0:?}")]
    UnknownGenre(String),
}

pub type Result<T, E = PlaybackError> = std::result::Result<T, E>;
