//! Playback session controller.
//!
//! [`PlaybackController`] is the only writer of session state and the only
//! owner of the audio output. Surfaces read [`SessionSnapshot`]s and call
//! controller operations; they never touch the output themselves.

mod controller;
mod order;
mod recent;
mod types;
mod volume;

pub use controller::{PlaybackController, SessionOptions};
pub use order::Step;
pub use recent::RecentlyPlayed;
pub use types::*;
pub use volume::VolumeState;
