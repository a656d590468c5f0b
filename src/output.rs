//! The audio-output resource.
//!
//! The playback controller talks to audio hardware only through the
//! [`AudioOutput`] trait. The production implementation, [`RodioOutput`],
//! decodes and plays on a dedicated thread and reports back through
//! [`OutputEvent`]s.

mod player;
mod sink;
mod thread;
mod types;

pub use player::RodioOutput;
pub use sink::resolve_locator;
pub use types::*;

#[cfg(test)]
pub(crate) mod mock;
