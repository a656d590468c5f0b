//! Advance policy: which track plays after the current one.

use rand::Rng;

use super::types::RepeatMode;

/// Outcome of asking the policy where to go next.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Play(usize),
    /// Replay the current track from the top.
    Restart,
    /// Nothing further to play.
    Stop,
}

/// Forward navigation, used by manual `next` and by track-end auto-advance.
///
/// Shuffle picks uniformly from the whole catalog, so the current track may
/// come up again. At the last index `Off` stops; any repeat mode wraps.
pub fn forward<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    shuffle: bool,
    repeat: RepeatMode,
    rng: &mut R,
) -> Step {
    if len == 0 {
        return Step::Stop;
    }
    if shuffle {
        return Step::Play(rng.gen_range(0..len));
    }
    if current + 1 < len {
        Step::Play(current + 1)
    } else if repeat == RepeatMode::Off {
        Step::Stop
    } else {
        Step::Play(0)
    }
}

/// Backward navigation. Always sequential, shuffle never applies.
pub fn backward(current: usize, len: usize) -> usize {
    if current == 0 || current >= len {
        len.saturating_sub(1)
    } else {
        current - 1
    }
}

/// What to do when the output reports the current track finished.
pub fn after_end<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    shuffle: bool,
    repeat: RepeatMode,
    rng: &mut R,
) -> Step {
    if repeat == RepeatMode::One {
        return Step::Restart;
    }
    forward(current, len, shuffle, repeat, rng)
}
