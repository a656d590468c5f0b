//! Volume and mute policy.

pub const DEFAULT_VOLUME: f32 = 0.7;

/// Volume level in `[0, 1]` plus mute, remembering where to return on unmute.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeState {
    level: f32,
    muted: bool,
    restore: f32,
}

impl Default for VolumeState {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

impl VolumeState {
    pub fn new(level: f32) -> Self {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            DEFAULT_VOLUME
        };
        Self {
            level,
            muted: false,
            restore: if level > 0.0 { level } else { DEFAULT_VOLUME },
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Exactly 0 while muted.
    pub fn effective(&self) -> f32 {
        if self.muted { 0.0 } else { self.level }
    }

    /// Set a new level (clamped). A non-zero level while muted also unmutes.
    ///
    /// Returns the new effective volume, or `None` when it did not change.
    /// `v` must be finite.
    pub fn set(&mut self, v: f32) -> Option<f32> {
        let v = v.clamp(0.0, 1.0);
        if v == self.effective() {
            return None;
        }
        self.level = v;
        if v > 0.0 {
            self.restore = v;
            self.muted = false;
        }
        Some(self.effective())
    }

    /// Flip mute; returns the new effective volume.
    pub fn toggle_mute(&mut self) -> f32 {
        if self.muted {
            self.muted = false;
            self.level = self.restore;
        } else {
            if self.level > 0.0 {
                self.restore = self.level;
            }
            self.muted = true;
        }
        self.effective()
    }
}
