//! Match clock - fixed-length timed match
//!
//! Shots can only start while the clock is running. Once it expires,
//! in-flight shots still resolve but baskets are no longer awarded.

use bevy::prelude::*;

use crate::constants::MATCH_DURATION;

/// Resource tracking the match time
#[derive(Resource, Debug, Clone)]
pub struct MatchClock {
    /// Total match length in seconds
    pub duration: f32,
    /// Seconds played so far
    pub elapsed: f32,
    /// Set once `start` has been called
    pub started: bool,
}

impl Default for MatchClock {
    fn default() -> Self {
        Self::new(MATCH_DURATION)
    }
}

impl MatchClock {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            started: false,
        }
    }

    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.started = true;
    }

    /// Advance the clock. Returns true on the tick that expires the match.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.elapsed += dt;
        !self.is_active()
    }

    pub fn is_active(&self) -> bool {
        self.started && self.elapsed < self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.started && self.elapsed >= self.duration
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }

    /// Whole seconds left, rounded up (what a HUD would show)
    pub fn display_seconds(&self) -> u32 {
        self.remaining().ceil() as u32
    }
}

/// System to advance the match clock
pub fn update_match_clock(time: Res<Time>, mut clock: ResMut<MatchClock>) {
    if clock.tick(time.delta_secs()) {
        info!("Match over after {:.1}s", clock.elapsed);
    }
}

/// Run condition: match is running
pub fn match_active(clock: Res<MatchClock>) -> bool {
    clock.is_active()
}
