//! Backboard bonus event
//!
//! Every so often the backboard lights up for a few seconds. A basket whose
//! ball touched the lit board earns the extra points on top of the basket.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::*;

/// Current state of the bonus board
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackboardBonus {
    pub active: bool,
    pub points: u32,
}

impl BackboardBonus {
    pub fn activate(&mut self, points: u32) {
        self.active = true;
        self.points = points;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.points = 0;
    }

    /// Points on offer, if the board is lit
    pub fn active_points(&self) -> Option<u32> {
        self.active.then_some(self.points)
    }
}

/// Change reported by `BonusSchedule::tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusChange {
    Activated { points: u32 },
    Expired,
}

/// Drives `BackboardBonus` on and off with deadline timers
#[derive(Resource, Debug, Clone)]
pub struct BonusSchedule {
    pub delay_range: (f32, f32),
    pub duration: f32,
    pub points_range: (u32, u32),
    elapsed: f32,
    /// Time at which the current wait (off or on) ends
    deadline: f32,
    rng: StdRng,
}

impl BonusSchedule {
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, BONUS_DELAY_RANGE, BONUS_DURATION, BONUS_POINTS_RANGE)
    }

    pub fn with_settings(
        seed: u64,
        delay_range: (f32, f32),
        duration: f32,
        points_range: (u32, u32),
    ) -> Self {
        let mut schedule = Self {
            delay_range,
            duration,
            points_range,
            elapsed: 0.0,
            deadline: 0.0,
            rng: StdRng::seed_from_u64(seed),
        };
        schedule.deadline = schedule.next_delay();
        schedule
    }

    fn next_delay(&mut self) -> f32 {
        let (lo, hi) = self.delay_range;
        if hi > lo {
            self.rng.gen_range(lo..=hi)
        } else {
            lo
        }
    }

    fn next_points(&mut self) -> u32 {
        let (lo, hi) = self.points_range;
        if hi > lo {
            self.rng.gen_range(lo..=hi)
        } else {
            lo
        }
    }

    /// Seconds until the next change
    pub fn time_to_next(&self) -> f32 {
        (self.deadline - self.elapsed).max(0.0)
    }

    /// Advance the schedule and flip the board when a deadline passes
    pub fn tick(&mut self, dt: f32, bonus: &mut BackboardBonus) -> Option<BonusChange> {
        self.elapsed += dt;
        if self.elapsed < self.deadline {
            return None;
        }
        if bonus.active {
            bonus.deactivate();
            self.deadline = self.elapsed + self.next_delay();
            Some(BonusChange::Expired)
        } else {
            let points = self.next_points();
            bonus.activate(points);
            self.deadline = self.elapsed + self.duration;
            Some(BonusChange::Activated { points })
        }
    }
}
