//! Outbound shot signals
//!
//! A `ShotSession` reports everything that happens to its shot through an
//! injected `ShotObserver`. Scoring, camera control, event logging and UI sit
//! behind this trait; the session never reaches for globals.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use super::OutcomeKind;

/// Shooter index (P1, P2, ...)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ShooterId(pub u8);

impl ShooterId {
    /// Parse the "P1" display form
    pub fn parse(s: &str) -> Option<Self> {
        let n: u8 = s.strip_prefix('P')?.parse().ok()?;
        n.checked_sub(1).map(ShooterId)
    }
}

impl std::fmt::Display for ShooterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0 as u16 + 1)
    }
}

/// Ball left the shooter's hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotLaunched {
    pub shooter: ShooterId,
    pub kind: OutcomeKind,
    pub power: f32,
    pub origin: Vec3,
    pub target: Vec3,
    pub velocity: Vec3,
}

/// Final verdict for one shot, emitted exactly once per launched shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotResolved {
    pub shooter: ShooterId,
    pub kind: OutcomeKind,
    pub is_perfect: bool,
    pub hit_bonus: bool,
    pub bonus_points: u32,
    pub made: bool,
}

/// Receiver for session signals. Every method defaults to a no-op.
pub trait ShotObserver: Send + Sync {
    fn shot_launched(&mut self, _launch: &ShotLaunched) {}
    fn shot_resolved(&mut self, _resolved: &ShotResolved) {}
    fn shot_finished(&mut self, _shooter: ShooterId) {}
    fn camera_follow(&mut self, _shooter: ShooterId) {}
    fn camera_reset(&mut self, _shooter: ShooterId) {}

    /// Swipe released below the power floor, nothing was launched
    fn shot_aborted(&mut self, _shooter: ShooterId, _power: f32) {}
    fn bank_assist(&mut self, _shooter: ShooterId, _velocity: Vec3) {}
    fn bonus_hit(&mut self, _shooter: ShooterId, _points: u32) {}
}

/// Drops every signal
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ShotObserver for NullObserver {}

/// One queued signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotSignal {
    Launched(ShotLaunched),
    Resolved(ShotResolved),
    Finished(ShooterId),
    CameraFollow(ShooterId),
    CameraReset(ShooterId),
    Aborted { shooter: ShooterId, power: f32 },
    BankAssist { shooter: ShooterId, velocity: Vec3 },
    BonusHit { shooter: ShooterId, points: u32 },
}

/// Shared signal queue. Clones push into the same buffer, so the Bevy systems
/// keep one handle and give each session another.
#[derive(Debug, Clone, Default, Resource)]
pub struct SignalQueue {
    signals: Arc<Mutex<Vec<ShotSignal>>>,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, signal: ShotSignal) {
        match self.signals.lock() {
            Ok(mut guard) => guard.push(signal),
            Err(poisoned) => poisoned.into_inner().push(signal),
        }
    }

    /// Take all queued signals in emission order
    pub fn drain(&self) -> Vec<ShotSignal> {
        match self.signals.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.signals.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ShotObserver for SignalQueue {
    fn shot_launched(&mut self, launch: &ShotLaunched) {
        self.push(ShotSignal::Launched(*launch));
    }

    fn shot_resolved(&mut self, resolved: &ShotResolved) {
        self.push(ShotSignal::Resolved(*resolved));
    }

    fn shot_finished(&mut self, shooter: ShooterId) {
        self.push(ShotSignal::Finished(shooter));
    }

    fn camera_follow(&mut self, shooter: ShooterId) {
        self.push(ShotSignal::CameraFollow(shooter));
    }

    fn camera_reset(&mut self, shooter: ShooterId) {
        self.push(ShotSignal::CameraReset(shooter));
    }

    fn shot_aborted(&mut self, shooter: ShooterId, power: f32) {
        self.push(ShotSignal::Aborted { shooter, power });
    }

    fn bank_assist(&mut self, shooter: ShooterId, velocity: Vec3) {
        self.push(ShotSignal::BankAssist { shooter, velocity });
    }

    fn bonus_hit(&mut self, shooter: ShooterId, points: u32) {
        self.push(ShotSignal::BonusHit { shooter, points });
    }
}
