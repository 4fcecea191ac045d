//! Shot charging - power sources and swipe tracking
//!
//! A `ShotSession` does not care where power comes from. Human shooters use
//! `GesturePower`, which turns an upward swipe into power and releases on its
//! own when the swipe runs too long. AI shooters use `ai::AiPower`.

use bevy::prelude::*;

use crate::constants::*;
use crate::shooting::ShooterProfile;
use crate::tuning::ShotTuning;

/// Strategy that produces the power value for one shot
pub trait PowerSource: Send + Sync {
    /// Charging started at `pointer` (sources without a pointer ignore it)
    fn begin(&mut self, pointer: Vec2, profile: &ShooterProfile);

    /// Pointer moved while charging. Returns the peak power so far.
    fn update_pointer(&mut self, pointer: Vec2) -> f32;

    /// Advance the charge clock. Returns true once the source wants to release.
    fn tick(&mut self, dt: f32) -> bool;

    /// Peak power reached during the current charge
    fn peak_power(&self) -> f32;

    /// Whether gesture events drive this source
    fn accepts_pointer(&self) -> bool {
        true
    }

    fn label(&self) -> &'static str;
}

/// Swipe state for one gesture
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShotInput {
    pub start_position: Vec2,
    /// Peak power, never decreases within a gesture
    pub current_max_power: f32,
}

impl ShotInput {
    pub fn new(start_position: Vec2) -> Self {
        Self {
            start_position,
            current_max_power: 0.0,
        }
    }

    /// Fold an instantaneous reading into the peak
    pub fn record(&mut self, power: f32) -> f32 {
        if power > self.current_max_power {
            self.current_max_power = power;
        }
        self.current_max_power
    }
}

/// Power for a pointer position: vertical swipe distance as a fraction of the
/// screen height, scaled so that `screen_range` of the screen is full power.
/// Screen y grows upward; downward swipes give zero.
pub fn instantaneous_power(start: Vec2, pointer: Vec2, screen_height: f32, screen_range: f32) -> f32 {
    if screen_height <= 0.0 || screen_range <= 0.0 {
        return 0.0;
    }
    let swipe = (pointer.y - start.y) / screen_height;
    (swipe / screen_range).clamp(0.0, 1.0)
}

/// Human swipe power source
#[derive(Debug, Clone)]
pub struct GesturePower {
    pub input: ShotInput,
    pub screen_height: f32,
    pub screen_range_max_power: f32,
    pub charge_timeout: f32,
    elapsed: f32,
}

impl GesturePower {
    pub fn new(screen_height: f32, screen_range_max_power: f32, charge_timeout: f32) -> Self {
        Self {
            input: ShotInput::default(),
            screen_height,
            screen_range_max_power: screen_range_max_power.clamp(SCREEN_RANGE_MIN, SCREEN_RANGE_MAX),
            charge_timeout,
            elapsed: 0.0,
        }
    }

    pub fn from_tuning(screen_height: f32, tuning: &ShotTuning) -> Self {
        Self::new(
            screen_height,
            tuning.screen_range_max_power,
            tuning.charge_timeout,
        )
    }

    /// Seconds since the swipe started
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl PowerSource for GesturePower {
    fn begin(&mut self, pointer: Vec2, _profile: &ShooterProfile) {
        self.input = ShotInput::new(pointer);
        self.elapsed = 0.0;
    }

    fn update_pointer(&mut self, pointer: Vec2) -> f32 {
        let power = instantaneous_power(
            self.input.start_position,
            pointer,
            self.screen_height,
            self.screen_range_max_power,
        );
        self.input.record(power)
    }

    fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.charge_timeout
    }

    fn peak_power(&self) -> f32 {
        self.input.current_max_power
    }

    fn label(&self) -> &'static str {
        "gesture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture() -> GesturePower {
        // 1000 px screen, half the screen is full power
        GesturePower::new(1000.0, 0.5, 0.8)
    }

    #[test]
    fn test_instantaneous_power_scaling() {
        let start = Vec2::new(100.0, 100.0);
        assert_eq!(instantaneous_power(start, Vec2::new(100.0, 350.0), 1000.0, 0.5), 0.5);
        assert_eq!(instantaneous_power(start, Vec2::new(100.0, 900.0), 1000.0, 0.5), 1.0);
        assert_eq!(instantaneous_power(start, Vec2::new(100.0, 0.0), 1000.0, 0.5), 0.0);
    }

    #[test]
    fn test_peak_power_is_monotonic() {
        let mut g = gesture();
        g.begin(Vec2::ZERO, &ShooterProfile::default());

        let path = [100.0, 300.0, 200.0, 420.0, 50.0, 410.0];
        let mut max_seen: f32 = 0.0;
        for y in path {
            let inst = instantaneous_power(Vec2::ZERO, Vec2::new(0.0, y), 1000.0, 0.5);
            max_seen = max_seen.max(inst);
            let peak = g.update_pointer(Vec2::new(0.0, y));
            assert_eq!(peak, max_seen);
        }
        assert!((g.peak_power() - 0.84).abs() < 1e-6);
    }

    #[test]
    fn test_begin_resets_peak() {
        let mut g = gesture();
        g.begin(Vec2::ZERO, &ShooterProfile::default());
        g.update_pointer(Vec2::new(0.0, 400.0));
        g.begin(Vec2::new(0.0, 50.0), &ShooterProfile::default());
        assert_eq!(g.peak_power(), 0.0);
        assert_eq!(g.input.start_position, Vec2::new(0.0, 50.0));
    }

    #[test]
    fn test_timeout_releases() {
        let mut g = gesture();
        g.begin(Vec2::ZERO, &ShooterProfile::default());
        assert!(!g.tick(0.5));
        assert!(g.tick(0.3));
    }

    #[test]
    fn test_screen_range_is_clamped() {
        let g = GesturePower::new(1000.0, 0.05, 0.8);
        assert_eq!(g.screen_range_max_power, SCREEN_RANGE_MIN);
    }
}
