//! AI shot decision - pick an outcome, then produce a power value for it
//!
//! The AI does not aim. It rolls for perfect / bank / miss and then picks a
//! power inside the matching zone, so its shots go through the same
//! classifier and solver as a human swipe.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::AiProfile;
use crate::constants::*;
use crate::shooting::{PowerSource, ShooterProfile};

/// Keeps sampled miss powers off the zone edges (zones are inclusive)
const EDGE_MARGIN: f32 = 1e-3;

/// What the AI decided to go for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiChoice {
    Perfect,
    Bank,
    Miss,
}

/// Roll an outcome from the profile's chances
pub fn roll_choice(profile: &AiProfile, rng: &mut impl Rng) -> AiChoice {
    let roll: f32 = rng.r#gen();
    if roll < profile.perfect_chance {
        AiChoice::Perfect
    } else if roll < profile.perfect_chance + profile.bank_chance {
        AiChoice::Bank
    } else {
        AiChoice::Miss
    }
}

fn sample_between(lo: f32, hi: f32, rng: &mut impl Rng) -> f32 {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}

/// Power inside the zone for `choice`. Misses are uniform over everything
/// outside both zones (and above the power floor).
pub fn sample_power(choice: AiChoice, zones: &ShooterProfile, rng: &mut impl Rng) -> f32 {
    match choice {
        AiChoice::Perfect => sample_between(zones.min_perfect, zones.max_perfect, rng),
        AiChoice::Bank => sample_between(zones.min_bank, zones.max_bank, rng),
        AiChoice::Miss => {
            let ranges = [
                (MIN_SHOT_POWER, zones.min_perfect - EDGE_MARGIN),
                (zones.max_perfect + EDGE_MARGIN, zones.min_bank - EDGE_MARGIN),
                (zones.max_bank + EDGE_MARGIN, MAX_SHOT_POWER),
            ];
            let total: f32 = ranges.iter().map(|(lo, hi)| (hi - lo).max(0.0)).sum();
            if total <= 0.0 {
                // Zones packed edge to edge: the gap midpoint is the only miss left
                return (zones.max_perfect + zones.min_bank) / 2.0;
            }

            let mut pick = rng.gen_range(0.0..total);
            for (lo, hi) in ranges {
                let width = (hi - lo).max(0.0);
                if width <= 0.0 {
                    continue;
                }
                if pick <= width {
                    return lo + pick;
                }
                pick -= width;
            }
            (zones.max_perfect + zones.min_bank) / 2.0
        }
    }
}

/// Power source for AI shooters: thinks for a while, then releases with a
/// power picked from its zone choice
#[derive(Debug, Clone)]
pub struct AiPower {
    pub profile: AiProfile,
    rng: StdRng,
    elapsed: f32,
    think_deadline: f32,
    choice: Option<AiChoice>,
    power: f32,
}

impl AiPower {
    pub fn new(profile: AiProfile, seed: u64) -> Self {
        Self {
            profile: profile.sanitized(),
            rng: StdRng::seed_from_u64(seed),
            elapsed: 0.0,
            think_deadline: 0.0,
            choice: None,
            power: 0.0,
        }
    }

    /// Decision for the current charge
    pub fn choice(&self) -> Option<AiChoice> {
        self.choice
    }

    pub fn think_deadline(&self) -> f32 {
        self.think_deadline
    }
}

impl PowerSource for AiPower {
    fn begin(&mut self, _pointer: Vec2, zones: &ShooterProfile) {
        self.elapsed = 0.0;
        self.think_deadline = sample_between(self.profile.think_min, self.profile.think_max, &mut self.rng);
        let choice = roll_choice(&self.profile, &mut self.rng);
        self.power = sample_power(choice, zones, &mut self.rng);
        self.choice = Some(choice);
        debug!(
            "AI {} going for {:?} at power {:.2} after {:.2}s",
            self.profile.name, choice, self.power, self.think_deadline
        );
    }

    fn update_pointer(&mut self, _pointer: Vec2) -> f32 {
        self.power
    }

    fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.think_deadline
    }

    fn peak_power(&self) -> f32 {
        self.power
    }

    fn accepts_pointer(&self) -> bool {
        false
    }

    fn label(&self) -> &'static str {
        "ai"
    }
}
