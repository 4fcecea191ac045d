//! Zone classifier - maps swipe power to an outcome and a target point
//!
//! Power below the floor aborts the shot. Inside the perfect zone the ball is
//! aimed at the hoop centre, inside the bank zone at the backboard. Anything
//! else is a miss whose target drifts with how far the power was off.
//! All zone comparisons are inclusive on both ends.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ShotError;
use crate::helpers::{inverse_lerp, lerp, lerp_range};

/// Per-shooter zone boundaries, reassigned before every shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShooterProfile {
    pub min_perfect: f32,
    pub max_perfect: f32,
    pub min_bank: f32,
    pub max_bank: f32,
    pub is_ai: bool,
}

impl Default for ShooterProfile {
    fn default() -> Self {
        Self {
            min_perfect: 0.45,
            max_perfect: 0.55,
            min_bank: 0.70,
            max_bank: 0.80,
            is_ai: false,
        }
    }
}

impl ShooterProfile {
    pub fn new(min_perfect: f32, max_perfect: f32, min_bank: f32, max_bank: f32) -> Self {
        Self {
            min_perfect,
            max_perfect,
            min_bank,
            max_bank,
            is_ai: false,
        }
    }

    pub fn with_ai(mut self, is_ai: bool) -> Self {
        self.is_ai = is_ai;
        self
    }

    /// Check `0 <= min_perfect <= max_perfect < min_bank <= max_bank <= 1`
    pub fn validate(&self) -> Result<(), ShotError> {
        let ordered = 0.0 <= self.min_perfect
            && self.min_perfect <= self.max_perfect
            && self.max_perfect < self.min_bank
            && self.min_bank <= self.max_bank
            && self.max_bank <= 1.0;
        if ordered {
            Ok(())
        } else {
            Err(ShotError::InvalidProfile {
                min_perfect: self.min_perfect,
                max_perfect: self.max_perfect,
                min_bank: self.min_bank,
                max_bank: self.max_bank,
            })
        }
    }

    pub fn in_perfect_zone(&self, power: f32) -> bool {
        power >= self.min_perfect && power <= self.max_perfect
    }

    pub fn in_bank_zone(&self, power: f32) -> bool {
        power >= self.min_bank && power <= self.max_bank
    }

    /// Copy the zone boundaries from another profile, keeping `is_ai`
    pub fn assign_zones_from(&mut self, zones: &ShooterProfile) {
        self.min_perfect = zones.min_perfect;
        self.max_perfect = zones.max_perfect;
        self.min_bank = zones.min_bank;
        self.max_bank = zones.max_bank;
    }
}

/// Named outcome of a classified shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Perfect,
    Bank,
    MissShort,
    MissLong,
    MissGap,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 5] = [
        OutcomeKind::Perfect,
        OutcomeKind::Bank,
        OutcomeKind::MissShort,
        OutcomeKind::MissLong,
        OutcomeKind::MissGap,
    ];

    /// One-char code for the compact event log
    pub fn code(&self) -> char {
        match self {
            OutcomeKind::Perfect => 'P',
            OutcomeKind::Bank => 'B',
            OutcomeKind::MissShort => 'S',
            OutcomeKind::MissLong => 'L',
            OutcomeKind::MissGap => 'G',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutcomeKind::Perfect => "perfect",
            OutcomeKind::Bank => "bank",
            OutcomeKind::MissShort => "short",
            OutcomeKind::MissLong => "long",
            OutcomeKind::MissGap => "gap",
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of classifying a power value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotOutcome {
    pub kind: OutcomeKind,
    pub target_point: Vec3,
    pub pending_bank_assist: bool,
    pub power: f32,
}

/// Classifier result: either a shot to launch or an aborted swipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// Power below the floor, nothing is launched
    InsufficientPower { power: f32 },
    Shot(ShotOutcome),
}

impl Classification {
    pub fn outcome(&self) -> Option<&ShotOutcome> {
        match self {
            Classification::Shot(outcome) => Some(outcome),
            Classification::InsufficientPower { .. } => None,
        }
    }
}

/// How a shot landing between the perfect and bank zones is aimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapMissPolicy {
    /// Fixed rim hit: hoop + (±0.35, 0, -0.2)
    #[default]
    Fixed,
    /// Side offset is fixed, depth moves from front rim to back rim across the gap
    DistanceInterpolated,
}

/// Aim points for one shooter's basket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotTargets {
    /// Hoop centre at rim height
    pub hoop: Vec3,
    /// Point on the backboard face used for bank shots
    pub bank: Vec3,
}

/// Classify a power value against a shooter's zones.
///
/// The gap side is the only random element: an unbiased coin flip drawn from `rng`.
pub fn classify(
    power: f32,
    profile: &ShooterProfile,
    targets: &ShotTargets,
    gap_policy: GapMissPolicy,
    rng: &mut impl Rng,
) -> Classification {
    if !power.is_finite() || power < MIN_SHOT_POWER {
        return Classification::InsufficientPower { power };
    }
    let power = power.min(MAX_SHOT_POWER);
    let hoop = targets.hoop;

    let (kind, target_point) = if profile.in_perfect_zone(power) {
        (OutcomeKind::Perfect, hoop)
    } else if profile.in_bank_zone(power) {
        (OutcomeKind::Bank, targets.bank)
    } else if power < profile.min_perfect {
        let s = inverse_lerp(MIN_SHOT_POWER, profile.min_perfect, power);
        let offset = Vec3::new(0.0, lerp_range(SHORT_Y_OFFSET, s), lerp_range(SHORT_Z_OFFSET, s));
        (OutcomeKind::MissShort, hoop + offset)
    } else if power > profile.max_bank {
        let s = inverse_lerp(profile.max_bank, MAX_SHOT_POWER, power);
        let offset = Vec3::new(0.0, lerp_range(LONG_Y_OFFSET, s), lerp_range(LONG_Z_OFFSET, s));
        (OutcomeKind::MissLong, hoop + offset)
    } else {
        let side = if rng.gen_bool(0.5) {
            GAP_SIDE_OFFSET
        } else {
            -GAP_SIDE_OFFSET
        };
        let depth = match gap_policy {
            GapMissPolicy::Fixed => GAP_Z_OFFSET,
            GapMissPolicy::DistanceInterpolated => {
                let s = inverse_lerp(profile.max_perfect, profile.min_bank, power);
                lerp(GAP_Z_OFFSET, GAP_Z_OFFSET_FAR, s)
            }
        };
        (OutcomeKind::MissGap, hoop + Vec3::new(side, 0.0, depth))
    };

    Classification::Shot(ShotOutcome {
        kind,
        target_point,
        pending_bank_assist: kind == OutcomeKind::Bank,
        power,
    })
}

/// Assign zones for a shot taken from normalized distance `distance`
/// (0 = closest spot, 1 = farthest).
///
/// The ideal power moves from 0.35 to 0.85 with distance and is clamped so
/// the perfect zone, the gap, and the bank zone all fit below full power.
pub fn assign_zones(
    distance: f32,
    perfect_width: f32,
    bank_width: f32,
) -> Result<ShooterProfile, ShotError> {
    let widths_ok = (PERFECT_WIDTH_RANGE.0..=PERFECT_WIDTH_RANGE.1).contains(&perfect_width)
        && (BANK_WIDTH_RANGE.0..=BANK_WIDTH_RANGE.1).contains(&bank_width);
    if !widths_ok {
        return Err(ShotError::InvalidZoneWidths {
            perfect_width,
            bank_width,
        });
    }

    let d = if distance.is_finite() {
        distance.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let half_perfect = perfect_width / 2.0;
    let safe_min = MIN_SHOT_POWER + half_perfect;
    let safe_max = ZONE_SAFE_CEILING - half_perfect - bank_width - ZONE_SAFE_MARGIN;
    let ideal = lerp(IDEAL_POWER_NEAR, IDEAL_POWER_FAR, d).clamp(safe_min, safe_max);

    let min_perfect = ideal - half_perfect;
    let max_perfect = ideal + half_perfect;
    let min_bank = (max_perfect + ZONE_GAP).clamp(MIN_SHOT_POWER, BANK_ZONE_MAX_START);
    let max_bank = (min_bank + bank_width).clamp(MIN_SHOT_POWER, MAX_SHOT_POWER);

    let profile = ShooterProfile::new(min_perfect, max_perfect, min_bank, max_bank);
    profile.validate()?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TOL: f32 = 1e-5;

    fn targets() -> ShotTargets {
        ShotTargets {
            hoop: Vec3::new(0.0, 3.05, 0.0),
            bank: Vec3::new(0.0, 3.6, 0.4),
        }
    }

    fn classify_default(power: f32) -> Classification {
        let mut rng = StdRng::seed_from_u64(7);
        classify(
            power,
            &ShooterProfile::default(),
            &targets(),
            GapMissPolicy::Fixed,
            &mut rng,
        )
    }

    fn outcome(power: f32) -> ShotOutcome {
        *classify_default(power)
            .outcome()
            .unwrap_or_else(|| panic!("power {} should launch", power))
    }

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() <= TOL, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_perfect_example() {
        let o = outcome(0.5);
        assert_eq!(o.kind, OutcomeKind::Perfect);
        assert_vec_close(o.target_point, targets().hoop);
        assert!(!o.pending_bank_assist);
    }

    #[test]
    fn test_insufficient_power() {
        assert_eq!(
            classify_default(0.05),
            Classification::InsufficientPower { power: 0.05 }
        );
        assert!(matches!(
            classify_default(f32::NAN),
            Classification::InsufficientPower { .. }
        ));
    }

    #[test]
    fn test_zone_edges_are_inclusive() {
        assert_eq!(outcome(0.45).kind, OutcomeKind::Perfect);
        assert_eq!(outcome(0.55).kind, OutcomeKind::Perfect);
        assert_eq!(outcome(0.70).kind, OutcomeKind::Bank);
        assert_eq!(outcome(0.80).kind, OutcomeKind::Bank);
        assert_eq!(outcome(0.1).kind, OutcomeKind::MissShort);
    }

    #[test]
    fn test_bank_targets_backboard() {
        let o = outcome(0.75);
        assert_eq!(o.kind, OutcomeKind::Bank);
        assert_vec_close(o.target_point, targets().bank);
        assert!(o.pending_bank_assist);
    }

    #[test]
    fn test_short_miss_offsets() {
        // s = (0.275 - 0.1) / (0.45 - 0.1) = 0.5
        let o = outcome(0.275);
        assert_eq!(o.kind, OutcomeKind::MissShort);
        assert_vec_close(o.target_point, targets().hoop + Vec3::new(0.0, -0.6, -1.55));

        let weakest = outcome(0.1);
        assert_vec_close(weakest.target_point, targets().hoop + Vec3::new(0.0, -1.0, -2.5));
    }

    #[test]
    fn test_long_miss_offsets() {
        // s = (0.9 - 0.8) / (1.0 - 0.8) = 0.5
        let o = outcome(0.9);
        assert_eq!(o.kind, OutcomeKind::MissLong);
        assert_vec_close(o.target_point, targets().hoop + Vec3::new(0.0, 1.0, 1.8));

        let strongest = outcome(1.0);
        assert_vec_close(strongest.target_point, targets().hoop + Vec3::new(0.0, 1.5, 3.0));
    }

    #[test]
    fn test_gap_example() {
        let o = outcome(0.62);
        assert_eq!(o.kind, OutcomeKind::MissGap);
        let offset = o.target_point - targets().hoop;
        assert!((offset.x.abs() - 0.35).abs() <= TOL);
        assert!(offset.y.abs() <= TOL);
        assert!((offset.z + 0.2).abs() <= TOL);
    }

    #[test]
    fn test_gap_side_is_unbiased() {
        let mut rng = StdRng::seed_from_u64(2024);
        let profile = ShooterProfile::default();
        let mut left = 0;
        for _ in 0..1000 {
            let c = classify(0.62, &profile, &targets(), GapMissPolicy::Fixed, &mut rng);
            if c.outcome().unwrap().target_point.x < 0.0 {
                left += 1;
            }
        }
        assert!(left > 400 && left < 600, "left count {}", left);
    }

    #[test]
    fn test_gap_distance_interpolated() {
        let mut rng = StdRng::seed_from_u64(1);
        let profile = ShooterProfile::default();
        // Halfway through the gap: depth halfway between -0.2 and 0.2
        let c = classify(
            0.625,
            &profile,
            &targets(),
            GapMissPolicy::DistanceInterpolated,
            &mut rng,
        );
        let o = c.outcome().unwrap();
        assert_eq!(o.kind, OutcomeKind::MissGap);
        assert!((o.target_point.z - 0.0).abs() <= TOL);
        assert!(((o.target_point.x).abs() - 0.35).abs() <= TOL);
    }

    #[test]
    fn test_power_above_one_is_clamped() {
        let o = outcome(1.7);
        assert_eq!(o.kind, OutcomeKind::MissLong);
        assert_eq!(o.power, 1.0);
    }

    #[test]
    fn test_assign_zones_ordering_invariant() {
        let mut pw = PERFECT_WIDTH_RANGE.0;
        while pw <= PERFECT_WIDTH_RANGE.1 {
            let mut bw = BANK_WIDTH_RANGE.0;
            while bw <= BANK_WIDTH_RANGE.1 {
                for i in 0..=100 {
                    let d = i as f32 / 100.0;
                    let p = assign_zones(d, pw, bw).unwrap_or_else(|e| {
                        panic!("d={} pw={} bw={}: {}", d, pw, bw, e)
                    });
                    assert!(p.min_perfect >= 0.0);
                    assert!(p.min_perfect <= p.max_perfect);
                    assert!(p.max_perfect < p.min_bank);
                    assert!(p.min_bank <= p.max_bank);
                    assert!(p.max_bank <= 1.0);
                }
                bw += 0.02;
            }
            pw += 0.02;
        }
    }

    #[test]
    fn test_assign_zones_midrange() {
        let p = assign_zones(0.5, 0.1, 0.1).unwrap();
        // ideal = lerp(0.35, 0.85, 0.5) = 0.6, inside [0.15, 0.75]
        assert!((p.min_perfect - 0.55).abs() < TOL);
        assert!((p.max_perfect - 0.65).abs() < TOL);
        assert!((p.min_bank - 0.75).abs() < TOL);
        assert!((p.max_bank - 0.85).abs() < TOL);
    }

    #[test]
    fn test_assign_zones_far_spot_is_clamped() {
        let p = assign_zones(1.0, 0.1, 0.1).unwrap();
        // safe_max = 0.95 - 0.05 - 0.1 - 0.05 = 0.75
        assert!((p.max_perfect - 0.8).abs() < TOL);
        assert!((p.min_bank - 0.9).abs() < TOL);
        assert!((p.max_bank - 1.0).abs() < TOL);
    }

    #[test]
    fn test_assign_zones_rejects_bad_widths() {
        assert!(matches!(
            assign_zones(0.5, 0.6, 0.1),
            Err(ShotError::InvalidZoneWidths { .. })
        ));
        assert!(assign_zones(0.5, 0.1, 0.0).is_err());
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let p = ShooterProfile::new(0.4, 0.7, 0.6, 0.8);
        assert!(p.validate().is_err());
        assert!(ShooterProfile::default().validate().is_ok());
    }
}
