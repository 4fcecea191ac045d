//! Zone sweep - fire every power bucket from every distance bucket at the
//! reference court and report what each outcome kind actually does

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::helpers::lerp;
use crate::shooting::{
    OutcomeKind, PowerSource, Release, ShooterId, ShooterProfile, ShotSession, ShotSignal,
    SignalQueue, assign_zones,
};
use crate::tuning::ShotTuning;
use crate::world::{BackboardBonus, Court, SpotPicker};

/// Frames allowed for one shot before it is abandoned
const MAX_SHOT_FRAMES: u32 = 900;

/// Power source that releases immediately with a fixed power
#[derive(Debug, Clone, Copy)]
pub struct FixedPower {
    pub power: f32,
}

impl PowerSource for FixedPower {
    fn begin(&mut self, _pointer: Vec2, _zones: &ShooterProfile) {}

    fn update_pointer(&mut self, _pointer: Vec2) -> f32 {
        self.power
    }

    fn tick(&mut self, _dt: f32) -> bool {
        true
    }

    fn peak_power(&self) -> f32 {
        self.power
    }

    fn accepts_pointer(&self) -> bool {
        false
    }

    fn label(&self) -> &'static str {
        "fixed"
    }
}

/// Tally for one (distance, power) cell
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepBucket {
    /// Normalized distance (0 = closest spot)
    pub distance: f32,
    /// Power at the bucket centre
    pub power: f32,
    pub shots: u32,
    pub no_shots: u32,
    pub makes: u32,
    /// Launches per outcome kind, in `OutcomeKind::ALL` order
    pub by_kind: [u32; 5],
}

impl SweepBucket {
    pub fn make_rate(&self) -> f32 {
        let launched = self.shots - self.no_shots;
        if launched == 0 {
            0.0
        } else {
            self.makes as f32 / launched as f32
        }
    }

    /// Most frequent outcome kind, `None` when nothing launched
    pub fn dominant_kind(&self) -> Option<OutcomeKind> {
        let (index, count) = self
            .by_kind
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| **c)?;
        (*count > 0).then(|| OutcomeKind::ALL[index])
    }
}

/// Totals per outcome kind across the sweep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KindTally {
    pub kind: String,
    pub launched: u32,
    pub makes: u32,
    pub make_rate: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepResult {
    pub distance_steps: u32,
    pub power_steps: u32,
    pub shots_per_bucket: u32,
    pub buckets: Vec<SweepBucket>,
    pub kinds: Vec<KindTally>,
}

impl SweepResult {
    pub fn kind(&self, kind: OutcomeKind) -> Option<&KindTally> {
        self.kinds.iter().find(|k| k.kind == kind.name())
    }

    fn tally_kinds(&mut self, makes_by_kind: [u32; 5]) {
        self.kinds = OutcomeKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let launched: u32 = self.buckets.iter().map(|b| b.by_kind[i]).sum();
                let makes = makes_by_kind[i];
                KindTally {
                    kind: kind.name().to_string(),
                    launched,
                    makes,
                    make_rate: if launched > 0 {
                        makes as f32 / launched as f32
                    } else {
                        0.0
                    },
                }
            })
            .collect();
    }

    /// Grid of `<kind code><make %>` cells, one row per distance
    pub fn format_table(&self) -> String {
        let mut output = String::new();
        output.push_str("\nZone sweep (cell = dominant kind, make rate)\n\n");
        output.push_str(&format!("{:>6} |", "dist"));
        for j in 0..self.power_steps {
            let power = bucket_centre(j, self.power_steps);
            output.push_str(&format!(" {:>5.2}", power));
        }
        output.push('\n');
        output.push_str(&format!("{:-<7}+{:-<width$}\n", "", "", width = 6 * self.power_steps as usize));

        for row in self.buckets.chunks(self.power_steps.max(1) as usize) {
            let Some(first) = row.first() else {
                continue;
            };
            output.push_str(&format!("{:>6.2} |", first.distance));
            for bucket in row {
                match bucket.dominant_kind() {
                    Some(kind) => {
                        output.push_str(&format!(" {}{:>3.0}%", kind.code(), bucket.make_rate() * 100.0))
                    }
                    None => output.push_str("     -"),
                }
            }
            output.push('\n');
        }

        output.push('\n');
        for tally in &self.kinds {
            output.push_str(&format!(
                "{:>10}: {:>6} launched, {:>5.1}% made\n",
                tally.kind,
                tally.launched,
                tally.make_rate * 100.0
            ));
        }
        output
    }
}

fn bucket_centre(index: u32, steps: u32) -> f32 {
    (index as f32 + 0.5) / steps.max(1) as f32
}

fn distance_at(index: u32, steps: u32) -> f32 {
    if steps <= 1 {
        0.5
    } else {
        index as f32 / (steps - 1) as f32
    }
}

/// Play one shot to completion. Returns the launched kind and whether it
/// went in, or `None` for a no-shot.
fn play_shot(
    court: &Court,
    tuning: &ShotTuning,
    zones: ShooterProfile,
    origin: Vec3,
    power: f32,
    seed: u64,
) -> Option<(OutcomeKind, bool)> {
    let queue = SignalQueue::new();
    let mut session = ShotSession::new(
        ShooterId(0),
        Box::new(FixedPower { power }),
        tuning.clone(),
        court.targets(),
        origin,
        Box::new(queue.clone()),
    )
    .with_seed(seed)
    .with_profile(zones);

    let dt = 1.0 / SIM_FPS;
    let bonus = BackboardBonus::default();
    session.begin_charge(Vec2::ZERO, true);
    let kind = match session.tick(dt) {
        Ok(Some(Release::Launched(outcome))) => outcome.kind,
        Ok(_) => return None,
        Err(e) => {
            warn!("Sweep shot failed to launch: {}", e);
            return None;
        }
    };

    for _ in 0..MAX_SHOT_FRAMES {
        if let Err(e) = session.tick(dt) {
            warn!("Sweep shot failed: {}", e);
            break;
        }
        if session.is_idle() {
            break;
        }
        if let Err(e) = court.step(&mut session, &bonus, dt) {
            warn!("Sweep shot failed: {}", e);
            break;
        }
    }

    let made = queue
        .drain()
        .iter()
        .any(|s| matches!(s, ShotSignal::Resolved(r) if r.made));
    Some((kind, made))
}

/// Sweep `distance_steps x power_steps` buckets, `shots_per_bucket` shots each.
/// Power is jittered inside its bucket and the spot angle is random.
pub fn run_zone_sweep(
    tuning: &ShotTuning,
    distance_steps: u32,
    power_steps: u32,
    shots_per_bucket: u32,
    seed: u64,
) -> SweepResult {
    let court = Court::default();
    let picker = SpotPicker::new(court.hoop_center);
    let mut rng = StdRng::seed_from_u64(seed);
    let power_steps = power_steps.max(1);
    let distance_steps = distance_steps.max(1);
    let bucket_width = 1.0 / power_steps as f32;

    let mut result = SweepResult {
        distance_steps,
        power_steps,
        shots_per_bucket,
        ..default()
    };
    let mut makes_by_kind = [0u32; 5];

    for i in 0..distance_steps {
        let d = distance_at(i, distance_steps);
        let zones = match assign_zones(d, tuning.perfect_width, tuning.bank_width) {
            Ok(zones) => zones,
            Err(e) => {
                warn!("Zone sweep stopped: {}", e);
                return result;
            }
        };
        let distance = lerp(picker.min_distance, picker.max_distance, d);

        for j in 0..power_steps {
            let mut bucket = SweepBucket {
                distance: d,
                power: bucket_centre(j, power_steps),
                ..default()
            };
            for _ in 0..shots_per_bucket {
                let lo = j as f32 * bucket_width;
                let power = rng.gen_range(lo..lo + bucket_width).min(MAX_SHOT_POWER);
                let angle = rng.gen_range(-picker.max_angle_deg..=picker.max_angle_deg);
                let spot = picker.spot_at(angle, distance);
                bucket.shots += 1;
                match play_shot(&court, tuning, zones, spot.position, power, rng.r#gen()) {
                    Some((kind, made)) => {
                        let k = OutcomeKind::ALL
                            .iter()
                            .position(|x| *x == kind)
                            .unwrap_or(0);
                        bucket.by_kind[k] += 1;
                        if made {
                            bucket.makes += 1;
                            makes_by_kind[k] += 1;
                        }
                    }
                    None => bucket.no_shots += 1,
                }
            }
            result.buckets.push(bucket);
        }
    }

    result.tally_kinds(makes_by_kind);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_power_releases_at_once() {
        let mut power = FixedPower { power: 0.4 };
        assert!(power.tick(0.0));
        assert_eq!(power.peak_power(), 0.4);
        assert!(!power.accepts_pointer());
    }

    #[test]
    fn test_perfect_shots_always_drop() {
        let court = Court::default();
        let tuning = ShotTuning::default();
        let picker = SpotPicker::new(court.hoop_center);
        for (d, angle) in [(0.0, 0.0), (0.5, 30.0), (1.0, -45.0)] {
            let zones = assign_zones(d, tuning.perfect_width, tuning.bank_width).unwrap();
            let ideal = (zones.min_perfect + zones.max_perfect) / 2.0;
            let spot = picker.spot_at(angle, lerp(picker.min_distance, picker.max_distance, d));
            let shot = play_shot(&court, &tuning, zones, spot.position, ideal, 1);
            assert_eq!(shot, Some((OutcomeKind::Perfect, true)));
        }
    }

    #[test]
    fn test_gap_and_short_never_score() {
        let tuning = ShotTuning::default();
        let sweep = run_zone_sweep(&tuning, 2, 10, 3, 8);
        assert_eq!(sweep.buckets.len(), 20);
        assert_eq!(sweep.kind(OutcomeKind::MissGap).map(|k| k.makes), Some(0));
        assert_eq!(sweep.kind(OutcomeKind::MissShort).map(|k| k.makes), Some(0));
        let perfect = sweep.kind(OutcomeKind::Perfect).unwrap();
        assert!(perfect.launched > 0);
        assert_eq!(perfect.makes, perfect.launched);
    }

    #[test]
    fn test_lowest_bucket_is_no_shot() {
        let sweep = run_zone_sweep(&ShotTuning::default(), 1, 10, 4, 3);
        // Powers in [0, 0.1) never launch
        assert_eq!(sweep.buckets[0].no_shots, 4);
        assert_eq!(sweep.buckets[0].dominant_kind(), None);
        assert!(sweep.format_table().contains("perfect"));
    }
}
