//! Scoring module - points and per-shooter shot stats

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::shooting::{OutcomeKind, ShooterId, ShotResolved, ShotSignal};

/// Points for a resolved shot: 3 for a perfect basket, 2 for any other
/// basket, plus the bonus board value when the ball touched it while lit.
pub fn points_for(resolved: &ShotResolved) -> u32 {
    if !resolved.made {
        return 0;
    }
    let base = if resolved.is_perfect {
        PERFECT_POINTS
    } else {
        BASKET_POINTS
    };
    let bonus = if resolved.hit_bonus {
        resolved.bonus_points
    } else {
        0
    };
    base + bonus
}

/// Running totals for one shooter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShooterStats {
    pub score: u32,
    pub attempts: u32,
    pub makes: u32,
    pub perfects: u32,
    pub banks: u32,
    pub bonus_hits: u32,
    pub bonus_points: u32,
    /// Swipes released below the power floor
    pub no_shots: u32,
    /// Launches per outcome kind, in `OutcomeKind::ALL` order
    pub launched_by_kind: [u32; 5],
}

impl ShooterStats {
    pub fn make_rate(&self) -> f32 {
        if self.attempts == 0 {
            0.0
        } else {
            self.makes as f32 / self.attempts as f32
        }
    }
}

fn kind_index(kind: OutcomeKind) -> usize {
    OutcomeKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(0)
}

/// Score resource for all shooters in a match
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub shooters: Vec<ShooterStats>,
}

impl ScoreBoard {
    pub fn new(shooter_count: usize) -> Self {
        Self {
            shooters: vec![ShooterStats::default(); shooter_count],
        }
    }

    fn stats_mut(&mut self, shooter: ShooterId) -> &mut ShooterStats {
        let index = shooter.0 as usize;
        if index >= self.shooters.len() {
            self.shooters.resize(index + 1, ShooterStats::default());
        }
        &mut self.shooters[index]
    }

    pub fn stats(&self, shooter: ShooterId) -> Option<&ShooterStats> {
        self.shooters.get(shooter.0 as usize)
    }

    pub fn score(&self, shooter: ShooterId) -> u32 {
        self.stats(shooter).map(|s| s.score).unwrap_or(0)
    }

    /// Award a resolved shot. Baskets after the final whistle count as
    /// makes for stats but earn no points. Returns the points awarded.
    pub fn award(&mut self, resolved: &ShotResolved, match_active: bool) -> u32 {
        if !resolved.made {
            return 0;
        }
        let points = if match_active { points_for(resolved) } else { 0 };
        let stats = self.stats_mut(resolved.shooter);
        stats.makes += 1;
        if resolved.is_perfect {
            stats.perfects += 1;
        }
        if resolved.kind == OutcomeKind::Bank {
            stats.banks += 1;
        }
        if resolved.hit_bonus {
            stats.bonus_hits += 1;
            if match_active {
                stats.bonus_points += resolved.bonus_points;
            }
        }
        stats.score += points;
        if points > 0 {
            info!(
                "{} scores {} ({}). Total: {}",
                resolved.shooter, points, resolved.kind, stats.score
            );
        }
        points
    }

    /// Fold one session signal into the totals. Returns points awarded.
    pub fn apply(&mut self, signal: &ShotSignal, match_active: bool) -> u32 {
        match signal {
            ShotSignal::Launched(launch) => {
                let stats = self.stats_mut(launch.shooter);
                stats.attempts += 1;
                stats.launched_by_kind[kind_index(launch.kind)] += 1;
                0
            }
            ShotSignal::Aborted { shooter, .. } => {
                self.stats_mut(*shooter).no_shots += 1;
                0
            }
            ShotSignal::Resolved(resolved) => self.award(resolved, match_active),
            _ => 0,
        }
    }

    /// Shooter with the highest score, `None` on a tie or an empty board
    pub fn leader(&self) -> Option<ShooterId> {
        let best = self.shooters.iter().map(|s| s.score).max()?;
        let mut leaders = self
            .shooters
            .iter()
            .enumerate()
            .filter(|(_, s)| s.score == best);
        let (index, _) = leaders.next()?;
        if leaders.next().is_some() {
            return None;
        }
        Some(ShooterId(index as u8))
    }

    /// "P1 12 - P2 9" style summary
    pub fn summary(&self) -> String {
        self.shooters
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{} {}", ShooterId(i as u8), s.score))
            .collect::<Vec<_>>()
            .join(" - ")
    }
}
