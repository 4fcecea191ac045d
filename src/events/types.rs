//! Event type definitions for the logging system

use serde::{Deserialize, Serialize};

use crate::shooting::{OutcomeKind, ShooterId};
use crate::tuning::ShotTuning;

/// Configuration snapshot for analytics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub flight_time: f32,
    pub bank_assist_flight_time: f32,
    pub gravity: f32,
    pub ground_reset_y: f32,
    pub charge_timeout: f32,
    pub screen_range_max_power: f32,
    pub perfect_width: f32,
    pub bank_width: f32,
    pub gap_policy: String,
    pub match_duration: f32,
}

impl GameConfig {
    pub fn from_tuning(tuning: &ShotTuning, match_duration: f32) -> Self {
        let gap_policy = serde_json::to_value(tuning.gap_policy)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        Self {
            flight_time: tuning.flight_time,
            bank_assist_flight_time: tuning.bank_assist_flight_time,
            gravity: tuning.gravity,
            ground_reset_y: tuning.ground_reset_y,
            charge_timeout: tuning.charge_timeout,
            screen_range_max_power: tuning.screen_range_max_power,
            perfect_width: tuning.perfect_width,
            bank_width: tuning.bank_width,
            gap_policy,
            match_duration,
        }
    }
}

/// All game events that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // === Session Events ===
    /// Session started (generated once per launch)
    SessionStart {
        session_id: String, // UUID v4
        timestamp: String,  // ISO 8601
    },
    /// Configuration snapshot (logged after session start)
    Config(GameConfig),

    // === Match Events ===
    MatchStart {
        seed: u64,
        duration: f32,
        /// AI profile name per shooter ("Human" for gesture shooters)
        profiles: Vec<String>,
    },
    MatchEnd {
        duration: f32,
        scores: Vec<u32>,
    },

    // === Turn Events ===
    /// New zones for the shooter's next shot
    ZonesAssigned {
        shooter: ShooterId,
        distance: f32,
        min_perfect: f32,
        max_perfect: f32,
        min_bank: f32,
        max_bank: f32,
    },

    // === Shot Events ===
    /// Charge began at a spot (court x, z)
    ShotStart { shooter: ShooterId, pos: (f32, f32) },
    /// Ball launched
    ShotRelease {
        shooter: ShooterId,
        power: f32,
        kind: OutcomeKind,
    },
    /// Released below the power floor
    NoShot { shooter: ShooterId, power: f32 },
    BankAssist { shooter: ShooterId },
    BonusHit { shooter: ShooterId, points: u32 },
    /// Basket scored
    Goal {
        shooter: ShooterId,
        points: u32,
        score: u32,
    },
    /// Shot landed without a basket
    Miss {
        shooter: ShooterId,
        kind: OutcomeKind,
    },
    /// Ball back in hand
    ShotFinished { shooter: ShooterId },

    // === Backboard Bonus ===
    BonusActive { points: u32 },
    BonusEnd,
}

impl GameEvent {
    /// Shooter the event belongs to, `None` for match-wide events
    pub fn shooter(&self) -> Option<ShooterId> {
        match self {
            GameEvent::ZonesAssigned { shooter, .. }
            | GameEvent::ShotStart { shooter, .. }
            | GameEvent::ShotRelease { shooter, .. }
            | GameEvent::NoShot { shooter, .. }
            | GameEvent::BankAssist { shooter }
            | GameEvent::BonusHit { shooter, .. }
            | GameEvent::Goal { shooter, .. }
            | GameEvent::Miss { shooter, .. }
            | GameEvent::ShotFinished { shooter } => Some(*shooter),
            _ => None,
        }
    }

    /// Get the event type code for compact serialization
    pub fn type_code(&self) -> &'static str {
        match self {
            GameEvent::SessionStart { .. } => "SE",
            GameEvent::Config(_) => "CF",
            GameEvent::MatchStart { .. } => "MS",
            GameEvent::MatchEnd { .. } => "ME",
            GameEvent::ZonesAssigned { .. } => "ZA",
            GameEvent::ShotStart { .. } => "SS",
            GameEvent::ShotRelease { .. } => "SR",
            GameEvent::NoShot { .. } => "NS",
            GameEvent::BankAssist { .. } => "BA",
            GameEvent::BonusHit { .. } => "BH",
            GameEvent::Goal { .. } => "G",
            GameEvent::Miss { .. } => "MI",
            GameEvent::ShotFinished { .. } => "SF",
            GameEvent::BonusActive { .. } => "B+",
            GameEvent::BonusEnd => "B-",
        }
    }
}
