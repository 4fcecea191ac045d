//! Hoopshot - swipe-to-shoot basketball shot engine built on Bevy
//!
//! This crate provides the shot classifier, trajectory solver and shot
//! lifecycle, plus the match, scoring, event logging and simulation layers
//! that run them headless.

// Core modules
pub mod constants;
pub mod countdown;
pub mod debug_logging;
pub mod error;
pub mod events;
pub mod helpers;
pub mod simulation;
pub mod tuning;

// Game logic modules
pub mod ai;
pub mod scoring;
pub mod shooting;
pub mod world;

// Re-export commonly used types for convenience
pub use ai::{AI_PROFILES_FILE, AiChoice, AiPower, AiProfile, AiProfileDatabase};
pub use constants::*;
pub use countdown::{MatchClock, match_active, update_match_clock};
pub use debug_logging::LogSettings;
pub use error::ShotError;
pub use events::{BusEvent, EventBus, GameConfig, GameEvent, SqliteEventLogger};
pub use helpers::*;
pub use scoring::{ScoreBoard, ShooterStats, points_for};
pub use shooting::{
    Classification, GapMissPolicy, GesturePower, NullObserver, OutcomeKind, PowerSource,
    ShooterId, ShooterProfile, ShotObserver, ShotOutcome, ShotPhase, ShotSession, ShotSessions,
    ShotSignal, ShotTargets, SignalQueue, assign_zones, classify, solve_launch_velocity,
};
pub use tuning::{SHOT_TUNING_FILE, ShotTuning};
pub use world::{BackboardBonus, BallBody, BonusSchedule, Court, SpotPicker};
