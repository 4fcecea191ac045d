//! Tunable constants for hoopshot
//!
//! All gameplay values are defined here for easy tweaking. Distances are meters,
//! times are seconds, power is normalized to [0, 1].

use bevy::prelude::*;

// =============================================================================
// POWER
// =============================================================================

pub const MIN_SHOT_POWER: f32 = 0.1; // Below this the swipe is discarded (no launch)
pub const MAX_SHOT_POWER: f32 = 1.0;
pub const CHARGE_TIMEOUT: f32 = 0.8; // Max swipe duration before auto release
pub const SCREEN_RANGE_MAX_POWER: f32 = 0.5; // Fraction of screen height for 100% power
pub const SCREEN_RANGE_MIN: f32 = 0.2;
pub const SCREEN_RANGE_MAX: f32 = 1.0;

// =============================================================================
// FLIGHT
// =============================================================================

pub const GRAVITY: f32 = 9.81;
pub const SHOT_FLIGHT_TIME: f32 = 1.2; // Release to target
pub const BANK_ASSIST_FLIGHT_TIME: f32 = 0.4; // Backboard to hoop after the assist
pub const GROUND_RESET_Y: f32 = -1.0; // Ball is reset once it drops to this height
pub const BALL_RADIUS: f32 = 0.12;
pub const BALL_SPIN_IMPULSE: f32 = 5.0; // Cosmetic backspin on release (rad/s)
pub const BANK_ASSIST_SPIN: f32 = 2.0;

// =============================================================================
// ZONE CLASSIFIER OFFSETS (relative to hoop centre)
// =============================================================================

pub const SHORT_Y_OFFSET: (f32, f32) = (-1.0, -0.2); // weakest -> nearly perfect
pub const SHORT_Z_OFFSET: (f32, f32) = (-2.5, -0.6);
pub const LONG_Y_OFFSET: (f32, f32) = (0.5, 1.5); // just past bank -> full power
pub const LONG_Z_OFFSET: (f32, f32) = (0.6, 3.0);
pub const GAP_SIDE_OFFSET: f32 = 0.35; // Rim hit, left or right
pub const GAP_Z_OFFSET: f32 = -0.2;
pub const GAP_Z_OFFSET_FAR: f32 = 0.2; // Distance-interpolated gap: near the bank zone

// =============================================================================
// ZONE ASSIGNMENT
// =============================================================================

pub const IDEAL_POWER_NEAR: f32 = 0.35; // Ideal power at the closest spot
pub const IDEAL_POWER_FAR: f32 = 0.85; // Ideal power at the farthest spot
pub const ZONE_SAFE_CEILING: f32 = 0.95;
pub const ZONE_SAFE_MARGIN: f32 = 0.05;
pub const ZONE_GAP: f32 = 0.1; // Space between perfect and bank zones
pub const BANK_ZONE_MAX_START: f32 = 0.90;
pub const PERFECT_ZONE_WIDTH: f32 = 0.12;
pub const BANK_ZONE_WIDTH: f32 = 0.10;
pub const PERFECT_WIDTH_RANGE: (f32, f32) = (0.02, 0.30);
pub const BANK_WIDTH_RANGE: (f32, f32) = (0.02, 0.20);

// =============================================================================
// COURT
// =============================================================================

pub const HOOP_CENTER: Vec3 = Vec3::new(0.0, 3.05, 0.0);
pub const RIM_RADIUS: f32 = 0.2286;
pub const BACKBOARD_OFFSET: f32 = 0.4; // Board plane behind hoop centre (+z)
pub const BACKBOARD_HALF_WIDTH: f32 = 0.9;
pub const BACKBOARD_BOTTOM: f32 = 2.9;
pub const BACKBOARD_TOP: f32 = 3.95;
pub const BANK_TARGET_HEIGHT: f32 = 0.55; // Above the rim, on the board face
pub const BACKBOARD_RESTITUTION: f32 = 0.6;
pub const BOTTOM_TRIGGER_DEPTH: f32 = 0.35; // Below the rim plane
pub const RELEASE_HEIGHT: f32 = 2.0;

// =============================================================================
// SHOOTING SPOTS
// =============================================================================

pub const SPOT_MIN_DISTANCE: f32 = 4.0;
pub const SPOT_MAX_DISTANCE: f32 = 9.0;
pub const SPOT_MAX_ANGLE: f32 = 45.0; // Half-width of the fan in degrees

// =============================================================================
// MATCH / SCORING
// =============================================================================

pub const MATCH_DURATION: f32 = 60.0;
pub const PERFECT_POINTS: u32 = 3;
pub const BASKET_POINTS: u32 = 2;

// =============================================================================
// BACKBOARD BONUS EVENT
// =============================================================================

pub const BONUS_DELAY_RANGE: (f32, f32) = (8.0, 15.0);
pub const BONUS_DURATION: f32 = 6.0;
pub const BONUS_POINTS_RANGE: (u32, u32) = (2, 4);

// =============================================================================
// AI
// =============================================================================

pub const AI_THINK_MIN: f32 = 1.0;
pub const AI_THINK_MAX: f32 = 2.5;
pub const AI_PERFECT_CHANCE: f32 = 0.4;
pub const AI_BANK_CHANCE: f32 = 0.2;

// =============================================================================
// SIMULATION
// =============================================================================

pub const SIM_FPS: f32 = 60.0;
