//! Error types for the shot engine

use std::fmt;

/// Errors raised by the solver, zone assignment and configuration loading.
///
/// Gameplay conditions that are expected during play (a second swipe while a
/// shot is in flight, a swipe below the power floor) are not errors; they come
/// back as explicit outcome values instead.
#[derive(Clone, Debug, PartialEq)]
pub enum ShotError {
    /// Flight time must be finite and strictly positive
    InvalidFlightTime { flight_time: f32 },
    /// Gravity magnitude must be finite and non-negative
    InvalidGravity { gravity: f32 },
    /// Zone widths outside the supported ranges
    InvalidZoneWidths { perfect_width: f32, bank_width: f32 },
    /// Zone boundaries violate `min_perfect <= max_perfect < min_bank <= max_bank`
    InvalidProfile {
        min_perfect: f32,
        max_perfect: f32,
        min_bank: f32,
        max_bank: f32,
    },
    /// Configuration value out of range or unreadable
    Config(String),
}

impl fmt::Display for ShotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFlightTime { flight_time } => {
                write!(f, "flight time must be positive (got {})", flight_time)
            }
            Self::InvalidGravity { gravity } => {
                write!(f, "gravity must be non-negative (got {})", gravity)
            }
            Self::InvalidZoneWidths {
                perfect_width,
                bank_width,
            } => write!(
                f,
                "zone widths out of range (perfect {}, bank {})",
                perfect_width, bank_width
            ),
            Self::InvalidProfile {
                min_perfect,
                max_perfect,
                min_bank,
                max_bank,
            } => write!(
                f,
                "zones out of order: perfect {}..{}, bank {}..{}",
                min_perfect, max_perfect, min_bank, max_bank
            ),
            Self::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for ShotError {}
