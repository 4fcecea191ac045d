//! Bank assist - steer a bank shot off the backboard into the hoop

use bevy::prelude::*;

use super::{FlightState, solve_launch_velocity};
use crate::constants::BANK_ASSIST_SPIN;
use crate::error::ShotError;
use crate::world::BallBody;

pub struct BankAssist;

impl BankAssist {
    /// Replace the rebound with a short shot from the contact point to the hoop.
    ///
    /// Only fires while `pending_bank_assist` is set and clears it, so a shot
    /// gets at most one assist however many times it touches the board.
    /// Returns the new velocity when the assist fired.
    pub fn apply(
        flight: &mut FlightState,
        ball: &mut BallBody,
        hoop: Vec3,
        assist_flight_time: f32,
        gravity: f32,
    ) -> Result<Option<Vec3>, ShotError> {
        if !flight.pending_bank_assist {
            return Ok(None);
        }
        flight.pending_bank_assist = false;

        ball.velocity = Vec3::ZERO;
        ball.angular_velocity = Vec3::ZERO;

        let velocity = solve_launch_velocity(ball.position, hoop, assist_flight_time, gravity)?;
        ball.velocity = velocity;
        ball.angular_velocity = spin_axis(velocity) * BANK_ASSIST_SPIN;
        Ok(Some(velocity))
    }
}

/// Backspin axis for a ball travelling along `velocity`
pub(crate) fn spin_axis(velocity: Vec3) -> Vec3 {
    let facing = Vec3::new(velocity.x, 0.0, velocity.z).normalize_or_zero();
    Vec3::Y.cross(facing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shooting::position_at;

    fn pending() -> FlightState {
        FlightState {
            is_launched: true,
            pending_bank_assist: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_assist_aims_at_hoop() {
        let hoop = Vec3::new(0.0, 3.05, 0.0);
        let mut flight = pending();
        let mut ball = BallBody::at_rest(Vec3::ZERO);
        ball.kinematic = false;
        ball.position = Vec3::new(0.1, 3.6, 0.28);
        ball.velocity = Vec3::new(0.0, -1.0, -2.0);

        let v = BankAssist::apply(&mut flight, &mut ball, hoop, 0.4, 9.81)
            .unwrap()
            .unwrap();
        assert_eq!(ball.velocity, v);
        let landing = position_at(ball.position, v, 9.81, 0.4);
        assert!((landing - hoop).length() < 1e-4);
        assert!(!flight.pending_bank_assist);
    }

    #[test]
    fn test_assist_fires_once() {
        let hoop = Vec3::new(0.0, 3.05, 0.0);
        let mut flight = pending();
        let mut ball = BallBody::at_rest(Vec3::new(0.0, 3.6, 0.28));
        ball.kinematic = false;

        assert!(BankAssist::apply(&mut flight, &mut ball, hoop, 0.4, 9.81).unwrap().is_some());
        let after_first = ball;
        assert!(BankAssist::apply(&mut flight, &mut ball, hoop, 0.4, 9.81).unwrap().is_none());
        assert_eq!(ball, after_first);
    }

    #[test]
    fn test_no_assist_without_pending_flag() {
        let mut flight = FlightState {
            is_launched: true,
            ..Default::default()
        };
        let mut ball = BallBody::at_rest(Vec3::new(0.0, 3.6, 0.28));
        ball.velocity = Vec3::new(0.0, 0.0, -3.0);
        let result = BankAssist::apply(&mut flight, &mut ball, Vec3::ZERO, 0.4, 9.81).unwrap();
        assert!(result.is_none());
        assert_eq!(ball.velocity, Vec3::new(0.0, 0.0, -3.0));
    }
}
