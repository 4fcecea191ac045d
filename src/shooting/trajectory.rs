//! Closed-form projectile solver
//!
//! Given where the ball is, where it must be, and how long the flight lasts,
//! compute the launch velocity under constant downward gravity. Every shot
//! variant (human swipe, AI, bank assist) goes through `solve_launch_velocity`.

use bevy::prelude::*;

use crate::error::ShotError;
use crate::helpers::horizontal;

/// Launch velocity that puts a projectile at `target` exactly `flight_time`
/// seconds after leaving `origin`, with gravity of magnitude `gravity` along -Y.
///
/// Horizontal speed is constant (distance / time along the XZ direction).
/// Vertical speed solves `dy = vy*t - g*t²/2`, i.e. `vy = dy/t + g*t/2`.
/// When origin and target share the same XZ point the horizontal part is zero
/// and the shot is purely vertical.
pub fn solve_launch_velocity(
    origin: Vec3,
    target: Vec3,
    flight_time: f32,
    gravity: f32,
) -> Result<Vec3, ShotError> {
    if !flight_time.is_finite() || flight_time <= 0.0 {
        return Err(ShotError::InvalidFlightTime { flight_time });
    }
    if !gravity.is_finite() || gravity < 0.0 {
        return Err(ShotError::InvalidGravity { gravity });
    }

    let displacement = target - origin;
    let flat = horizontal(displacement);
    let flat_distance = flat.length();

    // normalize_or_zero covers the degenerate straight-up case
    let horizontal_velocity = flat.normalize_or_zero() * (flat_distance / flight_time);
    let vertical_speed = displacement.y / flight_time + 0.5 * gravity * flight_time;

    Ok(Vec3::new(
        horizontal_velocity.x,
        vertical_speed,
        horizontal_velocity.z,
    ))
}

/// Analytic position after `t` seconds of free flight
pub fn position_at(origin: Vec3, velocity: Vec3, gravity: f32, t: f32) -> Vec3 {
    origin + velocity * t + Vec3::new(0.0, -0.5 * gravity * t * t, 0.0)
}

/// Evenly spaced points along the flight, origin and landing included.
/// Used for trajectory previews and debug output.
pub fn sample_arc(
    origin: Vec3,
    velocity: Vec3,
    gravity: f32,
    flight_time: f32,
    segments: usize,
) -> Vec<Vec3> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = (i as f32 / segments as f32) * flight_time;
            position_at(origin, velocity, gravity, t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: Vec3, b: Vec3, tol: f32) {
        assert!(
            (a - b).abs().max_element() <= tol,
            "expected {:?} ~= {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_flat_shot_example() {
        let v = solve_launch_velocity(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 5.0), 1.0, 9.8)
            .unwrap();
        assert_vec_close(v, Vec3::new(0.0, 4.9, 5.0), 1e-5);
    }

    #[test]
    fn test_reaches_target_at_flight_time() {
        let cases = [
            (Vec3::new(0.0, 2.0, -6.0), Vec3::new(0.0, 3.05, 0.0), 1.2, 9.81),
            (Vec3::new(-3.1, 2.0, -4.2), Vec3::new(0.0, 3.05, 0.0), 1.2, 9.81),
            (Vec3::new(2.0, 2.0, -8.5), Vec3::new(0.35, 3.05, -0.2), 0.9, 9.81),
            (Vec3::new(0.0, 3.6, 0.4), Vec3::new(0.0, 3.05, 0.0), 0.4, 9.81),
            (Vec3::new(1.0, 0.5, 1.0), Vec3::new(4.0, -2.0, 7.0), 2.5, 0.0),
        ];
        for (origin, target, t, g) in cases {
            let v = solve_launch_velocity(origin, target, t, g).unwrap();
            assert_vec_close(position_at(origin, v, g, t), target, 1e-4);
        }
    }

    #[test]
    fn test_vertical_only_when_target_overhead() {
        let v = solve_launch_velocity(Vec3::new(1.0, 0.0, 1.0), Vec3::new(1.0, 3.0, 1.0), 1.0, 9.8)
            .unwrap();
        assert_eq!(v.x, 0.0);
        assert_eq!(v.z, 0.0);
        assert!((v.y - (3.0 + 4.9)).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_non_positive_flight_time() {
        for t in [0.0, -1.0, f32::NAN] {
            let result = solve_launch_velocity(Vec3::ZERO, Vec3::X, t, 9.8);
            assert!(matches!(result, Err(ShotError::InvalidFlightTime { .. })));
        }
    }

    #[test]
    fn test_rejects_negative_gravity() {
        let result = solve_launch_velocity(Vec3::ZERO, Vec3::X, 1.0, -9.8);
        assert!(matches!(result, Err(ShotError::InvalidGravity { .. })));
    }

    #[test]
    fn test_sample_arc_endpoints() {
        let origin = Vec3::new(0.0, 2.0, -5.0);
        let target = Vec3::new(0.0, 3.05, 0.0);
        let v = solve_launch_velocity(origin, target, 1.2, 9.81).unwrap();
        let arc = sample_arc(origin, v, 9.81, 1.2, 20);
        assert_eq!(arc.len(), 21);
        assert_vec_close(arc[0], origin, 1e-6);
        assert_vec_close(arc[20], target, 1e-4);
    }
}
