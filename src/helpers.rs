//! Utility functions for hoopshot

use bevy::prelude::*;

/// Linear interpolation, unclamped
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fraction of the way `x` sits between `a` and `b`, clamped to [0, 1].
/// Returns 0 for an empty interval.
pub fn inverse_lerp(a: f32, b: f32, x: f32) -> f32 {
    let span = b - a;
    if span.abs() <= f32::EPSILON {
        return 0.0;
    }
    ((x - a) / span).clamp(0.0, 1.0)
}

/// Lerp between the two ends of an offset range
pub fn lerp_range(range: (f32, f32), t: f32) -> f32 {
    lerp(range.0, range.1, t)
}

/// Drop the vertical component
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_lerp_clamps() {
        assert_eq!(inverse_lerp(0.1, 0.5, 0.0), 0.0);
        assert_eq!(inverse_lerp(0.1, 0.5, 0.9), 1.0);
        assert!((inverse_lerp(0.1, 0.5, 0.3) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_lerp_empty_interval() {
        assert_eq!(inverse_lerp(0.4, 0.4, 0.4), 0.0);
    }

    #[test]
    fn test_horizontal_strips_y() {
        let v = horizontal(Vec3::new(1.0, 5.0, -2.0));
        assert_eq!(v, Vec3::new(1.0, 0.0, -2.0));
    }
}
