//! Shooting spots - random placement in a fan in front of the hoop

use bevy::prelude::*;
use rand::Rng;

use crate::constants::*;
use crate::helpers::{horizontal, inverse_lerp};

/// A place to shoot from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSpot {
    /// Ball release point
    pub position: Vec3,
    /// Angle off the court's centre line, degrees
    pub angle_deg: f32,
    /// Horizontal distance to the hoop, metres
    pub distance: f32,
}

/// Picks spots in a fan of `±max_angle_deg` around `forward`, between
/// `min_distance` and `max_distance` from the hoop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotPicker {
    pub hoop: Vec3,
    /// Direction from the hoop toward the shooting area (horizontal, unit)
    pub forward: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_angle_deg: f32,
    pub release_height: f32,
}

impl Default for SpotPicker {
    fn default() -> Self {
        Self::new(HOOP_CENTER)
    }
}

impl SpotPicker {
    pub fn new(hoop: Vec3) -> Self {
        Self {
            hoop,
            forward: Vec3::NEG_Z,
            min_distance: SPOT_MIN_DISTANCE,
            max_distance: SPOT_MAX_DISTANCE,
            max_angle_deg: SPOT_MAX_ANGLE,
            release_height: RELEASE_HEIGHT,
        }
    }

    /// Spot at a given angle and distance
    pub fn spot_at(&self, angle_deg: f32, distance: f32) -> ShotSpot {
        let rotation = Quat::from_rotation_y(angle_deg.to_radians());
        let direction = rotation * self.forward;
        let ground = horizontal(self.hoop) + direction * distance;
        ShotSpot {
            position: Vec3::new(ground.x, self.release_height, ground.z),
            angle_deg,
            distance,
        }
    }

    pub fn pick(&self, rng: &mut impl Rng) -> ShotSpot {
        let angle = if self.max_angle_deg > 0.0 {
            rng.gen_range(-self.max_angle_deg..=self.max_angle_deg)
        } else {
            0.0
        };
        let distance = if self.max_distance > self.min_distance {
            rng.gen_range(self.min_distance..=self.max_distance)
        } else {
            self.min_distance
        };
        let spot = self.spot_at(angle, distance);
        debug!("Spot picked at {:.2}m, {:.1} degrees", distance, angle);
        spot
    }

    /// 0 at the closest allowed spot, 1 at the farthest
    pub fn normalized_distance(&self, position: Vec3) -> f32 {
        let distance = horizontal(position - self.hoop).length();
        inverse_lerp(self.min_distance, self.max_distance, distance)
    }
}
