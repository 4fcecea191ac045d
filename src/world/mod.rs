//! Reference court: ball body, hoop, backboard and trigger planes
//!
//! Stands in for a physics engine in the headless simulation. Ball flight is
//! exact constant-gravity kinematics; the only collider is the backboard.

mod backboard;
mod positioning;

pub use backboard::*;
pub use positioning::*;

use bevy::prelude::*;

use crate::constants::*;
use crate::error::ShotError;
use crate::helpers::horizontal;
use crate::shooting::{ShotSession, ShotTargets, SurfaceContact};

/// Rigid body for one shooter's ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Kinematic balls sit in the shooter's hand and ignore gravity
    pub kinematic: bool,
    /// Where the ball goes back to after a shot
    pub rest_position: Vec3,
}

impl BallBody {
    pub fn at_rest(rest_position: Vec3) -> Self {
        Self {
            position: rest_position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            kinematic: true,
            rest_position,
        }
    }

    /// Back in hand: kinematic, still, at the rest position
    pub fn reset(&mut self) {
        self.position = self.rest_position;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.kinematic = true;
    }

    pub fn is_at_rest(&self) -> bool {
        self.kinematic && self.position == self.rest_position && self.velocity == Vec3::ZERO
    }

    /// Advance one step under gravity. Kinematic balls do not move.
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        if self.kinematic || dt <= 0.0 {
            return;
        }
        self.position += self.velocity * dt + Vec3::new(0.0, -0.5 * gravity * dt * dt, 0.0);
        self.velocity.y -= gravity * dt;
    }
}

/// What the ball touched during one `Court::step`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourtContacts {
    pub backboard: bool,
    pub top_trigger: bool,
    pub bottom_trigger: bool,
}

/// Hoop and backboard geometry. The backboard face is the plane
/// `z = backboard_z`; shooters stand on the -Z side.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Court {
    pub hoop_center: Vec3,
    pub rim_radius: f32,
    pub backboard_z: f32,
    pub backboard_half_width: f32,
    pub backboard_bottom: f32,
    pub backboard_top: f32,
    pub backboard_restitution: f32,
    /// Distance of the bottom trigger plane below the rim
    pub bottom_trigger_depth: f32,
    pub ball_radius: f32,
}

impl Default for Court {
    fn default() -> Self {
        Self {
            hoop_center: HOOP_CENTER,
            rim_radius: RIM_RADIUS,
            backboard_z: HOOP_CENTER.z + BACKBOARD_OFFSET,
            backboard_half_width: BACKBOARD_HALF_WIDTH,
            backboard_bottom: BACKBOARD_BOTTOM,
            backboard_top: BACKBOARD_TOP,
            backboard_restitution: BACKBOARD_RESTITUTION,
            bottom_trigger_depth: BOTTOM_TRIGGER_DEPTH,
            ball_radius: BALL_RADIUS,
        }
    }
}

impl Court {
    /// Aim points: hoop centre, and the bank spot on the board face above it
    pub fn targets(&self) -> ShotTargets {
        ShotTargets {
            hoop: self.hoop_center,
            bank: Vec3::new(
                self.hoop_center.x,
                self.hoop_center.y + BANK_TARGET_HEIGHT,
                self.backboard_z,
            ),
        }
    }

    pub fn top_trigger_y(&self) -> f32 {
        self.hoop_center.y
    }

    pub fn bottom_trigger_y(&self) -> f32 {
        self.hoop_center.y - self.bottom_trigger_depth
    }

    /// Horizontal distance from the hoop axis
    pub fn distance_from_axis(&self, point: Vec3) -> f32 {
        horizontal(point - self.hoop_center).length()
    }

    /// Whether the ball moving `from -> to` touches the board face.
    /// Returns the contact point (ball centre) when it does.
    pub fn backboard_contact(&self, from: Vec3, to: Vec3) -> Option<Vec3> {
        let plane = self.backboard_z - self.ball_radius;
        if !(from.z < plane && to.z >= plane) {
            return None;
        }
        let f = (plane - from.z) / (to.z - from.z);
        let at = from.lerp(to, f);
        let within_width = (at.x - self.hoop_center.x).abs() <= self.backboard_half_width;
        let within_height = at.y >= self.backboard_bottom && at.y <= self.backboard_top;
        (within_width && within_height).then_some(at)
    }

    /// Whether the ball moving `from -> to` falls through the horizontal
    /// plane at `plane_y` inside the rim
    pub fn falls_through(&self, from: Vec3, to: Vec3, plane_y: f32) -> bool {
        if !(from.y > plane_y && to.y <= plane_y) {
            return false;
        }
        let f = (from.y - plane_y) / (from.y - to.y);
        let at = from.lerp(to, f);
        self.distance_from_axis(at) <= self.rim_radius
    }

    /// Integrate one session's ball for `dt` seconds and feed contacts back
    /// into the session. The backboard bounce is applied before the session
    /// hears about it, so a bank assist overrides the rebound.
    pub fn step(
        &self,
        session: &mut ShotSession,
        bonus: &BackboardBonus,
        dt: f32,
    ) -> Result<CourtContacts, ShotError> {
        let mut contacts = CourtContacts::default();
        if !session.is_in_flight() {
            return Ok(contacts);
        }
        let gravity = session.tuning().gravity;

        let from = session.ball().position;
        session.ball_mut().integrate(dt, gravity);
        let to = session.ball().position;

        if let Some(at) = self.backboard_contact(from, to) {
            let ball = session.ball_mut();
            ball.position = at;
            ball.velocity.z = -ball.velocity.z.abs() * self.backboard_restitution;
            contacts.backboard = true;
            session.on_collision(SurfaceContact::Backboard {
                bonus_points: bonus.active_points(),
            })?;
        }

        let to = session.ball().position;
        if self.falls_through(from, to, self.top_trigger_y()) {
            contacts.top_trigger = true;
            session.on_top_trigger_enter(self.hoop_center);
        }

        // Re-read: the top trigger may have recentred the ball
        let to = session.ball().position;
        if self.falls_through(from, to, self.bottom_trigger_y())
            || (contacts.top_trigger && to.y <= self.bottom_trigger_y())
        {
            contacts.bottom_trigger = true;
            session.on_bottom_trigger_enter();
        }

        Ok(contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_matches_closed_form() {
        let mut ball = BallBody::at_rest(Vec3::new(0.0, 2.0, -5.0));
        ball.kinematic = false;
        ball.velocity = Vec3::new(0.0, 6.0, 4.0);
        for _ in 0..60 {
            ball.integrate(1.0 / 60.0, 9.81);
        }
        let expected = crate::shooting::position_at(
            Vec3::new(0.0, 2.0, -5.0),
            Vec3::new(0.0, 6.0, 4.0),
            9.81,
            1.0,
        );
        assert!((ball.position - expected).length() < 1e-3);
    }

    #[test]
    fn test_kinematic_ball_does_not_move() {
        let mut ball = BallBody::at_rest(Vec3::new(1.0, 2.0, 3.0));
        ball.velocity = Vec3::ONE;
        ball.integrate(0.5, 9.81);
        assert_eq!(ball.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_bank_target_on_board_face() {
        let court = Court::default();
        let targets = court.targets();
        assert_eq!(targets.bank.z, court.backboard_z);
        assert!(targets.bank.y > court.backboard_bottom && targets.bank.y < court.backboard_top);
    }

    #[test]
    fn test_backboard_contact_respects_extents() {
        let court = Court::default();
        let plane = court.backboard_z - court.ball_radius;
        let hit = court.backboard_contact(
            Vec3::new(0.0, 3.5, plane - 0.1),
            Vec3::new(0.0, 3.5, plane + 0.1),
        );
        assert!(hit.is_some());
        // Over the top of the board
        assert!(court
            .backboard_contact(Vec3::new(0.0, 4.5, plane - 0.1), Vec3::new(0.0, 4.5, plane + 0.1))
            .is_none());
        // Moving away from the board
        assert!(court
            .backboard_contact(Vec3::new(0.0, 3.5, plane + 0.1), Vec3::new(0.0, 3.5, plane - 0.1))
            .is_none());
    }

    #[test]
    fn test_falls_through_only_downward_inside_rim() {
        let court = Court::default();
        let y = court.top_trigger_y();
        let center = court.hoop_center;
        assert!(court.falls_through(center + Vec3::Y * 0.05, center - Vec3::Y * 0.05, y));
        assert!(!court.falls_through(center - Vec3::Y * 0.05, center + Vec3::Y * 0.05, y));
        let wide = center + Vec3::new(0.35, 0.0, -0.2);
        assert!(!court.falls_through(wide + Vec3::Y * 0.05, wide - Vec3::Y * 0.05, y));
    }
}
