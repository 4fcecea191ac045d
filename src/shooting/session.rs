//! Shot session - one shooter's shot lifecycle
//!
//! Idle -> Charging -> Launched -> Grounded -> Idle, with an early return to
//! Idle when the swipe is too weak. The session owns the ball body and the
//! flight flags; collisions and hoop triggers are fed in from outside.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::bank_assist::spin_axis;
use super::{
    BankAssist, Classification, OutcomeKind, PowerSource, ShooterId, ShooterProfile, ShotLaunched,
    ShotObserver, ShotOutcome, ShotResolved, ShotTargets, classify, sample_arc,
    solve_launch_velocity,
};
use crate::constants::*;
use crate::error::ShotError;
use crate::tuning::ShotTuning;
use crate::world::BallBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShotPhase {
    #[default]
    Idle,
    Charging,
    Launched,
    /// Ball hit the reset height; the next tick finishes the shot
    Grounded,
}

/// Flags for the shot currently in the air
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightState {
    pub is_launched: bool,
    pub perfect_shot: bool,
    pub hit_bonus_backboard: bool,
    pub bonus_points: u32,
    pub passed_top_trigger: bool,
    pub pending_bank_assist: bool,
    /// `shot_resolved` already went out for this shot
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Already charging or a shot is in flight
    ConcurrentShotAttempt,
    MatchInactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeStart {
    Started,
    Ignored(IgnoreReason),
}

/// What a release did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    Launched(ShotOutcome),
    /// Below the power floor; ball back in hand, no signals besides `shot_aborted`
    NoShot { power: f32 },
    /// Nothing was charging
    Ignored,
}

/// Something the ball bumped into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceContact {
    /// `bonus_points` is set while the bonus board is lit
    Backboard { bonus_points: Option<u32> },
    /// Rim, floor, anything that does not affect the shot state
    Other,
}

/// Result of a change that is only allowed between shots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOnly {
    Applied,
    /// Session was charging or in flight
    Rejected,
}

pub struct ShotSession {
    shooter: ShooterId,
    phase: ShotPhase,
    power: Box<dyn PowerSource>,
    ball: BallBody,
    flight: FlightState,
    profile: ShooterProfile,
    targets: ShotTargets,
    tuning: ShotTuning,
    rng: StdRng,
    observer: Box<dyn ShotObserver>,
    last_outcome: Option<ShotOutcome>,
    /// Points sampled along each launch for debug output, 0 = off
    arc_segments: usize,
    last_arc: Vec<Vec3>,
}

impl ShotSession {
    pub fn new(
        shooter: ShooterId,
        power: Box<dyn PowerSource>,
        tuning: ShotTuning,
        targets: ShotTargets,
        rest_position: Vec3,
        observer: Box<dyn ShotObserver>,
    ) -> Self {
        Self {
            shooter,
            phase: ShotPhase::Idle,
            power,
            ball: BallBody::at_rest(rest_position),
            flight: FlightState::default(),
            profile: ShooterProfile::default(),
            targets,
            tuning,
            rng: StdRng::seed_from_u64(shooter.0 as u64),
            observer,
            last_outcome: None,
            arc_segments: 0,
            last_arc: Vec::new(),
        }
    }

    /// Seed for the gap-miss coin flip
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Starting zones. An invalid profile is logged and the defaults are kept.
    pub fn with_profile(mut self, profile: ShooterProfile) -> Self {
        match profile.validate() {
            Ok(()) => self.profile = profile,
            Err(e) => warn!("{} keeps default zones: {}", self.shooter, e),
        }
        self
    }

    /// Sample every launch arc into `segments` pieces and log it at debug
    pub fn with_arc_debug(mut self, segments: usize) -> Self {
        self.arc_segments = segments;
        self
    }

    pub fn shooter(&self) -> ShooterId {
        self.shooter
    }

    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    pub fn profile(&self) -> &ShooterProfile {
        &self.profile
    }

    pub fn flight(&self) -> &FlightState {
        &self.flight
    }

    pub fn ball(&self) -> &BallBody {
        &self.ball
    }

    pub fn ball_mut(&mut self) -> &mut BallBody {
        &mut self.ball
    }

    pub fn tuning(&self) -> &ShotTuning {
        &self.tuning
    }

    pub fn targets(&self) -> &ShotTargets {
        &self.targets
    }

    pub fn last_outcome(&self) -> Option<&ShotOutcome> {
        self.last_outcome.as_ref()
    }

    /// Arc of the last launch (empty unless arc debugging is on)
    pub fn last_arc(&self) -> &[Vec3] {
        &self.last_arc
    }

    /// Peak power of the current (or last) charge
    pub fn current_power(&self) -> f32 {
        self.power.peak_power()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == ShotPhase::Idle
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase == ShotPhase::Launched && self.flight.is_launched
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn begin_charge(&mut self, pointer: Vec2, match_active: bool) -> ChargeStart {
        if !match_active {
            return ChargeStart::Ignored(IgnoreReason::MatchInactive);
        }
        if self.phase != ShotPhase::Idle {
            return ChargeStart::Ignored(IgnoreReason::ConcurrentShotAttempt);
        }
        self.power.begin(pointer, &self.profile);
        self.phase = ShotPhase::Charging;
        debug!("{} charging ({})", self.shooter, self.power.label());
        ChargeStart::Started
    }

    /// Feed a pointer position. Returns the peak power while charging.
    pub fn update_pointer(&mut self, pointer: Vec2) -> Option<f32> {
        if self.phase != ShotPhase::Charging || !self.power.accepts_pointer() {
            return None;
        }
        Some(self.power.update_pointer(pointer))
    }

    /// Gesture ended at `pointer`
    pub fn release(&mut self, pointer: Vec2) -> Result<Release, ShotError> {
        if self.phase != ShotPhase::Charging || !self.power.accepts_pointer() {
            return Ok(Release::Ignored);
        }
        self.power.update_pointer(pointer);
        self.launch()
    }

    /// Advance timers. Returns the release when the power source timed out.
    pub fn tick(&mut self, dt: f32) -> Result<Option<Release>, ShotError> {
        match self.phase {
            ShotPhase::Idle => {}
            ShotPhase::Charging => {
                if self.power.tick(dt) {
                    return self.launch().map(Some);
                }
            }
            ShotPhase::Launched => {
                if self.ball.position.y <= self.tuning.ground_reset_y {
                    self.phase = ShotPhase::Grounded;
                }
            }
            ShotPhase::Grounded => self.finish_shot(),
        }
        Ok(None)
    }

    // =========================================================================
    // Launch
    // =========================================================================

    fn launch(&mut self) -> Result<Release, ShotError> {
        let peak = self.power.peak_power();
        let classification = classify(
            peak,
            &self.profile,
            &self.targets,
            self.tuning.gap_policy,
            &mut self.rng,
        );

        let outcome = match classification {
            Classification::InsufficientPower { power } => {
                self.ball.reset();
                self.flight = FlightState::default();
                self.phase = ShotPhase::Idle;
                info!("{} no shot (power {:.2})", self.shooter, power);
                self.observer.shot_aborted(self.shooter, power);
                return Ok(Release::NoShot { power });
            }
            Classification::Shot(outcome) => outcome,
        };

        let origin = self.ball.position;
        let velocity = match solve_launch_velocity(
            origin,
            outcome.target_point,
            self.tuning.flight_time,
            self.tuning.gravity,
        ) {
            Ok(v) => v,
            Err(e) => {
                self.ball.reset();
                self.phase = ShotPhase::Idle;
                return Err(e);
            }
        };

        self.ball.kinematic = false;
        self.ball.velocity = velocity;
        self.ball.angular_velocity = spin_axis(velocity) * BALL_SPIN_IMPULSE;
        self.flight = FlightState {
            is_launched: true,
            perfect_shot: outcome.kind == OutcomeKind::Perfect,
            pending_bank_assist: outcome.pending_bank_assist,
            ..Default::default()
        };
        self.phase = ShotPhase::Launched;
        self.last_outcome = Some(outcome);

        if self.arc_segments > 0 {
            self.last_arc = sample_arc(
                origin,
                velocity,
                self.tuning.gravity,
                self.tuning.flight_time,
                self.arc_segments,
            );
            debug!("{} arc: {:.2?}", self.shooter, self.last_arc);
        }

        info!(
            "{} shot: {} (power {:.2}, target {:.2?})",
            self.shooter, outcome.kind, outcome.power, outcome.target_point
        );
        self.observer.shot_launched(&ShotLaunched {
            shooter: self.shooter,
            kind: outcome.kind,
            power: outcome.power,
            origin,
            target: outcome.target_point,
            velocity,
        });
        self.observer.camera_follow(self.shooter);
        Ok(Release::Launched(outcome))
    }

    // =========================================================================
    // Flight callbacks
    // =========================================================================

    pub fn on_collision(&mut self, contact: SurfaceContact) -> Result<(), ShotError> {
        if !self.is_in_flight() {
            return Ok(());
        }
        let SurfaceContact::Backboard { bonus_points } = contact else {
            return Ok(());
        };

        if let Some(points) = bonus_points {
            if !self.flight.hit_bonus_backboard {
                self.flight.hit_bonus_backboard = true;
                self.flight.bonus_points = points;
                info!("{} hit the bonus board (+{} if it goes in)", self.shooter, points);
                self.observer.bonus_hit(self.shooter, points);
            }
        }

        if let Some(velocity) = BankAssist::apply(
            &mut self.flight,
            &mut self.ball,
            self.targets.hoop,
            self.tuning.bank_assist_flight_time,
            self.tuning.gravity,
        )? {
            debug!("{} bank assist {:.2?}", self.shooter, velocity);
            self.observer.bank_assist(self.shooter, velocity);
        }
        Ok(())
    }

    /// Ball fell through the rim plane. Perfect shots get pulled onto the hoop axis.
    pub fn on_top_trigger_enter(&mut self, hoop_center: Vec3) {
        if !self.is_in_flight() {
            return;
        }
        self.flight.passed_top_trigger = true;
        if self.flight.perfect_shot {
            self.ball.position = Vec3::new(hoop_center.x, self.ball.position.y, hoop_center.z);
            self.ball.velocity = Vec3::new(0.0, self.ball.velocity.y.min(-0.1), 0.0);
            self.ball.angular_velocity *= 0.5;
        }
    }

    /// Ball left through the net. Counts only after the top trigger.
    pub fn on_bottom_trigger_enter(&mut self) -> bool {
        if !self.is_in_flight() || !self.flight.passed_top_trigger || self.flight.resolved {
            return false;
        }
        self.flight.resolved = true;
        let resolved = self.resolution(true);
        info!(
            "{} scores ({}{})",
            self.shooter,
            resolved.kind,
            if resolved.hit_bonus { ", bonus board" } else { "" }
        );
        self.observer.shot_resolved(&resolved);
        true
    }

    fn resolution(&self, made: bool) -> ShotResolved {
        ShotResolved {
            shooter: self.shooter,
            kind: self
                .last_outcome
                .map(|o| o.kind)
                .unwrap_or(OutcomeKind::MissShort),
            is_perfect: self.flight.perfect_shot,
            hit_bonus: self.flight.hit_bonus_backboard,
            bonus_points: self.flight.bonus_points,
            made,
        }
    }

    fn finish_shot(&mut self) {
        if !self.flight.resolved {
            let resolved = self.resolution(false);
            debug!("{} missed ({})", self.shooter, resolved.kind);
            self.observer.shot_resolved(&resolved);
        }
        self.flight = FlightState::default();
        self.ball.reset();
        self.phase = ShotPhase::Idle;
        self.observer.shot_finished(self.shooter);
        self.observer.camera_reset(self.shooter);
    }

    // =========================================================================
    // Between shots
    // =========================================================================

    /// Install new zones. `is_ai` is kept from the current profile.
    pub fn set_profile(&mut self, zones: ShooterProfile) -> Result<IdleOnly, ShotError> {
        zones.validate()?;
        if !self.is_idle() {
            return Ok(IdleOnly::Rejected);
        }
        self.profile.assign_zones_from(&zones);
        Ok(IdleOnly::Applied)
    }

    /// Move the shooter; the ball goes back in hand at the new spot
    pub fn relocate(&mut self, rest_position: Vec3) -> IdleOnly {
        if !self.is_idle() {
            return IdleOnly::Rejected;
        }
        self.ball.rest_position = rest_position;
        self.ball.reset();
        IdleOnly::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shooting::{GesturePower, ShotSignal, SignalQueue};
    use crate::world::Court;

    const SCREEN: f32 = 1000.0;

    fn session(queue: &SignalQueue) -> ShotSession {
        let tuning = ShotTuning::default();
        ShotSession::new(
            ShooterId(0),
            Box::new(GesturePower::from_tuning(SCREEN, &tuning)),
            tuning,
            Court::default().targets(),
            Vec3::new(0.0, RELEASE_HEIGHT, -6.0),
            Box::new(queue.clone()),
        )
        .with_seed(3)
    }

    /// Swipe length in pixels for a power value (half the screen is full power)
    fn swipe(power: f32) -> Vec2 {
        Vec2::new(0.0, power * SCREEN * 0.5)
    }

    #[test]
    fn test_perfect_release_launches() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        assert_eq!(s.begin_charge(Vec2::ZERO, true), ChargeStart::Started);
        let release = s.release(swipe(0.5)).unwrap();

        let Release::Launched(outcome) = release else {
            panic!("expected launch, got {:?}", release);
        };
        assert_eq!(outcome.kind, OutcomeKind::Perfect);
        assert_eq!(s.phase(), ShotPhase::Launched);
        assert!(s.flight().is_launched);
        assert!(s.flight().perfect_shot);
        assert!(!s.ball().kinematic);

        let signals = queue.drain();
        assert!(matches!(signals[0], ShotSignal::Launched(l) if l.kind == OutcomeKind::Perfect));
        assert_eq!(signals[1], ShotSignal::CameraFollow(ShooterId(0)));
    }

    #[test]
    fn test_weak_swipe_is_no_shot() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        s.begin_charge(Vec2::ZERO, true);
        let release = s.release(swipe(0.05)).unwrap();
        assert!(matches!(release, Release::NoShot { .. }));
        assert_eq!(s.phase(), ShotPhase::Idle);
        assert!(s.ball().is_at_rest());
        assert!(!s.flight().is_launched);
        let signals = queue.drain();
        assert_eq!(signals.len(), 1);
        assert!(matches!(signals[0], ShotSignal::Aborted { .. }));
    }

    #[test]
    fn test_concurrent_and_inactive_starts_are_ignored() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        assert_eq!(
            s.begin_charge(Vec2::ZERO, false),
            ChargeStart::Ignored(IgnoreReason::MatchInactive)
        );
        s.begin_charge(Vec2::ZERO, true);
        s.update_pointer(swipe(0.3));
        assert_eq!(
            s.begin_charge(Vec2::new(0.0, 400.0), true),
            ChargeStart::Ignored(IgnoreReason::ConcurrentShotAttempt)
        );
        // The first gesture is untouched
        assert!((s.current_power() - 0.3).abs() < 1e-5);

        s.release(swipe(0.5)).unwrap();
        assert_eq!(
            s.begin_charge(Vec2::ZERO, true),
            ChargeStart::Ignored(IgnoreReason::ConcurrentShotAttempt)
        );
    }

    #[test]
    fn test_peak_power_used_on_release() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        s.begin_charge(Vec2::ZERO, true);
        s.update_pointer(swipe(0.5));
        // Finger slides back down before lifting
        let release = s.release(swipe(0.2)).unwrap();
        let Release::Launched(outcome) = release else {
            panic!("expected launch");
        };
        assert_eq!(outcome.kind, OutcomeKind::Perfect);
    }

    #[test]
    fn test_timeout_auto_releases() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        s.begin_charge(Vec2::ZERO, true);
        s.update_pointer(swipe(0.75));
        assert_eq!(s.tick(0.5).unwrap(), None);
        let release = s.tick(0.4).unwrap();
        assert!(matches!(release, Some(Release::Launched(o)) if o.kind == OutcomeKind::Bank));
        assert!(s.flight().pending_bank_assist);
    }

    #[test]
    fn test_grounded_then_reset() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        s.begin_charge(Vec2::ZERO, true);
        s.release(swipe(0.2)).unwrap();
        queue.drain();

        s.ball_mut().position.y = -1.5;
        s.tick(0.016).unwrap();
        assert_eq!(s.phase(), ShotPhase::Grounded);
        s.tick(0.016).unwrap();
        assert_eq!(s.phase(), ShotPhase::Idle);
        assert!(s.ball().is_at_rest());
        assert_eq!(*s.flight(), FlightState::default());

        let signals = queue.drain();
        assert!(matches!(signals[0], ShotSignal::Resolved(r) if !r.made && r.kind == OutcomeKind::MissShort));
        assert_eq!(signals[1], ShotSignal::Finished(ShooterId(0)));
        assert_eq!(signals[2], ShotSignal::CameraReset(ShooterId(0)));
    }

    #[test]
    fn test_grounded_at_exact_reset_height() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        s.begin_charge(Vec2::ZERO, true);
        s.release(swipe(0.2)).unwrap();

        let reset_y = s.tuning().ground_reset_y;
        s.ball_mut().position.y = reset_y + 0.01;
        s.tick(0.016).unwrap();
        assert_eq!(s.phase(), ShotPhase::Launched);

        s.ball_mut().position.y = reset_y;
        s.tick(0.016).unwrap();
        assert_eq!(s.phase(), ShotPhase::Grounded);
    }

    #[test]
    fn test_arc_debug_samples_launch() {
        let queue = SignalQueue::new();
        let mut s = session(&queue).with_arc_debug(12);
        let origin = s.ball().position;
        s.begin_charge(Vec2::ZERO, true);
        s.release(swipe(0.5)).unwrap();

        let arc = s.last_arc();
        assert_eq!(arc.len(), 13);
        assert_eq!(arc[0], origin);
        assert!((arc[12] - HOOP_CENTER).length() < 1e-3);

        // Off by default
        let mut plain = session(&queue);
        plain.begin_charge(Vec2::ZERO, true);
        plain.release(swipe(0.5)).unwrap();
        assert!(plain.last_arc().is_empty());
    }

    #[test]
    fn test_with_profile_rejects_invalid_zones() {
        let queue = SignalQueue::new();
        let zones = ShooterProfile::new(0.3, 0.4, 0.5, 0.6);
        assert_eq!(*session(&queue).with_profile(zones).profile(), zones);

        let bad = ShooterProfile::new(0.6, 0.5, 0.7, 0.8);
        assert_eq!(
            *session(&queue).with_profile(bad).profile(),
            ShooterProfile::default()
        );
    }

    #[test]
    fn test_bottom_trigger_requires_top() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        s.begin_charge(Vec2::ZERO, true);
        s.release(swipe(0.5)).unwrap();
        queue.drain();

        assert!(!s.on_bottom_trigger_enter());
        s.on_top_trigger_enter(HOOP_CENTER);
        assert!(s.on_bottom_trigger_enter());
        // Only once per shot
        assert!(!s.on_bottom_trigger_enter());

        s.ball_mut().position.y = -2.0;
        s.tick(0.016).unwrap();
        s.tick(0.016).unwrap();
        let resolved: Vec<_> = queue
            .drain()
            .into_iter()
            .filter(|sig| matches!(sig, ShotSignal::Resolved(_)))
            .collect();
        assert_eq!(resolved.len(), 1);
        assert!(matches!(resolved[0], ShotSignal::Resolved(r) if r.made && r.is_perfect));
    }

    #[test]
    fn test_perfect_magnet_recentres() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        s.begin_charge(Vec2::ZERO, true);
        s.release(swipe(0.5)).unwrap();
        s.ball_mut().position = Vec3::new(0.05, 3.04, -0.08);
        s.ball_mut().velocity = Vec3::new(0.0, 0.3, 5.0);
        s.ball_mut().angular_velocity = Vec3::new(4.0, 0.0, 0.0);

        s.on_top_trigger_enter(HOOP_CENTER);
        assert_eq!(s.ball().position, Vec3::new(0.0, 3.04, 0.0));
        assert_eq!(s.ball().velocity, Vec3::new(0.0, -0.1, 0.0));
        assert_eq!(s.ball().angular_velocity, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_bonus_and_assist_on_backboard() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        s.begin_charge(Vec2::ZERO, true);
        s.release(swipe(0.75)).unwrap();
        queue.drain();

        s.on_collision(SurfaceContact::Backboard { bonus_points: Some(3) }).unwrap();
        assert!(s.flight().hit_bonus_backboard);
        assert_eq!(s.flight().bonus_points, 3);
        assert!(!s.flight().pending_bank_assist);

        // Second touch: no new assist, bonus not re-captured
        s.on_collision(SurfaceContact::Backboard { bonus_points: Some(4) }).unwrap();
        assert_eq!(s.flight().bonus_points, 3);

        let signals = queue.drain();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0], ShotSignal::BonusHit { shooter: ShooterId(0), points: 3 });
        assert!(matches!(signals[1], ShotSignal::BankAssist { .. }));
    }

    #[test]
    fn test_profile_locked_outside_idle() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        let zones = ShooterProfile::new(0.3, 0.4, 0.5, 0.6);
        s.begin_charge(Vec2::ZERO, true);
        assert_eq!(s.set_profile(zones).unwrap(), IdleOnly::Rejected);
        assert_eq!(s.relocate(Vec3::ZERO), IdleOnly::Rejected);
        assert_eq!(*s.profile(), ShooterProfile::default());

        s.release(swipe(0.05)).unwrap();
        assert_eq!(s.set_profile(zones).unwrap(), IdleOnly::Applied);
        assert_eq!(s.profile().min_perfect, 0.3);
        assert!(s.set_profile(ShooterProfile::new(0.5, 0.4, 0.6, 0.7)).is_err());
    }

    #[test]
    fn test_relocate_moves_ball() {
        let queue = SignalQueue::new();
        let mut s = session(&queue);
        let spot = Vec3::new(2.0, RELEASE_HEIGHT, -5.0);
        assert_eq!(s.relocate(spot), IdleOnly::Applied);
        assert_eq!(s.ball().position, spot);
        assert!(s.ball().is_at_rest());
    }
}
