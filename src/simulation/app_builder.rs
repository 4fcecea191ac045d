//! Headless App Builder
//!
//! Provides a reusable builder for creating headless Bevy apps that play a
//! shot match. Used by the simulation runner, the main binary and tests.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::ai::{AiPower, AiProfile};
use crate::constants::*;
use crate::countdown::{MatchClock, match_active, update_match_clock};
use crate::events::{EventBus, update_event_bus_time};
use crate::scoring::ScoreBoard;
use crate::shooting::{
    ShooterId, ShooterProfile, ShotSession, ShotSessions, SignalQueue, TurnManager,
    dispatch_shot_signals, start_ai_shots, step_court, tick_bonus_schedule, tick_shot_sessions,
};
use crate::tuning::ShotTuning;
use crate::world::{BackboardBonus, BonusSchedule, Court, SpotPicker};

/// Points per logged launch arc when arc debugging is on
const DEBUG_ARC_SEGMENTS: usize = 16;

/// Seed offsets so each random stream in a match is independent
const TURN_SEED_SALT: u64 = 0x7475_726e;
const BONUS_SEED_SALT: u64 = 0x626f_6e75;
const SHOOTER_SEED_STRIDE: u64 = 1_000_003;

/// Builder for creating headless Bevy apps
pub struct HeadlessAppBuilder {
    shooters: Vec<AiProfile>,
    tuning: ShotTuning,
    court: Court,
    seed: u64,
    fps: f32,
    match_duration: f32,
    minimal_threads: bool,
    log_events: bool,
    debug_arcs: bool,
}

impl Default for HeadlessAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAppBuilder {
    /// Create a new builder with default settings (two default AI shooters)
    pub fn new() -> Self {
        Self {
            shooters: vec![AiProfile::default(), AiProfile::default()],
            tuning: ShotTuning::default(),
            court: Court::default(),
            seed: 0,
            fps: SIM_FPS,
            match_duration: MATCH_DURATION,
            minimal_threads: false,
            log_events: true,
            debug_arcs: false,
        }
    }

    /// One AI shooter per profile, in `ShooterId` order
    pub fn with_shooters(mut self, shooters: Vec<AiProfile>) -> Self {
        self.shooters = shooters;
        self
    }

    pub fn with_tuning(mut self, tuning: ShotTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_court(mut self, court: Court) -> Self {
        self.court = court;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the simulation step rate (default: 60)
    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_match_duration(mut self, seconds: f32) -> Self {
        self.match_duration = seconds;
        self
    }

    /// Enable minimal thread mode (task pools = 1)
    ///
    /// Use this when running many apps in parallel to avoid hitting OS thread limits.
    pub fn with_minimal_threads(mut self) -> Self {
        self.minimal_threads = true;
        self
    }

    /// Log the sampled arc of every launch at debug level
    pub fn with_arc_debug(mut self, enabled: bool) -> Self {
        self.debug_arcs = enabled;
        self
    }

    /// Drop bus events instead of collecting them
    pub fn without_event_log(mut self) -> Self {
        self.log_events = false;
        self
    }

    fn session_for(&self, index: usize, profile: &AiProfile, queue: &SignalQueue) -> ShotSession {
        let shooter = ShooterId(index as u8);
        let seed = self
            .seed
            .wrapping_add(SHOOTER_SEED_STRIDE.wrapping_mul(index as u64 + 1));
        ShotSession::new(
            shooter,
            Box::new(AiPower::new(profile.clone(), seed)),
            self.tuning.clone(),
            self.court.targets(),
            Vec3::new(0.0, RELEASE_HEIGHT, self.court.hoop_center.z - SPOT_MIN_DISTANCE),
            Box::new(queue.clone()),
        )
        .with_seed(seed.rotate_left(17))
        .with_profile(ShooterProfile::default().with_ai(true))
        .with_arc_debug(if self.debug_arcs { DEBUG_ARC_SEGMENTS } else { 0 })
    }

    /// Build the app with minimal plugins and all match resources
    ///
    /// Time advances by exactly `1 / fps` per `app.update()`. The match clock
    /// is not started; call `begin_match` once match-start events are logged.
    pub fn build(mut self) -> App {
        if let Err(e) = self.tuning.validate() {
            warn!("Invalid shot tuning, using defaults: {}", e);
            self.tuning = ShotTuning::default();
        }

        let mut app = App::new();

        // Note: MinimalPlugins includes TaskPoolPlugin by default
        if self.minimal_threads {
            app.add_plugins(MinimalPlugins.set(TaskPoolPlugin {
                task_pool_options: TaskPoolOptions::with_num_threads(1),
            }));
        } else {
            app.add_plugins(MinimalPlugins);
        }
        let step = Duration::from_secs_f32(1.0 / self.fps.max(1.0));
        app.insert_resource(TimeUpdateStrategy::ManualDuration(step));

        let queue = SignalQueue::new();
        let sessions = self
            .shooters
            .iter()
            .enumerate()
            .map(|(i, profile)| self.session_for(i, profile, &queue))
            .collect();

        app.insert_resource(self.tuning.clone());
        app.insert_resource(self.court);
        app.init_resource::<BackboardBonus>();
        app.insert_resource(BonusSchedule::new(self.seed ^ BONUS_SEED_SALT));
        app.insert_resource(MatchClock::new(self.match_duration));
        app.insert_resource(ScoreBoard::new(self.shooters.len()));
        app.insert_resource(TurnManager::new(
            SpotPicker::new(self.court.hoop_center),
            &self.tuning,
            self.seed ^ TURN_SEED_SALT,
        ));
        app.insert_resource(ShotSessions { sessions });
        app.insert_resource(queue);
        app.insert_resource(if self.log_events {
            EventBus::new()
        } else {
            EventBus::disabled()
        });

        app.add_systems(
            Update,
            (
                update_event_bus_time,
                update_match_clock,
                tick_bonus_schedule,
                start_ai_shots.run_if(match_active),
                tick_shot_sessions,
                step_court,
                dispatch_shot_signals,
            )
                .chain(),
        );

        app
    }
}

/// Give every shooter its first spot and zones, then start the clock
pub fn begin_match(app: &mut App) {
    let world = app.world_mut();
    world.resource_scope(|world, mut sessions: Mut<ShotSessions>| {
        world.resource_scope(|world, mut turns: Mut<TurnManager>| {
            let mut bus = world.resource_mut::<EventBus>();
            for session in sessions.sessions.iter_mut() {
                let shooter = session.shooter();
                match turns.next_turn(session) {
                    Ok(Some(turn)) => bus.emit(turn.event(shooter)),
                    Ok(None) => {}
                    Err(e) => warn!("{} starts with default zones: {}", shooter, e),
                }
            }
        });
    });
    world.resource_mut::<MatchClock>().start();
}
