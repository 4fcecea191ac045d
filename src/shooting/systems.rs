//! Shot systems - drive every `ShotSession` from the Bevy schedule
//!
//! Sessions report through a shared `SignalQueue`; `dispatch_shot_signals`
//! folds the queue into the scoreboard and the event bus once per frame and
//! hands the next turn to shooters whose shot just finished.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{ChargeStart, ShooterId, ShooterProfile, ShotSession, ShotSignal, SignalQueue, assign_zones};
use crate::countdown::MatchClock;
use crate::error::ShotError;
use crate::events::{EventBus, GameEvent};
use crate::scoring::ScoreBoard;
use crate::tuning::ShotTuning;
use crate::world::{BackboardBonus, BonusChange, BonusSchedule, Court, ShotSpot, SpotPicker};

/// All shooters in the match, indexed by `ShooterId`
#[derive(Resource, Default)]
pub struct ShotSessions {
    pub sessions: Vec<ShotSession>,
}

impl ShotSessions {
    pub fn get(&self, shooter: ShooterId) -> Option<&ShotSession> {
        self.sessions.get(shooter.0 as usize)
    }

    pub fn get_mut(&mut self, shooter: ShooterId) -> Option<&mut ShotSession> {
        self.sessions.get_mut(shooter.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// No shot charging or in the air
    pub fn all_idle(&self) -> bool {
        self.sessions.iter().all(|s| s.is_idle())
    }
}

/// Zones and spot handed to a shooter for its next shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn {
    pub spot: ShotSpot,
    pub distance: f32,
    pub zones: ShooterProfile,
}

impl Turn {
    pub fn event(&self, shooter: ShooterId) -> GameEvent {
        GameEvent::ZonesAssigned {
            shooter,
            distance: self.spot.distance,
            min_perfect: self.zones.min_perfect,
            max_perfect: self.zones.max_perfect,
            min_bank: self.zones.min_bank,
            max_bank: self.zones.max_bank,
        }
    }
}

/// Moves shooters between shots and assigns zones for the new spot
#[derive(Resource, Debug, Clone)]
pub struct TurnManager {
    pub picker: SpotPicker,
    pub perfect_width: f32,
    pub bank_width: f32,
    rng: StdRng,
}

impl TurnManager {
    pub fn new(picker: SpotPicker, tuning: &ShotTuning, seed: u64) -> Self {
        Self {
            picker,
            perfect_width: tuning.perfect_width,
            bank_width: tuning.bank_width,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a spot and zones without touching any session
    pub fn plan(&mut self) -> Result<Turn, ShotError> {
        let spot = self.picker.pick(&mut self.rng);
        let distance = self.picker.normalized_distance(spot.position);
        let zones = assign_zones(distance, self.perfect_width, self.bank_width)?;
        Ok(Turn {
            spot,
            distance,
            zones,
        })
    }

    /// Relocate an idle session and install fresh zones.
    /// Returns `None` when the session is busy.
    pub fn next_turn(&mut self, session: &mut ShotSession) -> Result<Option<Turn>, ShotError> {
        if !session.is_idle() {
            return Ok(None);
        }
        let turn = self.plan()?;
        session.relocate(turn.spot.position);
        session.set_profile(turn.zones)?;
        debug!(
            "{} moves to {:.1}m / {:.0} deg, perfect {:.2}-{:.2}, bank {:.2}-{:.2}",
            session.shooter(),
            turn.spot.distance,
            turn.spot.angle_deg,
            turn.zones.min_perfect,
            turn.zones.max_perfect,
            turn.zones.min_bank,
            turn.zones.max_bank
        );
        Ok(Some(turn))
    }
}

// =============================================================================
// SYSTEMS
// =============================================================================

/// Light and expire the bonus board while the match runs
pub fn tick_bonus_schedule(
    time: Res<Time>,
    clock: Res<MatchClock>,
    mut schedule: ResMut<BonusSchedule>,
    mut bonus: ResMut<BackboardBonus>,
    mut bus: ResMut<EventBus>,
) {
    if !clock.is_active() {
        if bonus.active {
            bonus.deactivate();
            bus.emit(GameEvent::BonusEnd);
        }
        return;
    }
    match schedule.tick(time.delta_secs(), &mut bonus) {
        Some(BonusChange::Activated { points }) => {
            info!("Bonus backboard lit: +{} points", points);
            bus.emit(GameEvent::BonusActive { points });
        }
        Some(BonusChange::Expired) => {
            debug!("Bonus backboard off");
            bus.emit(GameEvent::BonusEnd);
        }
        None => {}
    }
}

/// AI shooters start thinking as soon as they have the ball
pub fn start_ai_shots(
    clock: Res<MatchClock>,
    mut sessions: ResMut<ShotSessions>,
    mut bus: ResMut<EventBus>,
) {
    let active = clock.is_active();
    for session in sessions.sessions.iter_mut() {
        if !session.profile().is_ai || !session.is_idle() {
            continue;
        }
        if session.begin_charge(Vec2::ZERO, active) == ChargeStart::Started {
            let at = session.ball().position;
            bus.emit(GameEvent::ShotStart {
                shooter: session.shooter(),
                pos: (at.x, at.z),
            });
        }
    }
}

/// Advance charge timers and ground detection
pub fn tick_shot_sessions(time: Res<Time>, mut sessions: ResMut<ShotSessions>) {
    let dt = time.delta_secs();
    for session in sessions.sessions.iter_mut() {
        if let Err(e) = session.tick(dt) {
            warn!("{} shot failed: {}", session.shooter(), e);
        }
    }
}

/// Move airborne balls through the court
pub fn step_court(
    time: Res<Time>,
    court: Res<Court>,
    bonus: Res<BackboardBonus>,
    mut sessions: ResMut<ShotSessions>,
) {
    let dt = time.delta_secs();
    for session in sessions.sessions.iter_mut() {
        if let Err(e) = court.step(session, &bonus, dt) {
            warn!("{} court step failed: {}", session.shooter(), e);
        }
    }
}

/// Fold queued session signals into score, events and turn hand-off
pub fn dispatch_shot_signals(
    queue: Res<SignalQueue>,
    clock: Res<MatchClock>,
    mut board: ResMut<ScoreBoard>,
    mut bus: ResMut<EventBus>,
    mut sessions: ResMut<ShotSessions>,
    mut turns: ResMut<TurnManager>,
) {
    let active = clock.is_active();
    for signal in queue.drain() {
        let points = board.apply(&signal, active);
        match signal {
            ShotSignal::Launched(launch) => bus.emit(GameEvent::ShotRelease {
                shooter: launch.shooter,
                power: launch.power,
                kind: launch.kind,
            }),
            ShotSignal::Aborted { shooter, power } => {
                bus.emit(GameEvent::NoShot { shooter, power })
            }
            ShotSignal::BankAssist { shooter, .. } => bus.emit(GameEvent::BankAssist { shooter }),
            ShotSignal::BonusHit { shooter, points } => {
                bus.emit(GameEvent::BonusHit { shooter, points })
            }
            ShotSignal::Resolved(resolved) => {
                if resolved.made {
                    bus.emit(GameEvent::Goal {
                        shooter: resolved.shooter,
                        points,
                        score: board.score(resolved.shooter),
                    });
                } else {
                    bus.emit(GameEvent::Miss {
                        shooter: resolved.shooter,
                        kind: resolved.kind,
                    });
                }
            }
            ShotSignal::Finished(shooter) => {
                bus.emit(GameEvent::ShotFinished { shooter });
                let Some(session) = sessions.get_mut(shooter) else {
                    warn!("Finished signal for unknown shooter {}", shooter);
                    continue;
                };
                match turns.next_turn(session) {
                    Ok(Some(turn)) => bus.emit(turn.event(shooter)),
                    Ok(None) => {}
                    Err(e) => warn!("{} keeps old zones: {}", shooter, e),
                }
            }
            ShotSignal::CameraFollow(shooter) => trace!("camera follows {}", shooter),
            ShotSignal::CameraReset(shooter) => trace!("camera back on {}", shooter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiPower, AiProfile};
    use crate::constants::*;

    fn ai_session(queue: &SignalQueue, shooter: u8) -> ShotSession {
        let tuning = ShotTuning::default();
        ShotSession::new(
            ShooterId(shooter),
            Box::new(AiPower::new(AiProfile::default(), 7 + shooter as u64)),
            tuning,
            Court::default().targets(),
            Vec3::new(0.0, RELEASE_HEIGHT, -6.0),
            Box::new(queue.clone()),
        )
    }

    #[test]
    fn test_plan_zones_match_spot() {
        let mut turns = TurnManager::new(SpotPicker::default(), &ShotTuning::default(), 9);
        for _ in 0..50 {
            let turn = turns.plan().unwrap();
            assert!((0.0..=1.0).contains(&turn.distance));
            assert!(turn.zones.validate().is_ok());
            let expected = assign_zones(turn.distance, PERFECT_ZONE_WIDTH, BANK_ZONE_WIDTH).unwrap();
            assert_eq!(turn.zones, expected);
        }
    }

    #[test]
    fn test_next_turn_moves_idle_session() {
        let queue = SignalQueue::new();
        let mut session = ai_session(&queue, 0);
        let mut turns = TurnManager::new(SpotPicker::default(), &ShotTuning::default(), 1);

        let turn = turns.next_turn(&mut session).unwrap().unwrap();
        assert_eq!(session.ball().position, turn.spot.position);
        assert_eq!(session.profile().min_perfect, turn.zones.min_perfect);
        assert_eq!(session.profile().max_bank, turn.zones.max_bank);

        session.begin_charge(Vec2::ZERO, true);
        assert_eq!(turns.next_turn(&mut session).unwrap(), None);
    }

    #[test]
    fn test_zones_event_carries_turn() {
        let mut turns = TurnManager::new(SpotPicker::default(), &ShotTuning::default(), 4);
        let turn = turns.plan().unwrap();
        let GameEvent::ZonesAssigned {
            shooter,
            min_bank,
            ..
        } = turn.event(ShooterId(1))
        else {
            panic!("Wrong event type");
        };
        assert_eq!(shooter, ShooterId(1));
        assert_eq!(min_bank, turn.zones.min_bank);
    }

    #[test]
    fn test_sessions_lookup() {
        let queue = SignalQueue::new();
        let sessions = ShotSessions {
            sessions: vec![ai_session(&queue, 0), ai_session(&queue, 1)],
        };
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions.get(ShooterId(1)).map(|s| s.shooter()), Some(ShooterId(1)));
        assert!(sessions.get(ShooterId(2)).is_none());
        assert!(sessions.all_idle());
    }
}
