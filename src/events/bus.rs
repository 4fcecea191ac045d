//! Event Bus - match timeline shared by the shot systems
//!
//! Shot systems translate session signals into GameEvents on the bus.
//! Binaries drain the bus each frame and hand the events to the SQLite logger;
//! the simulation runner collects them into the match result instead.

use bevy::prelude::*;

use super::types::GameEvent;
use crate::shooting::ShooterId;

/// Timestamped event for the event bus
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    /// Milliseconds since the app started
    pub time_ms: u32,
    pub event: GameEvent,
}

#[derive(Resource, Default)]
pub struct EventBus {
    /// Emitted since the last drain
    pending: Vec<BusEvent>,
    /// Stamp given to everything emitted this frame
    elapsed_ms: u32,
    /// Total accepted over the bus lifetime
    emitted: usize,
    enabled: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Bus that drops everything (zone sweeps, throughput runs)
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Set the stamp for events emitted from now on
    pub fn update_time(&mut self, elapsed_secs: f32) {
        self.elapsed_ms = (elapsed_secs.max(0.0) * 1000.0) as u32;
    }

    pub fn emit(&mut self, event: GameEvent) {
        if !self.enabled {
            return;
        }
        self.emitted += 1;
        self.pending.push(BusEvent {
            time_ms: self.elapsed_ms,
            event,
        });
    }

    pub fn emit_all(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Pending events, oldest first
    pub fn peek(&self) -> &[BusEvent] {
        &self.pending
    }

    /// Pending events for one shooter
    pub fn for_shooter(&self, shooter: ShooterId) -> impl Iterator<Item = &BusEvent> {
        self.pending
            .iter()
            .filter(move |e| e.event.shooter() == Some(shooter))
    }

    pub fn drain(&mut self) -> Vec<BusEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Drain as (time_ms, event) pairs for the logger
    pub fn export_events(&mut self) -> Vec<(u32, GameEvent)> {
        self.drain()
            .into_iter()
            .map(|e| (e.time_ms, e.event))
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn emitted_count(&self) -> usize {
        self.emitted
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

/// System to stamp this frame's events with the app clock
pub fn update_event_bus_time(mut bus: ResMut<EventBus>, time: Res<Time>) {
    bus.update_time(time.elapsed_secs());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shooting::OutcomeKind;

    #[test]
    fn test_emit_and_drain() {
        let mut bus = EventBus::new();
        bus.update_time(1.5);
        bus.emit(GameEvent::ShotRelease {
            shooter: ShooterId(0),
            power: 0.5,
            kind: OutcomeKind::Perfect,
        });
        assert_eq!(bus.pending_count(), 1);

        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time_ms, 1500);
        assert_eq!(bus.pending_count(), 0);
        assert_eq!(bus.emitted_count(), 1);
    }

    #[test]
    fn test_disabled_bus() {
        let mut bus = EventBus::disabled();
        assert!(!bus.is_enabled());
        bus.emit(GameEvent::BonusEnd);
        assert_eq!(bus.pending_count(), 0);
        assert_eq!(bus.emitted_count(), 0);
    }

    #[test]
    fn test_export_keeps_order() {
        let mut bus = EventBus::new();
        bus.emit_all([GameEvent::BonusActive { points: 3 }, GameEvent::BonusEnd]);
        let exported = bus.export_events();
        assert_eq!(
            exported,
            vec![(0, GameEvent::BonusActive { points: 3 }), (0, GameEvent::BonusEnd)]
        );
        assert!(bus.peek().is_empty());
    }

    #[test]
    fn test_for_shooter_filters() {
        let mut bus = EventBus::new();
        bus.emit(GameEvent::ShotStart {
            shooter: ShooterId(0),
            pos: (0.0, -5.0),
        });
        bus.emit(GameEvent::BonusActive { points: 2 });
        bus.emit(GameEvent::ShotFinished {
            shooter: ShooterId(1),
        });
        bus.emit(GameEvent::BankAssist {
            shooter: ShooterId(0),
        });

        let p1: Vec<_> = bus.for_shooter(ShooterId(0)).map(|e| e.event.type_code()).collect();
        assert_eq!(p1, vec!["SS", "BA"]);
        assert_eq!(bus.for_shooter(ShooterId(1)).count(), 1);
    }
}
