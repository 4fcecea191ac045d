//! Compact text format for game event serialization
//!
//! Format: `T:NNNNN|CODE|data...`
//! - T:NNNNN = timestamp in milliseconds (5 digits, wraps at 99999)
//! - CODE = event type code
//! - data = pipe-separated values specific to event type
//!
//! Examples:
//! ```text
//! T:00000|MS|12345678|60.0|Balanced,Sniper
//! T:00000|ZA|P1|0.42|0.50|0.62|0.72|0.82
//! T:01320|SS|P1|-2.1,-6.3
//! T:01320|SR|P1|0.55|P
//! T:02410|G|P1|3|3
//! T:04120|SR|P2|0.68|G
//! T:05230|MI|P2|G
//! T:05230|SF|P2
//! T:60000|ME|60.0|3|0
//! ```

use super::types::{GameConfig, GameEvent};
use crate::shooting::{OutcomeKind, ShooterId};

/// Format a float with fixed precision (1 decimal)
fn fmt_f1(v: f32) -> String {
    format!("{:.1}", v)
}

/// Format a position tuple
fn fmt_pos(pos: (f32, f32)) -> String {
    format!("{:.1},{:.1}", pos.0, pos.1)
}

fn fmt_list<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize a GameEvent to compact text format
pub fn serialize_event(time_ms: u32, event: &GameEvent) -> String {
    let ts = format!("T:{:05}", time_ms % 100000);
    let code = event.type_code();

    let data = match event {
        GameEvent::SessionStart {
            session_id,
            timestamp,
        } => format!("{}|{}", session_id, timestamp),
        GameEvent::Config(config) => {
            // Config as compact JSON for easy parsing
            serde_json::to_string(config).unwrap_or_else(|_| "{}".to_string())
        }
        GameEvent::MatchStart {
            seed,
            duration,
            profiles,
        } => format!("{}|{}|{}", seed, fmt_f1(*duration), profiles.join(",")),
        GameEvent::MatchEnd { duration, scores } => {
            format!("{}|{}", fmt_f1(*duration), fmt_list(scores))
        }
        GameEvent::ZonesAssigned {
            shooter,
            distance,
            min_perfect,
            max_perfect,
            min_bank,
            max_bank,
        } => format!(
            "{}|{:.2}|{:.3}|{:.3}|{:.3}|{:.3}",
            shooter, distance, min_perfect, max_perfect, min_bank, max_bank
        ),
        GameEvent::ShotStart { shooter, pos } => format!("{}|{}", shooter, fmt_pos(*pos)),
        GameEvent::ShotRelease {
            shooter,
            power,
            kind,
        } => format!("{}|{:.3}|{}", shooter, power, kind.code()),
        GameEvent::NoShot { shooter, power } => format!("{}|{:.3}", shooter, power),
        GameEvent::BankAssist { shooter } => shooter.to_string(),
        GameEvent::BonusHit { shooter, points } => format!("{}|{}", shooter, points),
        GameEvent::Goal {
            shooter,
            points,
            score,
        } => format!("{}|{}|{}", shooter, points, score),
        GameEvent::Miss { shooter, kind } => format!("{}|{}", shooter, kind.code()),
        GameEvent::ShotFinished { shooter } => shooter.to_string(),
        GameEvent::BonusActive { points } => points.to_string(),
        GameEvent::BonusEnd => String::new(),
    };

    format!("{}|{}|{}", ts, code, data)
}

/// Parse a line back into timestamp and event
pub fn parse_event(line: &str) -> Option<(u32, GameEvent)> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 3 {
        return None;
    }

    let ts_str = parts[0].strip_prefix("T:")?;
    let time_ms: u32 = ts_str.parse().ok()?;

    let code = parts[1];
    let data = &parts[2..];

    let event = match code {
        "SE" if data.len() >= 2 => GameEvent::SessionStart {
            session_id: data[0].to_string(),
            timestamp: data[1].to_string(),
        },
        "CF" if !data.is_empty() => {
            // Rejoin with | in case the JSON contains one
            let json_str = data.join("|");
            let config: GameConfig = serde_json::from_str(&json_str).ok()?;
            GameEvent::Config(config)
        }
        "MS" if data.len() >= 3 => GameEvent::MatchStart {
            seed: data[0].parse().ok()?,
            duration: data[1].parse().ok()?,
            profiles: parse_names(data[2]),
        },
        "ME" if data.len() >= 2 => GameEvent::MatchEnd {
            duration: data[0].parse().ok()?,
            scores: parse_numbers(data[1])?,
        },
        "ZA" if data.len() >= 6 => GameEvent::ZonesAssigned {
            shooter: ShooterId::parse(data[0])?,
            distance: data[1].parse().ok()?,
            min_perfect: data[2].parse().ok()?,
            max_perfect: data[3].parse().ok()?,
            min_bank: data[4].parse().ok()?,
            max_bank: data[5].parse().ok()?,
        },
        "SS" if data.len() >= 2 => GameEvent::ShotStart {
            shooter: ShooterId::parse(data[0])?,
            pos: parse_pos(data[1])?,
        },
        "SR" if data.len() >= 3 => GameEvent::ShotRelease {
            shooter: ShooterId::parse(data[0])?,
            power: data[1].parse().ok()?,
            kind: parse_kind(data[2])?,
        },
        "NS" if data.len() >= 2 => GameEvent::NoShot {
            shooter: ShooterId::parse(data[0])?,
            power: data[1].parse().ok()?,
        },
        "BA" if !data.is_empty() => GameEvent::BankAssist {
            shooter: ShooterId::parse(data[0])?,
        },
        "BH" if data.len() >= 2 => GameEvent::BonusHit {
            shooter: ShooterId::parse(data[0])?,
            points: data[1].parse().ok()?,
        },
        "G" if data.len() >= 3 => GameEvent::Goal {
            shooter: ShooterId::parse(data[0])?,
            points: data[1].parse().ok()?,
            score: data[2].parse().ok()?,
        },
        "MI" if data.len() >= 2 => GameEvent::Miss {
            shooter: ShooterId::parse(data[0])?,
            kind: parse_kind(data[1])?,
        },
        "SF" if !data.is_empty() => GameEvent::ShotFinished {
            shooter: ShooterId::parse(data[0])?,
        },
        "B+" if !data.is_empty() => GameEvent::BonusActive {
            points: data[0].parse().ok()?,
        },
        "B-" => GameEvent::BonusEnd,
        _ => return None,
    };

    Some((time_ms, event))
}

fn parse_kind(s: &str) -> Option<OutcomeKind> {
    let mut chars = s.chars();
    let code = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    OutcomeKind::from_code(code)
}

fn parse_names(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split(',').map(str::to_string).collect()
}

fn parse_numbers(s: &str) -> Option<Vec<u32>> {
    if s.is_empty() {
        return Some(Vec::new());
    }
    s.split(',').map(|n| n.parse().ok()).collect()
}

fn parse_pos(s: &str) -> Option<(f32, f32)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return None;
    }
    Some((parts[0].parse().ok()?, parts[1].parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_line() {
        let event = GameEvent::Goal {
            shooter: ShooterId(0),
            points: 3,
            score: 9,
        };
        let line = serialize_event(2410, &event);
        assert_eq!(line, "T:02410|G|P1|3|9");
        assert_eq!(parse_event(&line), Some((2410, event)));
    }

    #[test]
    fn test_shot_release_uses_outcome_code() {
        let line = serialize_event(
            1320,
            &GameEvent::ShotRelease {
                shooter: ShooterId(1),
                power: 0.62,
                kind: OutcomeKind::MissGap,
            },
        );
        assert_eq!(line, "T:01320|SR|P2|0.620|G");
        let (_, parsed) = parse_event(&line).unwrap();
        let GameEvent::ShotRelease { kind, power, .. } = parsed else {
            panic!("Wrong event type");
        };
        assert_eq!(kind, OutcomeKind::MissGap);
        assert!((power - 0.62).abs() < 1e-3);
    }

    #[test]
    fn test_match_lines() {
        let start = GameEvent::MatchStart {
            seed: 42,
            duration: 60.0,
            profiles: vec!["Balanced".to_string(), "Sniper".to_string()],
        };
        let end = GameEvent::MatchEnd {
            duration: 60.0,
            scores: vec![12, 7],
        };
        assert_eq!(serialize_event(0, &start), "T:00000|MS|42|60.0|Balanced,Sniper");
        assert_eq!(parse_event(&serialize_event(0, &start)), Some((0, start)));
        assert_eq!(parse_event(&serialize_event(60000, &end)), Some((60000, end)));
    }

    #[test]
    fn test_bonus_end_has_empty_data() {
        let line = serialize_event(500, &GameEvent::BonusEnd);
        assert_eq!(line, "T:00500|B-|");
        assert_eq!(parse_event(&line), Some((500, GameEvent::BonusEnd)));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = GameConfig::from_tuning(&crate::tuning::ShotTuning::default(), 60.0);
        assert_eq!(config.gap_policy, "fixed");
        let line = serialize_event(0, &GameEvent::Config(config.clone()));
        assert_eq!(parse_event(&line), Some((0, GameEvent::Config(config))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_event("nonsense").is_none());
        assert!(parse_event("T:00010|SR|P1|0.5|X").is_none());
        assert!(parse_event("T:00010|ZZ|P1").is_none());
    }
}
