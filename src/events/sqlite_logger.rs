//! SQLite Event Logger - central store for match events
//!
//! Every binary funnels its events through this logger so that matches can be
//! analysed with SQL instead of parsing log files.

use bevy::prelude::*;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

use super::format::serialize_event;
use super::types::{GameConfig, GameEvent};
use crate::scoring::ScoreBoard;

/// Resource for logging events to SQLite
///
/// The connection sits behind a Mutex so the resource stays `Sync`.
#[derive(Resource)]
pub struct SqliteEventLogger {
    /// `None` when logging is disabled
    conn: Option<Mutex<Connection>>,
    session_id: String,
    current_match_id: Mutex<Option<i64>>,
    enabled: bool,
}

impl SqliteEventLogger {
    /// Open (or create) the database at `db_path` and start a session
    pub fn new(db_path: &Path, session_type: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(db_path)?;

        // WAL so analysis queries can run while a simulation writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Self::with_connection(conn, session_type)
    }

    /// Logger backed by a throwaway in-memory database
    pub fn in_memory(session_type: &str) -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open_in_memory()?, session_type)
    }

    fn with_connection(conn: Connection, session_type: &str) -> Result<Self, rusqlite::Error> {
        init_schema(&conn)?;
        let session_id = create_session(&conn, session_type)?;
        Ok(Self {
            conn: Some(Mutex::new(conn)),
            session_id,
            current_match_id: Mutex::new(None),
            enabled: true,
        })
    }

    /// Create a disabled logger (no-op)
    pub fn disabled() -> Self {
        Self {
            conn: None,
            session_id: String::new(),
            current_match_id: Mutex::new(None),
            enabled: false,
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Option<T>) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let conn = self.conn.as_ref()?.lock().ok()?;
        f(&conn)
    }

    /// Store the configuration snapshot on the session row
    pub fn record_config(&self, config: &GameConfig) {
        let json = match serde_json::to_string(config) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize config: {}", e);
                return;
            }
        };
        self.with_conn(|conn| {
            if let Err(e) = conn.execute(
                "UPDATE sessions SET config_json = ?1 WHERE id = ?2",
                params![json, self.session_id],
            ) {
                warn!("Failed to record config: {}", e);
            }
            Some(())
        });
    }

    /// Start a new match and return its ID
    ///
    /// # Arguments
    /// * `profiles` - Profile name per shooter
    /// * `seed` - Random seed for the match
    pub fn start_match(&self, profiles: &[String], seed: u64) -> Option<i64> {
        let match_id = self.with_conn(|conn| {
            // Placeholder result columns, filled in by end_match
            let result = conn.execute(
                r#"INSERT INTO matches
                   (session_id, seed, profiles, scores, duration_secs, winner)
                   VALUES (?1, ?2, ?3, '', 0.0, '')"#,
                params![self.session_id, seed as i64, profiles.join(",")],
            );
            match result {
                Ok(_) => Some(conn.last_insert_rowid()),
                Err(e) => {
                    warn!("Failed to start match: {}", e);
                    None
                }
            }
        })?;

        *self.current_match_id.lock().ok()? = Some(match_id);
        info!("Started match {} ({})", match_id, profiles.join(" vs "));
        Some(match_id)
    }

    /// Log a single event
    pub fn log_event(&self, time_ms: u32, event: &GameEvent) {
        let Some(match_id) = self.current_match_id() else {
            return;
        };
        self.with_conn(|conn| {
            let data = serialize_event(time_ms, event);
            if let Err(e) = conn.execute(
                "INSERT INTO events (match_id, time_ms, event_type, data) VALUES (?1, ?2, ?3, ?4)",
                params![match_id, time_ms, event.type_code(), data],
            ) {
                warn!("Failed to log event: {}", e);
            }
            Some(())
        });
    }

    /// Log multiple events in one transaction
    pub fn log_events(&self, events: &[(u32, GameEvent)]) {
        if events.is_empty() {
            return;
        }
        let Some(match_id) = self.current_match_id() else {
            return;
        };
        self.with_conn(|conn| {
            conn.execute("BEGIN TRANSACTION", []).ok()?;
            for (time_ms, event) in events {
                let data = serialize_event(*time_ms, event);
                let inserted = conn.execute(
                    "INSERT INTO events (match_id, time_ms, event_type, data) VALUES (?1, ?2, ?3, ?4)",
                    params![match_id, time_ms, event.type_code(), data],
                );
                if let Err(e) = inserted {
                    warn!("Failed to log events: {}", e);
                    let _ = conn.execute("ROLLBACK", []);
                    return None;
                }
            }
            let _ = conn.execute("COMMIT", []);
            Some(())
        });
    }

    /// End the current match, recording scores and per-shooter stats
    pub fn end_match(&self, board: &ScoreBoard, duration_secs: f32) {
        let Some(match_id) = self.current_match_id() else {
            return;
        };
        let scores = board
            .shooters
            .iter()
            .map(|s| s.score.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let winner = board
            .leader()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "tie".to_string());

        self.with_conn(|conn| {
            let result = conn.execute(
                "UPDATE matches SET scores = ?1, duration_secs = ?2, winner = ?3 WHERE id = ?4",
                params![scores, duration_secs, winner, match_id],
            );
            if let Err(e) = result {
                warn!("Failed to end match: {}", e);
                return None;
            }

            for (index, stats) in board.shooters.iter().enumerate() {
                if let Err(e) = conn.execute(
                    r#"INSERT INTO shooter_stats
                       (match_id, shooter, score, attempts, makes, perfects, banks,
                        bonus_hits, bonus_points, no_shots)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                    params![
                        match_id,
                        index as i64,
                        stats.score,
                        stats.attempts,
                        stats.makes,
                        stats.perfects,
                        stats.banks,
                        stats.bonus_hits,
                        stats.bonus_points,
                        stats.no_shots,
                    ],
                ) {
                    warn!("Failed to record shooter stats: {}", e);
                }
            }
            info!(
                "Ended match {} ({}, {:.1}s)",
                match_id,
                board.summary(),
                duration_secs
            );
            Some(())
        });

        if let Ok(mut guard) = self.current_match_id.lock() {
            *guard = None;
        }
    }

    /// Get the current match ID (if a match is in progress)
    pub fn current_match_id(&self) -> Option<i64> {
        self.current_match_id.lock().ok().and_then(|g| *g)
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get event count for the current match
    pub fn event_count(&self) -> Option<u64> {
        let match_id = self.current_match_id()?;
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM events WHERE match_id = ?1",
                params![match_id],
                |row| row.get(0),
            )
            .ok()
        })
    }

    /// Event lines of one match in time order
    pub fn match_events(&self, match_id: i64) -> Vec<String> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT data FROM events WHERE match_id = ?1 ORDER BY time_ms, id")
                .ok()?;
            let rows = stmt
                .query_map(params![match_id], |row| row.get::<_, String>(0))
                .ok()?;
            Some(rows.filter_map(Result::ok).collect())
        })
        .unwrap_or_default()
    }
}

/// Initialize the database schema
fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            session_type TEXT NOT NULL,
            config_json TEXT
        );

        CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY,
            session_id TEXT REFERENCES sessions(id),
            seed INTEGER NOT NULL,
            profiles TEXT NOT NULL,
            scores TEXT NOT NULL,
            duration_secs REAL NOT NULL,
            winner TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS shooter_stats (
            id INTEGER PRIMARY KEY,
            match_id INTEGER REFERENCES matches(id),
            shooter INTEGER NOT NULL,
            score INTEGER NOT NULL,
            attempts INTEGER NOT NULL,
            makes INTEGER NOT NULL,
            perfects INTEGER NOT NULL,
            banks INTEGER NOT NULL,
            bonus_hits INTEGER NOT NULL,
            bonus_points INTEGER NOT NULL,
            no_shots INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_matches_session ON matches(session_id);
        CREATE INDEX IF NOT EXISTS idx_shooter_stats_match ON shooter_stats(match_id);

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY,
            match_id INTEGER REFERENCES matches(id),
            time_ms INTEGER NOT NULL,
            event_type TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_events_match ON events(match_id);
        CREATE INDEX IF NOT EXISTS idx_events_type ON events(event_type);
        CREATE INDEX IF NOT EXISTS idx_events_time ON events(match_id, time_ms);
        "#,
    )?;
    Ok(())
}

/// Create a new session and return its ID
fn create_session(conn: &Connection, session_type: &str) -> Result<String, rusqlite::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO sessions (id, created_at, session_type, config_json) VALUES (?1, ?2, ?3, ?4)",
        params![id, created_at, session_type, Option::<String>::None],
    )?;

    Ok(id)
}

/// System to flush EventBus events to SQLite
pub fn flush_events_to_sqlite(
    mut event_bus: ResMut<super::bus::EventBus>,
    logger: Option<Res<SqliteEventLogger>>,
) {
    let Some(logger) = logger else {
        return;
    };

    // Drain even when disabled so the bus does not grow
    let events = event_bus.export_events();
    if logger.is_enabled() && !events.is_empty() {
        logger.log_events(&events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shooting::{OutcomeKind, ShooterId};

    fn profiles() -> Vec<String> {
        vec!["Human".to_string(), "Balanced".to_string()]
    }

    #[test]
    fn test_start_and_end_match() {
        let logger = SqliteEventLogger::in_memory("test").unwrap();
        assert!(!logger.session_id().is_empty());

        let match_id = logger.start_match(&profiles(), 12345);
        assert!(match_id.is_some());
        assert!(logger.current_match_id().is_some());

        let mut board = ScoreBoard::new(2);
        board.shooters[0].score = 5;
        logger.end_match(&board, 60.0);
        assert!(logger.current_match_id().is_none());
    }

    #[test]
    fn test_log_events() {
        let logger = SqliteEventLogger::in_memory("test").unwrap();
        let match_id = logger.start_match(&profiles(), 1).unwrap();

        logger.log_event(100, &GameEvent::ShotStart {
            shooter: ShooterId(0),
            pos: (0.0, -6.0),
        });
        logger.log_event(200, &GameEvent::Goal {
            shooter: ShooterId(0),
            points: 3,
            score: 3,
        });

        assert_eq!(logger.event_count().unwrap(), 2);
        let lines = logger.match_events(match_id);
        assert_eq!(lines[1], "T:00200|G|P1|3|3");
    }

    #[test]
    fn test_batch_log_events() {
        let logger = SqliteEventLogger::in_memory("test").unwrap();
        logger.start_match(&profiles(), 1);

        let events = vec![
            (100, GameEvent::ShotRelease {
                shooter: ShooterId(1),
                power: 0.75,
                kind: OutcomeKind::Bank,
            }),
            (150, GameEvent::BankAssist { shooter: ShooterId(1) }),
            (300, GameEvent::ShotFinished { shooter: ShooterId(1) }),
        ];
        logger.log_events(&events);

        assert_eq!(logger.event_count().unwrap(), 3);
    }

    #[test]
    fn test_events_without_match_are_dropped() {
        let logger = SqliteEventLogger::in_memory("test").unwrap();
        logger.log_event(0, &GameEvent::BonusEnd);
        assert!(logger.event_count().is_none());
    }

    #[test]
    fn test_disabled_logger() {
        let logger = SqliteEventLogger::disabled();
        assert!(!logger.is_enabled());
        assert!(logger.start_match(&profiles(), 0).is_none());

        // Should not panic
        logger.log_event(0, &GameEvent::BonusEnd);
        logger.end_match(&ScoreBoard::new(2), 0.0);
    }
}
