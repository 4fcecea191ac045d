//! Hoopshot - headless AI shootout with full event logging
//!
//! Plays one timed match between AI shooters and stores every event in SQLite.
//!
//! Usage:
//!   cargo run -- [--shooters Balanced,Sniper] [--seed N] [--db hoopshot.db] [--debug-log]

use bevy::prelude::*;
use hoopshot::ai::{AI_PROFILES_FILE, AiProfileDatabase};
use hoopshot::constants::{MATCH_DURATION, SIM_FPS};
use hoopshot::countdown::MatchClock;
use hoopshot::debug_logging::LogSettings;
use hoopshot::events::{
    EventBus, GameConfig, GameEvent, SqliteEventLogger, flush_events_to_sqlite, serialize_event,
};
use hoopshot::simulation::{HeadlessAppBuilder, begin_match, play_to_end, resolve_profiles};
use hoopshot::tuning::{self, SHOT_TUNING_FILE};
use hoopshot::scoring::ScoreBoard;
use rand::Rng;
use std::path::Path;

const DEFAULT_DB: &str = "hoopshot.db";

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Echo bus events as compact lines before they are flushed
fn echo_shot_events(bus: Res<EventBus>, settings: Res<LogSettings>) {
    if !settings.debug_shots {
        return;
    }
    for event in bus.peek() {
        debug!("{}", serialize_event(event.time_ms, &event.event));
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let log_settings = LogSettings::load_with_args(&args);
    log_settings.install();

    let tuning = tuning::load_or_default(SHOT_TUNING_FILE);
    let profile_db = AiProfileDatabase::load_from_file(AI_PROFILES_FILE);

    let names: Vec<String> = match arg_value(&args, "--shooters") {
        Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
        None => (0..2).map(|i| profile_db.get(i).name.clone()).collect(),
    };
    let shooters = resolve_profiles(&names, &profile_db);
    let names: Vec<String> = shooters.iter().map(|p| p.name.clone()).collect();
    let seed = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| rand::thread_rng().r#gen());
    let duration = arg_value(&args, "--duration")
        .and_then(|s| s.parse().ok())
        .unwrap_or(MATCH_DURATION);

    let mut app = HeadlessAppBuilder::new()
        .with_shooters(shooters)
        .with_tuning(tuning.clone())
        .with_seed(seed)
        .with_match_duration(duration)
        .with_arc_debug(log_settings.debug_shots)
        .build();

    let db_path = arg_value(&args, "--db").unwrap_or(DEFAULT_DB);
    let logger = match SqliteEventLogger::new(Path::new(db_path), "match") {
        Ok(logger) => logger,
        Err(e) => {
            warn!("Could not open {}: {}, events will not be stored", db_path, e);
            SqliteEventLogger::disabled()
        }
    };
    let config = GameConfig::from_tuning(&tuning, duration);
    logger.record_config(&config);
    logger.start_match(&names, seed);

    {
        let mut bus = app.world_mut().resource_mut::<EventBus>();
        bus.emit(GameEvent::SessionStart {
            session_id: logger.session_id().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        bus.emit(GameEvent::MatchStart {
            seed,
            duration,
            profiles: names.clone(),
        });
        bus.emit(GameEvent::Config(config));
    }

    app.insert_resource(log_settings);
    app.insert_resource(logger);
    app.add_systems(PostUpdate, echo_shot_events);
    app.add_systems(Last, flush_events_to_sqlite);

    info!("{} (seed {})", names.join(" vs "), seed);
    begin_match(&mut app);
    play_to_end(&mut app, SIM_FPS, |_| {});

    let elapsed = app.world().resource::<MatchClock>().elapsed;
    let board = app.world().resource::<ScoreBoard>().clone();
    let end = GameEvent::MatchEnd {
        duration: elapsed,
        scores: board.shooters.iter().map(|s| s.score).collect(),
    };
    let end_ms = app.world().resource::<EventBus>().elapsed_ms();
    let logger = app.world().resource::<SqliteEventLogger>();
    logger.log_event(end_ms, &end);
    logger.end_match(&board, elapsed);

    for (i, stats) in board.shooters.iter().enumerate() {
        info!(
            "P{} {}: {} pts, {}/{} made ({} perfect, {} bank, {} bonus), {} no-shots",
            i + 1,
            names.get(i).map(String::as_str).unwrap_or("?"),
            stats.score,
            stats.makes,
            stats.attempts,
            stats.perfects,
            stats.banks,
            stats.bonus_hits,
            stats.no_shots
        );
    }
    match board.leader() {
        Some(winner) => info!("Winner: {} ({})", winner, board.summary()),
        None => info!("Tie ({})", board.summary()),
    }
}
