//! Headless simulation runner

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{AiProfile, AiProfileDatabase};
use crate::countdown::MatchClock;
use crate::events::{EventBus, GameConfig, GameEvent, SqliteEventLogger};
use crate::scoring::ScoreBoard;
use crate::shooting::ShotSessions;
use crate::tuning::{self, ShotTuning};

use super::app_builder::{HeadlessAppBuilder, begin_match};
use super::config::{SimConfig, SimMode};
use super::metrics::{BatchSummary, MatchResult, TournamentResult};
use super::parallel::{init_parallel, run_matches_parallel, tournament_lineups};
use super::zone_sweep::run_zone_sweep;

/// Longest we wait after the final whistle for shots in the air to land
const SETTLE_LIMIT_SECS: f32 = 5.0;

/// Resolve profile names against the database, falling back to the default
/// profile for unknown names
pub fn resolve_profiles(names: &[String], profile_db: &AiProfileDatabase) -> Vec<AiProfile> {
    names
        .iter()
        .map(|name| match profile_db.find(name) {
            Some(profile) => profile.clone(),
            None => {
                warn!("Unknown AI profile '{}', using defaults", name);
                AiProfile {
                    name: name.clone(),
                    ..default()
                }
            }
        })
        .collect()
}

/// Update the app until the clock runs out and every shot in the air has
/// landed (or the settle limit passes). `each_frame` runs after every update.
pub fn play_to_end(app: &mut App, fps: f32, mut each_frame: impl FnMut(&mut App)) {
    let frame = 1.0 / fps.max(1.0);
    let mut settle = 0.0;
    loop {
        app.update();
        each_frame(app);

        if !app.world().resource::<MatchClock>().is_finished() {
            continue;
        }
        // Shots in the air still resolve but score nothing
        settle += frame;
        if app.world().resource::<ShotSessions>().all_idle() || settle >= SETTLE_LIMIT_SECS {
            break;
        }
    }
}

/// Run a single match and return the result
pub fn run_match(
    config: &SimConfig,
    tuning: &ShotTuning,
    seed: u64,
    profile_db: &AiProfileDatabase,
) -> MatchResult {
    run_match_with(config, tuning, seed, profile_db, config.parallel > 0)
}

fn run_match_with(
    config: &SimConfig,
    tuning: &ShotTuning,
    seed: u64,
    profile_db: &AiProfileDatabase,
    minimal_threads: bool,
) -> MatchResult {
    let shooters = resolve_profiles(&config.shooters, profile_db);
    let names: Vec<String> = shooters.iter().map(|p| p.name.clone()).collect();

    let mut builder = HeadlessAppBuilder::new()
        .with_shooters(shooters)
        .with_tuning(tuning.clone())
        .with_seed(seed)
        .with_fps(config.fps)
        .with_match_duration(config.duration_limit);
    if minimal_threads {
        builder = builder.with_minimal_threads();
    }
    let mut app = builder.build();

    {
        let mut bus = app.world_mut().resource_mut::<EventBus>();
        bus.emit(GameEvent::MatchStart {
            seed,
            duration: config.duration_limit,
            profiles: names.clone(),
        });
        bus.emit(GameEvent::Config(GameConfig::from_tuning(
            tuning,
            config.duration_limit,
        )));
    }
    begin_match(&mut app);

    let mut events = Vec::new();
    play_to_end(&mut app, config.fps, |app| {
        events.extend(app.world_mut().resource_mut::<EventBus>().export_events());
    });

    let duration = app.world().resource::<MatchClock>().elapsed;
    let board = app.world().resource::<ScoreBoard>().clone();
    let mut result = MatchResult::from_board(names, &board, duration, seed);

    let end_ms = app.world().resource::<EventBus>().elapsed_ms();
    events.push((
        end_ms,
        GameEvent::MatchEnd {
            duration,
            scores: result.scores.clone(),
        },
    ));
    result.events = events;

    debug!(
        "Match {} finished: {} ({})",
        seed,
        board.summary(),
        result.winner
    );
    result
}

/// Write a batch of results to SQLite, one match row each
pub fn persist_results(logger: &SqliteEventLogger, results: &[MatchResult]) {
    for result in results {
        if logger.start_match(&result.profiles, result.seed).is_none() {
            continue;
        }
        logger.log_events(&result.events);
        logger.end_match(&result.score_board(), result.duration);
    }
}

fn open_logger(config: &SimConfig) -> Option<SqliteEventLogger> {
    let path = config.db_path.as_ref()?;
    match SqliteEventLogger::new(std::path::Path::new(path), "simulation") {
        Ok(logger) => Some(logger),
        Err(e) => {
            warn!("Could not open {}: {}, results will not be stored", path, e);
            None
        }
    }
}

fn write_output<T: serde::Serialize>(value: &T, config: &SimConfig) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to serialize results: {}", e);
            return;
        }
    };
    match &config.output_file {
        Some(output_file) => match std::fs::write(output_file, json) {
            Ok(()) => println!("Results written to {}", output_file),
            Err(e) => eprintln!("Failed to write {}: {}", output_file, e),
        },
        None => println!("{}", json),
    }
}

/// Run a batch sequentially or on the rayon pool
fn run_batch(
    config: &SimConfig,
    tuning: &ShotTuning,
    lineups: Vec<(Vec<String>, u64)>,
    profile_db: &AiProfileDatabase,
) -> Vec<MatchResult> {
    if config.parallel > 0 {
        return run_matches_parallel(config, tuning, &lineups, profile_db);
    }
    let total = lineups.len();
    let mut results = Vec::with_capacity(total);
    for (i, (shooters, seed)) in lineups.into_iter().enumerate() {
        if !config.quiet {
            print!("\rMatch {}/{}...", i + 1, total);
            use std::io::Write;
            std::io::stdout().flush().ok();
        }
        let match_config = SimConfig {
            shooters,
            ..config.clone()
        };
        results.push(run_match_with(&match_config, tuning, seed, profile_db, false));
    }
    if !config.quiet {
        println!("\rCompleted {} matches.", total);
    }
    results
}

pub fn run_simulation(config: SimConfig) {
    let tuning = tuning::load_or_default(&config.tuning_file);
    let profile_db = AiProfileDatabase::load_from_file(&config.profiles_file);
    let logger = open_logger(&config);
    let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
    init_parallel(config.parallel);

    match &config.mode {
        SimMode::Single => {
            if !config.quiet {
                println!(
                    "Running single match: {} (seed: {})",
                    config.shooters.join(" vs "),
                    base_seed
                );
            }
            let result = run_match(&config, &tuning, base_seed, &profile_db);
            if let Some(logger) = &logger {
                persist_results(logger, std::slice::from_ref(&result));
            }
            write_output(&result, &config);
        }

        SimMode::MultiMatch { count } => {
            if !config.quiet {
                println!("Running {} matches: {}", count, config.shooters.join(" vs "));
            }
            let lineups = (0..*count)
                .map(|i| (config.shooters.clone(), base_seed.wrapping_add(i as u64)))
                .collect();
            let results = run_batch(&config, &tuning, lineups, &profile_db);
            if let Some(logger) = &logger {
                persist_results(logger, &results);
            }

            let summary = BatchSummary::from_results(&results);
            println!("{}", summary.format_table(&config.shooters));
            if config.output_file.is_some() {
                write_output(&results, &config);
            }
        }

        SimMode::Tournament { matches_per_pair } => {
            let profiles: Vec<String> = if config.profiles.is_empty() {
                profile_db.names().into_iter().map(str::to_string).collect()
            } else {
                config
                    .profiles
                    .iter()
                    .filter(|p| profile_db.find(p).is_some())
                    .cloned()
                    .collect()
            };
            if profiles.len() < 2 {
                eprintln!("Tournament needs at least two known profiles");
                return;
            }
            if !config.quiet {
                println!(
                    "Running tournament: {} profiles, {} matches per pair",
                    profiles.len(),
                    matches_per_pair
                );
            }

            let lineups = tournament_lineups(&profiles, *matches_per_pair, base_seed);
            let results = run_batch(&config, &tuning, lineups, &profile_db);
            if let Some(logger) = &logger {
                persist_results(logger, &results);
            }

            let mut tournament = TournamentResult::new();
            tournament.matches = results;
            tournament.calculate_win_rates();
            println!("{}", tournament.format_table(&profiles));
            if config.output_file.is_some() {
                write_output(&tournament, &config);
            }
        }

        SimMode::ZoneSweep { shots_per_bucket } => {
            if !config.quiet {
                println!(
                    "Zone sweep: {} distances x {} powers, {} shots each",
                    config.sweep_distance_steps, config.sweep_power_steps, shots_per_bucket
                );
            }
            let sweep = run_zone_sweep(
                &tuning,
                config.sweep_distance_steps,
                config.sweep_power_steps,
                *shots_per_bucket,
                base_seed,
            );
            println!("{}", sweep.format_table());
            if config.output_file.is_some() {
                write_output(&sweep, &config);
            }
        }
    }
}
