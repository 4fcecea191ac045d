//! Parallel simulation execution
//!
//! Uses Rayon to run multiple matches concurrently.
//! Each match runs in its own Bevy app with minimal threading
//! to avoid hitting OS thread limits.

use bevy::prelude::*;
use rayon::prelude::*;

use crate::ai::AiProfileDatabase;
use crate::tuning::ShotTuning;

use super::config::SimConfig;
use super::metrics::MatchResult;
use super::runner::run_match;

/// Initialize parallel execution with the given thread count.
/// Call this once at startup before running parallel simulations.
pub fn init_parallel(threads: usize) {
    if threads == 0 {
        // Rayon's default (auto-detect)
        return;
    }
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        warn!("Could not size the Rayon pool to {} threads: {}", threads, e);
    }
}

/// Run multiple matches in parallel
///
/// Each entry is a lineup (profile per shooter) and its seed.
/// Returns results in the same order as `lineups`.
pub fn run_matches_parallel(
    base_config: &SimConfig,
    tuning: &ShotTuning,
    lineups: &[(Vec<String>, u64)],
    profile_db: &AiProfileDatabase,
) -> Vec<MatchResult> {
    lineups
        .par_iter()
        .map(|(shooters, seed)| {
            let config = SimConfig {
                shooters: shooters.clone(),
                // Forces minimal threads inside each app
                parallel: base_config.parallel.max(1),
                ..base_config.clone()
            };
            run_match(&config, tuning, *seed, profile_db)
        })
        .collect()
}

/// Every ordered pair of distinct profiles, `matches_per_pair` times each,
/// with consecutive seeds from `base_seed + 1`
pub fn tournament_lineups(
    profiles: &[String],
    matches_per_pair: u32,
    base_seed: u64,
) -> Vec<(Vec<String>, u64)> {
    let mut lineups = Vec::new();
    let mut match_num = 0u64;
    for first in profiles {
        for second in profiles {
            if first == second {
                continue;
            }
            for _ in 0..matches_per_pair {
                match_num += 1;
                lineups.push((
                    vec![first.clone(), second.clone()],
                    base_seed.wrapping_add(match_num),
                ));
            }
        }
    }
    lineups
}
