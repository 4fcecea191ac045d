//! Shot simulation module - headless matches for AI and zone tuning
//!
//! Runs matches without rendering, collecting scores, per-shooter stats and
//! the full event stream, and sweeps the power/distance space through the
//! reference court.

pub mod app_builder;
pub mod config;
pub mod metrics;
pub mod parallel;
pub mod runner;
pub mod zone_sweep;

pub use app_builder::{HeadlessAppBuilder, begin_match};
pub use config::{SimConfig, SimMode};
pub use metrics::{BatchSummary, MatchResult, TournamentResult};
pub use parallel::{init_parallel, run_matches_parallel, tournament_lineups};
pub use runner::{persist_results, play_to_end, resolve_profiles, run_match, run_simulation};
pub use zone_sweep::{FixedPower, SweepBucket, SweepResult, run_zone_sweep};
