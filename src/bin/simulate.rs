//! Shot Simulation Tool - headless AI matches and zone sweeps
//!
//! Usage:
//!   cargo run --bin simulate -- --help
//!   cargo run --bin simulate -- --shooters Balanced,Sniper --seed 42
//!   cargo run --bin simulate -- --tournament 10 --parallel 8 --db sims.db
//!   cargo run --bin simulate -- --zone-sweep 100

use hoopshot::debug_logging::LogSettings;
use hoopshot::simulation::{SimConfig, run_simulation};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut log_settings = LogSettings::load_with_args(&args);
    if !LogSettings::enabled_from_args(&args) {
        // Hundreds of matches at info level drown the summary
        log_settings.level = "warn".to_string();
    }
    log_settings.install();

    let config = SimConfig::from_args();
    run_simulation(config);
}
