//! Simulation configuration

use serde::{Deserialize, Serialize};

use crate::ai::AI_PROFILES_FILE;
use crate::constants::{MATCH_DURATION, SIM_FPS};
use crate::tuning::SHOT_TUNING_FILE;

/// Simulation mode
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SimMode {
    /// Run a single match
    #[default]
    Single,
    /// Run multiple matches with the same lineup
    MultiMatch { count: u32 },
    /// Run every ordered pair of profiles against each other
    Tournament { matches_per_pair: u32 },
    /// Fire every power bucket from every distance bucket at the reference court
    ZoneSweep { shots_per_bucket: u32 },
}

/// Configuration for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulation mode
    pub mode: SimMode,
    /// AI profile name per shooter (P1, P2, ...)
    pub shooters: Vec<String>,
    /// Profiles to include in a tournament (empty = all profiles)
    pub profiles: Vec<String>,
    /// Match length in seconds
    pub duration_limit: f32,
    /// Fixed simulation step rate
    pub fps: f32,
    /// RNG seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Output file path (None = stdout)
    pub output_file: Option<String>,
    /// Suppress progress output
    pub quiet: bool,
    /// Number of parallel threads (0 = sequential, N = N threads)
    pub parallel: usize,
    /// Path to SQLite database for storing results
    pub db_path: Option<String>,
    /// Shot tuning TOML
    pub tuning_file: String,
    /// AI profile definitions
    pub profiles_file: String,
    /// Zone sweep: number of normalized distance buckets
    pub sweep_distance_steps: u32,
    /// Zone sweep: number of power buckets across [0, 1]
    pub sweep_power_steps: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: SimMode::Single,
            shooters: vec!["Balanced".to_string(), "Balanced".to_string()],
            profiles: Vec::new(), // Empty = all profiles
            duration_limit: MATCH_DURATION,
            fps: SIM_FPS,
            seed: None,
            output_file: None,
            quiet: false,
            parallel: 0, // Sequential by default
            db_path: None,
            tuning_file: SHOT_TUNING_FILE.to_string(),
            profiles_file: AI_PROFILES_FILE.to_string(),
            sweep_distance_steps: 5,
            sweep_power_steps: 20,
        }
    }
}

/// Template simulation settings (checked into git)
pub const SIM_SETTINGS_TEMPLATE: &str = "config/simulation_settings.template.json";
/// Local simulation settings (gitignored, user's custom settings)
pub const SIM_SETTINGS_FILE: &str = "config/simulation_settings.json";

/// Take the value after a flag, advancing the cursor
fn flag_value<'a>(args: &'a [String], i: &mut usize) -> Option<&'a str> {
    if *i + 1 < args.len() {
        *i += 1;
        Some(args[*i].as_str())
    } else {
        None
    }
}

/// Optional count after a flag (`--tournament 5` or just `--tournament`)
fn optional_count(args: &[String], i: &mut usize, default: u32) -> u32 {
    if *i + 1 < args.len() && !args[*i + 1].starts_with('-') {
        *i += 1;
        args[*i].parse().unwrap_or(default)
    } else {
        default
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl SimConfig {
    /// Load configuration from a JSON settings file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
    }

    /// Load configuration from default config files
    /// Priority: local settings > template settings > built-in defaults
    pub fn from_config_files() -> Self {
        if let Ok(config) = Self::from_file(SIM_SETTINGS_FILE) {
            return config;
        }
        if let Ok(config) = Self::from_file(SIM_SETTINGS_TEMPLATE) {
            return config;
        }
        Self::default()
    }

    /// Parse configuration from command line arguments
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        if args.iter().any(|a| a == "--help" || a == "-h") {
            print_help();
            std::process::exit(0);
        }

        // Start with config files as base
        let mut config = Self::from_config_files();

        // Explicit settings file replaces the base
        if let Some(pos) = args.iter().position(|a| a == "--settings") {
            if let Some(path) = args.get(pos + 1) {
                match Self::from_file(path) {
                    Ok(loaded) => config = loaded,
                    Err(e) => eprintln!("Warning: {}", e),
                }
            }
        }

        config.apply_args(&args);
        config
    }

    /// Apply command line overrides. `args[0]` is the program name.
    pub fn apply_args(&mut self, args: &[String]) {
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--settings" => {
                    // Handled in from_args
                    i += 1;
                }
                "--shooters" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        let list = parse_list(v);
                        if !list.is_empty() {
                            self.shooters = list;
                        }
                    }
                }
                "--profiles" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        self.profiles = parse_list(v);
                    }
                }
                "--duration" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        self.duration_limit = v.parse().unwrap_or(MATCH_DURATION);
                    }
                }
                "--fps" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        self.fps = v.parse().unwrap_or(SIM_FPS);
                    }
                }
                "--matches" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        let count = v.parse().unwrap_or(1);
                        self.mode = SimMode::MultiMatch { count };
                    }
                }
                "--tournament" => {
                    let matches_per_pair = optional_count(args, &mut i, 5);
                    self.mode = SimMode::Tournament { matches_per_pair };
                }
                "--zone-sweep" => {
                    let shots_per_bucket = optional_count(args, &mut i, 50);
                    self.mode = SimMode::ZoneSweep { shots_per_bucket };
                }
                "--seed" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        self.seed = v.parse().ok();
                    }
                }
                "--output" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        self.output_file = Some(v.to_string());
                    }
                }
                "--quiet" | "-q" => {
                    self.quiet = true;
                }
                "--parallel" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        self.parallel = v.parse().unwrap_or(0);
                    }
                }
                "--db" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        self.db_path = Some(v.to_string());
                    }
                }
                "--tuning" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        self.tuning_file = v.to_string();
                    }
                }
                "--profiles-file" => {
                    if let Some(v) = flag_value(args, &mut i) {
                        self.profiles_file = v.to_string();
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }
}

fn print_help() {
    println!(
        r#"Shot Simulation Tool - headless AI matches and zone sweeps

USAGE:
    cargo run --bin simulate -- [OPTIONS]

OPTIONS:
    --settings <FILE>      Load settings from JSON file (CLI args override file settings)
    --shooters <LIST>      Comma-separated AI profile per shooter (default: Balanced,Balanced)
    --profiles <LIST>      Comma-separated profile names for tournament
    --duration <SECS>      Match length in seconds (default: 60)
    --fps <N>              Simulation steps per second (default: 60)
    --matches <N>          Run N matches with the same lineup
    --tournament [N]       Run all profile pairs (N matches each, default: 5)
    --zone-sweep [N]       Fire N shots per power/distance bucket (default: 50)
    --seed <N>             RNG seed for reproducibility
    --output <FILE>        Output JSON to file (default: stdout)
    --quiet, -q            Suppress progress output
    --parallel <N>         Run matches in parallel with N threads
    --db <FILE>            Store events and results in SQLite database
    --tuning <FILE>        Shot tuning TOML (default: config/shot_tuning.toml)
    --profiles-file <FILE> AI profile definitions (default: assets/ai_profiles.txt)
    --debug-log            Verbose logging
    --help, -h             Show this help

EXAMPLES:
    cargo run --bin simulate -- --shooters Sniper,Streaky --seed 42
    cargo run --bin simulate -- --matches 200 --parallel 8 --db sims.db
    cargo run --bin simulate -- --tournament 10 --profiles Balanced,Sniper,Rookie
    cargo run --bin simulate -- --zone-sweep 100 --output sweep.json

SETTINGS FILE FORMAT (JSON):
    {{
      "shooters": ["Balanced", "Sniper"],
      "duration_limit": 60.0,
      "parallel": 8
    }}
"#
    );
}
