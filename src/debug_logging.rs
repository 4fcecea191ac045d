//! Logging configuration shared across binaries.

use bevy::log::{Level, LogPlugin};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const LOG_SETTINGS_FILE: &str = "config/logging.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct LogSettings {
    /// One of error, warn, info, debug, trace
    pub level: String,
    /// Extra `tracing` filter directives, e.g. "wgpu=error,hoopshot=debug"
    pub filter: String,
    /// Log every shot event at debug level
    pub debug_shots: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filter: "wgpu=error,naga=warn".to_string(),
            debug_shots: false,
        }
    }
}

impl LogSettings {
    pub fn load() -> Self {
        Self::load_from(LOG_SETTINGS_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn enabled_from_args(args: &[String]) -> bool {
        args.iter().any(|arg| arg == "--debug-log")
    }

    /// File settings, with `--debug-log` forcing debug output
    pub fn load_with_args(args: &[String]) -> Self {
        Self::load_with_args_from(LOG_SETTINGS_FILE, args)
    }

    pub fn load_with_args_from(path: impl AsRef<Path>, args: &[String]) -> Self {
        let mut settings = Self::load_from(path);
        if Self::enabled_from_args(args) {
            settings.level = "debug".to_string();
            settings.debug_shots = true;
        }
        settings
    }

    /// Parsed level, `info` when the string is not recognised
    pub fn level(&self) -> Level {
        match self.level.to_ascii_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        }
    }

    pub fn plugin(&self) -> LogPlugin {
        LogPlugin {
            level: self.level(),
            filter: self.filter.clone(),
            ..Default::default()
        }
    }

    /// Install the global subscriber without keeping an app around.
    /// For tools that build many short-lived headless apps.
    pub fn install(&self) {
        let mut app = bevy::app::App::new();
        app.add_plugins(self.plugin());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn write_settings(name: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "hoopshot_{}_{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_debug_flag_raises_level() {
        let path = write_settings("debug_flag", r#"{"level":"warn","debug_shots":false}"#);
        let settings = LogSettings::load_with_args_from(&path, &args(&["x", "--debug-log"]));
        fs::remove_file(&path).ok();
        assert_eq!(settings.level(), Level::DEBUG);
        assert!(settings.debug_shots);
    }

    #[test]
    fn test_file_settings_kept_without_flag() {
        let path = write_settings("no_flag", r#"{"level":"warn","debug_shots":false}"#);
        let settings = LogSettings::load_with_args_from(&path, &args(&["x", "--seed", "4"]));
        fs::remove_file(&path).ok();
        assert_eq!(settings.level(), Level::WARN);
        assert!(!settings.debug_shots);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = LogSettings::load_with_args_from("config/missing_logging.json", &args(&["x"]));
        assert_eq!(settings, LogSettings::default());
    }

    #[test]
    fn test_unknown_level_is_info() {
        let settings = LogSettings {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.level(), Level::INFO);
    }

    #[test]
    fn test_partial_json() {
        let settings: LogSettings = serde_json::from_str(r#"{"level":"warn"}"#).unwrap();
        assert_eq!(settings.level(), Level::WARN);
        assert!(!settings.debug_shots);
    }
}
