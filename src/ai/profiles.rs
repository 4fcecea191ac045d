//! AI profiles - configurable AI shooter parameters
//!
//! Each profile sets how often the AI goes for a perfect or bank shot and how
//! long it thinks before shooting. Loaded from assets/ai_profiles.txt.

use bevy::prelude::*;
use std::fs;

use crate::constants::*;

/// Path to AI profiles file
pub const AI_PROFILES_FILE: &str = "assets/ai_profiles.txt";

/// AI shooter parameters loaded from config file
#[derive(Debug, Clone, PartialEq)]
pub struct AiProfile {
    /// Profile name for display
    pub name: String,
    /// Chance (0-1) of aiming inside the perfect zone
    pub perfect_chance: f32,
    /// Chance (0-1) of aiming inside the bank zone
    pub bank_chance: f32,
    /// Shortest think time before shooting (seconds)
    pub think_min: f32,
    /// Longest think time before shooting (seconds)
    pub think_max: f32,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            name: "Balanced".to_string(),
            perfect_chance: AI_PERFECT_CHANCE,
            bank_chance: AI_BANK_CHANCE,
            think_min: AI_THINK_MIN,
            think_max: AI_THINK_MAX,
        }
    }
}

impl AiProfile {
    /// Clamp chances into [0, 1] with their sum at most 1, and order the think
    /// range with both ends non-negative. Non-finite values take the defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = AiProfile::default();
        let finite_or = |v: f32, d: f32| if v.is_finite() { v } else { d };
        self.perfect_chance = finite_or(self.perfect_chance, defaults.perfect_chance);
        self.bank_chance = finite_or(self.bank_chance, defaults.bank_chance);
        self.think_min = finite_or(self.think_min, defaults.think_min);
        self.think_max = finite_or(self.think_max, defaults.think_max);

        self.perfect_chance = self.perfect_chance.clamp(0.0, 1.0);
        self.bank_chance = self.bank_chance.clamp(0.0, 1.0 - self.perfect_chance);
        if self.think_max < self.think_min {
            std::mem::swap(&mut self.think_min, &mut self.think_max);
        }
        self.think_min = self.think_min.max(0.0);
        self.think_max = self.think_max.max(0.0);
        self
    }

    /// Chance of a deliberate miss
    pub fn miss_chance(&self) -> f32 {
        (1.0 - self.perfect_chance - self.bank_chance).max(0.0)
    }
}

/// Database of AI profiles loaded from file
#[derive(Resource, Debug, Clone)]
pub struct AiProfileDatabase {
    profiles: Vec<AiProfile>,
}

impl Default for AiProfileDatabase {
    fn default() -> Self {
        Self::load_from_file(AI_PROFILES_FILE)
    }
}

impl AiProfileDatabase {
    /// Load profiles from file, or return default if file doesn't exist
    pub fn load_from_file(path: &str) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read AI profiles file: {}, using defaults", e);
                return Self::builtin();
            }
        };

        let profiles = parse_profiles(&content);
        if profiles.is_empty() {
            warn!("No profiles parsed from {}, using defaults", path);
            return Self::builtin();
        }

        info!("Loaded {} AI profiles from {}", profiles.len(), path);
        Self { profiles }
    }

    /// Single default profile
    pub fn builtin() -> Self {
        Self {
            profiles: vec![AiProfile::default()],
        }
    }

    pub fn from_profiles(profiles: Vec<AiProfile>) -> Self {
        if profiles.is_empty() {
            return Self::builtin();
        }
        Self { profiles }
    }

    /// Get profile by index, wrapping around if out of bounds
    pub fn get(&self, index: usize) -> &AiProfile {
        &self.profiles[index % self.profiles.len()]
    }

    /// Find a profile by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&AiProfile> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    /// Get number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Parse profiles from file content
pub fn parse_profiles(content: &str) -> Vec<AiProfile> {
    let mut profiles = Vec::new();
    let mut current: Option<AiProfile> = None;

    for line in content.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // New profile starts
        if let Some(name) = line.strip_prefix("profile:") {
            if let Some(p) = current.take() {
                profiles.push(p.sanitized());
            }
            current = Some(AiProfile {
                name: name.trim().to_string(),
                ..default()
            });
            continue;
        }

        let Some(profile) = current.as_mut() else {
            continue;
        };

        if let Some((key, value)) = line.split_once(':') {
            let Ok(v) = value.trim().parse::<f32>() else {
                continue;
            };
            match key.trim() {
                "perfect_chance" => profile.perfect_chance = v,
                "bank_chance" => profile.bank_chance = v,
                "think_min" => profile.think_min = v,
                "think_max" => profile.think_max = v,
                _ => {}
            }
        }
    }

    // Don't forget the last profile
    if let Some(p) = current {
        profiles.push(p.sanitized());
    }

    profiles
}
