//! Metrics collection for shot simulation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::events::GameEvent;
use crate::scoring::{ScoreBoard, ShooterStats};
use crate::shooting::ShooterId;

/// Result of a single match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// AI profile per shooter
    pub profiles: Vec<String>,
    /// Match duration (seconds of match clock, not counting the last shots landing)
    pub duration: f32,
    /// Final score per shooter
    pub scores: Vec<u32>,
    /// Winning shooter ("P1", "P2", ...) or "tie"
    pub winner: String,
    /// Per-shooter stats
    pub stats: Vec<ShooterStats>,
    /// RNG seed used
    pub seed: u64,
    /// Logged events for this match (used for DB persistence)
    #[serde(skip)]
    pub events: Vec<(u32, GameEvent)>,
}

impl MatchResult {
    pub fn from_board(profiles: Vec<String>, board: &ScoreBoard, duration: f32, seed: u64) -> Self {
        let mut result = Self {
            profiles,
            duration,
            scores: board.shooters.iter().map(|s| s.score).collect(),
            winner: String::new(),
            stats: board.shooters.clone(),
            seed,
            events: Vec::new(),
        };
        result.determine_winner();
        result
    }

    pub fn determine_winner(&mut self) {
        let best = self.scores.iter().copied().max().unwrap_or(0);
        let leaders: Vec<usize> = self
            .scores
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == best)
            .map(|(i, _)| i)
            .collect();
        self.winner = match leaders.as_slice() {
            [only] => ShooterId(*only as u8).to_string(),
            _ => "tie".to_string(),
        };
    }

    /// Index of the winning shooter, `None` on a tie
    pub fn winner_index(&self) -> Option<usize> {
        ShooterId::parse(&self.winner).map(|id| id.0 as usize)
    }

    /// Rebuild the board for persistence
    pub fn score_board(&self) -> ScoreBoard {
        ScoreBoard {
            shooters: self.stats.clone(),
        }
    }
}

/// Aggregate over a batch of matches with the same lineup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub matches: u32,
    /// Wins per shooter slot
    pub wins: Vec<u32>,
    pub ties: u32,
    /// Mean score per shooter slot
    pub avg_scores: Vec<f32>,
    /// Make rate per shooter slot
    pub make_rates: Vec<f32>,
}

impl BatchSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let slots = results.iter().map(|r| r.scores.len()).max().unwrap_or(0);
        let mut summary = Self {
            matches: results.len() as u32,
            wins: vec![0; slots],
            ties: 0,
            avg_scores: vec![0.0; slots],
            make_rates: vec![0.0; slots],
        };
        if results.is_empty() {
            return summary;
        }

        let mut attempts = vec![0u32; slots];
        let mut makes = vec![0u32; slots];
        for result in results {
            match result.winner_index() {
                Some(i) if i < slots => summary.wins[i] += 1,
                _ => summary.ties += 1,
            }
            for (i, score) in result.scores.iter().enumerate() {
                summary.avg_scores[i] += *score as f32;
            }
            for (i, stats) in result.stats.iter().enumerate() {
                attempts[i] += stats.attempts;
                makes[i] += stats.makes;
            }
        }
        let n = results.len() as f32;
        for i in 0..slots {
            summary.avg_scores[i] /= n;
            if attempts[i] > 0 {
                summary.make_rates[i] = makes[i] as f32 / attempts[i] as f32;
            }
        }
        summary
    }

    pub fn format_table(&self, profiles: &[String]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n{:>6} | {:>12} | {:>6} | {:>9} | {:>9}\n",
            "Slot", "Profile", "Wins", "Avg Score", "Make Rate"
        ));
        output.push_str(&format!("{:-<6}-+-{:-<12}-+-{:-<6}-+-{:-<9}-+-{:-<9}\n", "", "", "", "", ""));
        for i in 0..self.wins.len() {
            let name = profiles.get(i).map(String::as_str).unwrap_or("?");
            output.push_str(&format!(
                "{:>6} | {:>12} | {:>6} | {:>9.2} | {:>8.1}%\n",
                ShooterId(i as u8).to_string(),
                &name[..name.len().min(12)],
                self.wins[i],
                self.avg_scores[i],
                self.make_rates[i] * 100.0
            ));
        }
        output.push_str(&format!("\nTies: {} of {}\n", self.ties, self.matches));
        output
    }
}

/// Results from a round-robin tournament between two-shooter lineups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentResult {
    /// All match results
    pub matches: Vec<MatchResult>,
    /// Win rate matrix: win_rates[p1_profile][p2_profile] = win rate for P1
    pub win_rates: HashMap<String, HashMap<String, f32>>,
    /// Overall win rate per profile
    pub overall_win_rates: HashMap<String, f32>,
    /// Best performing profile
    pub best_profile: String,
}

impl TournamentResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate win rates from match results
    pub fn calculate_win_rates(&mut self) {
        let mut wins: HashMap<(String, String), u32> = HashMap::new();
        let mut total: HashMap<(String, String), u32> = HashMap::new();
        let mut profile_wins: HashMap<String, u32> = HashMap::new();
        let mut profile_total: HashMap<String, u32> = HashMap::new();

        for result in &self.matches {
            let [first, second] = result.profiles.as_slice() else {
                continue;
            };
            let key = (first.clone(), second.clone());
            *total.entry(key.clone()).or_insert(0) += 1;
            *profile_total.entry(first.clone()).or_insert(0) += 1;
            *profile_total.entry(second.clone()).or_insert(0) += 1;

            match result.winner_index() {
                Some(0) => {
                    *wins.entry(key).or_insert(0) += 1;
                    *profile_wins.entry(first.clone()).or_insert(0) += 1;
                }
                Some(1) => {
                    *profile_wins.entry(second.clone()).or_insert(0) += 1;
                }
                _ => {}
            }
        }

        for ((first, second), count) in &total {
            let won = wins.get(&(first.clone(), second.clone())).copied().unwrap_or(0);
            self.win_rates
                .entry(first.clone())
                .or_default()
                .insert(second.clone(), won as f32 / *count as f32);
        }

        let mut best_rate = -1.0;
        let mut names: Vec<_> = profile_total.keys().cloned().collect();
        names.sort();
        for profile in names {
            let played = profile_total[&profile];
            let won = profile_wins.get(&profile).copied().unwrap_or(0);
            let rate = won as f32 / played as f32;
            self.overall_win_rates.insert(profile.clone(), rate);
            if rate > best_rate {
                best_rate = rate;
                self.best_profile = profile;
            }
        }
    }

    /// Format as ASCII table
    pub fn format_table(&self, profiles: &[String]) -> String {
        let mut output = String::new();
        output.push_str("\nProfile Matchup Win Rates (row = P1):\n\n");

        output.push_str(&format!("{:>12} |", ""));
        for p in profiles {
            output.push_str(&format!(" {:>10} |", &p[..p.len().min(10)]));
        }
        output.push('\n');

        output.push_str(&format!("{:-<13}+", ""));
        for _ in profiles {
            output.push_str(&format!("{:-<12}+", ""));
        }
        output.push('\n');

        for first in profiles {
            output.push_str(&format!("{:>12} |", &first[..first.len().min(12)]));
            for second in profiles {
                if first == second {
                    output.push_str("      -     |");
                } else if let Some(rate) = self.win_rates.get(first).and_then(|m| m.get(second)) {
                    output.push_str(&format!("    {:>5.1}% |", rate * 100.0));
                } else {
                    output.push_str("      ?     |");
                }
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "\nBest overall: {} ({:.1}% win rate)\n",
            self.best_profile,
            self.overall_win_rates
                .get(&self.best_profile)
                .unwrap_or(&0.0)
                * 100.0
        ));

        output
    }
}
