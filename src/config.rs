// ABOUTME: Engine policy configuration for scoring, anti-cheat, rewards, and progression
// ABOUTME: Explicit config structs with env overrides; no ambient global state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Engine Configuration
//!
//! All tunable policy lives here and is passed explicitly into the judge,
//! progression engine, and lifecycle constructors so behavior is reproducible
//! in tests. `EngineConfig::from_env` applies deployment overrides on top of
//! the defaults; unparseable values fall back with a warning rather than
//! failing startup.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

use crate::progression::XpCurve;

/// Scoring policy for the pure sub-score functions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of the exercise-completion ratio within the effort score
    pub completion_weight: f64,
    /// Weight of RPE alignment within the effort score
    pub rpe_weight: f64,
    /// Integrity assigned when no form analysis is available
    pub baseline_integrity: f64,
    /// Safety decrement per detected issue
    pub safety_issue_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            completion_weight: 0.6,
            rpe_weight: 0.4,
            baseline_integrity: 0.75,
            safety_issue_penalty: 0.15,
        }
    }
}

/// Anti-cheat heuristic thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntiCheatConfig {
    /// Fraction of the estimated duration below which a submission is suspicious
    pub time_anomaly_ratio: f64,
    /// Live report count above which verification is downgraded to pending
    pub report_pressure_threshold: u32,
    /// Rep throughput above which a claimed volume is physically impossible
    pub max_reps_per_minute: u32,
}

impl Default for AntiCheatConfig {
    fn default() -> Self {
        Self {
            time_anomaly_ratio: 0.3,
            report_pressure_threshold: 3,
            max_reps_per_minute: 80,
        }
    }
}

/// One band of the overall-score to XP-multiplier table
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MultiplierBand {
    /// Lowest overall score that earns this band
    pub min_overall: f64,
    /// XP multiplier for the band
    pub multiplier: f64,
}

/// Reward policy: multiplier table, ceiling, and the abort fraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Multiplier bands ordered from highest `min_overall` down
    pub multiplier_bands: Vec<MultiplierBand>,
    /// Multiplier applied below every band
    pub floor_multiplier: f64,
    /// Hard ceiling on the XP multiplier
    pub max_multiplier: f64,
    /// Fraction of base XP awarded on a user-initiated abort
    pub abort_xp_fraction: f64,
    /// Daily per-reporter cap on filed reports
    pub daily_report_limit: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            multiplier_bands: vec![
                MultiplierBand {
                    min_overall: 0.90,
                    multiplier: 1.5,
                },
                MultiplierBand {
                    min_overall: 0.80,
                    multiplier: 1.3,
                },
                MultiplierBand {
                    min_overall: 0.70,
                    multiplier: 1.1,
                },
                MultiplierBand {
                    min_overall: 0.60,
                    multiplier: 1.0,
                },
                MultiplierBand {
                    min_overall: 0.50,
                    multiplier: 0.9,
                },
            ],
            floor_multiplier: 0.8,
            max_multiplier: 1.5,
            abort_xp_fraction: 0.2,
            daily_report_limit: 5,
        }
    }
}

impl RewardConfig {
    /// Look up the XP multiplier for an overall score, capped at the ceiling
    #[must_use]
    pub fn multiplier_for(&self, overall: f64) -> f64 {
        let raw = self
            .multiplier_bands
            .iter()
            .find(|band| overall >= band.min_overall)
            .map_or(self.floor_multiplier, |band| band.multiplier);
        raw.min(self.max_multiplier)
    }
}

/// Progression policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// The active XP curve
    pub curve: XpCurve,
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scoring policy
    pub scoring: ScoringConfig,
    /// Anti-cheat thresholds
    pub anti_cheat: AntiCheatConfig,
    /// Reward policy
    pub rewards: RewardConfig,
    /// Progression policy
    pub progression: ProgressionConfig,
}

impl EngineConfig {
    /// Build configuration from defaults plus environment overrides.
    ///
    /// Recognized variables: `LEVELUP_MAX_MULTIPLIER`,
    /// `LEVELUP_TIME_ANOMALY_RATIO`, `LEVELUP_REPORT_THRESHOLD`,
    /// `LEVELUP_SAFETY_PENALTY`, `LEVELUP_ABORT_FRACTION`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = parse_env_f64("LEVELUP_MAX_MULTIPLIER") {
            config.rewards.max_multiplier = value;
        }
        if let Some(value) = parse_env_f64("LEVELUP_TIME_ANOMALY_RATIO") {
            config.anti_cheat.time_anomaly_ratio = value;
        }
        if let Some(value) = parse_env_u32("LEVELUP_REPORT_THRESHOLD") {
            config.anti_cheat.report_pressure_threshold = value;
        }
        if let Some(value) = parse_env_f64("LEVELUP_SAFETY_PENALTY") {
            config.scoring.safety_issue_penalty = value;
        }
        if let Some(value) = parse_env_f64("LEVELUP_ABORT_FRACTION") {
            config.rewards.abort_xp_fraction = value;
        }
        config
    }
}

fn parse_env_f64(key: &str) -> Option<f64> {
    let raw = env::var(key).ok()?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => {
            warn!("ignoring unparseable {key}={raw}");
            None
        }
    }
}

fn parse_env_u32(key: &str) -> Option<u32> {
    let raw = env::var(key).ok()?;
    match raw.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring unparseable {key}={raw}");
            None
        }
    }
}
