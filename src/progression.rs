// ABOUTME: XP curve policy, level derivation, and the apply-XP progression cascade
// ABOUTME: Level is always recomputed from total XP; multi-level jumps collapse into one result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Progression Engine
//!
//! Applies awarded XP to a user's profile: level is recomputed from the
//! cumulative total under the active [`XpCurve`], and rank advances when the
//! new level crosses a bracket. Applying XP twice is deliberately not
//! idempotent (XP accumulates); the lifecycle guarantees at-most-once
//! application per verdict.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ProgressionConfig;
use crate::models::{RankTier, UserClass, UserProgress};

/// XP curve policy mapping cumulative XP to level.
///
/// Two variants are supported:
///
/// - `Power`: the production curve, `xp_for_level = floor(base x level^exponent)`
///   with the inverse floored at level 1. Defaults to base 100, exponent 1.588.
/// - `Table`: explicit cumulative thresholds for tuning and tests. Entry `i`
///   is the total XP at which level `i + 2` begins (level 1 starts at zero);
///   entries must be ascending. Levels beyond the table cap at
///   `thresholds.len() + 1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum XpCurve {
    /// Power-law curve used in production
    Power {
        /// XP scale factor
        base_xp: u64,
        /// Growth exponent
        exponent: f64,
    },
    /// Explicit cumulative threshold table
    Table {
        /// Ascending total-XP thresholds; entry `i` starts level `i + 2`
        thresholds: Vec<u64>,
    },
}

impl Default for XpCurve {
    fn default() -> Self {
        Self::Power {
            base_xp: 100,
            exponent: 1.588,
        }
    }
}

impl XpCurve {
    /// Total XP required to reach a level (level 1 starts at zero)
    #[must_use]
    pub fn xp_for_level(&self, level: u32) -> u64 {
        if level <= 1 {
            return 0;
        }
        match self {
            Self::Power { base_xp, exponent } => {
                let xp = (*base_xp as f64) * f64::from(level).powf(*exponent);
                xp.floor() as u64
            }
            Self::Table { thresholds } => {
                let index = (level - 2) as usize;
                thresholds
                    .get(index)
                    .or_else(|| thresholds.last())
                    .copied()
                    .unwrap_or(0)
            }
        }
    }

    /// Level reached at a cumulative XP total; never below 1
    #[must_use]
    pub fn level_for_xp(&self, total_xp: u64) -> u32 {
        match self {
            Self::Power { base_xp, exponent } => {
                if total_xp < *base_xp {
                    return 1;
                }
                let level = ((total_xp as f64) / (*base_xp as f64)).powf(1.0 / exponent);
                (level.floor() as u32).max(1)
            }
            Self::Table { thresholds } => {
                let crossed = thresholds.iter().take_while(|t| total_xp >= **t).count() as u32;
                crossed + 1
            }
        }
    }

    /// XP still needed to reach the next level from a cumulative total
    #[must_use]
    pub fn xp_to_next_level(&self, total_xp: u64) -> u64 {
        let next = self.level_for_xp(total_xp) + 1;
        self.xp_for_level(next).saturating_sub(total_xp)
    }

    /// Progress through the current level as a fraction in `[0, 1]`
    #[must_use]
    pub fn level_progress(&self, total_xp: u64) -> f64 {
        let level = self.level_for_xp(total_xp);
        let floor = self.xp_for_level(level);
        let ceiling = self.xp_for_level(level + 1);
        if ceiling <= floor {
            return 1.0;
        }
        let earned = total_xp.saturating_sub(floor) as f64;
        let needed = (ceiling - floor) as f64;
        (earned / needed).clamp(0.0, 1.0)
    }
}

/// Result of applying XP: the updated profile plus the cascade summary.
///
/// Multi-level jumps report only the final level and rank, with the two
/// booleans summarizing whether anything advanced.
#[derive(Debug, Clone)]
pub struct ProgressionOutcome {
    /// Updated profile
    pub progress: UserProgress,
    /// Whether at least one level threshold was crossed
    pub leveled_up: bool,
    /// Final level after the application
    pub new_level: u32,
    /// Whether the rank bracket advanced
    pub ranked_up: bool,
    /// Final rank after the application
    pub new_rank: RankTier,
}

/// Applies XP deltas and destructive profile operations
#[derive(Debug, Clone, Default)]
pub struct ProgressionEngine {
    curve: XpCurve,
}

impl ProgressionEngine {
    /// Build an engine from progression policy
    #[must_use]
    pub fn new(config: ProgressionConfig) -> Self {
        Self {
            curve: config.curve,
        }
    }

    /// The active curve
    #[must_use]
    pub const fn curve(&self) -> &XpCurve {
        &self.curve
    }

    /// Apply an XP delta to a profile.
    ///
    /// Adds to the cumulative total, recomputes level from the curve, and
    /// advances rank when the new level's bracket exceeds the stored rank.
    /// Rank never demotes here even when the stored rank sits above the
    /// bracket (possible after a class change).
    #[must_use]
    pub fn apply_xp(&self, progress: &UserProgress, xp_delta: u64) -> ProgressionOutcome {
        let old_level = progress.level;
        let old_rank = progress.rank;

        let total_xp = progress.total_xp.saturating_add(xp_delta);
        let new_level = self.curve.level_for_xp(total_xp);
        let bracket = RankTier::for_level(new_level);
        let new_rank = old_rank.max(bracket);

        let mut updated = progress.clone();
        updated.total_xp = total_xp;
        updated.current_xp = total_xp.saturating_sub(self.curve.xp_for_level(new_level));
        updated.level = new_level;
        updated.rank = new_rank;
        updated.last_activity_at = Some(Utc::now());

        let leveled_up = new_level > old_level;
        let ranked_up = new_rank > old_rank;
        if leveled_up || ranked_up {
            info!(
                user_id = %progress.user_id,
                xp_delta,
                new_level,
                new_rank = %new_rank,
                "progression cascade"
            );
        }

        ProgressionOutcome {
            progress: updated,
            leveled_up,
            new_level,
            ranked_up,
            new_rank,
        }
    }

    /// Switch training class, halving total XP.
    ///
    /// Destructive and user-initiated. Level and within-level XP are
    /// recomputed from the halved total; rank is kept, so the profile may
    /// temporarily sit above its level bracket until XP catches back up.
    #[must_use]
    pub fn change_class(&self, progress: &UserProgress, new_class: UserClass) -> UserProgress {
        let total_xp = progress.total_xp / 2;
        let level = self.curve.level_for_xp(total_xp);

        let mut updated = progress.clone();
        updated.class = new_class;
        updated.total_xp = total_xp;
        updated.current_xp = total_xp.saturating_sub(self.curve.xp_for_level(level));
        updated.level = level;
        updated.last_activity_at = Some(Utc::now());
        info!(user_id = %progress.user_id, class = %new_class, total_xp, "class changed, XP halved");
        updated
    }

    /// Reset a profile to a fresh level-1 state
    #[must_use]
    pub fn reset(&self, progress: &UserProgress) -> UserProgress {
        info!(user_id = %progress.user_id, "progress reset");
        UserProgress::new(progress.user_id)
    }

    /// Check the no-drift invariant: stored level matches the curve
    #[must_use]
    pub fn is_consistent(&self, progress: &UserProgress) -> bool {
        self.curve.level_for_xp(progress.total_xp) == progress.level
    }
}
