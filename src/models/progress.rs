// ABOUTME: User progression state including rank tiers, classes, XP totals, and stats
// ABOUTME: Level is always a pure function of total XP under the active curve
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Starting value for each base stat on a fresh profile
pub const BASE_STAT: u32 = 10;

/// Coarse-grained difficulty tier gating quest difficulty and leaderboard grouping
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum RankTier {
    /// Entry tier for new hunters
    #[default]
    #[serde(rename = "E-Rank")]
    E,
    /// Second tier, unlocked at level 10
    #[serde(rename = "D-Rank")]
    D,
    /// Third tier, unlocked at level 20
    #[serde(rename = "C-Rank")]
    C,
    /// Fourth tier, unlocked at level 30
    #[serde(rename = "B-Rank")]
    B,
    /// Fifth tier, unlocked at level 40
    #[serde(rename = "A-Rank")]
    A,
    /// Top tier, unlocked at level 50
    #[serde(rename = "S-Rank")]
    S,
}

impl RankTier {
    /// Lowest level belonging to this rank bracket
    #[must_use]
    pub const fn min_level(self) -> u32 {
        match self {
            Self::E => 1,
            Self::D => 10,
            Self::C => 20,
            Self::B => 30,
            Self::A => 40,
            Self::S => 50,
        }
    }

    /// Rank bracket for a given level
    #[must_use]
    pub const fn for_level(level: u32) -> Self {
        if level >= 50 {
            Self::S
        } else if level >= 40 {
            Self::A
        } else if level >= 30 {
            Self::B
        } else if level >= 20 {
            Self::C
        } else if level >= 10 {
            Self::D
        } else {
            Self::E
        }
    }

    /// The next rank up, or `None` at the top of the ladder
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::E => Some(Self::D),
            Self::D => Some(Self::C),
            Self::C => Some(Self::B),
            Self::B => Some(Self::A),
            Self::A => Some(Self::S),
            Self::S => None,
        }
    }

    /// Wire name, e.g. `"E-Rank"`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::E => "E-Rank",
            Self::D => "D-Rank",
            Self::C => "C-Rank",
            Self::B => "B-Rank",
            Self::A => "A-Rank",
            Self::S => "S-Rank",
        }
    }
}

impl std::fmt::Display for RankTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training archetype chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserClass {
    /// Default class for new users
    #[default]
    Novice,
    /// Explosive power focus
    Striker,
    /// Strength and durability focus
    Tank,
    /// Speed and agility focus
    Assassin,
}

impl std::fmt::Display for UserClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Novice => "Novice",
            Self::Striker => "Striker",
            Self::Tank => "Tank",
            Self::Assassin => "Assassin",
        };
        f.write_str(name)
    }
}

/// Persistent per-user progression state.
///
/// Mutated only by the progression engine's apply-XP cascade, by the
/// destructive `change_class` operation (halves total XP), or by an explicit
/// reset. `level` always equals the active curve's level for `total_xp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgress {
    /// Owning user
    pub user_id: Uuid,
    /// Lifetime XP, monotonically non-decreasing except on class change/reset
    pub total_xp: u64,
    /// XP accumulated within the current level
    pub current_xp: u64,
    /// Level derived from `total_xp` via the XP curve
    pub level: u32,
    /// Rank tier
    pub rank: RankTier,
    /// Training class
    pub class: UserClass,
    /// Strength stat total
    pub stats_strength: u32,
    /// Agility stat total
    pub stats_agility: u32,
    /// Stamina stat total
    pub stats_stamina: u32,
    /// Consecutive non-rejected submissions
    pub streak_current: u32,
    /// Best streak ever reached
    pub streak_best: u32,
    /// Timestamp of the last progression update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl UserProgress {
    /// Fresh level-1 profile for a new user
    #[must_use]
    pub const fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            total_xp: 0,
            current_xp: 0,
            level: 1,
            rank: RankTier::E,
            class: UserClass::Novice,
            stats_strength: BASE_STAT,
            stats_agility: BASE_STAT,
            stats_stamina: BASE_STAT,
            streak_current: 0,
            streak_best: 0,
            last_activity_at: None,
        }
    }
}
