// ABOUTME: Quest records and the quest status state machine
// ABOUTME: Status transitions are monotonic; terminal states never re-enter Active
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::WorkoutPlan;
use super::progress::RankTier;

/// Category of an assigned quest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuestType {
    /// Regular daily workout
    #[default]
    Daily,
    /// Make-up workout after a failure
    Penalty,
    /// Rank promotion exam
    RankUp,
    /// Event quest
    Special,
}

/// Quest lifecycle status.
///
/// `Active` is the only non-terminal state. `PendingVerification` parks a
/// quest whose submission awaits manual review; it is terminal from this
/// engine's perspective (resolution belongs to the moderation surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuestStatus {
    /// Assigned and awaiting submission
    #[default]
    Active,
    /// Evaluated and approved (or flagged), reward applied
    Completed,
    /// Rejected or expired
    Failed,
    /// Deliberately skipped by the user
    Skipped,
    /// Submission held for manual verification
    #[serde(rename = "Pending_Verification")]
    PendingVerification,
}

impl QuestStatus {
    /// Whether this status permits no further transitions
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Check whether a status transition is allowed.
///
/// The state machine is a single fan-out: `Active` may move to any terminal
/// state, and nothing ever moves back.
#[must_use]
pub const fn can_transition(from: QuestStatus, to: QuestStatus) -> bool {
    matches!(from, QuestStatus::Active) && to.is_terminal()
}

/// An assigned unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    /// Unique quest id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Quest category
    pub quest_type: QuestType,
    /// Difficulty rank of the plan
    pub rank_difficulty: RankTier,
    /// The structured workout plan
    pub plan: WorkoutPlan,
    /// Current lifecycle status
    pub status: QuestStatus,
    /// Whether proof media is mandatory at submission
    pub requires_proof: bool,
    /// Deadline after which the quest is eligible for the expiry sweep
    pub expires_at: DateTime<Utc>,
    /// Assignment timestamp
    pub created_at: DateTime<Utc>,
}

impl Quest {
    /// Create an `Active` quest from a validated plan
    #[must_use]
    pub fn new(
        user_id: Uuid,
        quest_type: QuestType,
        plan: WorkoutPlan,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            quest_type,
            rank_difficulty: plan.quest_rank,
            requires_proof: plan.requires_proof,
            plan,
            status: QuestStatus::Active,
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// Whether the quest deadline has passed
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
