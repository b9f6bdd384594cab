// ABOUTME: Workout plan structure as produced by the quest generator
// ABOUTME: Exercises, reward potential, proof requirements, and plan validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

use serde::{Deserialize, Serialize};

use super::progress::{RankTier, UserClass};
use crate::errors::{AppError, AppResult};

/// Kind of proof media attached to a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProofType {
    /// No proof
    #[default]
    None,
    /// Single photo
    Photo,
    /// Full video
    Video,
    /// Timelapse video
    Timelapse,
}

impl ProofType {
    /// Whether this proof carries per-set consistency information.
    ///
    /// Video-like media lets the analyzer score consistency across sets;
    /// photos cannot.
    #[must_use]
    pub const fn is_video(self) -> bool {
        matches!(self, Self::Video | Self::Timelapse)
    }
}

/// Role of an exercise within a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseKind {
    /// Preparation movement
    Warmup,
    /// Technique-focused movement
    Skill,
    /// Multi-joint movement
    Compound,
    /// Single-muscle movement
    Isolation,
    /// Wind-down movement
    Cooldown,
}

/// A single prescribed exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Stable identifier referenced by submission logs
    pub id: String,
    /// Display name
    pub name: String,
    /// Movement role
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    /// Prescribed set count
    pub sets: u32,
    /// Prescribed reps; free-form to allow time-based holds ("30s")
    pub reps: String,
    /// Rest between sets in seconds
    pub rest_sec: u32,
    /// Target RPE (1-10)
    pub rpe_target: u8,
    /// Primary muscle group
    pub target_muscle: String,
    /// Coaching cue
    pub tips: String,
}

/// Base stat gains carried by a plan
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatGain {
    /// Strength gain potential
    #[serde(default)]
    pub strength: u32,
    /// Agility gain potential
    #[serde(default)]
    pub agility: u32,
    /// Stamina gain potential
    #[serde(default)]
    pub stamina: u32,
}

/// A structured workout plan, the payload of a quest.
///
/// Produced by the external generator or by the deterministic fallback;
/// validated before a quest is created so evaluation never sees a plan with
/// a missing reward or an empty exercise list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Display name of the quest
    pub quest_name: String,
    /// Difficulty rank
    pub quest_rank: RankTier,
    /// Flavor text shown at assignment
    pub narrative_intro: String,
    /// Reward potential; must be positive
    pub base_xp: u32,
    /// Base stat gain potential
    pub stat_gain: StatGain,
    /// Estimated time budget in whole minutes
    pub estimated_duration_min: u32,
    /// Class the plan was tuned for
    pub target_class: UserClass,
    /// Whether proof media is mandatory at submission
    #[serde(default)]
    pub requires_proof: bool,
    /// Expected proof media kind when `requires_proof` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_type: Option<ProofType>,
    /// Prescribed exercises; never empty for a valid plan
    pub exercises: Vec<Exercise>,
}

impl WorkoutPlan {
    /// Validate structural invariants of a generated plan.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `base_xp` is zero, the exercise list
    /// is empty, or any exercise carries an RPE target outside 1-10.
    pub fn validate(&self) -> AppResult<()> {
        if self.base_xp == 0 {
            return Err(AppError::missing_field("base_xp"));
        }
        if self.estimated_duration_min == 0 {
            return Err(AppError::out_of_range(
                "estimated_duration_min must be at least 1 minute",
            ));
        }
        if self.exercises.is_empty() {
            return Err(AppError::invalid_input("plan has no exercises"));
        }
        for exercise in &self.exercises {
            if !(1..=10).contains(&exercise.rpe_target) {
                return Err(AppError::out_of_range(format!(
                    "exercise '{}' has RPE target {} outside 1-10",
                    exercise.id, exercise.rpe_target
                )));
            }
        }
        Ok(())
    }

    /// Mean target RPE across all prescribed exercises.
    ///
    /// Plans are validated to be non-empty before evaluation; an empty list
    /// yields a neutral mid-scale target rather than dividing by zero.
    #[must_use]
    pub fn target_rpe(&self) -> f64 {
        if self.exercises.is_empty() {
            return 5.0;
        }
        let total: u32 = self.exercises.iter().map(|e| u32::from(e.rpe_target)).sum();
        f64::from(total) / self.exercises.len() as f64
    }
}
