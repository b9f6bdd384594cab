// ABOUTME: Quest generator interface with a deterministic fallback plan builder
// ABOUTME: Upstream generation failure never blocks quest assignment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Quest Generator Interface
//!
//! Quest content comes from an external generator (an LLM in production)
//! behind a narrow trait. Generation is time-bounded; on failure or timeout
//! the engine substitutes a deterministic template keyed by the user's rank
//! and class so assignment never blocks on upstream availability.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::models::{
    Exercise, ExerciseKind, RankTier, StatGain, UserClass, WorkoutPlan,
};

/// Default time budget for an external generation call
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Context the generator tailors a plan to
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// User's training class
    pub class: UserClass,
    /// User's current rank
    pub rank: RankTier,
    /// User's current level
    pub level: u32,
    /// Requested workout length in minutes
    pub time_window_min: u32,
    /// Equipment available to the user
    pub equipment: Vec<String>,
    /// Muscle groups reported sore today
    pub muscle_soreness: Vec<String>,
}

/// Upstream generation failure modes
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// The generator backend is unreachable
    #[error("generator unavailable: {0}")]
    Unavailable(String),
    /// The generator produced an unusable plan
    #[error("generated plan invalid: {0}")]
    InvalidPlan(String),
    /// The generation call exceeded its time budget
    #[error("generation timed out")]
    Timeout,
}

/// Contract an external quest generator must satisfy
#[async_trait]
pub trait QuestGenerator: Send + Sync {
    /// Generate a workout plan for the given user context.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationFailure`] when the backend is unreachable or the
    /// produced plan is unusable; the caller falls back to a template.
    async fn generate(&self, request: &GenerationRequest) -> Result<WorkoutPlan, GenerationFailure>;
}

/// Base XP of a fallback plan for each rank
const fn fallback_base_xp(rank: RankTier) -> u32 {
    match rank {
        RankTier::E => 300,
        RankTier::D => 600,
        RankTier::C => 1_000,
        RankTier::B => 1_500,
        RankTier::A => 2_000,
        RankTier::S => 2_500,
    }
}

/// Build the deterministic fallback plan for a user.
///
/// A fixed three-exercise bodyweight template: volume and target RPE step up
/// at levels 40 and 70, reward scales with rank, and proof is never required
/// so the plan works offline end to end.
#[must_use]
pub fn fallback_plan(request: &GenerationRequest) -> WorkoutPlan {
    let sets = if request.level >= 70 {
        5
    } else if request.level >= 40 {
        4
    } else {
        3
    };
    let reps = if request.level >= 70 {
        "15"
    } else if request.level >= 40 {
        "12"
    } else {
        "10"
    };
    let hold = if request.level >= 70 {
        "45s"
    } else if request.level >= 40 {
        "35s"
    } else {
        "30s"
    };
    let rpe = if request.level >= 70 { 7 } else { 6 };

    WorkoutPlan {
        quest_name: format!("{} Recovery Protocol (Offline)", request.rank),
        quest_rank: request.rank,
        narrative_intro: format!(
            "The System is experiencing interference. Execute this {} recovery protocol for {} class.",
            request.rank, request.class
        ),
        base_xp: fallback_base_xp(request.rank),
        stat_gain: StatGain {
            strength: 2,
            agility: 2,
            stamina: 2,
        },
        estimated_duration_min: if request.time_window_min > 0 {
            request.time_window_min
        } else {
            30
        },
        target_class: request.class,
        requires_proof: false,
        proof_type: None,
        exercises: vec![
            Exercise {
                id: "ex_fallback_1".into(),
                name: "Push-ups".into(),
                kind: ExerciseKind::Compound,
                sets,
                reps: reps.into(),
                rest_sec: 60,
                rpe_target: rpe,
                target_muscle: "Chest".into(),
                tips: format!("System offline. Maintain {} form standards.", request.rank),
            },
            Exercise {
                id: "ex_fallback_2".into(),
                name: "Squats".into(),
                kind: ExerciseKind::Compound,
                sets,
                reps: reps.into(),
                rest_sec: 60,
                rpe_target: rpe,
                target_muscle: "Legs".into(),
                tips: "Knees over toes. Focus on depth.".into(),
            },
            Exercise {
                id: "ex_fallback_3".into(),
                name: "Plank".into(),
                kind: ExerciseKind::Isolation,
                sets,
                reps: hold.into(),
                rest_sec: 30,
                rpe_target: rpe.saturating_sub(1).max(1),
                target_muscle: "Core".into(),
                tips: "Straight line from head to heels.".into(),
            },
        ],
    }
}

/// Generate a plan, falling back to the deterministic template on any failure.
///
/// The external call is bounded by `timeout`. Failures and invalid plans are
/// logged and swallowed; the caller always receives a usable plan.
pub async fn generate_or_fallback(
    generator: &dyn QuestGenerator,
    request: &GenerationRequest,
    timeout: Duration,
) -> WorkoutPlan {
    let generated = tokio::time::timeout(timeout, generator.generate(request)).await;
    match generated {
        Ok(Ok(plan)) => {
            if let Err(error) = plan.validate() {
                warn!(%error, "generated plan failed validation, using fallback");
                fallback_plan(request)
            } else {
                plan
            }
        }
        Ok(Err(failure)) => {
            warn!(%failure, "quest generation failed, using fallback");
            fallback_plan(request)
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "quest generation timed out, using fallback");
            fallback_plan(request)
        }
    }
}
