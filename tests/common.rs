// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Provides plan, quest, and submission builders plus generator stubs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use levelup_engine::generator::{GenerationFailure, GenerationRequest, QuestGenerator};
use levelup_engine::models::{
    Exercise, ExerciseKind, ExerciseLog, ProofType, Quest, QuestType, RankTier, StatGain,
    Submission, UserClass, WorkoutPlan,
};

/// Generator stub returning a fixed plan regardless of context
pub struct StubGenerator {
    pub plan: WorkoutPlan,
}

#[async_trait]
impl QuestGenerator for StubGenerator {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<WorkoutPlan, GenerationFailure> {
        Ok(self.plan.clone())
    }
}

/// Generator stub that always fails, forcing the deterministic fallback
pub struct OfflineGenerator;

#[async_trait]
impl QuestGenerator for OfflineGenerator {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<WorkoutPlan, GenerationFailure> {
        Err(GenerationFailure::Unavailable("backend offline".into()))
    }
}

/// A two-exercise plan with uniform RPE targets of 7
pub fn make_plan(base_xp: u32, requires_proof: bool, estimated_duration_min: u32) -> WorkoutPlan {
    WorkoutPlan {
        quest_name: "Test Protocol".into(),
        quest_rank: RankTier::E,
        narrative_intro: "Prove your worth.".into(),
        base_xp,
        stat_gain: StatGain {
            strength: 2,
            agility: 1,
            stamina: 3,
        },
        estimated_duration_min,
        target_class: UserClass::Novice,
        requires_proof,
        proof_type: requires_proof.then_some(ProofType::Video),
        exercises: vec![
            Exercise {
                id: "ex_1".into(),
                name: "Push-ups".into(),
                kind: ExerciseKind::Compound,
                sets: 3,
                reps: "10".into(),
                rest_sec: 60,
                rpe_target: 7,
                target_muscle: "Chest".into(),
                tips: "Full range.".into(),
            },
            Exercise {
                id: "ex_2".into(),
                name: "Squats".into(),
                kind: ExerciseKind::Compound,
                sets: 3,
                reps: "10".into(),
                rest_sec: 60,
                rpe_target: 7,
                target_muscle: "Legs".into(),
                tips: "Depth first.".into(),
            },
        ],
    }
}

/// An active quest wrapping the given plan, expiring in 12 hours
pub fn make_quest(user_id: Uuid, plan: WorkoutPlan) -> Quest {
    Quest::new(
        user_id,
        QuestType::Daily,
        plan,
        Utc::now() + Duration::hours(12),
    )
}

/// A submission completing every exercise of the quest's plan
pub fn full_submission(
    quest: &Quest,
    rpe: u8,
    duration_min: u32,
    proof: Option<&str>,
) -> Submission {
    Submission {
        quest_id: quest.id,
        duration_actual: duration_min,
        rpe_actual: rpe,
        user_feedback: None,
        exercises_completed: quest
            .plan
            .exercises
            .iter()
            .map(|exercise| ExerciseLog {
                exercise_id: exercise.id.clone(),
                sets_done: exercise.sets,
                reps_done: exercise.reps.clone(),
                skipped: false,
            })
            .collect(),
        proof_media_url: proof.map(Into::into),
        proof_type: if proof.is_some() {
            ProofType::Video
        } else {
            ProofType::None
        },
        anomalies_injuries: None,
        is_public: true,
    }
}
