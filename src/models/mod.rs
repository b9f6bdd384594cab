// ABOUTME: Domain models for quests, workout plans, submissions, verdicts, and user progress
// ABOUTME: Serde-serializable types shared by the judge, progression engine, and lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Core domain models.
//!
//! Wire names follow the platform's JSON conventions (`"E-Rank"`,
//! `"Auto_Approved"`, `"APPROVED"`), so records round-trip against data
//! produced by the existing services.

/// Quest records and status state machine
pub mod quest;
/// Workout plan structure produced by the quest generator
pub mod plan;
/// User progression state, ranks, and classes
pub mod progress;
/// Quest execution reports submitted by users
pub mod submission;
/// Evaluation verdicts produced by the judge
pub mod verdict;

pub use plan::{Exercise, ExerciseKind, ProofType, StatGain, WorkoutPlan};
pub use progress::{RankTier, UserClass, UserProgress};
pub use quest::{Quest, QuestStatus, QuestType};
pub use submission::{ExerciseLog, Submission};
pub use verdict::{Grade, StatUpdates, Verdict, VerdictStatus, VerificationStatus};
