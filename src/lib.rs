// ABOUTME: Quest lifecycle and evaluation engine for the LevelUp fitness platform
// ABOUTME: Scoring, anti-cheat, verdict assembly, progression cascade, and the quest state machine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

#![deny(unsafe_code)]

//! # LevelUp Engine
//!
//! The core of the LevelUp gamified fitness platform: users complete
//! AI-generated workout quests, submit proof of execution, and receive an
//! automated quality evaluation that converts into XP, level progression, and
//! rank advancement.
//!
//! ## Modules
//!
//! - **models**: quests, workout plans, submissions, verdicts, user progress
//! - **scoring**: pure effort/integrity/safety sub-score functions
//! - **anti_cheat**: trust heuristics that can only downgrade a submission
//! - **judge**: verdict assembly under an explicit policy configuration
//! - **progression**: the XP curve and the level/rank cascade
//! - **lifecycle**: the quest state machine and caller-facing service
//! - **generator** / **analyzer**: interfaces to the external quest generator
//!   and form analyzer, with deterministic fallbacks
//! - **storage**: the persistence boundary with optimistic concurrency
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use levelup_engine::config::EngineConfig;
//! use levelup_engine::lifecycle::{DailyQuestRequest, QuestLifecycle};
//! use levelup_engine::storage::MemoryStorage;
//! # use levelup_engine::generator::{GenerationFailure, GenerationRequest, QuestGenerator};
//! # use levelup_engine::models::WorkoutPlan;
//! # struct Offline;
//! # #[async_trait::async_trait]
//! # impl QuestGenerator for Offline {
//! #     async fn generate(&self, _: &GenerationRequest) -> Result<WorkoutPlan, GenerationFailure> {
//! #         Err(GenerationFailure::Unavailable("offline".into()))
//! #     }
//! # }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), levelup_engine::errors::AppError> {
//! let lifecycle = QuestLifecycle::new(
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(Offline),
//!     None,
//!     EngineConfig::from_env(),
//! );
//! let quest = lifecycle
//!     .assign_daily_quest(uuid::Uuid::new_v4(), DailyQuestRequest::default())
//!     .await?;
//! println!("assigned: {}", quest.plan.quest_name);
//! # Ok(())
//! # }
//! ```

/// Form analyzer interface and the `FormAnalysis` contract
pub mod analyzer;
/// Anti-cheat heuristics and the trust severity lattice
pub mod anti_cheat;
/// Engine policy configuration
pub mod config;
/// Unified error handling
pub mod errors;
/// Quest generator interface and deterministic fallback plans
pub mod generator;
/// Verdict assembly
pub mod judge;
/// Quest state machine and the caller-facing lifecycle service
pub mod lifecycle;
/// Structured logging setup
pub mod logging;
/// Core domain models
pub mod models;
/// XP curve and the level/rank progression cascade
pub mod progression;
/// Pure scoring functions
pub mod scoring;
/// Persistence boundary and the in-memory backend
pub mod storage;

pub use errors::{AppError, AppResult, ErrorCode};
pub use judge::Judge;
pub use lifecycle::{AbortOutcome, QuestLifecycle, SubmitOutcome};
pub use progression::{ProgressionEngine, ProgressionOutcome, XpCurve};
