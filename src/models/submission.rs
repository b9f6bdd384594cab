// ABOUTME: User-submitted quest execution reports with per-exercise completion records
// ABOUTME: Validated at the service boundary before any scoring is attempted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::ProofType;
use crate::errors::{AppError, AppResult};

/// Completion record for one prescribed exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLog {
    /// Id of the prescribed exercise
    pub exercise_id: String,
    /// Sets actually performed
    pub sets_done: u32,
    /// Reps actually performed; free-form to match the prescription format
    pub reps_done: String,
    /// Whether the exercise was skipped entirely
    #[serde(default)]
    pub skipped: bool,
}

/// The user's report of quest execution.
///
/// Durations are whole minutes; sub-minute completions round up to 1 at the
/// capture boundary, and the time-anomaly heuristic operates on those whole
/// minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Quest being reported
    pub quest_id: Uuid,
    /// Actual duration in whole minutes, at least 1
    pub duration_actual: u32,
    /// Self-reported RPE (1-10)
    pub rpe_actual: u8,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<String>,
    /// Per-exercise completion records
    pub exercises_completed: Vec<ExerciseLog>,
    /// Uploaded proof media URL, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_media_url: Option<String>,
    /// Kind of the attached proof media
    #[serde(default)]
    pub proof_type: ProofType,
    /// Self-reported anomalies or injuries during the workout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies_injuries: Option<String>,
    /// Whether the resulting log is publicly visible
    #[serde(default = "default_public")]
    pub is_public: bool,
}

const fn default_public() -> bool {
    true
}

impl Submission {
    /// Whether usable proof media is attached
    #[must_use]
    pub fn has_proof(&self) -> bool {
        self.proof_media_url
            .as_deref()
            .is_some_and(|url| !url.is_empty())
    }

    /// Whether the user reported any anomaly or injury
    #[must_use]
    pub fn reports_anomaly(&self) -> bool {
        self.anomalies_injuries
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }

    /// Validate field ranges before any evaluation work.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the duration is zero or the RPE is
    /// outside 1-10. No partial state change occurs on failure.
    pub fn validate(&self) -> AppResult<()> {
        if self.duration_actual < 1 {
            return Err(AppError::out_of_range(
                "duration_actual must be at least 1 minute",
            ));
        }
        if !(1..=10).contains(&self.rpe_actual) {
            return Err(AppError::out_of_range(format!(
                "rpe_actual {} outside 1-10",
                self.rpe_actual
            )));
        }
        if self.has_proof() && self.proof_type == ProofType::None {
            return Err(AppError::invalid_input(
                "proof media attached without a proof type",
            ));
        }
        Ok(())
    }
}
