// ABOUTME: Pure scoring functions computing effort, integrity, and safety sub-scores
// ABOUTME: Deterministic and side-effect-free; all outputs clamped to the unit interval
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Scoring Functions
//!
//! Pure functions turning a submission (plus optional form analysis) into the
//! three sub-scores the judge combines. Effort weighs completed work against
//! reported exertion; integrity blends CV form sub-scores or falls back to a
//! moderate baseline so proof-exempt quests are not penalized; safety deducts
//! a fixed penalty per detected issue.

use crate::analyzer::FormAnalysis;
use crate::config::ScoringConfig;
use crate::models::{Submission, WorkoutPlan};

/// RPE scale span used to normalize alignment (scale runs 1-10)
const RPE_SPAN: f64 = 9.0;

// Integrity blend weights with full video analysis
const VIDEO_FORM_WEIGHT: f64 = 0.35;
const VIDEO_TECHNIQUE_WEIGHT: f64 = 0.30;
const VIDEO_ROM_WEIGHT: f64 = 0.20;
const VIDEO_CONSISTENCY_WEIGHT: f64 = 0.15;

// Integrity blend weights for photo analysis (no consistency available)
const PHOTO_FORM_WEIGHT: f64 = 0.5;
const PHOTO_TECHNIQUE_WEIGHT: f64 = 0.5;

/// Fraction of prescribed exercises that were not skipped.
///
/// Counted against the plan's exercise list, so missing log entries count as
/// not done.
#[must_use]
pub fn completion_ratio(plan: &WorkoutPlan, submission: &Submission) -> f64 {
    if plan.exercises.is_empty() {
        return 0.0;
    }
    let done = plan
        .exercises
        .iter()
        .filter(|exercise| {
            submission
                .exercises_completed
                .iter()
                .any(|log| log.exercise_id == exercise.id && !log.skipped)
        })
        .count();
    done as f64 / plan.exercises.len() as f64
}

/// How closely reported RPE matches the plan's target, in `[0, 1]`
#[must_use]
pub fn rpe_alignment(rpe_actual: u8, rpe_target: f64) -> f64 {
    let delta = (f64::from(rpe_actual) - rpe_target).abs();
    (1.0 - delta / RPE_SPAN).clamp(0.0, 1.0)
}

/// Effort sub-score: weighted completion ratio plus RPE alignment
#[must_use]
pub fn effort_score(plan: &WorkoutPlan, submission: &Submission, config: &ScoringConfig) -> f64 {
    let completion = completion_ratio(plan, submission);
    let alignment = rpe_alignment(submission.rpe_actual, plan.target_rpe());
    (config.completion_weight * completion + config.rpe_weight * alignment).clamp(0.0, 1.0)
}

/// Integrity sub-score.
///
/// Without CV evidence this is the configured moderate baseline. With
/// evidence it is a weighted blend of the form sub-scores: videos carry a
/// consistency term, photos blend form and technique evenly.
#[must_use]
pub fn integrity_score(analysis: Option<&FormAnalysis>, config: &ScoringConfig) -> f64 {
    let Some(analysis) = analysis else {
        return config.baseline_integrity;
    };
    let blended = analysis.consistency_score.map_or_else(
        || {
            PHOTO_FORM_WEIGHT * analysis.form_score
                + PHOTO_TECHNIQUE_WEIGHT * analysis.technique_score
        },
        |consistency| {
            VIDEO_FORM_WEIGHT * analysis.form_score
                + VIDEO_TECHNIQUE_WEIGHT * analysis.technique_score
                + VIDEO_ROM_WEIGHT * analysis.range_of_motion
                + VIDEO_CONSISTENCY_WEIGHT * consistency
        },
    );
    blended.clamp(0.0, 1.0)
}

/// Safety sub-score: one fixed decrement per detected issue, floored at zero.
///
/// Issues come from the analyzer's findings plus one issue when the user
/// self-reported an anomaly or injury.
#[must_use]
pub fn safety_score(
    analysis: Option<&FormAnalysis>,
    submission: &Submission,
    config: &ScoringConfig,
) -> f64 {
    let mut issues = analysis.map_or(0, |a| a.safety_issues.len());
    if submission.reports_anomaly() {
        issues += 1;
    }
    (1.0 - config.safety_issue_penalty * issues as f64).clamp(0.0, 1.0)
}

/// Unweighted mean of the three sub-scores
#[must_use]
pub fn overall_score(integrity: f64, effort: f64, safety: f64) -> f64 {
    (integrity + effort + safety) / 3.0
}
