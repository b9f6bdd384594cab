// ABOUTME: Anti-cheat heuristics gating trust in a submission before verdict assembly
// ABOUTME: Independent, composable checks that can only downgrade trust, never upgrade it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Anti-Cheat Heuristics
//!
//! Each check inspects one suspicion signal and proposes a downgrade on the
//! trust lattice `Clear < Flag < RequireVerification < Reject`. The review
//! combines them by taking the most severe proposal, so adding a check can
//! never make a submission more trusted.

use serde::{Deserialize, Serialize};

use crate::config::AntiCheatConfig;
use crate::models::{Submission, WorkoutPlan};

/// Trust-level outcome on the severity lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum TrustOutcome {
    /// No suspicion raised
    #[default]
    Clear,
    /// Suspicious but rewardable; submission is marked for monitoring
    Flag,
    /// Held until manually verified
    RequireVerification,
    /// Hard rejection
    Reject,
}

/// External trust signals about the submitting user
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrustSignals {
    /// Live count of reports filed against the user
    pub report_count: u32,
}

/// Combined result of all heuristics for one submission
#[derive(Debug, Clone, Default)]
pub struct TrustReview {
    /// Most severe outcome proposed by any check
    pub outcome: TrustOutcome,
    /// Whether manual verification should replace auto-approval
    pub verification_pending: bool,
    /// Human-readable reasons for each downgrade
    pub reasons: Vec<String>,
}

/// Check whether the required proof is present.
///
/// This is the only check that rejects outright, and it runs before any
/// scoring: a mandated proof that is absent makes evaluation pointless.
#[must_use]
pub fn proof_satisfied(plan: &WorkoutPlan, submission: &Submission) -> bool {
    !plan.requires_proof || submission.has_proof()
}

/// Time-anomaly check.
///
/// A duration far below the plan's estimate is suspicious, but the estimate
/// is heuristic rather than authoritative, so this never rejects. With proof
/// attached the submission is flagged for monitoring; without any evidence to
/// fall back on it is parked for manual verification.
#[must_use]
pub fn check_time_anomaly(
    plan: &WorkoutPlan,
    submission: &Submission,
    config: &AntiCheatConfig,
) -> Option<(TrustOutcome, String)> {
    let floor = f64::from(plan.estimated_duration_min) * config.time_anomaly_ratio;
    if f64::from(submission.duration_actual) >= floor {
        return None;
    }
    let outcome = if submission.has_proof() {
        TrustOutcome::Flag
    } else {
        TrustOutcome::RequireVerification
    };
    Some((
        outcome,
        format!(
            "completed in {} min against a {} min estimate",
            submission.duration_actual, plan.estimated_duration_min
        ),
    ))
}

/// Volume-plausibility check.
///
/// Claimed rep volume beyond what the reported duration physically allows is
/// an outright rejection: roughly 80 reps per minute is the ceiling for even
/// the simplest exercises. Time-hold prescriptions ("30s") contribute their
/// leading digits, matching how the capture surface records them.
#[must_use]
pub fn check_volume_plausibility(
    submission: &Submission,
    config: &AntiCheatConfig,
) -> Option<(TrustOutcome, String)> {
    let total_reps: u32 = submission
        .exercises_completed
        .iter()
        .filter(|log| !log.skipped)
        .map(|log| log.sets_done.saturating_mul(leading_digits(&log.reps_done)))
        .sum();
    let max_possible = submission
        .duration_actual
        .saturating_mul(config.max_reps_per_minute);
    if total_reps > max_possible {
        Some((
            TrustOutcome::Reject,
            format!(
                "{total_reps} claimed reps exceed the {max_possible} possible in {} min",
                submission.duration_actual
            ),
        ))
    } else {
        None
    }
}

/// Numeric prefix of a rep string, zero when there is none
fn leading_digits(reps: &str) -> u32 {
    let digits: String = reps.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Report-pressure check.
///
/// A user with many live reports keeps their computed status and reward, but
/// the verdict's verification status is downgraded to pending review.
#[must_use]
pub fn check_report_pressure(signals: TrustSignals, config: &AntiCheatConfig) -> Option<String> {
    if signals.report_count > config.report_pressure_threshold {
        Some(format!(
            "{} live reports against user exceeds threshold {}",
            signals.report_count, config.report_pressure_threshold
        ))
    } else {
        None
    }
}

/// Run every post-scoring heuristic and combine the downgrades
#[must_use]
pub fn review(
    plan: &WorkoutPlan,
    submission: &Submission,
    signals: TrustSignals,
    config: &AntiCheatConfig,
) -> TrustReview {
    let mut review = TrustReview::default();

    if let Some((outcome, reason)) = check_volume_plausibility(submission, config) {
        review.outcome = review.outcome.max(outcome);
        review.reasons.push(reason);
    }

    if let Some((outcome, reason)) = check_time_anomaly(plan, submission, config) {
        review.outcome = review.outcome.max(outcome);
        review.verification_pending = true;
        review.reasons.push(reason);
    }

    if let Some(reason) = check_report_pressure(signals, config) {
        review.verification_pending = true;
        review.reasons.push(reason);
    }

    review
}
