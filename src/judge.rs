// ABOUTME: Verdict assembly combining scoring, anti-cheat review, and reward policy
// ABOUTME: Never panics on well-formed input; malformed input fails fast before scoring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! The Judge
//!
//! Orchestrates evaluation of a submitted quest: the proof gate short-circuits
//! to a zero-reward rejection, otherwise sub-scores are computed, anti-cheat
//! heuristics are reviewed, and the reward policy converts the overall score
//! into an XP multiplier. Flagging reduces trust and visibility, not reward;
//! only an outright rejection awards nothing.

use tracing::info;

use crate::anti_cheat::{self, TrustOutcome, TrustSignals};
use crate::config::EngineConfig;
use crate::errors::AppResult;
use crate::models::{
    Grade, Quest, StatUpdates, Submission, Verdict, VerdictStatus, VerificationStatus,
};
use crate::{analyzer::FormAnalysis, scoring};

/// Assembles verdicts from submissions under a fixed policy configuration
#[derive(Debug, Clone, Default)]
pub struct Judge {
    config: EngineConfig,
}

impl Judge {
    /// Build a judge with explicit policy
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The active policy
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate a submission against its quest.
    ///
    /// `analysis` carries optional CV evidence; its absence never blocks
    /// evaluation. `signals` carries external trust inputs such as the live
    /// report count.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the plan or submission is malformed
    /// (zero base XP, out-of-range RPE or duration). A missing mandated proof
    /// is not an error here: it yields a `REJECTED` verdict with zero scores,
    /// matching the evaluation contract.
    pub fn evaluate(
        &self,
        quest: &Quest,
        submission: &Submission,
        analysis: Option<&FormAnalysis>,
        signals: TrustSignals,
    ) -> AppResult<Verdict> {
        quest.plan.validate()?;
        submission.validate()?;

        let plan = &quest.plan;

        // Proof gate runs before any scoring: nothing to evaluate without
        // the mandated evidence.
        if !anti_cheat::proof_satisfied(plan, submission) {
            info!(quest_id = %quest.id, "submission rejected: required proof missing");
            return Ok(Verdict::rejected(
                "Proof of completion is required for this quest. Submit again with proof attached.",
                true,
                false,
            ));
        }

        let integrity = scoring::integrity_score(analysis, &self.config.scoring);
        let effort = scoring::effort_score(plan, submission, &self.config.scoring);
        let safety = scoring::safety_score(analysis, submission, &self.config.scoring);
        let overall = scoring::overall_score(integrity, effort, safety);

        let review = anti_cheat::review(plan, submission, signals, &self.config.anti_cheat);

        if review.outcome == TrustOutcome::Reject {
            info!(quest_id = %quest.id, reasons = ?review.reasons, "submission rejected by anti-cheat");
            return Ok(Verdict::rejected(
                "Anomaly detected. The System does not tolerate deception.",
                plan.requires_proof,
                submission.has_proof(),
            ));
        }

        let multiplier = self.config.rewards.multiplier_for(overall);
        let final_xp = self.final_xp(plan.base_xp, multiplier);

        let status = match review.outcome {
            TrustOutcome::Clear => VerdictStatus::Approved,
            TrustOutcome::Flag => VerdictStatus::Flagged,
            TrustOutcome::RequireVerification | TrustOutcome::Reject => {
                VerdictStatus::PendingVerification
            }
        };
        let verification_status = if review.verification_pending {
            VerificationStatus::Pending
        } else {
            VerificationStatus::AutoApproved
        };

        let stat_updates = StatUpdates {
            strength_add: scale_stat(plan.stat_gain.strength, effort),
            agility_add: scale_stat(plan.stat_gain.agility, effort),
            stamina_add: scale_stat(plan.stat_gain.stamina, effort),
        };

        let verdict = Verdict {
            status,
            integrity_score: integrity,
            effort_score: effort,
            safety_score: safety,
            overall_score: overall,
            grade: Grade::for_overall(overall),
            xp_multiplier: multiplier,
            final_xp,
            system_message: system_message(status, effort, &review.reasons),
            proof_required: plan.requires_proof,
            proof_provided: submission.has_proof(),
            verification_status,
            stat_updates,
        };

        info!(
            quest_id = %quest.id,
            status = ?verdict.status,
            overall,
            final_xp,
            "verdict assembled"
        );
        Ok(verdict)
    }

    /// Round and clamp the reward to the policy ceiling
    fn final_xp(&self, base_xp: u32, multiplier: f64) -> u32 {
        let ceiling = (f64::from(base_xp) * self.config.rewards.max_multiplier).round() as u32;
        let awarded = (f64::from(base_xp) * multiplier).round() as u32;
        awarded.min(ceiling)
    }
}

/// Stat delta: the plan's gain potential scaled by realized effort
fn scale_stat(gain: u32, effort: f64) -> u32 {
    (f64::from(gain) * effort).round() as u32
}

/// System-voice message for the verdict surface
fn system_message(status: VerdictStatus, effort: f64, reasons: &[String]) -> String {
    match status {
        VerdictStatus::Approved => {
            if effort >= 0.95 {
                "Exceptional effort acknowledged. The System rewards those who push beyond limits."
                    .into()
            } else {
                "Protocol completed. Continue to prove your worth.".into()
            }
        }
        VerdictStatus::Flagged => format!(
            "Suspicious activity logged ({}). You are being monitored.",
            reasons.join("; ")
        ),
        VerdictStatus::PendingVerification => {
            "Submission held for verification. Rewards are provisional until reviewed.".into()
        }
        VerdictStatus::Rejected => "Submission rejected.".into(),
    }
}
