// ABOUTME: Evaluation verdicts with sub-scores, XP award, and verification status
// ABOUTME: Immutable once produced by the judge; final_xp is bounded by the policy ceiling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

use serde::{Deserialize, Serialize};

/// Outcome status of an evaluated submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    /// Submission accepted at face value
    #[serde(rename = "APPROVED")]
    Approved,
    /// Submission rejected; no reward
    #[serde(rename = "REJECTED")]
    Rejected,
    /// Accepted with reduced trust; reward still applies
    #[serde(rename = "FLAGGED")]
    Flagged,
    /// Held for manual verification
    #[serde(rename = "PENDING_VERIFICATION")]
    PendingVerification,
}

/// Trust state attached to a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VerificationStatus {
    /// Accepted without manual review
    #[default]
    #[serde(rename = "Auto_Approved")]
    AutoApproved,
    /// Awaiting manual review
    Pending,
    /// Manually verified
    Verified,
    /// Manually rejected
    Rejected,
}

/// Display grade derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// Overall below 0.6
    D,
    /// Overall at least 0.6
    C,
    /// Overall at least 0.7
    B,
    /// Overall at least 0.8
    A,
    /// Overall at least 0.9
    S,
}

impl Grade {
    /// Grade band for an overall score
    #[must_use]
    pub fn for_overall(overall: f64) -> Self {
        if overall >= 0.9 {
            Self::S
        } else if overall >= 0.8 {
            Self::A
        } else if overall >= 0.7 {
            Self::B
        } else if overall >= 0.6 {
            Self::C
        } else {
            Self::D
        }
    }
}

/// Stat deltas awarded alongside XP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatUpdates {
    /// Strength points to add
    pub strength_add: u32,
    /// Agility points to add
    pub agility_add: u32,
    /// Stamina points to add
    pub stamina_add: u32,
}

/// The evaluation outcome for a submitted quest.
///
/// Produced once by the judge and never mutated. `final_xp` is always within
/// `0..=base_xp * max_multiplier` under the active reward policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Outcome status
    pub status: VerdictStatus,
    /// Self-report plausibility and form quality, 0-1
    pub integrity_score: f64,
    /// Exertion relative to the prescription, 0-1
    pub effort_score: f64,
    /// Safety of execution, 0-1
    pub safety_score: f64,
    /// Unweighted mean of the three sub-scores, 0-1
    pub overall_score: f64,
    /// Display grade band for the overall score
    pub grade: Grade,
    /// Reward multiplier applied to the plan's base XP
    pub xp_multiplier: f64,
    /// XP actually awarded
    pub final_xp: u32,
    /// System-voice message shown to the user
    pub system_message: String,
    /// Whether the quest mandated proof
    pub proof_required: bool,
    /// Whether proof was attached to the submission
    pub proof_provided: bool,
    /// Trust state
    pub verification_status: VerificationStatus,
    /// Stat deltas scaled by effort
    pub stat_updates: StatUpdates,
}

impl Verdict {
    /// A zero-reward rejection verdict.
    ///
    /// Used both for the proof gate (no scoring attempted) and for
    /// evaluated-and-failed outcomes; scores and XP are all zero.
    #[must_use]
    pub fn rejected(message: impl Into<String>, proof_required: bool, proof_provided: bool) -> Self {
        Self {
            status: VerdictStatus::Rejected,
            integrity_score: 0.0,
            effort_score: 0.0,
            safety_score: 0.0,
            overall_score: 0.0,
            grade: Grade::D,
            xp_multiplier: 0.0,
            final_xp: 0,
            system_message: message.into(),
            proof_required,
            proof_provided,
            verification_status: VerificationStatus::Rejected,
            stat_updates: StatUpdates::default(),
        }
    }
}
