// ABOUTME: Integration tests for verdict assembly through the public Judge API
// ABOUTME: Covers reward bounds, proof gating, anomaly flagging, and scoring scenarios
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs, clippy::float_cmp)]

mod common;

use common::{full_submission, make_plan, make_quest};
use uuid::Uuid;

use levelup_engine::analyzer::FormAnalysis;
use levelup_engine::anti_cheat::TrustSignals;
use levelup_engine::config::EngineConfig;
use levelup_engine::models::{Grade, VerdictStatus, VerificationStatus};
use levelup_engine::Judge;

#[test]
fn test_reward_stays_within_policy_bounds_across_input_grid() {
    let judge = Judge::new(EngineConfig::default());
    let quest = make_quest(Uuid::new_v4(), make_plan(1000, false, 60));
    let ceiling = 1500;

    for rpe in [1, 4, 7, 10] {
        for duration in [1, 10, 45, 240] {
            let submission = full_submission(&quest, rpe, duration, None);
            let verdict = judge
                .evaluate(&quest, &submission, None, TrustSignals::default())
                .unwrap();
            assert!(
                verdict.final_xp <= ceiling,
                "rpe={rpe} duration={duration} awarded {}",
                verdict.final_xp
            );
        }
    }
}

#[test]
fn test_perfect_no_cv_submission_hits_published_scenario() {
    // base_xp 1000, RPE matches target, all exercises done, no CV input:
    // effort 1.0, integrity 0.75, safety 1.0 -> overall 0.9166 -> 1.5x -> 1500
    let judge = Judge::new(EngineConfig::default());
    let quest = make_quest(Uuid::new_v4(), make_plan(1000, false, 60));
    let submission = full_submission(&quest, 7, 50, None);

    let verdict = judge
        .evaluate(&quest, &submission, None, TrustSignals::default())
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Approved);
    assert_eq!(verdict.effort_score, 1.0);
    assert_eq!(verdict.integrity_score, 0.75);
    assert_eq!(verdict.safety_score, 1.0);
    assert!((verdict.overall_score - 0.916_666).abs() < 1e-3);
    assert_eq!(verdict.grade, Grade::S);
    assert_eq!(verdict.final_xp, 1500);
}

#[test]
fn test_missing_required_proof_rejected_with_no_scoring() {
    let judge = Judge::new(EngineConfig::default());
    let quest = make_quest(Uuid::new_v4(), make_plan(800, true, 45));
    let submission = full_submission(&quest, 7, 40, None);

    let verdict = judge
        .evaluate(&quest, &submission, None, TrustSignals::default())
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Rejected);
    assert_eq!(verdict.final_xp, 0);
    assert_eq!(verdict.integrity_score, 0.0);
    assert_eq!(verdict.effort_score, 0.0);
    assert_eq!(verdict.safety_score, 0.0);
    assert!(verdict.proof_required);
    assert!(!verdict.proof_provided);
}

#[test]
fn test_time_anomaly_flags_but_keeps_table_reward() {
    // 5 minutes against a 60 minute estimate triggers the anomaly check
    let judge = Judge::new(EngineConfig::default());
    let quest = make_quest(Uuid::new_v4(), make_plan(1000, false, 60));
    let submission = full_submission(&quest, 7, 5, None);

    let verdict = judge
        .evaluate(&quest, &submission, None, TrustSignals::default())
        .unwrap();

    assert!(matches!(
        verdict.status,
        VerdictStatus::Flagged | VerdictStatus::PendingVerification
    ));
    assert_eq!(verdict.verification_status, VerificationStatus::Pending);
    assert_eq!(verdict.final_xp, 1500);
}

#[test]
fn test_video_analysis_raises_integrity_over_baseline() {
    let judge = Judge::new(EngineConfig::default());
    let quest = make_quest(Uuid::new_v4(), make_plan(1000, false, 60));
    let submission = full_submission(&quest, 7, 50, Some("https://cdn.example/proof.mp4"));

    let analysis = FormAnalysis {
        exercise_type: Some("push-up".into()),
        form_score: 0.95,
        technique_score: 0.92,
        range_of_motion: 0.9,
        consistency_score: Some(0.94),
        safety_issues: vec![],
        rep_count: Some(30),
        confidence: 0.85,
    };

    let verdict = judge
        .evaluate(&quest, &submission, Some(&analysis), TrustSignals::default())
        .unwrap();

    assert!(verdict.integrity_score > 0.75);
    assert_eq!(verdict.status, VerdictStatus::Approved);
}

#[test]
fn test_safety_issues_drag_down_overall_and_multiplier() {
    let judge = Judge::new(EngineConfig::default());
    let quest = make_quest(Uuid::new_v4(), make_plan(1000, false, 60));
    let mut submission = full_submission(&quest, 7, 50, Some("https://cdn.example/proof.mp4"));
    submission.anomalies_injuries = Some("lower back twinge on final set".into());

    let analysis = FormAnalysis {
        exercise_type: None,
        form_score: 0.7,
        technique_score: 0.7,
        range_of_motion: 0.7,
        consistency_score: Some(0.7),
        safety_issues: vec![
            "rounded lower back".into(),
            "knees caving inward".into(),
        ],
        rep_count: None,
        confidence: 0.8,
    };

    let verdict = judge
        .evaluate(&quest, &submission, Some(&analysis), TrustSignals::default())
        .unwrap();

    // three issues at 0.15 each
    assert!((verdict.safety_score - 0.55).abs() < 1e-9);
    assert!(verdict.final_xp < 1500);
}

#[test]
fn test_report_pressure_downgrades_verification_without_touching_reward() {
    let judge = Judge::new(EngineConfig::default());
    let quest = make_quest(Uuid::new_v4(), make_plan(1000, false, 60));
    let submission = full_submission(&quest, 7, 50, None);

    let verdict = judge
        .evaluate(&quest, &submission, None, TrustSignals { report_count: 7 })
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Approved);
    assert_eq!(verdict.verification_status, VerificationStatus::Pending);
    assert_eq!(verdict.final_xp, 1500);
}

#[test]
fn test_impossible_rep_volume_is_rejected_outright() {
    let judge = Judge::new(EngineConfig::default());
    let quest = make_quest(Uuid::new_v4(), make_plan(1000, false, 60));
    let mut submission = full_submission(&quest, 7, 5, None);
    for log in &mut submission.exercises_completed {
        log.sets_done = 100;
        log.reps_done = "100".into();
    }

    let verdict = judge
        .evaluate(&quest, &submission, None, TrustSignals::default())
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Rejected);
    assert_eq!(verdict.final_xp, 0);
}

#[test]
fn test_low_effort_submission_lands_in_floor_band() {
    let judge = Judge::new(EngineConfig::default());
    let quest = make_quest(Uuid::new_v4(), make_plan(1000, false, 60));
    // nothing completed, RPE far off target
    let mut submission = full_submission(&quest, 1, 60, None);
    submission.exercises_completed.clear();

    let verdict = judge
        .evaluate(&quest, &submission, None, TrustSignals::default())
        .unwrap();

    // effort = 0.4 * (1 - 6/9) = 0.1333; overall = (0.75 + 0.1333 + 1.0)/3 = 0.628
    assert_eq!(verdict.grade, Grade::C);
    assert_eq!(verdict.final_xp, 1000);
}
