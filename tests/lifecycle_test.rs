// ABOUTME: Integration tests for the quest lifecycle service end to end
// ABOUTME: Covers submit/abort flows, proof gating, concurrency, sweep, reports, and rank exams
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{full_submission, make_plan, make_quest, OfflineGenerator, StubGenerator};
use std::sync::Arc;
use uuid::Uuid;

use chrono::{Duration, Utc};
use levelup_engine::config::{EngineConfig, ProgressionConfig};
use levelup_engine::errors::ErrorCode;
use levelup_engine::lifecycle::{DailyQuestRequest, QuestLifecycle, ReportInput};
use levelup_engine::models::{QuestStatus, RankTier, VerdictStatus, VerificationStatus};
use levelup_engine::progression::XpCurve;
use levelup_engine::storage::{MemoryStorage, ReportReason, Storage};

fn service(
    base_xp: u32,
    requires_proof: bool,
    config: EngineConfig,
) -> (Arc<MemoryStorage>, Arc<QuestLifecycle>) {
    let storage = Arc::new(MemoryStorage::new());
    let generator = Arc::new(StubGenerator {
        plan: make_plan(base_xp, requires_proof, 60),
    });
    let lifecycle = Arc::new(QuestLifecycle::new(
        storage.clone(),
        generator,
        None,
        config,
    ));
    (storage, lifecycle)
}

#[tokio::test]
async fn test_submit_completes_quest_and_applies_xp() {
    let (storage, lifecycle) = service(1000, false, EngineConfig::default());
    let user_id = Uuid::new_v4();

    let quest = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();

    let outcome = lifecycle
        .submit_quest(full_submission(&quest, 7, 50, None))
        .await
        .unwrap();

    assert_eq!(outcome.verdict.status, VerdictStatus::Approved);
    assert_eq!(outcome.verdict.final_xp, 1500);

    let (stored, _) = storage.quest(quest.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuestStatus::Completed);

    let progress = storage.progress(user_id).await.unwrap().unwrap();
    assert_eq!(progress.total_xp, 1500);
    assert_eq!(progress.streak_current, 1);
    // stat gains scaled by full effort
    assert_eq!(progress.stats_strength, 12);
}

#[tokio::test]
async fn test_second_submit_is_a_concurrent_transition() {
    let (_storage, lifecycle) = service(1000, false, EngineConfig::default());
    let user_id = Uuid::new_v4();
    let quest = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();

    lifecycle
        .submit_quest(full_submission(&quest, 7, 50, None))
        .await
        .unwrap();

    let second = lifecycle
        .submit_quest(full_submission(&quest, 7, 50, None))
        .await;
    let error = second.unwrap_err();
    assert_eq!(error.code, ErrorCode::ConcurrentTransition);
}

#[tokio::test]
async fn test_racing_submits_cannot_both_succeed() {
    let (_storage, lifecycle) = service(1000, false, EngineConfig::default());
    let user_id = Uuid::new_v4();
    let quest = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();

    let a = {
        let lifecycle = lifecycle.clone();
        let submission = full_submission(&quest, 7, 50, None);
        tokio::spawn(async move { lifecycle.submit_quest(submission).await })
    };
    let b = {
        let lifecycle = lifecycle.clone();
        let submission = full_submission(&quest, 7, 50, None);
        tokio::spawn(async move { lifecycle.submit_quest(submission).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_missing_proof_leaves_quest_active_for_resubmission() {
    let (storage, lifecycle) = service(800, true, EngineConfig::default());
    let user_id = Uuid::new_v4();
    let quest = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();

    let refused = lifecycle
        .submit_quest(full_submission(&quest, 7, 50, None))
        .await;
    assert_eq!(refused.unwrap_err().code, ErrorCode::ProofRequired);

    // not burned: still active, no XP moved
    let (stored, _) = storage.quest(quest.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuestStatus::Active);
    assert!(storage.progress(user_id).await.unwrap().is_none());

    // resubmission with proof attached goes through
    let outcome = lifecycle
        .submit_quest(full_submission(
            &quest,
            7,
            50,
            Some("https://cdn.example/proof.mp4"),
        ))
        .await
        .unwrap();
    assert_eq!(outcome.verdict.status, VerdictStatus::Approved);

    let (stored, _) = storage.quest(quest.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuestStatus::Completed);
}

#[tokio::test]
async fn test_time_anomaly_without_proof_parks_quest_for_verification() {
    let (storage, lifecycle) = service(1000, false, EngineConfig::default());
    let user_id = Uuid::new_v4();
    let quest = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();

    // 5 minutes against the 60-minute estimate
    let outcome = lifecycle
        .submit_quest(full_submission(&quest, 7, 5, None))
        .await
        .unwrap();

    assert_eq!(outcome.verdict.status, VerdictStatus::PendingVerification);
    assert_eq!(
        outcome.verdict.verification_status,
        VerificationStatus::Pending
    );
    // reward is provisional but applied
    assert_eq!(outcome.verdict.final_xp, 1500);

    let (stored, _) = storage.quest(quest.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuestStatus::PendingVerification);

    let progress = storage.progress(user_id).await.unwrap().unwrap();
    assert_eq!(progress.total_xp, 1500);
}

#[tokio::test]
async fn test_abort_awards_fixed_partial_fraction() {
    let (storage, lifecycle) = service(1000, false, EngineConfig::default());
    let user_id = Uuid::new_v4();
    let quest = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();

    let outcome = lifecycle.abort_quest(quest.id).await.unwrap();
    assert_eq!(outcome.xp_awarded, 200);

    // abort completes the quest rather than failing it
    let (stored, _) = storage.quest(quest.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuestStatus::Completed);

    let progress = storage.progress(user_id).await.unwrap().unwrap();
    assert_eq!(progress.total_xp, 200);

    // a second abort is refused
    let again = lifecycle.abort_quest(quest.id).await;
    assert_eq!(again.unwrap_err().code, ErrorCode::ConcurrentTransition);
}

#[tokio::test]
async fn test_rejected_submission_fails_quest_and_resets_streak() {
    let (storage, lifecycle) = service(1000, false, EngineConfig::default());
    let user_id = Uuid::new_v4();

    // build up a streak first
    let quest = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();
    lifecycle
        .submit_quest(full_submission(&quest, 7, 50, None))
        .await
        .unwrap();
    let xp_after_first = storage.progress(user_id).await.unwrap().unwrap().total_xp;

    // a second quest submitted with a physically impossible rep volume
    let cheat_quest = make_quest(user_id, make_plan(1000, false, 60));
    storage.insert_quest(cheat_quest.clone()).await.unwrap();
    let mut cheat = full_submission(&cheat_quest, 7, 5, None);
    for log in &mut cheat.exercises_completed {
        log.sets_done = 100;
        log.reps_done = "100".into();
    }

    let outcome = lifecycle.submit_quest(cheat).await.unwrap();
    assert_eq!(outcome.verdict.status, VerdictStatus::Rejected);
    assert_eq!(outcome.verdict.final_xp, 0);

    let (stored, _) = storage.quest(cheat_quest.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuestStatus::Failed);

    let progress = storage.progress(user_id).await.unwrap().unwrap();
    assert_eq!(progress.streak_current, 0);
    assert_eq!(progress.total_xp, xp_after_first);
}

#[tokio::test]
async fn test_daily_quest_is_deduplicated_per_day() {
    let (_storage, lifecycle) = service(1000, false, EngineConfig::default());
    let user_id = Uuid::new_v4();

    let first = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();
    let second = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_offline_generator_falls_back_deterministically() {
    let storage = Arc::new(MemoryStorage::new());
    let lifecycle = QuestLifecycle::new(
        storage,
        Arc::new(OfflineGenerator),
        None,
        EngineConfig::default(),
    );
    let user_id = Uuid::new_v4();

    let quest = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();

    // fallback template for a fresh E-Rank user
    assert_eq!(quest.plan.base_xp, 300);
    assert!(!quest.requires_proof);
    assert_eq!(quest.plan.exercises.len(), 3);
}

#[tokio::test]
async fn test_sweep_fails_expired_active_quests_with_zero_xp() {
    let (storage, lifecycle) = service(1000, false, EngineConfig::default());
    let user_id = Uuid::new_v4();

    let mut expired = make_quest(user_id, make_plan(1000, false, 60));
    expired.expires_at = Utc::now() - Duration::hours(1);
    storage.insert_quest(expired.clone()).await.unwrap();

    let swept = lifecycle.sweep_expired(Utc::now()).await.unwrap();
    assert_eq!(swept, 1);

    let (stored, _) = storage.quest(expired.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuestStatus::Failed);
    assert!(storage.progress(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_report_flow_enforces_caps_and_feeds_pressure_check() {
    let (_storage, lifecycle) = service(1000, false, EngineConfig::default());
    let reporter = Uuid::new_v4();
    let target = Uuid::new_v4();

    let self_report = lifecycle
        .report_user(
            reporter,
            ReportInput {
                target_user_id: reporter,
                target_log_id: None,
                reason: ReportReason::Other,
                description: None,
            },
        )
        .await;
    assert_eq!(self_report.unwrap_err().code, ErrorCode::InvalidInput);

    for _ in 0..5 {
        lifecycle
            .report_user(
                reporter,
                ReportInput {
                    target_user_id: target,
                    target_log_id: None,
                    reason: ReportReason::SuspiciousPattern,
                    description: Some("same 2-minute workout every day".into()),
                },
            )
            .await
            .unwrap();
    }
    let capped = lifecycle
        .report_user(
            reporter,
            ReportInput {
                target_user_id: target,
                target_log_id: None,
                reason: ReportReason::Other,
                description: None,
            },
        )
        .await;
    assert_eq!(capped.unwrap_err().code, ErrorCode::ReportLimitExceeded);

    // the reported user's next submission keeps its reward but loses
    // auto-approval
    let quest = lifecycle
        .assign_daily_quest(target, DailyQuestRequest::default())
        .await
        .unwrap();
    let outcome = lifecycle
        .submit_quest(full_submission(&quest, 7, 50, None))
        .await
        .unwrap();
    assert_eq!(outcome.verdict.status, VerdictStatus::Approved);
    assert_eq!(
        outcome.verdict.verification_status,
        VerificationStatus::Pending
    );
}

#[tokio::test]
async fn test_daily_quests_level_up_but_never_promote_rank() {
    // one level per 50 XP up to level 10, then a long plateau
    let config = EngineConfig {
        progression: ProgressionConfig {
            curve: XpCurve::Table {
                thresholds: vec![50, 100, 150, 200, 250, 300, 350, 400, 450, 2_000],
            },
        },
        ..EngineConfig::default()
    };
    let (storage, lifecycle) = service(300, false, config);
    let user_id = Uuid::new_v4();

    let quest = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();
    let outcome = lifecycle
        .submit_quest(full_submission(&quest, 7, 50, None))
        .await
        .unwrap();

    // 300 x 1.5 = 450 XP puts the user at level 10, the D bracket
    assert!(outcome.leveled_up);
    assert_eq!(outcome.new_level, 10);
    assert!(!outcome.ranked_up);
    assert_eq!(outcome.new_rank, RankTier::E);

    let progress = storage.progress(user_id).await.unwrap().unwrap();
    assert_eq!(progress.rank, RankTier::E);
}

#[tokio::test]
async fn test_rank_up_exam_promotes_on_approval() {
    let config = EngineConfig {
        progression: ProgressionConfig {
            curve: XpCurve::Table {
                thresholds: vec![50, 100, 150, 200, 250, 300, 350, 400, 450, 2_000],
            },
        },
        ..EngineConfig::default()
    };
    let (storage, lifecycle) = service(300, false, config);
    let user_id = Uuid::new_v4();

    // reach level 10 via a daily quest first
    let daily = lifecycle
        .assign_daily_quest(user_id, DailyQuestRequest::default())
        .await
        .unwrap();
    lifecycle
        .submit_quest(full_submission(&daily, 7, 50, None))
        .await
        .unwrap();

    let exam = lifecycle.start_rank_up_exam(user_id).await.unwrap();
    assert!(exam.requires_proof);
    assert_eq!(exam.plan.base_xp, 500);
    assert_eq!(exam.rank_difficulty, RankTier::D);

    let outcome = lifecycle
        .submit_quest(full_submission(
            &exam,
            7,
            50,
            Some("https://cdn.example/exam.mp4"),
        ))
        .await
        .unwrap();

    assert_eq!(outcome.verdict.status, VerdictStatus::Approved);
    assert!(outcome.ranked_up);
    assert_eq!(outcome.new_rank, RankTier::D);

    let progress = storage.progress(user_id).await.unwrap().unwrap();
    assert_eq!(progress.rank, RankTier::D);
}

#[tokio::test]
async fn test_rank_up_exam_requires_eligibility() {
    let (_storage, lifecycle) = service(300, false, EngineConfig::default());
    let user_id = Uuid::new_v4();

    let refused = lifecycle.start_rank_up_exam(user_id).await;
    assert_eq!(refused.unwrap_err().code, ErrorCode::NotEligible);
}
