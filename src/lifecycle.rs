// ABOUTME: Quest lifecycle service: assignment, submission, abort, rank-up exams, expiry sweep
// ABOUTME: Serializes the state transition + progression pair per user via a lock table and CAS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Quest Lifecycle
//!
//! The service layer tying the engine together. A submission moves a quest
//! from `Active` to the terminal state matching its verdict, applies the
//! awarded XP through the progression engine, and reports the cascade back to
//! the caller. Two concurrent submits for the same quest cannot both succeed:
//! the quest row is updated by compare-and-swap, and all progression writes
//! for a user happen under that user's lock.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analyzer::{FormAnalysis, FormAnalyzer, MediaKind};
use crate::anti_cheat::TrustSignals;
use crate::config::EngineConfig;
use crate::errors::{AppError, AppResult};
use crate::generator::{
    generate_or_fallback, GenerationRequest, QuestGenerator, DEFAULT_GENERATION_TIMEOUT,
};
use crate::judge::Judge;
use crate::models::{
    quest::can_transition, ProofType, Quest, QuestStatus, QuestType, RankTier, Submission,
    UserProgress, Verdict, VerdictStatus,
};
use crate::progression::ProgressionEngine;
use crate::storage::{Report, ReportReason, Storage, VerdictRecord};

/// Fixed reward potential of a rank-up exam
const RANK_UP_EXAM_XP: u32 = 500;
/// Time allowed to complete a rank-up exam
const RANK_UP_EXAM_HOURS: i64 = 24;

/// Result of a successful submission
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// The immutable evaluation verdict
    pub verdict: Verdict,
    /// Whether a level threshold was crossed
    pub leveled_up: bool,
    /// Level after the submission
    pub new_level: u32,
    /// Whether the rank advanced
    pub ranked_up: bool,
    /// Rank after the submission
    pub new_rank: RankTier,
}

/// Result of a user-initiated abort
#[derive(Debug, Clone)]
pub struct AbortOutcome {
    /// Partial XP awarded
    pub xp_awarded: u32,
    /// Whether a level threshold was crossed
    pub leveled_up: bool,
    /// Level after the abort
    pub new_level: u32,
    /// Whether the rank advanced
    pub ranked_up: bool,
    /// Rank after the abort
    pub new_rank: RankTier,
}

/// Caller input for a daily quest assignment
#[derive(Debug, Clone, Default)]
pub struct DailyQuestRequest {
    /// Requested workout length in minutes
    pub time_window_min: u32,
    /// Equipment available today
    pub equipment: Vec<String>,
    /// Muscle groups reported sore
    pub muscle_soreness: Vec<String>,
}

/// Caller input for filing a report
#[derive(Debug, Clone)]
pub struct ReportInput {
    /// Reported user
    pub target_user_id: Uuid,
    /// Specific log being reported, if any
    pub target_log_id: Option<Uuid>,
    /// Report reason
    pub reason: ReportReason,
    /// Free-form description
    pub description: Option<String>,
}

/// The quest lifecycle service
pub struct QuestLifecycle {
    storage: Arc<dyn Storage>,
    generator: Arc<dyn QuestGenerator>,
    analyzer: Option<Arc<dyn FormAnalyzer>>,
    judge: Judge,
    progression: ProgressionEngine,
    config: EngineConfig,
    generation_timeout: Duration,
    user_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl QuestLifecycle {
    /// Build the service from its collaborators and policy
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        generator: Arc<dyn QuestGenerator>,
        analyzer: Option<Arc<dyn FormAnalyzer>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            storage,
            generator,
            analyzer,
            judge: Judge::new(config.clone()),
            progression: ProgressionEngine::new(config.progression.clone()),
            config,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            user_locks: DashMap::new(),
        }
    }

    /// Override the generation time budget
    #[must_use]
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// The progression engine, for direct profile operations
    #[must_use]
    pub const fn progression(&self) -> &ProgressionEngine {
        &self.progression
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_progress(&self, user_id: Uuid) -> AppResult<UserProgress> {
        Ok(self
            .storage
            .progress(user_id)
            .await?
            .unwrap_or_else(|| UserProgress::new(user_id)))
    }

    /// Assign today's daily quest, generating a plan or reusing the live one.
    ///
    /// At most one live daily quest exists per user per day; failed and
    /// skipped quests do not count, so a failed day can regenerate.
    /// Generation failure falls back to the deterministic template and is
    /// never surfaced to the caller.
    ///
    /// # Errors
    ///
    /// Returns a storage error on persistence failure.
    pub async fn assign_daily_quest(
        &self,
        user_id: Uuid,
        request: DailyQuestRequest,
    ) -> AppResult<Quest> {
        let now = Utc::now();
        if let Some(existing) = self
            .storage
            .live_daily_quest(user_id, start_of_day(now))
            .await?
        {
            info!(user_id = %user_id, quest_id = %existing.id, "reusing live daily quest");
            return Ok(existing);
        }

        let progress = self.load_progress(user_id).await?;
        let generation = GenerationRequest {
            class: progress.class,
            rank: progress.rank,
            level: progress.level,
            time_window_min: request.time_window_min,
            equipment: request.equipment,
            muscle_soreness: request.muscle_soreness,
        };
        let plan =
            generate_or_fallback(self.generator.as_ref(), &generation, self.generation_timeout)
                .await;

        let quest = Quest::new(user_id, QuestType::Daily, plan, end_of_day(now));
        self.storage.insert_quest(quest.clone()).await?;
        info!(user_id = %user_id, quest_id = %quest.id, quest_name = %quest.plan.quest_name, "daily quest assigned");
        Ok(quest)
    }

    /// The rank a user could be examined for, if eligible
    #[must_use]
    pub fn rank_up_eligibility(progress: &UserProgress) -> Option<RankTier> {
        let next = progress.rank.next()?;
        (progress.level >= next.min_level()).then_some(next)
    }

    /// Start a rank-up exam: a proof-mandated boss quest at the next rank.
    ///
    /// # Errors
    ///
    /// Returns `NotEligible` when the user's level has not reached the next
    /// bracket, and a storage error on persistence failure.
    pub async fn start_rank_up_exam(&self, user_id: Uuid) -> AppResult<Quest> {
        let progress = self.load_progress(user_id).await?;
        let Some(next_rank) = Self::rank_up_eligibility(&progress) else {
            return Err(AppError::not_eligible(format!(
                "level {} does not qualify for a rank-up exam from {}",
                progress.level, progress.rank
            ))
            .with_user_id(user_id));
        };

        let generation = GenerationRequest {
            class: progress.class,
            rank: next_rank,
            level: progress.level,
            time_window_min: 45,
            equipment: vec!["Bodyweight".into()],
            muscle_soreness: vec![],
        };
        let mut plan =
            generate_or_fallback(self.generator.as_ref(), &generation, self.generation_timeout)
                .await;

        plan.quest_name = format!("GATEKEEPER EXAM: {}", next_rank.as_str().to_uppercase());
        plan.narrative_intro =
            "You stand before the Gate. Prove your strength to ascend.".into();
        plan.quest_rank = next_rank;
        plan.base_xp = RANK_UP_EXAM_XP;
        plan.requires_proof = true;
        plan.proof_type = Some(ProofType::Video);

        let quest = Quest::new(
            user_id,
            QuestType::RankUp,
            plan,
            Utc::now() + ChronoDuration::hours(RANK_UP_EXAM_HOURS),
        );
        self.storage.insert_quest(quest.clone()).await?;
        info!(user_id = %user_id, quest_id = %quest.id, rank = %next_rank, "rank-up exam started");
        Ok(quest)
    }

    /// Submit a quest execution report for evaluation.
    ///
    /// The quest transitions to the terminal state matching the verdict and
    /// the awarded XP is applied, atomically from the caller's perspective.
    /// A missing mandated proof surfaces as `ProofRequired` and leaves the
    /// quest `Active` for resubmission: no evaluation was attempted, which is
    /// deliberately distinct from evaluated-and-rejected.
    ///
    /// # Errors
    ///
    /// - validation errors for out-of-range fields, before any state change
    /// - `ResourceNotFound` for unknown quests
    /// - `ConcurrentTransition` when the quest is already terminal
    /// - `ProofRequired` when proof is mandated but absent
    pub async fn submit_quest(&self, submission: Submission) -> AppResult<SubmitOutcome> {
        submission.validate()?;

        let Some((quest, _)) = self.storage.quest(submission.quest_id).await? else {
            return Err(AppError::not_found("quest").with_quest_id(submission.quest_id));
        };

        let lock = self.user_lock(quest.user_id);
        let _guard = lock.lock().await;

        // Reload under the lock: another submit may have won the race.
        let Some((quest, version)) = self.storage.quest(submission.quest_id).await? else {
            return Err(AppError::not_found("quest").with_quest_id(submission.quest_id));
        };
        if quest.status.is_terminal() {
            return Err(AppError::concurrent_transition(format!(
                "quest is already {:?}",
                quest.status
            ))
            .with_quest_id(quest.id));
        }

        if quest.requires_proof && !submission.has_proof() {
            // No evaluation attempt occurred; the quest is not burned.
            return Err(AppError::proof_required(
                "proof media is required for this quest; submit again with proof attached",
            )
            .with_quest_id(quest.id));
        }

        let analysis = self.analyze_proof(&submission).await;
        let signals = TrustSignals {
            report_count: self.storage.report_count(quest.user_id).await?,
        };
        let verdict = self
            .judge
            .evaluate(&quest, &submission, analysis.as_ref(), signals)?;

        let next_status = match verdict.status {
            VerdictStatus::Approved | VerdictStatus::Flagged => QuestStatus::Completed,
            VerdictStatus::Rejected => QuestStatus::Failed,
            VerdictStatus::PendingVerification => QuestStatus::PendingVerification,
        };
        debug_assert!(can_transition(quest.status, next_status));

        // CAS commits the terminal transition first; the progression write
        // below only happens for the winner, which keeps the pair atomic
        // from the caller's perspective.
        self.storage
            .update_quest_status(quest.id, version, next_status)
            .await?;

        let progress = self.load_progress(quest.user_id).await?;
        let (updated, leveled_up, ranked_up) = self.apply_verdict(&quest, &verdict, progress);
        let new_level = updated.level;
        let new_rank = updated.rank;
        self.storage.upsert_progress(updated).await?;

        self.storage
            .append_verdict(VerdictRecord {
                id: Uuid::new_v4(),
                quest_id: quest.id,
                user_id: quest.user_id,
                verdict: verdict.clone(),
                created_at: Utc::now(),
            })
            .await?;

        info!(
            quest_id = %quest.id,
            user_id = %quest.user_id,
            status = ?verdict.status,
            final_xp = verdict.final_xp,
            leveled_up,
            ranked_up,
            "quest submission committed"
        );

        Ok(SubmitOutcome {
            verdict,
            leveled_up,
            new_level,
            ranked_up,
            new_rank,
        })
    }

    /// Apply a verdict's rewards to a profile.
    ///
    /// Daily quests level the user but never promote rank past a bracket;
    /// promotion requires an approved rank-up exam. Rejections reset the
    /// streak and award nothing.
    fn apply_verdict(
        &self,
        quest: &Quest,
        verdict: &Verdict,
        progress: UserProgress,
    ) -> (UserProgress, bool, bool) {
        let old_rank = progress.rank;

        let (mut updated, leveled_up, mut ranked_up) = if verdict.final_xp > 0 {
            let outcome = self
                .progression
                .apply_xp(&progress, u64::from(verdict.final_xp));
            (outcome.progress, outcome.leveled_up, outcome.ranked_up)
        } else {
            (progress, false, false)
        };

        let exam_passed =
            quest.quest_type == QuestType::RankUp && verdict.status == VerdictStatus::Approved;
        if ranked_up && !exam_passed {
            updated.rank = old_rank;
            ranked_up = false;
        }

        if verdict.status == VerdictStatus::Rejected {
            updated.streak_current = 0;
        } else {
            updated.streak_current += 1;
            updated.streak_best = updated.streak_best.max(updated.streak_current);
        }

        updated.stats_strength += verdict.stat_updates.strength_add;
        updated.stats_agility += verdict.stat_updates.agility_add;
        updated.stats_stamina += verdict.stat_updates.stamina_add;
        updated.last_activity_at = Some(Utc::now());

        (updated, leveled_up, ranked_up)
    }

    async fn analyze_proof(&self, submission: &Submission) -> Option<FormAnalysis> {
        let analyzer = self.analyzer.as_ref()?;
        let url = submission.proof_media_url.as_deref()?;
        if url.is_empty() {
            return None;
        }
        let kind = if submission.proof_type.is_video() {
            MediaKind::Video
        } else {
            MediaKind::Photo
        };
        match analyzer.analyze(url, kind).await {
            Ok(analysis) => Some(analysis),
            Err(error) => {
                // Analyzer trouble is "no CV evidence", not an evaluation failure.
                warn!(%error, "form analysis unavailable, proceeding without CV evidence");
                None
            }
        }
    }

    /// Abort an active quest, awarding the fixed partial reward.
    ///
    /// An explicit escape hatch distinct from failure: the quest completes
    /// with a fraction of its base XP and no scoring or anti-cheat runs.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown quests and
    /// `ConcurrentTransition` when the quest is already terminal.
    pub async fn abort_quest(&self, quest_id: Uuid) -> AppResult<AbortOutcome> {
        let Some((quest, _)) = self.storage.quest(quest_id).await? else {
            return Err(AppError::not_found("quest").with_quest_id(quest_id));
        };

        let lock = self.user_lock(quest.user_id);
        let _guard = lock.lock().await;

        let Some((quest, version)) = self.storage.quest(quest_id).await? else {
            return Err(AppError::not_found("quest").with_quest_id(quest_id));
        };
        if quest.status.is_terminal() {
            return Err(AppError::concurrent_transition(format!(
                "quest is already {:?}",
                quest.status
            ))
            .with_quest_id(quest.id));
        }

        let xp_awarded = (f64::from(quest.plan.base_xp) * self.config.rewards.abort_xp_fraction)
            .round() as u32;

        self.storage
            .update_quest_status(quest.id, version, QuestStatus::Completed)
            .await?;

        let progress = self.load_progress(quest.user_id).await?;
        let outcome = self.progression.apply_xp(&progress, u64::from(xp_awarded));
        self.storage.upsert_progress(outcome.progress).await?;

        info!(
            quest_id = %quest.id,
            user_id = %quest.user_id,
            xp_awarded,
            "quest aborted with partial reward"
        );

        Ok(AbortOutcome {
            xp_awarded,
            leveled_up: outcome.leveled_up,
            new_level: outcome.new_level,
            ranked_up: outcome.ranked_up,
            new_rank: outcome.new_rank,
        })
    }

    /// Fail all active quests whose deadline has passed, with zero XP.
    ///
    /// Quests that race with a concurrent submit are skipped; the submit
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the expired set cannot be listed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let expired = self.storage.expired_active_quests(now).await?;
        let mut swept = 0;
        for quest in expired {
            let lock = self.user_lock(quest.user_id);
            let _guard = lock.lock().await;

            let Some((current, version)) = self.storage.quest(quest.id).await? else {
                continue;
            };
            if current.status.is_terminal() {
                continue;
            }
            match self
                .storage
                .update_quest_status(quest.id, version, QuestStatus::Failed)
                .await
            {
                Ok(()) => swept += 1,
                Err(error) => warn!(quest_id = %quest.id, %error, "expiry sweep lost a race"),
            }
        }
        if swept > 0 {
            info!(swept, "expired quests failed by sweep");
        }
        Ok(swept)
    }

    /// File a report against another user.
    ///
    /// # Errors
    ///
    /// Rejects self-reports as invalid input and enforces the daily
    /// per-reporter cap with `ReportLimitExceeded`.
    pub async fn report_user(&self, reporter_id: Uuid, input: ReportInput) -> AppResult<Report> {
        if reporter_id == input.target_user_id {
            return Err(AppError::invalid_input("cannot report yourself"));
        }

        let filed_today = self
            .storage
            .reports_filed_since(reporter_id, start_of_day(Utc::now()))
            .await?;
        if filed_today >= self.config.rewards.daily_report_limit {
            return Err(AppError::report_limit_exceeded(
                self.config.rewards.daily_report_limit,
            ));
        }

        let report = Report {
            id: Uuid::new_v4(),
            reporter_id,
            target_user_id: input.target_user_id,
            target_log_id: input.target_log_id,
            reason: input.reason,
            description: input.description,
            created_at: Utc::now(),
        };
        self.storage.record_report(report.clone()).await?;
        info!(reporter_id = %report.reporter_id, target = %report.target_user_id, "report recorded");
        Ok(report)
    }
}

/// Midnight at the start of the given day
fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |dt| dt.and_utc())
}

/// Last second of the given day, the daily quest deadline
fn end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(23, 59, 59)
        .map_or(now, |dt| dt.and_utc())
}
