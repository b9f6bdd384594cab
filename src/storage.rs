// ABOUTME: Persistence trait with optimistic concurrency plus an in-memory backend
// ABOUTME: Quest status updates are version-checked CAS; progress is read-modify-write
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Persistence Boundary
//!
//! The engine persists through a narrow trait so real backends can be swapped
//! in without touching evaluation or progression logic. Quest rows carry a
//! version; the status update is a compare-and-swap against that version,
//! which is how the lifecycle enforces at-most-once terminal transitions.
//! [`MemoryStorage`] is the reference backend used in tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Quest, QuestStatus, QuestType, UserProgress, Verdict};

/// Appended evaluation log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictRecord {
    /// Log entry id
    pub id: Uuid,
    /// Evaluated quest
    pub quest_id: Uuid,
    /// Submitting user
    pub user_id: Uuid,
    /// The immutable verdict
    pub verdict: Verdict,
    /// Evaluation timestamp
    pub created_at: DateTime<Utc>,
}

/// Reason attached to a user report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportReason {
    /// Claimed numbers are physically implausible
    #[serde(rename = "Impossible_Stats")]
    ImpossibleStats,
    /// Proof media appears fabricated
    #[serde(rename = "Fake_Media")]
    FakeMedia,
    /// Pattern of suspicious submissions
    #[serde(rename = "Suspicious_Pattern")]
    SuspiciousPattern,
    /// Anything else
    Other,
}

/// A report filed against another user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report id
    pub id: Uuid,
    /// Filing user
    pub reporter_id: Uuid,
    /// Reported user
    pub target_user_id: Uuid,
    /// Specific log being reported, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_log_id: Option<Uuid>,
    /// Report reason
    pub reason: ReportReason,
    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Filing timestamp
    pub created_at: DateTime<Utc>,
}

/// Persistence contract consumed by the lifecycle.
///
/// Implementations must provide per-row optimistic concurrency on quests:
/// `update_quest_status` succeeds only when the caller's version matches the
/// stored one.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a freshly assigned quest.
    ///
    /// # Errors
    ///
    /// Returns a storage error when a quest with the same id already exists.
    async fn insert_quest(&self, quest: Quest) -> AppResult<()>;

    /// Fetch a quest and its current version.
    ///
    /// # Errors
    ///
    /// Returns a storage error on backend failure.
    async fn quest(&self, id: Uuid) -> AppResult<Option<(Quest, u64)>>;

    /// Compare-and-swap the quest status.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentTransition` when the stored version no longer
    /// matches `expected_version`, and `ResourceNotFound` for unknown ids.
    async fn update_quest_status(
        &self,
        id: Uuid,
        expected_version: u64,
        status: QuestStatus,
    ) -> AppResult<()>;

    /// Latest live daily quest created at or after `since` for a user.
    ///
    /// Failed and skipped quests are ignored so a failed day can regenerate.
    ///
    /// # Errors
    ///
    /// Returns a storage error on backend failure.
    async fn live_daily_quest(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Option<Quest>>;

    /// Active quests whose deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns a storage error on backend failure.
    async fn expired_active_quests(&self, now: DateTime<Utc>) -> AppResult<Vec<Quest>>;

    /// Load a user's progression state.
    ///
    /// # Errors
    ///
    /// Returns a storage error on backend failure.
    async fn progress(&self, user_id: Uuid) -> AppResult<Option<UserProgress>>;

    /// Store a user's progression state.
    ///
    /// # Errors
    ///
    /// Returns a storage error on backend failure.
    async fn upsert_progress(&self, progress: UserProgress) -> AppResult<()>;

    /// Append an evaluation log entry.
    ///
    /// # Errors
    ///
    /// Returns a storage error on backend failure.
    async fn append_verdict(&self, record: VerdictRecord) -> AppResult<()>;

    /// Record a report against a user.
    ///
    /// # Errors
    ///
    /// Returns a storage error on backend failure.
    async fn record_report(&self, report: Report) -> AppResult<()>;

    /// Live report count against a user.
    ///
    /// # Errors
    ///
    /// Returns a storage error on backend failure.
    async fn report_count(&self, target_user_id: Uuid) -> AppResult<u32>;

    /// Number of reports a user has filed at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns a storage error on backend failure.
    async fn reports_filed_since(&self, reporter_id: Uuid, since: DateTime<Utc>)
        -> AppResult<u32>;
}

/// In-memory reference backend
#[derive(Debug, Default)]
pub struct MemoryStorage {
    quests: DashMap<Uuid, (Quest, u64)>,
    progress: DashMap<Uuid, UserProgress>,
    verdicts: RwLock<Vec<VerdictRecord>>,
    reports: RwLock<Vec<Report>>,
}

impl MemoryStorage {
    /// Fresh empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert_quest(&self, quest: Quest) -> AppResult<()> {
        let id = quest.id;
        if self.quests.contains_key(&id) {
            return Err(AppError::storage(format!("quest {id} already exists")));
        }
        self.quests.insert(id, (quest, 0));
        Ok(())
    }

    async fn quest(&self, id: Uuid) -> AppResult<Option<(Quest, u64)>> {
        Ok(self.quests.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update_quest_status(
        &self,
        id: Uuid,
        expected_version: u64,
        status: QuestStatus,
    ) -> AppResult<()> {
        let Some(mut entry) = self.quests.get_mut(&id) else {
            return Err(AppError::not_found("quest").with_quest_id(id));
        };
        let (quest, version) = entry.value_mut();
        if *version != expected_version {
            return Err(AppError::concurrent_transition(format!(
                "quest version moved from {expected_version} to {version}"
            ))
            .with_quest_id(id));
        }
        quest.status = status;
        *version += 1;
        Ok(())
    }

    async fn live_daily_quest(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Option<Quest>> {
        let mut latest: Option<Quest> = None;
        for entry in self.quests.iter() {
            let (quest, _) = entry.value();
            if quest.user_id == user_id
                && quest.quest_type == QuestType::Daily
                && quest.created_at >= since
                && !matches!(quest.status, QuestStatus::Failed | QuestStatus::Skipped)
                && latest
                    .as_ref()
                    .is_none_or(|current| quest.created_at > current.created_at)
            {
                latest = Some(quest.clone());
            }
        }
        Ok(latest)
    }

    async fn expired_active_quests(&self, now: DateTime<Utc>) -> AppResult<Vec<Quest>> {
        Ok(self
            .quests
            .iter()
            .filter_map(|entry| {
                let (quest, _) = entry.value();
                (quest.status == QuestStatus::Active && quest.is_expired(now))
                    .then(|| quest.clone())
            })
            .collect())
    }

    async fn progress(&self, user_id: Uuid) -> AppResult<Option<UserProgress>> {
        Ok(self.progress.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn upsert_progress(&self, progress: UserProgress) -> AppResult<()> {
        self.progress.insert(progress.user_id, progress);
        Ok(())
    }

    async fn append_verdict(&self, record: VerdictRecord) -> AppResult<()> {
        self.verdicts.write().await.push(record);
        Ok(())
    }

    async fn record_report(&self, report: Report) -> AppResult<()> {
        self.reports.write().await.push(report);
        Ok(())
    }

    async fn report_count(&self, target_user_id: Uuid) -> AppResult<u32> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .filter(|report| report.target_user_id == target_user_id)
            .count() as u32)
    }

    async fn reports_filed_since(
        &self,
        reporter_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<u32> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .filter(|report| report.reporter_id == reporter_id && report.created_at >= since)
            .count() as u32)
    }
}
