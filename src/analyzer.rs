// ABOUTME: Form analyzer interface and the FormAnalysis contract for proof media
// ABOUTME: Analyzer absence is never an error; integrity falls back to its baseline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Form Analyzer Interface
//!
//! The engine consumes form analysis through a narrow trait so a real
//! computer-vision model can be substituted without touching scoring logic.
//! Every score in the contract is in `[0, 1]`. When no analyzer is wired in,
//! or an analysis attempt fails, evaluation proceeds without CV evidence.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Media kinds an analyzer can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image
    Photo,
    /// Video or timelapse
    Video,
}

/// Result of analyzing proof media.
///
/// `consistency_score` is only present for video analysis, where form can be
/// compared across sets; its presence switches the integrity blend weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormAnalysis {
    /// Detected exercise, if recognized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<String>,
    /// Overall form quality, 0-1
    pub form_score: f64,
    /// Technique quality, 0-1
    pub technique_score: f64,
    /// Range of motion, 0-1
    pub range_of_motion: f64,
    /// Consistency across sets, 0-1; video only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency_score: Option<f64>,
    /// Safety problems detected in the media
    pub safety_issues: Vec<String>,
    /// Reps counted from video, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep_count: Option<u32>,
    /// Analyzer confidence in its own output, 0-1
    pub confidence: f64,
}

impl FormAnalysis {
    /// Human-readable confidence note for display surfaces
    #[must_use]
    pub fn confidence_message(&self) -> &'static str {
        if self.confidence >= 0.9 {
            "High confidence in form analysis"
        } else if self.confidence >= 0.7 {
            "Good confidence in form analysis"
        } else if self.confidence >= 0.5 {
            "Moderate confidence - manual review recommended"
        } else {
            "Low confidence - manual review recommended"
        }
    }
}

/// Analyzer failure modes.
///
/// `Unavailable` is treated as "no CV evidence" by the judge, not as an
/// evaluation error.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The analyzer backend is not reachable
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),
    /// The media could not be analyzed
    #[error("analysis failed: {0}")]
    Failed(String),
}

/// Contract a form analyzer must satisfy
#[async_trait]
pub trait FormAnalyzer: Send + Sync {
    /// Analyze proof media and return form scores.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError`] when the backend is unreachable or the media
    /// cannot be processed; callers treat either as absent evidence.
    async fn analyze(&self, media_url: &str, kind: MediaKind) -> Result<FormAnalysis, AnalyzerError>;
}
