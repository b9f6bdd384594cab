// ABOUTME: Structured logging setup for the engine using tracing-subscriber
// ABOUTME: Env-driven level and format so deployments tune observability without code changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelUp Workout

//! Logging configuration with structured output.
//!
//! `LEVELUP_LOG_LEVEL` sets the default filter (standard `EnvFilter` syntax
//! also works through `RUST_LOG`), and `LEVELUP_LOG_FORMAT` selects between
//! `pretty`, `compact`, and `json` output.

use std::env;
use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::{AppError, AppResult};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-friendly multi-line output for development
    #[default]
    Pretty,
    /// Single-line output for space-constrained environments
    Compact,
    /// JSON output for production log pipelines
    Json,
}

impl LogFormat {
    /// Parse from string with fallback to pretty
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `levelup_engine=debug`
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Read logging configuration from the environment
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("LEVELUP_LOG_LEVEL").unwrap_or_else(|_| "info".into());
        let format = env::var("LEVELUP_LOG_FORMAT")
            .map(|raw| LogFormat::from_str_or_default(&raw))
            .unwrap_or_default();
        Self { level, format }
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let result = match config.format {
        LogFormat::Pretty => fmt().with_env_filter(filter).pretty().try_init(),
        LogFormat::Compact => fmt().with_env_filter(filter).compact().try_init(),
        LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
    };
    result.map_err(|error| AppError::internal(format!("failed to install subscriber: {error}")))
}
