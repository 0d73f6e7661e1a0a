use anyhow::{ensure, Context, Result};
use chrono::Duration;

use crate::learning::path::PathSettings;
use crate::skills::aggregator::StatsOptions;

/// Tunables for the scoring and planning engines.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub hours_per_point: f64,
    pub min_task_hours: u32,
    pub improvement_min_evidence: u32,
    pub stats_top_n: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let path = PathSettings::default();
        let stats = StatsOptions::default();
        Self {
            hours_per_point: path.hours_per_point,
            min_task_hours: path.min_task_hours,
            improvement_min_evidence: stats.min_evidence,
            stats_top_n: stats.top_n,
        }
    }
}

impl ScoringConfig {
    pub fn path_settings(&self) -> PathSettings {
        PathSettings {
            hours_per_point: self.hours_per_point,
            min_task_hours: self.min_task_hours,
        }
    }

    pub fn stats_options(&self) -> StatsOptions {
        StatsOptions {
            top_n: self.stats_top_n,
            min_evidence: self.improvement_min_evidence,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_minutes: i64,
    pub max_hours: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_minutes: 30,
            max_hours: 12,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::minutes(self.idle_minutes)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::hours(self.max_hours)
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup when a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent → in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub scoring: ScoringConfig,
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            port: 8080,
            rust_log: "info".to_string(),
            scoring: ScoringConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let scoring = ScoringConfig {
            hours_per_point: parse_or(&lookup, "HOURS_PER_POINT", defaults.scoring.hours_per_point)?,
            min_task_hours: parse_or(&lookup, "MIN_TASK_HOURS", defaults.scoring.min_task_hours)?,
            improvement_min_evidence: parse_or(
                &lookup,
                "IMPROVEMENT_MIN_EVIDENCE",
                defaults.scoring.improvement_min_evidence,
            )?,
            stats_top_n: parse_or(&lookup, "STATS_TOP_N", defaults.scoring.stats_top_n)?,
        };
        ensure!(
            scoring.hours_per_point.is_finite() && scoring.hours_per_point > 0.0,
            "HOURS_PER_POINT must be a positive number"
        );

        let session = SessionConfig {
            idle_minutes: parse_or(&lookup, "SESSION_IDLE_MINUTES", defaults.session.idle_minutes)?,
            max_hours: parse_or(&lookup, "SESSION_MAX_HOURS", defaults.session.max_hours)?,
        };
        ensure!(
            session.idle_minutes > 0 && session.max_hours > 0,
            "SESSION_IDLE_MINUTES and SESSION_MAX_HOURS must be positive"
        );

        Ok(Config {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            scoring,
            session,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
