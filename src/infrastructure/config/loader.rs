use anyhow::{Context, Result};
use figment::providers::{Env, Format, Json, Serialized};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid poll interval: {0}. Must be positive")]
    InvalidPollInterval(u64),

    #[error("Invalid cooldown: {0}s. Must be shorter than max_stuck_secs ({1}s)")]
    InvalidCooldown(u64, u64),

    #[error("Invalid stuck thresholds: general {0}s must not exceed busy {1}s")]
    InvalidStuckThresholds(u64, u64),

    #[error("Invalid similarity threshold: {0}. Must be within (0, 1]")]
    InvalidSimilarity(f64),

    #[error("Invalid {name} capacity: trim size {trim} must be below cap {cap}")]
    InvalidCapacity {
        name: &'static str,
        trim: usize,
        cap: usize,
    },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Capture command cannot be empty")]
    EmptyCaptureCommand,

    #[error("Executor command cannot be empty")]
    EmptyExecutorCommand,

    #[error("Journal path cannot be empty")]
    EmptyJournalPath,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .vigil/config.json (project config, created by init)
    /// 3. .vigil/local.json (project local overrides, optional)
    /// 4. Environment variables (VIGIL_* prefix, highest priority)
    ///
    /// Configuration is project-local (pwd/.vigil/) so one machine can
    /// supervise several sessions with different settings.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Json::file(".vigil/config.json"))
            .merge(Json::file(".vigil/local.json"))
            .merge(Env::prefixed("VIGIL_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Json::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let timing = &config.timing;
        if timing.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval(timing.poll_interval_secs));
        }
        if timing.cooldown_secs >= timing.max_stuck_secs {
            return Err(ConfigError::InvalidCooldown(
                timing.cooldown_secs,
                timing.max_stuck_secs,
            ));
        }
        if timing.stuck_threshold_secs > timing.busy_stuck_threshold_secs {
            return Err(ConfigError::InvalidStuckThresholds(
                timing.stuck_threshold_secs,
                timing.busy_stuck_threshold_secs,
            ));
        }

        let limits = &config.limits;
        for similarity in [limits.near_exact_similarity, limits.substantial_similarity] {
            if similarity <= 0.0 || similarity > 1.0 {
                return Err(ConfigError::InvalidSimilarity(similarity));
            }
        }
        let capacities = [
            (
                "dialog_history",
                limits.dialog_history_trim,
                limits.dialog_history_cap,
            ),
            (
                "turn_history",
                limits.turn_history_trim,
                limits.turn_history_cap,
            ),
            ("repetition", limits.repetition_trim, limits.repetition_cap),
        ];
        for (name, trim, cap) in capacities {
            if trim >= cap || cap == 0 {
                return Err(ConfigError::InvalidCapacity { name, trim, cap });
            }
        }
        if limits.max_same_content == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_same_content cannot be 0".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.journal.path.is_empty() {
            return Err(ConfigError::EmptyJournalPath);
        }
        if config.journal.trim_to >= config.journal.max_entries {
            return Err(ConfigError::InvalidCapacity {
                name: "journal",
                trim: config.journal.trim_to,
                cap: config.journal.max_entries,
            });
        }

        if config.capture.command.is_empty() {
            return Err(ConfigError::EmptyCaptureCommand);
        }
        if config.executor.command.is_empty() {
            return Err(ConfigError::EmptyExecutorCommand);
        }

        Ok(())
    }
}
