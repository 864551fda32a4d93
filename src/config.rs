//! # Orchestrator Configuration
//!
//! Layered configuration for the polling schedule and the error rewrite table.
//! Sources, lowest precedence first: built-in defaults, an optional TOML/YAML/JSON
//! file, then `REMOTE_TASK_*` environment variables (nested keys joined by `__`,
//! e.g. `REMOTE_TASK_POLLING__MAX_FAILED_POLLS=5`).

use crate::error::{OrchestrationError, OrchestrationResult};
use crate::orchestration::error_translation::ErrorRewrite;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const ENV_PREFIX: &str = "REMOTE_TASK";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Resume-delay hints and poll failure tolerance
    pub polling: PollingConfig,

    /// Extra exact-match rewrites appended to the built-in translation table
    pub error_rewrites: Vec<ErrorRewrite>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Successive resume delays in milliseconds; the last one repeats forever
    pub intervals_ms: Vec<u64>,

    /// Number of polls spent on each interval before moving to the next
    pub attempts_before_next_interval: u32,

    /// Consecutive transport failures tolerated before the poll error propagates
    pub max_failed_polls: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            intervals_ms: vec![500, 1_000, 2_000, 4_000, 8_000, 16_000],
            attempts_before_next_interval: 5,
            max_failed_polls: 3,
        }
    }
}

impl PollingConfig {
    pub fn intervals(&self) -> Vec<Duration> {
        self.intervals_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

impl OrchestratorConfig {
    /// Reject configurations that would make the poll schedule undefined
    pub fn validate(&self) -> OrchestrationResult<()> {
        if self.polling.intervals_ms.is_empty() {
            return Err(OrchestrationError::configuration(
                "polling.intervals_ms must contain at least one interval",
            ));
        }
        if self.polling.attempts_before_next_interval == 0 {
            return Err(OrchestrationError::configuration(
                "polling.attempts_before_next_interval must be greater than zero",
            ));
        }
        if let Some(rewrite) = self.error_rewrites.iter().find(|r| r.message.is_empty()) {
            return Err(OrchestrationError::configuration(format!(
                "error rewrite to '{}' has an empty message to match",
                rewrite.replacement
            )));
        }
        Ok(())
    }
}

/// Loads [`OrchestratorConfig`] from files and the environment
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from defaults and the environment only
    pub fn load() -> OrchestrationResult<OrchestratorConfig> {
        Self::load_from(None)
    }

    /// Load configuration, layering `path` (when given) under the environment
    pub fn load_from(path: Option<&Path>) -> OrchestrationResult<OrchestratorConfig> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading orchestrator configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("polling.intervals_ms"),
        );

        let config: OrchestratorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            intervals = ?config.polling.intervals_ms,
            attempts_before_next_interval = config.polling.attempts_before_next_interval,
            max_failed_polls = config.polling.max_failed_polls,
            error_rewrites = config.error_rewrites.len(),
            "Orchestrator configuration loaded"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = OrchestratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.polling.intervals()[0], Duration::from_millis(500));
        assert_eq!(config.polling.intervals().len(), 6);
    }

    #[test]
    fn test_empty_intervals_rejected() {
        let mut config = OrchestratorConfig::default();
        config.polling.intervals_ms.clear();
        assert!(matches!(
            config.validate(),
            Err(OrchestrationError::Configuration { .. })
        ));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = OrchestratorConfig::default();
        config.polling.attempts_before_next_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[polling]
intervals_ms = [100, 200]
max_failed_polls = 7

[[error_rewrites]]
message = "upstream exploded"
replacement = "Check the upstream repository URL."
"#
        )
        .unwrap();

        let config = ConfigManager::load_from(Some(file.path())).unwrap();
        assert_eq!(config.polling.intervals_ms, vec![100, 200]);
        assert_eq!(config.polling.max_failed_polls, 7);
        // Unspecified keys keep their defaults
        assert_eq!(config.polling.attempts_before_next_interval, 5);
        assert_eq!(config.error_rewrites.len(), 1);
        assert_eq!(config.error_rewrites[0].message, "upstream exploded");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ConfigManager::load_from(Some(Path::new("/nonexistent/orchestrator.toml")));
        assert!(matches!(
            result,
            Err(OrchestrationError::Configuration { .. })
        ));
    }
}
