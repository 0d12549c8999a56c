//! Runtime settings, read from an optional JSON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::controller::OverlapPolicy;
use crate::error::ConfigError;
use crate::scheduler::ReplyTiming;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub user_name: String,
    pub typing_delay_ms: u64,
    pub reply_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
    pub overlap: OverlapPolicy,
    pub seed_history: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            user_name: "Ved".to_string(),
            typing_delay_ms: 1000,
            reply_delay_ms: 3000,
            rng_seed: None,
            overlap: OverlapPolicy::Interleave,
            seed_history: true,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reply_delay_ms < self.typing_delay_ms {
            return Err(ConfigError::InvalidDelays {
                typing_ms: self.typing_delay_ms,
                reply_ms: self.reply_delay_ms,
            });
        }
        if self.user_name.trim().is_empty() {
            return Err(ConfigError::EmptyUserName);
        }
        Ok(())
    }

    pub fn reply_timing(&self) -> ReplyTiming {
        ReplyTiming {
            typing_after: Duration::from_millis(self.typing_delay_ms),
            reply_after: Duration::from_millis(self.reply_delay_ms),
        }
    }
}

/// `<config_dir>/chitchatty/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chitchatty").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.reply_timing(), ReplyTiming::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rng_seed": 42, "overlap": "coalesce", "reply_delay_ms": 5000}}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.overlap, OverlapPolicy::Coalesce);
        assert_eq!(config.reply_delay_ms, 5000);
        assert_eq!(config.typing_delay_ms, 1000);
        assert_eq!(config.user_name, "Ved");
        assert!(config.seed_history);
    }

    #[test]
    fn test_reply_before_typing_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"typing_delay_ms": 2000, "reply_delay_ms": 500}}"#).unwrap();

        match AppConfig::load(file.path()) {
            Err(ConfigError::InvalidDelays { typing_ms, reply_ms }) => {
                assert_eq!((typing_ms, reply_ms), (2000, 500));
            }
            other => panic!("Expected InvalidDelays, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(AppConfig::load(file.path()), Err(ConfigError::Parse { .. })));
    }
}
