use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Reply delay ({reply_ms} ms) must not be shorter than typing delay ({typing_ms} ms)")]
    InvalidDelays { typing_ms: u64, reply_ms: u64 },

    #[error("Display name must not be empty")]
    EmptyUserName,
}
