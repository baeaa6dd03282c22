//! Error types for hwtop.
//!
//! Telemetry never produces errors: a missing or implausible reading is an
//! absent `Option`. These variants cover the parts that can genuinely fail,
//! the terminal, the config file and the log sink.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// IO error from terminal or file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file exists but is not valid TOML for `AppConfig`.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// No platform config directory could be determined.
    #[error("config directory not available")]
    ConfigDirUnavailable,

    #[error("failed to initialize logger: {0}")]
    Logger(String),
}
