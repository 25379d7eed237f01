use thiserror::Error;

/// Errors raised while building or loading a [`MatchConfiguration`].
///
/// [`MatchConfiguration`]: crate::models::MatchConfiguration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid number of periods: {0} (expected 1 to 252)")]
    InvalidPeriods(u8),

    #[error("Duration must be non-zero: {0}")]
    ZeroDuration(&'static str),

    #[error("Invalid penalty rounds: {0} (expected at least 1)")]
    InvalidPenaltyRounds(u8),

    #[error("Unknown configuration preset: {0}")]
    UnknownPreset(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
