//! Error types for mlviz_tween

use thiserror::Error;

/// Errors that can occur while scheduling tweens
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// Every task slot is in use
    #[error("tween pool exhausted: all {capacity} slots are active")]
    PoolExhausted { capacity: usize },

    /// Engine configuration could not be parsed or is out of range
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

impl From<toml::de::Error> for TweenError {
    fn from(err: toml::de::Error) -> Self {
        TweenError::InvalidConfig(err.to_string())
    }
}

/// Result type for mlviz_tween operations
pub type Result<T> = std::result::Result<T, TweenError>;
