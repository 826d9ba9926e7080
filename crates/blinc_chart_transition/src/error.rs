//! Transition error types

use thiserror::Error;

/// Errors raised while loading or validating animation config
#[derive(Error, Debug)]
pub enum TransitionError {
    /// Config file is not valid TOML for an animate block
    #[error("Invalid animate config (toml): {0}")]
    Toml(#[from] toml::de::Error),

    /// Config is not valid JSON for an animate block
    #[error("Invalid animate config (json): {0}")]
    Json(#[from] serde_json::Error),

    /// A duration or delay is negative or not finite
    #[error("Invalid {field} for {phase}: {value}")]
    InvalidTiming {
        phase: &'static str,
        field: &'static str,
        value: f32,
    },
}

/// Result type for transition config operations
pub type Result<T> = std::result::Result<T, TransitionError>;
