//! Error types for the processor crate.
//!
//! Per-line failures are [`stopmotion_core::GcodeError`]; this module covers
//! configurations a processor refuses to start with.

use thiserror::Error;

/// Errors raised when validating a [`crate::ProcessorConfig`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value is outside the range the processor can work with.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Values are individually valid but contradict each other.
    #[error("Incompatible parameters: {0}")]
    Incompatible(String),
}

/// Result type alias for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            name: "line_step".to_string(),
            reason: "must be > 0".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for 'line_step': must be > 0");

        let err = ConfigError::Incompatible("retract below engage".to_string());
        assert_eq!(
            err.to_string(),
            "Incompatible parameters: retract below engage"
        );
    }
}
