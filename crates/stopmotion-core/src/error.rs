//! Error handling for Stopmotion
//!
//! Provides the error types raised while rewriting a G-code stream:
//! - G-Code errors (coordinate parsing, command construction)
//! - Exhaustion of line numbers or subdivision steps
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Raised at the point of detection and never recovered inside the line
/// processor; the caller decides whether the stream continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// A coordinate token does not start with the axis letter expected at its position
    #[error("Bad axis: expected '{expected}' in token '{token}'")]
    AxisMismatch {
        /// The axis letter required at this position (X, Y or Z).
        expected: char,
        /// The offending token.
        token: String,
    },

    /// The numeric part of a coordinate token is not a valid number
    #[error("Invalid number in coordinate token '{token}'")]
    NumberFormat {
        /// The offending token.
        token: String,
    },

    /// A command primitive was given the wrong number of arguments
    #[error("{command} command expects {expected} parameter(s), {given} given")]
    Arity {
        /// The command name.
        command: String,
        /// Number of arguments the command takes.
        expected: usize,
        /// Number of arguments supplied.
        given: usize,
    },

    /// A command name that does not correspond to any motion primitive
    #[error("Unknown command: {name}")]
    UnknownCommand {
        /// The unrecognised command name.
        name: String,
    },

    /// The remaining line numbers cannot cover the lines an input line expands to
    #[error("Line number overflow: {needed} more line number(s) do not fit")]
    LineNumberOverflow {
        /// Line numbers the failing line needed.
        needed: u64,
    },

    /// A move is too long to split into steps of the configured length
    #[error("Move of length {length} cannot be split into steps of {step_length}")]
    TooManySteps {
        /// Length of the move.
        length: f64,
        /// Configured maximum step length.
        step_length: f64,
    },
}

impl GcodeError {
    /// Check if this error came from reading coordinate tokens
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            GcodeError::AxisMismatch { .. } | GcodeError::NumberFormat { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcode_error_display() {
        let err = GcodeError::AxisMismatch {
            expected: 'X',
            token: "Y2.000".to_string(),
        };
        assert_eq!(err.to_string(), "Bad axis: expected 'X' in token 'Y2.000'");

        let err = GcodeError::NumberFormat {
            token: "Xfoo".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid number in coordinate token 'Xfoo'");

        let err = GcodeError::Arity {
            command: "dwell".to_string(),
            expected: 1,
            given: 0,
        };
        assert_eq!(
            err.to_string(),
            "dwell command expects 1 parameter(s), 0 given"
        );

        let err = GcodeError::UnknownCommand {
            name: "spin".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown command: spin");
    }

    #[test]
    fn test_format_error_classification() {
        assert!(GcodeError::NumberFormat {
            token: "Zbaz".to_string()
        }
        .is_format_error());
        assert!(!GcodeError::UnknownCommand {
            name: "x".to_string()
        }
        .is_format_error());
    }

    #[test]
    fn test_overflow_display() {
        let err = GcodeError::LineNumberOverflow { needed: 7 };
        assert_eq!(
            err.to_string(),
            "Line number overflow: 7 more line number(s) do not fit"
        );
        assert!(!err.is_format_error());
    }
}
