//! Processor configuration
//!
//! Set once before streaming begins and constant for the whole stream.

use serde::{Deserialize, Serialize};
use stopmotion_core::Point;

use crate::error::{ConfigError, ConfigResult};

/// Default retract height, also the Z of the default home point
pub const DEFAULT_RETRACT_HEIGHT: f64 = 0.8;

/// Line numbering, interpolation and interruption-loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// First line number handed out
    pub initial_line: u64,
    /// Stride between consecutive line numbers
    pub line_step: u64,
    /// Maximum length of one sub-segment of a split move
    pub step_length: f64,
    /// Z the tool retracts to before travelling home
    pub retract_height: f64,
    /// Z the tool plunges back to after returning
    pub engage_height: f64,
    /// Dwell duration emitted as `G04 P<dwell>`
    pub dwell: u32,
    /// Reference point visited during each pause
    pub home: Point,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            initial_line: 1,
            line_step: 2,
            step_length: 1.0,
            retract_height: DEFAULT_RETRACT_HEIGHT,
            engage_height: -0.5,
            dwell: 1000,
            home: Point::new(0.0, 0.0, DEFAULT_RETRACT_HEIGHT),
        }
    }
}

impl ProcessorConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first line number and the stride
    pub fn with_numbering(mut self, initial_line: u64, line_step: u64) -> Self {
        self.initial_line = initial_line;
        self.line_step = line_step;
        self
    }

    /// Set the maximum sub-segment length
    pub fn with_step_length(mut self, step_length: f64) -> Self {
        self.step_length = step_length;
        self
    }

    /// Set retract and engage heights
    pub fn with_heights(mut self, retract_height: f64, engage_height: f64) -> Self {
        self.retract_height = retract_height;
        self.engage_height = engage_height;
        self
    }

    /// Set the home point
    pub fn with_home(mut self, home: Point) -> Self {
        self.home = home;
        self
    }

    /// Set the dwell duration
    pub fn with_dwell(mut self, dwell: u32) -> Self {
        self.dwell = dwell;
        self
    }

    /// Check the values a processor cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.line_step == 0 {
            return Err(ConfigError::InvalidValue {
                name: "line_step".to_string(),
                reason: "must be > 0".to_string(),
            });
        }

        if !(self.step_length.is_finite() && self.step_length > 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "step_length".to_string(),
                reason: format!("must be a positive number, got {}", self.step_length),
            });
        }

        for (name, value) in [
            ("retract_height", self.retract_height),
            ("engage_height", self.engage_height),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("must be finite, got {}", value),
                });
            }
        }

        if self.retract_height <= self.engage_height {
            return Err(ConfigError::Incompatible(format!(
                "retract_height ({}) must be above engage_height ({})",
                self.retract_height, self.engage_height
            )));
        }

        if !self.home.is_finite() {
            return Err(ConfigError::InvalidValue {
                name: "home".to_string(),
                reason: format!("coordinates must be finite, got {}", self.home),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.line_step, 2);
        assert_eq!(config.initial_line, 1);
        assert_eq!(config.step_length, 1.0);
        assert_eq!(config.retract_height, 0.8);
        assert_eq!(config.engage_height, -0.5);
        assert_eq!(config.home, Point::new(0.0, 0.0, config.retract_height));
        assert_eq!(config.dwell, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_stride() {
        let config = ProcessorConfig::new().with_numbering(1, 0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref name, .. }) if name == "line_step"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_step_length() {
        for step in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = ProcessorConfig::new().with_step_length(step);
            assert!(config.validate().is_err(), "step {step} accepted");
        }
    }

    #[test]
    fn test_validate_rejects_inverted_heights() {
        let config = ProcessorConfig::new().with_heights(-1.0, 1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Incompatible(_))
        ));
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: ProcessorConfig = serde_json::from_str(r#"{"line_step": 5}"#).unwrap();
        assert_eq!(config.line_step, 5);
        assert_eq!(config.dwell, 1000);
    }
}
