//! Segment Interpolator
//!
//! Breaks a straight move into steps no longer than the configured length.

use stopmotion_core::{distance, subdivide, GcodeError, Point, Subdivision};

/// Splits straight moves into uniform steps
#[derive(Debug, Clone)]
pub struct SegmentInterpolator {
    step_length: f64,
}

impl SegmentInterpolator {
    /// Create an interpolator with the given maximum step length
    pub fn new(step_length: f64) -> Self {
        Self { step_length }
    }

    /// Maximum step length
    pub fn step_length(&self) -> f64 {
        self.step_length
    }

    /// Points at the end of each step from `start` to `end`
    pub fn interpolate(&self, start: Point, end: Point) -> Result<Subdivision, GcodeError> {
        subdivide(start, end, self.step_length).ok_or_else(|| GcodeError::TooManySteps {
            length: distance(start, end),
            step_length: self.step_length,
        })
    }
}
