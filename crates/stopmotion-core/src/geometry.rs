//! Points and straight-line subdivision
//!
//! All coordinates are absolute machine coordinates in the units of the
//! incoming G-code. Only the three linear axes are modelled.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A point in machine space (X, Y, Z)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Point {
    /// Create a point from its three coordinates
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same XY, different Z
    pub fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }

    /// Whether every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Point {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{:.4} Y{:.4} Z{:.4}", self.x, self.y, self.z)
    }
}

/// Euclidean norm of `a - b`
pub fn distance(a: Point, b: Point) -> f64 {
    let d = a - b;
    (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
}

/// Split the segment `start..end` into `ceil(|end - start| / max_step)` equal steps.
///
/// Yields the end point of every step, so the first point is one step away
/// from `start` and the last is `end`. Coincident points yield nothing.
/// Returns `None` when the step count is not finite or does not fit in a `u64`.
///
/// Each point is `start + i * ((end - start) / n)`; the per-step delta is
/// divided first so the output matches the established numeric format
/// bit for bit.
pub fn subdivide(start: Point, end: Point, max_step: f64) -> Option<Subdivision> {
    debug_assert!(
        max_step > 0.0 && max_step.is_finite(),
        "subdivision step must be positive and finite: {max_step}"
    );
    let count = (distance(start, end) / max_step).ceil();
    // u64::MAX as f64 rounds up to 2^64, the first count that does not fit.
    if !(count >= 0.0 && count < u64::MAX as f64) {
        return None;
    }
    let steps = count as u64;
    let delta = if steps == 0 {
        Point::default()
    } else {
        let n = steps as f64;
        Point::new(
            (end.x - start.x) / n,
            (end.y - start.y) / n,
            (end.z - start.z) / n,
        )
    };

    Some(Subdivision {
        start,
        delta,
        steps,
        index: 0,
    })
}

/// Iterator over the step points of a subdivided segment
#[derive(Debug, Clone)]
pub struct Subdivision {
    start: Point,
    delta: Point,
    steps: u64,
    index: u64,
}

impl Subdivision {
    /// Total number of steps, independent of how many have been consumed
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Iterator for Subdivision {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.index >= self.steps {
            return None;
        }
        self.index += 1;
        Some(self.start + self.delta * self.index as f64)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.steps - self.index) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl std::iter::FusedIterator for Subdivision {}
