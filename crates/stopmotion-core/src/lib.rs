//! # Stopmotion Core
//!
//! Core types shared by the Stopmotion crates: machine-space points,
//! straight-line subdivision and the error taxonomy.

pub mod error;
pub mod geometry;

pub use error::GcodeError;
pub use geometry::{distance, subdivide, Point, Subdivision};
