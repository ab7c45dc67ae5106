//! # Stopmotion Processor
//!
//! Rewrites a G-code stream one line at a time. Linear moves that travel
//! entirely below the surface plane are split into short steps, and before
//! each step the tool retracts, travels to a home point, dwells, returns and
//! re-engages. Every numbered line is renumbered so the output stays
//! sequential.
//!
//! ## Components
//!
//! - **Line numbers**: strided `N` word allocation
//! - **Coordinates**: `X`/`Y`/`Z` word parsing
//! - **Commands**: motion primitives and their encoding
//! - **Interpolator**: uniform subdivision of straight moves
//! - **Sequencer**: the pause loop inserted before each step
//! - **Processor**: classification, splitting and renumbering

pub mod command;
pub mod config;
pub mod coords;
pub mod error;
pub mod interpolator;
pub mod line_number;
pub mod processor;
pub mod sequencer;

pub use command::{Command, CommandEncoder};
pub use config::ProcessorConfig;
pub use coords::parse_point;
pub use error::{ConfigError, ConfigResult};
pub use interpolator::SegmentInterpolator;
pub use line_number::{format_line_number, LineNumberGenerator};
pub use processor::{classify, is_numbered, LineClass, LineProcessor, MotionKind, ProcessorStats};
pub use sequencer::InterruptionSequencer;
