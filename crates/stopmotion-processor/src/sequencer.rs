//! Interruption Sequencer
//!
//! Emits the pause loop placed before each sub-segment of a split move:
//! retract, travel home, dwell, travel back, re-engage, then cut to the
//! sub-segment's end point.

use stopmotion_core::{GcodeError, Point};

use crate::command::{Command, CommandEncoder};

/// Emits the retract/home/dwell/return/engage loop ending in a linear move
#[derive(Debug, Clone)]
pub struct InterruptionSequencer {
    dwell: u32,
}

impl InterruptionSequencer {
    /// Number of lines one loop produces
    pub const LINES_PER_LOOP: usize = 6;

    /// Create a sequencer pausing for `dwell` at the home point
    pub fn new(dwell: u32) -> Self {
        Self { dwell }
    }

    /// Dwell duration used in every loop
    pub fn dwell(&self) -> u32 {
        self.dwell
    }

    /// Emit one loop ending in a linear move to `target`, line by line
    pub fn insert_loop<F>(
        &self,
        encoder: &mut CommandEncoder,
        target: Point,
        trailing: Vec<String>,
        emit: &mut F,
    ) -> Result<(), GcodeError>
    where
        F: FnMut(String),
    {
        let (retract, return_point) = encoder.encode_retract()?;
        emit(retract);
        emit(encoder.encode(Command::Home)?);
        emit(encoder.encode(Command::Dwell(self.dwell))?);
        emit(encoder.encode(Command::Rapid(return_point))?);
        emit(encoder.encode(Command::Engage)?);
        emit(encoder.encode(Command::Linear { target, trailing })?);
        Ok(())
    }
}
