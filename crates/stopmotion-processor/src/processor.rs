//! Line Processor
//!
//! Classifies each incoming line, splits linear moves that run entirely below
//! the surface (Z < 0) into short steps with a pause loop before each one,
//! and renumbers every numbered line it emits.

use regex::{NoExpand, Regex};
use std::sync::OnceLock;
use stopmotion_core::{GcodeError, Point, Subdivision};
use tracing::{debug, trace, warn};

use crate::command::CommandEncoder;
use crate::config::ProcessorConfig;
use crate::coords::parse_point;
use crate::error::ConfigResult;
use crate::interpolator::SegmentInterpolator;
use crate::sequencer::InterruptionSequencer;

/// Motion word of a numbered move line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// `G00`
    Rapid,
    /// `G01`
    Linear,
}

impl MotionKind {
    /// Recognise a motion word; anything but `G00` and `G01` is `None`
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "G00" => Some(MotionKind::Rapid),
            "G01" => Some(MotionKind::Linear),
            _ => None,
        }
    }
}

/// How the processor sees one input line
#[derive(Debug, Clone, PartialEq)]
pub enum LineClass<'a> {
    /// Not numbered: comments, blank lines, anything else
    Opaque,
    /// Numbered but not a complete `G00`/`G01` move
    Numbered,
    /// Numbered `G00`/`G01` with three coordinate words
    Move {
        kind: MotionKind,
        coords: [&'a str; 3],
        trailing: &'a [&'a str],
    },
}

fn numbered_line_regex() -> &'static Regex {
    static NUMBERED_REGEX: OnceLock<Regex> = OnceLock::new();
    NUMBERED_REGEX.get_or_init(|| Regex::new(r"^N\d+ ").expect("invalid regex pattern"))
}

fn line_number_regex() -> &'static Regex {
    static LINE_NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
    LINE_NUMBER_REGEX.get_or_init(|| Regex::new(r"^N\d+").expect("invalid regex pattern"))
}

/// Whether a line starts with a line number word followed by a space
pub fn is_numbered(line: &str) -> bool {
    numbered_line_regex().is_match(line)
}

/// Classify a line given its whitespace-separated tokens
pub fn classify<'a>(line: &str, tokens: &'a [&'a str]) -> LineClass<'a> {
    if !is_numbered(line) {
        return LineClass::Opaque;
    }

    let Some(kind) = tokens.get(1).and_then(|word| MotionKind::from_word(word)) else {
        return LineClass::Numbered;
    };

    match tokens.get(2..5) {
        Some(&[x, y, z]) => LineClass::Move {
            kind,
            coords: [x, y, z],
            trailing: &tokens[5..],
        },
        _ => LineClass::Numbered,
    }
}

/// Running totals for one processed stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    /// Lines handed to the processor, including failed ones
    pub lines_in: u64,
    /// Lines produced
    pub lines_out: u64,
    /// Linear moves that were split
    pub moves_split: u64,
    /// Pause loops inserted
    pub loops_inserted: u64,
}

/// Single-stream G-code rewriter
///
/// Holds all machine state for one input stream; feed it lines strictly in
/// order.
#[derive(Debug, Clone)]
pub struct LineProcessor {
    encoder: CommandEncoder,
    interpolator: SegmentInterpolator,
    sequencer: InterruptionSequencer,
    stats: ProcessorStats,
}

impl LineProcessor {
    /// Create a processor with an unknown starting position
    pub fn new(config: ProcessorConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            encoder: CommandEncoder::new(&config),
            interpolator: SegmentInterpolator::new(config.step_length),
            sequencer: InterruptionSequencer::new(config.dwell),
            stats: ProcessorStats::default(),
        })
    }

    /// Start from a known tool position
    pub fn with_position(mut self, position: Point) -> Self {
        self.encoder.set_position(Some(position));
        self
    }

    /// Believed current tool position
    pub fn position(&self) -> Option<Point> {
        self.encoder.position()
    }

    /// Overwrite the believed tool position
    pub fn set_position(&mut self, position: Option<Point>) {
        self.encoder.set_position(position);
    }

    /// Line number the next numbered output line will carry, `None` once
    /// line numbers are exhausted
    pub fn next_line_number(&self) -> Option<u64> {
        self.encoder.line_numbers().peek()
    }

    /// Totals so far
    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }

    /// Process one input line, passing each output line to `emit` as soon as
    /// it is encoded.
    ///
    /// On error nothing is emitted for this line and no line number is
    /// consumed.
    pub fn process<F>(&mut self, line: &str, mut emit: F) -> Result<(), GcodeError>
    where
        F: FnMut(String),
    {
        self.stats.lines_in += 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let class = classify(line, &tokens);
        trace!(?class, "classified line");

        let mut destination = None;
        let mut split = None;
        match class {
            LineClass::Opaque => {
                emit(line.to_string());
                self.stats.lines_out += 1;
                return Ok(());
            }
            LineClass::Numbered => {
                if tokens.get(1).and_then(|w| MotionKind::from_word(w)).is_some() {
                    warn!(line, "move without X, Y and Z words, position not updated");
                }
            }
            LineClass::Move {
                kind,
                coords,
                trailing,
            } => {
                let target = parse_point(coords)?;
                if kind == MotionKind::Linear {
                    if let Some(start) = self.below_surface_start(target) {
                        let steps = self.interpolator.interpolate(start, target)?;
                        debug!(
                            from = %start,
                            to = %target,
                            steps = steps.steps(),
                            "splitting below-surface move"
                        );
                        split = Some((steps, trailing));
                    }
                }
                destination = Some(target);
            }
        }

        let loops = split.as_ref().map_or(0, |(steps, _)| steps.steps());
        self.ensure_line_numbers(loops)?;

        if let Some((steps, trailing)) = split {
            self.split_move(steps, trailing, &mut emit)?;
        }
        if destination.is_some() {
            self.encoder.set_position(destination);
        }

        let word = self.encoder.next_line_word()?;
        emit(line_number_regex().replace(line, NoExpand(&word)).into_owned());
        self.stats.lines_out += 1;
        Ok(())
    }

    /// Process one input line and return the lines it expands to
    pub fn process_line(&mut self, line: &str) -> Result<Vec<String>, GcodeError> {
        let mut out = Vec::new();
        self.process(line, |l| out.push(l))?;
        Ok(out)
    }

    /// Current position if both it and `destination` are strictly below Z=0
    fn below_surface_start(&self, destination: Point) -> Option<Point> {
        self.encoder
            .position()
            .filter(|start| start.z < 0.0 && destination.z < 0.0)
    }

    /// Fail unless `loops` pause loops plus the renumbered line still fit
    fn ensure_line_numbers(&self, loops: u64) -> Result<(), GcodeError> {
        let needed = loops
            .checked_mul(InterruptionSequencer::LINES_PER_LOOP as u64)
            .and_then(|n| n.checked_add(1))
            .ok_or(GcodeError::LineNumberOverflow { needed: u64::MAX })?;
        self.encoder.line_numbers().ensure_available(needed)
    }

    fn split_move<F>(
        &mut self,
        steps: Subdivision,
        trailing: &[&str],
        emit: &mut F,
    ) -> Result<(), GcodeError>
    where
        F: FnMut(String),
    {
        self.stats.moves_split += 1;

        let mut trailing: Vec<String> = trailing.iter().map(|s| s.to_string()).collect();
        for target in steps {
            // Feed rate and other trailing words only go on the first step.
            let words = std::mem::take(&mut trailing);
            self.sequencer
                .insert_loop(&mut self.encoder, target, words, emit)?;
            self.stats.loops_inserted += 1;
            self.stats.lines_out += InterruptionSequencer::LINES_PER_LOOP as u64;
        }
        Ok(())
    }
}
