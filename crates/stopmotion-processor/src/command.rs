//! Motion primitives and their G-code encoding
//!
//! Every encoded command consumes exactly one line number. All primitives
//! except [`Command::Dwell`] move the tracked machine position.

use stopmotion_core::{GcodeError, Point};
use tracing::trace;

use crate::config::ProcessorConfig;
use crate::coords::AXES;
use crate::line_number::LineNumberGenerator;

/// One motion primitive emitted by the processor
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `G01` controlled move, with trailing words such as a feed rate
    Linear { target: Point, trailing: Vec<String> },
    /// `G00` positioning move
    Rapid(Point),
    /// Rapid to the retract height at the current XY
    Retract,
    /// Rapid to the engage height at the current XY
    Engage,
    /// Rapid to the configured home point
    Home,
    /// `G04` pause
    Dwell(u32),
}

impl Command {
    /// Build a command from its short name and textual arguments.
    ///
    /// Names are `lerp` (X Y Z, then trailing words), `goto` (X Y Z),
    /// `up`, `down`, `home` and `dwell` (duration).
    pub fn from_name(name: &str, args: &[&str]) -> Result<Self, GcodeError> {
        let arity = |expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(GcodeError::Arity {
                    command: name.to_string(),
                    expected,
                    given: args.len(),
                })
            }
        };

        match name {
            "lerp" => {
                if args.len() < 3 {
                    return Err(GcodeError::Arity {
                        command: name.to_string(),
                        expected: 3,
                        given: args.len(),
                    });
                }
                Ok(Command::Linear {
                    target: parse_xyz_args(&args[..3])?,
                    trailing: args[3..].iter().map(|s| s.to_string()).collect(),
                })
            }
            "goto" => {
                arity(3)?;
                Ok(Command::Rapid(parse_xyz_args(args)?))
            }
            "up" => arity(0).map(|_| Command::Retract),
            "down" => arity(0).map(|_| Command::Engage),
            "home" => arity(0).map(|_| Command::Home),
            "dwell" => {
                arity(1)?;
                let duration = args[0].parse::<u32>().map_err(|_| GcodeError::NumberFormat {
                    token: args[0].to_string(),
                })?;
                Ok(Command::Dwell(duration))
            }
            _ => Err(GcodeError::UnknownCommand {
                name: name.to_string(),
            }),
        }
    }
}

fn parse_xyz_args(args: &[&str]) -> Result<Point, GcodeError> {
    let mut coords = [0.0; 3];
    for ((arg, axis), coord) in args.iter().zip(AXES).zip(coords.iter_mut()) {
        *coord = arg
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| GcodeError::NumberFormat {
                token: format!("{}{}", axis, arg),
            })?;
    }
    Ok(Point::from(coords))
}

/// Machine state that command encoding reads and updates
///
/// Owns the line numbering and the believed tool position. The position is
/// unknown until the first move is seen; encoding a retract or engage
/// before that treats the current XY as the origin.
#[derive(Debug, Clone)]
pub struct CommandEncoder {
    line_numbers: LineNumberGenerator,
    position: Option<Point>,
    retract_height: f64,
    engage_height: f64,
    home: Point,
}

impl CommandEncoder {
    /// Create an encoder with an unknown position
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            line_numbers: LineNumberGenerator::new(config.initial_line, config.line_step),
            position: None,
            retract_height: config.retract_height,
            engage_height: config.engage_height,
            home: config.home,
        }
    }

    /// Believed current tool position
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Overwrite the believed tool position
    pub fn set_position(&mut self, position: Option<Point>) {
        self.position = position;
    }

    /// Line numbering state
    pub fn line_numbers(&self) -> &LineNumberGenerator {
        &self.line_numbers
    }

    /// Allocate the next line number word
    pub fn next_line_word(&mut self) -> Result<String, GcodeError> {
        self.line_numbers.allocate_word()
    }

    /// Encode one command as a numbered G-code line
    pub fn encode(&mut self, command: Command) -> Result<String, GcodeError> {
        let line = match command {
            Command::Linear { target, trailing } => {
                let word = self.next_line_word()?;
                self.position = Some(target);
                format!("{} G01 {} {}", word, target, trailing.join(" "))
            }
            Command::Rapid(target) => self.rapid(target)?,
            Command::Retract => self.encode_retract()?.0,
            Command::Engage => {
                let current = self.position.unwrap_or_default();
                self.rapid(current.with_z(self.engage_height))?
            }
            Command::Home => self.rapid(self.home)?,
            Command::Dwell(duration) => format!("{} G04 P{}", self.next_line_word()?, duration),
        };
        trace!(line = %line, "encoded command");
        Ok(line)
    }

    /// Encode a retract, returning the line and the point it moves to
    pub fn encode_retract(&mut self) -> Result<(String, Point), GcodeError> {
        let target = self
            .position
            .unwrap_or_default()
            .with_z(self.retract_height);
        Ok((self.rapid(target)?, target))
    }

    /// Build a command by name and encode it
    pub fn encode_named(&mut self, name: &str, args: &[&str]) -> Result<String, GcodeError> {
        let command = Command::from_name(name, args)?;
        self.encode(command)
    }

    fn rapid(&mut self, target: Point) -> Result<String, GcodeError> {
        let word = self.next_line_word()?;
        self.position = Some(target);
        Ok(format!("{} G00 {}", word, target))
    }
}
