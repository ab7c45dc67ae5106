//! Coordinate word parsing

use stopmotion_core::{GcodeError, Point};

/// Axis letters in the order coordinate words must appear
pub const AXES: [char; 3] = ['X', 'Y', 'Z'];

/// Parse three coordinate words (`X1.0`, `Y2.0`, `Z-0.5`) into a point.
///
/// Words must appear in X, Y, Z order with an upper-case axis letter.
pub fn parse_point(tokens: [&str; 3]) -> Result<Point, GcodeError> {
    let mut coords = [0.0; 3];
    for ((token, axis), coord) in tokens.iter().zip(AXES).zip(coords.iter_mut()) {
        *coord = parse_axis_word(token, axis)?;
    }
    Ok(Point::from(coords))
}

fn parse_axis_word(token: &str, axis: char) -> Result<f64, GcodeError> {
    let value = token
        .strip_prefix(axis)
        .ok_or_else(|| GcodeError::AxisMismatch {
            expected: axis,
            token: token.to_string(),
        })?;

    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GcodeError::NumberFormat {
            token: token.to_string(),
        })
}
