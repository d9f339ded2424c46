//! Icon transformations: quarter-turn rotation and axis flips.
//!
//! Transformations compose with [`Transform::merge`]: rotations add modulo 4
//! and flips XOR. The same rule is used when an alias is stacked on its
//! parent and when render-time customisations are applied to a stored icon.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit0, digit1, multispace0},
    combinator::{all_consuming, map, opt, recognize},
    sequence::{pair, terminated, tuple},
    IResult,
};
use std::f64::consts::FRAC_PI_2;

/// Rotation and flip state of an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Transform {
    /// Quarter turns clockwise, always in `0..4`.
    pub rotate: u8,
    pub h_flip: bool,
    pub v_flip: bool,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        rotate: 0,
        h_flip: false,
        v_flip: false,
    };

    /// Create a transformation, reducing `rotate` modulo 4.
    pub fn new(rotate: i64, h_flip: bool, v_flip: bool) -> Self {
        Self {
            rotate: normalize_rotation(rotate),
            h_flip,
            v_flip,
        }
    }

    /// Rotation only.
    pub fn rotation(quarter_turns: i64) -> Self {
        Self::new(quarter_turns, false, false)
    }

    /// Combine this transformation with one applied on top of it.
    #[must_use]
    pub fn merge(self, applied: Transform) -> Transform {
        Transform {
            rotate: (self.rotate + applied.rotate) % 4,
            h_flip: self.h_flip ^ applied.h_flip,
            v_flip: self.v_flip ^ applied.v_flip,
        }
    }

    /// Whether the transformation changes anything.
    pub fn is_identity(&self) -> bool {
        self.rotate == 0 && !self.h_flip && !self.v_flip
    }

    /// Fold a double flip into a half turn.
    ///
    /// Flipping both axes is the same as rotating by 180 degrees, so the
    /// result never has both flags set.
    #[must_use]
    pub fn canonical(self) -> Transform {
        if self.h_flip && self.v_flip {
            Transform {
                rotate: (self.rotate + 2) % 4,
                h_flip: false,
                v_flip: false,
            }
        } else {
            self
        }
    }
}

/// Reduce any integer rotation to `0..4`.
pub fn normalize_rotation(value: i64) -> u8 {
    value.rem_euclid(4) as u8
}

/// Parse a rotation shorthand such as `90deg`, `0.5turn`, `3.14rad`, `25%` or `2`.
///
/// Angles are rounded to the nearest quarter turn. Anything that cannot be
/// parsed yields `0`.
pub fn rotate_from_string(value: &str) -> u8 {
    let Ok((_, (number, unit))) = all_consuming(rotation_value)(value.trim()) else {
        return 0;
    };
    let Ok(number) = number.parse::<f64>() else {
        return 0;
    };

    let quarter_turns = match unit {
        "" => {
            if number.fract() != 0.0 {
                return 0;
            }
            number
        }
        "deg" => round_half_up(number / 90.0),
        "turn" => round_half_up(number * 4.0),
        "rad" => round_half_up(number / FRAC_PI_2),
        "%" => round_half_up(number / 25.0),
        _ => return 0,
    };

    if !quarter_turns.is_finite() {
        return 0;
    }
    normalize_rotation(quarter_turns as i64)
}

/// Round to the nearest integer, halves towards positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn rotation_value(input: &str) -> IResult<&str, (&str, &str)> {
    pair(
        terminated(signed_number, multispace0),
        map(
            opt(alt((take_while1(|c: char| c.is_ascii_alphabetic()), recognize(char('%'))))),
            |unit| unit.unwrap_or(""),
        ),
    )(input)
}

/// Parse a signed decimal number such as `-1`, `2.5` or `.75`.
pub fn signed_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(alt((char('-'), char('+')))),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
    )))(input)
}

/// Apply a flip shorthand such as `"horizontal, vertical"` to `transform`.
///
/// Tokens are separated by commas or whitespace and matched without regard
/// to case. Unknown tokens are ignored.
pub fn flip_from_string(value: &str, transform: &mut Transform) {
    for token in value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.to_ascii_lowercase().as_str() {
            "horizontal" => transform.h_flip = true,
            "vertical" => transform.v_flip = true,
            _ => {}
        }
    }
}
