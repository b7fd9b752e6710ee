//! Canonical coordinate move token: `e2e4`, `e7e8q`.

use std::fmt;
use std::str::FromStr;

use shakmaty::uci::UciMove;
use thiserror::Error;

/// Why raw text could not be turned into a [`MoveToken`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("no move text")]
    Empty,

    #[error("not a coordinate move: {0:?}")]
    Malformed(String),
}

/// A move in coordinate notation that has passed the format check.
///
/// Legality is not implied; only the position oracle can decide that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveToken(String);

impl MoveToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Origin square, e.g. `"e2"`.
    pub fn from_square(&self) -> &str {
        &self.0[0..2]
    }

    /// Destination square, e.g. `"e4"`.
    pub fn to_square(&self) -> &str {
        &self.0[2..4]
    }

    /// Promotion piece letter (`q`, `r`, `b`, `n`) if present.
    pub fn promotion(&self) -> Option<char> {
        self.0.chars().nth(4)
    }

    /// Convert to shakmaty's UCI move for legality checks against a position.
    pub fn to_uci(&self) -> Result<UciMove, NormalizationError> {
        self.0
            .parse::<UciMove>()
            .map_err(|_| NormalizationError::Malformed(self.0.clone()))
    }
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strict parse: the input must already be canonical (lowercase ASCII, no
/// whitespace). Used for engine output; speech goes through
/// [`crate::normalize::normalize`].
impl FromStr for MoveToken {
    type Err = NormalizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NormalizationError::Empty);
        }
        if is_canonical(s) {
            Ok(MoveToken(s.to_string()))
        } else {
            Err(NormalizationError::Malformed(s.to_string()))
        }
    }
}

pub(crate) fn is_file(c: char) -> bool {
    ('a'..='h').contains(&c)
}

pub(crate) fn is_rank(c: char) -> bool {
    ('1'..='8').contains(&c)
}

pub(crate) fn is_promotion(c: char) -> bool {
    matches!(c, 'q' | 'r' | 'b' | 'n')
}

fn is_canonical(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let squares_ok = |c: &[char]| is_file(c[0]) && is_rank(c[1]) && is_file(c[2]) && is_rank(c[3]);
    match chars.len() {
        4 => squares_ok(&chars),
        5 => squares_ok(&chars) && is_promotion(chars[4]),
        _ => false,
    }
}
