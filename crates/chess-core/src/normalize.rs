//! Turn transcribed speech into a [`MoveToken`], failing closed.
//!
//! Speech-to-text for Russian speakers often yields Cyrillic letters for the
//! file names ("е2е4", "Ф7Ф5"). Those are mapped through fixed tables before
//! the structural check. Which table applies depends on the character
//! position: files sit at positions 0 and 2, the promotion piece at 4.

use crate::move_token::{is_file, is_promotion, is_rank, MoveToken, NormalizationError};

/// Cyrillic letter -> board file, used at positions 0 and 2 only. Several
/// letters share a file because transcription picks between them by sound.
///
/// Each table maps a letter to exactly one character, but the tables are
/// scoped by position: `ф` and `с` also appear in [`CYRILLIC_PROMOTIONS`]
/// with a different meaning.
pub const CYRILLIC_FILES: &[(char, char)] = &[
    ('а', 'a'),
    ('э', 'a'),
    ('б', 'b'),
    ('с', 'c'),
    ('ц', 'c'),
    ('д', 'd'),
    ('и', 'e'),
    ('е', 'e'),
    ('ф', 'f'),
    ('ж', 'g'),
    ('ш', 'h'),
    ('ч', 'h'),
    ('щ', 'h'),
];

/// Cyrillic piece initial -> promotion letter (ферзь, ладья, слон, конь),
/// used at position 4 only.
pub const CYRILLIC_PROMOTIONS: &[(char, char)] = &[
    ('ф', 'q'),
    ('л', 'r'),
    ('с', 'b'),
    ('к', 'n'),
];

fn lookup(table: &[(char, char)], c: char) -> Option<char> {
    table.iter().find(|(from, _)| *from == c).map(|(_, to)| *to)
}

/// Map one character at `index` of the move to its canonical ASCII form.
fn map_char(index: usize, c: char) -> Option<char> {
    match index {
        0 | 2 if is_file(c) => Some(c),
        0 | 2 => lookup(CYRILLIC_FILES, c),
        1 | 3 if is_rank(c) => Some(c),
        4 if is_promotion(c) => Some(c),
        4 => lookup(CYRILLIC_PROMOTIONS, c),
        _ => None,
    }
}

/// Normalize raw transcribed text into a canonical move token.
///
/// Whitespace anywhere is dropped and letters are lowercased. The result must
/// be a plain move (4 chars) or a move with promotion suffix (5 chars).
pub fn normalize(raw: &str) -> Result<MoveToken, NormalizationError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    if cleaned.is_empty() {
        return Err(NormalizationError::Empty);
    }

    let len = cleaned.chars().count();
    if len != 4 && len != 5 {
        return Err(NormalizationError::Malformed(cleaned));
    }

    let mut canonical = String::with_capacity(len);
    for (i, c) in cleaned.chars().enumerate() {
        match map_char(i, c) {
            Some(mapped) => canonical.push(mapped),
            None => return Err(NormalizationError::Malformed(cleaned)),
        }
    }

    canonical.parse()
}

/// One pass of hearing a move: the raw text and what it normalized to.
/// Lives for a single retry iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptAttempt {
    pub raw_text: String,
    pub normalized: Result<MoveToken, NormalizationError>,
}

impl TranscriptAttempt {
    pub fn new(raw_text: String) -> Self {
        let normalized = normalize(&raw_text);
        Self {
            raw_text,
            normalized,
        }
    }
}
