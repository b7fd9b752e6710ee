//! Position helpers on top of shakmaty: FEN in/out and a text diagram.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Position, Rank, Square};
use thiserror::Error;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN {fen:?}: {reason}")]
    Parse { fen: String, reason: String },

    #[error("illegal position {fen:?}: {reason}")]
    Position { fen: String, reason: String },
}

/// Parse a FEN into a playable standard-chess position.
pub fn position_from_fen(fen: &str) -> Result<Chess, FenError> {
    let parsed: Fen = fen.trim().parse().map_err(|e| FenError::Parse {
        fen: fen.to_string(),
        reason: format!("{e}"),
    })?;
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| FenError::Position {
            fen: fen.to_string(),
            reason: format!("{e}"),
        })
}

pub fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// True when the FEN has White to move.
pub fn white_to_move(fen: &str) -> Result<bool, FenError> {
    Ok(position_from_fen(fen)?.turn() == Color::White)
}

const RULE: &str = "+---+---+---+---+---+---+---+---+";

/// Draw the board as a bordered grid, uppercase for White pieces.
/// `white_perspective` puts rank 8 on top; otherwise rank 1 is on top and
/// the files run h to a.
pub fn render_board(pos: &Chess, white_perspective: bool) -> String {
    let board = pos.board();
    let ranks: Vec<u32> = if white_perspective {
        (0..8).rev().collect()
    } else {
        (0..8).collect()
    };
    let files: Vec<u32> = if white_perspective {
        (0..8).collect()
    } else {
        (0..8).rev().collect()
    };

    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    for &rank in &ranks {
        for &file in &files {
            let sq = Square::from_coords(File::new(file), Rank::new(rank));
            let symbol = board.piece_at(sq).map_or(' ', |p| p.char());
            out.push_str(&format!("| {symbol} "));
        }
        out.push_str(&format!("| {}\n", rank + 1));
        out.push_str(RULE);
        out.push('\n');
    }
    for &file in &files {
        out.push_str(&format!("  {} ", char::from(b'a' + file as u8)));
    }
    out.push('\n');
    out
}
