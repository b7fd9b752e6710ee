//! Position oracle: the authority on board state, legality and search.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chess_core::MoveToken;

use crate::error::GameError;

/// Engine score from the side to move's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Centipawns
    pub cp: Option<i32>,
    /// Mate in N (negative: side to move gets mated)
    pub mate: Option<i32>,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.mate, self.cp) {
            (Some(mate), _) => write!(f, "mate {mate}"),
            (None, Some(cp)) => write!(f, "cp {cp}"),
            (None, None) => f.write_str("unknown"),
        }
    }
}

/// The side to move has no legal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    /// Checkmate rather than stalemate
    pub mate: bool,
}

/// Everything the game loop needs from a chess engine.
///
/// Any `Err` is an oracle fault and ends the game.
#[async_trait]
pub trait PositionOracle: Send {
    async fn set_position(&mut self, fen: &str) -> Result<(), GameError>;

    async fn is_legal(&mut self, mv: &MoveToken) -> Result<bool, GameError>;

    /// Play a move. Not guaranteed to report a move that had no effect;
    /// callers compare [`PositionOracle::fen`] before and after.
    async fn apply(&mut self, mv: &MoveToken) -> Result<(), GameError>;

    /// Best reply within the time budget, `None` when there is no legal move.
    async fn best_move(&mut self, budget: Duration) -> Result<Option<MoveToken>, GameError>;

    async fn evaluate(&mut self) -> Result<Evaluation, GameError>;

    async fn is_terminal(&mut self) -> Result<Option<Termination>, GameError>;

    async fn render(&mut self, white_perspective: bool) -> Result<String, GameError>;

    async fn fen(&mut self) -> Result<String, GameError>;
}
