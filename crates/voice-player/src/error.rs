//! Player error types

use thiserror::Error;

use chess_core::board::FenError;
use chess_core::NormalizationError;

/// Errors that end a game. Per-move problems never become a `GameError`;
/// they are [`MoveRejection`]s handled inside the human retry loop.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("Position oracle error: {0}")]
    Oracle(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Invalid position: {0}")]
    Fen(#[from] FenError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a spoken move was not played. All variants lead to "please repeat".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveRejection {
    #[error("unrecognized move: {0}")]
    Unrecognized(#[from] NormalizationError),

    #[error("illegal move {0}")]
    Illegal(String),

    #[error("move {0} was accepted but left the position unchanged")]
    NoOp(String),
}
