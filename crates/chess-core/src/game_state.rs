//! Turn bookkeeping for a human-vs-engine game.

use std::fmt;

use crate::move_token::MoveToken;

/// Who the game loop is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingHumanMove,
    AwaitingEngineMove,
    Terminal,
}

/// One numbered line of the move ledger: a White move and Black's reply.
///
/// Either slot may be empty: White's when the game started with Black to
/// move, Black's when the game ended right after White moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub move_number: u32,
    pub white_move: Option<MoveToken>,
    pub black_move: Option<MoveToken>,
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let white = self.white_move.as_ref().map_or("...", |m| m.as_str());
        let black = self.black_move.as_ref().map_or("", |m| m.as_str());
        write!(f, "{}. {} - {}", self.move_number, white, black)
    }
}

/// Mutable game state owned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub side_to_move_is_white: bool,
    pub human_plays_white: bool,
    pub move_number: u32,
    pub pending_white_move: Option<MoveToken>,
    pub terminal: bool,
}

impl GameState {
    /// A fresh game. `white_to_move` is false only when starting from a
    /// position with Black to move.
    pub fn new(human_plays_white: bool, white_to_move: bool) -> Self {
        Self {
            side_to_move_is_white: white_to_move,
            human_plays_white,
            move_number: 1,
            pending_white_move: None,
            terminal: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.terminal {
            Phase::Terminal
        } else if self.side_to_move_is_white == self.human_plays_white {
            Phase::AwaitingHumanMove
        } else {
            Phase::AwaitingEngineMove
        }
    }

    /// Record an accepted half-move and pass the turn.
    ///
    /// Returns the completed record when this move was Black's, which is
    /// also the only time `move_number` advances.
    pub fn record_half_move(&mut self, mv: MoveToken) -> Option<MoveRecord> {
        let completed = if self.side_to_move_is_white {
            self.pending_white_move = Some(mv);
            None
        } else {
            let record = MoveRecord {
                move_number: self.move_number,
                white_move: self.pending_white_move.take(),
                black_move: Some(mv),
            };
            self.move_number += 1;
            Some(record)
        };
        self.side_to_move_is_white = !self.side_to_move_is_white;
        completed
    }

    /// End the game. A White move still waiting for its reply comes back as
    /// a record with an empty Black slot; calling again yields nothing.
    pub fn finish(&mut self) -> Option<MoveRecord> {
        self.terminal = true;
        self.pending_white_move.take().map(|white| MoveRecord {
            move_number: self.move_number,
            white_move: Some(white),
            black_move: None,
        })
    }
}
