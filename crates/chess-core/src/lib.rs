//! Domain types for voice-driven chess: move tokens, speech normalization,
//! turn bookkeeping and board helpers.

pub mod board;
pub mod game_state;
pub mod move_token;
pub mod normalize;

pub use game_state::{GameState, MoveRecord, Phase};
pub use move_token::{MoveToken, NormalizationError};
pub use normalize::{normalize, TranscriptAttempt};
