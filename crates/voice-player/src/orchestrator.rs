//! The game loop: whose turn it is, getting and validating moves, and
//! deciding when the game is over.
//!
//! Control flow is strictly sequential. The only waits are on the
//! transcriber (human turn) and on the oracle's search (engine turn).

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use chess_core::{GameState, MoveToken, Phase, TranscriptAttempt};

use crate::announcer::Announcer;
use crate::config::Config;
use crate::error::{GameError, MoveRejection};
use crate::ledger::MoveLedger;
use crate::oracle::PositionOracle;
use crate::phrases::{Language, RATE_MOVE, RATE_NOTICE};
use crate::transcription::TranscriptionService;

/// How a game ended without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Checkmate { winner_is_white: bool },
    /// Side to move has no legal moves but is not mated, or the engine
    /// found nothing to play.
    NoLegalMoves,
    /// The human ran out of attempts for one move.
    Abandoned,
    Interrupted,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Checkmate { winner_is_white: true } => f.write_str("checkmate, White wins"),
            GameOutcome::Checkmate { winner_is_white: false } => f.write_str("checkmate, Black wins"),
            GameOutcome::NoLegalMoves => f.write_str("no legal moves"),
            GameOutcome::Abandoned => f.write_str("abandoned"),
            GameOutcome::Interrupted => f.write_str("interrupted"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoopSettings {
    pub engine_move_time: Duration,
    pub turn_delay: Duration,
    pub flush_timeout: Duration,
    /// `None` retries a human move forever
    pub max_move_attempts: Option<u32>,
    pub language: Language,
}

impl From<&Config> for LoopSettings {
    fn from(config: &Config) -> Self {
        Self {
            engine_move_time: config.engine_move_time,
            turn_delay: config.turn_delay,
            flush_timeout: config.flush_timeout,
            max_move_attempts: config.max_move_attempts,
            language: config.language,
        }
    }
}

pub struct GameOrchestrator<O, T, A, L> {
    oracle: O,
    transcriber: T,
    announcer: A,
    ledger: L,
    state: GameState,
    settings: LoopSettings,
    outcome: Option<GameOutcome>,
    final_flushed: bool,
}

impl<O, T, A, L> GameOrchestrator<O, T, A, L>
where
    O: PositionOracle,
    T: TranscriptionService,
    A: Announcer,
    L: MoveLedger,
{
    pub fn new(
        oracle: O,
        transcriber: T,
        announcer: A,
        ledger: L,
        state: GameState,
        settings: LoopSettings,
    ) -> Self {
        Self {
            oracle,
            transcriber,
            announcer,
            ledger,
            state,
            settings,
            outcome: None,
            final_flushed: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn transcriber(&self) -> &T {
        &self.transcriber
    }

    pub fn announcer(&self) -> &A {
        &self.announcer
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Write the ledger header and greet the player.
    pub async fn start_game(&mut self, started_at: DateTime<Local>) -> Result<(), GameError> {
        let human_white = self.state.human_plays_white;
        self.ledger.start_game(started_at, human_white).await?;
        println!("Starting a new game of blindfold chess!");
        println!("{}", if human_white { "Playing as White" } else { "Playing as Black" });
        let greeting = self.settings.language.greeting(human_white);
        self.announcer.say(&greeting, RATE_NOTICE).await;
        Ok(())
    }

    /// Play until the game ends or `interrupt` resolves.
    ///
    /// An interrupt or an oracle fault triggers one bounded attempt to write
    /// the final position before returning. Faults are then propagated.
    pub async fn run_until<F: Future>(&mut self, interrupt: F) -> Result<GameOutcome, GameError> {
        let played = tokio::select! {
            result = self.play() => Some(result),
            _ = interrupt => None,
        };

        match played {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(e)) => {
                error!(error = %e, "Error during game");
                self.flush_best_effort().await;
                Err(e)
            }
            None => {
                println!("\nGame interrupted by user. Exiting.");
                info!("Game interrupted");
                self.flush_best_effort().await;
                self.outcome = Some(GameOutcome::Interrupted);
                Ok(GameOutcome::Interrupted)
            }
        }
    }

    async fn play(&mut self) -> Result<GameOutcome, GameError> {
        loop {
            if let Some(outcome) = self.step().await? {
                return Ok(outcome);
            }
            tokio::time::sleep(self.settings.turn_delay).await;
        }
    }

    /// One loop iteration: a terminal check, then a single half-move.
    /// Returns the outcome once the game is over.
    pub async fn step(&mut self) -> Result<Option<GameOutcome>, GameError> {
        let phase = self.state.phase();
        if phase == Phase::Terminal {
            return Ok(self.outcome);
        }

        let board = self.oracle.render(self.state.human_plays_white).await?;
        println!("\nCurrent board position:\n{board}");

        if let Some(termination) = self.oracle.is_terminal().await? {
            let outcome = if termination.mate {
                GameOutcome::Checkmate {
                    winner_is_white: !self.state.side_to_move_is_white,
                }
            } else {
                GameOutcome::NoLegalMoves
            };
            return self.end_game(outcome).await.map(Some);
        }

        let eval = self.oracle.evaluate().await?;
        println!("Evaluation: {eval}");

        match phase {
            Phase::AwaitingHumanMove => self.human_turn().await,
            _ => self.engine_turn().await,
        }
    }

    async fn human_turn(&mut self) -> Result<Option<GameOutcome>, GameError> {
        println!("Your turn!");
        let mut attempts = 0u32;
        loop {
            if self.settings.max_move_attempts.is_some_and(|limit| attempts >= limit) {
                warn!(attempts, "Giving up on the human move");
                return self.end_game(GameOutcome::Abandoned).await.map(Some);
            }
            attempts += 1;

            // Every attempt listens afresh; nothing heard earlier is reused.
            let attempt = TranscriptAttempt::new(self.transcriber.listen().await);
            match self.try_human_move(&attempt).await? {
                Ok(mv) => {
                    println!("Made move: {mv}");
                    return Ok(None);
                }
                Err(rejection) => {
                    info!(attempt = attempts, raw = %attempt.raw_text, reason = %rejection, "Move rejected");
                    println!("Could not play '{}': {rejection}. Please retry.", attempt.raw_text);
                    let notice = self.settings.language.invalid_move();
                    self.announcer.say(notice, RATE_NOTICE).await;
                }
            }
        }
    }

    /// Validate, apply and book a heard move. The outer `Result` carries
    /// oracle faults, the inner one a rejection the player can retry.
    async fn try_human_move(
        &mut self,
        attempt: &TranscriptAttempt,
    ) -> Result<Result<MoveToken, MoveRejection>, GameError> {
        let mv = match &attempt.normalized {
            Ok(mv) => mv.clone(),
            Err(e) => return Ok(Err(MoveRejection::Unrecognized(e.clone()))),
        };

        if !self.oracle.is_legal(&mv).await? {
            return Ok(Err(MoveRejection::Illegal(mv.to_string())));
        }

        let before = self.oracle.fen().await?;
        self.oracle.apply(&mv).await?;
        let after = self.oracle.fen().await?;
        if before == after {
            warn!(mv = %mv, "Oracle accepted a move without changing the position");
            return Ok(Err(MoveRejection::NoOp(mv.to_string())));
        }

        self.accept(mv.clone()).await?;
        Ok(Ok(mv))
    }

    async fn engine_turn(&mut self) -> Result<Option<GameOutcome>, GameError> {
        let Some(mv) = self.oracle.best_move(self.settings.engine_move_time).await? else {
            println!("No possible moves. Game over.");
            return self.end_game(GameOutcome::NoLegalMoves).await.map(Some);
        };

        self.oracle.apply(&mv).await?;
        // Booked before speaking: an interrupt during the announcement must
        // find the ledger in step with the board.
        let announcement = self.settings.language.engine_move(&mv);
        println!("Engine plays: {mv}");
        self.accept(mv).await?;
        self.announcer.say(&announcement, RATE_MOVE).await;
        Ok(None)
    }

    /// Book an applied move; writes the ledger line once a pair completes.
    /// Must follow `apply` with no announcement in between.
    async fn accept(&mut self, mv: MoveToken) -> Result<(), GameError> {
        let white = self.state.side_to_move_is_white;
        info!(mv = %mv, white, move_number = self.state.move_number, "Move played");
        if let Some(record) = self.state.record_half_move(mv) {
            self.ledger.append_record(&record).await?;
        }
        Ok(())
    }

    async fn end_game(&mut self, outcome: GameOutcome) -> Result<GameOutcome, GameError> {
        info!(%outcome, "Game over");
        let language = self.settings.language;
        let notice = match outcome {
            GameOutcome::Checkmate { .. } => Some(language.checkmate()),
            GameOutcome::NoLegalMoves => Some(language.no_legal_moves()),
            GameOutcome::Abandoned => Some(language.abandoned()),
            GameOutcome::Interrupted => None,
        };
        if let Some(notice) = notice {
            self.announcer.say(notice, RATE_NOTICE).await;
        }
        self.outcome = Some(outcome);
        self.finish().await?;
        Ok(outcome)
    }

    /// Close the ledger: the unpaired White move, then the final board.
    /// Safe to call more than once.
    async fn finish(&mut self) -> Result<(), GameError> {
        if let Some(record) = self.state.finish() {
            self.ledger.append_record(&record).await?;
        }
        if !self.final_flushed {
            let board = self.oracle.render(self.state.human_plays_white).await?;
            self.ledger.append_final_position(&board).await?;
            self.final_flushed = true;
        }
        Ok(())
    }

    async fn flush_best_effort(&mut self) {
        let limit = self.settings.flush_timeout;
        match tokio::time::timeout(limit, self.finish()).await {
            Ok(Ok(())) => info!("Final position logged"),
            Ok(Err(e)) => error!(error = %e, "Failed to log final position"),
            Err(_) => error!(timeout_ms = limit.as_millis() as u64, "Timed out logging final position"),
        }
    }
}
