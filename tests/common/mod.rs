//! Scripted stand-ins for the game's collaborators.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use chess_core::{GameState, MoveRecord, MoveToken};
use voice_player::announcer::Announcer;
use voice_player::error::GameError;
use voice_player::ledger::MoveLedger;
use voice_player::oracle::{Evaluation, PositionOracle, Termination};
use voice_player::orchestrator::{GameOrchestrator, LoopSettings};
use voice_player::phrases::Language;
use voice_player::transcription::TranscriptionService;

pub fn mv(s: &str) -> MoveToken {
    s.parse().unwrap()
}

/// Oracle whose answers come from a script instead of a real engine.
/// The FEN is a counter of applied moves, so a no-op keeps it unchanged.
#[derive(Default)]
pub struct ScriptedOracle {
    /// Moves `is_legal` accepts
    pub legal: Vec<String>,
    /// Legal moves whose application silently does nothing
    pub no_op: Vec<String>,
    /// Successive `best_move` answers; `None` once exhausted
    pub replies: VecDeque<Option<String>>,
    /// Becomes terminal after this many applied moves
    pub terminal_after: Option<(usize, Termination)>,
    /// `best_move` fails with an oracle fault
    pub fault_on_search: bool,
    pub applied: Vec<String>,
    pub searches: usize,
}

impl ScriptedOracle {
    pub fn legal(moves: &[&str]) -> Self {
        Self {
            legal: moves.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_replies(mut self, replies: &[&str]) -> Self {
        self.replies = replies.iter().map(|s| Some(s.to_string())).collect();
        self
    }
}

#[async_trait]
impl PositionOracle for ScriptedOracle {
    async fn set_position(&mut self, _fen: &str) -> Result<(), GameError> {
        self.applied.clear();
        Ok(())
    }

    async fn is_legal(&mut self, mv: &MoveToken) -> Result<bool, GameError> {
        Ok(self.legal.iter().any(|m| m == mv.as_str()))
    }

    async fn apply(&mut self, mv: &MoveToken) -> Result<(), GameError> {
        if !self.no_op.iter().any(|m| m == mv.as_str()) {
            self.applied.push(mv.to_string());
        }
        Ok(())
    }

    async fn best_move(&mut self, _budget: Duration) -> Result<Option<MoveToken>, GameError> {
        self.searches += 1;
        if self.fault_on_search {
            return Err(GameError::Oracle("engine process exited".into()));
        }
        Ok(self.replies.pop_front().flatten().map(|s| mv(&s)))
    }

    async fn evaluate(&mut self) -> Result<Evaluation, GameError> {
        Ok(Evaluation {
            cp: Some(20),
            mate: None,
        })
    }

    async fn is_terminal(&mut self) -> Result<Option<Termination>, GameError> {
        Ok(match self.terminal_after {
            Some((plies, termination)) if self.applied.len() >= plies => Some(termination),
            _ => None,
        })
    }

    async fn render(&mut self, white_perspective: bool) -> Result<String, GameError> {
        Ok(format!("board after {} (white={white_perspective})", self.applied.join(" ")))
    }

    async fn fen(&mut self) -> Result<String, GameError> {
        Ok(format!("fen-{}", self.applied.len()))
    }
}

/// Hands out queued utterances; silence (or a hang) once they run out.
#[derive(Default)]
pub struct ScriptedTranscriber {
    pub utterances: VecDeque<String>,
    pub hang_when_empty: bool,
    pub calls: usize,
}

impl ScriptedTranscriber {
    pub fn saying(utterances: &[&str]) -> Self {
        Self {
            utterances: utterances.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl TranscriptionService for ScriptedTranscriber {
    async fn listen(&mut self) -> String {
        self.calls += 1;
        match self.utterances.pop_front() {
            Some(text) => text,
            None if self.hang_when_empty => std::future::pending().await,
            None => String::new(),
        }
    }
}

#[derive(Default)]
pub struct RecordingAnnouncer {
    pub said: Vec<(String, u32)>,
    /// Phrases starting with this prefix take `slow_for` to speak
    pub slow_prefix: Option<String>,
    pub slow_for: Duration,
}

impl RecordingAnnouncer {
    pub fn count(&self, text: &str) -> usize {
        self.said.iter().filter(|(t, _)| t == text).count()
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn say(&mut self, text: &str, rate: u32) {
        self.said.push((text.to_string(), rate));
        if self.slow_prefix.as_deref().is_some_and(|p| text.starts_with(p)) {
            tokio::time::sleep(self.slow_for).await;
        }
    }
}

/// Keeps every call, including repeated final flushes.
#[derive(Default)]
pub struct MemoryLedger {
    pub headers: Vec<bool>,
    pub records: Vec<MoveRecord>,
    pub finals: Vec<String>,
    /// Writing the final position stalls this long first
    pub final_stall: Duration,
}

impl MemoryLedger {
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(|r| r.to_string()).collect()
    }
}

#[async_trait]
impl MoveLedger for MemoryLedger {
    async fn start_game(&mut self, _started_at: DateTime<Local>, human_plays_white: bool) -> Result<(), GameError> {
        self.headers.push(human_plays_white);
        Ok(())
    }

    async fn append_record(&mut self, record: &MoveRecord) -> Result<(), GameError> {
        self.records.push(record.clone());
        Ok(())
    }

    async fn append_final_position(&mut self, rendered_board: &str) -> Result<(), GameError> {
        tokio::time::sleep(self.final_stall).await;
        self.finals.push(rendered_board.to_string());
        Ok(())
    }
}

pub type TestGame =
    GameOrchestrator<ScriptedOracle, ScriptedTranscriber, RecordingAnnouncer, MemoryLedger>;

pub fn settings() -> LoopSettings {
    LoopSettings {
        engine_move_time: Duration::from_millis(10),
        turn_delay: Duration::ZERO,
        flush_timeout: Duration::from_millis(500),
        max_move_attempts: None,
        language: Language::Russian,
    }
}

pub fn game(
    oracle: ScriptedOracle,
    transcriber: ScriptedTranscriber,
    human_plays_white: bool,
    settings: LoopSettings,
) -> TestGame {
    game_with(
        oracle,
        transcriber,
        RecordingAnnouncer::default(),
        MemoryLedger::default(),
        human_plays_white,
        settings,
    )
}

pub fn game_with(
    oracle: ScriptedOracle,
    transcriber: ScriptedTranscriber,
    announcer: RecordingAnnouncer,
    ledger: MemoryLedger,
    human_plays_white: bool,
    settings: LoopSettings,
) -> TestGame {
    GameOrchestrator::new(
        oracle,
        transcriber,
        announcer,
        ledger,
        GameState::new(human_plays_white, true),
        settings,
    )
}
