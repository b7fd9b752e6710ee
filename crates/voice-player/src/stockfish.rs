//! Stockfish engine wrapper using UCI protocol (async I/O), and the position
//! oracle built on it.
//!
//! Stockfish only searches. The authoritative position lives in a shakmaty
//! `Chess` value on our side and is sent to the engine as a FEN per search.

use std::time::Duration;

use async_trait::async_trait;
use shakmaty::{Chess, Position};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

use chess_core::board::{fen_of, position_from_fen, render_board};
use chess_core::MoveToken;

use crate::config::EngineOptions;
use crate::error::GameError;
use crate::oracle::{Evaluation, PositionOracle, Termination};

/// Result of a single search
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Score of the last `info ... pv` line
    pub eval: Evaluation,
    /// Raw `bestmove` argument, `(none)` when the side to move has no moves
    pub best_move: String,
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process, initialize UCI and apply strength options
    pub async fn new(path: &str, options: &EngineOptions) -> Result<Self, GameError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GameError::Oracle(format!("Failed to spawn Stockfish at {path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| GameError::Oracle("Stockfish stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| GameError::Oracle("Stockfish stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        engine
            .send(&format!("setoption name Threads value {}", options.threads))
            .await?;
        engine
            .send(&format!("setoption name Hash value {}", options.hash_mb))
            .await?;
        engine
            .send(&format!("setoption name Skill Level value {}", options.skill_level))
            .await?;
        if let Some(elo) = options.elo {
            engine.send("setoption name UCI_LimitStrength value true").await?;
            engine.send(&format!("setoption name UCI_Elo value {elo}")).await?;
        }
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        info!(path, elo = ?options.elo, skill = options.skill_level, "Stockfish ready");
        Ok(engine)
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), GameError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| GameError::Oracle(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| GameError::Oracle(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one trimmed line; a closed pipe means the process died.
    async fn read_line(&mut self, line: &mut String) -> Result<(), GameError> {
        line.clear();
        let n = self
            .stdout
            .read_line(line)
            .await
            .map_err(|e| GameError::Oracle(format!("Failed to read from Stockfish: {e}")))?;
        if n == 0 {
            return Err(GameError::Oracle("Stockfish closed its output".into()));
        }
        debug!(line = line.trim(), "SF >");
        Ok(())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), GameError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            if line.trim() == expected {
                return Ok(());
            }
        }
    }

    /// Search `fen` with the given `go` arguments (`movetime 1000`, `depth 12`)
    pub async fn search(&mut self, fen: &str, go: &str) -> Result<SearchResult, GameError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go {go}")).await?;

        let mut result = SearchResult::default();
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();

            if trimmed.starts_with("info") && trimmed.contains(" pv ") {
                if let Some(cp) = parse_cp(trimmed) {
                    result.eval = Evaluation { cp: Some(cp), mate: None };
                }
                if let Some(mate) = parse_mate(trimmed) {
                    result.eval = Evaluation { cp: None, mate: Some(mate) };
                }
            } else if let Some(rest) = trimmed.strip_prefix("bestmove") {
                result.best_move = rest
                    .split_whitespace()
                    .next()
                    .unwrap_or("(none)")
                    .to_string();
                break;
            }
        }

        Ok(result)
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "cp" && i + 1 < parts.len() {
            return parts[i + 1].parse().ok();
        }
    }
    None
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "mate" && i + 1 < parts.len() {
            return parts[i + 1].parse().ok();
        }
    }
    None
}

/// Map a `bestmove` argument to a token. `(none)` and the null move mean
/// there is nothing to play; anything else unparseable is an engine fault.
fn parse_best_move(raw: &str) -> Result<Option<MoveToken>, GameError> {
    match raw {
        "" | "(none)" | "0000" => Ok(None),
        other => other
            .parse()
            .map(Some)
            .map_err(|e| GameError::Oracle(format!("Stockfish returned {other:?}: {e}"))),
    }
}

/// Play `mv` on `position`, failing if it is not legal there.
fn play_token(position: &mut Chess, mv: &MoveToken) -> Result<(), GameError> {
    let uci = mv
        .to_uci()
        .map_err(|e| GameError::Oracle(format!("Cannot apply {mv}: {e}")))?;
    let legal = uci
        .to_move(&*position)
        .map_err(|e| GameError::Oracle(format!("Cannot apply {mv}: {e}")))?;
    position.play_unchecked(legal);
    Ok(())
}

/// Position oracle backed by a local shakmaty position and a Stockfish process
pub struct StockfishOracle {
    engine: StockfishEngine,
    position: Chess,
    eval_depth: u32,
}

impl StockfishOracle {
    pub async fn spawn(options: &EngineOptions) -> Result<Self, GameError> {
        let engine = StockfishEngine::new(&options.path, options).await?;
        Ok(Self {
            engine,
            position: Chess::default(),
            eval_depth: options.eval_depth,
        })
    }

    pub async fn quit(&mut self) {
        self.engine.quit().await;
    }
}

#[async_trait]
impl PositionOracle for StockfishOracle {
    async fn set_position(&mut self, fen: &str) -> Result<(), GameError> {
        self.position = position_from_fen(fen)?;
        self.engine.send("ucinewgame").await?;
        Ok(())
    }

    async fn is_legal(&mut self, mv: &MoveToken) -> Result<bool, GameError> {
        let Ok(uci) = mv.to_uci() else {
            return Ok(false);
        };
        Ok(uci.to_move(&self.position).is_ok())
    }

    async fn apply(&mut self, mv: &MoveToken) -> Result<(), GameError> {
        play_token(&mut self.position, mv)
    }

    async fn best_move(&mut self, budget: Duration) -> Result<Option<MoveToken>, GameError> {
        let fen = fen_of(&self.position);
        let result = self
            .engine
            .search(&fen, &format!("movetime {}", budget.as_millis()))
            .await?;
        parse_best_move(&result.best_move)
    }

    async fn evaluate(&mut self) -> Result<Evaluation, GameError> {
        let fen = fen_of(&self.position);
        let result = self
            .engine
            .search(&fen, &format!("depth {}", self.eval_depth))
            .await?;
        Ok(result.eval)
    }

    async fn is_terminal(&mut self) -> Result<Option<Termination>, GameError> {
        if self.position.legal_moves().is_empty() {
            Ok(Some(Termination {
                mate: self.position.is_check(),
            }))
        } else {
            Ok(None)
        }
    }

    async fn render(&mut self, white_perspective: bool) -> Result<String, GameError> {
        Ok(render_board(&self.position, white_perspective))
    }

    async fn fen(&mut self) -> Result<String, GameError> {
        Ok(fen_of(&self.position))
    }
}
