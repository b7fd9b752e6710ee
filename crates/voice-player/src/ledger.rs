//! Append-only move log (`moves.txt`)
//!
//! Each append is one blocking task on tokio's blocking pool. Once spawned it
//! runs to completion even if the caller stops waiting, so a line is either
//! written whole or not started.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::debug;

use chess_core::MoveRecord;

use crate::error::GameError;

#[async_trait]
pub trait MoveLedger: Send {
    /// Write the game header: start time and side assignment.
    async fn start_game(
        &mut self,
        started_at: DateTime<Local>,
        human_plays_white: bool,
    ) -> Result<(), GameError>;

    async fn append_record(&mut self, record: &MoveRecord) -> Result<(), GameError>;

    /// Write the closing board. Only the first call per game writes.
    async fn append_final_position(&mut self, rendered_board: &str) -> Result<(), GameError>;
}

/// Ledger backed by a UTF-8 text file. Games are appended one after another.
pub struct FileLedger {
    path: PathBuf,
    final_written: bool,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            final_written: false,
        }
    }

    async fn append(&self, text: String) -> Result<(), GameError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || append_blocking(&path, &text))
            .await
            .map_err(|e| GameError::Ledger(format!("ledger writer failed: {e}")))?
    }
}

fn append_blocking(path: &Path, text: &str) -> Result<(), GameError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| GameError::Ledger(format!("{}: {e}", path.display())))?;
    file.write_all(text.as_bytes())
        .map_err(|e| GameError::Ledger(format!("{}: {e}", path.display())))
}

#[async_trait]
impl MoveLedger for FileLedger {
    async fn start_game(
        &mut self,
        started_at: DateTime<Local>,
        human_plays_white: bool,
    ) -> Result<(), GameError> {
        self.final_written = false;
        let sides = if human_plays_white {
            "I play White, Computer plays Black"
        } else {
            "I play Black, Computer plays White"
        };
        self.append(format!(
            "Game: {}\n{sides}\n\n",
            started_at.format("%Y-%m-%d %H:%M:%S")
        ))
        .await
    }

    async fn append_record(&mut self, record: &MoveRecord) -> Result<(), GameError> {
        debug!(%record, "Ledger record");
        self.append(format!("{record}\n")).await
    }

    async fn append_final_position(&mut self, rendered_board: &str) -> Result<(), GameError> {
        if self.final_written {
            return Ok(());
        }
        // Marked before the write: an abandoned write still lands.
        self.final_written = true;
        self.append(format!("\nPosition game finished with:\n{rendered_board}\n"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{name}-{}.txt", ts % 1_000_000_000))
    }

    fn mv(s: &str) -> Option<chess_core::MoveToken> {
        Some(s.parse().unwrap())
    }

    #[tokio::test]
    async fn test_file_format() {
        let path = temp_path("ledger-format");
        let mut ledger = FileLedger::new(&path);
        let started = Local.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();

        ledger.start_game(started, true).await.unwrap();
        ledger
            .append_record(&MoveRecord {
                move_number: 1,
                white_move: mv("e2e4"),
                black_move: mv("e7e5"),
            })
            .await
            .unwrap();
        ledger
            .append_record(&MoveRecord {
                move_number: 2,
                white_move: mv("g1f3"),
                black_move: None,
            })
            .await
            .unwrap();
        ledger.append_final_position("BOARD").await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Game: 2026-10-15 12:00:00\n\
             I play White, Computer plays Black\n\n\
             1. e2e4 - e7e5\n\
             2. g1f3 - \n\
             \nPosition game finished with:\nBOARD\n"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_final_position_written_once() {
        let path = temp_path("ledger-final");
        let mut ledger = FileLedger::new(&path);

        ledger.append_final_position("BOARD").await.unwrap();
        ledger.append_final_position("BOARD").await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("Position game finished with:").count(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_black_side_header() {
        let path = temp_path("ledger-black");
        let mut ledger = FileLedger::new(&path);
        ledger.start_game(Local::now(), false).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("I play Black, Computer plays White\n"));
        let _ = std::fs::remove_file(&path);
    }
}
