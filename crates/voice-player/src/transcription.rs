//! Getting the human's move as text.
//!
//! `listen` never fails: a timeout, a broken microphone or a failed API call
//! all come back as an empty string, which the game loop treats like any
//! other unrecognized move and asks again.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::command::CommandTemplate;
use crate::error::GameError;
use crate::openai::OpenAiClient;

#[async_trait]
pub trait TranscriptionService: Send {
    /// Capture one utterance and return it as text, `""` on timeout.
    async fn listen(&mut self) -> String;
}

/// Records with an external command, transcribes with Whisper, then has a
/// chat model extract the move.
pub struct WhisperTranscriber {
    openai: OpenAiClient,
    record_command: CommandTemplate,
    timeout: Duration,
    scratch: PathBuf,
}

impl WhisperTranscriber {
    pub fn new(openai: OpenAiClient, record_command: CommandTemplate, timeout: Duration) -> Self {
        let scratch = std::env::temp_dir().join(format!("voice-player-{}.wav", std::process::id()));
        Self {
            openai,
            record_command,
            timeout,
            scratch,
        }
    }

    async fn record(&self) -> Result<Option<Vec<u8>>, GameError> {
        // A leftover file from the previous attempt must never be transcribed again.
        let _ = tokio::fs::remove_file(&self.scratch).await;

        let output = self.scratch.to_string_lossy().into_owned();
        let mut cmd = self.record_command.command(&[("output", output.as_str())]);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let status = match tokio::time::timeout(self.timeout, cmd.status()).await {
            Ok(status) => status?,
            Err(_) => {
                info!(timeout_secs = self.timeout.as_secs(), "No move heard before timeout");
                return Ok(None);
            }
        };
        if !status.success() {
            return Err(GameError::Transcription(format!(
                "{} exited with {status}",
                self.record_command.program()
            )));
        }

        let wav = tokio::fs::read(&self.scratch).await?;
        let _ = tokio::fs::remove_file(&self.scratch).await;
        Ok(Some(wav))
    }

    async fn recognize(&self) -> Result<String, GameError> {
        let Some(wav) = self.record().await? else {
            return Ok(String::new());
        };
        let text = self.openai.transcribe(wav).await?;
        println!("Transcribed text: {text}");
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let extracted = self.openai.extract_move(&text).await?;
        println!("Extracted move: {extracted}");
        Ok(extracted)
    }
}

#[async_trait]
impl TranscriptionService for WhisperTranscriber {
    async fn listen(&mut self) -> String {
        println!("Say your move. Listening...");
        match self.recognize().await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Move recognition failed");
                String::new()
            }
        }
    }
}

/// Reads moves typed on stdin, one per line.
pub struct ConsoleTranscriber {
    lines: Lines<BufReader<Stdin>>,
    timeout: Duration,
    closed: bool,
}

impl ConsoleTranscriber {
    pub fn new(timeout: Duration) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            timeout,
            closed: false,
        }
    }
}

#[async_trait]
impl TranscriptionService for ConsoleTranscriber {
    async fn listen(&mut self) -> String {
        if self.closed {
            // Nothing more will arrive; behave like a silent microphone.
            tokio::time::sleep(self.timeout).await;
            return String::new();
        }
        println!("Type your move:");
        match tokio::time::timeout(self.timeout, self.lines.next_line()).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => {
                warn!("stdin closed");
                self.closed = true;
                String::new()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read stdin");
                String::new()
            }
            Err(_) => String::new(),
        }
    }
}
