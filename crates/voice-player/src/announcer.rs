//! Spoken output. Announcing is best-effort: a broken speaker never stops
//! the game.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::command::CommandTemplate;

#[async_trait]
pub trait Announcer: Send {
    /// Speak `text` at roughly `rate` words per minute.
    async fn say(&mut self, text: &str, rate: u32);
}

/// Prints each phrase and speaks it through an external TTS command.
pub struct SpeechAnnouncer {
    command: CommandTemplate,
}

impl SpeechAnnouncer {
    pub fn new(command: CommandTemplate) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Announcer for SpeechAnnouncer {
    async fn say(&mut self, text: &str, rate: u32) {
        println!("{text}");
        let rate = rate.to_string();
        let status = self
            .command
            .command(&[("rate", rate.as_str()), ("text", text)])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await;
        match status {
            Ok(s) if s.success() => debug!(text, "Announced"),
            Ok(s) => warn!(program = self.command.program(), status = %s, "TTS command failed"),
            Err(e) => warn!(program = self.command.program(), error = %e, "Failed to run TTS command"),
        }
    }
}
