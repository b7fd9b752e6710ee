//! Player configuration from environment variables and the command line

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chess_core::board::STANDARD_START_FEN;

use crate::command::CommandTemplate;
use crate::error::GameError;
use crate::phrases::Language;

const DEFAULT_RECORD_COMMAND: &str =
    "rec -q -c 1 -r 16000 {output} silence 1 0.1 1% 1 2.0 1% trim 0 10";
const DEFAULT_TTS_COMMAND: &str = "say -v Milena -r {rate} {text}";

/// Stockfish process settings
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Path to Stockfish binary
    pub path: String,
    /// Target playing strength; `None` plays at full strength
    pub elo: Option<u32>,
    pub skill_level: u32,
    pub threads: u32,
    pub hash_mb: u32,
    /// Search depth for the per-turn evaluation printout
    pub eval_depth: u32,
}

/// Which speech-to-move pipeline to use
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscriberKind {
    /// Microphone recording, Whisper transcription, chat-model extraction
    Whisper,
    /// Moves typed on stdin
    Console,
}

impl FromStr for TranscriberKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whisper" => Ok(Self::Whisper),
            "console" => Ok(Self::Console),
            _ => Err(GameError::Config("TRANSCRIBER must be 'whisper' or 'console'")),
        }
    }
}

/// OpenAI endpoints used for speech recognition and move extraction
#[derive(Clone, Debug)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub transcription_model: String,
    pub extraction_model: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub engine: EngineOptions,

    /// Think time for the engine's own moves
    pub engine_move_time: Duration,

    pub starting_fen: String,
    pub human_plays_white: bool,

    pub transcriber: TranscriberKind,
    /// Required only for [`TranscriberKind::Whisper`]
    pub openai: Option<OpenAiSettings>,
    pub record_command: CommandTemplate,
    pub listen_timeout: Duration,

    pub tts_command: CommandTemplate,
    pub language: Language,

    pub ledger_path: PathBuf,

    /// Pause between loop iterations
    pub turn_delay: Duration,
    /// Upper bound on the final flush after an interrupt or fault
    pub flush_timeout: Duration,
    /// Give up after this many rejected attempts in one turn; unbounded if unset
    pub max_move_attempts: Option<u32>,
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn string_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse a `PLAY_WHITE=TRUE` / `PLAY_WHITE=FALSE` token, case-insensitively.
fn parse_play_white(token: &str) -> Option<bool> {
    match token.trim().to_ascii_uppercase().as_str() {
        "PLAY_WHITE=TRUE" => Some(true),
        "PLAY_WHITE=FALSE" => Some(false),
        _ => None,
    }
}

/// Side selection from CLI arguments; the last recognized token wins.
pub fn play_white_from_args<I, S>(args: I) -> Option<bool>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .filter_map(|arg| parse_play_white(arg.as_ref()))
        .last()
}

impl Config {
    /// Load configuration from the environment, then let CLI arguments
    /// override the side the human plays. Malformed values fall back to
    /// defaults; only a missing API key for the Whisper pipeline is fatal.
    pub fn load<I, S>(args: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let engine = EngineOptions {
            path: string_or("STOCKFISH_PATH", "/usr/local/bin/stockfish"),
            elo: match env::var("ENGINE_ELO") {
                Ok(v) if v.trim().eq_ignore_ascii_case("max") => None,
                Ok(v) => Some(v.trim().parse().unwrap_or(1150)),
                Err(_) => Some(1150),
            },
            skill_level: parse_or("ENGINE_SKILL_LEVEL", 20),
            threads: parse_or("ENGINE_THREADS", 1),
            hash_mb: parse_or("ENGINE_HASH_MB", 32),
            eval_depth: parse_or("EVAL_DEPTH", 12),
        };

        let env_side = env::var("PLAY_WHITE")
            .ok()
            .and_then(|v| parse_play_white(&format!("PLAY_WHITE={v}")));
        let human_plays_white = play_white_from_args(args).or(env_side).unwrap_or(true);

        let transcriber = match env::var("TRANSCRIBER") {
            Ok(v) => v.parse()?,
            Err(_) => TranscriberKind::Whisper,
        };

        let openai = match env::var("OPENAI_API_KEY") {
            Ok(api_key) if !api_key.trim().is_empty() => Some(OpenAiSettings {
                api_key,
                base_url: string_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                transcription_model: string_or("TRANSCRIPTION_MODEL", "whisper-1"),
                extraction_model: string_or("EXTRACTION_MODEL", "gpt-3.5-turbo"),
            }),
            _ => None,
        };
        if transcriber == TranscriberKind::Whisper && openai.is_none() {
            return Err(GameError::Config(
                "OPENAI_API_KEY not set (use TRANSCRIBER=console to type moves)",
            ));
        }

        let language = match env::var("ANNOUNCE_LANGUAGE") {
            Ok(v) => v.parse()?,
            Err(_) => Language::Russian,
        };

        Ok(Self {
            engine,
            engine_move_time: Duration::from_millis(parse_or("ENGINE_MOVE_TIME_MS", 1000)),
            starting_fen: string_or("STARTING_FEN", STANDARD_START_FEN),
            human_plays_white,
            transcriber,
            openai,
            record_command: CommandTemplate::parse(&string_or(
                "RECORD_COMMAND",
                DEFAULT_RECORD_COMMAND,
            ))?,
            listen_timeout: Duration::from_secs(parse_or("LISTEN_TIMEOUT_SECS", 15)),
            tts_command: CommandTemplate::parse(&string_or("TTS_COMMAND", DEFAULT_TTS_COMMAND))?,
            language,
            ledger_path: PathBuf::from(string_or("LEDGER_PATH", "moves.txt")),
            turn_delay: Duration::from_millis(parse_or("TURN_DELAY_MS", 1000)),
            flush_timeout: Duration::from_millis(parse_or("FLUSH_TIMEOUT_MS", 2000)),
            max_move_attempts: env::var("MAX_MOVE_ATTEMPTS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0),
        })
    }
}
