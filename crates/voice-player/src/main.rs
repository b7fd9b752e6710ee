//! Blindfold chess by voice against Stockfish.
//!
//! Run with `PLAY_WHITE=FALSE` to play Black. Everything else is configured
//! through the environment or a `.env` file.

use anyhow::Context;
use chrono::Local;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chess_core::board::white_to_move;
use chess_core::GameState;
use voice_player::announcer::SpeechAnnouncer;
use voice_player::config::{Config, TranscriberKind};
use voice_player::ledger::FileLedger;
use voice_player::openai::OpenAiClient;
use voice_player::oracle::PositionOracle;
use voice_player::orchestrator::{GameOrchestrator, LoopSettings};
use voice_player::stockfish::StockfishOracle;
use voice_player::transcription::{ConsoleTranscriber, TranscriptionService, WhisperTranscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file before reading RUST_LOG
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load(std::env::args().skip(1))?;
    info!(
        stockfish_path = %config.engine.path,
        human_plays_white = config.human_plays_white,
        transcriber = ?config.transcriber,
        ledger = %config.ledger_path.display(),
        "Config loaded"
    );

    let mut oracle = StockfishOracle::spawn(&config.engine).await?;
    oracle.set_position(&config.starting_fen).await?;
    let state = GameState::new(config.human_plays_white, white_to_move(&config.starting_fen)?);

    let announcer = SpeechAnnouncer::new(config.tts_command.clone());
    let ledger = FileLedger::new(&config.ledger_path);
    let settings = LoopSettings::from(&config);

    match config.transcriber {
        TranscriberKind::Whisper => {
            let openai = config
                .openai
                .clone()
                .context("OPENAI_API_KEY is required for the whisper transcriber")?;
            let transcriber = WhisperTranscriber::new(
                OpenAiClient::new(openai)?,
                config.record_command.clone(),
                config.listen_timeout,
            );
            play(oracle, transcriber, announcer, ledger, state, settings).await
        }
        TranscriberKind::Console => {
            let transcriber = ConsoleTranscriber::new(config.listen_timeout);
            play(oracle, transcriber, announcer, ledger, state, settings).await
        }
    }
}

async fn play<T: TranscriptionService>(
    oracle: StockfishOracle,
    transcriber: T,
    announcer: SpeechAnnouncer,
    ledger: FileLedger,
    state: GameState,
    settings: LoopSettings,
) -> anyhow::Result<()> {
    let mut game = GameOrchestrator::new(oracle, transcriber, announcer, ledger, state, settings);
    game.start_game(Local::now()).await?;

    let result = game.run_until(shutdown_signal()).await;

    info!("Shutting down Stockfish");
    game.oracle_mut().quit().await;

    let outcome = result?;
    info!(%outcome, "Game finished");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
