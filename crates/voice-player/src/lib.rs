pub mod announcer;
pub mod command;
pub mod config;
pub mod error;
pub mod ledger;
pub mod openai;
pub mod oracle;
pub mod orchestrator;
pub mod phrases;
pub mod stockfish;
pub mod transcription;
