//! AI narrative services.
//!
//! # Data Flow
//! ```text
//! POST /ai/gsm/create-session (GameSessionConfig)
//!     → game_state_manager.rs (ground truth + public summary)
//!     → narrator.rs (opening scene, options, clue log)
//!     → client.rs (structured generation, one call each, no retries)
//! ```

pub mod client;
pub mod game_state_manager;
pub mod narrator;

pub use client::{
    GenerationClient, GenerationError, GenerationSettings, OpenAiClient, OutputSchema,
    StructuredRequest,
};
pub use game_state_manager::{create_game_session, GameSessionConfig, GameStateSummary};
pub use narrator::{start_narration, ActionOption, ClueEntry, NarratorTurn};
