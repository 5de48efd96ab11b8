//! # volley_core - Deterministic Volleyball Scoring & Rotation Engine
//!
//! This library scores volleyball matches and manages a rotating pool of
//! players for pickup-session play: configurable set/match rules, deuce and
//! sudden-death handling, tie-breaks, reversible scoring, and post-match
//! rotation of teams through a waiting queue that respects locked players.
//!
//! ## Design
//! - 100% deterministic: no randomness, no wall clock, no I/O
//! - One aggregate ([`GameState`]) holds match counters and rosters, so a
//!   boundary snapshot can undo a set/match transition atomically
//! - Invalid operations are silent no-ops, never errors: live scoring is
//!   never interrupted over a roster edge case
//! - JSON API for easy integration with UI hosts and storage

pub mod api;
pub mod engine;
pub mod error;
pub mod models;
pub mod state;

// Re-export the main API surface
pub use api::{apply_command, apply_command_json, export_state_json, import_state_json, Command};
pub use engine::{
    balance_teams_snake, distribute_standard, rotate, rotation_preview, BalanceResult,
    RotationResult,
};
pub use error::{CoreError, Result};
pub use models::{
    ActionLogEntry, DeuceType, GameConfig, GameMode, MatchRecord, Player, RotationMode,
    RotationReport, SetHistory, Team, TeamId,
};
pub use state::{GameState, Slot};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
