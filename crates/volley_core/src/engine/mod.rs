//! The deterministic core: scoring state machine, balancing strategies and
//! post-match rotation. Everything in here is synchronous, allocation-light
//! and free of I/O; the same inputs always produce the same outputs.

pub mod balance;
pub mod rotation;
pub mod scoring;

pub use balance::{balance_teams_snake, distribute_standard, BalanceResult};
pub use rotation::{rotate, rotation_preview, RotationResult};
