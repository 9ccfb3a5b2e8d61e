//! Convenient re-exports for common usage.
//!
//! This module provides a "prelude" that re-exports the most commonly used
//! types from Mystic Grid, allowing you to import them all at once.
//!
//! # Usage
//!
//! ```rust
//! use mystic_grid::prelude::*;
//! ```
//!
//! # What's Included
//!
//! The prelude includes:
//!
//! - **Session types**: [`GameSession`], [`SessionBuilder`], [`BoxSlot`]
//! - **Fundamental types**: [`BoxId`], [`BoxStatus`], [`RoundPhase`], [`TapOutcome`]
//! - **Outcome scheduling**: [`OutcomePool`], [`PoolState`]
//! - **Persistence**: [`ScoreStore`], [`MemoryStore`], [`BEST_SCORE_KEY`]
//! - **Error handling**: [`GridError`], [`GridResult`]
//! - **Randomness**: [`Pcg32`], [`Rng`], [`SeedableRng`]
//! - **Messages**: [`MSG_START`], [`MSG_WIN`], [`MSG_NEAR_MISS`], [`MSG_NO_LUCK`]

// Core session types
pub use crate::builder::SessionBuilder;
pub use crate::session::{BoxSlot, GameSession};

// Fundamental types
pub use crate::{BoxId, BoxStatus, RoundPhase, TapOutcome};

// Outcome scheduling
pub use crate::outcome_pool::{OutcomePool, PoolState};

// Persistence
#[cfg(feature = "json")]
pub use crate::storage::JsonFileStore;
pub use crate::storage::{MemoryStore, ScoreStore, BEST_SCORE_KEY};

// Error handling
pub use crate::error::{GridError, GridResult};

// Randomness
pub use crate::rng::{Pcg32, Rng, SeedableRng};

// Status messages
pub use crate::session::{MSG_NEAR_MISS, MSG_NO_LUCK, MSG_START, MSG_WIN};
