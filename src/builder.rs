//! Session construction.
//!
//! All [`GameSession`]s are built through the [`SessionBuilder`], which
//! validates the grid and pool configuration before any game state exists.
//! Defaults match the classic game: a 4x4 grid, one win per five rounds,
//! twenty points per win.

use std::sync::Arc;

use crate::error::{GridError, GridResult};
use crate::outcome_pool::OutcomePool;
use crate::rng::{Pcg32, SeedableRng};
use crate::session::GameSession;
use crate::storage::{MemoryStore, ScoreStore};
use crate::telemetry::ViolationObserver;
use crate::{DEFAULT_BOX_COUNT, DEFAULT_POOL_SIZE, DEFAULT_WIN_INCREMENT};

/// Grid size of the [`practice`](SessionBuilder::practice) preset: a 3x3
/// grid.
const PRACTICE_BOX_COUNT: usize = 9;
/// Pool size of the [`practice`](SessionBuilder::practice) preset: every
/// round is winnable.
const PRACTICE_POOL_SIZE: usize = 1;
/// Per-win increment of the [`practice`](SessionBuilder::practice) preset.
const PRACTICE_WIN_INCREMENT: u32 = 10;

/// The [`SessionBuilder`] builds [`GameSession`]s.
///
/// After setting all appropriate values, use
/// [`start_session`](Self::start_session) to consume the builder and create
/// the session.
///
/// # Example
///
/// ```
/// use mystic_grid::SessionBuilder;
///
/// let session = SessionBuilder::new()
///     .with_box_count(25)
///     .with_pool_size(8)
///     .with_win_increment(50)
///     .start_session()
///     .unwrap();
///
/// assert_eq!(session.box_count(), 25);
/// assert_eq!(session.pool().pool_size(), 8);
/// ```
#[must_use = "SessionBuilder must be consumed by calling start_session"]
pub struct SessionBuilder {
    box_count: usize,
    pool_size: usize,
    win_increment: u32,
    /// Fixed seed for reproducible sessions; entropy-seeded when `None`.
    seed: Option<u64>,
    store: Option<Box<dyn ScoreStore>>,
    /// Optional observer for policy violations.
    violation_observer: Option<Arc<dyn ViolationObserver>>,
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Destructure to ensure all fields are included when new fields are
        // added. The compiler will error if a new field is added but not
        // handled here.
        let Self {
            box_count,
            pool_size,
            win_increment,
            seed,
            store,
            violation_observer,
        } = self;

        f.debug_struct("SessionBuilder")
            .field("box_count", box_count)
            .field("pool_size", pool_size)
            .field("win_increment", win_increment)
            .field("seed", seed)
            .field("has_store", &store.is_some())
            .field("has_violation_observer", &violation_observer.is_some())
            .finish()
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    /// Construct a new builder with all values set to their defaults
    /// (identical to [`classic`](Self::classic)).
    pub fn new() -> Self {
        Self {
            box_count: DEFAULT_BOX_COUNT,
            pool_size: DEFAULT_POOL_SIZE,
            win_increment: DEFAULT_WIN_INCREMENT,
            seed: None,
            store: None,
            violation_observer: None,
        }
    }

    /// The classic game: 16 boxes, one win per five rounds, +20 per win.
    pub fn classic() -> Self {
        Self::new()
    }

    /// The practice game: 9 boxes, every round winnable, +10 per win.
    ///
    /// With a pool size of one, the outcome scheduler degenerates to "always
    /// winnable" - only the player's box pick decides the round.
    pub fn practice() -> Self {
        Self::new()
            .with_box_count(PRACTICE_BOX_COUNT)
            .with_pool_size(PRACTICE_POOL_SIZE)
            .with_win_increment(PRACTICE_WIN_INCREMENT)
    }

    /// Sets the number of boxes in the grid.
    pub fn with_box_count(mut self, box_count: usize) -> Self {
        self.box_count = box_count;
        self
    }

    /// Sets the outcome pool's batch size: exactly one round per
    /// `pool_size` consecutive rounds (aligned to refill boundaries) will be
    /// winnable.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Sets the score gained per winning tap.
    pub fn with_win_increment(mut self, win_increment: u32) -> Self {
        self.win_increment = win_increment;
        self
    }

    /// Seeds the session's RNG for reproducible rounds.
    ///
    /// Without a seed the RNG is seeded from timing entropy, which is what a
    /// shipped game wants; tests pin a seed to make round layouts
    /// deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Injects the persisted best-score store.
    ///
    /// Defaults to an in-process [`MemoryStore`], which keeps the best score
    /// for the lifetime of the session only.
    pub fn with_store(mut self, store: Box<dyn ScoreStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Registers an observer for policy violations (ignored taps with
    /// out-of-grid ids, malformed persisted scores, internal invariant
    /// checks).
    pub fn with_violation_observer(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.violation_observer = Some(observer);
        self
    }

    /// Consumes the builder and starts a session, dealing the first round.
    ///
    /// # Errors
    /// - Returns [`InvalidBoxCount`] if the grid would have no boxes.
    /// - Returns [`InvalidPoolSize`] if the pool size is zero.
    /// - Returns [`InvalidWinIncrement`] if the per-win increment is zero.
    ///
    /// [`InvalidBoxCount`]: GridError::InvalidBoxCount
    /// [`InvalidPoolSize`]: GridError::InvalidPoolSize
    /// [`InvalidWinIncrement`]: GridError::InvalidWinIncrement
    pub fn start_session(self) -> GridResult<GameSession> {
        if self.box_count == 0 {
            return Err(GridError::InvalidBoxCount {
                requested: self.box_count,
            });
        }
        if self.win_increment == 0 {
            return Err(GridError::InvalidWinIncrement {
                requested: self.win_increment,
            });
        }
        let pool = OutcomePool::new(self.pool_size)?;

        let rng = match self.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_entropy(),
        };
        let store = self
            .store
            .unwrap_or_else(|| Box::new(MemoryStore::new()) as Box<dyn ScoreStore>);

        Ok(GameSession::new(
            self.box_count,
            self.win_increment,
            pool,
            rng,
            store,
            self.violation_observer,
        ))
    }
}
