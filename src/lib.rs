//! # Mystic Grid
//!
//! A single-round "pick the lucky box" game engine written in 100% safe Rust.
//!
//! A grid of identical boxes is shown, the player taps one, and the tap is
//! immediately scored as a win or a loss against a hidden winning box chosen
//! by the engine. What makes the engine interesting is the **round outcome
//! scheduler**: instead of flipping an independent coin every round, wins are
//! dealt from a pre-generated pool that contains exactly one winnable round
//! per `pool_size` rounds. The long-run win ratio is therefore a hard
//! guarantee, not a statistical tendency.
//!
//! The crate contains no rendering, no UI framework bindings and no concrete
//! persistence backend. A presentation shell renders the observable state of
//! a [`GameSession`] (box statuses, score, best score, message) and forwards
//! tap and reset events into [`GameSession::resolve_tap`] and
//! [`GameSession::reset`]. Best-score persistence goes through the injectable
//! [`ScoreStore`] key-value trait.
//!
//! ```
//! use mystic_grid::{BoxId, SessionBuilder, TapOutcome};
//!
//! let mut session = SessionBuilder::classic()
//!     .with_seed(7)
//!     .start_session()
//!     .unwrap();
//!
//! // The player taps box 3.
//! let outcome = session.resolve_tap(BoxId::new(3));
//! assert!(session.game_over());
//! if outcome == TapOutcome::Win {
//!     assert_eq!(session.score(), 20);
//! }
//!
//! // "Play again" deals the next round from the pool.
//! session.reset();
//! assert!(!session.game_over());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use builder::SessionBuilder;
pub use error::{GridError, GridResult};
pub use outcome_pool::{OutcomePool, PoolState};
pub use session::{BoxSlot, GameSession};
pub use session::{MSG_NEAR_MISS, MSG_NO_LUCK, MSG_START, MSG_WIN};
#[cfg(feature = "json")]
pub use storage::JsonFileStore;
pub use storage::{MemoryStore, ScoreStore, BEST_SCORE_KEY};

#[doc(hidden)]
pub mod builder;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod outcome_pool;
pub mod prelude;
/// Internal random number generator module based on PCG32.
///
/// Provides the uniform index draws behind both random choices the engine
/// makes: the position of the winnable flag within a pool batch and the id
/// of the winning box. See the module documentation for usage details.
pub mod rng;
#[doc(hidden)]
pub mod session;
#[doc(hidden)]
pub mod storage;
pub mod telemetry;

// #############
// # CONSTANTS #
// #############

/// The box grid size used by [`SessionBuilder::classic`]: a 4x4 grid.
pub const DEFAULT_BOX_COUNT: usize = 16;

/// The pool size used by [`SessionBuilder::classic`]: one win per five rounds.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// The per-win score increment used by [`SessionBuilder::classic`].
pub const DEFAULT_WIN_INCREMENT: u32 = 20;

/// The id of a box in the grid.
///
/// Boxes are numbered `0..box_count`, row-major from the shell's point of
/// view, though the engine attaches no geometry to them.
///
/// # Type Safety
///
/// `BoxId` is a newtype wrapper around `usize` that provides:
/// - Clear semantic meaning (box identifiers vs arbitrary integers)
/// - A validity check against a concrete grid via [`is_valid_for`](BoxId::is_valid_for)
/// - Compile-time prevention of accidentally mixing box ids with other integers
///
/// # Examples
///
/// ```
/// use mystic_grid::BoxId;
///
/// let id = BoxId::new(3);
/// assert_eq!(id.as_usize(), 3);
/// assert!(id.is_valid_for(16));
/// assert!(!id.is_valid_for(3));
/// ```
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct BoxId(usize);

impl BoxId {
    /// Creates a new `BoxId` from a `usize` value.
    ///
    /// Note: This does not validate the id against a specific grid. Use
    /// [`BoxId::is_valid_for`] to check the id against a box count.
    #[inline]
    #[must_use]
    pub const fn new(id: usize) -> Self {
        BoxId(id)
    }

    /// Returns the underlying `usize` value.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Returns `true` if this id refers to a box in a grid of `box_count`
    /// boxes.
    #[inline]
    #[must_use]
    pub const fn is_valid_for(self, box_count: usize) -> bool {
        self.0 < box_count
    }
}

impl std::fmt::Display for BoxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for BoxId {
    #[inline]
    fn from(value: usize) -> Self {
        BoxId(value)
    }
}

impl From<BoxId> for usize {
    #[inline]
    fn from(id: BoxId) -> Self {
        id.0
    }
}

impl PartialEq<usize> for BoxId {
    #[inline]
    fn eq(&self, other: &usize) -> bool {
        self.0 == *other
    }
}

// #############
// #   ENUMS   #
// #############

/// The visual status of a single box.
///
/// All boxes start a round as [`Idle`](BoxStatus::Idle). During round
/// resolution at most one box becomes [`Winning`](BoxStatus::Winning) and at
/// most one becomes [`Losing`](BoxStatus::Losing); statuses then stay frozen
/// until the next reset rebuilds the grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxStatus {
    /// The box has not been involved in the round's resolution.
    #[default]
    Idle,
    /// The box is the round's winner (tapped or revealed).
    Winning,
    /// The box was tapped and lost.
    Losing,
}

/// A session is always in one of these phases. You can query the current
/// phase of a session via [`GameSession::phase`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// The grid is live and the session is waiting for a single tap.
    AwaitingInput,
    /// The round has been resolved; further taps are ignored until a reset.
    Resolved,
}

/// The result of delivering a tap to [`GameSession::resolve_tap`].
///
/// The first three variants resolve the round; [`Ignored`](TapOutcome::Ignored)
/// means the tap had no effect at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapOutcome {
    /// The tapped box was the hidden winner. Score increased.
    Win,
    /// The round had a winner, but a different box was tapped. The real
    /// winner is revealed and the score resets to zero.
    NearMiss,
    /// The round had no winner at all; any tap loses. Score resets to zero.
    NoLuck,
    /// The tap was delivered outside [`RoundPhase::AwaitingInput`] (or with
    /// an out-of-grid id) and was silently dropped. No state changed.
    Ignored,
}

// ###################
// # UNIT TESTS      #
// ###################
