//! The game session state machine.
//!
//! A [`GameSession`] owns one round at a time: the box grid, the hidden
//! winner (if the round can be won at all), the score bookkeeping and the
//! user-facing status message. All round invariants live behind three
//! operations - [`start_round`](GameSession::start_round),
//! [`resolve_tap`](GameSession::resolve_tap) and
//! [`reset`](GameSession::reset) - so a presentation shell renders the
//! observable state and forwards events, nothing more.
//!
//! Everything is synchronous and single-threaded: one external event is
//! processed to completion before the next is accepted, and the "ignore taps
//! while resolved" rule is the sole concurrency-shaped guard the design
//! needs.

use std::sync::Arc;

use crate::outcome_pool::OutcomePool;
use crate::rng::{Pcg32, Rng};
use crate::storage::{ScoreStore, BEST_SCORE_KEY};
use crate::telemetry::{
    SpecViolation, TracingObserver, ViolationKind, ViolationObserver, ViolationSeverity,
};
use crate::{BoxId, BoxStatus, RoundPhase, TapOutcome};

/// Start-of-round prompt shown while the grid awaits a tap.
pub const MSG_START: &str = "TAP A BOX TO START";

/// Outcome message for a winning tap.
pub const MSG_WIN: &str = "ELITE WIN!";

/// Outcome message for a losing tap in a round that had a winner elsewhere.
pub const MSG_NEAR_MISS: &str = "SO CLOSE...";

/// Outcome message for a tap in a round that had no winner at all.
pub const MSG_NO_LUCK: &str = "NO LUCK THIS TIME";

/// One box in the grid: an id and its visual status.
///
/// Slots are rebuilt all-[`Idle`](BoxStatus::Idle) at the start of every
/// round and mutated exactly once, during round resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoxSlot {
    /// The box's position in the grid.
    pub id: BoxId,
    /// The box's current visual status.
    pub status: BoxStatus,
}

/// The live round state: grid, hidden winner, phase, score and message.
///
/// Constructed via [`SessionBuilder`]; lives for the whole app session.
/// Round-scoped fields (grid, winner, phase) reset on every
/// [`reset`](Self::reset), while `score` and `best_score` persist across
/// rounds - `best_score` additionally beyond the session via the injected
/// [`ScoreStore`].
///
/// # Invariants
///
/// - At most one box is [`Winning`](BoxStatus::Winning) and at most one is
///   [`Losing`](BoxStatus::Losing) before the next reset.
/// - When the round has no winner, no box ever shows
///   [`Winning`](BoxStatus::Winning) during that round.
/// - `best_score` never decreases, and always equals the maximum score ever
///   observed through the injected store's history.
///
/// [`SessionBuilder`]: crate::SessionBuilder
pub struct GameSession {
    box_count: usize,
    win_increment: u32,
    boxes: Vec<BoxSlot>,
    winning_box: Option<BoxId>,
    phase: RoundPhase,
    score: u32,
    best_score: u32,
    message: &'static str,
    /// 1-based round counter; increments on every round start.
    round: u64,
    pool: OutcomePool,
    rng: Pcg32,
    store: Box<dyn ScoreStore>,
    violation_observer: Option<Arc<dyn ViolationObserver>>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Destructure to ensure all fields are considered when new fields
        // are added; the compiler will error here otherwise.
        let Self {
            box_count,
            win_increment,
            boxes,
            winning_box,
            phase,
            score,
            best_score,
            message,
            round,
            pool,
            rng: _,
            store: _,
            violation_observer,
        } = self;

        f.debug_struct("GameSession")
            .field("box_count", box_count)
            .field("win_increment", win_increment)
            .field("boxes", boxes)
            .field("winning_box", winning_box)
            .field("phase", phase)
            .field("score", score)
            .field("best_score", best_score)
            .field("message", message)
            .field("round", round)
            .field("pool", pool)
            .field("has_violation_observer", &violation_observer.is_some())
            .finish()
    }
}

impl GameSession {
    /// Builds the session and deals its first round.
    ///
    /// Parameters are pre-validated by the builder.
    pub(crate) fn new(
        box_count: usize,
        win_increment: u32,
        pool: OutcomePool,
        rng: Pcg32,
        store: Box<dyn ScoreStore>,
        violation_observer: Option<Arc<dyn ViolationObserver>>,
    ) -> Self {
        let best_score = read_persisted_best(store.as_ref(), violation_observer.as_deref());

        let mut session = Self {
            box_count,
            win_increment,
            boxes: Vec::new(),
            winning_box: None,
            phase: RoundPhase::AwaitingInput,
            score: 0,
            best_score,
            message: MSG_START,
            round: 0,
            pool,
            rng,
            store,
            violation_observer,
        };
        session.start_round();
        session
    }

    /// Starts a fresh round.
    ///
    /// Rebuilds the grid all-idle, draws the round's winnable flag from the
    /// outcome pool, picks a uniformly random winner when the flag allows
    /// one, and returns the session to
    /// [`AwaitingInput`](RoundPhase::AwaitingInput). Score and best score
    /// are untouched.
    pub fn start_round(&mut self) {
        self.round += 1;
        self.boxes = (0..self.box_count)
            .map(|i| BoxSlot {
                id: BoxId::new(i),
                status: BoxStatus::Idle,
            })
            .collect();

        let winnable = self.pool.next_winnable(&mut self.rng);
        self.winning_box = winnable.then(|| BoxId::new(self.rng.gen_index(self.box_count)));

        self.phase = RoundPhase::AwaitingInput;
        self.message = MSG_START;

        tracing::debug!(round = self.round, winnable, "round started");
    }

    /// Resolves the player's tap on `id`.
    ///
    /// The tapped box becomes [`Winning`](BoxStatus::Winning) on a hit or
    /// [`Losing`](BoxStatus::Losing) on a miss; a missed real winner is also
    /// revealed, so the player always sees where the luck was. A win adds
    /// the configured increment to the score and ratchets (and persists) the
    /// best score; any loss resets the score to zero. The session then moves
    /// to [`Resolved`](RoundPhase::Resolved), from which only
    /// [`reset`](Self::reset) is a meaningful transition.
    ///
    /// Taps delivered while the round is already resolved are ignored
    /// entirely: no state mutation, no message change, return value
    /// [`TapOutcome::Ignored`]. The same applies to ids outside the grid,
    /// which the shell contract says cannot happen (a telemetry violation is
    /// reported for those).
    pub fn resolve_tap(&mut self, id: BoxId) -> TapOutcome {
        if self.phase == RoundPhase::Resolved {
            tracing::trace!(round = self.round, box_id = %id, "tap ignored: round already resolved");
            return TapOutcome::Ignored;
        }
        if !id.is_valid_for(self.box_count) {
            self.report(
                SpecViolation::new(
                    ViolationSeverity::Warning,
                    ViolationKind::RoundLifecycle,
                    format!(
                        "tap carries box id {} outside the {}-box grid",
                        id, self.box_count
                    ),
                    concat!(file!(), ":", line!()),
                )
                .with_round(self.round),
            );
            return TapOutcome::Ignored;
        }

        let (outcome, message) = match self.winning_box {
            Some(winner) if winner == id => (TapOutcome::Win, MSG_WIN),
            Some(_) => (TapOutcome::NearMiss, MSG_NEAR_MISS),
            None => (TapOutcome::NoLuck, MSG_NO_LUCK),
        };

        self.boxes[id.as_usize()].status = if outcome == TapOutcome::Win {
            BoxStatus::Winning
        } else {
            BoxStatus::Losing
        };
        // Reveal a missed winner so the loss is honest
        if let Some(winner) = self.winning_box {
            if winner != id {
                self.boxes[winner.as_usize()].status = BoxStatus::Winning;
            }
        }

        if outcome == TapOutcome::Win {
            self.score = self.score.saturating_add(self.win_increment);
            if self.score > self.best_score {
                self.best_score = self.score;
                self.store
                    .set(BEST_SCORE_KEY, &self.best_score.to_string());
            }
        } else {
            self.score = 0;
        }

        self.message = message;
        self.phase = RoundPhase::Resolved;

        tracing::debug!(
            round = self.round,
            box_id = %id,
            ?outcome,
            score = self.score,
            best_score = self.best_score,
            "round resolved"
        );

        outcome
    }

    /// Starts the next round ("play again").
    ///
    /// Equivalent to [`start_round`](Self::start_round). Expected from
    /// [`Resolved`](RoundPhase::Resolved), but calling it while still
    /// awaiting input is not an error - it simply redraws the round,
    /// consuming the next flag from the outcome pool.
    pub fn reset(&mut self) {
        self.start_round();
    }

    // ==========================================
    // Observable state
    // ==========================================

    /// Returns the current box grid.
    #[must_use]
    pub fn boxes(&self) -> &[BoxSlot] {
        &self.boxes
    }

    /// Returns the status of the box with the given id, or `None` for ids
    /// outside the grid.
    #[must_use]
    pub fn box_status(&self, id: BoxId) -> Option<BoxStatus> {
        self.boxes.get(id.as_usize()).map(|slot| slot.status)
    }

    /// Returns the hidden winner of the current round, or `None` when the
    /// round cannot be won.
    ///
    /// Before resolution this is the engine's secret; shells that render
    /// honestly read box statuses instead and only consult this for debug
    /// overlays or automated play.
    #[must_use]
    pub fn winning_box(&self) -> Option<BoxId> {
        self.winning_box
    }

    /// Returns the session's current phase.
    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Returns `true` once the round is resolved and taps are ignored.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.phase == RoundPhase::Resolved
    }

    /// Returns the current score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Returns the best score ever observed, including persisted history.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Returns the user-facing status message.
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Returns the 1-based number of the current round.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Returns the number of boxes in the grid.
    #[must_use]
    pub fn box_count(&self) -> usize {
        self.box_count
    }

    /// Returns the per-win score increment.
    #[must_use]
    pub fn win_increment(&self) -> u32 {
        self.win_increment
    }

    /// Returns the round outcome pool.
    #[must_use]
    pub fn pool(&self) -> &OutcomePool {
        &self.pool
    }

    /// Returns a reference to the violation observer, if one was configured.
    ///
    /// This allows checking for violations that occurred during session
    /// operations when using a
    /// [`CollectingObserver`](crate::telemetry::CollectingObserver) or
    /// similar.
    #[must_use]
    pub fn violation_observer(&self) -> Option<&Arc<dyn ViolationObserver>> {
        self.violation_observer.as_ref()
    }

    /// Routes a violation to the configured observer, or to tracing when
    /// none is set.
    fn report(&self, violation: SpecViolation) {
        match &self.violation_observer {
            Some(observer) => observer.on_violation(&violation),
            None => TracingObserver.on_violation(&violation),
        }
    }
}

/// Reads the persisted best score, treating absent or malformed values as
/// "no prior best score".
fn read_persisted_best(store: &dyn ScoreStore, observer: Option<&dyn ViolationObserver>) -> u32 {
    let Some(raw) = store.get(BEST_SCORE_KEY) else {
        return 0;
    };
    match raw.trim().parse::<u32>() {
        Ok(best) => best,
        Err(_) => {
            let violation = SpecViolation::new(
                ViolationSeverity::Warning,
                ViolationKind::Persistence,
                format!("stored best score {raw:?} is not a decimal score, treating as absent"),
                concat!(file!(), ":", line!()),
            );
            match observer {
                Some(observer) => observer.on_violation(&violation),
                None => TracingObserver.on_violation(&violation),
            }
            0
        }
    }
}
