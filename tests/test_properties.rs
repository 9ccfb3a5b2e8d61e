//! Property-based tests for the session's externally observable invariants.
//!
//! Invariants exercised under random configurations and tap sequences:
//!
//! - INV-1: Aligned windows of `pool_size` rounds contain exactly one
//!   winnable round, end-to-end through the session.
//! - INV-2: After resolution, at most one box is winning and at most one is
//!   losing; a winning box exists iff the round had a hidden winner.
//! - INV-3: A round with no hidden winner never shows a winning box, no
//!   matter which box is tapped.
//! - INV-4: Taps on a resolved round change nothing.
//! - INV-5: The best score equals the maximum score ever observed.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use mystic_grid::prelude::*;
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Strategy for pool sizes, covering the degenerate always-winnable case.
fn pool_size_strategy() -> impl Strategy<Value = usize> {
    1usize..10
}

/// Strategy for grid sizes, down to a single box.
fn box_count_strategy() -> impl Strategy<Value = usize> {
    1usize..25
}

/// Strategy for tap sequences: a raw pick (reduced modulo the grid) plus
/// whether to deliver a second, must-be-ignored tap before resetting.
fn tap_sequence_strategy() -> impl Strategy<Value = Vec<(usize, bool)>> {
    proptest::collection::vec((0usize..64, proptest::bool::ANY), 1..50)
}

fn build_session(seed: u64, box_count: usize, pool_size: usize) -> GameSession {
    SessionBuilder::new()
        .with_seed(seed)
        .with_box_count(box_count)
        .with_pool_size(pool_size)
        .with_win_increment(20)
        .start_session()
        .expect("validated configuration")
}

// ============================================================================
// Session Invariant Tests
// ============================================================================

proptest! {
    /// INV-1: the pool's ratio survives the session layer: over
    /// `batches * pool_size` rounds, exactly `batches` carry a winner.
    #[test]
    fn prop_winnable_rounds_match_batch_count(
        seed in any::<u64>(),
        pool_size in pool_size_strategy(),
        box_count in box_count_strategy(),
        batches in 1usize..12,
    ) {
        let mut session = build_session(seed, box_count, pool_size);

        let mut winnable = 0;
        for _ in 0..batches * pool_size {
            if session.winning_box().is_some() {
                winnable += 1;
            }
            session.reset();
        }
        prop_assert_eq!(winnable, batches);
    }

    /// INV-2 + INV-3 + INV-5: status counts and the score ratchet across
    /// arbitrary tap sequences.
    #[test]
    fn prop_resolution_and_score_invariants(
        seed in any::<u64>(),
        pool_size in pool_size_strategy(),
        box_count in box_count_strategy(),
        taps in tap_sequence_strategy(),
    ) {
        let mut session = build_session(seed, box_count, pool_size);
        let mut max_score_observed = 0u32;

        for (raw_pick, hammer) in taps {
            let id = BoxId::new(raw_pick % box_count);
            let winner = session.winning_box();

            let outcome = session.resolve_tap(id);

            // A first tap on a live round always resolves
            prop_assert_ne!(outcome, TapOutcome::Ignored);
            match outcome {
                TapOutcome::Win => prop_assert_eq!(winner, Some(id)),
                TapOutcome::NearMiss => {
                    prop_assert!(winner.is_some());
                    prop_assert_ne!(winner, Some(id));
                }
                TapOutcome::NoLuck => prop_assert_eq!(winner, None),
                TapOutcome::Ignored => unreachable!(),
            }

            // INV-2/INV-3: box status counts follow the winner relation
            let winning = session
                .boxes()
                .iter()
                .filter(|slot| slot.status == BoxStatus::Winning)
                .count();
            let losing = session
                .boxes()
                .iter()
                .filter(|slot| slot.status == BoxStatus::Losing)
                .count();
            prop_assert_eq!(winning, usize::from(winner.is_some()));
            prop_assert_eq!(losing, usize::from(outcome != TapOutcome::Win));

            max_score_observed = max_score_observed.max(session.score());

            // INV-4: hammering a resolved round is inert
            if hammer {
                let grid: Vec<BoxSlot> = session.boxes().to_vec();
                let (score, best, message) =
                    (session.score(), session.best_score(), session.message());

                prop_assert_eq!(session.resolve_tap(BoxId::new(0)), TapOutcome::Ignored);

                prop_assert_eq!(session.boxes(), grid.as_slice());
                prop_assert_eq!(session.score(), score);
                prop_assert_eq!(session.best_score(), best);
                prop_assert_eq!(session.message(), message);
            }

            session.reset();
        }

        // INV-5: the ratchet saw everything
        prop_assert_eq!(session.best_score(), max_score_observed);
    }

    /// Score is always either zero (after a loss) or a multiple of the win
    /// increment (a live streak).
    #[test]
    fn prop_score_is_a_streak_multiple(
        seed in any::<u64>(),
        pool_size in pool_size_strategy(),
        taps in tap_sequence_strategy(),
    ) {
        let mut session = build_session(seed, 16, pool_size);

        for (raw_pick, _) in taps {
            let _ = session.resolve_tap(BoxId::new(raw_pick % 16));
            prop_assert_eq!(session.score() % 20, 0);
            session.reset();
        }
    }

    /// Messages always match the outcome of the last resolution.
    #[test]
    fn prop_message_tracks_outcome(
        seed in any::<u64>(),
        pool_size in pool_size_strategy(),
        taps in tap_sequence_strategy(),
    ) {
        let mut session = build_session(seed, 16, pool_size);

        for (raw_pick, _) in taps {
            prop_assert_eq!(session.message(), MSG_START);

            let outcome = session.resolve_tap(BoxId::new(raw_pick % 16));
            let expected = match outcome {
                TapOutcome::Win => MSG_WIN,
                TapOutcome::NearMiss => MSG_NEAR_MISS,
                TapOutcome::NoLuck => MSG_NO_LUCK,
                TapOutcome::Ignored => unreachable!(),
            };
            prop_assert_eq!(session.message(), expected);

            session.reset();
        }
    }
}
