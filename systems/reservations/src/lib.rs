#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that books battlefield cells for scheduled computer
//! appearances.
//!
//! Reservations mark cells one turn ahead of materialization so the player
//! can see where reinforcements will land. Cell choice is injected through
//! [`CellChooser`] so the engine stays deterministic under a seeded chooser
//! while tests can pin exact cells.

use cardfield_core::{Board, CreatureAppearance, CreatureId, EngineError, GridPosition};
use rand::seq::SliceRandom;
use rand::Rng;

/// Strategy for picking reservation cells from the vacant pool.
pub trait CellChooser {
    /// Picks `count` distinct positions out of `vacant`.
    ///
    /// Callers guarantee `vacant.len() >= count`; implementations must
    /// return exactly `count` positions drawn from `vacant` without
    /// repetition.
    fn choose(&mut self, vacant: &[GridPosition], count: usize) -> Vec<GridPosition>;
}

/// Production chooser: uniform sampling without replacement.
#[derive(Debug)]
pub struct RandomChooser<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomChooser<R> {
    /// Wraps a random number generator as a cell chooser.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> CellChooser for RandomChooser<R> {
    fn choose(&mut self, vacant: &[GridPosition], count: usize) -> Vec<GridPosition> {
        vacant
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect()
    }
}

/// Test chooser: takes vacant cells in board order.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstVacant;

impl CellChooser for FirstVacant {
    fn choose(&mut self, vacant: &[GridPosition], count: usize) -> Vec<GridPosition> {
        vacant[..count].to_vec()
    }
}

/// Reserves cells for every creature scheduled to appear on `turn`.
///
/// Turns with no appearance entry leave the board untouched. When the vacant
/// unreserved pool cannot seat the whole group the reservation fails with
/// [`EngineError::InsufficientSpace`] before any cell is booked. Returns the
/// updated board and the `(creature, cell)` pairs in schedule order.
pub fn reserve_creatures(
    board: &Board,
    appearances: &[CreatureAppearance],
    turn: u32,
    chooser: &mut dyn CellChooser,
) -> Result<(Board, Vec<(CreatureId, GridPosition)>), EngineError> {
    let Some(appearance) = appearances.iter().find(|entry| entry.turn() == turn) else {
        return Ok((board.clone(), Vec::new()));
    };

    let vacant = board.vacant_unreserved_positions();
    let required = appearance.creatures().len();
    if vacant.len() < required {
        return Err(EngineError::InsufficientSpace {
            required,
            available: vacant.len(),
        });
    }

    let cells = chooser.choose(&vacant, required);
    debug_assert_eq!(cells.len(), required);

    let mut next_board = board.clone();
    let mut reserved = Vec::with_capacity(required);
    for (creature, cell) in appearance.creatures().iter().copied().zip(cells) {
        next_board = next_board.with_reservation(cell, Some(creature));
        reserved.push((creature, cell));
    }

    Ok((next_board, reserved))
}
