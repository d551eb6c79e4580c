#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that evaluates whether a battle has been decided.

use cardfield_core::{
    find_party, BattleResult, Board, CreatureAppearance, FactionId, Party,
};

/// Reports whether the player has won.
///
/// Victory requires that every scheduled appearance turn has already passed
/// and that no computer creature remains on the board, either standing on a
/// cell or holding a reservation. A pending reservation still counts as a
/// presence: the reinforcement is committed even though it has not
/// materialized yet.
#[must_use]
pub fn player_has_victory(
    parties: &[Party],
    board: &Board,
    appearances: &[CreatureAppearance],
    turn: u32,
) -> bool {
    if appearances.iter().any(|entry| entry.turn() > turn) {
        return false;
    }

    board.cells().iter().all(|cell| {
        cell.occupant()
            .into_iter()
            .chain(cell.reservation())
            .all(|creature| {
                find_party(parties, creature)
                    .map_or(true, |party| party.faction() != FactionId::Computer)
            })
    })
}

/// Reports whether the player has lost: the headquarters has fallen.
#[must_use]
pub const fn player_has_defeat(headquarters_life_points: u32) -> bool {
    headquarters_life_points == 0
}

/// Evaluates the battle outcome, with victory taking precedence over defeat.
#[must_use]
pub fn determine(
    parties: &[Party],
    board: &Board,
    appearances: &[CreatureAppearance],
    turn: u32,
    headquarters_life_points: u32,
) -> BattleResult {
    if player_has_victory(parties, board, appearances, turn) {
        BattleResult::Victory
    } else if player_has_defeat(headquarters_life_points) {
        BattleResult::Defeat
    } else {
        BattleResult::Pending
    }
}
