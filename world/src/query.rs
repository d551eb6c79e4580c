//! Read projection over [`Game`](crate::Game) state.
//!
//! Adapters never touch the aggregate's fields directly; everything they
//! render comes through these functions. Projections are pure values
//! recomputed in full from the current state, so a cached projection never
//! goes stale silently.

use cardfield_core::{
    BattleResult, Card, CombatantSnapshot, CombatantView, CreatureId, GridPosition,
};
use cardfield_system_targeting::Targeting;
use serde::Serialize;

use crate::Game;

/// One battlefield cell as seen by an adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CellProjection {
    /// Position of the cell on the board.
    pub position: GridPosition,
    /// Snapshot of the occupying creature, if any.
    pub creature: Option<CombatantSnapshot>,
    /// Creature holding a reservation on the cell, if any.
    pub reservation: Option<CreatureId>,
    /// Whether the cell lies within the selected creature's attack reach.
    pub is_within_range: bool,
    /// Whether the occupant is an effective target of the selected creature.
    pub is_target: bool,
    /// Zero-based targeting priority among the effective targets.
    pub target_priority: Option<usize>,
}

/// Full battlefield projection in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BattleProjection {
    /// Number of battlefield rows.
    pub rows: u32,
    /// Number of battlefield columns.
    pub columns: u32,
    /// Every cell, row-major, annotated relative to the cursor selection.
    pub cells: Vec<CellProjection>,
}

/// Captures the battlefield relative to the current cursor selection.
///
/// Range and target annotations describe the selected cell's occupant: its
/// auto-attack reach paints `is_within_range` and the targeting priority
/// order fills `is_target`/`target_priority`. Without a selected occupant
/// every annotation is false.
#[must_use]
pub fn battle_projection(game: &Game) -> BattleProjection {
    let view = CombatantView::collect(&game.creatures, &game.parties, &game.board);
    let selection = selected_reach(game, &view);

    let cells = game
        .board
        .cells()
        .iter()
        .map(|cell| {
            let occupant = cell.occupant();
            let (is_within_range, is_target, target_priority) = match &selection {
                Some((covered, targets)) => {
                    let priority = occupant
                        .and_then(|id| targets.iter().position(|target| *target == id));
                    (covered.contains(&cell.position()), priority.is_some(), priority)
                }
                None => (false, false, None),
            };
            CellProjection {
                position: cell.position(),
                creature: occupant.and_then(|id| view.get(id).copied()),
                reservation: cell.reservation(),
                is_within_range,
                is_target,
                target_priority,
            }
        })
        .collect();

    BattleProjection {
        rows: game.board.rows(),
        columns: game.board.columns(),
        cells,
    }
}

type Selection = (Vec<GridPosition>, Vec<CreatureId>);

fn selected_reach(game: &Game, view: &CombatantView) -> Option<Selection> {
    let position = game.cursor?;
    let actor = game.board.occupant(position)?;
    let creature = game
        .creatures
        .iter()
        .find(|creature| creature.id == actor)?;
    let job = game.jobs.get(creature.job)?;
    let cap = usize::try_from(job.auto_attack_targets()).unwrap_or(usize::MAX);
    let covered = game
        .board
        .positions_within(position, job.auto_attack_reach());
    let targets = Targeting::new().select(view, actor, job.auto_attack_reach(), Some(cap));
    Some((covered, targets))
}

/// Cards currently playable from the player's hand.
#[must_use]
pub fn hand_view(game: &Game) -> &[Card] {
    game.piles.hand()
}

/// Cards remaining in the player's deck, front first.
#[must_use]
pub fn deck_view(game: &Game) -> &[Card] {
    game.piles.deck()
}

/// Snapshot of every creature standing on the battlefield.
#[must_use]
pub fn combatant_view(game: &Game) -> CombatantView {
    CombatantView::collect(&game.creatures, &game.parties, &game.board)
}

/// Turn number the battle is currently on.
#[must_use]
pub fn turn(game: &Game) -> u32 {
    game.turn
}

/// Result the battle has reached so far.
#[must_use]
pub fn result(game: &Game) -> BattleResult {
    game.result
}

/// Remaining life points of the player headquarters.
#[must_use]
pub fn headquarters_life_points(game: &Game) -> u32 {
    game.headquarters_life_points
}

/// Action points available to the player.
#[must_use]
pub fn action_points(game: &Game) -> u32 {
    game.action_points
}

/// Currently selected cell, if any.
#[must_use]
pub fn cursor(game: &Game) -> Option<GridPosition> {
    game.cursor
}
