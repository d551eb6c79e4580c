#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure card bookkeeping: placement validation, FIFO hand refills, and
//! dead-creature recycling.

use cardfield_core::{
    Board, Card, CardPiles, Creature, CreatureId, EngineError, FactionId, GridPosition, Party,
    find_party, HAND_CAPACITY,
};

/// A creature cleared from the battlefield during cleanup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fallen {
    /// Creature that fell.
    pub creature: CreatureId,
    /// Cell the creature was cleared from.
    pub position: GridPosition,
    /// Whether the creature's card returned to the player deck.
    pub card_recycled: bool,
}

/// Deploys a player creature from the hand onto a battlefield cell.
///
/// Fails with [`EngineError::CellOccupied`] when the destination already
/// holds a creature and with [`EngineError::CardNotInHand`] when no matching
/// creature card is held. On success the returned board carries the creature
/// and the returned piles no longer hold its card.
pub fn place_creature(
    board: &Board,
    piles: &CardPiles,
    creature: CreatureId,
    position: GridPosition,
) -> Result<(Board, CardPiles), EngineError> {
    let cell = board
        .cell(position)
        .ok_or(EngineError::NotFound("battlefield cell"))?;
    if cell.occupant().is_some() {
        return Err(EngineError::CellOccupied { position });
    }

    let card_index = piles
        .hand()
        .iter()
        .position(|card| *card == Card::Creature(creature))
        .ok_or(EngineError::CardNotInHand { creature })?;

    let mut hand = piles.hand().to_vec();
    let _ = hand.remove(card_index);

    Ok((
        board.with_occupant(position, Some(creature)),
        CardPiles::new(piles.deck().to_vec(), hand),
    ))
}

/// Refills the hand up to [`HAND_CAPACITY`] by drawing from the deck head.
///
/// Drawn cards are appended to the hand tail, preserving relative order. A
/// hand already beyond capacity fails with [`EngineError::HandOverflow`].
/// Returns the new piles and the number of cards drawn.
pub fn refill_hand(piles: &CardPiles) -> Result<(CardPiles, usize), EngineError> {
    let holding = piles.hand().len();
    if holding > HAND_CAPACITY {
        return Err(EngineError::HandOverflow {
            holding,
            capacity: HAND_CAPACITY,
        });
    }

    let wanted = HAND_CAPACITY - holding;
    let drawn = wanted.min(piles.deck().len());

    let mut deck = piles.deck().to_vec();
    let mut hand = piles.hand().to_vec();
    hand.extend(deck.drain(..drawn));

    Ok((CardPiles::new(deck, hand), drawn))
}

/// Clears every dead occupant from the battlefield.
///
/// A dead player creature's card is appended once to the deck tail so it can
/// be redrawn later; computer deaths only vacate their cell. Creatures stay
/// in the roster — death removes them from the field, not from the game.
pub fn remove_fallen(
    creatures: &[Creature],
    parties: &[Party],
    board: &Board,
    piles: &CardPiles,
) -> Result<(Board, CardPiles, Vec<Fallen>), EngineError> {
    let mut next_board = board.clone();
    let mut deck = piles.deck().to_vec();
    let mut fallen = Vec::new();

    for cell in board.cells() {
        let Some(occupant) = cell.occupant() else {
            continue;
        };
        let creature = creatures
            .iter()
            .find(|creature| creature.id == occupant)
            .ok_or(EngineError::NotFound("creature"))?;
        if !creature.is_dead() {
            continue;
        }

        let party = find_party(parties, occupant).ok_or(EngineError::NotFound("party"))?;
        let card_recycled = party.faction() == FactionId::Player;
        if card_recycled {
            deck.push(Card::Creature(occupant));
        }

        next_board = next_board.with_occupant(cell.position(), None);
        fallen.push(Fallen {
            creature: occupant,
            position: cell.position(),
            card_recycled,
        });
    }

    Ok((
        next_board,
        CardPiles::new(deck, piles.hand().to_vec()),
        fallen,
    ))
}
