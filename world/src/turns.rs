//! Turn orchestration: the fixed phase sequence behind `ProceedTurn`.

use cardfield_core::{find_party, CreatureId, EngineError, Event, FactionId, GridPosition};
use cardfield_system_cards as cards;
use cardfield_system_combat as combat;
use cardfield_system_reservations::{RandomChooser, reserve_creatures};
use cardfield_system_victory as victory;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{derive_turn_seed, Game};

/// Resolves one full turn cycle over `game`, producing the next state.
///
/// Phases run in a fixed order and each reads the output of the previous
/// one: materialize reservations, reset auto-attack flags, auto-attacks,
/// raids, dead-creature cleanup, next-wave reservation, hand refill,
/// action-point recovery, and finally the victory/defeat evaluation.
pub(crate) fn proceed_turn(
    game: &Game,
    out_events: &mut Vec<Event>,
) -> Result<Game, EngineError> {
    let mut next = game.clone();

    materialize_reservations(&mut next, out_events)?;

    for creature in next.creatures.iter_mut() {
        creature.auto_attack_invoked = false;
    }

    let attackers = resolve_auto_attacks(&mut next, out_events)?;
    resolve_raids(&mut next, &attackers, out_events)?;
    next.clear_fallen(out_events)?;

    let next_turn = game.turn.saturating_add(1);
    reserve_next_wave(&mut next, next_turn, out_events)?;

    let (piles, drawn) = cards::refill_hand(&next.piles)?;
    next.piles = piles;
    if drawn > 0 {
        out_events.push(Event::CardsDrawn { count: drawn });
    }

    next.action_points = next.action_points.saturating_add(next.action_point_recovery);
    next.turn = next_turn;

    next.result = victory::determine(
        &next.parties,
        &next.board,
        &next.appearances,
        next.turn,
        next.headquarters_life_points,
    );
    out_events.push(Event::TurnEnded { turn: game.turn });
    if next.result.is_decided() {
        out_events.push(Event::BattleDecided {
            result: next.result,
        });
    }

    Ok(next)
}

/// Turns the previous turn's reservations into occupants.
///
/// A reservation whose cell was occupied in the meantime stays pending and
/// tries again next turn.
fn materialize_reservations(
    next: &mut Game,
    out_events: &mut Vec<Event>,
) -> Result<(), EngineError> {
    let pending: Vec<(CreatureId, GridPosition)> = next
        .board
        .cells()
        .iter()
        .filter_map(|cell| cell.reservation().map(|creature| (creature, cell.position())))
        .collect();

    for (creature, position) in pending {
        if next.board.occupant(position).is_some() {
            continue;
        }
        next.board = next
            .board
            .with_occupant(position, Some(creature))
            .with_reservation(position, None);
        next.assign_placement_order(creature)?;
        out_events.push(Event::CreatureMaterialized { creature, position });
    }
    Ok(())
}

/// Runs every placed creature's auto-attack against the evolving state.
///
/// Actors resolve in deterministic order (placement order, then id) and each
/// sees the damage dealt by the actors before it. Returns the creatures that
/// actually struck something; the raid phase treats them as blocked.
fn resolve_auto_attacks(
    next: &mut Game,
    out_events: &mut Vec<Event>,
) -> Result<Vec<CreatureId>, EngineError> {
    let mut actors: Vec<(bool, u32, CreatureId)> = next
        .creatures
        .iter()
        .filter(|creature| next.board.position_of(creature.id).is_some())
        .map(|creature| {
            (
                creature.placement_order.is_none(),
                creature.placement_order.unwrap_or(0),
                creature.id,
            )
        })
        .collect();
    actors.sort_unstable();

    let mut attackers = Vec::new();
    for (_, _, actor) in actors {
        let current = next
            .creatures
            .iter()
            .find(|creature| creature.id == actor)
            .ok_or(EngineError::NotFound("creature"))?;
        if current.is_dead() {
            continue;
        }

        let outcome = combat::invoke_auto_attack(
            actor,
            &next.creatures,
            &next.parties,
            &next.jobs,
            &next.board,
        )?;
        if !outcome.strikes.is_empty() {
            attackers.push(actor);
        }
        for strike in &outcome.strikes {
            out_events.push(Event::CreatureStruck {
                attacker: strike.attacker,
                target: strike.target,
                damage: strike.damage,
                remaining_life_points: strike.remaining_life_points,
            });
        }
        next.creatures = outcome.creatures;
    }
    Ok(attackers)
}

/// Accrues raid charge for unblocked computer creatures and fires raids.
///
/// A creature that auto-attacked this turn is blocked and accrues nothing.
/// Reaching the job's raid interval fires the raid against the headquarters
/// and resets the charge.
fn resolve_raids(
    next: &mut Game,
    attackers: &[CreatureId],
    out_events: &mut Vec<Event>,
) -> Result<(), EngineError> {
    for index in 0..next.creatures.len() {
        let raider = next.creatures[index].clone();
        if raider.is_dead() || next.board.position_of(raider.id).is_none() {
            continue;
        }
        let party = find_party(&next.parties, raider.id).ok_or(EngineError::NotFound("party"))?;
        if party.faction() != FactionId::Computer || attackers.contains(&raider.id) {
            continue;
        }

        let interval = next
            .jobs
            .get(raider.job)
            .ok_or(EngineError::NotFound("job"))?
            .raid_interval();
        let mut charge = raider.raid_charge.saturating_add(1);
        if charge >= interval {
            let remaining =
                combat::invoke_raid(&raider, &next.jobs, next.headquarters_life_points)?;
            out_events.push(Event::HeadquartersRaided {
                raider: raider.id,
                damage: next.headquarters_life_points.saturating_sub(remaining),
                remaining_life_points: remaining,
            });
            next.headquarters_life_points = remaining;
            charge = 0;
        }
        next.creatures[index].raid_charge = charge;
    }
    Ok(())
}

/// Books cells for the creatures scheduled to appear on `next_turn`.
fn reserve_next_wave(
    next: &mut Game,
    next_turn: u32,
    out_events: &mut Vec<Event>,
) -> Result<(), EngineError> {
    let mut chooser = RandomChooser::new(ChaCha8Rng::seed_from_u64(derive_turn_seed(
        next.seed, next_turn,
    )));
    let (board, reserved) =
        reserve_creatures(&next.board, &next.appearances, next_turn, &mut chooser)?;
    next.board = board;
    if !reserved.is_empty() {
        out_events.push(Event::CreaturesReserved {
            turn: next_turn,
            cells: reserved.iter().map(|(_, cell)| *cell).collect(),
        });
    }
    Ok(())
}
