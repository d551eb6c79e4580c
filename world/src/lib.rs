#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game-state management for Cardfield.
//!
//! The [`Game`] aggregate owns the battle state; [`apply`] is the only entry
//! point for changing it. Every application consumes the previous state by
//! reference and returns a fresh one, so adapters and tests can keep any
//! number of historical snapshots without interference. Events describing
//! what changed are appended to the caller's buffer only when the command
//! succeeds.

mod turns;

pub mod query;

use cardfield_core::{
    find_party, BattleResult, Board, Card, CardPiles, Command, Creature, CreatureAppearance,
    CreatureId, EngineError, Event, FactionId, GridPosition, Job, JobTable, Party, Skill, SkillId,
    SkillTable,
};
use cardfield_system_cards as cards;
use cardfield_system_combat as combat;
use cardfield_system_reservations::{RandomChooser, reserve_creatures};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Everything needed to assemble an initial [`Game`].
///
/// Callers supply the tables, rosters, schedule, and entropy; the engine
/// itself is deterministic given the seed.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Number of battlefield rows.
    pub rows: u32,
    /// Number of battlefield columns.
    pub columns: u32,
    /// Job templates every creature resolves its stats through.
    pub jobs: Vec<Job>,
    /// Skill definitions creatures may invoke.
    pub skills: Vec<Skill>,
    /// Full creature roster, both factions.
    pub creatures: Vec<Creature>,
    /// Party enrollment; each creature belongs to exactly one party.
    pub parties: Vec<Party>,
    /// Turn-indexed computer appearance schedule.
    pub appearances: Vec<CreatureAppearance>,
    /// Starting life points of the player headquarters.
    pub headquarters_life_points: u32,
    /// Action points available on the opening turn.
    pub action_points: u32,
    /// Action points recovered at the end of each turn.
    pub action_point_recovery: u32,
    /// Seed from which every random decision is derived.
    pub seed: u64,
}

/// Authoritative, immutable battle state.
///
/// Values of this type are only ever produced by [`new_game`] and [`apply`];
/// all fields stay private so the read projection in [`query`] is the only
/// way to observe them.
#[derive(Clone, Debug)]
pub struct Game {
    jobs: JobTable,
    skills: SkillTable,
    creatures: Vec<Creature>,
    parties: Vec<Party>,
    board: Board,
    piles: CardPiles,
    appearances: Vec<CreatureAppearance>,
    cursor: Option<GridPosition>,
    turn: u32,
    result: BattleResult,
    action_points: u32,
    action_point_recovery: u32,
    headquarters_life_points: u32,
    next_placement_order: u32,
    seed: u64,
}

/// Assembles the initial battle state from a configuration.
///
/// Every creature's life is restored to its job maximum, the player deck is
/// built from the player party in roster order, the opening hand is dealt,
/// and turn-zero appearances reserve their cells through the seeded chooser.
pub fn new_game(config: GameConfig) -> Result<Game, EngineError> {
    let board = Board::new(config.rows, config.columns);
    if !board.validate() {
        return Err(EngineError::InvalidBattlefield {
            rows: config.rows,
            columns: config.columns,
        });
    }

    let jobs = JobTable::from_jobs(config.jobs);
    let skills = SkillTable::from_skills(config.skills);

    let mut creatures = Vec::with_capacity(config.creatures.len());
    for creature in &config.creatures {
        let max = creature.max_life_points(&jobs)?;
        creatures.push(creature.alter_life_points(&jobs, i64::from(max))?);
    }

    let deck: Vec<Card> = creatures
        .iter()
        .filter(|creature| {
            find_party(&config.parties, creature.id)
                .map_or(false, |party| party.faction() == FactionId::Player)
        })
        .map(|creature| Card::Creature(creature.id))
        .collect();
    let (piles, _) = cards::refill_hand(&CardPiles::new(deck, Vec::new()))?;

    let mut chooser = RandomChooser::new(ChaCha8Rng::seed_from_u64(derive_turn_seed(
        config.seed,
        0,
    )));
    let (board, _) = reserve_creatures(&board, &config.appearances, 0, &mut chooser)?;

    Ok(Game {
        jobs,
        skills,
        creatures,
        parties: config.parties,
        board,
        piles,
        appearances: config.appearances,
        cursor: None,
        turn: 0,
        result: BattleResult::Pending,
        action_points: config.action_points,
        action_point_recovery: config.action_point_recovery,
        headquarters_life_points: config.headquarters_life_points,
        next_placement_order: 0,
        seed: config.seed,
    })
}

/// Applies `command` to `game`, returning the next state.
///
/// Events describing the changes are appended to `out_events` only on
/// success; a failed command appends nothing and the caller keeps the prior
/// state. Gameplay commands against a decided battle return the state
/// unchanged without emitting events.
pub fn apply(
    game: &Game,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<Game, EngineError> {
    let mut staged = Vec::new();
    let next = match command {
        Command::SelectCell { position } => select_cell(game, position, &mut staged)?,
        Command::PlaceCreature { creature, position } => {
            if game.result.is_decided() {
                game.clone()
            } else {
                place_creature(game, creature, position, &mut staged)?
            }
        }
        Command::InvokeSkill { actor, skill } => {
            if game.result.is_decided() {
                game.clone()
            } else {
                invoke_skill(game, actor, skill, &mut staged)?
            }
        }
        Command::ProceedTurn => {
            if game.result.is_decided() {
                game.clone()
            } else {
                turns::proceed_turn(game, &mut staged)?
            }
        }
    };
    out_events.append(&mut staged);
    Ok(next)
}

fn select_cell(
    game: &Game,
    position: GridPosition,
    out_events: &mut Vec<Event>,
) -> Result<Game, EngineError> {
    if game.board.cell(position).is_none() {
        return Err(EngineError::NotFound("battlefield cell"));
    }

    let mut next = game.clone();
    next.cursor = if game.cursor == Some(position) {
        None
    } else {
        Some(position)
    };
    out_events.push(Event::CursorMoved { cell: next.cursor });
    Ok(next)
}

fn place_creature(
    game: &Game,
    creature: CreatureId,
    position: GridPosition,
    out_events: &mut Vec<Event>,
) -> Result<Game, EngineError> {
    let (board, piles) = cards::place_creature(&game.board, &game.piles, creature, position)?;

    let mut next = game.clone();
    next.board = board;
    next.piles = piles;
    next.assign_placement_order(creature)?;
    next.action_points = next.action_points.saturating_sub(1);
    out_events.push(Event::CreaturePlaced { creature, position });
    Ok(next)
}

fn invoke_skill(
    game: &Game,
    actor: CreatureId,
    skill: SkillId,
    out_events: &mut Vec<Event>,
) -> Result<Game, EngineError> {
    let outcome = combat::invoke_skill(
        actor,
        skill,
        &game.creatures,
        &game.parties,
        &game.jobs,
        &game.skills,
        &game.board,
    )?;

    let mut next = game.clone();
    next.creatures = outcome.creatures;
    for strike in &outcome.strikes {
        out_events.push(Event::CreatureStruck {
            attacker: strike.attacker,
            target: strike.target,
            damage: strike.damage,
            remaining_life_points: strike.remaining_life_points,
        });
    }
    next.clear_fallen(out_events)?;
    Ok(next)
}

impl Game {
    fn assign_placement_order(&mut self, creature: CreatureId) -> Result<(), EngineError> {
        let placed = self
            .creatures
            .iter_mut()
            .find(|candidate| candidate.id == creature)
            .ok_or(EngineError::NotFound("creature"))?;
        placed.placement_order = Some(self.next_placement_order);
        self.next_placement_order = self.next_placement_order.saturating_add(1);
        Ok(())
    }

    fn clear_fallen(&mut self, out_events: &mut Vec<Event>) -> Result<(), EngineError> {
        let (board, piles, fallen) =
            cards::remove_fallen(&self.creatures, &self.parties, &self.board, &self.piles)?;
        self.board = board;
        self.piles = piles;
        for loss in fallen {
            out_events.push(Event::CreatureFell {
                creature: loss.creature,
                position: loss.position,
                card_recycled: loss.card_recycled,
            });
        }
        Ok(())
    }
}

fn derive_turn_seed(seed: u64, turn: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(turn.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
