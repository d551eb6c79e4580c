#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a scripted Cardfield demo battle.
//!
//! The binary assembles a small demo roster, then loops: deploy the first
//! creature card in hand onto the first free cell, advance the turn, and
//! print every event the engine emitted, until the battle is decided or the
//! turn limit runs out.

use anyhow::Context;
use cardfield_core::{
    Card, Command, Creature, CreatureAppearance, CreatureId, Event, FactionId, GridPosition, Job,
    JobId, Party, RangeShape, Reach, Skill, SkillCategory, SkillId,
};
use cardfield_world::{apply, new_game, query, Game, GameConfig};
use clap::Parser;

const GUARD: JobId = JobId::new(0);
const STALKER: JobId = JobId::new(1);
const BLAST: SkillId = SkillId::new(0);

/// Command-line arguments controlling the demo battle.
#[derive(Debug, Parser)]
#[command(name = "cardfield", about = "Runs a scripted Cardfield demo battle")]
struct Args {
    /// Number of battlefield rows.
    #[arg(long, default_value_t = 4)]
    rows: u32,
    /// Number of battlefield columns.
    #[arg(long, default_value_t = 5)]
    columns: u32,
    /// Seed for the reservation chooser; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of turns before the demo gives up.
    #[arg(long, default_value_t = 20)]
    max_turns: u32,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    println!("battlefield {}x{}, seed {seed}", args.rows, args.columns);

    let mut game = new_game(demo_config(&args, seed)).context("failed to assemble the battle")?;
    for _ in 0..args.max_turns {
        if let Some(command) = next_placement(&game) {
            game = run(&game, command)?;
        }
        game = run(&game, Command::ProceedTurn)?;
        if query::result(&game).is_decided() {
            break;
        }
    }

    println!(
        "battle finished on turn {} with {:?}, headquarters at {}",
        query::turn(&game),
        query::result(&game),
        query::headquarters_life_points(&game),
    );
    Ok(())
}

fn run(game: &Game, command: Command) -> anyhow::Result<Game> {
    let mut events = Vec::new();
    let next = apply(game, command, &mut events).context("command rejected")?;
    for event in &events {
        describe(event);
    }
    Ok(next)
}

/// Picks the next scripted deployment: first creature card in hand, first
/// cell that is neither occupied nor reserved.
fn next_placement(game: &Game) -> Option<Command> {
    let creature = query::hand_view(game).iter().find_map(|card| match card {
        Card::Creature(id) => Some(*id),
        Card::Skill(_) => None,
    })?;
    let position = query::battle_projection(game)
        .cells
        .iter()
        .find(|cell| cell.creature.is_none() && cell.reservation.is_none())
        .map(|cell| cell.position)?;
    Some(Command::PlaceCreature { creature, position })
}

fn describe(event: &Event) {
    match event {
        Event::CursorMoved { cell } => println!("cursor moved to {:?}", (*cell).map(coords)),
        Event::CreaturePlaced { creature, position } => {
            println!("creature {} deployed at {:?}", creature.get(), coords(*position));
        }
        Event::CreatureStruck {
            attacker,
            target,
            damage,
            remaining_life_points,
        } => println!(
            "creature {} struck {} for {damage}, {remaining_life_points} life left",
            attacker.get(),
            target.get(),
        ),
        Event::HeadquartersRaided {
            raider,
            damage,
            remaining_life_points,
        } => println!(
            "creature {} raided the headquarters for {damage}, {remaining_life_points} life left",
            raider.get(),
        ),
        Event::CreatureFell {
            creature,
            position,
            card_recycled,
        } => println!(
            "creature {} fell at {:?}{}",
            creature.get(),
            coords(*position),
            if *card_recycled { ", card recycled" } else { "" },
        ),
        Event::CreatureMaterialized { creature, position } => {
            println!("creature {} appeared at {:?}", creature.get(), coords(*position));
        }
        Event::CreaturesReserved { turn, cells } => {
            println!("{} cells reserved for turn {turn}", cells.len());
        }
        Event::CardsDrawn { count } => println!("drew {count} cards"),
        Event::TurnEnded { turn } => println!("turn {turn} ended"),
        Event::BattleDecided { result } => println!("battle decided: {result:?}"),
    }
}

const fn coords(position: GridPosition) -> (u32, u32) {
    (position.y(), position.x())
}

fn demo_config(args: &Args, seed: u64) -> GameConfig {
    let player: Vec<Creature> = (0..6)
        .map(|id| Creature::recruit(CreatureId::new(id), GUARD, vec![BLAST]))
        .collect();
    let computer: Vec<Creature> = (100..106)
        .map(|id| Creature::recruit(CreatureId::new(id), STALKER, Vec::new()))
        .collect();

    let parties = vec![
        Party::new(
            FactionId::Player,
            player.iter().map(|creature| creature.id).collect(),
        ),
        Party::new(
            FactionId::Computer,
            computer.iter().map(|creature| creature.id).collect(),
        ),
    ];
    let appearances = vec![
        CreatureAppearance::new(0, vec![CreatureId::new(100), CreatureId::new(101)]),
        CreatureAppearance::new(2, vec![CreatureId::new(102), CreatureId::new(103)]),
        CreatureAppearance::new(4, vec![CreatureId::new(104), CreatureId::new(105)]),
    ];

    let mut creatures = player;
    creatures.extend(computer);

    GameConfig {
        rows: args.rows,
        columns: args.columns,
        jobs: vec![
            Job::new(GUARD, 6, 2, 4, 1, Reach::new(RangeShape::Circle, 1, 2), 1),
            Job::new(STALKER, 3, 1, 3, 2, Reach::new(RangeShape::Circle, 1, 1), 1),
        ],
        skills: vec![Skill::new(
            BLAST,
            SkillCategory::Attack,
            Reach::new(RangeShape::Circle, 0, 2),
            3,
        )],
        creatures,
        parties,
        appearances,
        headquarters_life_points: 10,
        action_points: 3,
        action_point_recovery: 1,
        seed,
    }
}
