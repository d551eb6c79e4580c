//! End-to-end battle scenarios driven through `apply` and `query`.

use cardfield_core::{
    BattleResult, Card, Command, Creature, CreatureAppearance, CreatureId, EngineError, Event,
    FactionId, GridPosition, Job, JobId, Party, RangeShape, Reach, Skill, SkillCategory, SkillId,
};
use cardfield_world::{apply, new_game, query, Game, GameConfig};

const PLAYER_JOB: JobId = JobId::new(0);
const COMPUTER_JOB: JobId = JobId::new(1);
const BLAST: SkillId = SkillId::new(0);

fn base_config(rows: u32, columns: u32) -> GameConfig {
    GameConfig {
        rows,
        columns,
        jobs: vec![
            Job::new(PLAYER_JOB, 5, 1, 3, 2, Reach::new(RangeShape::Circle, 1, 1), 1),
            Job::new(COMPUTER_JOB, 1, 1, 2, 3, Reach::new(RangeShape::Circle, 1, 1), 1),
        ],
        skills: vec![Skill::new(
            BLAST,
            SkillCategory::Attack,
            Reach::new(RangeShape::Circle, 0, 2),
            3,
        )],
        creatures: Vec::new(),
        parties: Vec::new(),
        appearances: Vec::new(),
        headquarters_life_points: 5,
        action_points: 3,
        action_point_recovery: 1,
        seed: 7,
    }
}

fn recruit(id: u32, job: JobId) -> Creature {
    Creature::recruit(CreatureId::new(id), job, vec![BLAST])
}

fn proceed(game: &Game) -> (Game, Vec<Event>) {
    let mut events = Vec::new();
    let next = apply(game, Command::ProceedTurn, &mut events).expect("turn resolves");
    (next, events)
}

fn unreserved_cell(game: &Game) -> GridPosition {
    query::battle_projection(game)
        .cells
        .iter()
        .find(|cell| cell.reservation.is_none() && cell.creature.is_none())
        .expect("a free cell exists")
        .position
}

fn reserved_cell(game: &Game) -> Option<GridPosition> {
    query::battle_projection(game)
        .cells
        .iter()
        .find(|cell| cell.reservation.is_some())
        .map(|cell| cell.position)
}

#[test]
fn opening_hand_and_placement_flow() {
    let mut config = base_config(2, 3);
    config.creatures = (0..6).map(|id| recruit(id, PLAYER_JOB)).collect();
    config.parties = vec![
        Party::new(FactionId::Player, (0..6).map(CreatureId::new).collect()),
        Party::new(FactionId::Computer, Vec::new()),
    ];
    let game = new_game(config).expect("game assembles");

    assert_eq!(query::hand_view(&game).len(), 5);
    assert_eq!(query::deck_view(&game), &[Card::Creature(CreatureId::new(5))]);
    assert_eq!(query::action_points(&game), 3);

    let position = GridPosition::new(1, 1);
    let mut events = Vec::new();
    let game = apply(
        &game,
        Command::PlaceCreature {
            creature: CreatureId::new(0),
            position,
        },
        &mut events,
    )
    .expect("placement applies");

    assert_eq!(
        events,
        vec![Event::CreaturePlaced {
            creature: CreatureId::new(0),
            position,
        }]
    );
    assert_eq!(query::action_points(&game), 2);
    assert_eq!(query::hand_view(&game).len(), 4);

    let view = query::combatant_view(&game);
    let placed = view.get(CreatureId::new(0)).expect("creature is placed");
    assert_eq!(placed.position, position);
    assert_eq!(placed.placement_order, Some(0));
    assert_eq!(placed.life_points, 5, "life restored to the job maximum");

    let mut events = Vec::new();
    let second = apply(
        &game,
        Command::PlaceCreature {
            creature: CreatureId::new(1),
            position,
        },
        &mut events,
    );
    assert_eq!(second.err(), Some(EngineError::CellOccupied { position }));
    assert!(events.is_empty(), "failed commands emit nothing");
}

#[test]
fn degenerate_battlefield_is_rejected() {
    let config = base_config(0, 5);
    assert_eq!(
        new_game(config).err(),
        Some(EngineError::InvalidBattlefield {
            rows: 0,
            columns: 5,
        })
    );
}

#[test]
fn cursor_selection_toggles() {
    let config = base_config(2, 2);
    let game = new_game(config).expect("game assembles");
    let position = GridPosition::new(0, 1);

    let mut events = Vec::new();
    let game = apply(&game, Command::SelectCell { position }, &mut events).expect("select");
    assert_eq!(query::cursor(&game), Some(position));
    assert_eq!(
        events,
        vec![Event::CursorMoved {
            cell: Some(position)
        }]
    );

    let mut events = Vec::new();
    let game = apply(&game, Command::SelectCell { position }, &mut events).expect("deselect");
    assert_eq!(query::cursor(&game), None);
    assert_eq!(events, vec![Event::CursorMoved { cell: None }]);

    let mut events = Vec::new();
    let result = apply(
        &game,
        Command::SelectCell {
            position: GridPosition::new(9, 9),
        },
        &mut events,
    );
    assert_eq!(result.err(), Some(EngineError::NotFound("battlefield cell")));
}

#[test]
fn auto_attack_clears_the_last_enemy_and_wins() {
    let mut config = base_config(1, 2);
    config.creatures = vec![recruit(0, PLAYER_JOB), recruit(1, COMPUTER_JOB)];
    config.parties = vec![
        Party::new(FactionId::Player, vec![CreatureId::new(0)]),
        Party::new(FactionId::Computer, vec![CreatureId::new(1)]),
    ];
    config.appearances = vec![CreatureAppearance::new(0, vec![CreatureId::new(1)])];
    let game = new_game(config).expect("game assembles");

    let enemy_cell = reserved_cell(&game).expect("the appearance reserved a cell");
    let player_cell = unreserved_cell(&game);
    assert_ne!(enemy_cell, player_cell);

    let mut events = Vec::new();
    let game = apply(
        &game,
        Command::PlaceCreature {
            creature: CreatureId::new(0),
            position: player_cell,
        },
        &mut events,
    )
    .expect("placement applies");

    let (game, events) = proceed(&game);
    assert_eq!(
        events,
        vec![
            Event::CreatureMaterialized {
                creature: CreatureId::new(1),
                position: enemy_cell,
            },
            Event::CreatureStruck {
                attacker: CreatureId::new(0),
                target: CreatureId::new(1),
                damage: 1,
                remaining_life_points: 0,
            },
            Event::CreatureFell {
                creature: CreatureId::new(1),
                position: enemy_cell,
                card_recycled: false,
            },
            Event::TurnEnded { turn: 0 },
            Event::BattleDecided {
                result: BattleResult::Victory,
            },
        ]
    );
    assert_eq!(query::result(&game), BattleResult::Victory);
    assert_eq!(query::turn(&game), 1);

    // A decided battle accepts no further progression.
    let (game, events) = proceed(&game);
    assert!(events.is_empty());
    assert_eq!(query::turn(&game), 1);

    let mut events = Vec::new();
    let game = apply(
        &game,
        Command::PlaceCreature {
            creature: CreatureId::new(0),
            position: player_cell,
        },
        &mut events,
    )
    .expect("guarded command still succeeds");
    assert!(events.is_empty());
    assert_eq!(query::result(&game), BattleResult::Victory);
}

#[test]
fn unblocked_raider_wears_down_the_headquarters() {
    let mut config = base_config(1, 1);
    config.creatures = vec![recruit(1, COMPUTER_JOB)];
    config.parties = vec![
        Party::new(FactionId::Player, Vec::new()),
        Party::new(FactionId::Computer, vec![CreatureId::new(1)]),
    ];
    config.appearances = vec![CreatureAppearance::new(0, vec![CreatureId::new(1)])];
    config.headquarters_life_points = 5;
    let game = new_game(config).expect("game assembles");

    // Turn 1: the raider materializes and starts charging.
    let (game, events) = proceed(&game);
    assert!(events.contains(&Event::CreatureMaterialized {
        creature: CreatureId::new(1),
        position: GridPosition::new(0, 0),
    }));
    assert_eq!(query::headquarters_life_points(&game), 5);

    // Turn 2: the charge reaches the raid interval and the raid fires.
    let (game, events) = proceed(&game);
    assert!(events.contains(&Event::HeadquartersRaided {
        raider: CreatureId::new(1),
        damage: 3,
        remaining_life_points: 2,
    }));
    assert_eq!(query::headquarters_life_points(&game), 2);
    assert_eq!(query::result(&game), BattleResult::Pending);

    // Two more turns: the second raid fells the headquarters.
    let (game, _) = proceed(&game);
    let (game, events) = proceed(&game);
    assert!(events.contains(&Event::HeadquartersRaided {
        raider: CreatureId::new(1),
        damage: 2,
        remaining_life_points: 0,
    }));
    assert!(events.contains(&Event::BattleDecided {
        result: BattleResult::Defeat,
    }));
    assert_eq!(query::result(&game), BattleResult::Defeat);
}

#[test]
fn pending_reservation_blocks_victory() {
    let mut config = base_config(2, 2);
    config.creatures = vec![recruit(1, COMPUTER_JOB)];
    config.parties = vec![
        Party::new(FactionId::Player, Vec::new()),
        Party::new(FactionId::Computer, vec![CreatureId::new(1)]),
    ];
    config.appearances = vec![CreatureAppearance::new(1, vec![CreatureId::new(1)])];
    let game = new_game(config).expect("game assembles");
    assert!(reserved_cell(&game).is_none(), "nothing scheduled for turn 0");

    let (game, events) = proceed(&game);
    let cell = reserved_cell(&game).expect("the wave reserved its cell");
    assert!(events.contains(&Event::CreaturesReserved {
        turn: 1,
        cells: vec![cell],
    }));
    assert_eq!(
        query::result(&game),
        BattleResult::Pending,
        "a reserved creature still counts as computer presence"
    );
}

#[test]
fn skill_invocation_fells_its_target_immediately() {
    let mut config = base_config(1, 2);
    config.jobs = vec![
        // Harmless player attacks so the enemy survives the auto-attack phase.
        Job::new(PLAYER_JOB, 5, 0, 3, 2, Reach::new(RangeShape::Circle, 1, 1), 1),
        Job::new(COMPUTER_JOB, 2, 1, 9, 1, Reach::new(RangeShape::Circle, 1, 1), 1),
    ];
    config.creatures = vec![recruit(0, PLAYER_JOB), recruit(1, COMPUTER_JOB)];
    config.parties = vec![
        Party::new(FactionId::Player, vec![CreatureId::new(0)]),
        Party::new(FactionId::Computer, vec![CreatureId::new(1)]),
    ];
    config.appearances = vec![CreatureAppearance::new(0, vec![CreatureId::new(1)])];
    let game = new_game(config).expect("game assembles");

    let enemy_cell = reserved_cell(&game).expect("the appearance reserved a cell");
    let player_cell = unreserved_cell(&game);
    let mut events = Vec::new();
    let game = apply(
        &game,
        Command::PlaceCreature {
            creature: CreatureId::new(0),
            position: player_cell,
        },
        &mut events,
    )
    .expect("placement applies");

    let (game, _) = proceed(&game);
    assert_eq!(query::result(&game), BattleResult::Pending);

    let mut events = Vec::new();
    let game = apply(
        &game,
        Command::InvokeSkill {
            actor: CreatureId::new(0),
            skill: BLAST,
        },
        &mut events,
    )
    .expect("skill applies");

    assert_eq!(
        events,
        vec![
            Event::CreatureStruck {
                attacker: CreatureId::new(0),
                target: CreatureId::new(1),
                damage: 2,
                remaining_life_points: 0,
            },
            Event::CreatureFell {
                creature: CreatureId::new(1),
                position: enemy_cell,
                card_recycled: false,
            },
        ]
    );

    // Victory is only evaluated at the end of a turn.
    assert_eq!(query::result(&game), BattleResult::Pending);
    let (game, _) = proceed(&game);
    assert_eq!(query::result(&game), BattleResult::Victory);
}

#[test]
fn projection_marks_reach_and_targets_around_the_selection() {
    let mut config = base_config(1, 2);
    config.jobs = vec![
        Job::new(PLAYER_JOB, 5, 0, 3, 2, Reach::new(RangeShape::Circle, 1, 1), 1),
        Job::new(COMPUTER_JOB, 2, 0, 9, 1, Reach::new(RangeShape::Circle, 1, 1), 1),
    ];
    config.creatures = vec![recruit(0, PLAYER_JOB), recruit(1, COMPUTER_JOB)];
    config.parties = vec![
        Party::new(FactionId::Player, vec![CreatureId::new(0)]),
        Party::new(FactionId::Computer, vec![CreatureId::new(1)]),
    ];
    config.appearances = vec![CreatureAppearance::new(0, vec![CreatureId::new(1)])];
    let game = new_game(config).expect("game assembles");

    let enemy_cell = reserved_cell(&game).expect("the appearance reserved a cell");
    let player_cell = unreserved_cell(&game);
    let mut events = Vec::new();
    let game = apply(
        &game,
        Command::PlaceCreature {
            creature: CreatureId::new(0),
            position: player_cell,
        },
        &mut events,
    )
    .expect("placement applies");
    let (game, _) = proceed(&game);

    let mut events = Vec::new();
    let game = apply(
        &game,
        Command::SelectCell {
            position: player_cell,
        },
        &mut events,
    )
    .expect("select");

    let projection = query::battle_projection(&game);
    let enemy = projection
        .cells
        .iter()
        .find(|cell| cell.position == enemy_cell)
        .expect("enemy cell projected");
    assert!(enemy.is_within_range);
    assert!(enemy.is_target);
    assert_eq!(enemy.target_priority, Some(0));

    let own = projection
        .cells
        .iter()
        .find(|cell| cell.position == player_cell)
        .expect("own cell projected");
    assert!(!own.is_within_range, "reach starts beyond the actor's cell");
    assert!(!own.is_target);

    // Clearing the selection clears every annotation.
    let mut events = Vec::new();
    let game = apply(
        &game,
        Command::SelectCell {
            position: player_cell,
        },
        &mut events,
    )
    .expect("deselect");
    let projection = query::battle_projection(&game);
    assert!(projection
        .cells
        .iter()
        .all(|cell| !cell.is_within_range && !cell.is_target));
}

#[test]
fn identical_seeds_replay_identical_reservations() {
    let build = || {
        let mut config = base_config(4, 4);
        config.creatures = vec![recruit(1, COMPUTER_JOB), recruit(2, COMPUTER_JOB)];
        config.parties = vec![
            Party::new(FactionId::Player, Vec::new()),
            Party::new(
                FactionId::Computer,
                vec![CreatureId::new(1), CreatureId::new(2)],
            ),
        ];
        config.appearances = vec![CreatureAppearance::new(
            0,
            vec![CreatureId::new(1), CreatureId::new(2)],
        )];
        config.seed = 42;
        new_game(config).expect("game assembles")
    };

    let first = build();
    let second = build();
    assert_eq!(
        query::battle_projection(&first),
        query::battle_projection(&second)
    );

    let (first, _) = proceed(&first);
    let (second, _) = proceed(&second);
    assert_eq!(
        query::battle_projection(&first),
        query::battle_projection(&second)
    );
}
