#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cardfield battle engine.
//!
//! This crate defines the data model that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired transitions, the world applies those commands through
//! its `apply` entry point and produces a new immutable state plus [`Event`]
//! values, and systems consume read-only views to compute targeting, combat,
//! card, and victory outcomes deterministically.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cards the player's hand is refilled to at the end of each turn.
pub const HAND_CAPACITY: usize = 5;

/// Unique identifier assigned to a creature for the lifetime of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(u32);

impl CreatureId {
    /// Creates a new creature identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of an immutable job template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(u32);

impl JobId {
    /// Creates a new job identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a skill definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillId(u32);

impl SkillId {
    /// Creates a new skill identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Allegiance of a party and every creature belonging to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactionId {
    /// The human-controlled faction defending the headquarters.
    Player,
    /// The machine-controlled faction assaulting the headquarters.
    Computer,
}

impl FactionId {
    /// Classifies the relationship between two factions.
    ///
    /// The classification is pure, total, and symmetric: two equal factions
    /// are allies, anything else is an enemy.
    #[must_use]
    pub const fn relationship(self, other: FactionId) -> Relationship {
        match (self, other) {
            (FactionId::Player, FactionId::Player) | (FactionId::Computer, FactionId::Computer) => {
                Relationship::Ally
            }
            _ => Relationship::Enemy,
        }
    }
}

/// Result of classifying two factions against each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relationship {
    /// Both creatures share a faction.
    Ally,
    /// The creatures belong to opposing factions.
    Enemy,
}

/// Named group of creature identifiers sharing a faction.
///
/// A creature belongs to exactly one party for the lifetime of a game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Party {
    faction: FactionId,
    members: Vec<CreatureId>,
}

impl Party {
    /// Creates a new party with the provided faction and members.
    #[must_use]
    pub fn new(faction: FactionId, members: Vec<CreatureId>) -> Self {
        Self { faction, members }
    }

    /// Faction every member of the party belongs to.
    #[must_use]
    pub const fn faction(&self) -> FactionId {
        self.faction
    }

    /// Creatures enrolled in the party.
    #[must_use]
    pub fn members(&self) -> &[CreatureId] {
        &self.members
    }

    /// Reports whether the creature is enrolled in this party.
    #[must_use]
    pub fn contains(&self, creature: CreatureId) -> bool {
        self.members.contains(&creature)
    }
}

/// Locates the party a creature is enrolled in, if any.
///
/// Identifiers are generated internally, so an absent id is a programming
/// error; callers convert `None` into [`EngineError::NotFound`].
#[must_use]
pub fn find_party(parties: &[Party], creature: CreatureId) -> Option<&Party> {
    parties.iter().find(|party| party.contains(creature))
}

/// Location of a single battlefield cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    y: u32,
    x: u32,
}

impl GridPosition {
    /// Creates a new grid position from a row (`y`) and column (`x`) index.
    #[must_use]
    pub const fn new(y: u32, x: u32) -> Self {
        Self { y, x }
    }

    /// Zero-based row index of the position.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Zero-based column index of the position.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPosition) -> u32 {
        self.y.abs_diff(other.y) + self.x.abs_diff(other.x)
    }
}

/// Geometric shape of a reach predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeShape {
    /// Every position within the distance bounds (a Manhattan disc).
    Circle,
    /// Positions sharing the origin's row or column, distance-bounded.
    Cross,
}

/// Distance-bounded range predicate combining a shape with min/max reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reach {
    shape: RangeShape,
    min: u32,
    max: u32,
}

impl Reach {
    /// Creates a new reach predicate with inclusive distance bounds.
    #[must_use]
    pub const fn new(shape: RangeShape, min: u32, max: u32) -> Self {
        Self { shape, min, max }
    }

    /// Reports whether `position` lies within reach of `origin`.
    #[must_use]
    pub fn covers(&self, origin: GridPosition, position: GridPosition) -> bool {
        let distance = origin.manhattan_distance(position);
        if distance < self.min || distance > self.max {
            return false;
        }

        match self.shape {
            RangeShape::Circle => true,
            RangeShape::Cross => origin.y() == position.y() || origin.x() == position.x(),
        }
    }
}

/// Single battlefield cell: a position plus optional occupant and reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    position: GridPosition,
    occupant: Option<CreatureId>,
    reservation: Option<CreatureId>,
}

impl Cell {
    const fn vacant(position: GridPosition) -> Self {
        Self {
            position,
            occupant: None,
            reservation: None,
        }
    }

    /// Position the cell occupies within its board.
    #[must_use]
    pub const fn position(&self) -> GridPosition {
        self.position
    }

    /// Creature currently standing on the cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<CreatureId> {
        self.occupant
    }

    /// Creature scheduled to materialize on the cell, if any.
    #[must_use]
    pub const fn reservation(&self) -> Option<CreatureId> {
        self.reservation
    }
}

/// Rectangular battlefield grid.
///
/// Every update is copy-on-write: the board hands back a new value and never
/// mutates in place, preserving the engine's immutable-snapshot contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: u32,
    columns: u32,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates a fresh board with every cell vacant and positions pre-computed.
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(rows) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for y in 0..rows {
            for x in 0..columns {
                cells.push(Cell::vacant(GridPosition::new(y, x)));
            }
        }
        Self {
            rows,
            columns,
            cells,
        }
    }

    /// Number of rows contained in the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns contained in the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Verifies the board is a well-formed rectangle.
    ///
    /// A board with zero rows or zero columns is invalid, and every stored
    /// cell position must match its row-major index.
    #[must_use]
    pub fn validate(&self) -> bool {
        if self.rows == 0 || self.columns == 0 {
            return false;
        }

        let expected = u64::from(self.rows) * u64::from(self.columns);
        if u64::try_from(self.cells.len()) != Ok(expected) {
            return false;
        }

        self.cells.iter().enumerate().all(|(index, cell)| {
            let y = index as u64 / u64::from(self.columns);
            let x = index as u64 % u64::from(self.columns);
            u64::from(cell.position.y()) == y && u64::from(cell.position.x()) == x
        })
    }

    /// Returns the cell at the provided position, if it lies on the board.
    #[must_use]
    pub fn cell(&self, position: GridPosition) -> Option<&Cell> {
        self.index(position).map(|index| &self.cells[index])
    }

    /// Returns the creature occupying the provided position, if any.
    #[must_use]
    pub fn occupant(&self, position: GridPosition) -> Option<CreatureId> {
        self.cell(position).and_then(Cell::occupant)
    }

    /// Returns the creature reserved for the provided position, if any.
    #[must_use]
    pub fn reservation(&self, position: GridPosition) -> Option<CreatureId> {
        self.cell(position).and_then(Cell::reservation)
    }

    /// Locates the cell a creature currently occupies.
    ///
    /// A creature occupies at most one cell at a time, so the first match is
    /// the only match.
    #[must_use]
    pub fn position_of(&self, creature: CreatureId) -> Option<GridPosition> {
        self.cells
            .iter()
            .find(|cell| cell.occupant == Some(creature))
            .map(Cell::position)
    }

    /// Every position covered by `reach` relative to `origin`, in row-major
    /// order. Positions off the board are never produced.
    #[must_use]
    pub fn positions_within(&self, origin: GridPosition, reach: Reach) -> Vec<GridPosition> {
        self.cells
            .iter()
            .map(Cell::position)
            .filter(|position| reach.covers(origin, *position))
            .collect()
    }

    /// Positions that hold neither an occupant nor a reservation.
    #[must_use]
    pub fn vacant_unreserved_positions(&self) -> Vec<GridPosition> {
        self.cells
            .iter()
            .filter(|cell| cell.occupant.is_none() && cell.reservation.is_none())
            .map(Cell::position)
            .collect()
    }

    /// Returns a new board with the occupant of `position` replaced.
    ///
    /// Positions off the board leave the returned board identical to `self`.
    #[must_use]
    pub fn with_occupant(&self, position: GridPosition, occupant: Option<CreatureId>) -> Self {
        let mut board = self.clone();
        if let Some(index) = board.index(position) {
            board.cells[index].occupant = occupant;
        }
        board
    }

    /// Returns a new board with the reservation of `position` replaced.
    ///
    /// Positions off the board leave the returned board identical to `self`.
    #[must_use]
    pub fn with_reservation(
        &self,
        position: GridPosition,
        reservation: Option<CreatureId>,
    ) -> Self {
        let mut board = self.clone();
        if let Some(index) = board.index(position) {
            board.cells[index].reservation = reservation;
        }
        board
    }

    fn index(&self, position: GridPosition) -> Option<usize> {
        if position.y() < self.rows && position.x() < self.columns {
            let row = usize::try_from(position.y()).ok()?;
            let column = usize::try_from(position.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable job template resolving the stats shared by its creatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    max_life_points: u32,
    attack_power: u32,
    raid_interval: u32,
    raid_power: u32,
    auto_attack_reach: Reach,
    auto_attack_targets: u32,
}

impl Job {
    /// Creates a new job template with explicit stats.
    #[must_use]
    pub const fn new(
        id: JobId,
        max_life_points: u32,
        attack_power: u32,
        raid_interval: u32,
        raid_power: u32,
        auto_attack_reach: Reach,
        auto_attack_targets: u32,
    ) -> Self {
        Self {
            id,
            max_life_points,
            attack_power,
            raid_interval,
            raid_power,
            auto_attack_reach,
            auto_attack_targets,
        }
    }

    /// Identifier creatures use to reference the template.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Upper bound for the life points of creatures holding the job.
    #[must_use]
    pub const fn max_life_points(&self) -> u32 {
        self.max_life_points
    }

    /// Damage dealt by normal and automatic attacks.
    #[must_use]
    pub const fn attack_power(&self) -> u32 {
        self.attack_power
    }

    /// Raid charge required before a raid against the headquarters fires.
    #[must_use]
    pub const fn raid_interval(&self) -> u32 {
        self.raid_interval
    }

    /// Damage a raid inflicts on the headquarters.
    #[must_use]
    pub const fn raid_power(&self) -> u32 {
        self.raid_power
    }

    /// Reach predicate used when the creature attacks automatically.
    #[must_use]
    pub const fn auto_attack_reach(&self) -> Reach {
        self.auto_attack_reach
    }

    /// Maximum number of simultaneous auto-attack targets.
    #[must_use]
    pub const fn auto_attack_targets(&self) -> u32 {
        self.auto_attack_targets
    }
}

/// Lookup table of job templates keyed by identifier.
#[derive(Clone, Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    /// Creates a table from the provided job templates.
    #[must_use]
    pub fn from_jobs(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    /// Retrieves the job registered under `id`, if any.
    #[must_use]
    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }
}

/// Per-creature stat overrides consulted before the job table.
///
/// This is a test-only escape hatch: production rosters leave both fields
/// unset and resolve every stat through the creature's job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatOverrides {
    /// Replaces the job's maximum life points when set.
    pub max_life_points: Option<u32>,
    /// Replaces the job's attack power when set.
    pub attack_power: Option<u32>,
}

impl StatOverrides {
    /// Overrides leaving every stat resolved through the job table.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_life_points: None,
            attack_power: None,
        }
    }
}

/// A creature standing on, or deployable onto, the battlefield.
///
/// Creatures are plain values: combat resolvers derive updated copies and
/// never mutate a creature pulled out of a collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Creature {
    /// Identity of the creature, stable for the lifetime of a game.
    pub id: CreatureId,
    /// Job template the creature's stats resolve through.
    pub job: JobId,
    /// Current life points, kept within bounds by [`Creature::alter_life_points`].
    pub life_points: u32,
    /// Accumulated readiness toward a raid against the headquarters.
    pub raid_charge: u32,
    /// Skills the creature may invoke.
    pub skills: Vec<SkillId>,
    /// Set once the creature auto-attacked this turn; reset at turn start.
    pub auto_attack_invoked: bool,
    /// Monotonic counter assigned at deployment; `None` until placed.
    pub placement_order: Option<u32>,
    /// Test-only stat overrides consulted before the job table.
    pub overrides: StatOverrides,
}

impl Creature {
    /// Creates an undeployed creature with zero life points.
    ///
    /// Game initialization restores life to the job maximum; creatures are
    /// never created mid-game.
    #[must_use]
    pub fn recruit(id: CreatureId, job: JobId, skills: Vec<SkillId>) -> Self {
        Self {
            id,
            job,
            life_points: 0,
            raid_charge: 0,
            skills,
            auto_attack_invoked: false,
            placement_order: None,
            overrides: StatOverrides::none(),
        }
    }

    /// Resolves the creature's attack power, override first.
    pub fn attack_power(&self, jobs: &JobTable) -> Result<u32, EngineError> {
        if let Some(power) = self.overrides.attack_power {
            return Ok(power);
        }
        Ok(self.resolve_job(jobs)?.attack_power())
    }

    /// Resolves the creature's maximum life points, override first.
    pub fn max_life_points(&self, jobs: &JobTable) -> Result<u32, EngineError> {
        if let Some(max) = self.overrides.max_life_points {
            return Ok(max);
        }
        Ok(self.resolve_job(jobs)?.max_life_points())
    }

    /// Resolves the creature's auto-attack reach from its job.
    pub fn auto_attack_reach(&self, jobs: &JobTable) -> Result<Reach, EngineError> {
        Ok(self.resolve_job(jobs)?.auto_attack_reach())
    }

    /// Resolves the creature's raid power from its job.
    pub fn raid_power(&self, jobs: &JobTable) -> Result<u32, EngineError> {
        Ok(self.resolve_job(jobs)?.raid_power())
    }

    /// Returns a copy whose life points moved by `delta`, clamped to the
    /// inclusive range from zero to the creature's maximum.
    ///
    /// This is the sole authority for life changes; every combat resolver
    /// routes damage and healing through it.
    pub fn alter_life_points(&self, jobs: &JobTable, delta: i64) -> Result<Creature, EngineError> {
        let max = i64::from(self.max_life_points(jobs)?);
        let altered = i64::from(self.life_points)
            .saturating_add(delta)
            .clamp(0, max);
        let mut creature = self.clone();
        creature.life_points = altered as u32;
        Ok(creature)
    }

    /// Reports whether the creature has fallen.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.life_points == 0
    }

    fn resolve_job<'a>(&self, jobs: &'a JobTable) -> Result<&'a Job, EngineError> {
        jobs.get(self.job).ok_or(EngineError::NotFound("job"))
    }
}

/// Effect classification of a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    /// Damages every enemy within the skill's reach.
    Attack,
    /// Reserved for non-offensive effects; not yet invokable.
    Support,
}

/// Immutable skill definition carrying its own reach and damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Skill {
    id: SkillId,
    category: SkillCategory,
    reach: Reach,
    damage: u32,
}

impl Skill {
    /// Creates a new skill definition.
    #[must_use]
    pub const fn new(id: SkillId, category: SkillCategory, reach: Reach, damage: u32) -> Self {
        Self {
            id,
            category,
            reach,
            damage,
        }
    }

    /// Identifier creatures use to reference the skill.
    #[must_use]
    pub const fn id(&self) -> SkillId {
        self.id
    }

    /// Effect classification deciding how the skill resolves.
    #[must_use]
    pub const fn category(&self) -> SkillCategory {
        self.category
    }

    /// Reach predicate limiting the affected cells.
    #[must_use]
    pub const fn reach(&self) -> Reach {
        self.reach
    }

    /// Damage applied to each target of an attack skill.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }
}

/// Lookup table of skill definitions keyed by identifier.
#[derive(Clone, Debug, Default)]
pub struct SkillTable {
    skills: Vec<Skill>,
}

impl SkillTable {
    /// Creates a table from the provided skill definitions.
    #[must_use]
    pub fn from_skills(skills: Vec<Skill>) -> Self {
        Self { skills }
    }

    /// Retrieves the skill registered under `id`, if any.
    #[must_use]
    pub fn get(&self, id: SkillId) -> Option<&Skill> {
        self.skills.iter().find(|skill| skill.id == id)
    }
}

/// Deployable card held in the deck or hand.
///
/// The discriminant is explicit so card processing is matched exhaustively
/// rather than inferred from field presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Card {
    /// Deploys the referenced creature onto the battlefield.
    Creature(CreatureId),
    /// Invokes the referenced skill.
    Skill(SkillId),
}

/// The player-facing card piles: the deck drawn from and the playable hand.
///
/// Together with the creatures placed on the field, the creature cards in
/// both piles partition the player roster with no duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardPiles {
    deck: Vec<Card>,
    hand: Vec<Card>,
}

impl CardPiles {
    /// Creates card piles from explicit deck and hand contents.
    #[must_use]
    pub fn new(deck: Vec<Card>, hand: Vec<Card>) -> Self {
        Self { deck, hand }
    }

    /// Cards remaining in the deck, front first.
    #[must_use]
    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    /// Cards currently playable from the hand.
    #[must_use]
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }
}

/// Computer-side creatures scheduled to reserve cells on a given turn.
///
/// An appearance entry is consumed once for its turn number and never
/// replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatureAppearance {
    turn: u32,
    creatures: Vec<CreatureId>,
}

impl CreatureAppearance {
    /// Creates an appearance entry for the provided turn.
    #[must_use]
    pub fn new(turn: u32, creatures: Vec<CreatureId>) -> Self {
        Self { turn, creatures }
    }

    /// Turn number on which the creatures reserve their cells.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Creatures scheduled by this entry.
    #[must_use]
    pub fn creatures(&self) -> &[CreatureId] {
        &self.creatures
    }
}

/// Outcome of the battle as evaluated after each turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleResult {
    /// The battle continues.
    Pending,
    /// The player cleared every wave and computer presence.
    Victory,
    /// The headquarters fell.
    Defeat,
}

impl BattleResult {
    /// Reports whether the battle reached a terminal result.
    ///
    /// A decided battle accepts no further turn progression.
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        !matches!(self, BattleResult::Pending)
    }
}

/// Immutable description of a placed creature used by targeting and queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// Identity of the placed creature.
    pub id: CreatureId,
    /// Faction the creature fights for.
    pub faction: FactionId,
    /// Cell the creature occupies.
    pub position: GridPosition,
    /// Deployment counter used to break targeting ties.
    pub placement_order: Option<u32>,
    /// Current life points.
    pub life_points: u32,
}

/// Read-only view of every creature standing on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct CombatantView {
    snapshots: Vec<CombatantSnapshot>,
}

impl CombatantView {
    /// Creates a view from the provided snapshots, sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CombatantSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Captures a view of every creature currently occupying a board cell.
    ///
    /// Creatures without a board position or party are not combatants and do
    /// not appear in the view.
    #[must_use]
    pub fn collect(creatures: &[Creature], parties: &[Party], board: &Board) -> Self {
        let snapshots = creatures
            .iter()
            .filter_map(|creature| {
                let position = board.position_of(creature.id)?;
                let party = find_party(parties, creature.id)?;
                Some(CombatantSnapshot {
                    id: creature.id,
                    faction: party.faction(),
                    position,
                    placement_order: creature.placement_order,
                    life_points: creature.life_points,
                })
            })
            .collect();
        Self::from_snapshots(snapshots)
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CombatantSnapshot> {
        self.snapshots.iter()
    }

    /// Retrieves the snapshot captured for `creature`, if it is placed.
    #[must_use]
    pub fn get(&self, creature: CreatureId) -> Option<&CombatantSnapshot> {
        self.snapshots
            .binary_search_by_key(&creature, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

}

/// Commands the external interface may submit to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Toggles the cursor: selecting the current cell deselects it.
    SelectCell {
        /// Cell the player pointed at.
        position: GridPosition,
    },
    /// Deploys a player creature from the hand onto a vacant cell.
    PlaceCreature {
        /// Creature whose card must be in hand.
        creature: CreatureId,
        /// Destination cell for the deployment.
        position: GridPosition,
    },
    /// Invokes a skill from a placed creature.
    InvokeSkill {
        /// Creature invoking the skill.
        actor: CreatureId,
        /// Skill definition to resolve.
        skill: SkillId,
    },
    /// Advances the battle by one full turn cycle.
    ProceedTurn,
}

/// Events describing what a successfully applied command changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The cursor moved to a new cell or was cleared.
    CursorMoved {
        /// Selected cell after the command, if any.
        cell: Option<GridPosition>,
    },
    /// A player creature was deployed from the hand.
    CreaturePlaced {
        /// Creature that entered the battlefield.
        creature: CreatureId,
        /// Cell the creature now occupies.
        position: GridPosition,
    },
    /// A creature took damage from an attack or skill.
    CreatureStruck {
        /// Creature dealing the damage.
        attacker: CreatureId,
        /// Creature receiving the damage.
        target: CreatureId,
        /// Life points removed, after clamping.
        damage: u32,
        /// Target life points remaining after the strike.
        remaining_life_points: u32,
    },
    /// A raider damaged the headquarters directly.
    HeadquartersRaided {
        /// Creature that raided.
        raider: CreatureId,
        /// Damage dealt to the headquarters.
        damage: u32,
        /// Headquarters life points remaining after the raid.
        remaining_life_points: u32,
    },
    /// A dead creature was cleared from the battlefield.
    CreatureFell {
        /// Creature that fell.
        creature: CreatureId,
        /// Cell the creature was cleared from.
        position: GridPosition,
        /// Whether the creature's card returned to the player deck.
        card_recycled: bool,
    },
    /// A previously reserved creature materialized onto its cell.
    CreatureMaterialized {
        /// Creature that appeared.
        creature: CreatureId,
        /// Cell the creature now occupies.
        position: GridPosition,
    },
    /// Computer creatures reserved cells for a future turn.
    CreaturesReserved {
        /// Turn number whose appearance entry was consumed.
        turn: u32,
        /// Cells that now carry reservations.
        cells: Vec<GridPosition>,
    },
    /// Cards moved from the deck head to the hand tail.
    CardsDrawn {
        /// Number of cards drawn.
        count: usize,
    },
    /// A full turn cycle resolved.
    TurnEnded {
        /// Turn number that just resolved.
        turn: u32,
    },
    /// The battle reached a terminal result.
    BattleDecided {
        /// Result the battle concluded with.
        result: BattleResult,
    },
}

/// Failures surfaced synchronously by engine operations.
///
/// Each failure is a precondition violation: the operation returns the error
/// immediately, nothing is retried, and the caller retains the prior state
/// unchanged.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// An internally generated identifier resolved to nothing.
    #[error("no {0} found for the given identifier")]
    NotFound(&'static str),
    /// The destination cell already holds a creature.
    #[error("cell ({y}, {x}) is already occupied", y = .position.y(), x = .position.x())]
    CellOccupied {
        /// Cell that rejected the placement.
        position: GridPosition,
    },
    /// The hand holds no card for the requested creature.
    #[error("creature {id} has no card in hand", id = .creature.get())]
    CardNotInHand {
        /// Creature whose card was requested.
        creature: CreatureId,
    },
    /// The hand exceeds its capacity, so a refill cannot proceed.
    #[error("hand holds {holding} cards, exceeding the capacity of {capacity}")]
    HandOverflow {
        /// Number of cards currently in hand.
        holding: usize,
        /// Configured hand capacity.
        capacity: usize,
    },
    /// Fewer eligible cells exist than creatures to reserve.
    #[error("{required} vacant cells required but only {available} available")]
    InsufficientSpace {
        /// Cells the reservation needed.
        required: usize,
        /// Eligible cells actually available.
        available: usize,
    },
    /// The creature already auto-attacked this turn.
    #[error("creature {id} already acted this turn", id = .creature.get())]
    AlreadyActedThisTurn {
        /// Creature whose flag was already set.
        creature: CreatureId,
    },
    /// The skill's category cannot be invoked as an attack.
    #[error("skill {id} cannot be invoked as an attack", id = .skill.get())]
    InvalidSkillCategory {
        /// Skill whose category was rejected.
        skill: SkillId,
    },
    /// The configured dimensions cannot form a playable battlefield.
    #[error("a {rows}x{columns} battlefield is not playable")]
    InvalidBattlefield {
        /// Configured row count.
        rows: u32,
        /// Configured column count.
        columns: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn jobs_with(max_life_points: u32, attack_power: u32) -> JobTable {
        JobTable::from_jobs(vec![Job::new(
            JobId::new(0),
            max_life_points,
            attack_power,
            3,
            2,
            Reach::new(RangeShape::Circle, 1, 1),
            1,
        )])
    }

    #[test]
    fn manhattan_distance_is_symmetric_and_zero_on_identity() {
        let a = GridPosition::new(1, 4);
        let b = GridPosition::new(3, 1);
        assert_eq!(a.manhattan_distance(b), 5);
        assert_eq!(b.manhattan_distance(a), 5);
        assert_eq!(a.manhattan_distance(a), 0);
    }

    #[test]
    fn manhattan_distance_satisfies_triangle_inequality() {
        let a = GridPosition::new(0, 0);
        let b = GridPosition::new(2, 5);
        let c = GridPosition::new(4, 1);
        assert!(a.manhattan_distance(c) <= a.manhattan_distance(b) + b.manhattan_distance(c));
    }

    #[test]
    fn circle_reach_is_distance_bounded() {
        let reach = Reach::new(RangeShape::Circle, 1, 2);
        let origin = GridPosition::new(2, 2);
        assert!(!reach.covers(origin, origin), "origin below minimum reach");
        assert!(reach.covers(origin, GridPosition::new(2, 3)));
        assert!(reach.covers(origin, GridPosition::new(3, 3)));
        assert!(!reach.covers(origin, GridPosition::new(4, 3)));
    }

    #[test]
    fn cross_reach_requires_shared_row_or_column() {
        let reach = Reach::new(RangeShape::Cross, 1, 2);
        let origin = GridPosition::new(2, 2);
        assert!(reach.covers(origin, GridPosition::new(2, 4)));
        assert!(reach.covers(origin, GridPosition::new(0, 2)));
        assert!(!reach.covers(origin, GridPosition::new(3, 3)), "diagonal");
        assert!(!reach.covers(origin, GridPosition::new(2, 5)), "too far");
    }

    #[test]
    fn board_cells_match_their_indices() {
        let board = Board::new(3, 4);
        assert!(board.validate());
        for (index, cell) in board.cells().iter().enumerate() {
            assert_eq!(cell.position().y() as usize, index / 4);
            assert_eq!(cell.position().x() as usize, index % 4);
        }
    }

    #[test]
    fn degenerate_boards_are_invalid() {
        assert!(!Board::new(0, 0).validate());
        assert!(!Board::new(1, 0).validate());
        assert!(!Board::new(0, 3).validate());
        assert!(Board::new(1, 1).validate());
    }

    #[test]
    fn positions_within_enumerates_the_covered_cells() {
        let board = Board::new(3, 3);
        let origin = GridPosition::new(1, 1);

        let disc = board.positions_within(origin, Reach::new(RangeShape::Circle, 0, 1));
        assert_eq!(
            disc,
            vec![
                GridPosition::new(0, 1),
                GridPosition::new(1, 0),
                GridPosition::new(1, 1),
                GridPosition::new(1, 2),
                GridPosition::new(2, 1),
            ],
            "a zero minimum includes the origin"
        );

        let plus = board.positions_within(origin, Reach::new(RangeShape::Cross, 1, 2));
        assert_eq!(
            plus,
            vec![
                GridPosition::new(0, 1),
                GridPosition::new(1, 0),
                GridPosition::new(1, 2),
                GridPosition::new(2, 1),
            ],
            "diagonals are outside a plus-shaped reach"
        );
    }

    #[test]
    fn positions_within_never_leaves_the_board() {
        let board = Board::new(2, 2);
        let reached =
            board.positions_within(GridPosition::new(0, 0), Reach::new(RangeShape::Circle, 0, 9));
        assert_eq!(reached.len(), 4, "only on-board cells are enumerated");
    }

    #[test]
    fn occupant_updates_are_copy_on_write() {
        let board = Board::new(2, 2);
        let creature = CreatureId::new(7);
        let occupied = board.with_occupant(GridPosition::new(1, 0), Some(creature));

        assert_eq!(board.occupant(GridPosition::new(1, 0)), None);
        assert_eq!(occupied.occupant(GridPosition::new(1, 0)), Some(creature));
        assert_eq!(
            occupied.position_of(creature),
            Some(GridPosition::new(1, 0))
        );
    }

    #[test]
    fn out_of_bounds_updates_leave_the_board_unchanged() {
        let board = Board::new(2, 2);
        let updated = board.with_occupant(GridPosition::new(5, 5), Some(CreatureId::new(1)));
        assert_eq!(board, updated);
    }

    #[test]
    fn alter_life_points_clamps_extreme_deltas() {
        let jobs = jobs_with(10, 1);
        let mut creature = Creature::recruit(CreatureId::new(0), JobId::new(0), Vec::new());
        creature.life_points = 4;

        let drained = creature.alter_life_points(&jobs, i64::MIN).expect("job");
        assert_eq!(drained.life_points, 0);
        assert!(drained.is_dead());

        let overfilled = creature.alter_life_points(&jobs, i64::MAX).expect("job");
        assert_eq!(overfilled.life_points, 10);
    }

    #[test]
    fn overrides_take_precedence_over_the_job_table() {
        let jobs = jobs_with(10, 1);
        let mut creature = Creature::recruit(CreatureId::new(0), JobId::new(0), Vec::new());
        creature.overrides.max_life_points = Some(3);
        creature.overrides.attack_power = Some(9);

        assert_eq!(creature.max_life_points(&jobs).expect("job"), 3);
        assert_eq!(creature.attack_power(&jobs).expect("job"), 9);

        let healed = creature.alter_life_points(&jobs, 100).expect("job");
        assert_eq!(healed.life_points, 3, "clamp honors the override");
    }

    #[test]
    fn unknown_job_is_reported_as_not_found() {
        let jobs = JobTable::default();
        let creature = Creature::recruit(CreatureId::new(0), JobId::new(9), Vec::new());
        assert_eq!(
            creature.attack_power(&jobs),
            Err(EngineError::NotFound("job"))
        );
    }

    #[test]
    fn faction_relationship_is_symmetric() {
        assert_eq!(
            FactionId::Player.relationship(FactionId::Computer),
            Relationship::Enemy
        );
        assert_eq!(
            FactionId::Computer.relationship(FactionId::Player),
            Relationship::Enemy
        );
        assert_eq!(
            FactionId::Player.relationship(FactionId::Player),
            Relationship::Ally
        );
    }

    #[test]
    fn find_party_reports_membership() {
        let parties = vec![
            Party::new(FactionId::Player, vec![CreatureId::new(0)]),
            Party::new(FactionId::Computer, vec![CreatureId::new(1)]),
        ];
        let party = find_party(&parties, CreatureId::new(1)).expect("member");
        assert_eq!(party.faction(), FactionId::Computer);
        assert!(find_party(&parties, CreatureId::new(9)).is_none());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: serde::Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn wire_types_round_trip_through_bincode() {
        assert_round_trip(&CreatureId::new(42));
        assert_round_trip(&GridPosition::new(3, 9));
        assert_round_trip(&Card::Creature(CreatureId::new(5)));
        assert_round_trip(&BattleResult::Victory);
    }
}
