#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat resolvers: normal attacks, attack skills, auto-attacks, and
//! headquarters raids.
//!
//! Every resolver consumes immutable inputs and returns a [`CombatOutcome`]
//! carrying the updated roster; damage is always routed through the life
//! clamp so no strike can push a creature outside its bounds.

use cardfield_core::{
    Board, CombatantView, Creature, CreatureId, EngineError, JobTable, Party, Reach, RangeShape,
    SkillCategory, SkillId, SkillTable, find_party,
};
use cardfield_system_targeting::Targeting;

/// Reach of a normal attack: the four adjacent cells.
pub const NORMAL_ATTACK_REACH: Reach = Reach::new(RangeShape::Circle, 1, 1);

/// Single application of damage recorded for event emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strike {
    /// Creature that dealt the damage.
    pub attacker: CreatureId,
    /// Creature that received the damage.
    pub target: CreatureId,
    /// Life points actually removed, after clamping.
    pub damage: u32,
    /// Target life points remaining after the strike.
    pub remaining_life_points: u32,
}

/// Result of a combat resolution: the new roster and the strikes applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatOutcome {
    /// Updated roster; untouched creatures are carried over unchanged.
    pub creatures: Vec<Creature>,
    /// Strikes applied, in targeting priority order.
    pub strikes: Vec<Strike>,
}

/// Resolves a normal attack: adjacency reach, a single target, damage equal
/// to the attacker's attack power.
///
/// Fails with [`EngineError::NotFound`] if the attacker is absent from the
/// roster or not placed on the board. An attack with no enemy in reach
/// returns the roster unchanged.
pub fn invoke_normal_attack(
    actor: CreatureId,
    creatures: &[Creature],
    parties: &[Party],
    jobs: &JobTable,
    board: &Board,
) -> Result<CombatOutcome, EngineError> {
    let attacker = find_creature(creatures, actor)?;
    require_placed(board, parties, actor)?;

    let damage = attacker.attack_power(jobs)?;
    let view = CombatantView::collect(creatures, parties, board);
    let targets = Targeting::new().select(&view, actor, NORMAL_ATTACK_REACH, Some(1));
    apply_strikes(actor, &targets, damage, creatures, jobs)
}

/// Resolves a skill invocation.
///
/// Only skills in the attack category are invokable; anything else fails
/// with [`EngineError::InvalidSkillCategory`]. Reach and damage come from
/// the skill definition and the target count is uncapped.
pub fn invoke_skill(
    actor: CreatureId,
    skill: SkillId,
    creatures: &[Creature],
    parties: &[Party],
    jobs: &JobTable,
    skills: &SkillTable,
    board: &Board,
) -> Result<CombatOutcome, EngineError> {
    let definition = skills.get(skill).ok_or(EngineError::NotFound("skill"))?;
    if definition.category() != SkillCategory::Attack {
        return Err(EngineError::InvalidSkillCategory { skill });
    }

    let _ = find_creature(creatures, actor)?;
    require_placed(board, parties, actor)?;

    let view = CombatantView::collect(creatures, parties, board);
    let targets = Targeting::new().select(&view, actor, definition.reach(), None);
    apply_strikes(actor, &targets, definition.damage(), creatures, jobs)
}

/// Resolves an automatic attack using the actor's job reach and target cap.
///
/// Fails with [`EngineError::AlreadyActedThisTurn`] if the actor's flag is
/// already set. The flag is set only when at least one target existed; a
/// call that finds nothing in reach leaves the actor untouched.
pub fn invoke_auto_attack(
    actor: CreatureId,
    creatures: &[Creature],
    parties: &[Party],
    jobs: &JobTable,
    board: &Board,
) -> Result<CombatOutcome, EngineError> {
    let attacker = find_creature(creatures, actor)?;
    if attacker.auto_attack_invoked {
        return Err(EngineError::AlreadyActedThisTurn { creature: actor });
    }
    require_placed(board, parties, actor)?;

    let job = jobs.get(attacker.job).ok_or(EngineError::NotFound("job"))?;
    let cap = usize::try_from(job.auto_attack_targets()).unwrap_or(usize::MAX);
    let damage = attacker.attack_power(jobs)?;

    let view = CombatantView::collect(creatures, parties, board);
    let targets = Targeting::new().select(&view, actor, job.auto_attack_reach(), Some(cap));
    if targets.is_empty() {
        return Ok(CombatOutcome {
            creatures: creatures.to_vec(),
            strikes: Vec::new(),
        });
    }

    let mut outcome = apply_strikes(actor, &targets, damage, creatures, jobs)?;
    if let Some(attacker) = outcome
        .creatures
        .iter_mut()
        .find(|creature| creature.id == actor)
    {
        attacker.auto_attack_invoked = true;
    }
    Ok(outcome)
}

/// Resolves a raid: direct damage against the headquarters life pool.
///
/// There is no targeting step and no range check; the raider is assumed to
/// have reached the headquarters. Returns the remaining life points,
/// saturating at zero.
pub fn invoke_raid(
    raider: &Creature,
    jobs: &JobTable,
    headquarters_life_points: u32,
) -> Result<u32, EngineError> {
    let power = raider.raid_power(jobs)?;
    Ok(headquarters_life_points.saturating_sub(power))
}

fn find_creature(creatures: &[Creature], id: CreatureId) -> Result<&Creature, EngineError> {
    creatures
        .iter()
        .find(|creature| creature.id == id)
        .ok_or(EngineError::NotFound("creature"))
}

fn require_placed(
    board: &Board,
    parties: &[Party],
    actor: CreatureId,
) -> Result<(), EngineError> {
    if board.position_of(actor).is_none() {
        return Err(EngineError::NotFound("battlefield placement"));
    }
    if find_party(parties, actor).is_none() {
        return Err(EngineError::NotFound("party"));
    }
    Ok(())
}

fn apply_strikes(
    attacker: CreatureId,
    targets: &[CreatureId],
    damage: u32,
    creatures: &[Creature],
    jobs: &JobTable,
) -> Result<CombatOutcome, EngineError> {
    let mut roster = creatures.to_vec();
    let mut strikes = Vec::with_capacity(targets.len());

    for target in targets {
        let index = roster
            .iter()
            .position(|creature| creature.id == *target)
            .ok_or(EngineError::NotFound("creature"))?;
        let before = roster[index].life_points;
        let struck = roster[index].alter_life_points(jobs, -i64::from(damage))?;
        strikes.push(Strike {
            attacker,
            target: *target,
            damage: before.saturating_sub(struck.life_points),
            remaining_life_points: struck.life_points,
        });
        roster[index] = struck;
    }

    Ok(CombatOutcome {
        creatures: roster,
        strikes,
    })
}
