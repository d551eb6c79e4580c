#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects attack targets deterministically from
//! battlefield views.
//!
//! The same selection pipeline serves normal attacks, attack skills, and
//! auto-attacks: enumerate positions within reach, keep enemy occupants,
//! order them by priority, and cap the result.

use cardfield_core::{CombatantView, CreatureId, Reach, Relationship};

/// Target selection system that reuses a scratch buffer across invocations.
#[derive(Debug, Default)]
pub struct Targeting {
    workspace: Vec<Candidate>,
}

impl Targeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the creatures `actor` may strike, in priority order.
    ///
    /// Candidates are living placed enemies within `reach` of the actor's
    /// cell; a creature already struck down this turn still occupies its
    /// cell but is no longer a target. Priority is deterministic: ascending
    /// placement order with undeployed creatures last, ties broken by
    /// ascending creature identifier. At most `cap` targets are returned;
    /// `None` leaves the list uncapped.
    ///
    /// An actor absent from the view has no cell to attack from, so the
    /// selection is empty.
    pub fn select(
        &mut self,
        view: &CombatantView,
        actor: CreatureId,
        reach: Reach,
        cap: Option<usize>,
    ) -> Vec<CreatureId> {
        let Some(origin) = view.get(actor).copied() else {
            return Vec::new();
        };

        self.workspace.clear();
        for candidate in view.iter() {
            if candidate.id == actor || candidate.life_points == 0 {
                continue;
            }
            if origin.faction.relationship(candidate.faction) != Relationship::Enemy {
                continue;
            }
            if !reach.covers(origin.position, candidate.position) {
                continue;
            }
            self.workspace.push(Candidate {
                id: candidate.id,
                placement_order: candidate.placement_order,
            });
        }

        self.workspace.sort_unstable_by_key(Candidate::priority_key);

        let mut targets: Vec<CreatureId> =
            self.workspace.iter().map(|candidate| candidate.id).collect();
        if let Some(cap) = cap {
            targets.truncate(cap);
        }
        targets
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Candidate {
    id: CreatureId,
    placement_order: Option<u32>,
}

impl Candidate {
    fn priority_key(&self) -> (bool, u32, CreatureId) {
        (
            self.placement_order.is_none(),
            self.placement_order.unwrap_or(0),
            self.id,
        )
    }
}
