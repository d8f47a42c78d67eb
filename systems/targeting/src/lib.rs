#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target-selection policies and opponent queries.
//!
//! Candidates are always presented in row-major scan order of the cells they
//! occupy. Every policy breaks ties in favour of the earliest candidate in
//! that order, which keeps selection deterministic for a fixed random source.

use std::fmt;

use skirmish_core::{
    AgentId, AgentSnapshot, AgentView, CellCoord, Faction, OccupancyView, RandomSource, Strategy,
};

/// Chooses one opponent out of a candidate list.
pub trait TargetPolicy: fmt::Debug + Sync {
    /// Picks a target among `candidates` for an agent standing on `origin`.
    ///
    /// Returns `None` only when `candidates` is empty.
    fn select(
        &self,
        origin: CellCoord,
        candidates: &[AgentSnapshot],
        rng: &mut dyn RandomSource,
    ) -> Option<AgentId>;
}

/// Picks the opponent with the smallest Manhattan distance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Nearest;

/// Picks the opponent with the most remaining health.
#[derive(Clone, Copy, Debug, Default)]
pub struct Strongest;

/// Picks the opponent with the least remaining health.
#[derive(Clone, Copy, Debug, Default)]
pub struct Weakest;

/// Picks any opponent with equal probability.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformRandom;

impl TargetPolicy for Nearest {
    fn select(
        &self,
        origin: CellCoord,
        candidates: &[AgentSnapshot],
        _rng: &mut dyn RandomSource,
    ) -> Option<AgentId> {
        first_minimum(candidates, |candidate| {
            i64::from(origin.manhattan_distance(candidate.cell))
        })
    }
}

impl TargetPolicy for Strongest {
    fn select(
        &self,
        _origin: CellCoord,
        candidates: &[AgentSnapshot],
        _rng: &mut dyn RandomSource,
    ) -> Option<AgentId> {
        first_minimum(candidates, |candidate| -i64::from(candidate.health))
    }
}

impl TargetPolicy for Weakest {
    fn select(
        &self,
        _origin: CellCoord,
        candidates: &[AgentSnapshot],
        _rng: &mut dyn RandomSource,
    ) -> Option<AgentId> {
        first_minimum(candidates, |candidate| i64::from(candidate.health))
    }
}

impl TargetPolicy for UniformRandom {
    fn select(
        &self,
        _origin: CellCoord,
        candidates: &[AgentSnapshot],
        rng: &mut dyn RandomSource,
    ) -> Option<AgentId> {
        let last = u32::try_from(candidates.len().checked_sub(1)?).unwrap_or(u32::MAX);
        let index = usize::try_from(rng.uniform_int(0, last)).ok()?;
        candidates.get(index).map(|candidate| candidate.id)
    }
}

static NEAREST: Nearest = Nearest;
static STRONGEST: Strongest = Strongest;
static WEAKEST: Weakest = Weakest;
static UNIFORM_RANDOM: UniformRandom = UniformRandom;

/// Policy an agent of `faction` uses when configured with `strategy`.
///
/// Players always target the nearest opponent.
#[must_use]
pub fn policy_for(faction: Faction, strategy: Strategy) -> &'static dyn TargetPolicy {
    match (faction, strategy) {
        (Faction::Player, _) | (Faction::Enemy, Strategy::Nearest) => &NEAREST,
        (Faction::Enemy, Strategy::Strongest) => &STRONGEST,
        (Faction::Enemy, Strategy::Weakest) => &WEAKEST,
        (Faction::Enemy, Strategy::Uniform) => &UNIFORM_RANDOM,
    }
}

/// Living agents opposing `faction`, in row-major scan order of their cells.
#[must_use]
pub fn opponents_of(
    faction: Faction,
    agents: &AgentView,
    occupancy: OccupancyView<'_>,
) -> Vec<AgentSnapshot> {
    let opponent = faction.opponent();
    occupancy
        .occupied()
        .filter_map(|(_, id)| agents.get(id))
        .filter(|agent| agent.faction == opponent && agent.is_alive())
        .copied()
        .collect()
}

/// Opponents within `range` of `origin`, keeping scan order.
#[must_use]
pub fn engageable(
    origin: CellCoord,
    range: u32,
    opponents: &[AgentSnapshot],
) -> Vec<AgentSnapshot> {
    opponents
        .iter()
        .filter(|agent| origin.manhattan_distance(agent.cell) <= range)
        .copied()
        .collect()
}

fn first_minimum<F>(candidates: &[AgentSnapshot], key: F) -> Option<AgentId>
where
    F: Fn(&AgentSnapshot) -> i64,
{
    let mut best: Option<(i64, AgentId)> = None;
    for candidate in candidates {
        let score = key(candidate);
        match best {
            Some((best_score, _)) if best_score <= score => {}
            _ => best = Some((score, candidate.id)),
        }
    }
    best.map(|(_, id)| id)
}
