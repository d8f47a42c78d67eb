#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Skirmish.
//!
//! The world owns the occupancy grid, every agent record, the initiative
//! order, and the round counter. All mutations go through [`apply`], which
//! validates the command, performs the change atomically, and reports what
//! happened as [`Event`] values. Invalid commands never panic; they leave the
//! world untouched and emit a rejection event instead.

mod setup;

use skirmish_core::{
    AgentId, AgentSnapshot, AttackResolution, Cell, CellCoord, CombatProfile, Command, Event,
    Faction, FactionCounts, Loadout, RandomSource, RejectionReason, ScenarioConfig, SetupError,
    Strategy,
};
use tracing::debug;

/// Represents the authoritative Grid Skirmish world state.
#[derive(Debug)]
pub struct World {
    agents: Vec<Agent>,
    occupancy: OccupancyGrid,
    turn_order: Vec<AgentId>,
    next_agent_id: u32,
    round: u32,
}

impl World {
    /// Creates an empty battlefield with the provided dimensions.
    pub fn new(rows: u32, columns: u32) -> Result<Self, SetupError> {
        if rows == 0 || columns == 0 {
            return Err(SetupError::EmptyGrid { rows, columns });
        }

        Ok(Self {
            agents: Vec::new(),
            occupancy: OccupancyGrid::new(rows, columns),
            turn_order: Vec::new(),
            next_agent_id: 0,
            round: 0,
        })
    }

    /// Builds a populated battlefield for the provided scenario.
    ///
    /// Agents are placed on uniformly random empty cells and the turn order is
    /// shuffled once ("rolled initiative"). Every placement is reported through
    /// `out_events`.
    pub fn from_scenario<R: RandomSource + ?Sized>(
        config: &ScenarioConfig,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let mut world = Self::new(config.rows, config.columns)?;
        setup::populate(&mut world, config, rng, out_events)?;
        Ok(world)
    }

    fn agent_index(&self, agent: AgentId) -> Option<usize> {
        self.agents
            .binary_search_by_key(&agent, |candidate| candidate.id)
            .ok()
    }

    fn living_counts(&self) -> FactionCounts {
        self.agents
            .iter()
            .filter(|agent| agent.is_alive())
            .fold(FactionCounts::default(), |counts, agent| {
                counts.with(agent.faction)
            })
    }

    fn spawn(
        &mut self,
        faction: Faction,
        loadout: Loadout,
        strategy: Strategy,
        cell: CellCoord,
        health: i32,
        out_events: &mut Vec<Event>,
    ) {
        if !self.occupancy.contains(cell) {
            out_events.push(Event::SpawnRejected {
                cell,
                reason: RejectionReason::OutOfBounds,
            });
            return;
        }

        if !self.occupancy.can_enter(cell) {
            out_events.push(Event::SpawnRejected {
                cell,
                reason: RejectionReason::CellOccupied,
            });
            return;
        }

        if health <= 0 {
            out_events.push(Event::SpawnRejected {
                cell,
                reason: RejectionReason::ActorDown,
            });
            return;
        }

        let id = AgentId::new(self.next_agent_id);
        self.next_agent_id = self.next_agent_id.saturating_add(1);

        let strategy = match faction {
            Faction::Player => Strategy::Nearest,
            Faction::Enemy => strategy,
        };

        self.agents.push(Agent {
            id,
            faction,
            loadout,
            strategy,
            cell,
            health,
            max_health: health,
            profile: CombatProfile::for_agent(faction, loadout),
        });
        self.occupancy.occupy(id, cell);
        self.turn_order.push(id);
        out_events.push(Event::AgentSpawned {
            agent: id,
            faction,
            cell,
        });
    }

    fn move_agent(
        &mut self,
        agent: AgentId,
        path: &[CellCoord],
        dash: bool,
    ) -> Result<Option<Event>, RejectionReason> {
        let index = self
            .agent_index(agent)
            .ok_or(RejectionReason::UnknownAgent)?;
        let mover = &self.agents[index];
        if !mover.is_alive() {
            return Err(RejectionReason::ActorDown);
        }

        let Some(destination) = path.last().copied() else {
            return Ok(None);
        };

        let allowance = if dash {
            mover.profile.speed.saturating_mul(2)
        } else {
            mover.profile.speed
        };
        let steps = u32::try_from(path.len()).unwrap_or(u32::MAX);
        if steps > allowance {
            return Err(RejectionReason::SpeedExceeded);
        }

        let from = mover.cell;
        let mut previous = from;
        for &step in path {
            if !self.occupancy.contains(step) {
                return Err(RejectionReason::OutOfBounds);
            }
            if previous.manhattan_distance(step) != 1 {
                return Err(RejectionReason::NotAdjacent);
            }
            if !self.occupancy.can_enter(step) {
                return Err(RejectionReason::CellOccupied);
            }
            previous = step;
        }

        self.occupancy.relocate(agent, from, destination);
        self.agents[index].cell = destination;
        debug!(agent = %agent, %from, to = %destination, steps, dash, "agent moved");

        Ok(Some(Event::AgentMoved {
            agent,
            from,
            to: destination,
            steps,
        }))
    }

    fn apply_attack(
        &mut self,
        attacker: AgentId,
        defender: AgentId,
        resolution: AttackResolution,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        let attacker_index = self
            .agent_index(attacker)
            .ok_or(RejectionReason::UnknownAgent)?;
        let defender_index = self
            .agent_index(defender)
            .ok_or(RejectionReason::UnknownAgent)?;

        let attacking = &self.agents[attacker_index];
        let defending = &self.agents[defender_index];
        if !attacking.is_alive() {
            return Err(RejectionReason::ActorDown);
        }
        if !defending.is_alive() {
            return Err(RejectionReason::DefenderDown);
        }
        if attacking.faction == defending.faction {
            return Err(RejectionReason::SameFaction);
        }

        let target = &mut self.agents[defender_index];
        if resolution.hit {
            target.health = target.health.saturating_sub(resolution.damage.max(0));
        }
        let defender_health = target.health;
        let cell = target.cell;
        debug!(
            attacker = %attacker,
            defender = %defender,
            roll = resolution.raw_roll,
            total = resolution.attack_total,
            hit = resolution.hit,
            critical = resolution.critical,
            damage = resolution.damage,
            defender_health,
            "attack resolved"
        );

        out_events.push(Event::AttackResolved {
            attacker,
            defender,
            resolution,
            defender_health,
        });

        if defender_health <= 0 {
            self.occupancy.vacate_if(defender, cell);
            debug!(agent = %defender, %cell, "agent defeated");
            out_events.push(Event::AgentDefeated {
                agent: defender,
                cell,
            });
        }

        Ok(())
    }

    fn complete_round(&mut self, out_events: &mut Vec<Event>) {
        let defeated: Vec<AgentId> = self
            .turn_order
            .iter()
            .copied()
            .filter(|id| {
                self.agent_index(*id)
                    .map_or(true, |index| !self.agents[index].is_alive())
            })
            .collect();

        for agent in &defeated {
            if let Some(index) = self.agent_index(*agent) {
                let removed = self.agents.remove(index);
                self.occupancy.vacate_if(removed.id, removed.cell);
            }
            out_events.push(Event::AgentRemoved { agent: *agent });
        }
        self.turn_order.retain(|id| !defeated.contains(id));

        out_events.push(Event::RoundCompleted {
            round: self.round,
            living: self.living_counts(),
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnAgent {
            faction,
            loadout,
            strategy,
            cell,
            health,
        } => world.spawn(faction, loadout, strategy, cell, health, out_events),
        Command::BeginRound => {
            world.round = world.round.saturating_add(1);
            out_events.push(Event::RoundStarted { round: world.round });
        }
        Command::MoveAgent { agent, path, dash } => match world.move_agent(agent, &path, dash) {
            Ok(Some(event)) => out_events.push(event),
            Ok(None) => {}
            Err(reason) => {
                debug!(agent = %agent, %reason, "move rejected");
                out_events.push(Event::MoveRejected { agent, reason });
            }
        },
        Command::ApplyAttack {
            attacker,
            defender,
            resolution,
        } => {
            if let Err(reason) = world.apply_attack(attacker, defender, resolution, out_events) {
                debug!(attacker = %attacker, defender = %defender, %reason, "attack rejected");
                out_events.push(Event::AttackRejected {
                    attacker,
                    defender,
                    reason,
                });
            }
        }
        Command::CompleteRound => world.complete_round(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use skirmish_core::{
        AgentId, AgentSnapshot, AgentView, FactionCounts, GridSnapshot, OccupancyView,
    };

    /// Captures a read-only view of every agent still tracked by the world.
    ///
    /// Agents that fell during the current round remain visible, with
    /// non-positive health, until the round completes.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(world.agents.iter().map(super::Agent::snapshot).collect())
    }

    /// Captures the snapshot of a single agent.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        world
            .agent_index(agent)
            .map(|index| world.agents[index].snapshot())
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        let (rows, columns) = world.occupancy.dimensions();
        OccupancyView::new(world.occupancy.cells(), rows, columns)
    }

    /// Captures the per-cell picture consumed by renderers.
    #[must_use]
    pub fn grid_snapshot(world: &World) -> GridSnapshot {
        let (rows, columns) = world.occupancy.dimensions();
        let cells = world
            .occupancy
            .cells()
            .iter()
            .map(|cell| cell.occupant().and_then(|id| agent(world, id)))
            .collect();
        GridSnapshot::new(rows, columns, cells)
    }

    /// Counts living agents on each side.
    #[must_use]
    pub fn faction_counts(world: &World) -> FactionCounts {
        world.living_counts()
    }

    /// Current initiative order.
    #[must_use]
    pub fn turn_order(world: &World) -> &[AgentId] {
        &world.turn_order
    }

    /// Index of the most recently started round, zero before the first.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Grid dimensions as `(rows, columns)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.occupancy.dimensions()
    }
}

#[derive(Clone, Debug)]
struct Agent {
    id: AgentId,
    faction: Faction,
    loadout: Loadout,
    strategy: Strategy,
    cell: CellCoord,
    health: i32,
    max_health: i32,
    profile: CombatProfile,
}

impl Agent {
    fn is_alive(&self) -> bool {
        self.health > 0
    }

    fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            faction: self.faction,
            loadout: self.loadout,
            strategy: self.strategy,
            cell: self.cell,
            health: self.health,
            max_health: self.max_health,
            profile: self.profile,
        }
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    rows: u32,
    columns: u32,
    cells: Vec<Cell>,
}

impl OccupancyGrid {
    fn new(rows: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(rows) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            cells: vec![Cell::Empty; capacity],
        }
    }

    fn contains(&self, cell: CellCoord) -> bool {
        cell.row() < self.rows && cell.column() < self.columns
    }

    fn can_enter(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .map_or(false, |slot| *slot == Cell::Empty)
    }

    fn occupy(&mut self, agent: AgentId, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = Cell::Occupied(agent);
        }
    }

    fn vacate_if(&mut self, agent: AgentId, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            if *slot == Cell::Occupied(agent) {
                *slot = Cell::Empty;
            }
        }
    }

    fn relocate(&mut self, agent: AgentId, from: CellCoord, to: CellCoord) {
        self.vacate_if(agent, from);
        self.occupy(agent, to);
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }
}
