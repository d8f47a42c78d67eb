#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable views of the
//! battlefield and describe the mutations they want as [`Command`] values. The
//! world executes those commands through its `apply` entry point and broadcasts
//! [`Event`] values that schedulers, reporting layers, and renderers fold into
//! their own state.

mod config;
mod random;

pub use config::{LoadoutPlan, ParseStrategyError, ScenarioConfig, SetupError};
pub use random::{roll_die, shuffle, RandomSource, ScriptedRandom, SeededRandom};

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Sides of the attack die rolled for every attack.
pub const ATTACK_DIE: u32 = 20;

/// Natural attack roll that always hits and doubles the damage die.
pub const CRITICAL_ROLL: u32 = 20;

/// Flat damage and attack modifier shared by every agent.
pub const STRENGTH: i32 = 4;

/// Grid steps an agent may take in a single turn.
pub const SPEED: u32 = 6;

/// Armor class of player agents.
pub const PLAYER_ARMOR_CLASS: i32 = 14;

/// Armor class of enemy agents.
pub const ENEMY_ARMOR_CLASS: i32 = 10;

/// Attack roll bonus granted to player agents.
pub const PLAYER_PROFICIENCY_BONUS: i32 = 2;

/// Lower bound of the starting health range.
pub const MIN_STARTING_HEALTH: i32 = 30;

/// Upper bound of the starting health range for players.
pub const MAX_PLAYER_HEALTH: i32 = 60;

/// Unique identifier assigned to an agent for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
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

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two opposing sides of a skirmish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// Adventurers controlled by the simulation's protagonists.
    Player,
    /// Monsters opposing the players.
    Enemy,
}

impl Faction {
    /// Returns the faction this one is allowed to attack.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.row().abs_diff(other.row()) + self.column().abs_diff(other.column())
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Weapon style carried by an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loadout {
    /// Close-quarters weapon with a large damage die.
    Melee,
    /// Bow or sling that trades damage for reach.
    Ranged,
}

impl Loadout {
    /// Sides of the damage die rolled on a hit.
    #[must_use]
    pub const fn damage_die(self) -> u32 {
        match self {
            Self::Melee => 8,
            Self::Ranged => 4,
        }
    }

    /// Maximum Manhattan distance at which an attack can be made.
    #[must_use]
    pub const fn attack_range(self) -> u32 {
        match self {
            Self::Melee => 1,
            Self::Ranged => 12,
        }
    }

    /// Distance band the agent closes to before it stops moving.
    ///
    /// Melee agents want to stand next to their target. Ranged agents stop one
    /// cell inside their maximum reach.
    #[must_use]
    pub const fn ideal_range(self) -> u32 {
        match self {
            Self::Melee => 1,
            Self::Ranged => self.attack_range() - 1,
        }
    }
}

/// Target-selection policy used by enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Pick the opponent with the smallest Manhattan distance.
    Nearest,
    /// Pick the opponent with the most remaining health.
    Strongest,
    /// Pick the opponent with the least remaining health.
    Weakest,
    /// Pick any opponent uniformly at random.
    Uniform,
}

impl Strategy {
    /// Every strategy in a stable order, used by parameter sweeps.
    pub const ALL: [Strategy; 4] = [
        Strategy::Nearest,
        Strategy::Strongest,
        Strategy::Weakest,
        Strategy::Uniform,
    ];

    /// Lowercase name used in configuration files and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Strongest => "strongest",
            Self::Weakest => "weakest",
            Self::Uniform => "uniform",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "strongest" => Ok(Self::Strongest),
            "weakest" => Ok(Self::Weakest),
            "uniform" | "random" => Ok(Self::Uniform),
            _ => Err(ParseStrategyError::new(value)),
        }
    }
}

/// Combat statistics derived from an agent's faction and loadout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatProfile {
    /// Defense threshold an attack roll must meet or exceed.
    pub armor_class: i32,
    /// Flat modifier added to both attack and damage rolls.
    pub strength: i32,
    /// Additional modifier added to attack rolls.
    pub proficiency_bonus: i32,
    /// Sides of the damage die.
    pub damage_die: u32,
    /// Maximum Manhattan distance of an attack.
    pub attack_range: u32,
    /// Maximum grid steps per turn.
    pub speed: u32,
}

impl CombatProfile {
    /// Builds the canonical profile for the provided faction and loadout.
    #[must_use]
    pub const fn for_agent(faction: Faction, loadout: Loadout) -> Self {
        let (armor_class, proficiency_bonus) = match faction {
            Faction::Player => (PLAYER_ARMOR_CLASS, PLAYER_PROFICIENCY_BONUS),
            Faction::Enemy => (ENEMY_ARMOR_CLASS, 0),
        };

        Self {
            armor_class,
            strength: STRENGTH,
            proficiency_bonus,
            damage_die: loadout.damage_die(),
            attack_range: loadout.attack_range(),
            speed: SPEED,
        }
    }
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Side the agent fights for.
    pub faction: Faction,
    /// Weapon style carried by the agent.
    pub loadout: Loadout,
    /// Target-selection policy; players always use [`Strategy::Nearest`].
    pub strategy: Strategy,
    /// Grid cell the agent occupies, or occupied before it fell.
    pub cell: CellCoord,
    /// Remaining health; the agent is down once this reaches zero.
    pub health: i32,
    /// Health the agent started the skirmish with.
    pub max_health: i32,
    /// Combat statistics of the agent.
    pub profile: CombatProfile,
}

impl AgentSnapshot {
    /// Reports whether the agent can still act and be targeted.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Read-only snapshot describing every agent known to the world.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of the provided agent.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    /// No agent stands in the cell.
    #[default]
    Empty,
    /// The identified agent stands in the cell.
    Occupied(AgentId),
}

impl Cell {
    /// Returns the occupying agent, if any.
    #[must_use]
    pub const fn occupant(self) -> Option<AgentId> {
        match self {
            Self::Empty => None,
            Self::Occupied(agent) => Some(agent),
        }
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Cell],
    rows: u32,
    columns: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major cells.
    ///
    /// Coordinates whose row-major index falls past the end of `cells` are
    /// treated as out of bounds.
    #[must_use]
    pub fn new(cells: &'a [Cell], rows: u32, columns: u32) -> Self {
        Self {
            cells,
            rows,
            columns,
        }
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row() < self.rows && cell.column() < self.columns
    }

    /// Returns the contents of the cell, or `None` when it lies out of bounds.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<Cell> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Returns the agent occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<AgentId> {
        self.cell(cell).and_then(Cell::occupant)
    }

    /// Reports whether the cell lies inside the grid and is empty.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        matches!(self.cell(cell), Some(Cell::Empty))
    }

    /// Iterator over occupied cells in row-major scan order.
    pub fn occupied(&self) -> impl Iterator<Item = (CellCoord, AgentId)> + 'a {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, cell)| {
                let agent = cell.occupant()?;
                let index = u32::try_from(index).ok()?;
                Some((CellCoord::new(index / columns, index % columns), agent))
            })
    }

    /// Cardinal neighbours of a cell that lie inside the grid.
    ///
    /// Neighbours are always yielded up, down, left, right.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let rows = self.rows;
        let columns = self.columns;
        let candidates = [
            cell.row()
                .checked_sub(1)
                .map(|row| CellCoord::new(row, cell.column())),
            cell.row()
                .checked_add(1)
                .filter(|row| *row < rows)
                .map(|row| CellCoord::new(row, cell.column())),
            cell.column()
                .checked_sub(1)
                .map(|column| CellCoord::new(cell.row(), column)),
            cell.column()
                .checked_add(1)
                .filter(|column| *column < columns)
                .map(|column| CellCoord::new(cell.row(), column)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(move |neighbor| neighbor.row() < rows && neighbor.column() < columns)
    }

    /// Provides the dimensions of the grid as `(rows, columns)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    /// Row-major index of the cell, or `None` when it lies out of bounds.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?
            .checked_add(column)
            .filter(|&index| index < self.cells.len())
    }
}

/// Read-only picture of the battlefield consumed by renderers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    rows: u32,
    columns: u32,
    cells: Vec<Option<AgentSnapshot>>,
}

impl GridSnapshot {
    /// Creates a snapshot from row-major cell contents.
    ///
    /// Missing trailing cells are treated as empty.
    #[must_use]
    pub fn new(rows: u32, columns: u32, mut cells: Vec<Option<AgentSnapshot>>) -> Self {
        let expected = usize::try_from(u64::from(rows) * u64::from(columns)).unwrap_or(0);
        cells.resize(expected, None);
        Self {
            rows,
            columns,
            cells,
        }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Agent standing in the provided cell, if any.
    #[must_use]
    pub fn agent_at(&self, cell: CellCoord) -> Option<&AgentSnapshot> {
        if cell.row() >= self.rows || cell.column() >= self.columns {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        self.cells.get(row * width + column)?.as_ref()
    }

    /// Iterator over grid rows, each a slice of optional agents.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Option<AgentSnapshot>]> {
        let width = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.cells.chunks(width)
    }

    /// Counts living agents per faction visible in the snapshot.
    #[must_use]
    pub fn counts(&self) -> FactionCounts {
        self.cells
            .iter()
            .flatten()
            .filter(|agent| agent.is_alive())
            .fold(FactionCounts::default(), |counts, agent| {
                counts.with(agent.faction)
            })
    }
}

/// Number of living agents on each side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionCounts {
    /// Living player agents.
    pub players: u32,
    /// Living enemy agents.
    pub enemies: u32,
}

impl FactionCounts {
    /// Returns a copy with one more agent counted for the faction.
    #[must_use]
    pub const fn with(self, faction: Faction) -> Self {
        match faction {
            Faction::Player => Self {
                players: self.players + 1,
                enemies: self.enemies,
            },
            Faction::Enemy => Self {
                players: self.players,
                enemies: self.enemies + 1,
            },
        }
    }

    /// Reports whether both sides still have someone standing.
    #[must_use]
    pub const fn is_contested(&self) -> bool {
        self.players > 0 && self.enemies > 0
    }

    /// The sole surviving faction, if exactly one side is left.
    #[must_use]
    pub const fn victor(&self) -> Option<Faction> {
        match (self.players > 0, self.enemies > 0) {
            (true, false) => Some(Faction::Player),
            (false, true) => Some(Faction::Enemy),
            _ => None,
        }
    }
}

/// Dice results and verdict of a single attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackResolution {
    /// Natural value shown on the attack die.
    pub raw_roll: u32,
    /// Attack roll after strength and proficiency were added.
    pub attack_total: i32,
    /// Whether the attack connected.
    pub hit: bool,
    /// Whether the attack was a natural critical.
    pub critical: bool,
    /// Natural value shown on the damage die, zero on a miss.
    pub damage_roll: u32,
    /// Damage inflicted on the defender, zero on a miss.
    pub damage: i32,
}

impl AttackResolution {
    /// Resolution describing an attack that failed to connect.
    #[must_use]
    pub const fn miss(raw_roll: u32, attack_total: i32) -> Self {
        Self {
            raw_roll,
            attack_total,
            hit: false,
            critical: false,
            damage_roll: 0,
            damage: 0,
        }
    }
}

/// Reasons the world may refuse an attack or a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// No agent with the provided identifier exists.
    UnknownAgent,
    /// The acting agent is already down, or would enter play without health.
    ActorDown,
    /// The attacked agent is already down.
    DefenderDown,
    /// Attacker and defender fight for the same faction.
    SameFaction,
    /// A coordinate lies outside the grid.
    OutOfBounds,
    /// A cell on the path is held by another agent.
    CellOccupied,
    /// Two consecutive path cells are not cardinal neighbours.
    NotAdjacent,
    /// The path is longer than the agent may travel this turn.
    SpeedExceeded,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownAgent => "unknown agent",
            Self::ActorDown => "actor is down",
            Self::DefenderDown => "defender is down",
            Self::SameFaction => "same faction",
            Self::OutOfBounds => "out of bounds",
            Self::CellOccupied => "cell occupied",
            Self::NotAdjacent => "path not contiguous",
            Self::SpeedExceeded => "speed exceeded",
        };
        f.write_str(text)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Places a new agent onto an empty cell and appends it to the turn order.
    SpawnAgent {
        /// Side the agent fights for.
        faction: Faction,
        /// Weapon style carried by the agent.
        loadout: Loadout,
        /// Target-selection policy, ignored for players.
        strategy: Strategy,
        /// Cell the agent should occupy.
        cell: CellCoord,
        /// Starting health.
        health: i32,
    },
    /// Marks the beginning of a new round.
    BeginRound,
    /// Walks an agent along a path of cardinal steps in one atomic move.
    MoveAgent {
        /// Agent that moves.
        agent: AgentId,
        /// Cells visited after the origin, ending at the destination.
        path: Vec<CellCoord>,
        /// Whether the agent spends its action to double its speed.
        dash: bool,
    },
    /// Applies a resolved attack to the defender.
    ApplyAttack {
        /// Agent making the attack.
        attacker: AgentId,
        /// Agent receiving the attack.
        defender: AgentId,
        /// Dice results computed by the combat resolver.
        resolution: AttackResolution,
    },
    /// Removes defeated agents from the turn order and closes the round.
    CompleteRound,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that an agent entered the battlefield.
    AgentSpawned {
        /// Identifier allocated to the agent.
        agent: AgentId,
        /// Side the agent fights for.
        faction: Faction,
        /// Cell the agent occupies.
        cell: CellCoord,
    },
    /// Reports that a spawn request was refused.
    SpawnRejected {
        /// Cell provided in the spawn request.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: RejectionReason,
    },
    /// Announces that a new round started.
    RoundStarted {
        /// One-based index of the round.
        round: u32,
    },
    /// Confirms that an agent moved between two cells.
    AgentMoved {
        /// Agent that moved.
        agent: AgentId,
        /// Cell the agent left.
        from: CellCoord,
        /// Cell the agent now occupies.
        to: CellCoord,
        /// Number of grid steps taken.
        steps: u32,
    },
    /// Reports that a move request was refused.
    MoveRejected {
        /// Agent whose move was refused.
        agent: AgentId,
        /// Specific reason the move failed.
        reason: RejectionReason,
    },
    /// Confirms that an attack was rolled against a defender.
    AttackResolved {
        /// Agent making the attack.
        attacker: AgentId,
        /// Agent receiving the attack.
        defender: AgentId,
        /// Dice results of the attack.
        resolution: AttackResolution,
        /// Defender health after the attack was applied.
        defender_health: i32,
    },
    /// Reports that an attack request was refused.
    AttackRejected {
        /// Agent making the attack.
        attacker: AgentId,
        /// Agent that would have received the attack.
        defender: AgentId,
        /// Specific reason the attack failed.
        reason: RejectionReason,
    },
    /// Announces that an agent's health dropped to zero and its cell was cleared.
    AgentDefeated {
        /// Agent that fell.
        agent: AgentId,
        /// Cell the agent occupied.
        cell: CellCoord,
    },
    /// Confirms that a defeated agent left the turn order.
    AgentRemoved {
        /// Agent removed from play.
        agent: AgentId,
    },
    /// Announces that a round finished.
    RoundCompleted {
        /// One-based index of the round.
        round: u32,
        /// Living agents after the defeated were removed.
        living: FactionCounts,
    },
}

/// Damage exchanged by a single agent during its turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Damage this agent dealt.
    pub damage_dealt: u32,
    /// Damage this agent received during its own action; always zero because
    /// damage arrives on other agents' turns.
    pub damage_received: u32,
    /// Whether the agent rolled an attack.
    pub attacked: bool,
    /// Whether the attack connected.
    pub hit: bool,
}

/// Aggregate statistics of one round, reported from the players' side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundReport {
    /// One-based index of the round.
    pub round: u32,
    /// Damage dealt by players to enemies.
    pub damage_dealt: u32,
    /// Damage received by players from enemies.
    pub damage_received: u32,
    /// Attacks rolled by either side.
    pub attacks: u32,
    /// Attacks that connected.
    pub hits: u32,
    /// Living agents at the end of the round.
    pub living: FactionCounts,
}

#[cfg(test)]
mod tests {
    use super::{
        AgentId, Cell, CellCoord, CombatProfile, Faction, FactionCounts, Loadout, LoadoutPlan,
        OccupancyView, RoundReport, ScenarioConfig, Strategy,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(3, 4);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn profiles_follow_faction_and_loadout() {
        let player = CombatProfile::for_agent(Faction::Player, Loadout::Ranged);
        assert_eq!(player.armor_class, 14);
        assert_eq!(player.proficiency_bonus, 2);
        assert_eq!(player.damage_die, 4);
        assert_eq!(player.attack_range, 12);
        assert_eq!(player.speed, 6);

        let enemy = CombatProfile::for_agent(Faction::Enemy, Loadout::Melee);
        assert_eq!(enemy.armor_class, 10);
        assert_eq!(enemy.proficiency_bonus, 0);
        assert_eq!(enemy.strength, 4);
        assert_eq!(enemy.damage_die, 8);
        assert_eq!(enemy.attack_range, 1);
    }

    #[test]
    fn ranged_agents_stop_inside_their_reach() {
        assert_eq!(Loadout::Melee.ideal_range(), 1);
        assert_eq!(Loadout::Ranged.ideal_range(), 11);
    }

    #[test]
    fn strategies_parse_case_insensitively() {
        assert_eq!("Weakest".parse::<Strategy>(), Ok(Strategy::Weakest));
        assert_eq!(" random ".parse::<Strategy>(), Ok(Strategy::Uniform));
        assert!("bravest".parse::<Strategy>().is_err());
    }

    #[test]
    fn occupancy_rejects_out_of_bounds_cells() {
        let cells = vec![Cell::Empty; 6];
        let view = OccupancyView::new(&cells, 2, 3);

        assert_eq!(view.cell(CellCoord::new(2, 0)), None);
        assert_eq!(view.cell(CellCoord::new(0, 3)), None);
        assert!(!view.is_free(CellCoord::new(5, 5)));
        assert!(view.is_free(CellCoord::new(1, 2)));
    }

    #[test]
    fn cells_past_a_short_backing_slice_are_out_of_bounds() {
        let cells = vec![Cell::Empty; 4];
        let view = OccupancyView::new(&cells, 2, 3);

        assert_eq!(view.index(CellCoord::new(1, 0)), Some(3));
        assert_eq!(view.index(CellCoord::new(1, 1)), None);
        assert_eq!(view.cell(CellCoord::new(1, 2)), None);
        assert!(!view.is_free(CellCoord::new(1, 1)));
    }

    #[test]
    fn neighbors_follow_up_down_left_right_order() {
        let cells = vec![Cell::Empty; 9];
        let view = OccupancyView::new(&cells, 3, 3);

        let around_center: Vec<_> = view.neighbors(CellCoord::new(1, 1)).collect();
        assert_eq!(
            around_center,
            vec![
                CellCoord::new(0, 1),
                CellCoord::new(2, 1),
                CellCoord::new(1, 0),
                CellCoord::new(1, 2),
            ]
        );

        let around_corner: Vec<_> = view.neighbors(CellCoord::new(2, 2)).collect();
        assert_eq!(around_corner, vec![CellCoord::new(1, 2), CellCoord::new(2, 1)]);
    }

    #[test]
    fn occupied_cells_are_scanned_row_major() {
        let mut cells = vec![Cell::Empty; 6];
        cells[4] = Cell::Occupied(AgentId::new(7));
        cells[2] = Cell::Occupied(AgentId::new(9));
        let view = OccupancyView::new(&cells, 2, 3);

        let occupied: Vec<_> = view.occupied().collect();
        assert_eq!(
            occupied,
            vec![
                (CellCoord::new(0, 2), AgentId::new(9)),
                (CellCoord::new(1, 1), AgentId::new(7)),
            ]
        );
    }

    #[test]
    fn faction_counts_report_the_victor() {
        let counts = FactionCounts::default().with(Faction::Enemy);
        assert_eq!(counts.victor(), Some(Faction::Enemy));
        assert!(!counts.is_contested());

        let contested = counts.with(Faction::Player);
        assert!(contested.is_contested());
        assert_eq!(contested.victor(), None);
        assert_eq!(FactionCounts::default().victor(), None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn round_report_round_trips_through_bincode() {
        let report = RoundReport {
            round: 3,
            damage_dealt: 17,
            damage_received: 9,
            attacks: 6,
            hits: 4,
            living: FactionCounts {
                players: 4,
                enemies: 7,
            },
        };
        assert_round_trip(&report);
    }

    #[test]
    fn scenario_config_round_trips_through_bincode() {
        let config = ScenarioConfig {
            rows: 12,
            columns: 9,
            enemy_strategy: Strategy::Uniform,
            enemy_loadout: LoadoutPlan::Ranged,
            dash: true,
            ..ScenarioConfig::default()
        };
        assert_round_trip(&config);
    }
}
