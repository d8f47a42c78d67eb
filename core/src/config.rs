//! Scenario configuration and setup validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Loadout, Strategy, MAX_PLAYER_HEALTH};

/// How loadouts are handed out to the agents of one faction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadoutPlan {
    /// Every agent fights in melee.
    Melee,
    /// Every agent fights at range.
    Ranged,
    /// Agents alternate melee and ranged by creation index, starting with melee.
    Mixed,
}

impl LoadoutPlan {
    /// Loadout assigned to the `index`-th agent created under this plan.
    #[must_use]
    pub const fn loadout_for(self, index: u32) -> Loadout {
        match self {
            Self::Melee => Loadout::Melee,
            Self::Ranged => Loadout::Ranged,
            Self::Mixed => {
                if index % 2 == 0 {
                    Loadout::Melee
                } else {
                    Loadout::Ranged
                }
            }
        }
    }
}

/// Parameters describing a single skirmish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Number of grid rows.
    pub rows: u32,
    /// Number of grid columns.
    pub columns: u32,
    /// Number of player agents.
    pub players: u32,
    /// Number of enemy agents.
    pub enemies: u32,
    /// Target-selection policy shared by every enemy.
    pub enemy_strategy: Strategy,
    /// Upper bound of the enemies' starting health.
    pub enemy_max_health: i32,
    /// Loadout distribution for players.
    pub player_loadout: LoadoutPlan,
    /// Loadout distribution for enemies.
    pub enemy_loadout: LoadoutPlan,
    /// Lets agents that cannot engage anyone double their movement instead.
    pub dash: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            columns: 20,
            players: 5,
            enemies: 10,
            enemy_strategy: Strategy::Nearest,
            enemy_max_health: MAX_PLAYER_HEALTH,
            player_loadout: LoadoutPlan::Mixed,
            enemy_loadout: LoadoutPlan::Melee,
            dash: false,
        }
    }
}

impl ScenarioConfig {
    /// Checks that the scenario can be laid out on its grid.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(SetupError::EmptyGrid {
                rows: self.rows,
                columns: self.columns,
            });
        }

        if self.players == 0 || self.enemies == 0 {
            return Err(SetupError::MissingFaction {
                players: self.players,
                enemies: self.enemies,
            });
        }

        let cells = u64::from(self.rows) * u64::from(self.columns);
        let agents = u64::from(self.players) + u64::from(self.enemies);
        if agents > cells {
            return Err(SetupError::Overcrowded { agents, cells });
        }

        if self.enemy_max_health < 1 {
            return Err(SetupError::InvalidEnemyHealth(self.enemy_max_health));
        }

        Ok(())
    }
}

/// Reasons a scenario cannot be set up.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    /// The grid has no cells.
    #[error("grid must have at least one row and one column, got {rows}x{columns}")]
    EmptyGrid {
        /// Requested number of rows.
        rows: u32,
        /// Requested number of columns.
        columns: u32,
    },
    /// One of the factions has nobody to field.
    #[error("both factions need at least one agent, got {players} players and {enemies} enemies")]
    MissingFaction {
        /// Requested number of players.
        players: u32,
        /// Requested number of enemies.
        enemies: u32,
    },
    /// More agents were requested than the grid has cells.
    #[error("{agents} agents do not fit on a grid of {cells} cells")]
    Overcrowded {
        /// Requested number of agents.
        agents: u64,
        /// Number of cells on the grid.
        cells: u64,
    },
    /// Enemies would start with no health.
    #[error("enemy max health must be positive, got {0}")]
    InvalidEnemyHealth(i32),
}

/// Error returned when a strategy name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown strategy `{name}`, expected nearest, strongest, weakest or uniform")]
pub struct ParseStrategyError {
    name: String,
}

impl ParseStrategyError {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}
