//! Scenario loading: optional TOML file plus command-line overrides.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use clap::Args;
use skirmish_core::{LoadoutPlan, ScenarioConfig, Strategy};

/// Scenario fields that can be overridden from the command line.
#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ScenarioArgs {
    /// Number of grid rows.
    #[arg(long, global = true)]
    pub(crate) rows: Option<u32>,
    /// Number of grid columns.
    #[arg(long, global = true)]
    pub(crate) columns: Option<u32>,
    /// Number of player agents.
    #[arg(long, global = true)]
    pub(crate) players: Option<u32>,
    /// Number of enemy agents.
    #[arg(long, global = true)]
    pub(crate) enemies: Option<u32>,
    /// Enemy target strategy (nearest, strongest, weakest, uniform).
    #[arg(long, global = true)]
    pub(crate) strategy: Option<Strategy>,
    /// Upper bound of enemy starting health.
    #[arg(long, global = true)]
    pub(crate) enemy_max_health: Option<i32>,
    /// Player loadouts (melee, ranged, mixed).
    #[arg(long, global = true, value_parser = parse_loadout)]
    pub(crate) player_loadout: Option<LoadoutPlan>,
    /// Enemy loadouts (melee, ranged, mixed).
    #[arg(long, global = true, value_parser = parse_loadout)]
    pub(crate) enemy_loadout: Option<LoadoutPlan>,
    /// Let agents that cannot engage anyone double their movement.
    #[arg(long, global = true)]
    pub(crate) dash: bool,
}

impl ScenarioArgs {
    fn apply(&self, config: &mut ScenarioConfig) {
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(players) = self.players {
            config.players = players;
        }
        if let Some(enemies) = self.enemies {
            config.enemies = enemies;
        }
        if let Some(strategy) = self.strategy {
            config.enemy_strategy = strategy;
        }
        if let Some(health) = self.enemy_max_health {
            config.enemy_max_health = health;
        }
        if let Some(plan) = self.player_loadout {
            config.player_loadout = plan;
        }
        if let Some(plan) = self.enemy_loadout {
            config.enemy_loadout = plan;
        }
        config.dash |= self.dash;
    }
}

/// Builds the scenario from an optional TOML file and the overrides.
pub(crate) fn load_scenario(
    path: Option<&Path>,
    overrides: &ScenarioArgs,
) -> Result<ScenarioConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario file {}", path.display()))?;
            parse_scenario(&contents)
                .with_context(|| format!("failed to parse scenario file {}", path.display()))?
        }
        None => ScenarioConfig::default(),
    };

    overrides.apply(&mut config);
    config.validate().context("invalid scenario")?;
    Ok(config)
}

fn parse_scenario(contents: &str) -> Result<ScenarioConfig> {
    toml::from_str(contents).context("scenario is not valid TOML")
}

fn parse_loadout(value: &str) -> Result<LoadoutPlan> {
    match value.trim().to_ascii_lowercase().as_str() {
        "melee" => Ok(LoadoutPlan::Melee),
        "ranged" => Ok(LoadoutPlan::Ranged),
        "mixed" => Ok(LoadoutPlan::Mixed),
        other => bail!("unknown loadout `{other}`, expected melee, ranged or mixed"),
    }
}
