//! Scenario population: random placement, starting health, and initiative.

use skirmish_core::{
    shuffle, CellCoord, Command, Event, Faction, LoadoutPlan, RandomSource, ScenarioConfig,
    SetupError, Strategy, MAX_PLAYER_HEALTH, MIN_STARTING_HEALTH,
};
use tracing::info;

use crate::{apply, query, World};

/// Random placement attempts per grid cell before falling back to a scan.
const PLACEMENT_ATTEMPTS_PER_CELL: u64 = 4;

/// Spawns every agent of the scenario, then rolls initiative.
///
/// Players are created first, then enemies. For each agent the starting
/// health is drawn before its cell.
pub(crate) fn populate<R: RandomSource + ?Sized>(
    world: &mut World,
    config: &ScenarioConfig,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<(), SetupError> {
    let roster = [
        Roster {
            faction: Faction::Player,
            count: config.players,
            loadouts: config.player_loadout,
            strategy: Strategy::Nearest,
            health: (MIN_STARTING_HEALTH, MAX_PLAYER_HEALTH),
        },
        Roster {
            faction: Faction::Enemy,
            count: config.enemies,
            loadouts: config.enemy_loadout,
            strategy: config.enemy_strategy,
            health: enemy_health_range(config.enemy_max_health),
        },
    ];
    for side in &roster {
        spawn_side(world, side, rng, out_events)?;
    }

    shuffle(&mut world.turn_order, rng);
    info!(
        rows = config.rows,
        columns = config.columns,
        players = config.players,
        enemies = config.enemies,
        strategy = %config.enemy_strategy,
        "scenario populated"
    );
    Ok(())
}

/// Agents of one faction waiting to be placed.
struct Roster {
    faction: Faction,
    count: u32,
    loadouts: LoadoutPlan,
    strategy: Strategy,
    health: (i32, i32),
}

fn spawn_side<R: RandomSource + ?Sized>(
    world: &mut World,
    side: &Roster,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<(), SetupError> {
    let (low, high) = side.health;
    for index in 0..side.count {
        let health = draw_health(rng, low, high);
        let Some(cell) = random_free_cell(world, rng) else {
            let (rows, columns) = query::dimensions(world);
            let placed = u64::try_from(query::turn_order(world).len()).unwrap_or(u64::MAX);
            return Err(SetupError::Overcrowded {
                agents: placed.saturating_add(1),
                cells: u64::from(rows) * u64::from(columns),
            });
        };

        apply(
            world,
            Command::SpawnAgent {
                faction: side.faction,
                loadout: side.loadouts.loadout_for(index),
                strategy: side.strategy,
                cell,
                health,
            },
            out_events,
        );
    }
    Ok(())
}

fn enemy_health_range(max_health: i32) -> (i32, i32) {
    (MIN_STARTING_HEALTH.min(max_health), max_health)
}

fn draw_health<R: RandomSource + ?Sized>(rng: &mut R, low: i32, high: i32) -> i32 {
    let low = u32::try_from(low.max(1)).unwrap_or(1);
    let high = u32::try_from(high.max(1)).unwrap_or(low);
    i32::try_from(rng.uniform_int(low, high)).unwrap_or(i32::MAX)
}

/// Draws uniformly random cells until an empty one turns up.
///
/// After a bounded number of collisions the first empty cell in row-major
/// order is used instead, so a nearly full grid still populates.
fn random_free_cell<R: RandomSource + ?Sized>(world: &World, rng: &mut R) -> Option<CellCoord> {
    let occupancy = query::occupancy_view(world);
    let (rows, columns) = occupancy.dimensions();
    if rows == 0 || columns == 0 {
        return None;
    }

    let attempts = u64::from(rows) * u64::from(columns) * PLACEMENT_ATTEMPTS_PER_CELL;
    for _ in 0..attempts {
        let cell = CellCoord::new(
            rng.uniform_int(0, rows - 1),
            rng.uniform_int(0, columns - 1),
        );
        if occupancy.is_free(cell) {
            return Some(cell);
        }
    }

    (0..rows)
        .flat_map(|row| (0..columns).map(move |column| CellCoord::new(row, column)))
        .find(|cell| occupancy.is_free(*cell))
}
