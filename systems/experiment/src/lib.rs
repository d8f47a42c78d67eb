#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Batch experiments: many seeded sessions folded into summary statistics.
//!
//! Session `i` of a batch is seeded with `seed + i`, so a batch replays
//! exactly for a fixed seed and any single session can be rerun on its own.

use serde::{Deserialize, Serialize};
use skirmish_core::{ScenarioConfig, SeededRandom, SetupError, Strategy};
use skirmish_system_scheduler::{Session, SessionOutcome, Winner, DEFAULT_ROUND_CAP};
use tracing::{debug, info};

/// Parameters shared by every session of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    /// Number of sessions to run.
    pub sessions: u32,
    /// Seed of the first session.
    pub seed: u64,
    /// Round cap of each session.
    pub max_rounds: u32,
}

impl Default for BatchPlan {
    fn default() -> Self {
        Self {
            sessions: 100,
            seed: 0,
            max_rounds: DEFAULT_ROUND_CAP,
        }
    }
}

/// Aggregate statistics of a batch of sessions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Sessions that were run.
    pub sessions: u32,
    /// Sessions the players won.
    pub player_wins: u32,
    /// Sessions the enemies won.
    pub enemy_wins: u32,
    /// Sessions that reached the round cap.
    pub stalemates: u32,
    /// Share of sessions won by the players, in percent.
    pub win_percentage: f64,
    /// Mean number of rounds per session.
    pub mean_rounds: f64,
    /// Mean damage dealt by players per session.
    pub mean_damage_dealt: f64,
    /// Mean damage received by players per session.
    pub mean_damage_received: f64,
    /// Mean number of players alive at the end.
    pub mean_player_survivors: f64,
    /// Mean number of enemies alive at the end.
    pub mean_enemy_survivors: f64,
}

impl BatchSummary {
    /// Folds session outcomes into summary statistics.
    #[must_use]
    pub fn from_outcomes(outcomes: &[SessionOutcome]) -> Self {
        let mut summary = Self {
            sessions: u32::try_from(outcomes.len()).unwrap_or(u32::MAX),
            ..Self::default()
        };
        if outcomes.is_empty() {
            return summary;
        }

        let mut rounds = 0u64;
        let mut dealt = 0u64;
        let mut received = 0u64;
        let mut players = 0u64;
        let mut enemies = 0u64;
        for outcome in outcomes {
            match outcome.winner {
                Winner::Players => summary.player_wins += 1,
                Winner::Enemies => summary.enemy_wins += 1,
                Winner::Stalemate => summary.stalemates += 1,
            }
            rounds += u64::from(outcome.rounds);
            dealt += outcome.damage_dealt;
            received += outcome.damage_received;
            players += u64::from(outcome.survivors.players);
            enemies += u64::from(outcome.survivors.enemies);
        }

        let count = f64::from(summary.sessions);
        summary.win_percentage = f64::from(summary.player_wins) * 100.0 / count;
        summary.mean_rounds = rounds as f64 / count;
        summary.mean_damage_dealt = dealt as f64 / count;
        summary.mean_damage_received = received as f64 / count;
        summary.mean_player_survivors = players as f64 / count;
        summary.mean_enemy_survivors = enemies as f64 / count;
        summary
    }
}

/// Runs one session seeded with `seed` until it finishes or hits `max_rounds`.
pub fn run_session(
    config: &ScenarioConfig,
    seed: u64,
    max_rounds: u32,
) -> Result<SessionOutcome, SetupError> {
    let mut session = Session::new(config, SeededRandom::new(seed))?;
    Ok(session.run_to_completion(max_rounds))
}

/// Runs every session of the plan and summarises them.
pub fn run_batch(config: &ScenarioConfig, plan: BatchPlan) -> Result<BatchSummary, SetupError> {
    config.validate()?;

    let mut outcomes = Vec::with_capacity(usize::try_from(plan.sessions).unwrap_or(0));
    for index in 0..plan.sessions {
        let seed = plan.seed.wrapping_add(u64::from(index));
        let outcome = run_session(config, seed, plan.max_rounds)?;
        debug!(
            index,
            seed,
            winner = ?outcome.winner,
            rounds = outcome.rounds,
            "batch session done"
        );
        outcomes.push(outcome);
    }

    let summary = BatchSummary::from_outcomes(&outcomes);
    info!(
        sessions = summary.sessions,
        enemies = config.enemies,
        strategy = %config.enemy_strategy,
        enemy_max_health = config.enemy_max_health,
        win_percentage = summary.win_percentage,
        "batch finished"
    );
    Ok(summary)
}

/// Scenario axes explored by [`sweep`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepAxes {
    /// Enemy counts to try.
    pub enemy_counts: Vec<u32>,
    /// Enemy strategies to try.
    pub strategies: Vec<Strategy>,
    /// Enemy health caps to try.
    pub enemy_max_health: Vec<i32>,
}

impl Default for SweepAxes {
    fn default() -> Self {
        Self {
            enemy_counts: (1..=10).collect(),
            strategies: Strategy::ALL.to_vec(),
            enemy_max_health: vec![60],
        }
    }
}

/// Summary of one scenario of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Number of enemies in the scenario.
    pub enemies: u32,
    /// Enemy strategy of the scenario.
    pub strategy: Strategy,
    /// Enemy health cap of the scenario.
    pub enemy_max_health: i32,
    /// Batch statistics of the scenario.
    pub summary: BatchSummary,
}

/// Runs a batch for every combination of the sweep axes.
///
/// Scenarios are visited strategy first, then enemy count, then health cap.
/// Every scenario reuses the plan's seed so that they face the same draws.
pub fn sweep(
    base: &ScenarioConfig,
    axes: &SweepAxes,
    plan: BatchPlan,
) -> Result<Vec<SweepPoint>, SetupError> {
    let mut points = Vec::new();
    for &strategy in &axes.strategies {
        for &enemies in &axes.enemy_counts {
            for &enemy_max_health in &axes.enemy_max_health {
                let config = ScenarioConfig {
                    enemies,
                    enemy_strategy: strategy,
                    enemy_max_health,
                    ..base.clone()
                };
                let summary = run_batch(&config, plan)?;
                points.push(SweepPoint {
                    enemies,
                    strategy,
                    enemy_max_health,
                    summary,
                });
            }
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::FactionCounts;

    fn outcome(winner: Winner, rounds: u32, players: u32, enemies: u32) -> SessionOutcome {
        SessionOutcome {
            winner,
            rounds,
            damage_dealt: 100,
            damage_received: 40,
            attacks: 20,
            hits: 12,
            survivors: FactionCounts { players, enemies },
        }
    }

    #[test]
    fn summaries_average_over_sessions() {
        let outcomes = [
            outcome(Winner::Players, 10, 3, 0),
            outcome(Winner::Enemies, 20, 0, 2),
            outcome(Winner::Players, 6, 5, 0),
            outcome(Winner::Stalemate, 200, 1, 1),
        ];

        let summary = BatchSummary::from_outcomes(&outcomes);

        assert_eq!(summary.sessions, 4);
        assert_eq!(summary.player_wins, 2);
        assert_eq!(summary.enemy_wins, 1);
        assert_eq!(summary.stalemates, 1);
        assert!((summary.win_percentage - 50.0).abs() < f64::EPSILON);
        assert!((summary.mean_rounds - 59.0).abs() < f64::EPSILON);
        assert!((summary.mean_player_survivors - 2.25).abs() < f64::EPSILON);
        assert!((summary.mean_enemy_survivors - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_batches_report_zeroes() {
        let summary = BatchSummary::from_outcomes(&[]);
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn invalid_scenarios_are_reported_before_running() {
        let config = ScenarioConfig {
            players: 0,
            ..ScenarioConfig::default()
        };
        let result = run_batch(&config, BatchPlan::default());
        assert!(matches!(result, Err(SetupError::MissingFaction { .. })));
    }

    #[test]
    fn summaries_serialize_to_json() {
        let summary = BatchSummary::from_outcomes(&[outcome(Winner::Players, 8, 4, 0)]);
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["player_wins"], 1);
        assert_eq!(json["win_percentage"], 100.0);
    }
}
