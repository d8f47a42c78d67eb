use skirmish_core::{ScenarioConfig, Strategy};
use skirmish_system_experiment::{run_batch, run_session, sweep, BatchPlan, SweepAxes};

#[test]
fn hundred_session_batch_is_reproducible() {
    let config = ScenarioConfig::default();
    let plan = BatchPlan {
        sessions: 100,
        seed: 2024,
        ..BatchPlan::default()
    };

    let first = run_batch(&config, plan).expect("batch");
    let second = run_batch(&config, plan).expect("batch");

    assert_eq!(first.sessions, 100);
    assert_eq!(first.player_wins + first.enemy_wins + first.stalemates, 100);
    assert_eq!(first.win_percentage, second.win_percentage);
    assert_eq!(first, second);
}

#[test]
fn batch_sessions_match_individually_seeded_runs() {
    let config = ScenarioConfig {
        rows: 10,
        columns: 10,
        players: 3,
        enemies: 4,
        ..ScenarioConfig::default()
    };
    let plan = BatchPlan {
        sessions: 3,
        seed: 40,
        max_rounds: 50,
    };

    let summary = run_batch(&config, plan).expect("batch");
    let rounds: u32 = (0..3)
        .map(|index| {
            run_session(&config, 40 + index, 50)
                .expect("session")
                .rounds
        })
        .sum();

    assert!((summary.mean_rounds * 3.0 - f64::from(rounds)).abs() < 1e-9);
}

#[test]
fn sweep_visits_every_combination_in_order() {
    let base = ScenarioConfig {
        rows: 8,
        columns: 8,
        players: 2,
        ..ScenarioConfig::default()
    };
    let axes = SweepAxes {
        enemy_counts: vec![1, 3],
        strategies: vec![Strategy::Weakest, Strategy::Uniform],
        enemy_max_health: vec![20, 40],
    };
    let plan = BatchPlan {
        sessions: 2,
        seed: 7,
        max_rounds: 30,
    };

    let points = sweep(&base, &axes, plan).expect("sweep");

    assert_eq!(points.len(), 8);
    let visited: Vec<_> = points
        .iter()
        .map(|point| (point.strategy, point.enemies, point.enemy_max_health))
        .collect();
    assert_eq!(visited[0], (Strategy::Weakest, 1, 20));
    assert_eq!(visited[1], (Strategy::Weakest, 1, 40));
    assert_eq!(visited[2], (Strategy::Weakest, 3, 20));
    assert_eq!(visited[7], (Strategy::Uniform, 3, 40));
    assert!(points.iter().all(|point| point.summary.sessions == 2));
}
