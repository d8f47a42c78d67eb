//! Session driver owning the world, the random source, and the running totals.

use serde::{Deserialize, Serialize};
use skirmish_core::{
    Event, Faction, FactionCounts, GridSnapshot, RandomSource, RoundReport, ScenarioConfig,
    SetupError,
};
use skirmish_world::{query, World};
use tracing::info;

use crate::TurnScheduler;

/// Round cap applied when a driver does not pick its own.
pub const DEFAULT_ROUND_CAP: u32 = 200;

/// Side that won a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// Every enemy fell.
    Players,
    /// Every player fell.
    Enemies,
    /// Both sides still stood when the round cap was reached.
    Stalemate,
}

impl Winner {
    fn from_counts(counts: FactionCounts) -> Self {
        match counts.victor() {
            Some(Faction::Player) => Self::Players,
            Some(Faction::Enemy) => Self::Enemies,
            None => Self::Stalemate,
        }
    }
}

/// Totals of a session that ran to completion or hit its round cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionOutcome {
    /// Side left standing.
    pub winner: Winner,
    /// Rounds played.
    pub rounds: u32,
    /// Damage players dealt over the whole session.
    pub damage_dealt: u64,
    /// Damage players received over the whole session.
    pub damage_received: u64,
    /// Attacks rolled by either side.
    pub attacks: u64,
    /// Attacks that connected.
    pub hits: u64,
    /// Living agents per faction at the end.
    pub survivors: FactionCounts,
}

/// A single skirmish from setup to its final round.
#[derive(Debug)]
pub struct Session<R> {
    world: World,
    scheduler: TurnScheduler,
    rng: R,
    events: Vec<Event>,
    totals: Totals,
}

#[derive(Clone, Copy, Debug, Default)]
struct Totals {
    damage_dealt: u64,
    damage_received: u64,
    attacks: u64,
    hits: u64,
}

impl<R: RandomSource> Session<R> {
    /// Validates the scenario, places every agent, and rolls initiative.
    pub fn new(config: &ScenarioConfig, mut rng: R) -> Result<Self, SetupError> {
        let mut events = Vec::new();
        let world = World::from_scenario(config, &mut rng, &mut events)?;
        Ok(Self {
            world,
            scheduler: TurnScheduler::new(config.dash),
            rng,
            events,
            totals: Totals::default(),
        })
    }

    /// Plays one round and folds it into the session totals.
    pub fn run_round(&mut self) -> RoundReport {
        let report = self
            .scheduler
            .run_round(&mut self.world, &mut self.rng, &mut self.events);
        self.totals.damage_dealt += u64::from(report.damage_dealt);
        self.totals.damage_received += u64::from(report.damage_received);
        self.totals.attacks += u64::from(report.attacks);
        self.totals.hits += u64::from(report.hits);
        report
    }

    /// Plays rounds until one side is eliminated or `max_rounds` were played
    /// in total.
    pub fn run_to_completion(&mut self, max_rounds: u32) -> SessionOutcome {
        while !self.is_finished() && self.round() < max_rounds {
            let _ = self.run_round();
        }

        let outcome = self.outcome();
        info!(
            winner = ?outcome.winner,
            rounds = outcome.rounds,
            players = outcome.survivors.players,
            enemies = outcome.survivors.enemies,
            "session finished"
        );
        outcome
    }

    /// Summary of the session so far.
    #[must_use]
    pub fn outcome(&self) -> SessionOutcome {
        let survivors = self.faction_counts();
        SessionOutcome {
            winner: Winner::from_counts(survivors),
            rounds: self.round(),
            damage_dealt: self.totals.damage_dealt,
            damage_received: self.totals.damage_received,
            attacks: self.totals.attacks,
            hits: self.totals.hits,
            survivors,
        }
    }

    /// Reports whether at most one side is left standing.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.faction_counts().is_contested()
    }

    /// Living agents per faction.
    #[must_use]
    pub fn faction_counts(&self) -> FactionCounts {
        query::faction_counts(&self.world)
    }

    /// Read-only picture of the battlefield.
    #[must_use]
    pub fn grid_snapshot(&self) -> GridSnapshot {
        query::grid_snapshot(&self.world)
    }

    /// Rounds played so far.
    #[must_use]
    pub fn round(&self) -> u32 {
        query::round(&self.world)
    }

    /// Every event emitted since setup, oldest first.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Removes and returns the events recorded so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{SeededRandom, Strategy};

    #[test]
    fn overcrowded_scenarios_fail_setup() {
        let config = ScenarioConfig {
            rows: 3,
            columns: 3,
            players: 5,
            enemies: 5,
            ..ScenarioConfig::default()
        };
        let result = Session::new(&config, SeededRandom::new(1));
        assert!(matches!(result, Err(SetupError::Overcrowded { .. })));
    }

    #[test]
    fn sessions_end_with_a_single_side_or_at_the_cap() {
        let config = ScenarioConfig {
            enemy_strategy: Strategy::Weakest,
            ..ScenarioConfig::default()
        };
        let mut session = Session::new(&config, SeededRandom::new(9)).expect("session");

        let outcome = session.run_to_completion(DEFAULT_ROUND_CAP);

        assert!(outcome.rounds >= 1);
        assert!(outcome.rounds <= DEFAULT_ROUND_CAP);
        match outcome.winner {
            Winner::Players => assert_eq!(outcome.survivors.enemies, 0),
            Winner::Enemies => assert_eq!(outcome.survivors.players, 0),
            Winner::Stalemate => assert_eq!(outcome.rounds, DEFAULT_ROUND_CAP),
        }
        assert!(outcome.hits <= outcome.attacks);
        assert_eq!(session.run_to_completion(DEFAULT_ROUND_CAP), outcome);
    }

    #[test]
    fn round_cap_stops_a_contested_session() {
        let mut session =
            Session::new(&ScenarioConfig::default(), SeededRandom::new(5)).expect("session");

        let outcome = session.run_to_completion(1);

        assert_eq!(outcome.rounds, 1);
        if outcome.survivors.is_contested() {
            assert_eq!(outcome.winner, Winner::Stalemate);
        }
    }

    #[test]
    fn outcomes_serialize_with_lowercase_winners() {
        let outcome = SessionOutcome {
            winner: Winner::Players,
            rounds: 12,
            damage_dealt: 240,
            damage_received: 130,
            attacks: 70,
            hits: 41,
            survivors: FactionCounts {
                players: 3,
                enemies: 0,
            },
        };
        let json = serde_json::to_string(&outcome).expect("serialize");
        assert!(json.contains(r#""winner":"players""#));
    }
}
