#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Initiative-ordered round loop and the session driver built on it.
//!
//! A round walks a copy of the turn order taken when the round starts. Agents
//! that are down when their slot comes up are skipped. Defeated agents stay in
//! the order until the world's end-of-round sweep removes them.

mod session;

pub use session::{Session, SessionOutcome, Winner, DEFAULT_ROUND_CAP};

use skirmish_core::{AgentId, Command, Event, Faction, RandomSource, RoundReport, TurnOutcome};
use skirmish_system_tactics::Tactics;
use skirmish_world::{self as world, query, World};
use tracing::debug;

/// Round loop with reusable command and event buffers.
#[derive(Debug, Default)]
pub struct TurnScheduler {
    tactics: Tactics,
    commands: Vec<Command>,
    events: Vec<Event>,
    order: Vec<AgentId>,
}

impl TurnScheduler {
    /// Creates a scheduler; `dash` is forwarded to the decision system.
    #[must_use]
    pub fn new(dash: bool) -> Self {
        Self {
            tactics: Tactics::new(dash),
            ..Self::default()
        }
    }

    /// Plays one full round and reports it from the players' side.
    ///
    /// Every event the world emits during the round is appended to `out`.
    pub fn run_round<R: RandomSource + ?Sized>(
        &mut self,
        world: &mut World,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> RoundReport {
        world::apply(world, Command::BeginRound, out);
        let mut report = RoundReport {
            round: query::round(world),
            ..RoundReport::default()
        };

        self.order.clear();
        self.order.extend_from_slice(query::turn_order(world));
        let order = std::mem::take(&mut self.order);

        for &agent in &order {
            let Some(faction) = query::agent(world, agent)
                .filter(|snapshot| snapshot.is_alive())
                .map(|snapshot| snapshot.faction)
            else {
                continue;
            };

            let outcome = self.take_turn(world, agent, rng, out);
            report.attacks += u32::from(outcome.attacked);
            report.hits += u32::from(outcome.hit);
            match faction {
                Faction::Player => {
                    report.damage_dealt = report.damage_dealt.saturating_add(outcome.damage_dealt);
                }
                Faction::Enemy => {
                    report.damage_received =
                        report.damage_received.saturating_add(outcome.damage_dealt);
                }
            }
        }
        self.order = order;

        world::apply(world, Command::CompleteRound, out);
        report.living = query::faction_counts(world);
        debug!(
            round = report.round,
            dealt = report.damage_dealt,
            received = report.damage_received,
            attacks = report.attacks,
            hits = report.hits,
            players = report.living.players,
            enemies = report.living.enemies,
            "round completed"
        );
        report
    }

    /// Plays the turn of a single agent against the live world.
    ///
    /// The agent's commands are applied in order and the resulting events are
    /// folded into its [`TurnOutcome`].
    pub fn take_turn<R: RandomSource + ?Sized>(
        &mut self,
        world: &mut World,
        agent: AgentId,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> TurnOutcome {
        self.commands.clear();
        {
            let agents = query::agent_view(world);
            let occupancy = query::occupancy_view(world);
            let _ = self
                .tactics
                .act(agent, &agents, occupancy, rng, &mut self.commands);
        }

        self.events.clear();
        for command in self.commands.drain(..) {
            world::apply(world, command, &mut self.events);
        }

        let outcome = fold_turn(agent, &self.events);
        out.extend_from_slice(&self.events);
        outcome
    }
}

fn fold_turn(agent: AgentId, events: &[Event]) -> TurnOutcome {
    let mut outcome = TurnOutcome::default();
    for event in events {
        if let Event::AttackResolved {
            attacker,
            resolution,
            ..
        } = event
        {
            if *attacker != agent {
                continue;
            }
            outcome.attacked = true;
            outcome.hit |= resolution.hit;
            if resolution.hit {
                let damage = u32::try_from(resolution.damage.max(0)).unwrap_or(0);
                outcome.damage_dealt = outcome.damage_dealt.saturating_add(damage);
            }
        }
    }
    outcome
}
