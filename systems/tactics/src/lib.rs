#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-agent decision policy: attack what is in reach, otherwise close in.
//!
//! [`Tactics::act`] reads immutable views of the battlefield and emits the
//! commands for one agent's turn: an optional [`Command::MoveAgent`] followed
//! by an optional [`Command::ApplyAttack`]. The mover's reach is re-checked
//! from its destination before any attack is rolled.

use skirmish_core::{
    AgentId, AgentSnapshot, AgentView, CellCoord, Command, OccupancyView, RandomSource,
};
use skirmish_system_combat::{AttackOutcome, CombatResolver};
use skirmish_system_pathfinding::{Approach, Pathfinder};
use skirmish_system_targeting::{engageable, opponents_of, policy_for, TargetPolicy};
use tracing::debug;

/// Summary of the commands planned for one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnPlan {
    /// Opponent the agent chose, if any.
    pub target: Option<AgentId>,
    /// Cells the agent walks this turn.
    pub path: Vec<CellCoord>,
    /// Whether the agent traded its attack for double movement.
    pub dashed: bool,
    /// Dice rolled for the attack, if one was made.
    pub attack: Option<AttackOutcome>,
}

impl TurnPlan {
    /// Reports whether the agent neither moves nor attacks.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.path.is_empty() && self.attack.is_none()
    }
}

/// Decision system combining targeting, pathfinding, and combat.
#[derive(Debug, Default)]
pub struct Tactics {
    pathfinder: Pathfinder,
    combat: CombatResolver,
    dash: bool,
}

impl Tactics {
    /// Creates the decision system; `dash` lets agents that cannot engage
    /// anyone double their movement instead of attacking.
    #[must_use]
    pub fn new(dash: bool) -> Self {
        Self {
            pathfinder: Pathfinder::new(),
            combat: CombatResolver::new(),
            dash,
        }
    }

    /// Plans the turn of `agent` and appends the resulting commands to `out`.
    ///
    /// Dead or unknown agents, and agents without living opponents, plan
    /// nothing.
    pub fn act<R: RandomSource + ?Sized>(
        &mut self,
        agent: AgentId,
        agents: &AgentView,
        occupancy: OccupancyView<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> TurnPlan {
        let mut plan = TurnPlan::default();
        let Some(actor) = agents.get(agent).copied() else {
            return plan;
        };
        if !actor.is_alive() {
            return plan;
        }

        let opponents = opponents_of(actor.faction, agents, occupancy);
        if opponents.is_empty() {
            return plan;
        }

        let policy = policy_for(actor.faction, actor.strategy);
        let reach = actor.profile.attack_range;

        let in_reach = engageable(actor.cell, reach, &opponents);
        if !in_reach.is_empty() {
            self.strike(&actor, policy, &in_reach, rng, &mut plan, out);
            return plan;
        }

        let Some(target) = choose(policy, actor.cell, &opponents, rng) else {
            return plan;
        };
        plan.target = Some(target.id);

        let approach = self.pathfinder.move_towards(
            actor.cell,
            target.cell,
            actor.loadout.ideal_range(),
            actor.profile.speed,
            occupancy,
        );
        let destination = approach.destination(actor.cell);
        let in_reach = engageable(destination, reach, &opponents);

        if !in_reach.is_empty() {
            plan.path = approach.steps().to_vec();
            push_move(agent, &plan.path, false, out);
            let moved = AgentSnapshot {
                cell: destination,
                ..actor
            };
            self.strike(&moved, policy, &in_reach, rng, &mut plan, out);
            return plan;
        }

        if self.dash {
            let sprint = self.pathfinder.move_towards(
                actor.cell,
                target.cell,
                actor.loadout.ideal_range(),
                actor.profile.speed.saturating_mul(2),
                occupancy,
            );
            if let Approach::Advance(path) = sprint {
                plan.dashed = !path.is_empty();
                plan.path = path;
                push_move(agent, &plan.path, plan.dashed, out);
                debug!(agent = %agent, steps = plan.path.len(), "agent dashed");
                return plan;
            }
        }

        plan.path = approach.steps().to_vec();
        push_move(agent, &plan.path, false, out);
        plan
    }

    fn strike<R: RandomSource + ?Sized>(
        &mut self,
        actor: &AgentSnapshot,
        policy: &dyn TargetPolicy,
        in_reach: &[AgentSnapshot],
        rng: &mut R,
        plan: &mut TurnPlan,
        out: &mut Vec<Command>,
    ) {
        let Some(defender) = choose(policy, actor.cell, in_reach, rng) else {
            return;
        };
        plan.target = Some(defender.id);
        plan.attack = Some(self.combat.handle(actor, &defender, rng, out));
    }
}

fn choose<R: RandomSource + ?Sized>(
    policy: &dyn TargetPolicy,
    origin: CellCoord,
    candidates: &[AgentSnapshot],
    rng: &mut R,
) -> Option<AgentSnapshot> {
    let mut source = rng;
    let chosen = policy.select(origin, candidates, &mut source)?;
    candidates
        .iter()
        .find(|candidate| candidate.id == chosen)
        .copied()
}

fn push_move(agent: AgentId, path: &[CellCoord], dash: bool, out: &mut Vec<Command>) {
    if path.is_empty() {
        return;
    }
    out.push(Command::MoveAgent {
        agent,
        path: path.to_vec(),
        dash,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{
        AttackResolution, Cell, CombatProfile, Faction, Loadout, ScriptedRandom, Strategy,
    };

    struct Board {
        rows: u32,
        columns: u32,
        cells: Vec<Cell>,
        agents: Vec<AgentSnapshot>,
    }

    impl Board {
        fn new(rows: u32, columns: u32) -> Self {
            Self {
                rows,
                columns,
                cells: vec![Cell::Empty; (rows * columns) as usize],
                agents: Vec::new(),
            }
        }

        fn place(
            &mut self,
            faction: Faction,
            loadout: Loadout,
            strategy: Strategy,
            cell: CellCoord,
            health: i32,
        ) -> AgentId {
            let id = AgentId::new(self.agents.len() as u32);
            self.agents.push(AgentSnapshot {
                id,
                faction,
                loadout,
                strategy,
                cell,
                health,
                max_health: health,
                profile: CombatProfile::for_agent(faction, loadout),
            });
            if health > 0 {
                let index = (cell.row() * self.columns + cell.column()) as usize;
                self.cells[index] = Cell::Occupied(id);
            }
            id
        }

        fn act(
            &self,
            tactics: &mut Tactics,
            agent: AgentId,
            rng: &mut ScriptedRandom,
        ) -> (TurnPlan, Vec<Command>) {
            let view = AgentView::from_snapshots(self.agents.clone());
            let occupancy = OccupancyView::new(&self.cells, self.rows, self.columns);
            let mut out = Vec::new();
            let plan = tactics.act(agent, &view, occupancy, rng, &mut out);
            (plan, out)
        }
    }

    #[test]
    fn adjacent_opponents_are_attacked_without_moving() {
        let mut board = Board::new(10, 10);
        let player = board.place(
            Faction::Player,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(4, 4),
            40,
        );
        let enemy = board.place(
            Faction::Enemy,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(4, 5),
            40,
        );
        let mut rng = ScriptedRandom::new([15, 4]);

        let (plan, commands) = board.act(&mut Tactics::default(), player, &mut rng);

        assert!(plan.path.is_empty());
        assert_eq!(plan.target, Some(enemy));
        assert_eq!(
            commands,
            vec![Command::ApplyAttack {
                attacker: player,
                defender: enemy,
                resolution: AttackResolution {
                    raw_roll: 15,
                    attack_total: 21,
                    hit: true,
                    critical: false,
                    damage_roll: 4,
                    damage: 8,
                },
            }]
        );
    }

    #[test]
    fn movers_attack_once_they_reach_their_target() {
        let mut board = Board::new(1, 8);
        let enemy = board.place(
            Faction::Enemy,
            Loadout::Melee,
            Strategy::Weakest,
            CellCoord::new(0, 0),
            30,
        );
        let player = board.place(
            Faction::Player,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(0, 5),
            40,
        );
        let mut rng = ScriptedRandom::new([19, 2]);

        let (plan, commands) = board.act(&mut Tactics::default(), enemy, &mut rng);

        let path: Vec<_> = (1..=4).map(|column| CellCoord::new(0, column)).collect();
        assert_eq!(plan.path, path);
        assert_eq!(
            commands,
            vec![
                Command::MoveAgent {
                    agent: enemy,
                    path,
                    dash: false,
                },
                Command::ApplyAttack {
                    attacker: enemy,
                    defender: player,
                    resolution: AttackResolution {
                        raw_roll: 19,
                        attack_total: 23,
                        hit: true,
                        critical: false,
                        damage_roll: 2,
                        damage: 6,
                    },
                },
            ]
        );
    }

    #[test]
    fn distant_targets_only_draw_a_move() {
        let mut board = Board::new(1, 12);
        let player = board.place(
            Faction::Player,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(0, 0),
            40,
        );
        let _ = board.place(
            Faction::Enemy,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(0, 11),
            30,
        );
        let mut rng = ScriptedRandom::new([20, 8]);

        let (plan, commands) = board.act(&mut Tactics::default(), player, &mut rng);

        assert_eq!(plan.path.len(), 6);
        assert!(plan.attack.is_none());
        assert_eq!(commands.len(), 1);
        assert_eq!(rng.remaining(), 2);
    }

    #[test]
    fn dashing_doubles_the_approach_and_skips_the_attack() {
        let mut board = Board::new(1, 20);
        let player = board.place(
            Faction::Player,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(0, 0),
            40,
        );
        let _ = board.place(
            Faction::Enemy,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(0, 19),
            30,
        );
        let mut rng = ScriptedRandom::default();

        let (plan, commands) = board.act(&mut Tactics::new(true), player, &mut rng);

        assert!(plan.dashed);
        assert_eq!(plan.path.len(), 12);
        assert!(matches!(
            commands.as_slice(),
            [Command::MoveAgent { dash: true, .. }]
        ));
    }

    #[test]
    fn ranged_agents_shoot_from_afar() {
        let mut board = Board::new(1, 20);
        let player = board.place(
            Faction::Player,
            Loadout::Ranged,
            Strategy::Nearest,
            CellCoord::new(0, 0),
            40,
        );
        let enemy = board.place(
            Faction::Enemy,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(0, 12),
            30,
        );
        let mut rng = ScriptedRandom::new([3]);

        let (plan, commands) = board.act(&mut Tactics::default(), player, &mut rng);

        assert!(plan.path.is_empty());
        assert_eq!(plan.target, Some(enemy));
        assert_eq!(plan.attack.map(|outcome| outcome.damage()), Some(0));
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn boxed_in_targets_leave_the_mover_in_place() {
        let mut board = Board::new(5, 5);
        let player = board.place(
            Faction::Player,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(0, 0),
            40,
        );
        let _ = board.place(
            Faction::Enemy,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(2, 2),
            30,
        );
        for cell in [
            CellCoord::new(1, 2),
            CellCoord::new(3, 2),
            CellCoord::new(2, 1),
            CellCoord::new(2, 3),
        ] {
            let _ = board.place(Faction::Player, Loadout::Melee, Strategy::Nearest, cell, 40);
        }
        let mut rng = ScriptedRandom::default();

        let (plan, commands) = board.act(&mut Tactics::new(true), player, &mut rng);

        assert!(plan.is_idle());
        assert!(commands.is_empty());
    }

    #[test]
    fn agents_without_opponents_or_health_do_nothing() {
        let mut board = Board::new(3, 3);
        let lonely = board.place(
            Faction::Player,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(0, 0),
            40,
        );
        let fallen = board.place(
            Faction::Player,
            Loadout::Melee,
            Strategy::Nearest,
            CellCoord::new(1, 1),
            0,
        );
        let mut rng = ScriptedRandom::default();
        let mut tactics = Tactics::default();

        let (plan, commands) = board.act(&mut tactics, lonely, &mut rng);
        assert!(plan.is_idle());
        assert!(commands.is_empty());

        let (plan, commands) = board.act(&mut tactics, fallen, &mut rng);
        assert!(plan.is_idle());
        assert!(commands.is_empty());
    }
}
