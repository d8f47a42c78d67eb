#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that rolls attacks and emits the resulting damage commands.
//!
//! The resolver never touches world state. It rolls the dice for an attack
//! between two snapshots and describes the outcome as a
//! [`Command::ApplyAttack`] that the world validates and applies.

use skirmish_core::{
    roll_die, AgentSnapshot, AttackResolution, Command, RandomSource, RejectionReason,
    ATTACK_DIE, CRITICAL_ROLL,
};
use tracing::trace;

/// Result of asking the resolver to roll an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Dice were rolled; the resolution may still be a miss.
    Resolved(AttackResolution),
    /// The attack is not allowed and no dice were rolled.
    Rejected(RejectionReason),
}

impl AttackOutcome {
    /// Damage the attack inflicts, zero for misses and rejections.
    #[must_use]
    pub const fn damage(&self) -> i32 {
        match self {
            Self::Resolved(resolution) => resolution.damage,
            Self::Rejected(_) => 0,
        }
    }
}

/// Combat system resolving attacks with tabletop dice rules.
#[derive(Debug, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Rolls an attack of `attacker` against `defender`.
    ///
    /// A natural [`CRITICAL_ROLL`] always hits and doubles the damage die;
    /// otherwise the attack total must meet the defender's armor class.
    pub fn resolve<R: RandomSource + ?Sized>(
        &self,
        attacker: &AgentSnapshot,
        defender: &AgentSnapshot,
        rng: &mut R,
    ) -> AttackOutcome {
        if let Err(reason) = check_engagement(attacker, defender) {
            return AttackOutcome::Rejected(reason);
        }

        let profile = attacker.profile;
        let raw_roll = rng.uniform_int(1, ATTACK_DIE);
        let attack_total = i32::try_from(raw_roll)
            .unwrap_or(i32::MAX)
            .saturating_add(profile.strength)
            .saturating_add(profile.proficiency_bonus);
        let critical = raw_roll == CRITICAL_ROLL;

        if !critical && attack_total < defender.profile.armor_class {
            trace!(
                attacker = %attacker.id,
                defender = %defender.id,
                raw_roll,
                attack_total,
                "attack missed"
            );
            return AttackOutcome::Resolved(AttackResolution::miss(raw_roll, attack_total));
        }

        let face = roll_die(rng, profile.damage_die, 0);
        let damage = if critical {
            face.saturating_mul(2).saturating_add(profile.strength)
        } else {
            face.saturating_add(profile.strength)
        };

        AttackOutcome::Resolved(AttackResolution {
            raw_roll,
            attack_total,
            hit: true,
            critical,
            damage_roll: u32::try_from(face).unwrap_or(0),
            damage,
        })
    }

    /// Rolls an attack and queues the matching `Command::ApplyAttack`.
    ///
    /// Rejected attacks queue nothing. The resolved dice are returned so the
    /// caller can account for them before the world applies the command.
    pub fn handle<R: RandomSource + ?Sized>(
        &mut self,
        attacker: &AgentSnapshot,
        defender: &AgentSnapshot,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> AttackOutcome {
        let outcome = self.resolve(attacker, defender, rng);
        if let AttackOutcome::Resolved(resolution) = outcome {
            out.push(Command::ApplyAttack {
                attacker: attacker.id,
                defender: defender.id,
                resolution,
            });
        }
        outcome
    }
}

fn check_engagement(
    attacker: &AgentSnapshot,
    defender: &AgentSnapshot,
) -> Result<(), RejectionReason> {
    if !attacker.is_alive() {
        return Err(RejectionReason::ActorDown);
    }
    if !defender.is_alive() {
        return Err(RejectionReason::DefenderDown);
    }
    if attacker.faction == defender.faction {
        return Err(RejectionReason::SameFaction);
    }
    Ok(())
}
