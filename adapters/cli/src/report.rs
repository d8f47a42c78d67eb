//! Plain-text reports printed by the command-line adapter.

use std::io::Write;

use anyhow::Result;
use skirmish_system_experiment::{BatchSummary, SweepPoint};
use skirmish_system_scheduler::{SessionOutcome, Winner};

pub(crate) fn write_outcome<W: Write>(out: &mut W, outcome: &SessionOutcome) -> Result<()> {
    let winner = match outcome.winner {
        Winner::Players => "players",
        Winner::Enemies => "enemies",
        Winner::Stalemate => "stalemate",
    };
    writeln!(out, "winner:          {winner}")?;
    writeln!(out, "rounds:          {}", outcome.rounds)?;
    writeln!(out, "damage dealt:    {}", outcome.damage_dealt)?;
    writeln!(out, "damage received: {}", outcome.damage_received)?;
    writeln!(out, "attacks / hits:  {} / {}", outcome.attacks, outcome.hits)?;
    writeln!(
        out,
        "survivors:       {} players, {} enemies",
        outcome.survivors.players, outcome.survivors.enemies
    )?;
    Ok(())
}

pub(crate) fn write_summary<W: Write>(out: &mut W, summary: &BatchSummary) -> Result<()> {
    writeln!(out, "sessions:        {}", summary.sessions)?;
    writeln!(
        out,
        "wins:            {} players, {} enemies, {} stalemates",
        summary.player_wins, summary.enemy_wins, summary.stalemates
    )?;
    writeln!(out, "win percentage:  {:.1}%", summary.win_percentage)?;
    writeln!(out, "mean rounds:     {:.2}", summary.mean_rounds)?;
    writeln!(
        out,
        "mean damage:     {:.2} dealt, {:.2} received",
        summary.mean_damage_dealt, summary.mean_damage_received
    )?;
    writeln!(
        out,
        "mean survivors:  {:.2} players, {:.2} enemies",
        summary.mean_player_survivors, summary.mean_enemy_survivors
    )?;
    Ok(())
}

pub(crate) fn write_sweep<W: Write>(out: &mut W, points: &[SweepPoint]) -> Result<()> {
    writeln!(
        out,
        "{:<10} {:>7} {:>10} {:>8} {:>8} {:>9} {:>9}",
        "strategy", "enemies", "max health", "win %", "rounds", "dealt", "received"
    )?;
    for point in points {
        let summary = &point.summary;
        writeln!(
            out,
            "{:<10} {:>7} {:>10} {:>8.1} {:>8.2} {:>9.2} {:>9.2}",
            point.strategy.name(),
            point.enemies,
            point.enemy_max_health,
            summary.win_percentage,
            summary.mean_rounds,
            summary.mean_damage_dealt,
            summary.mean_damage_received,
        )?;
    }
    Ok(())
}
