#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text rendering of battlefield snapshots for terminal adapters.

use anyhow::Result as AnyResult;
use skirmish_core::{AgentSnapshot, Faction, GridSnapshot, Loadout};
use std::{error::Error, fmt, io::Write};

/// Characters used to draw each kind of cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    empty: char,
    player_melee: char,
    player_ranged: char,
    enemy_melee: char,
    enemy_ranged: char,
}

impl Glyphs {
    /// Creates a glyph set, rejecting sets where two kinds share a character.
    pub fn new(
        empty: char,
        player_melee: char,
        player_ranged: char,
        enemy_melee: char,
        enemy_ranged: char,
    ) -> Result<Self, RenderingError> {
        let all = [empty, player_melee, player_ranged, enemy_melee, enemy_ranged];
        for (index, glyph) in all.iter().enumerate() {
            if all[index + 1..].contains(glyph) {
                return Err(RenderingError::AmbiguousGlyph { glyph: *glyph });
            }
        }

        Ok(Self {
            empty,
            player_melee,
            player_ranged,
            enemy_melee,
            enemy_ranged,
        })
    }

    /// Character drawn for the provided cell contents.
    #[must_use]
    pub fn glyph(&self, cell: Option<&AgentSnapshot>) -> char {
        match cell.map(|agent| (agent.faction, agent.loadout)) {
            None => self.empty,
            Some((Faction::Player, Loadout::Melee)) => self.player_melee,
            Some((Faction::Player, Loadout::Ranged)) => self.player_ranged,
            Some((Faction::Enemy, Loadout::Melee)) => self.enemy_melee,
            Some((Faction::Enemy, Loadout::Ranged)) => self.enemy_ranged,
        }
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            empty: '.',
            player_melee: 'P',
            player_ranged: 'p',
            enemy_melee: 'E',
            enemy_ranged: 'e',
        }
    }
}

/// One rendered picture of the battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFrame {
    /// Grid lines, top row first.
    pub lines: Vec<String>,
    /// Remaining health of every agent on the grid, in row-major order.
    pub health: String,
    /// Summary line with the living counts.
    pub legend: String,
}

impl TextFrame {
    /// Draws the snapshot with the provided glyphs.
    #[must_use]
    pub fn from_snapshot(snapshot: &GridSnapshot, glyphs: &Glyphs) -> Self {
        let lines = snapshot
            .rows_iter()
            .map(|row| row.iter().map(|cell| glyphs.glyph(cell.as_ref())).collect())
            .collect();
        let health = snapshot
            .rows_iter()
            .flatten()
            .flatten()
            .map(|agent| {
                format!(
                    "{}{} {}/{}",
                    glyphs.glyph(Some(agent)),
                    agent.id.get(),
                    agent.health,
                    agent.max_health
                )
            })
            .collect::<Vec<_>>()
            .join("  ");
        let counts = snapshot.counts();
        let legend = format!(
            "players: {}  enemies: {}  (player {}/{}, enemy {}/{})",
            counts.players,
            counts.enemies,
            glyphs.player_melee,
            glyphs.player_ranged,
            glyphs.enemy_melee,
            glyphs.enemy_ranged,
        );

        Self {
            lines,
            health: format!("health: {health}"),
            legend,
        }
    }
}

impl fmt::Display for TextFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        writeln!(f, "{}", self.health)?;
        write!(f, "{}", self.legend)
    }
}

/// Destination for rendered frames.
pub trait FrameSink {
    /// Presents the frame drawn after the provided round.
    fn present(&mut self, round: u32, frame: &TextFrame) -> AnyResult<()>;
}

/// Frame sink writing plain text to any writer.
#[derive(Debug)]
pub struct TextSink<W> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    /// Wraps the provided writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for TextSink<W> {
    fn present(&mut self, round: u32, frame: &TextFrame) -> AnyResult<()> {
        writeln!(self.writer, "round {round}")?;
        writeln!(self.writer, "{frame}")?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Two kinds of cell would be drawn with the same character.
    AmbiguousGlyph {
        /// Character that was used more than once.
        glyph: char,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousGlyph { glyph } => {
                write!(f, "glyph `{glyph}` is used for more than one kind of cell")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{AgentId, CellCoord, CombatProfile, Strategy};

    fn agent(id: u32, faction: Faction, loadout: Loadout, cell: CellCoord) -> AgentSnapshot {
        AgentSnapshot {
            id: AgentId::new(id),
            faction,
            loadout,
            strategy: Strategy::Nearest,
            cell,
            health: 30 - 7 * i32::try_from(id).expect("small id"),
            max_health: 30,
            profile: CombatProfile::for_agent(faction, loadout),
        }
    }

    fn snapshot() -> GridSnapshot {
        let mut cells = vec![None; 6];
        cells[0] = Some(agent(0, Faction::Player, Loadout::Melee, CellCoord::new(0, 0)));
        cells[2] = Some(agent(1, Faction::Enemy, Loadout::Ranged, CellCoord::new(0, 2)));
        cells[4] = Some(agent(2, Faction::Player, Loadout::Ranged, CellCoord::new(1, 1)));
        GridSnapshot::new(2, 3, cells)
    }

    #[test]
    fn frames_draw_one_line_per_row() {
        let frame = TextFrame::from_snapshot(&snapshot(), &Glyphs::default());

        assert_eq!(frame.lines, vec!["P.e".to_owned(), ".p.".to_owned()]);
        assert!(frame.legend.starts_with("players: 2  enemies: 1"));
    }

    #[test]
    fn display_ends_with_the_legend() {
        let frame = TextFrame::from_snapshot(&snapshot(), &Glyphs::default());
        let text = frame.to_string();

        assert!(text.starts_with("P.e\n.p.\nhealth: "));
        assert!(text.ends_with(&frame.legend));
    }

    #[test]
    fn health_line_lists_agents_in_scan_order() {
        let frame = TextFrame::from_snapshot(&snapshot(), &Glyphs::default());

        assert_eq!(frame.health, "health: P0 30/30  e1 23/30  p2 16/30");
    }

    #[test]
    fn custom_glyphs_must_be_distinct() {
        let error = Glyphs::new(' ', 'A', 'a', 'A', 'z').expect_err("duplicate glyph");
        assert_eq!(error, RenderingError::AmbiguousGlyph { glyph: 'A' });

        let glyphs = Glyphs::new(' ', 'A', 'a', 'Z', 'z').expect("distinct glyphs");
        let frame = TextFrame::from_snapshot(&snapshot(), &glyphs);
        assert_eq!(frame.lines[0], "A z");
    }

    #[test]
    fn text_sink_prefixes_the_round() {
        let frame = TextFrame::from_snapshot(&snapshot(), &Glyphs::default());
        let mut sink = TextSink::new(Vec::new());

        sink.present(4, &frame).expect("write frame");

        let written = String::from_utf8(sink.into_inner()).expect("utf8");
        assert!(written.starts_with("round 4\nP.e\n"));
    }
}
