#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first positioning toward a target on the occupancy grid.
//!
//! The search walks four-directionally over empty cells, expanding
//! neighbours up, down, left, right. It stops at the first dequeued cell whose
//! Manhattan distance to the target lies within the requested ideal range, so
//! equal-length alternatives are always settled the same way. Pathfinding
//! consumes no randomness.

use std::collections::VecDeque;

use skirmish_core::{CellCoord, OccupancyView};
use tracing::trace;

/// Result of planning a move toward a target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Approach {
    /// The origin already lies within the ideal range; no steps are needed.
    InRange,
    /// Steps to take this turn, ending at the destination.
    Advance(Vec<CellCoord>),
    /// No empty cell within the ideal range can be reached.
    Unreachable,
}

impl Approach {
    /// Cells to walk this turn; empty unless the approach advances.
    #[must_use]
    pub fn steps(&self) -> &[CellCoord] {
        match self {
            Self::Advance(path) => path,
            Self::InRange | Self::Unreachable => &[],
        }
    }

    /// Cell the mover ends on, given where it started.
    #[must_use]
    pub fn destination(&self, origin: CellCoord) -> CellCoord {
        self.steps().last().copied().unwrap_or(origin)
    }
}

/// Pathfinding system with reusable search buffers.
#[derive(Debug, Default)]
pub struct Pathfinder {
    parents: Vec<Option<CellCoord>>,
    visited: Vec<bool>,
    queue: VecDeque<CellCoord>,
    path: Vec<CellCoord>,
}

impl Pathfinder {
    /// Creates a pathfinder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans at most `speed` steps from `origin` toward `target`.
    ///
    /// The mover stops once it stands within `ideal_range` of the target.
    /// Occupied cells, including the target's own cell, are impassable.
    pub fn move_towards(
        &mut self,
        origin: CellCoord,
        target: CellCoord,
        ideal_range: u32,
        speed: u32,
        occupancy: OccupancyView<'_>,
    ) -> Approach {
        if origin.manhattan_distance(target) <= ideal_range {
            return Approach::InRange;
        }

        if !self.search(origin, target, ideal_range, occupancy) {
            trace!(%origin, %target, ideal_range, "no path toward target");
            return Approach::Unreachable;
        }

        let allowed = usize::try_from(speed).unwrap_or(usize::MAX);
        let steps: Vec<CellCoord> = self.path.iter().copied().take(allowed).collect();
        trace!(
            %origin,
            %target,
            path_len = self.path.len(),
            steps = steps.len(),
            "path planned"
        );
        Approach::Advance(steps)
    }

    /// Number of steps on the shortest obstacle-aware walk from `origin` to a
    /// cell within `ideal_range` of `target`, or `None` when no such walk
    /// exists.
    pub fn walking_distance(
        &mut self,
        origin: CellCoord,
        target: CellCoord,
        ideal_range: u32,
        occupancy: OccupancyView<'_>,
    ) -> Option<u32> {
        if origin.manhattan_distance(target) <= ideal_range {
            return Some(0);
        }
        if !self.search(origin, target, ideal_range, occupancy) {
            return None;
        }
        u32::try_from(self.path.len()).ok()
    }

    /// Runs the breadth-first search and leaves the full path in `self.path`.
    fn search(
        &mut self,
        origin: CellCoord,
        target: CellCoord,
        ideal_range: u32,
        occupancy: OccupancyView<'_>,
    ) -> bool {
        self.path.clear();
        self.queue.clear();

        let Some(origin_index) = occupancy.index(origin) else {
            return false;
        };

        let (rows, columns) = occupancy.dimensions();
        let cell_count = usize::try_from(u64::from(rows) * u64::from(columns)).unwrap_or(0);
        self.parents.clear();
        self.parents.resize(cell_count, None);
        self.visited.clear();
        self.visited.resize(cell_count, false);

        self.visited[origin_index] = true;
        self.queue.push_back(origin);

        while let Some(cell) = self.queue.pop_front() {
            if cell.manhattan_distance(target) <= ideal_range {
                self.reconstruct(origin, cell, occupancy);
                return true;
            }

            for neighbor in occupancy.neighbors(cell) {
                if !occupancy.is_free(neighbor) {
                    continue;
                }
                let Some(index) = occupancy.index(neighbor) else {
                    continue;
                };
                if self.visited[index] {
                    continue;
                }
                self.visited[index] = true;
                self.parents[index] = Some(cell);
                self.queue.push_back(neighbor);
            }
        }

        false
    }

    fn reconstruct(&mut self, origin: CellCoord, goal: CellCoord, occupancy: OccupancyView<'_>) {
        let mut current = goal;
        while current != origin {
            self.path.push(current);
            let parent = occupancy
                .index(current)
                .and_then(|index| self.parents.get(index).copied().flatten());
            match parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        self.path.reverse();
    }
}
