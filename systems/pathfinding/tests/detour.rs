use std::collections::HashSet;

use skirmish_core::{AgentId, Cell, CellCoord, OccupancyView};
use skirmish_system_pathfinding::{Approach, Pathfinder};

const ROWS: u32 = 5;
const COLUMNS: u32 = 5;

struct Board {
    cells: Vec<Cell>,
}

impl Board {
    fn new() -> Self {
        Self {
            cells: vec![Cell::Empty; (ROWS * COLUMNS) as usize],
        }
    }

    fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, ROWS, COLUMNS)
    }

    fn place(&mut self, agent: u32, cell: CellCoord) {
        let index = self.view().index(cell).expect("cell in bounds");
        self.cells[index] = Cell::Occupied(AgentId::new(agent));
    }

    fn clear(&mut self, cell: CellCoord) {
        let index = self.view().index(cell).expect("cell in bounds");
        self.cells[index] = Cell::Empty;
    }
}

fn walled_board(mover: CellCoord, target: CellCoord) -> Board {
    let mut board = Board::new();
    board.place(0, mover);
    board.place(1, target);
    for (offset, column) in (1..=3).enumerate() {
        board.place(10 + offset as u32, CellCoord::new(2, column));
    }
    board
}

fn walk(speed: u32) -> Vec<CellCoord> {
    let target = CellCoord::new(4, 2);
    let mut mover = CellCoord::new(0, 2);
    let mut board = walled_board(mover, target);
    let mut pathfinder = Pathfinder::new();
    let mut trail = vec![mover];
    let mut left_behind = HashSet::new();

    let mut remaining = pathfinder
        .walking_distance(mover, target, 1, board.view())
        .expect("target reachable around the wall");
    assert!(remaining > 0);

    for _ in 0..32 {
        let approach = pathfinder.move_towards(mover, target, 1, speed, board.view());
        let Approach::Advance(steps) = approach else {
            assert_eq!(approach, Approach::InRange);
            break;
        };
        assert!(steps.len() as u32 <= speed);

        for step in &steps {
            assert!(!left_behind.contains(step), "mover returned to {step}");
        }
        let destination = *steps.last().expect("advance has steps");
        assert!(mover.manhattan_distance(destination) <= speed);

        let _ = left_behind.insert(mover);
        left_behind.extend(steps[..steps.len() - 1].iter().copied());
        board.clear(mover);
        board.place(0, destination);
        mover = destination;
        trail.push(mover);

        let now = pathfinder
            .walking_distance(mover, target, 1, board.view())
            .expect("still reachable");
        assert!(now < remaining, "walking distance went from {remaining} to {now}");
        remaining = now;
    }

    assert_eq!(remaining, 0);
    assert!(mover.manhattan_distance(target) <= 1);
    trail
}

#[test]
fn detour_around_a_wall_always_closes_in() {
    let trail = walk(2);
    assert!(trail.len() > 3);
}

#[test]
fn detour_is_identical_on_every_run() {
    assert_eq!(walk(2), walk(2));
    assert_eq!(walk(6), walk(6));
}
