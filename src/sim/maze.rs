//! Stage four: walk the heart token through a text-defined maze
//!
//! Layout glyphs: `#` wall, `.` open, `S` start, `G` goal. Exactly one start
//! and one goal, all rows the same width.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::{Direction, InputAdapter};
use super::state::GameEvent;
use crate::config::ConfigError;
use crate::consts::SWIPE_THRESHOLD;

/// Kind of a maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazeCell {
    Wall,
    Open,
    Start,
    Goal,
}

impl MazeCell {
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' => Some(MazeCell::Wall),
            '.' => Some(MazeCell::Open),
            'S' => Some(MazeCell::Start),
            'G' => Some(MazeCell::Goal),
            _ => None,
        }
    }

    pub fn is_walkable(self) -> bool {
        self != MazeCell::Wall
    }
}

/// Grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbour in a direction, if it does not underflow
    fn offset(self, dr: i32, dc: i32) -> Option<Cell> {
        let row = self.row.checked_add_signed(dr as isize)?;
        let col = self.col.checked_add_signed(dc as isize)?;
        Some(Cell { row, col })
    }
}

/// Parsed, validated maze layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeLayout {
    cells: Vec<Vec<MazeCell>>,
    start: Cell,
    goal: Cell,
}

impl MazeLayout {
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, ConfigError> {
        if rows.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }
        let width = rows[0].as_ref().chars().count();
        if width == 0 {
            return Err(ConfigError::EmptyLayout);
        }

        let mut cells = Vec::with_capacity(rows.len());
        let mut starts = Vec::new();
        let mut goals = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(ConfigError::RaggedRow {
                    row: r,
                    expected: width,
                    found,
                });
            }
            let mut parsed = Vec::with_capacity(width);
            for (c, glyph) in row.chars().enumerate() {
                let cell = MazeCell::from_glyph(glyph).ok_or(ConfigError::UnknownGlyph {
                    glyph,
                    row: r,
                    col: c,
                })?;
                match cell {
                    MazeCell::Start => starts.push(Cell::new(r, c)),
                    MazeCell::Goal => goals.push(Cell::new(r, c)),
                    _ => {}
                }
                parsed.push(cell);
            }
            cells.push(parsed);
        }

        let [start] = starts[..] else {
            return Err(ConfigError::StartCount(starts.len()));
        };
        let [goal] = goals[..] else {
            return Err(ConfigError::GoalCount(goals.len()));
        };
        Ok(Self { cells, start, goal })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    pub fn cell(&self, at: Cell) -> Option<MazeCell> {
        self.cells.get(at.row)?.get(at.col).copied()
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// Row-major iteration over every cell
    pub fn iter(&self) -> impl Iterator<Item = (Cell, MazeCell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, &kind)| (Cell::new(r, c), kind))
        })
    }
}

/// Result of a move attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Blocked by a wall or the edge, or the maze is already won
    Ignored,
    Moved { moves: u32 },
    Won { moves: u32 },
}

/// Maze stage state
#[derive(Debug, Clone)]
pub struct Maze {
    layout: MazeLayout,
    player: Cell,
    moves: u32,
    won: bool,
    swipe_start: Option<Vec2>,
    events: Vec<GameEvent>,
}

impl Maze {
    pub fn new(layout: MazeLayout) -> Self {
        let player = layout.start();
        let mut maze = Self {
            layout,
            player,
            moves: 0,
            won: false,
            swipe_start: None,
            events: Vec::new(),
        };
        maze.build();
        maze
    }

    /// Token to start, zero moves, not won
    pub fn build(&mut self) {
        self.player = self.layout.start();
        self.moves = 0;
        self.won = false;
        self.swipe_start = None;
    }

    /// Rebuild from the same layout
    pub fn reset(&mut self) {
        self.build();
        self.events.push(GameEvent::MazeReset);
        log::info!("Maze reset");
    }

    /// Move the token by a grid delta if the target is inside the maze and not a wall
    pub fn try_move(&mut self, dr: i32, dc: i32) -> MoveOutcome {
        if self.won {
            return MoveOutcome::Ignored;
        }
        let Some(target) = self.player.offset(dr, dc) else {
            return MoveOutcome::Ignored;
        };
        match self.layout.cell(target) {
            Some(kind) if kind.is_walkable() => {}
            _ => return MoveOutcome::Ignored,
        }

        self.player = target;
        self.moves += 1;
        self.events.push(GameEvent::MazeMoved { moves: self.moves });

        if self.player == self.layout.goal() {
            self.won = true;
            self.events.push(GameEvent::MazeWon { moves: self.moves });
            log::info!("Maze solved in {} moves", self.moves);
            MoveOutcome::Won { moves: self.moves }
        } else {
            MoveOutcome::Moved { moves: self.moves }
        }
    }

    pub fn step(&mut self, direction: Direction) -> MoveOutcome {
        let (dr, dc) = direction.delta();
        self.try_move(dr, dc)
    }

    /// Shortest route from the token to the goal (breadth-first)
    pub fn solve(&self) -> Option<Vec<Direction>> {
        let cols = self.layout.cols();
        let index = |c: Cell| c.row * cols + c.col;
        let mut parent: Vec<Option<(Cell, Direction)>> = vec![None; self.layout.rows() * cols];
        let mut visited = vec![false; parent.len()];

        let mut queue = VecDeque::new();
        visited[index(self.player)] = true;
        queue.push_back(self.player);

        while let Some(at) = queue.pop_front() {
            if at == self.layout.goal() {
                let mut path = Vec::new();
                let mut cur = at;
                while let Some((prev, dir)) = parent[index(cur)] {
                    path.push(dir);
                    cur = prev;
                }
                path.reverse();
                return Some(path);
            }
            for dir in Direction::ALL {
                let (dr, dc) = dir.delta();
                let Some(next) = at.offset(dr, dc) else {
                    continue;
                };
                if !self.layout.cell(next).is_some_and(MazeCell::is_walkable) {
                    continue;
                }
                if visited[index(next)] {
                    continue;
                }
                visited[index(next)] = true;
                parent[index(next)] = Some((at, dir));
                queue.push_back(next);
            }
        }
        None
    }

    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn moves_text(&self, label: &str) -> String {
        format!("{} {}", self.moves, label)
    }

    pub(crate) fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }
}

impl InputAdapter for Maze {
    fn on_pointer_down(&mut self, pos: Vec2) {
        self.swipe_start = Some(pos);
    }

    fn on_pointer_up(&mut self, pos: Vec2) {
        let Some(start) = self.swipe_start else {
            return;
        };
        if let Some(direction) = Direction::from_swipe(pos - start, SWIPE_THRESHOLD) {
            self.swipe_start = None;
            self.step(direction);
        }
    }

    fn on_key(&mut self, key: &str) {
        if let Some(direction) = Direction::from_key(key) {
            self.step(direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MazeConfig;
    use proptest::prelude::*;

    fn heart_maze() -> Maze {
        Maze::new(MazeLayout::parse(MazeConfig::default().layout.as_slice()).unwrap())
    }

    /// Start at (1,1); three rights then two downs reach the goal
    fn corridor_maze() -> Maze {
        let layout = MazeLayout::parse(&["######", "#S...#", "####.#", "####G#", "######"]).unwrap();
        Maze::new(layout)
    }

    #[test]
    fn test_parse_heart_layout() {
        let maze = heart_maze();
        assert_eq!(maze.layout().rows(), 7);
        assert_eq!(maze.layout().cols(), 7);
        assert_eq!(maze.player(), Cell::new(1, 1));
        assert_eq!(maze.layout().goal(), Cell::new(1, 5));
        assert_eq!(maze.moves(), 0);
        assert!(!maze.is_won());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(MazeLayout::parse::<&str>(&[]), Err(ConfigError::EmptyLayout)));
        assert!(matches!(
            MazeLayout::parse(&["#S.G", "#.."]),
            Err(ConfigError::RaggedRow { row: 1, expected: 4, found: 3 })
        ));
        assert!(matches!(
            MazeLayout::parse(&["#SxG"]),
            Err(ConfigError::UnknownGlyph { glyph: 'x', row: 0, col: 2 })
        ));
        assert!(matches!(MazeLayout::parse(&["#..G"]), Err(ConfigError::StartCount(0))));
        assert!(matches!(MazeLayout::parse(&["#SSG"]), Err(ConfigError::StartCount(2))));
        assert!(matches!(MazeLayout::parse(&["#S.."]), Err(ConfigError::GoalCount(0))));
    }

    #[test]
    fn test_wall_blocks() {
        let mut maze = heart_maze();
        assert_eq!(maze.step(Direction::Up), MoveOutcome::Ignored);
        assert_eq!(maze.step(Direction::Left), MoveOutcome::Ignored);
        assert_eq!(maze.player(), Cell::new(1, 1));
        assert_eq!(maze.moves(), 0);
    }

    #[test]
    fn test_edge_blocks() {
        let mut maze = Maze::new(MazeLayout::parse(&["S.G"]).unwrap());
        assert_eq!(maze.try_move(-1, 0), MoveOutcome::Ignored);
        assert_eq!(maze.try_move(0, -1), MoveOutcome::Ignored);
        assert_eq!(maze.try_move(1, 0), MoveOutcome::Ignored);
        assert_eq!(maze.moves(), 0);
    }

    #[test]
    fn test_corridor_win_in_five() {
        let mut maze = corridor_maze();
        for _ in 0..3 {
            assert!(matches!(maze.step(Direction::Right), MoveOutcome::Moved { .. }));
        }
        assert!(matches!(maze.step(Direction::Down), MoveOutcome::Moved { moves: 4 }));
        assert_eq!(maze.step(Direction::Down), MoveOutcome::Won { moves: 5 });
        assert!(maze.is_won());
        assert_eq!(maze.moves(), 5);

        // Won maze ignores further input
        assert_eq!(maze.step(Direction::Up), MoveOutcome::Ignored);
        assert_eq!(maze.moves(), 5);
    }

    #[test]
    fn test_heart_maze_top_row_to_goal() {
        let mut maze = heart_maze();
        for _ in 0..3 {
            maze.step(Direction::Right);
        }
        assert_eq!(maze.step(Direction::Right), MoveOutcome::Won { moves: 4 });
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut maze = heart_maze();
        maze.step(Direction::Down);
        maze.step(Direction::Down);
        maze.reset();
        assert_eq!(maze.player(), Cell::new(1, 1));
        assert_eq!(maze.moves(), 0);
        assert!(!maze.is_won());
    }

    #[test]
    fn test_keys_and_swipes() {
        let mut maze = heart_maze();
        maze.on_key("ArrowDown");
        maze.on_key("S");
        assert_eq!(maze.player(), Cell::new(3, 1));

        // Too short to count
        maze.on_pointer_down(Vec2::new(100.0, 100.0));
        maze.on_pointer_up(Vec2::new(110.0, 95.0));
        assert_eq!(maze.moves(), 2);

        maze.on_pointer_down(Vec2::new(100.0, 100.0));
        maze.on_pointer_up(Vec2::new(100.0, 40.0));
        assert_eq!(maze.player(), Cell::new(2, 1));
        assert_eq!(maze.moves(), 3);
    }

    #[test]
    fn test_blocked_swipe_still_ends_gesture() {
        let mut maze = heart_maze();
        maze.on_pointer_down(Vec2::new(100.0, 100.0));
        maze.on_pointer_up(Vec2::new(100.0, 40.0));
        assert_eq!(maze.moves(), 0);

        // No new press, so this release has no start point
        maze.on_pointer_up(Vec2::new(100.0, 200.0));
        assert_eq!(maze.player(), Cell::new(1, 1));
        assert_eq!(maze.moves(), 0);
    }

    #[test]
    fn test_solve_reaches_goal() {
        let mut maze = heart_maze();
        maze.step(Direction::Down);
        let path = maze.solve().unwrap();
        for dir in &path {
            maze.step(*dir);
        }
        assert!(maze.is_won());
        assert_eq!(maze.moves() as usize, path.len() + 1);
    }

    proptest! {
        #[test]
        fn prop_token_never_on_wall(steps in proptest::collection::vec(0usize..4, 0..80)) {
            let mut maze = heart_maze();
            let mut expected_moves = 0;
            for s in steps {
                let was_won = maze.is_won();
                let outcome = maze.step(Direction::ALL[s]);
                if !matches!(outcome, MoveOutcome::Ignored) {
                    expected_moves += 1;
                }
                prop_assert!(maze.layout().cell(maze.player()).is_some_and(MazeCell::is_walkable));
                prop_assert_eq!(maze.moves(), expected_moves);
                prop_assert_eq!(maze.is_won(), was_won || maze.player() == maze.layout().goal());
            }
        }
    }
}
