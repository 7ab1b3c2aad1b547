//! Grid model: wall/free classification, player and box starts, goals

use super::Direction;
use crate::error::{SokobanError, SokobanResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A (row, column) coordinate on a specific grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Wall,
    Free,
}

/// A parsed puzzle instance. Immutable once built.
///
/// Serialized as its rows of cell codes, so a deserialized puzzle passes the
/// same checks as a parsed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Puzzle {
    pub width: usize,
    pub height: usize,
    cells: Vec<CellKind>,
    player_start: Cell,
    /// Box start cells; the position in this list is the box index
    box_starts: Vec<Cell>,
    /// Goal cells in row-major order
    goals: Vec<Cell>,
}

impl Puzzle {
    /// Build a puzzle from rows of cell codes
    ///
    /// `#` wall, `.` or space free, `P` player, `B` box, `G` goal,
    /// `*` box on goal, `+` player on goal.
    pub fn from_rows(rows: &[Vec<char>]) -> SokobanResult<Self> {
        if rows.is_empty() {
            return Err(SokobanError::MalformedInstance("grid has no rows".to_string()));
        }

        let height = rows.len();
        let width = rows[0].len();
        if width == 0 {
            return Err(SokobanError::MalformedInstance("grid rows cannot be empty".to_string()));
        }

        let mut cells = Vec::with_capacity(width * height);
        let mut player_start = None;
        let mut box_starts = Vec::new();
        let mut goals = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            if line.len() != width {
                return Err(SokobanError::MalformedInstance(format!(
                    "row {} has length {}, expected {}",
                    row,
                    line.len(),
                    width
                )));
            }

            for (col, &code) in line.iter().enumerate() {
                let cell = Cell::new(row, col);
                let (is_player, is_box, is_goal) = match code {
                    '#' => {
                        cells.push(CellKind::Wall);
                        continue;
                    }
                    '.' | ' ' => (false, false, false),
                    'P' => (true, false, false),
                    'B' => (false, true, false),
                    'G' => (false, false, true),
                    '*' => (false, true, true),
                    '+' => (true, false, true),
                    other => {
                        return Err(SokobanError::MalformedInstance(format!(
                            "unknown cell code '{}' at {}",
                            other, cell
                        )))
                    }
                };

                cells.push(CellKind::Free);
                if is_player {
                    if let Some(previous) = player_start {
                        return Err(SokobanError::MalformedInstance(format!(
                            "second player start at {} (first at {})",
                            cell, previous
                        )));
                    }
                    player_start = Some(cell);
                }
                if is_box {
                    box_starts.push(cell);
                }
                if is_goal {
                    goals.push(cell);
                }
            }
        }

        let player_start = player_start
            .ok_or_else(|| SokobanError::MalformedInstance("no player start cell".to_string()))?;

        Ok(Self {
            width,
            height,
            cells,
            player_start,
            box_starts,
            goals,
        })
    }

    /// Parse a puzzle from newline-separated text
    ///
    /// Empty leading and trailing lines are dropped. A line of spaces is a
    /// row of free cells and is kept.
    pub fn parse(text: &str) -> SokobanResult<Self> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .skip_while(|line| line.is_empty())
            .map(|line| line.chars().collect())
            .collect();

        let end = rows
            .iter()
            .rposition(|row: &Vec<char>| !row.is_empty())
            .map_or(0, |last| last + 1);

        Self::from_rows(&rows[..end])
    }

    #[inline]
    pub fn index(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    pub fn kind(&self, cell: Cell) -> CellKind {
        if self.contains(cell) {
            self.cells[self.index(cell)]
        } else {
            CellKind::Wall
        }
    }

    /// True for in-bounds non-wall cells
    pub fn is_free(&self, cell: Cell) -> bool {
        self.kind(cell) == CellKind::Free
    }

    pub fn is_goal(&self, cell: Cell) -> bool {
        self.goals.contains(&cell)
    }

    /// The cell `steps` moves away in `direction`, if it lies on the grid
    pub fn step(&self, cell: Cell, direction: Direction, steps: usize) -> Option<Cell> {
        let (dr, dc) = direction.offset();
        let row = cell.row as isize + dr * steps as isize;
        let col = cell.col as isize + dc * steps as isize;
        if row < 0 || col < 0 {
            return None;
        }
        let next = Cell::new(row as usize, col as usize);
        self.contains(next).then_some(next)
    }

    /// The free cell `steps` moves away in `direction`, if any
    pub fn free_step(&self, cell: Cell, direction: Direction, steps: usize) -> Option<Cell> {
        self.step(cell, direction, steps).filter(|&next| self.is_free(next))
    }

    /// All free cells in row-major order
    pub fn free_cells(&self) -> Vec<Cell> {
        (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| Cell::new(row, col)))
            .filter(|&cell| self.is_free(cell))
            .collect()
    }

    pub fn player_start(&self) -> Cell {
        self.player_start
    }

    pub fn box_starts(&self) -> &[Cell] {
        &self.box_starts
    }

    pub fn box_count(&self) -> usize {
        self.box_starts.len()
    }

    pub fn goals(&self) -> &[Cell] {
        &self.goals
    }

    /// Reject instances with more boxes than goal cells
    pub fn check_goal_capacity(&self) -> SokobanResult<()> {
        if self.box_starts.len() > self.goals.len() {
            return Err(SokobanError::MalformedInstance(format!(
                "{} boxes but only {} goal cells",
                self.box_starts.len(),
                self.goals.len()
            )));
        }
        Ok(())
    }

    /// True when every box already sits on a goal
    pub fn is_solved_at_start(&self) -> bool {
        self.box_starts.iter().all(|&cell| self.is_goal(cell))
    }
}

impl Puzzle {
    /// Render the board with the player and boxes at the given cells
    pub fn render(&self, player: Cell, boxes: &[Cell]) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                let cell = Cell::new(row, col);
                let goal = self.is_goal(cell);
                out.push(if !self.is_free(cell) {
                    '#'
                } else if cell == player {
                    if goal { '+' } else { 'P' }
                } else if boxes.contains(&cell) {
                    if goal { '*' } else { 'B' }
                } else if goal {
                    'G'
                } else {
                    '.'
                });
            }
            out.push('\n');
        }
        out
    }
}

impl TryFrom<Vec<String>> for Puzzle {
    type Error = SokobanError;

    fn try_from(rows: Vec<String>) -> SokobanResult<Self> {
        let rows: Vec<Vec<char>> = rows.iter().map(|row| row.chars().collect()).collect();
        Self::from_rows(&rows)
    }
}

impl From<Puzzle> for Vec<String> {
    fn from(puzzle: Puzzle) -> Self {
        puzzle.to_string().lines().map(str::to_string).collect()
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.player_start, &self.box_starts))
    }
}
