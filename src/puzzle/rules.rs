//! Direct move semantics, used to replay and check decoded plans

use super::{Cell, Direction, Puzzle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Positions of the player and every box at one timestep
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub player: Cell,
    /// Indexed by box index
    pub boxes: Vec<Cell>,
}

/// Why a move cannot be applied
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("player would walk into a wall or off the grid")]
    Blocked,
    #[error("box {0} would be pushed into a wall or off the grid")]
    BoxIntoWall(usize),
    #[error("box {0} would be pushed into box {1}")]
    BoxIntoBox(usize, usize),
}

impl State {
    pub fn initial(puzzle: &Puzzle) -> Self {
        Self {
            player: puzzle.player_start(),
            boxes: puzzle.box_starts().to_vec(),
        }
    }

    /// Index of the box standing on `cell`
    pub fn box_at(&self, cell: Cell) -> Option<usize> {
        self.boxes.iter().position(|&b| b == cell)
    }

    /// True when every box sits on a goal cell
    pub fn is_goal_state(&self, puzzle: &Puzzle) -> bool {
        self.boxes.iter().all(|&b| puzzle.is_goal(b))
    }

    /// Number of boxes currently on goal cells
    pub fn boxes_on_goals(&self, puzzle: &Puzzle) -> usize {
        self.boxes.iter().filter(|&&b| puzzle.is_goal(b)).count()
    }

    pub fn render(&self, puzzle: &Puzzle) -> String {
        puzzle.render(self.player, &self.boxes)
    }
}

/// Apply a single move, pushing at most one box
pub fn apply_move(puzzle: &Puzzle, state: &State, direction: Direction) -> Result<State, IllegalMove> {
    let target = puzzle
        .free_step(state.player, direction, 1)
        .ok_or(IllegalMove::Blocked)?;

    let mut next = state.clone();
    if let Some(pushed) = state.box_at(target) {
        let destination = puzzle
            .free_step(target, direction, 1)
            .ok_or(IllegalMove::BoxIntoWall(pushed))?;
        if let Some(blocker) = state.box_at(destination) {
            return Err(IllegalMove::BoxIntoBox(pushed, blocker));
        }
        next.boxes[pushed] = destination;
    }
    next.player = target;
    Ok(next)
}

/// Replay moves from the initial state
///
/// Returns every visited state (initial state first), or the index of the
/// first illegal move.
pub fn replay(puzzle: &Puzzle, moves: &[Direction]) -> Result<Vec<State>, (usize, IllegalMove)> {
    let mut states = vec![State::initial(puzzle)];
    for (i, &direction) in moves.iter().enumerate() {
        let current = &states[states.len() - 1];
        let next = apply_move(puzzle, current, direction).map_err(|e| (i, e))?;
        states.push(next);
    }
    Ok(states)
}
