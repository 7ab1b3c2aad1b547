//! Decoding satisfying assignments back into move sequences

use super::variables::VariableEncoder;
use crate::error::{SokobanError, SokobanResult};
use crate::puzzle::{Cell, Direction, Puzzle, State};
use std::collections::HashMap;

/// Positions of every entity at each timestep 0..=T
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub states: Vec<State>,
}

impl Trace {
    /// The player's cell at each timestep
    pub fn player_path(&self) -> Vec<Cell> {
        self.states.iter().map(|s| s.player).collect()
    }
}

/// Rebuilds the player's trajectory from a model of a compiled formula
pub struct TraceDecoder<'a> {
    puzzle: &'a Puzzle,
    encoder: VariableEncoder,
    free_cells: Vec<Cell>,
}

impl<'a> TraceDecoder<'a> {
    /// The encoder must be the one the formula was compiled with
    pub fn new(puzzle: &'a Puzzle, encoder: VariableEncoder) -> Self {
        Self {
            puzzle,
            encoder,
            free_cells: puzzle.free_cells(),
        }
    }

    /// Decode the move sequence, skipping steps where the player stayed put
    pub fn decode_moves(&self, assignment: &HashMap<i32, bool>) -> SokobanResult<Vec<Direction>> {
        let path = self.decode_player_path(assignment)?;
        moves_from_path(&path)
    }

    /// Decode positions of the player and all boxes at every timestep
    pub fn decode_trace(&self, assignment: &HashMap<i32, bool>) -> SokobanResult<Trace> {
        let player = self.decode_player_path(assignment)?;
        let mut states = Vec::with_capacity(player.len());

        for (t, &player) in player.iter().enumerate() {
            let boxes = (0..self.puzzle.box_count())
                .map(|b| {
                    self.unique_cell(assignment, t, &format!("box {}", b), |cell| {
                        self.encoder.box_var(b, cell, t)
                    })
                })
                .collect::<SokobanResult<Vec<_>>>()?;
            states.push(State { player, boxes });
        }

        Ok(Trace { states })
    }

    /// The player's cell at each timestep 0..=T
    pub fn decode_player_path(&self, assignment: &HashMap<i32, bool>) -> SokobanResult<Vec<Cell>> {
        (0..=self.encoder.horizon())
            .map(|t| self.unique_cell(assignment, t, "player", |cell| self.encoder.player_var(cell, t)))
            .collect()
    }

    /// The single free cell whose variable is true at `t`
    fn unique_cell<F>(
        &self,
        assignment: &HashMap<i32, bool>,
        t: usize,
        entity: &str,
        variable: F,
    ) -> SokobanResult<Cell>
    where
        F: Fn(Cell) -> SokobanResult<i32>,
    {
        let mut found = None;
        for &cell in &self.free_cells {
            if !assignment.get(&variable(cell)?).copied().unwrap_or(false) {
                continue;
            }
            if let Some(previous) = found {
                return Err(SokobanError::InternalInvariantViolation(format!(
                    "{} at both {} and {} at time {}",
                    entity, previous, cell, t
                )));
            }
            found = Some(cell);
        }

        found.ok_or_else(|| {
            SokobanError::InternalInvariantViolation(format!("{} has no position at time {}", entity, t))
        })
    }
}

/// Differentiate consecutive cells into moves
///
/// Zero displacements are skipped. Any other displacement must be a unit step.
pub fn moves_from_path(path: &[Cell]) -> SokobanResult<Vec<Direction>> {
    let mut moves = Vec::with_capacity(path.len().saturating_sub(1));

    for (t, window) in path.windows(2).enumerate() {
        let (from, to) = (window[0], window[1]);
        let dr = to.row as isize - from.row as isize;
        let dc = to.col as isize - from.col as isize;
        if (dr, dc) == (0, 0) {
            continue;
        }

        let direction = Direction::from_offset(dr, dc).ok_or_else(|| {
            SokobanError::InternalInvariantViolation(format!(
                "player jumped from {} to {} between steps {} and {}",
                from,
                to,
                t,
                t + 1
            ))
        })?;
        moves.push(direction);
    }

    Ok(moves)
}
