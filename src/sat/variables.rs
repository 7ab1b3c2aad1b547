//! Variable layout for the SAT encoding
//!
//! Player variables occupy `1..=F` where `F = (T + 1) * R * C`, box `b`
//! owns the block `F + b * F + 1..=F + (b + 1) * F`, and auxiliary
//! variables are handed out strictly after the last box block.

use crate::error::{SokobanError, SokobanResult};
use crate::puzzle::{Cell, Puzzle};

/// Semantic meaning of a domain variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// Player occupies `cell` at time `t`
    Player { cell: Cell, t: usize },
    /// Box `index` occupies `cell` at time `t`
    Box { index: usize, cell: Cell, t: usize },
    /// Anonymous variable introduced by the compiler
    Auxiliary,
}

/// Pure mapping from (role, entity, cell, time) to variable ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableEncoder {
    rows: usize,
    cols: usize,
    horizon: usize,
    box_count: usize,
    /// Size of one role block: `(T + 1) * R * C`
    block_size: usize,
}

impl VariableEncoder {
    /// Create the layout for a grid of `rows x cols`, horizon `T` and `box_count` boxes
    pub fn new(rows: usize, cols: usize, horizon: usize, box_count: usize) -> SokobanResult<Self> {
        let block = (horizon as u64 + 1)
            .checked_mul(rows as u64)
            .and_then(|v| v.checked_mul(cols as u64));
        let domain = block.and_then(|b| b.checked_mul(box_count as u64 + 1));

        match (block, domain) {
            (Some(block), Some(domain)) if domain < i32::MAX as u64 => Ok(Self {
                rows,
                cols,
                horizon,
                box_count,
                block_size: block as usize,
            }),
            (_, domain) => Err(SokobanError::EncodingTooLarge {
                variables: domain.unwrap_or(u64::MAX),
            }),
        }
    }

    /// Layout for a parsed puzzle
    pub fn for_puzzle(puzzle: &Puzzle, horizon: usize) -> SokobanResult<Self> {
        Self::new(puzzle.height, puzzle.width, horizon, puzzle.box_count())
    }

    /// Position inside one role block, 1-based
    fn positional(&self, cell: Cell, t: usize) -> SokobanResult<usize> {
        if cell.row >= self.rows || cell.col >= self.cols {
            return Err(SokobanError::VariableOutOfRange(format!(
                "cell {} outside {}x{} grid",
                cell, self.rows, self.cols
            )));
        }
        if t > self.horizon {
            return Err(SokobanError::VariableOutOfRange(format!(
                "time step {} beyond horizon {}",
                t, self.horizon
            )));
        }
        Ok(t * self.rows * self.cols + cell.row * self.cols + cell.col + 1)
    }

    /// Variable for "player occupies `cell` at time `t`"
    pub fn player_var(&self, cell: Cell, t: usize) -> SokobanResult<i32> {
        Ok(self.positional(cell, t)? as i32)
    }

    /// Variable for "box `index` occupies `cell` at time `t`"
    pub fn box_var(&self, index: usize, cell: Cell, t: usize) -> SokobanResult<i32> {
        if index >= self.box_count {
            return Err(SokobanError::VariableOutOfRange(format!(
                "box index {} but only {} boxes",
                index, self.box_count
            )));
        }
        let offset = self.block_size + index * self.block_size;
        Ok((offset + self.positional(cell, t)?) as i32)
    }

    /// Number of player and box variables
    pub fn domain_variable_count(&self) -> usize {
        self.block_size * (self.box_count + 1)
    }

    pub fn player_variable_count(&self) -> usize {
        self.block_size
    }

    /// Inverse mapping for any id produced by this layout
    pub fn describe(&self, var: i32) -> Option<VariableType> {
        if var <= 0 {
            return None;
        }
        let zero_based = var as usize - 1;
        if zero_based >= self.domain_variable_count() {
            return Some(VariableType::Auxiliary);
        }

        let block = zero_based / self.block_size;
        let within = zero_based % self.block_size;
        let frame = self.rows * self.cols;
        let t = within / frame;
        let cell = Cell::new((within % frame) / self.cols, within % self.cols);

        Some(match block {
            0 => VariableType::Player { cell, t },
            b => VariableType::Box { index: b - 1, cell, t },
        })
    }

    /// The allocator for auxiliary variables of this layout
    pub fn auxiliary_allocator(&self) -> AuxiliaryAllocator {
        AuxiliaryAllocator {
            next_id: self.domain_variable_count() as i32 + 1,
            first_id: self.domain_variable_count() as i32 + 1,
        }
    }

    pub fn dimensions(&self) -> (usize, usize, usize, usize) {
        (self.rows, self.cols, self.horizon, self.box_count)
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn box_count(&self) -> usize {
        self.box_count
    }
}

/// Hands out fresh auxiliary ids; owned by one compilation
#[derive(Debug)]
pub struct AuxiliaryAllocator {
    next_id: i32,
    first_id: i32,
}

impl AuxiliaryAllocator {
    /// A fresh id, never returned before by this allocator
    pub fn fresh(&mut self) -> SokobanResult<i32> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(SokobanError::EncodingTooLarge {
            variables: id as u64 + 1,
        })?;
        Ok(id)
    }

    /// Number of ids allocated so far
    pub fn allocated(&self) -> usize {
        (self.next_id - self.first_id) as usize
    }

    /// Highest id in use, counting the domain variables
    pub fn max_variable(&self) -> usize {
        (self.next_id - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_player_layout() {
        let enc = VariableEncoder::new(3, 3, 2, 1).unwrap();
        assert_eq!(enc.player_var(Cell::new(0, 0), 0).unwrap(), 1);
        assert_eq!(enc.player_var(Cell::new(0, 1), 0).unwrap(), 2);
        assert_eq!(enc.player_var(Cell::new(1, 0), 0).unwrap(), 4);
        assert_eq!(enc.player_var(Cell::new(0, 0), 1).unwrap(), 10);
        assert_eq!(enc.player_var(Cell::new(2, 2), 2).unwrap(), 27);
    }

    #[test]
    fn test_box_blocks_follow_player_block() {
        let enc = VariableEncoder::new(3, 3, 2, 2).unwrap();
        assert_eq!(enc.box_var(0, Cell::new(0, 0), 0).unwrap(), 28);
        assert_eq!(enc.box_var(1, Cell::new(0, 0), 0).unwrap(), 55);
        assert_eq!(enc.box_var(1, Cell::new(2, 2), 2).unwrap(), 81);
        assert_eq!(enc.domain_variable_count(), 81);
    }

    #[test]
    fn test_injective_over_domain() {
        let enc = VariableEncoder::new(2, 3, 3, 3).unwrap();
        let mut seen = HashSet::new();
        for t in 0..=3 {
            for row in 0..2 {
                for col in 0..3 {
                    let cell = Cell::new(row, col);
                    let p = enc.player_var(cell, t).unwrap();
                    assert!(p > 0);
                    assert!(seen.insert(p));
                    assert_eq!(enc.describe(p), Some(VariableType::Player { cell, t }));
                    for b in 0..3 {
                        let v = enc.box_var(b, cell, t).unwrap();
                        assert!(seen.insert(v));
                        assert_eq!(enc.describe(v), Some(VariableType::Box { index: b, cell, t }));
                    }
                }
            }
        }
        assert_eq!(seen.len(), enc.domain_variable_count());
        assert_eq!(*seen.iter().max().unwrap() as usize, enc.domain_variable_count());
    }

    #[test]
    fn test_same_input_same_id() {
        let enc = VariableEncoder::new(4, 4, 5, 2).unwrap();
        let a = enc.box_var(1, Cell::new(3, 2), 4).unwrap();
        let b = enc.box_var(1, Cell::new(3, 2), 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_auxiliary_after_domain() {
        let enc = VariableEncoder::new(3, 3, 1, 1).unwrap();
        let mut aux = enc.auxiliary_allocator();
        let first = aux.fresh().unwrap();
        let second = aux.fresh().unwrap();
        assert_eq!(first as usize, enc.domain_variable_count() + 1);
        assert_ne!(first, second);
        assert_eq!(aux.allocated(), 2);
        assert_eq!(aux.max_variable(), enc.domain_variable_count() + 2);
        assert_eq!(enc.describe(second), Some(VariableType::Auxiliary));
    }

    #[test]
    fn test_variable_bounds() {
        let enc = VariableEncoder::new(2, 2, 1, 1).unwrap();
        assert!(enc.player_var(Cell::new(1, 1), 1).is_ok());
        assert!(enc.player_var(Cell::new(2, 0), 0).is_err());
        assert!(enc.player_var(Cell::new(0, 2), 0).is_err());
        assert!(enc.player_var(Cell::new(0, 0), 2).is_err());
        assert!(enc.box_var(1, Cell::new(0, 0), 0).is_err());
        assert_eq!(enc.describe(0), None);
    }

    #[test]
    fn test_oversized_layout_rejected() {
        let err = VariableEncoder::new(1000, 1000, 1000, 10).unwrap_err();
        assert!(matches!(err, SokobanError::EncodingTooLarge { .. }));
    }
}
