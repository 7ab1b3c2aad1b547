//! The four canonical move directions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit move on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in clause emission order
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// (row, column) offset of one step
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Single-letter move symbol
    pub fn symbol(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    /// Parse a move symbol, case-insensitive
    pub fn from_symbol(symbol: char) -> Option<Direction> {
        match symbol.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }

    /// Match a displacement against the canonical offsets
    pub fn from_offset(dr: isize, dc: isize) -> Option<Direction> {
        Self::ALL.into_iter().find(|d| d.offset() == (dr, dc))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Parse a string such as `"RRDD"` into moves
pub fn parse_moves(text: &str) -> Option<Vec<Direction>> {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(Direction::from_symbol)
        .collect()
}

/// Render moves as a compact symbol string
pub fn format_moves(moves: &[Direction]) -> String {
    moves.iter().map(|d| d.symbol()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_cancel() {
        for d in Direction::ALL {
            let (r1, c1) = d.offset();
            let (r2, c2) = d.opposite().offset();
            assert_eq!((r1 + r2, c1 + c2), (0, 0));
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn test_from_offset() {
        assert_eq!(Direction::from_offset(0, 1), Some(Direction::Right));
        assert_eq!(Direction::from_offset(-1, 0), Some(Direction::Up));
        assert_eq!(Direction::from_offset(1, 1), None);
        assert_eq!(Direction::from_offset(0, 2), None);
    }

    #[test]
    fn test_parse_and_format_moves() {
        let moves = parse_moves("rRd, U").unwrap();
        assert_eq!(moves, vec![Direction::Right, Direction::Right, Direction::Down, Direction::Up]);
        assert_eq!(format_moves(&moves), "RRDU");
        assert!(parse_moves("RX").is_none());
    }
}
