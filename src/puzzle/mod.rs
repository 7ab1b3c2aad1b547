//! Puzzle model: grid, directions, move rules and file I/O

pub mod direction;
pub mod grid;
pub mod io;
pub mod rules;

pub use direction::{format_moves, parse_moves, Direction};
pub use grid::{Cell, CellKind, Puzzle};
pub use io::{create_example_puzzles, load_puzzle_from_file, save_puzzle_to_file, EXAMPLE_PUZZLES};
pub use rules::{apply_move, replay, IllegalMove, State};
