//! Sokoban SAT Planner
//!
//! This library finds move sequences for Sokoban puzzles by unrolling the
//! game over a fixed number of steps, compiling it to CNF and decoding the
//! model returned by a SAT solver.

pub mod config;
pub mod error;
pub mod plan;
pub mod puzzle;
pub mod sat;
pub mod utils;

pub use config::Settings;
pub use error::{SokobanError, SokobanResult};
pub use plan::{Plan, PlanningProblem};
pub use puzzle::{Direction, Puzzle};

use anyhow::Result;

/// Main entry point for planning a puzzle described by `settings`
pub fn solve_puzzle(settings: Settings) -> Result<Option<Plan>> {
    let problem = PlanningProblem::new(settings)?;
    problem.solve()
}
