//! Sokoban planning problem definition

use super::{Plan, PlanValidator};
use crate::config::Settings;
use crate::error::{SokobanError, SokobanResult};
use crate::puzzle::{load_puzzle_from_file, Puzzle};
use crate::sat::{save_dimacs, CompileOptions, Formula, FormulaStatistics, PlanOutcome, SatEncoder, SatSolver};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

/// A puzzle together with the settings to plan it
pub struct PlanningProblem {
    settings: Settings,
    puzzle: Puzzle,
}

impl PlanningProblem {
    /// Create a new problem from settings, loading the puzzle file
    pub fn new(settings: Settings) -> Result<Self> {
        let puzzle = load_puzzle_from_file(&settings.input.puzzle_file)
            .context("Failed to load puzzle file")?;

        Ok(Self { settings, puzzle })
    }

    /// Create a problem with an explicit puzzle
    pub fn with_puzzle(settings: Settings, puzzle: Puzzle) -> Self {
        Self { settings, puzzle }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn horizon(&self) -> usize {
        self.settings.planning.horizon
    }

    fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            allow_wait: self.settings.planning.allow_wait,
        }
    }

    fn encoder(&self) -> SatEncoder<'_> {
        SatEncoder::new(&self.puzzle, self.horizon(), self.compile_options())
    }

    /// Compile the puzzle without solving
    pub fn compile(&self) -> Result<Formula> {
        self.encoder()
            .encode()
            .context("Failed to compile puzzle into CNF")
    }

    /// Get encoding statistics
    pub fn encoding_statistics(&self) -> Result<FormulaStatistics> {
        Ok(self.compile()?.statistics())
    }

    /// Solve the problem. `Ok(None)` means no plan within the horizon.
    pub fn solve(&self) -> Result<Option<Plan>> {
        let start_time = Instant::now();
        info!(
            width = self.puzzle.width,
            height = self.puzzle.height,
            boxes = self.puzzle.box_count(),
            horizon = self.horizon(),
            "planning"
        );

        let formula = self.compile()?;
        if let Some(ref path) = self.settings.solver.export_dimacs {
            save_dimacs(&formula, path)?;
            info!(path = %path.display(), "exported DIMACS");
        }

        let outcome = self
            .encoder()
            .solve_formula(&formula, &mut SatSolver::new())
            .context("SAT solving failed")?;

        let decoded = match outcome {
            PlanOutcome::Solved(decoded) => decoded,
            PlanOutcome::NoPlanWithinHorizon => {
                info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "no plan found");
                return Ok(None);
            }
        };

        let validator = PlanValidator::new(&self.puzzle);
        let validation = validator.validate(&decoded.moves);
        if !validation.is_valid || !validator.trace_matches(&decoded.moves, &decoded.trace.states) {
            let reason = validation
                .error_message
                .unwrap_or_else(|| "trace does not match move sequence".to_string());
            warn!(%reason, "decoded plan failed replay");
            return Err(SokobanError::InternalInvariantViolation(reason).into());
        }

        let plan = Plan::new(
            self.puzzle.clone(),
            self.horizon(),
            decoded.moves,
            decoded.trace.states,
            decoded.solve_time,
        );
        info!(
            moves = plan.metadata.move_count,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "found plan"
        );
        Ok(Some(plan))
    }
}

/// Solve independent instances in parallel, one compilation context each
pub fn solve_batch(puzzles: &[Puzzle], horizon: usize, options: CompileOptions) -> Vec<SokobanResult<PlanOutcome>> {
    puzzles
        .par_iter()
        .map(|puzzle| SatEncoder::new(puzzle, horizon, options).solve())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::EXAMPLE_PUZZLES;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn settings_with_horizon(horizon: usize) -> Settings {
        let mut settings = Settings::default();
        settings.planning.horizon = horizon;
        settings
    }

    #[test]
    fn test_problem_creation_with_puzzle() {
        let puzzle = Puzzle::parse("P..\n.B.\n..G").unwrap();
        let problem = PlanningProblem::with_puzzle(settings_with_horizon(5), puzzle);
        assert_eq!(problem.puzzle().box_count(), 1);
        assert_eq!(problem.horizon(), 5);
    }

    #[test]
    fn test_solve_returns_validated_plan() {
        let puzzle = Puzzle::parse("P..\n.B.\n..G").unwrap();
        let problem = PlanningProblem::with_puzzle(settings_with_horizon(5), puzzle);

        let plan = problem.solve().unwrap().expect("plan within five moves");
        assert_eq!(plan.trace.len(), 6);
        assert!(plan.metadata.move_count <= 5);
        assert!(plan.final_state().unwrap().is_goal_state(&plan.puzzle));
    }

    #[test]
    fn test_no_plan_is_none() {
        let puzzle = Puzzle::parse("#######\n#P.B.G#\n#######").unwrap();
        let problem = PlanningProblem::with_puzzle(settings_with_horizon(1), puzzle);
        assert!(problem.solve().unwrap().is_none());
    }

    #[test]
    fn test_missing_puzzle_file() {
        let mut settings = Settings::default();
        settings.input.puzzle_file = PathBuf::from("/nonexistent/level.txt");
        assert!(PlanningProblem::new(settings).is_err());
    }

    #[test]
    fn test_export_dimacs() {
        let temp_dir = tempdir().unwrap();
        let dimacs = temp_dir.path().join("level.cnf");

        let mut settings = settings_with_horizon(3);
        settings.solver.export_dimacs = Some(dimacs.clone());
        let puzzle = Puzzle::parse("#######\n#P.B.G#\n#######").unwrap();
        let problem = PlanningProblem::with_puzzle(settings, puzzle);

        let stats = problem.encoding_statistics().unwrap();
        assert!(problem.solve().unwrap().is_some());

        let content = std::fs::read_to_string(dimacs).unwrap();
        let header = format!("p cnf {} {}", stats.total_variables, stats.total_clauses);
        assert!(content.contains(&header));
    }

    #[test]
    fn test_solve_batch_examples() {
        let puzzles: Vec<Puzzle> = EXAMPLE_PUZZLES
            .iter()
            .map(|(_, text, _)| Puzzle::parse(text).unwrap())
            .collect();
        let horizon = EXAMPLE_PUZZLES.iter().map(|(_, _, t)| *t).max().unwrap();

        let outcomes = solve_batch(&puzzles, horizon, CompileOptions::default());
        assert_eq!(outcomes.len(), puzzles.len());
        for outcome in outcomes {
            assert!(outcome.unwrap().is_solved());
        }
    }
}
