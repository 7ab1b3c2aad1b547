//! SAT encoder for bounded-horizon Sokoban planning

use super::constraints::{CompileOptions, ConstraintCompiler, Formula};
use super::decoder::{Trace, TraceDecoder};
use super::solver::{SatBackend, SatSolver};
use crate::error::SokobanResult;
use crate::puzzle::{Direction, Puzzle};
use std::time::Duration;
use tracing::{debug, info};

/// A plan decoded from a satisfying assignment
#[derive(Debug, Clone)]
pub struct DecodedPlan {
    pub moves: Vec<Direction>,
    pub trace: Trace,
    pub solve_time: Duration,
}

/// Outcome of one encode/solve/decode round
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    Solved(DecodedPlan),
    /// The formula is unsatisfiable: no plan of at most T steps exists
    NoPlanWithinHorizon,
}

impl PlanOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, PlanOutcome::Solved(_))
    }

    pub fn moves(&self) -> Option<&[Direction]> {
        match self {
            PlanOutcome::Solved(plan) => Some(&plan.moves),
            PlanOutcome::NoPlanWithinHorizon => None,
        }
    }
}

/// Main SAT encoder for one puzzle and horizon
pub struct SatEncoder<'a> {
    puzzle: &'a Puzzle,
    horizon: usize,
    options: CompileOptions,
}

impl<'a> SatEncoder<'a> {
    pub fn new(puzzle: &'a Puzzle, horizon: usize, options: CompileOptions) -> Self {
        Self {
            puzzle,
            horizon,
            options,
        }
    }

    /// Compile the puzzle into CNF
    pub fn encode(&self) -> SokobanResult<Formula> {
        let formula = ConstraintCompiler::new(self.puzzle, self.horizon, self.options)?.compile()?;
        info!(
            horizon = self.horizon,
            variables = formula.num_variables(),
            clauses = formula.clause_count(),
            "compiled puzzle"
        );
        Ok(formula)
    }

    /// Encode and solve with CaDiCaL
    pub fn solve(&self) -> SokobanResult<PlanOutcome> {
        self.solve_with(&mut SatSolver::new())
    }

    /// Encode and solve with the given backend
    pub fn solve_with<B: SatBackend>(&self, backend: &mut B) -> SokobanResult<PlanOutcome> {
        let formula = self.encode()?;
        self.solve_formula(&formula, backend)
    }

    /// Solve an already compiled formula and decode the model
    pub fn solve_formula<B: SatBackend>(&self, formula: &Formula, backend: &mut B) -> SokobanResult<PlanOutcome> {
        backend.add_clauses(formula.clauses())?;

        let Some(solution) = backend.solve()? else {
            info!(horizon = self.horizon, "no plan within horizon");
            return Ok(PlanOutcome::NoPlanWithinHorizon);
        };

        let decoder = TraceDecoder::new(self.puzzle, *formula.encoder());
        let trace = decoder.decode_trace(&solution.assignment)?;
        let moves = decoder.decode_moves(&solution.assignment)?;
        debug!(moves = moves.len(), "decoded plan");

        Ok(PlanOutcome::Solved(DecodedPlan {
            moves,
            trace,
            solve_time: solution.solve_time,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SokobanError;
    use crate::puzzle::{replay, Cell};
    use crate::sat::constraints::Clause;
    use crate::sat::solver::SolverSolution;

    fn solve(text: &str, horizon: usize) -> (Puzzle, PlanOutcome) {
        let puzzle = Puzzle::parse(text).unwrap();
        let outcome = SatEncoder::new(&puzzle, horizon, CompileOptions::default())
            .solve()
            .unwrap();
        (puzzle, outcome)
    }

    fn assert_plan_reaches_goal(puzzle: &Puzzle, outcome: &PlanOutcome) {
        let moves = outcome.moves().expect("expected a plan");
        let states = replay(puzzle, moves).expect("decoded plan must be legal");
        let last = states.last().unwrap();
        assert!(last.is_goal_state(puzzle));
        assert!(last.box_at(last.player).is_none());
    }

    #[test]
    fn test_diagonal_scenario() {
        let (puzzle, outcome) = solve("P..\n.B.\n..G", 5);
        assert_plan_reaches_goal(&puzzle, &outcome);
    }

    #[test]
    fn test_box_one_step_from_goal() {
        let (puzzle, outcome) = solve("P..\n.BG\n...", 2);
        assert_plan_reaches_goal(&puzzle, &outcome);
        let PlanOutcome::Solved(plan) = outcome else { unreachable!() };
        assert_eq!(plan.trace.states.len(), 3);
        assert_eq!(plan.trace.states[0].player, Cell::new(0, 0));
    }

    #[test]
    fn test_horizon_zero() {
        let (_, outcome) = solve("P..\n.B.\n..G", 0);
        assert!(!outcome.is_solved());

        let (_, outcome) = solve("P.*\n...", 0);
        assert_eq!(outcome.moves(), Some(&[][..]));
    }

    #[test]
    fn test_too_short_horizon_is_not_an_error() {
        let (_, outcome) = solve("#######\n#P.B.G#\n#######", 2);
        assert!(matches!(outcome, PlanOutcome::NoPlanWithinHorizon));
    }

    #[test]
    fn test_longer_horizons_stay_satisfiable() {
        for horizon in 3..=6 {
            let (puzzle, outcome) = solve("#######\n#P.B.G#\n#######", horizon);
            assert_plan_reaches_goal(&puzzle, &outcome);
        }
    }

    #[test]
    fn test_two_boxes() {
        let (puzzle, outcome) = solve("######\n#P...#\n#.BB.#\n#.GG.#\n######", 5);
        assert_plan_reaches_goal(&puzzle, &outcome);
    }

    #[test]
    fn test_box_cannot_push_another_box() {
        // One push would shove both boxes onto the goals; legally it takes ten moves
        let text = "#######\n#.....#\n#PB*G.#\n#.....#\n#.....#\n#######";

        let (_, outcome) = solve(text, 1);
        assert!(matches!(outcome, PlanOutcome::NoPlanWithinHorizon));
        let (_, outcome) = solve(text, 9);
        assert!(matches!(outcome, PlanOutcome::NoPlanWithinHorizon));

        let (puzzle, outcome) = solve(text, 10);
        assert_plan_reaches_goal(&puzzle, &outcome);
    }

    #[test]
    fn test_box_cannot_leave_corner() {
        let (_, outcome) = solve("#####\n#B..#\n#.P.#\n#..G#\n#####", 8);
        assert!(!outcome.is_solved());
    }

    #[test]
    fn test_strict_moves() {
        let puzzle = Puzzle::parse("#######\n#P.B.G#\n#######").unwrap();
        let outcome = SatEncoder::new(&puzzle, 3, CompileOptions { allow_wait: false })
            .solve()
            .unwrap();
        assert_eq!(outcome.moves().unwrap().len(), 3);
        assert_plan_reaches_goal(&puzzle, &outcome);
    }

    #[test]
    fn test_model_satisfies_formula() {
        let puzzle = Puzzle::parse("######\n#P...#\n#.BB.#\n#.GG.#\n######").unwrap();
        let encoder = SatEncoder::new(&puzzle, 6, CompileOptions::default());
        let formula = encoder.encode().unwrap();

        let mut solver = SatSolver::new();
        solver.add_clauses(formula.clauses()).unwrap();
        let solution = solver.solve().unwrap().expect("two boxes fit in six moves");
        assert!(formula.is_satisfied_by(&solution.assignment));
    }

    struct FixedBackend {
        result: SokobanResult<Option<SolverSolution>>,
        clauses: usize,
    }

    impl SatBackend for FixedBackend {
        fn add_clause(&mut self, _clause: &Clause) -> SokobanResult<()> {
            self.clauses += 1;
            Ok(())
        }

        fn solve(&mut self) -> SokobanResult<Option<SolverSolution>> {
            self.result.clone()
        }
    }

    #[test]
    fn test_boundary_failure_propagates() {
        let puzzle = Puzzle::parse("P.G\n.B.").unwrap();
        let mut backend = FixedBackend {
            result: Err(SokobanError::SolverBoundaryFailure("out of memory".to_string())),
            clauses: 0,
        };
        let err = SatEncoder::new(&puzzle, 2, CompileOptions::default())
            .solve_with(&mut backend)
            .unwrap_err();
        assert_eq!(err, SokobanError::SolverBoundaryFailure("out of memory".to_string()));
        assert!(backend.clauses > 0);
    }

    #[test]
    fn test_inconsistent_model_is_invariant_violation() {
        let puzzle = Puzzle::parse("P.G\n.B.").unwrap();
        let mut backend = FixedBackend {
            result: Ok(Some(SolverSolution::from_literals(&[1]))),
            clauses: 0,
        };
        let err = SatEncoder::new(&puzzle, 1, CompileOptions::default())
            .solve_with(&mut backend)
            .unwrap_err();
        assert!(matches!(err, SokobanError::InternalInvariantViolation(_)));
    }
}
