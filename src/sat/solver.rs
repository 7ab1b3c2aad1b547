//! SAT solver integration using CaDiCaL

use super::constraints::Clause;
use crate::error::{SokobanError, SokobanResult};
use cadical::Solver;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// The external solving procedure: clauses in, UNSAT or one model out
pub trait SatBackend {
    /// Add a single clause
    fn add_clause(&mut self, clause: &Clause) -> SokobanResult<()>;

    /// `Ok(None)` means unsatisfiable; `Err` is a boundary failure
    fn solve(&mut self) -> SokobanResult<Option<SolverSolution>>;

    /// Add clauses in order
    fn add_clauses<'c, I>(&mut self, clauses: I) -> SokobanResult<()>
    where
        I: IntoIterator<Item = &'c Clause>,
        Self: Sized,
    {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }
}

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    /// Set once an empty clause has been added
    contradiction: bool,
}

/// Result of SAT solving
#[derive(Debug, Clone)]
pub struct SolverSolution {
    pub assignment: HashMap<i32, bool>,
    pub solve_time: Duration,
}

impl SolverSolution {
    /// Build a solution from signed literals, e.g. a DIMACS `v` line
    pub fn from_literals(literals: &[i32]) -> Self {
        let assignment = literals
            .iter()
            .filter(|&&lit| lit != 0)
            .map(|&lit| (lit.abs(), lit > 0))
            .collect();
        Self {
            assignment,
            solve_time: Duration::ZERO,
        }
    }

    /// Variables assigned true, sorted
    pub fn true_variables(&self) -> Vec<i32> {
        let mut vars: Vec<i32> = self
            .assignment
            .iter()
            .filter_map(|(&var, &value)| value.then_some(var))
            .collect();
        vars.sort_unstable();
        vars
    }
}

impl SatSolver {
    /// Create a new SAT solver instance
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            contradiction: false,
        }
    }

    /// Extract variable assignment from the solver
    fn extract_assignment(&self) -> HashMap<i32, bool> {
        let mut assignment = HashMap::with_capacity(self.variable_count);

        for var in 1..=self.variable_count as i32 {
            if let Some(value) = self.solver.value(var) {
                assignment.insert(var, value);
            }
        }

        assignment
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for SatSolver {
    fn add_clause(&mut self, clause: &Clause) -> SokobanResult<()> {
        if clause.literals.contains(&0) {
            return Err(SokobanError::SolverBoundaryFailure(
                "literal 0 is reserved as the clause terminator".to_string(),
            ));
        }

        self.clause_count += 1;
        if clause.is_empty() {
            // An empty clause is unsatisfiable on its own
            self.contradiction = true;
            return Ok(());
        }

        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());
        Ok(())
    }

    fn solve(&mut self) -> SokobanResult<Option<SolverSolution>> {
        if self.contradiction {
            debug!("formula contains an empty clause");
            return Ok(None);
        }

        let start_time = Instant::now();
        let result = self.solver.solve();
        let solve_time = start_time.elapsed();
        debug!(
            variables = self.variable_count,
            clauses = self.clause_count,
            elapsed_ms = solve_time.as_millis() as u64,
            ?result,
            "solver finished"
        );

        match result {
            Some(true) => Ok(Some(SolverSolution {
                assignment: self.extract_assignment(),
                solve_time,
            })),
            Some(false) => Ok(None),
            None => Err(SokobanError::SolverBoundaryFailure(
                "solver stopped without a result".to_string(),
            )),
        }
    }
}

impl std::fmt::Display for SolverSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solution:")?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        writeln!(f, "  Variables assigned: {}", self.assignment.len())?;

        let vars = self.true_variables();
        write!(f, "  True variables: ")?;
        for (i, var) in vars.iter().take(10).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", var)?;
        }
        if vars.len() > 10 {
            write!(f, ", ...")?;
        }
        writeln!(f)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_creation() {
        let solver = SatSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut solver = SatSolver::new();

        // x1 ∨ x2, ¬x1 ∨ x2
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();
        solver.add_clause(&Clause::new(vec![-1, 2])).unwrap();

        let solution = solver.solve().unwrap();
        assert!(solution.is_some());

        let assignment = solution.unwrap().assignment;
        assert_eq!(assignment.get(&2), Some(&true));
    }

    #[test]
    fn test_unsatisfiable() {
        let mut solver = SatSolver::new();

        solver.add_clause(&Clause::unit(1)).unwrap();
        solver.add_clause(&Clause::unit(-1)).unwrap();

        let solution = solver.solve().unwrap();
        assert!(solution.is_none());
    }

    #[test]
    fn test_empty_clause_is_unsatisfiable() {
        let mut solver = SatSolver::new();
        solver.add_clauses(&[Clause::unit(3), Clause::new(vec![])]).unwrap();

        assert_eq!(solver.clause_count(), 2);
        assert!(solver.solve().unwrap().is_none());
    }

    #[test]
    fn test_zero_literal_rejected() {
        let mut solver = SatSolver::new();
        let err = solver.add_clause(&Clause::new(vec![1, 0])).unwrap_err();
        assert!(matches!(err, SokobanError::SolverBoundaryFailure(_)));
    }

    #[test]
    fn test_variable_count_tracking() {
        let mut solver = SatSolver::new();

        solver.add_clause(&Clause::new(vec![1, -5, 3])).unwrap();
        assert_eq!(solver.variable_count(), 5);

        solver.add_clause(&Clause::new(vec![2, -7])).unwrap();
        assert_eq!(solver.variable_count(), 7);
    }

    #[test]
    fn test_solution_from_literals() {
        let solution = SolverSolution::from_literals(&[1, -2, 3, 0]);
        assert_eq!(solution.assignment.len(), 3);
        assert_eq!(solution.assignment.get(&2), Some(&false));
        assert_eq!(solution.true_variables(), vec![1, 3]);
    }
}
