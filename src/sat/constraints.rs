//! Constraint generation for the Sokoban SAT encoding

use super::variables::{AuxiliaryAllocator, VariableEncoder};
use crate::error::SokobanResult;
use crate::puzzle::{Cell, Direction, Puzzle};
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: i32) -> Self {
        Self { literals: vec![literal] }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    /// True if some literal agrees with the assignment (missing variables count as false)
    pub fn is_satisfied_by(&self, assignment: &HashMap<i32, bool>) -> bool {
        self.literals.iter().any(|&lit| {
            let value = assignment.get(&lit.abs()).copied().unwrap_or(false);
            value == (lit > 0)
        })
    }
}

/// The constraint families emitted by the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClauseFamily {
    InitialState,
    MutualExclusion,
    Totality,
    CoLocation,
    PlayerAdjacency,
    PushLegality,
    PushIntoWall,
    PushIntoBox,
    /// Frame clauses together with the push-event definitions they use
    Inertia,
    Goal,
}

impl ClauseFamily {
    pub const ALL: [ClauseFamily; 10] = [
        ClauseFamily::InitialState,
        ClauseFamily::MutualExclusion,
        ClauseFamily::Totality,
        ClauseFamily::CoLocation,
        ClauseFamily::PlayerAdjacency,
        ClauseFamily::PushLegality,
        ClauseFamily::PushIntoWall,
        ClauseFamily::PushIntoBox,
        ClauseFamily::Inertia,
        ClauseFamily::Goal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClauseFamily::InitialState => "initial state",
            ClauseFamily::MutualExclusion => "mutual exclusion",
            ClauseFamily::Totality => "totality",
            ClauseFamily::CoLocation => "co-location",
            ClauseFamily::PlayerAdjacency => "player adjacency",
            ClauseFamily::PushLegality => "push legality",
            ClauseFamily::PushIntoWall => "push into wall",
            ClauseFamily::PushIntoBox => "push into box",
            ClauseFamily::Inertia => "inertia",
            ClauseFamily::Goal => "goal",
        }
    }
}

impl fmt::Display for ClauseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options that change the shape of the encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Let the player keep its cell for a step
    pub allow_wait: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { allow_wait: true }
    }
}

/// A compiled formula, grouped by constraint family
#[derive(Debug, Clone)]
pub struct Formula {
    groups: Vec<(ClauseFamily, Vec<Clause>)>,
    encoder: VariableEncoder,
    num_variables: usize,
    auxiliary_variables: usize,
    free_cells: usize,
}

impl Formula {
    /// All clauses, family by family
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.groups.iter().flat_map(|(_, clauses)| clauses.iter())
    }

    /// Clauses of one family
    pub fn family(&self, family: ClauseFamily) -> &[Clause] {
        self.groups
            .iter()
            .find(|(f, _)| *f == family)
            .map_or(&[], |(_, clauses)| clauses.as_slice())
    }

    pub fn clause_count(&self) -> usize {
        self.groups.iter().map(|(_, clauses)| clauses.len()).sum()
    }

    /// Highest variable id in use
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// The layout the formula was compiled with
    pub fn encoder(&self) -> &VariableEncoder {
        &self.encoder
    }

    /// Check a full assignment against every clause
    pub fn is_satisfied_by(&self, assignment: &HashMap<i32, bool>) -> bool {
        self.clauses().all(|clause| clause.is_satisfied_by(assignment))
    }

    pub fn statistics(&self) -> FormulaStatistics {
        let (rows, cols, horizon, boxes) = self.encoder.dimensions();
        FormulaStatistics {
            rows,
            cols,
            horizon,
            boxes,
            free_cells: self.free_cells,
            player_variables: self.encoder.player_variable_count(),
            box_variables: self.encoder.domain_variable_count() - self.encoder.player_variable_count(),
            auxiliary_variables: self.auxiliary_variables,
            total_variables: self.num_variables,
            family_counts: self
                .groups
                .iter()
                .map(|(family, clauses)| (*family, clauses.len()))
                .collect(),
            total_clauses: self.clause_count(),
        }
    }
}

/// Compiles one puzzle and horizon into CNF
///
/// Owns the clause list and the auxiliary allocator for a single
/// compilation, so independent instances never share state.
pub struct ConstraintCompiler<'a> {
    puzzle: &'a Puzzle,
    encoder: VariableEncoder,
    auxiliary: AuxiliaryAllocator,
    options: CompileOptions,
    free_cells: Vec<Cell>,
    groups: Vec<(ClauseFamily, Vec<Clause>)>,
}

impl<'a> ConstraintCompiler<'a> {
    /// Create a compiler for `puzzle` unrolled over `horizon` steps
    pub fn new(puzzle: &'a Puzzle, horizon: usize, options: CompileOptions) -> SokobanResult<Self> {
        let encoder = VariableEncoder::for_puzzle(puzzle, horizon)?;
        let auxiliary = encoder.auxiliary_allocator();

        Ok(Self {
            puzzle,
            encoder,
            auxiliary,
            options,
            free_cells: puzzle.free_cells(),
            groups: ClauseFamily::ALL.iter().map(|&f| (f, Vec::new())).collect(),
        })
    }

    fn emit(&mut self, family: ClauseFamily, clause: Clause) {
        self.groups[family as usize].1.push(clause);
    }

    fn player(&self, cell: Cell, t: usize) -> SokobanResult<i32> {
        self.encoder.player_var(cell, t)
    }

    fn boxed(&self, index: usize, cell: Cell, t: usize) -> SokobanResult<i32> {
        self.encoder.box_var(index, cell, t)
    }

    /// Generate every constraint family and hand back the formula
    pub fn compile(mut self) -> SokobanResult<Formula> {
        let horizon = self.encoder.horizon();

        self.generate_initial_state()?;
        for t in 0..=horizon {
            self.generate_mutual_exclusion(t)?;
            self.generate_totality(t)?;
            self.generate_co_location(t)?;
        }
        for t in 0..horizon {
            self.generate_player_adjacency(t)?;
            self.generate_push_constraints(t)?;
            self.generate_inertia(t)?;
        }
        self.generate_goal()?;

        for (family, clauses) in &self.groups {
            debug!(family = %family, clauses = clauses.len(), "generated constraint family");
        }

        Ok(Formula {
            groups: self.groups,
            encoder: self.encoder,
            num_variables: self.auxiliary.max_variable(),
            auxiliary_variables: self.auxiliary.allocated(),
            free_cells: self.free_cells.len(),
        })
    }

    /// Unit clauses fixing the player and every box at t = 0
    fn generate_initial_state(&mut self) -> SokobanResult<()> {
        let player = self.player(self.puzzle.player_start(), 0)?;
        self.emit(ClauseFamily::InitialState, Clause::unit(player));

        for (b, &start) in self.puzzle.box_starts().iter().enumerate() {
            let var = self.boxed(b, start, 0)?;
            self.emit(ClauseFamily::InitialState, Clause::unit(var));
        }
        Ok(())
    }

    /// Pairwise at-most-one cell for the player and for each box
    fn generate_mutual_exclusion(&mut self, t: usize) -> SokobanResult<()> {
        let pairs: Vec<(Cell, Cell)> = self.free_cells.iter().copied().tuple_combinations().collect();

        for (c1, c2) in pairs {
            let clause = Clause::binary(-self.player(c1, t)?, -self.player(c2, t)?);
            self.emit(ClauseFamily::MutualExclusion, clause);

            for b in 0..self.puzzle.box_count() {
                let clause = Clause::binary(-self.boxed(b, c1, t)?, -self.boxed(b, c2, t)?);
                self.emit(ClauseFamily::MutualExclusion, clause);
            }
        }
        Ok(())
    }

    /// The player and each box stand on at least one free cell
    fn generate_totality(&mut self, t: usize) -> SokobanResult<()> {
        let player = self
            .free_cells
            .iter()
            .map(|&c| self.player(c, t))
            .collect::<SokobanResult<Vec<_>>>()?;
        self.emit(ClauseFamily::Totality, Clause::new(player));

        for b in 0..self.puzzle.box_count() {
            let boxed = self
                .free_cells
                .iter()
                .map(|&c| self.boxed(b, c, t))
                .collect::<SokobanResult<Vec<_>>>()?;
            self.emit(ClauseFamily::Totality, Clause::new(boxed));
        }
        Ok(())
    }

    /// No cell holds the player and a box, or two boxes, at once
    fn generate_co_location(&mut self, t: usize) -> SokobanResult<()> {
        let boxes = self.puzzle.box_count();

        for i in 0..self.free_cells.len() {
            let cell = self.free_cells[i];
            let player = self.player(cell, t)?;

            for b in 0..boxes {
                let clause = Clause::binary(-player, -self.boxed(b, cell, t)?);
                self.emit(ClauseFamily::CoLocation, clause);
            }
            for (b1, b2) in (0..boxes).tuple_combinations() {
                let clause = Clause::binary(-self.boxed(b1, cell, t)?, -self.boxed(b2, cell, t)?);
                self.emit(ClauseFamily::CoLocation, clause);
            }
        }
        Ok(())
    }

    /// The player's cell at t + 1 is reachable in one step from its cell at t
    fn generate_player_adjacency(&mut self, t: usize) -> SokobanResult<()> {
        for i in 0..self.free_cells.len() {
            let cell = self.free_cells[i];
            let mut literals = vec![-self.player(cell, t + 1)?];

            if self.options.allow_wait {
                literals.push(self.player(cell, t)?);
            }
            for direction in Direction::ALL {
                if let Some(previous) = self.puzzle.free_step(cell, direction.opposite(), 1) {
                    literals.push(self.player(previous, t)?);
                }
            }

            self.emit(ClauseFamily::PlayerAdjacency, Clause::new(literals));
        }
        Ok(())
    }

    /// Push effects, pushes into walls and pushes into other boxes
    fn generate_push_constraints(&mut self, t: usize) -> SokobanResult<()> {
        let boxes = self.puzzle.box_count();

        for i in 0..self.free_cells.len() {
            let cell = self.free_cells[i];
            for direction in Direction::ALL {
                let Some(next) = self.puzzle.free_step(cell, direction, 1) else {
                    continue;
                };
                let from = -self.player(cell, t)?;
                let into = -self.player(next, t + 1)?;

                match self.puzzle.free_step(cell, direction, 2) {
                    Some(beyond) => {
                        for b in 0..boxes {
                            let clause = Clause::new(vec![
                                from,
                                -self.boxed(b, next, t)?,
                                into,
                                self.boxed(b, beyond, t + 1)?,
                            ]);
                            self.emit(ClauseFamily::PushLegality, clause);
                        }
                        for (b1, b2) in (0..boxes).tuple_combinations() {
                            for (pushed, blocker) in [(b1, b2), (b2, b1)] {
                                let clause = Clause::new(vec![
                                    from,
                                    -self.boxed(pushed, next, t)?,
                                    -self.boxed(blocker, beyond, t)?,
                                    into,
                                ]);
                                self.emit(ClauseFamily::PushIntoBox, clause);
                            }
                        }
                    }
                    None => {
                        for b in 0..boxes {
                            let clause = Clause::new(vec![from, -self.boxed(b, next, t)?, into]);
                            self.emit(ClauseFamily::PushIntoWall, clause);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Frame axioms: a box stays put unless the player stepped into its cell
    fn generate_inertia(&mut self, t: usize) -> SokobanResult<()> {
        let boxes = self.puzzle.box_count();
        if boxes == 0 {
            return Ok(());
        }

        for i in 0..self.free_cells.len() {
            let cell = self.free_cells[i];
            let entered = self.player(cell, t + 1)?;

            // pushed_from <-> player(previous, t) & player(cell, t + 1)
            let mut push_events = Vec::with_capacity(Direction::ALL.len());
            for direction in Direction::ALL {
                let Some(previous) = self.puzzle.free_step(cell, direction.opposite(), 1) else {
                    continue;
                };
                let origin = self.player(previous, t)?;
                let pushed_from = self.auxiliary.fresh()?;

                self.emit(ClauseFamily::Inertia, Clause::new(vec![-origin, -entered, pushed_from]));
                self.emit(ClauseFamily::Inertia, Clause::binary(origin, -pushed_from));
                self.emit(ClauseFamily::Inertia, Clause::binary(entered, -pushed_from));
                push_events.push(pushed_from);
            }

            for b in 0..boxes {
                let mut literals = Vec::with_capacity(push_events.len() + 2);
                literals.push(-self.boxed(b, cell, t)?);
                literals.extend_from_slice(&push_events);
                literals.push(self.boxed(b, cell, t + 1)?);
                self.emit(ClauseFamily::Inertia, Clause::new(literals));
            }
        }
        Ok(())
    }

    /// Every box ends on some goal cell at t = T
    fn generate_goal(&mut self) -> SokobanResult<()> {
        let horizon = self.encoder.horizon();
        for b in 0..self.puzzle.box_count() {
            let literals = self
                .puzzle
                .goals()
                .iter()
                .map(|&g| self.boxed(b, g, horizon))
                .collect::<SokobanResult<Vec<_>>>()?;
            self.emit(ClauseFamily::Goal, Clause::new(literals));
        }
        Ok(())
    }
}

/// Statistics about a compiled formula
#[derive(Debug, Clone)]
pub struct FormulaStatistics {
    pub rows: usize,
    pub cols: usize,
    pub horizon: usize,
    pub boxes: usize,
    pub free_cells: usize,
    pub player_variables: usize,
    pub box_variables: usize,
    pub auxiliary_variables: usize,
    pub total_variables: usize,
    pub family_counts: Vec<(ClauseFamily, usize)>,
    pub total_clauses: usize,
}

impl fmt::Display for FormulaStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Formula Statistics:")?;
        writeln!(f, "  Grid size: {}x{} ({} free cells)", self.rows, self.cols, self.free_cells)?;
        writeln!(f, "  Horizon: {}", self.horizon)?;
        writeln!(f, "  Boxes: {}", self.boxes)?;
        writeln!(
            f,
            "  Variables: {} (player {}, box {}, auxiliary {})",
            self.total_variables, self.player_variables, self.box_variables, self.auxiliary_variables
        )?;
        writeln!(f, "  Clauses: {}", self.total_clauses)?;
        for (family, count) in &self.family_counts {
            writeln!(f, "    {:<18} {}", family.name(), count)?;
        }
        Ok(())
    }
}
