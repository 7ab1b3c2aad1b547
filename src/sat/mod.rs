//! SAT encoding, solving and decoding for bounded-horizon Sokoban

pub mod constraints;
pub mod decoder;
pub mod dimacs;
pub mod encoder;
pub mod solver;
pub mod variables;

pub use constraints::{Clause, ClauseFamily, CompileOptions, ConstraintCompiler, Formula, FormulaStatistics};
pub use decoder::{moves_from_path, Trace, TraceDecoder};
pub use dimacs::{save_dimacs, write_dimacs};
pub use encoder::{DecodedPlan, PlanOutcome, SatEncoder};
pub use solver::{SatBackend, SatSolver, SolverSolution};
pub use variables::{AuxiliaryAllocator, VariableEncoder, VariableType};
