//! Planning problem definition, plans and replay validation

pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::{solve_batch, PlanningProblem};
pub use solution::{Plan, PlanMetadata, PlanSummary};
pub use validator::{PlanValidator, ValidationDetails, ValidationResult};
