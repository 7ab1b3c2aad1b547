//! Configuration management for the Sokoban SAT planner

pub mod settings;

pub use settings::{
    CliOverrides, InputConfig, OutputConfig, OutputFormat, PlanningConfig, Settings, SolverBackend,
    SolverConfig,
};
