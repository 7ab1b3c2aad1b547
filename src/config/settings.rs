//! Configuration settings for the Sokoban SAT planner

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub planning: PlanningConfig,
    pub solver: SolverConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Maximum number of moves T
    pub horizon: usize,
    /// Let the player stay in place for a step
    #[serde(default = "default_allow_wait")]
    pub allow_wait: bool,
}

fn default_allow_wait() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Write the compiled CNF here before solving
    #[serde(default)]
    pub export_dimacs: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    Cadical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub puzzle_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: PathBuf,
    #[serde(default)]
    pub show_trace: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            planning: PlanningConfig {
                horizon: 10,
                allow_wait: true,
            },
            solver: SolverConfig {
                backend: SolverBackend::Cadical,
                export_dimacs: None,
            },
            input: InputConfig {
                puzzle_file: PathBuf::from("input/puzzles/diagonal.txt"),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: PathBuf::from("output/plans"),
                show_trace: false,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings. A horizon of zero is legal.
    pub fn validate(&self) -> Result<()> {
        if !self.input.puzzle_file.exists() {
            anyhow::bail!("Puzzle file does not exist: {}", self.input.puzzle_file.display());
        }

        if let Some(ref dimacs) = self.solver.export_dimacs {
            if dimacs.is_dir() {
                anyhow::bail!("DIMACS export path is a directory: {}", dimacs.display());
            }
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(horizon) = cli_overrides.horizon {
            self.planning.horizon = horizon;
        }
        if cli_overrides.strict_moves {
            self.planning.allow_wait = false;
        }
        if let Some(ref puzzle_file) = cli_overrides.puzzle_file {
            self.input.puzzle_file = puzzle_file.clone();
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
        if let Some(ref dimacs) = cli_overrides.dimacs {
            self.solver.export_dimacs = Some(dimacs.clone());
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub horizon: Option<usize>,
    pub strict_moves: bool,
    pub puzzle_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub dimacs: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_yaml_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config/default.yaml");

        let mut settings = Settings::default();
        settings.planning.horizon = 7;
        settings.output.format = OutputFormat::Json;
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.planning.horizon, 7);
        assert!(loaded.planning.allow_wait);
        assert_eq!(loaded.output.format, OutputFormat::Json);
        assert_eq!(loaded.solver.backend, SolverBackend::Cadical);
    }

    #[test]
    fn test_optional_fields_default() {
        let yaml = r#"
planning:
  horizon: 3
solver:
  backend: cadical
input:
  puzzle_file: puzzle.txt
output:
  format: text
  output_directory: out
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.planning.allow_wait);
        assert!(settings.solver.export_dimacs.is_none());
        assert!(!settings.output.show_trace);
    }

    #[test]
    fn test_validate_missing_puzzle() {
        let mut settings = Settings::default();
        settings.input.puzzle_file = PathBuf::from("/nonexistent/puzzle.txt");
        assert!(settings.validate().is_err());

        let temp_dir = tempdir().unwrap();
        let puzzle = temp_dir.path().join("p.txt");
        std::fs::write(&puzzle, "P.\n").unwrap();
        settings.input.puzzle_file = puzzle;
        settings.planning.horizon = 0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_merge_with_cli() {
        let mut settings = Settings::default();
        let overrides = CliOverrides {
            horizon: Some(12),
            strict_moves: true,
            puzzle_file: Some(PathBuf::from("level.txt")),
            output_dir: None,
            dimacs: Some(PathBuf::from("level.cnf")),
        };
        settings.merge_with_cli(&overrides);

        assert_eq!(settings.planning.horizon, 12);
        assert!(!settings.planning.allow_wait);
        assert_eq!(settings.input.puzzle_file, PathBuf::from("level.txt"));
        assert_eq!(settings.output.output_directory, PathBuf::from("output/plans"));
        assert_eq!(settings.solver.export_dimacs, Some(PathBuf::from("level.cnf")));
    }
}
