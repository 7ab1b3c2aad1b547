//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::plan::Plan;
use crate::puzzle::{Puzzle, State};
use anyhow::{Context, Result};
use std::path::Path;

/// Format plans for display
pub struct PlanFormatter;

impl PlanFormatter {
    /// Format a single plan for console output
    pub fn format_plan(plan: &Plan, show_trace: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== Plan {} ===\n", plan.metadata.id));
        output.push_str(&format!("Moves: {}\n", plan.move_string()));
        output.push_str(&format!(
            "Length: {} moves, {} pushes (horizon {})\n",
            plan.metadata.move_count, plan.metadata.push_count, plan.horizon
        ));
        output.push_str(&format!("Solve Time: {:.3}s\n", plan.solve_time.as_secs_f64()));
        output.push('\n');

        if show_trace {
            output.push_str("Trace:\n");
            let mut previous: Option<&State> = None;
            for (t, state) in plan.trace.iter().enumerate() {
                if previous == Some(state) {
                    output.push_str(&format!("Step {}: (wait)\n", t));
                    continue;
                }
                output.push_str(&format!("Step {}:\n", t));
                output.push_str(&state.render(&plan.puzzle));
                output.push('\n');
                previous = Some(state);
            }
        } else {
            output.push_str("Initial State:\n");
            output.push_str(&plan.puzzle.to_string());
            if let Some(last) = plan.final_state() {
                output.push('\n');
                output.push_str("Final State:\n");
                output.push_str(&last.render(&plan.puzzle));
            }
        }

        output
    }

    /// Format a board with row and column numbers
    pub fn format_board_with_coords(puzzle: &Puzzle, state: &State) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for col in 0..puzzle.width {
            output.push_str(&format!("{}", col % 10));
        }
        output.push('\n');

        for (row, line) in state.render(puzzle).lines().enumerate() {
            output.push_str(&format!("{:2} {}\n", row, line));
        }

        output
    }

    /// Save plans to files based on output format
    pub fn save_plans<P: AsRef<Path>>(plans: &[Plan], output_dir: P, format: OutputFormat) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        match format {
            OutputFormat::Text => {
                for (i, plan) in plans.iter().enumerate() {
                    let filepath = output_dir.join(format!("plan_{:03}.txt", i + 1));
                    std::fs::write(&filepath, Self::format_plan(plan, true))
                        .with_context(|| format!("Failed to write {}", filepath.display()))?;
                }
            }
            OutputFormat::Json => {
                for (i, plan) in plans.iter().enumerate() {
                    let filepath = output_dir.join(format!("plan_{:03}.json", i + 1));
                    plan.save_to_file(&filepath)
                        .with_context(|| format!("Failed to write {}", filepath.display()))?;
                }

                let summary_path = output_dir.join("plans_summary.json");
                let summaries: Vec<_> = plans.iter().map(|p| p.summary()).collect();
                let summary_json = serde_json::to_string_pretty(&summaries)?;
                std::fs::write(summary_path, summary_json)?;
            }
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{parse_moves, replay};
    use std::time::Duration;
    use tempfile::tempdir;

    fn corridor_plan() -> Plan {
        let puzzle = Puzzle::parse("#######\n#P.B.G#\n#######").unwrap();
        let moves = parse_moves("RRR").unwrap();
        let mut trace = replay(&puzzle, &moves).unwrap();
        trace.insert(1, trace[0].clone());
        Plan::new(puzzle, 4, moves, trace, Duration::from_millis(3))
    }

    #[test]
    fn test_format_plan() {
        let plan = corridor_plan();

        let short = PlanFormatter::format_plan(&plan, false);
        assert!(short.contains("Moves: RRR"));
        assert!(short.contains("#...P*#"));

        let full = PlanFormatter::format_plan(&plan, true);
        assert!(full.contains("Step 1: (wait)"));
        assert!(full.contains("#..PBG#"));
    }

    #[test]
    fn test_board_with_coords() {
        let puzzle = Puzzle::parse("P.\n.G").unwrap();
        let board = PlanFormatter::format_board_with_coords(&puzzle, &State::initial(&puzzle));
        assert_eq!(board, "   01\n 0 P.\n 1 .G\n");
    }

    #[test]
    fn test_save_plans() {
        let temp_dir = tempdir().unwrap();
        let plans = vec![corridor_plan()];

        PlanFormatter::save_plans(&plans, temp_dir.path(), OutputFormat::Text).unwrap();
        assert!(temp_dir.path().join("plan_001.txt").exists());

        PlanFormatter::save_plans(&plans, temp_dir.path(), OutputFormat::Json).unwrap();
        let loaded = Plan::load_from_file(temp_dir.path().join("plan_001.json")).unwrap();
        assert_eq!(loaded.moves, plans[0].moves);
        assert!(temp_dir.path().join("plans_summary.json").exists());
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));
        assert!(ColorOutput::success("ok").contains("ok"));
    }
}
