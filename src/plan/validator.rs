//! Plan validation by replaying moves with the direct push rules

use crate::puzzle::{apply_move, Direction, IllegalMove, Puzzle, State};
use std::time::Instant;

/// Validates move sequences against a puzzle
pub struct PlanValidator<'a> {
    puzzle: &'a Puzzle,
}

/// Result of plan validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Every move was legal and every box ended on a goal
    pub is_valid: bool,
    /// States visited, initial state first, up to the first illegal move
    pub states: Vec<State>,
    pub error_message: Option<String>,
    pub details: ValidationDetails,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationDetails {
    pub moves_checked: usize,
    /// Index and cause of the first illegal move
    pub illegal_move: Option<(usize, IllegalMove)>,
    pub boxes_on_goals: usize,
    pub box_count: usize,
    pub validation_time_ms: u64,
}

impl<'a> PlanValidator<'a> {
    pub fn new(puzzle: &'a Puzzle) -> Self {
        Self { puzzle }
    }

    /// Replay `moves` from the initial state
    pub fn validate(&self, moves: &[Direction]) -> ValidationResult {
        let start_time = Instant::now();
        let mut states = vec![State::initial(self.puzzle)];
        let mut illegal_move = None;

        for (i, &direction) in moves.iter().enumerate() {
            let current = &states[states.len() - 1];
            match apply_move(self.puzzle, current, direction) {
                Ok(next) => states.push(next),
                Err(cause) => {
                    illegal_move = Some((i, cause));
                    break;
                }
            }
        }

        let final_state = &states[states.len() - 1];
        let boxes_on_goals = final_state.boxes_on_goals(self.puzzle);
        let box_count = self.puzzle.box_count();
        let is_valid = illegal_move.is_none() && boxes_on_goals == box_count;

        let details = ValidationDetails {
            moves_checked: states.len() - 1,
            illegal_move,
            boxes_on_goals,
            box_count,
            validation_time_ms: start_time.elapsed().as_millis() as u64,
        };

        let error_message = if is_valid {
            None
        } else {
            Some(Self::generate_error_message(moves, &details))
        };

        ValidationResult {
            is_valid,
            states,
            error_message,
            details,
        }
    }

    /// Check that a decoded trace is consistent with its move sequence
    ///
    /// Waiting steps in the trace are skipped, so the trace with repeated
    /// states removed must equal the replayed states.
    pub fn trace_matches(&self, moves: &[Direction], trace: &[State]) -> bool {
        let result = self.validate(moves);
        if result.details.illegal_move.is_some() {
            return false;
        }

        let mut collapsed: Vec<&State> = Vec::with_capacity(trace.len());
        for state in trace {
            if collapsed.last() != Some(&state) {
                collapsed.push(state);
            }
        }

        collapsed.len() == result.states.len() && collapsed.iter().zip(&result.states).all(|(a, b)| *a == b)
    }

    fn generate_error_message(moves: &[Direction], details: &ValidationDetails) -> String {
        let mut message = String::new();

        if let Some((index, cause)) = details.illegal_move {
            message.push_str(&format!(
                "Move {} ({}) is illegal: {}. ",
                index + 1,
                moves[index],
                cause
            ));
        }

        if details.boxes_on_goals < details.box_count {
            message.push_str(&format!(
                "{} of {} boxes on goals.",
                details.boxes_on_goals, details.box_count
            ));
        }

        message.trim_end().to_string()
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Validation Result: {}", if self.is_valid { "VALID" } else { "INVALID" })?;

        if let Some(ref error) = self.error_message {
            writeln!(f, "Error: {}", error)?;
        }

        writeln!(f, "Moves checked: {}", self.details.moves_checked)?;
        writeln!(f, "Boxes on goals: {}/{}", self.details.boxes_on_goals, self.details.box_count)?;
        writeln!(f, "Validation time: {}ms", self.details.validation_time_ms)?;

        Ok(())
    }
}
