//! Plan representation for solved Sokoban instances

use crate::puzzle::{format_moves, Direction, Puzzle, State};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A validated plan for one puzzle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// The puzzle this plan solves
    pub puzzle: Puzzle,
    /// The horizon T the formula was unrolled to
    pub horizon: usize,
    /// Moves in order, waiting steps removed
    pub moves: Vec<Direction>,
    /// Decoded positions at every timestep 0..=T
    pub trace: Vec<State>,
    /// Time the solver spent
    #[serde(skip)]
    pub solve_time: Duration,
    pub metadata: PlanMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub id: String,
    pub move_count: usize,
    pub push_count: usize,
    /// Timesteps where the player stayed in place
    pub wait_steps: usize,
    pub box_count: usize,
}

impl Plan {
    pub fn new(
        puzzle: Puzzle,
        horizon: usize,
        moves: Vec<Direction>,
        trace: Vec<State>,
        solve_time: Duration,
    ) -> Self {
        let metadata = PlanMetadata::analyze(&puzzle, &moves, &trace);

        Self {
            puzzle,
            horizon,
            moves,
            trace,
            solve_time,
            metadata,
        }
    }

    /// Moves as a `UDLR` string
    pub fn move_string(&self) -> String {
        format_moves(&self.moves)
    }

    /// State at timestep `t` of the decoded trace
    pub fn state_at(&self, t: usize) -> Option<&State> {
        self.trace.get(t)
    }

    pub fn final_state(&self) -> Option<&State> {
        self.trace.last()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            id: self.metadata.id.clone(),
            moves: self.move_string(),
            move_count: self.metadata.move_count,
            push_count: self.metadata.push_count,
            horizon: self.horizon,
            solve_time_ms: self.solve_time.as_millis() as u64,
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Render every timestep of the trace
    pub fn format_trace(&self) -> String {
        let mut result = String::new();

        result.push_str(&format!(
            "Plan {} - {} moves within horizon {}\n",
            self.metadata.id, self.metadata.move_count, self.horizon
        ));
        result.push_str(&format!("Moves: {}\n\n", self.move_string()));

        for (t, state) in self.trace.iter().enumerate() {
            result.push_str(&format!("Step {}:\n", t));
            result.push_str(&state.render(&self.puzzle));
            result.push('\n');
        }

        result
    }
}

impl PlanMetadata {
    pub fn analyze(puzzle: &Puzzle, moves: &[Direction], trace: &[State]) -> Self {
        let push_count = trace
            .windows(2)
            .filter(|pair| pair[0].boxes != pair[1].boxes)
            .count();
        let wait_steps = trace
            .windows(2)
            .filter(|pair| pair[0].player == pair[1].player)
            .count();

        Self {
            id: Self::generate_id(puzzle, moves),
            move_count: moves.len(),
            push_count,
            wait_steps,
            box_count: puzzle.box_count(),
        }
    }

    fn generate_id(puzzle: &Puzzle, moves: &[Direction]) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        puzzle.to_string().hash(&mut hasher);
        moves.hash(&mut hasher);

        format!("plan_{:x}", hasher.finish())
    }
}

/// Summary of a plan for display purposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: String,
    pub moves: String,
    pub move_count: usize,
    pub push_count: usize,
    pub horizon: usize,
    pub solve_time_ms: u64,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plan {}: {} moves ({} pushes) within horizon {}, {}ms",
            self.id, self.move_count, self.push_count, self.horizon, self.solve_time_ms
        )
    }
}
