//! Main CLI application for the Sokoban SAT planner

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sokoban_sat::{
    config::{CliOverrides, Settings},
    plan::{PlanValidator, PlanningProblem},
    puzzle::{create_example_puzzles, load_puzzle_from_file, parse_moves, EXAMPLE_PUZZLES},
    utils::{ColorOutput, PlanFormatter},
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sokoban_sat")]
#[command(about = "Bounded-horizon Sokoban planner using SAT")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a plan of at most T moves
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Puzzle file (overrides config)
        #[arg(short, long)]
        puzzle: Option<PathBuf>,

        /// Maximum number of moves (overrides config)
        #[arg(short = 't', long)]
        horizon: Option<usize>,

        /// Require the player to move on every step
        #[arg(long)]
        strict_moves: bool,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the CNF formula to this file
        #[arg(long)]
        dimacs: Option<PathBuf>,

        /// Show the board at every step
        #[arg(long)]
        show_trace: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create example configuration and puzzle files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Check a move sequence against a puzzle
    Validate {
        /// Puzzle file
        #[arg(short, long)]
        puzzle: PathBuf,

        /// Moves as a string of U, D, L, R
        #[arg(short, long)]
        moves: String,

        /// Show the board after every move
        #[arg(long)]
        show_trace: bool,
    },

    /// Report formula size without solving
    Analyze {
        /// Puzzle file
        #[arg(short, long)]
        puzzle: PathBuf,

        /// Maximum number of moves
        #[arg(short = 't', long)]
        horizon: usize,

        /// Require the player to move on every step
        #[arg(long)]
        strict_moves: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            config,
            puzzle,
            horizon,
            strict_moves,
            output,
            dimacs,
            show_trace,
            verbose,
        } => {
            init_tracing(verbose);
            let overrides = CliOverrides {
                horizon,
                strict_moves,
                puzzle_file: puzzle,
                output_dir: output,
                dimacs,
            };
            solve_command(config, overrides, show_trace, verbose)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Validate {
            puzzle,
            moves,
            show_trace,
        } => validate_command(puzzle, moves, show_trace),
        Commands::Analyze {
            puzzle,
            horizon,
            strict_moves,
        } => analyze_command(puzzle, horizon, strict_moves),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{}", ColorOutput::warning(&format!("Failed to set tracing subscriber: {}", e)));
    }
}

fn solve_command(config_path: PathBuf, overrides: CliOverrides, show_trace: bool, verbose: bool) -> Result<()> {
    println!("{}", ColorOutput::info("📦 Starting Sokoban SAT Planner"));

    let mut settings = if config_path.exists() {
        Settings::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!("Config file {} not found, using defaults", config_path.display()))
        );
        Settings::default()
    };
    settings.merge_with_cli(&overrides);

    if verbose {
        println!("Configuration:");
        println!("  Horizon: {}", settings.planning.horizon);
        println!("  Allow wait: {}", settings.planning.allow_wait);
        println!("  Puzzle file: {}", settings.input.puzzle_file.display());
        println!("  Output dir: {}", settings.output.output_directory.display());
        println!();
    }

    settings.validate().context("Configuration validation failed")?;

    let start_time = Instant::now();
    let problem = PlanningProblem::new(settings.clone()).context("Failed to create planning problem")?;
    problem
        .puzzle()
        .check_goal_capacity()
        .context("Puzzle cannot be solved")?;

    println!("{}", problem.puzzle());
    println!("{}", ColorOutput::info("🧮 Generating SAT constraints and solving..."));
    let plan = problem.solve().context("Failed to solve puzzle")?;
    let total_time = start_time.elapsed();

    let Some(plan) = plan else {
        println!(
            "{}",
            ColorOutput::warning(&format!("❌ No plan within {} moves", settings.planning.horizon))
        );
        return Ok(());
    };

    println!(
        "{}",
        ColorOutput::success(&format!(
            "✅ Found a plan of {} moves in {:.3}s",
            plan.metadata.move_count,
            total_time.as_secs_f64()
        ))
    );
    println!("{}", PlanFormatter::format_plan(&plan, show_trace || settings.output.show_trace));

    println!("{}", ColorOutput::info("💾 Saving plan..."));
    PlanFormatter::save_plans(&[plan], &settings.output.output_directory, settings.output.format)
        .context("Failed to save plan")?;
    println!(
        "{}",
        ColorOutput::success(&format!("Plan saved to {}", settings.output.output_directory.display()))
    );

    if verbose {
        println!("\n{}", problem.encoding_statistics()?);
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🛠️  Setting up project structure..."));

    let config_dir = directory.join("config");
    let input_dir = directory.join("input/puzzles");
    let output_dir = directory.join("output/plans");

    for dir in [&config_dir, &input_dir, &output_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_puzzles(&input_dir).context("Failed to create example puzzles")?;
    println!("Created example puzzles in: {}", input_dir.display());

    // One configuration per example puzzle, with a horizon that admits a plan
    let examples_dir = config_dir.join("examples");
    for (name, _, horizon) in EXAMPLE_PUZZLES {
        let mut settings = Settings::default();
        settings.planning.horizon = horizon;
        settings.input.puzzle_file = PathBuf::from(format!("input/puzzles/{}.txt", name));
        settings.to_file(examples_dir.join(format!("{}.yaml", name)))?;
    }
    println!("Created example configurations in: {}", examples_dir.display());

    println!("\n{}", ColorOutput::success("✅ Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Add your puzzles to {}", input_dir.display());
    println!("3. Run: cargo run -- solve --config config/examples/diagonal.yaml");

    Ok(())
}

fn validate_command(puzzle_path: PathBuf, moves: String, show_trace: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🔍 Validating plan..."));

    let puzzle = load_puzzle_from_file(&puzzle_path)
        .with_context(|| format!("Failed to load puzzle from {}", puzzle_path.display()))?;
    let moves = parse_moves(&moves)
        .with_context(|| format!("Invalid move string '{}': expected only U, D, L, R", moves))?;

    let result = PlanValidator::new(&puzzle).validate(&moves);
    println!("{}", result);

    if show_trace {
        println!("Replay:");
        for (i, state) in result.states.iter().enumerate() {
            println!("After {} moves:", i);
            println!("{}", PlanFormatter::format_board_with_coords(&puzzle, state));
        }
    }

    if result.is_valid {
        println!("{}", ColorOutput::success("✅ Plan is valid!"));
    } else {
        println!("{}", ColorOutput::error("❌ Plan is invalid"));
        if let Some(error) = result.error_message {
            println!("Error: {}", error);
        }
    }

    Ok(())
}

fn analyze_command(puzzle_path: PathBuf, horizon: usize, strict_moves: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🔬 Analyzing puzzle..."));

    let puzzle = load_puzzle_from_file(&puzzle_path)
        .with_context(|| format!("Failed to load puzzle from {}", puzzle_path.display()))?;

    println!("Puzzle ({}x{}):", puzzle.width, puzzle.height);
    println!("{}", puzzle);
    println!("Boxes: {}, goals: {}", puzzle.box_count(), puzzle.goals().len());
    if let Err(e) = puzzle.check_goal_capacity() {
        println!("{}", ColorOutput::warning(&e.to_string()));
    }
    if puzzle.is_solved_at_start() {
        println!("{}", ColorOutput::success("Every box already sits on a goal"));
    }

    let mut settings = Settings::default();
    settings.planning.horizon = horizon;
    settings.planning.allow_wait = !strict_moves;
    settings.input.puzzle_file = puzzle_path;

    let problem = PlanningProblem::with_puzzle(settings, puzzle);
    let stats = problem
        .encoding_statistics()
        .context("Failed to compile puzzle for analysis")?;
    println!("\n{}", stats);

    Ok(())
}
