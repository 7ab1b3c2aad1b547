//! DIMACS CNF export, for running the formula through an external solver

use super::constraints::Formula;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Write `formula` in DIMACS CNF format
pub fn write_dimacs<W: Write>(formula: &Formula, mut out: W) -> std::io::Result<()> {
    let stats = formula.statistics();
    writeln!(
        out,
        "c sokoban {}x{} horizon {} boxes {}",
        stats.rows, stats.cols, stats.horizon, stats.boxes
    )?;
    writeln!(out, "p cnf {} {}", formula.num_variables(), formula.clause_count())?;

    for clause in formula.clauses() {
        for literal in &clause.literals {
            write!(out, "{} ", literal)?;
        }
        writeln!(out, "0")?;
    }
    out.flush()
}

/// Save `formula` to a DIMACS file, creating parent directories
pub fn save_dimacs<P: AsRef<Path>>(formula: &Formula, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create DIMACS file: {}", path.display()))?;
    write_dimacs(formula, std::io::BufWriter::new(file))
        .with_context(|| format!("Failed to write DIMACS file: {}", path.display()))
}
