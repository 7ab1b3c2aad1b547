//! File I/O for puzzle grids

use super::Puzzle;
use anyhow::{Context, Result};
use std::path::Path;

/// Load a puzzle from a text file
/// Format: one row per line using `#`, `.`, `P`, `B`, `G`, `*` and `+`
pub fn load_puzzle_from_file<P: AsRef<Path>>(path: P) -> Result<Puzzle> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read puzzle file: {}", path.as_ref().display()))?;

    Puzzle::parse(&content)
        .with_context(|| format!("Failed to parse puzzle from file: {}", path.as_ref().display()))
}

/// Save a puzzle to a text file
pub fn save_puzzle_to_file<P: AsRef<Path>>(puzzle: &Puzzle, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, puzzle.to_string())
        .with_context(|| format!("Failed to write puzzle to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Example puzzles written by `setup`, with a horizon that admits a plan
pub const EXAMPLE_PUZZLES: [(&str, &str, usize); 4] = [
    ("diagonal", "P..\n.B.\n..G\n", 5),
    ("corridor", "#######\n#P.B.G#\n#######\n", 3),
    ("two_boxes", "######\n#P...#\n#.BB.#\n#.GG.#\n######\n", 5),
    ("solved", "####\n#P*#\n####\n", 0),
];

/// Create example puzzle files
pub fn create_example_puzzles<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    for (name, content, _) in EXAMPLE_PUZZLES {
        let path = dir.join(format!("{}.txt", name));
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Cell;
    use tempfile::tempdir;

    #[test]
    fn test_file_operations() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("nested/puzzle.txt");

        let saved = Puzzle::parse("#####\n#P.B#\n#..G#\n#####").unwrap();
        save_puzzle_to_file(&saved, &file_path).unwrap();

        let loaded = load_puzzle_from_file(&file_path).unwrap();
        assert_eq!(saved, loaded);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempdir().unwrap();
        let err = load_puzzle_from_file(temp_dir.path().join("absent.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read puzzle file"));
    }

    #[test]
    fn test_create_example_puzzles() {
        let temp_dir = tempdir().unwrap();
        create_example_puzzles(temp_dir.path()).unwrap();

        for (name, _, _) in EXAMPLE_PUZZLES {
            assert!(temp_dir.path().join(format!("{}.txt", name)).exists());
        }

        let corridor = load_puzzle_from_file(temp_dir.path().join("corridor.txt")).unwrap();
        assert_eq!(corridor.player_start(), Cell::new(1, 1));
        assert_eq!(corridor.box_count(), 1);
    }
}
