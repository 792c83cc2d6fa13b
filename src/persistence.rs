//! # Persistence
//!
//! Reading and writing the plain-text artifacts of a run.
//!
//! Inputs and outputs files hold one comma-separated numeric vector per line;
//! blank lines are skipped and an outputs file contributes its first column. A
//! vocabulary file has exactly three lines: terminals, one-argument functions and
//! two-argument functions, each comma separated (a line may be empty).
//!
//! A run named `name` writes into its output directory:
//!
//! - `name-sol.<ext>`: the winning expression followed by a newline.
//! - `name-gen.<ext>`: one expression per line, in population order.
//! - `name-stats.csv`: `adjustedFitness,rawFitness` per member, in the same order.
//!
//! ## Example
//!
//! ```rust
//! use genprog::persistence;
//!
//! let vectors = persistence::parse_vectors("0,1\n\n2,3\n").unwrap();
//! assert_eq!(vectors, vec![vec![0.0, 1.0], vec![2.0, 3.0]]);
//! ```

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GpError, Result, ResultExt};
use crate::individual::Individual;
use crate::vocabulary::Vocabulary;

/// Parses comma-separated numeric vectors, one per non-blank line.
pub fn parse_vectors(text: &str) -> Result<Vec<Vec<f64>>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            line.split(',')
                .map(|value| {
                    value.trim().parse::<f64>().map_err(|_| {
                        GpError::Parse(format!(
                            "Line {}: '{}' is not a number",
                            number + 1,
                            value.trim()
                        ))
                    })
                })
                .collect()
        })
        .collect()
}

/// Reads an inputs file.
pub fn read_vectors(path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    parse_vectors(&text)
}

/// Reads an outputs file, keeping the first column of every vector.
pub fn read_outputs(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    Ok(read_vectors(path)?
        .into_iter()
        .filter_map(|vector| vector.first().copied())
        .collect())
}

/// Parses the three lines of a vocabulary file.
///
/// # Errors
///
/// Returns `GpError::Parse` unless there are exactly three lines, ignoring
/// trailing blank lines.
pub fn parse_vocabulary(text: &str) -> Result<Vocabulary> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.len() > 3 && lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    match lines.as_slice() {
        [terminals, one_arg, two_arg] => Ok(Vocabulary::from_lists(terminals, one_arg, two_arg)),
        _ => Err(GpError::Parse(format!(
            "A vocabulary file has exactly 3 lines, found {}",
            lines.len()
        ))),
    }
}

pub fn read_vocabulary(path: impl AsRef<Path>) -> Result<Vocabulary> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    parse_vocabulary(&text)
}

/// Reads definitions to be loaded into the engine session.
pub fn read_definitions(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).context(format!("Failed to read {}", path.display()))
}

pub fn solution_path(dir: &Path, run_name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}-sol.{}", run_name, extension))
}

pub fn generation_path(dir: &Path, run_name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}-gen.{}", run_name, extension))
}

pub fn stats_path(dir: &Path, run_name: &str) -> PathBuf {
    dir.join(format!("{}-stats.csv", run_name))
}

/// Writes the solution file.
pub fn write_solution(path: &Path, solution: &Individual) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, format!("{}\n", solution.expression()))?;
    debug!(path = %path.display(), "Solution written");
    Ok(())
}

/// Writes one expression per line.
pub fn write_generation(path: &Path, members: &[Individual]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for member in members {
        writeln!(writer, "{}", member.expression())?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `adjustedFitness,rawFitness` for every member.
///
/// # Errors
///
/// Returns `GpError::IllegalState` if a member is unscored.
pub fn write_stats(path: &Path, members: &[Individual]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for member in members {
        let adjusted = member.adjusted_fitness()?;
        let raw = member.raw_fitness().unwrap_or_default();
        writeln!(writer, "{},{}", adjusted, raw)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parses a generation dump, stopping at the first blank line.
pub fn parse_generation(text: &str) -> Vec<Individual> {
    text.lines()
        .take_while(|line| !line.trim().is_empty())
        .map(|line| Individual::new(line.trim_end()))
        .collect()
}

pub fn read_generation(path: impl AsRef<Path>) -> Result<Vec<Individual>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    Ok(parse_generation(&text))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vectors_rejects_garbage() {
        assert!(matches!(
            parse_vectors("1,2\n3,x\n"),
            Err(GpError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_vocabulary_with_empty_line() {
        let vocab = parse_vocabulary("INPUT1,CONSTANT-SYNTHESIS\n\n+,-,*\n\n").unwrap();
        assert_eq!(vocab.terminals(), ["INPUT1", "CONSTANT-SYNTHESIS"]);
        assert!(vocab.one_arg_functions().is_empty());
        assert_eq!(vocab.two_arg_functions(), ["+", "-", "*"]);
    }

    #[test]
    fn test_parse_vocabulary_line_count() {
        assert!(matches!(parse_vocabulary("X\nsin\n"), Err(GpError::Parse(_))));
        assert!(matches!(
            parse_vocabulary("X\nsin\n+\nextra\n"),
            Err(GpError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_generation_stops_at_blank_line() {
        let members = parse_generation("(+ X 1)\nX\n\n(ignored)\n");
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].expression().as_str(), "X");
        assert!(!members[0].is_scored());
    }

    #[test]
    fn test_artifact_names() {
        let dir = Path::new("output");
        assert_eq!(solution_path(dir, "quad", "lsp"), Path::new("output/quad-sol.lsp"));
        assert_eq!(generation_path(dir, "quad", "lsp"), Path::new("output/quad-gen.lsp"));
        assert_eq!(stats_path(dir, "quad"), Path::new("output/quad-stats.csv"));
    }
}
