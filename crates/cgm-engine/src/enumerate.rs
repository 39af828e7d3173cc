//! Locating and ordering timestep files.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use tracing::debug;

use cgm_types::{MergeError, MergeResult};

/// One run of a natural sort key.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Run {
    /// Digits with leading zeros stripped, compared by value.
    Number(String),
    /// Lowercased text.
    Text(String),
}

impl Ord for Run {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Run::Number(a), Run::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Run::Text(a), Run::Text(b)) => a.cmp(b),
            (Run::Number(_), Run::Text(_)) => Ordering::Less,
            (Run::Text(_), Run::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Run {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split `name` into alternating text and digit runs.
///
/// The key always starts and ends with a (possibly empty) text run, so runs
/// at the same position of two keys are always of the same type.
fn natural_key(name: &str) -> Vec<Run> {
    let mut key = Vec::new();
    let mut text = String::new();
    let mut digits = String::new();

    for ch in name.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else {
            if !digits.is_empty() {
                key.push(Run::Text(std::mem::take(&mut text).to_lowercase()));
                key.push(number_run(&std::mem::take(&mut digits)));
            }
            text.push(ch);
        }
    }
    if !digits.is_empty() {
        key.push(Run::Text(std::mem::take(&mut text).to_lowercase()));
        key.push(number_run(&digits));
    }
    key.push(Run::Text(text.to_lowercase()));
    key
}

fn number_run(digits: &str) -> Run {
    let trimmed = digits.trim_start_matches('0');
    Run::Number(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}

/// Compare file names so that embedded numbers order by value.
///
/// `Solution2.cgn` sorts before `Solution10.cgn`; text compares
/// case-insensitively.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

/// List files in `results_dir` whose names match `pattern`, naturally sorted.
pub fn enumerate_solutions(results_dir: &Path, pattern: &str) -> MergeResult<Vec<PathBuf>> {
    if !results_dir.exists() {
        return Err(MergeError::not_found(format!(
            "results folder not found: {}",
            results_dir.display()
        )));
    }
    if !results_dir.is_dir() {
        return Err(MergeError::not_found(format!(
            "results folder is not a directory: {}",
            results_dir.display()
        )));
    }

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| {
            MergeError::user_input(format!("invalid file pattern {pattern:?}: {e}")).with_source(e)
        })?
        .compile_matcher();

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(results_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if matcher.is_match(&name) {
            files.push((name, path));
        }
    }

    if files.is_empty() {
        return Err(MergeError::not_found(format!(
            "no files matching {pattern} in {}",
            results_dir.display()
        )));
    }

    files.sort_by(|(a, _), (b, _)| natural_cmp(a, b));
    debug!(count = files.len(), first = %files[0].0, "timestep files enumerated");
    Ok(files.into_iter().map(|(_, path)| path).collect())
}
