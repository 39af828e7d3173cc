//! Metadata pass over every timestep file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use cgm_container::{Container, ContainerFormat};
use cgm_types::layout;
use cgm_types::{
    GridShape, MergeError, MergeResult, MissingPolicy, SkippedEntry, SolutionEntry, TimeSource,
};

use crate::error::{container_failure, display_name};
use crate::metadata::read_grid_shape;

/// Surviving entries plus the files dropped under the skip policy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntrySet {
    pub entries: Vec<SolutionEntry>,
    pub skipped: Vec<SkippedEntry>,
}

/// Validates timestep files one by one and numbers the survivors.
pub struct EntryBuilder<'a, F: ContainerFormat> {
    format: &'a F,
    base_items: &'a [String],
    time_source: TimeSource,
    policy: MissingPolicy,
}

/// Values read from one file before it is accepted.
struct Candidate {
    time: f64,
    scalar_values: BTreeMap<String, f64>,
    grid_shape: Option<GridShape>,
}

impl<'a, F: ContainerFormat> EntryBuilder<'a, F> {
    pub fn new(format: &'a F, base_items: &'a [String]) -> Self {
        Self {
            format,
            base_items,
            time_source: TimeSource::default(),
            policy: MissingPolicy::default(),
        }
    }

    pub fn time_source(mut self, time_source: TimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn policy(mut self, policy: MissingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Read every file in order and keep the ones that pass.
    ///
    /// Ordinals are dense: a skipped file does not consume one.
    pub fn build(&self, paths: &[PathBuf]) -> MergeResult<EntrySet> {
        let mut set = EntrySet::default();
        let mut established: Option<GridShape> = None;

        for path in paths {
            match self.read_candidate(path, established.as_ref()) {
                Ok(candidate) => {
                    if established.is_none() {
                        established = candidate.grid_shape;
                    }
                    let ordinal = set.entries.len() + 1;
                    debug!(ordinal, file = %display_name(path), time = candidate.time, "entry accepted");
                    set.entries.push(SolutionEntry {
                        ordinal,
                        source_path: path.clone(),
                        time: candidate.time,
                        scalar_values: candidate.scalar_values,
                    });
                }
                Err(err) if self.policy == MissingPolicy::Skip && err.skip_allowed() => {
                    warn!(file = %display_name(path), reason = %err, "skipping timestep");
                    set.skipped.push(SkippedEntry {
                        source_path: path.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        if set.entries.is_empty() {
            return Err(MergeError::not_found("no valid timestep files remain"));
        }
        Ok(set)
    }

    fn read_candidate(&self, path: &Path, established: Option<&GridShape>) -> MergeResult<Candidate> {
        let container = self
            .format
            .open(path)
            .map_err(|e| container_failure(path, e))?;

        let time = match self.time_source {
            TimeSource::FromCgns => read_time_value(&container, path)?,
            TimeSource::FromFilename => time_from_filename(path)?,
        };

        let mut scalar_values = BTreeMap::new();
        for item in self.base_items {
            let data = container
                .read(&layout::base_item_path(item))
                .map_err(|e| container_failure(path, e))?;
            let value = data.and_then(|d| d.first_f64()).ok_or_else(|| {
                MergeError::invalid_structure(format!(
                    "{item} in BaseIterativeData is missing or empty in {}",
                    display_name(path)
                ))
                .skippable()
            })?;
            scalar_values.insert(item.clone(), value);
        }

        let grid_shape = read_grid_shape(&container).map_err(|e| container_failure(path, e))?;
        if let (Some(expected), Some(actual)) = (established, grid_shape.as_ref()) {
            if expected != actual {
                return Err(MergeError::invalid_structure(format!(
                    "grid size of {} differs from earlier timesteps",
                    display_name(path)
                ))
                .skippable());
            }
        }

        Ok(Candidate {
            time,
            scalar_values,
            grid_shape,
        })
    }
}

/// First element of the time-values dataset.
pub fn read_time_value<C: Container>(container: &C, path: &Path) -> MergeResult<f64> {
    let data = container
        .read(&layout::time_values_path())
        .map_err(|e| container_failure(path, e))?
        .ok_or_else(|| {
            MergeError::missing_content(format!("TimeValues not found in {}", display_name(path)))
        })?;
    data.first_f64().ok_or_else(|| {
        MergeError::missing_content(format!("TimeValues is empty in {}", display_name(path)))
    })
}

/// The last run of digits in the file stem, as a number.
pub fn time_from_filename(path: &Path) -> MergeResult<f64> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let digits = last_digit_run(&stem).ok_or_else(|| {
        MergeError::invalid_structure(format!(
            "cannot read a time from file name {}",
            display_name(path)
        ))
    })?;
    digits.parse::<f64>().map_err(|e| {
        MergeError::invalid_structure(format!("invalid time {digits:?} in {}", display_name(path)))
            .with_source(e)
    })
}

fn last_digit_run(text: &str) -> Option<&str> {
    let end = text.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = text[..end]
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    Some(&text[start..end])
}
