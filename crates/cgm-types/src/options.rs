use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, MergeResult};

pub const DEFAULT_RESULTS_SUBFOLDER: &str = "result";
pub const DEFAULT_PATTERN: &str = "Solution*.cgn";
pub const DEFAULT_OUTPUT_NAME: &str = "Case1.cgn";

/// Where each entry's time value comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    /// Last run of digits in the file stem.
    #[default]
    FromFilename,
    /// First element of the container's time-values dataset.
    FromCgns,
}

/// What to do with an entry that fails a skippable check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    #[default]
    Error,
    Skip,
}

/// Tunables shared by project and direct-results runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Results subfolder inside a project.
    pub results_subfolder: String,
    /// Glob selecting timestep files inside the results folder.
    pub pattern: String,
    /// File name of the merged container.
    pub output_name: String,
    pub time_source: TimeSource,
    pub missing_policy: MissingPolicy,
    /// Validate only; never write output.
    pub dry_run: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            results_subfolder: DEFAULT_RESULTS_SUBFOLDER.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            time_source: TimeSource::default(),
            missing_policy: MissingPolicy::default(),
            dry_run: false,
        }
    }
}

/// Require `name` to be exactly one plain path segment.
///
/// Empty names, `.`, `..`, absolute paths and nested paths are rejected, so
/// the name always resolves to a direct child of the folder it is joined to.
pub fn require_plain_name(what: &str, name: &str) -> MergeResult<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(MergeError::user_input(format!(
            "{what} must be a single file or folder name, got {name:?}"
        ))),
    }
}

/// The input a run merges from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSelector {
    /// An archive (`.ipro`) or a project folder containing `project.xml`.
    Project(PathBuf),
    /// A results folder merged in place, without staging.
    ResultsDir(PathBuf),
}

/// A complete, validated merge request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub input: InputSelector,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub options: MergeOptions,
}

impl MergeRequest {
    pub fn new(input: InputSelector, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output_dir: output_dir.into(),
            options: MergeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = MergeOptions::default();
        assert_eq!(opts.results_subfolder, "result");
        assert_eq!(opts.pattern, "Solution*.cgn");
        assert_eq!(opts.output_name, "Case1.cgn");
        assert_eq!(opts.time_source, TimeSource::FromFilename);
        assert_eq!(opts.missing_policy, MissingPolicy::Error);
        assert!(!opts.dry_run);
    }

    #[test]
    fn enum_options_use_snake_case() {
        let json = serde_json::to_string(&TimeSource::FromCgns).unwrap();
        assert_eq!(json, "\"from_cgns\"");
        let policy: MissingPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(policy, MissingPolicy::Skip);
    }

    #[test]
    fn plain_names_accepted() {
        assert!(require_plain_name("results subfolder", "result").is_ok());
        assert!(require_plain_name("output file name", "Case1.cgn").is_ok());
    }

    #[test]
    fn names_leaving_the_parent_rejected() {
        for name in ["", ".", "..", "../keep", "a/b", "/tmp", "./result"] {
            let err = require_plain_name("results subfolder", name).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::UserInput, "{name:?}");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn partial_options_fill_defaults() {
        let opts: MergeOptions = serde_json::from_str(r#"{"dry_run": true}"#).unwrap();
        assert!(opts.dry_run);
        assert_eq!(opts.pattern, DEFAULT_PATTERN);
    }
}
