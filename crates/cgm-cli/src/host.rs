//! Host record: merge settings written by the hosting application as TOML
//! with integer option codes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use cgm_types::{
    InputSelector, MergeError, MergeOptions, MergeRequest, MergeResult, MissingPolicy,
    TimeSource, DEFAULT_PATTERN, DEFAULT_RESULTS_SUBFOLDER,
};

/// Output name used when the host enables custom naming but leaves it blank.
pub const HOST_OUTPUT_NAME: &str = "Merged_Solution.cgn";

const INPUT_ARCHIVE: i64 = 0;
const INPUT_FOLDER: i64 = 1;
const INPUT_RESULTS: i64 = 2;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostRecord {
    /// 0 archive project, 1 project folder, 2 results folder.
    pub input_type: i64,
    pub project_path: String,
    pub results_dir: String,
    pub output_dir: String,
    pub results_subfolder: String,
    pub glob_pattern: String,
    /// 1 reads the time from the container.
    pub time_source: i64,
    /// 1 skips invalid timesteps.
    pub missing_policy: i64,
    pub dry_run: i64,
    /// 1 uses `output_file_name`.
    pub output_name_mode: i64,
    pub output_file_name: String,
}

impl Default for HostRecord {
    fn default() -> Self {
        Self {
            input_type: INPUT_ARCHIVE,
            project_path: String::new(),
            results_dir: String::new(),
            output_dir: String::new(),
            results_subfolder: DEFAULT_RESULTS_SUBFOLDER.to_string(),
            glob_pattern: DEFAULT_PATTERN.to_string(),
            time_source: 0,
            missing_policy: 0,
            dry_run: 0,
            output_name_mode: 0,
            output_file_name: HOST_OUTPUT_NAME.to_string(),
        }
    }
}

impl HostRecord {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read host record {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse host record {}", path.display()))
    }

    pub fn into_request(self) -> MergeResult<MergeRequest> {
        let (input, label) = match self.input_type {
            INPUT_ARCHIVE => (self.project_path, "input archive"),
            INPUT_FOLDER => (self.project_path, "input project folder"),
            INPUT_RESULTS => (self.results_dir, "input results folder"),
            other => {
                return Err(MergeError::user_input(format!("invalid input type {other}")))
            }
        };
        if input.is_empty() {
            return Err(MergeError::user_input(format!("{label} path is not set")));
        }
        if self.output_dir.is_empty() {
            return Err(MergeError::user_input("output directory is not set"));
        }

        let input = PathBuf::from(input);
        let selector = if self.input_type == INPUT_RESULTS {
            InputSelector::ResultsDir(input)
        } else {
            InputSelector::Project(input)
        };

        let mut options = MergeOptions {
            results_subfolder: self.results_subfolder,
            pattern: self.glob_pattern,
            time_source: if self.time_source == 1 {
                TimeSource::FromCgns
            } else {
                TimeSource::FromFilename
            },
            missing_policy: if self.missing_policy == 1 {
                MissingPolicy::Skip
            } else {
                MissingPolicy::Error
            },
            dry_run: self.dry_run == 1,
            ..MergeOptions::default()
        };
        if self.output_name_mode == 1 && !self.output_file_name.is_empty() {
            options.output_name = self.output_file_name;
        }

        Ok(MergeRequest::new(selector, self.output_dir).with_options(options))
    }
}
