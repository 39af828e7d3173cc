//! End-to-end merge runs for project and direct-results inputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use cgm_container::ContainerFormat;
use cgm_project::{discard, finalize, PackagedOutput, StagedProject};
use cgm_types::{
    require_plain_name, InputSelector, MergeError, MergeOptions, MergeRequest, MergeResult,
    PointerTemplate, SkippedEntry, SolutionEntry, DEFAULT_OUTPUT_NAME,
};

use crate::entries::{EntryBuilder, EntrySet};
use crate::enumerate::enumerate_solutions;
use crate::merger::GroupMerger;
use crate::metadata::extract_metadata;

/// Where a run left its result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum MergeOutput {
    /// Re-archived project.
    Archive(PathBuf),
    /// Project folder holding the merged container.
    ProjectFolder(PathBuf),
    /// Merged container written from a results folder.
    Container(PathBuf),
}

impl MergeOutput {
    pub fn path(&self) -> &Path {
        match self {
            Self::Archive(p) | Self::ProjectFolder(p) | Self::Container(p) => p,
        }
    }
}

impl From<PackagedOutput> for MergeOutput {
    fn from(packaged: PackagedOutput) -> Self {
        match packaged {
            PackagedOutput::Archive(p) => Self::Archive(p),
            PackagedOutput::Directory(p) => Self::ProjectFolder(p),
        }
    }
}

/// Report of a completed run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergeOutcome {
    pub entries: Vec<SolutionEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub templates: Vec<PointerTemplate>,
    /// `None` for a dry run.
    pub output: Option<MergeOutput>,
}

impl MergeOutcome {
    pub fn is_dry_run(&self) -> bool {
        self.output.is_none()
    }
}

/// Validated plan for one results folder, ready to be written.
struct Prepared {
    templates: Vec<PointerTemplate>,
    base_items: Vec<String>,
    set: EntrySet,
}

/// Runs merges against one container format.
pub struct Merger<F: ContainerFormat> {
    format: F,
}

impl<F: ContainerFormat> Merger<F> {
    pub fn new(format: F) -> Self {
        Self { format }
    }

    pub fn run(&self, request: &MergeRequest) -> MergeResult<MergeOutcome> {
        match &request.input {
            InputSelector::Project(path) => {
                self.merge_project(path, &request.output_dir, &request.options)
            }
            InputSelector::ResultsDir(path) => {
                self.merge_results_dir(path, &request.output_dir, &request.options)
            }
        }
    }

    /// Stage the project, merge its results into it, and package it like the input.
    ///
    /// The staged copy is removed if anything fails before the merged
    /// container is written. A failure while writing leaves it in place.
    pub fn merge_project(
        &self,
        project: &Path,
        output_dir: &Path,
        options: &MergeOptions,
    ) -> MergeResult<MergeOutcome> {
        require_plain_name("results subfolder", &options.results_subfolder)?;
        require_plain_name("output file name", output_name(options))?;
        let mut staged = StagedProject::stage(project, output_dir)?;
        let results_dir = staged.root().join(&options.results_subfolder);
        let prepared = self.prepare(&results_dir, staged.root(), options)?;

        if options.dry_run {
            info!("dry run: no output written");
            discard(staged)?;
            return Ok(prepared.into_outcome(None));
        }

        staged.release();
        let output = staged.root().join(output_name(options));
        self.write(&prepared, &output)?;
        let packaged = finalize(staged, &options.results_subfolder)?;
        Ok(prepared.into_outcome(Some(packaged.into())))
    }

    /// Merge a results folder in place into `<output_dir>/<output name>`.
    pub fn merge_results_dir(
        &self,
        results_dir: &Path,
        output_dir: &Path,
        options: &MergeOptions,
    ) -> MergeResult<MergeOutcome> {
        require_plain_name("output file name", output_name(options))?;
        let prepared = self.prepare(results_dir, results_dir, options)?;

        if options.dry_run {
            info!("dry run: no output written");
            return Ok(prepared.into_outcome(None));
        }

        fs::create_dir_all(output_dir).map_err(|e| {
            MergeError::cannot_create(format!(
                "cannot create output directory {}",
                output_dir.display()
            ))
            .with_source(e)
        })?;
        let output = output_dir.join(output_name(options));
        self.write(&prepared, &output)?;
        Ok(prepared.into_outcome(Some(MergeOutput::Container(output))))
    }

    fn prepare(&self, results_dir: &Path, origin: &Path, options: &MergeOptions) -> MergeResult<Prepared> {
        let paths = enumerate_solutions(results_dir, &options.pattern)?;
        info!(files = paths.len(), input = %origin.display(), "timestep files found");

        let metadata = extract_metadata(&self.format, &paths[0])?;
        let set = EntryBuilder::new(&self.format, &metadata.base_items)
            .time_source(options.time_source)
            .policy(options.missing_policy)
            .build(&paths)?;
        info!(
            entries = set.entries.len(),
            skipped = set.skipped.len(),
            "timesteps validated"
        );

        Ok(Prepared {
            templates: metadata.templates,
            base_items: metadata.base_items,
            set,
        })
    }

    fn write(&self, prepared: &Prepared, output: &Path) -> MergeResult<()> {
        GroupMerger::new(&self.format, &prepared.templates, &prepared.base_items)
            .merge(output, &prepared.set.entries)
    }
}

impl Prepared {
    fn into_outcome(self, output: Option<MergeOutput>) -> MergeOutcome {
        MergeOutcome {
            entries: self.set.entries,
            skipped: self.set.skipped,
            templates: self.templates,
            output,
        }
    }
}

fn output_name(options: &MergeOptions) -> &str {
    if options.output_name.is_empty() {
        DEFAULT_OUTPUT_NAME
    } else {
        &options.output_name
    }
}
