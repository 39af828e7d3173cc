use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use cgm_types::layout::{ARCHIVE_EXTENSION, DESCRIPTOR_FILE};
use cgm_types::{MergeError, MergeResult};

use crate::archive::{copy_tree, extract_archive};

/// How a project is packaged on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectKind {
    /// A single zip bundle with the archive extension.
    Archive,
    /// A folder containing the descriptor file.
    Directory,
}

/// A resolved project and the location of its working copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    pub kind: ProjectKind,
    /// The input as given by the caller.
    pub source_path: PathBuf,
    /// Base name shared by the staged folder and the final archive.
    pub staged_name: String,
    /// Working copy under the output directory.
    pub staged_root: PathBuf,
    /// Where the re-archived output goes; `None` for folder projects.
    pub archive_path: Option<PathBuf>,
}

/// Classify `path` as an archive or folder project.
pub fn classify(path: &Path) -> MergeResult<ProjectKind> {
    if path.is_file() && has_archive_extension(path) {
        return Ok(ProjectKind::Archive);
    }
    if path.is_dir() {
        if !path.join(DESCRIPTOR_FILE).exists() {
            return Err(MergeError::invalid(format!(
                "{DESCRIPTOR_FILE} not found in {}",
                path.display()
            )));
        }
        return Ok(ProjectKind::Directory);
    }
    Err(MergeError::not_found(format!(
        "input project not found: {}",
        path.display()
    )))
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        .unwrap_or(false)
}

/// Stem for archive files, name for folders.
fn staged_name(path: &Path, kind: ProjectKind) -> MergeResult<String> {
    let name = match kind {
        ProjectKind::Archive => path.file_stem(),
        ProjectKind::Directory => path.file_name(),
    };
    name.map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            MergeError::user_input(format!("cannot derive a project name from {}", path.display()))
        })
}

/// A staged working copy that is removed on drop unless released.
///
/// Holds the staged tree while the run can still fail without having written
/// anything worth keeping.
#[derive(Debug)]
pub struct StagedProject {
    project: Project,
    armed: bool,
}

impl StagedProject {
    /// Resolve `source` and materialize its working copy under `output_dir`.
    pub fn stage(source: &Path, output_dir: &Path) -> MergeResult<Self> {
        let kind = classify(source)?;
        let name = staged_name(source, kind)?;
        let staged_root = output_dir.join(&name);
        let final_archive = output_dir.join(format!("{name}.{ARCHIVE_EXTENSION}"));

        if staged_root.exists() || final_archive.exists() {
            return Err(MergeError::conflict(format!(
                "{} or {} already exists; remove it or choose another output directory",
                staged_root.display(),
                final_archive.display()
            )));
        }

        fs::create_dir_all(output_dir).map_err(|e| {
            MergeError::user_input(format!(
                "cannot create output directory {}: {e}",
                output_dir.display()
            ))
            .with_source(e)
        })?;

        let staged = Self {
            project: Project {
                kind,
                source_path: source.to_path_buf(),
                staged_name: name,
                staged_root,
                archive_path: match kind {
                    ProjectKind::Archive => Some(final_archive),
                    ProjectKind::Directory => None,
                },
            },
            armed: true,
        };

        let root = &staged.project.staged_root;
        let files = match kind {
            ProjectKind::Archive => extract_archive(source, root)?,
            ProjectKind::Directory => copy_tree(source, root)?,
        };
        if !root.join(DESCRIPTOR_FILE).exists() {
            return Err(MergeError::invalid(format!(
                "{DESCRIPTOR_FILE} not found in staged project {}",
                root.display()
            )));
        }

        info!(
            kind = ?kind,
            files,
            staged = %root.display(),
            "project staged"
        );
        Ok(staged)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn root(&self) -> &Path {
        &self.project.staged_root
    }

    /// Keep the staged tree on disk from now on, even on failure.
    pub fn release(&mut self) {
        self.armed = false;
    }

    /// Release the guard and hand back the project.
    pub fn into_project(mut self) -> Project {
        self.release();
        self.project.clone()
    }
}

impl Drop for StagedProject {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let root = &self.project.staged_root;
        if root.exists() {
            if let Err(e) = fs::remove_dir_all(root) {
                warn!(staged = %root.display(), "failed to remove staged project: {e}");
            }
        }
    }
}
