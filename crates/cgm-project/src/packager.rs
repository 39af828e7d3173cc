use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use cgm_types::{require_plain_name, MergeResult};

use crate::archive::compress_tree;
use crate::resolver::{ProjectKind, StagedProject};

/// Final location of a merged project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackagedOutput {
    /// Re-archived project; the staged folder is gone.
    Archive(PathBuf),
    /// The staged folder itself.
    Directory(PathBuf),
}

impl PackagedOutput {
    pub fn path(&self) -> &Path {
        match self {
            Self::Archive(p) | Self::Directory(p) => p,
        }
    }
}

/// Drop the staged tree of a dry run.
pub fn discard(staged: StagedProject) -> MergeResult<()> {
    let project = staged.into_project();
    if project.staged_root.exists() {
        fs::remove_dir_all(&project.staged_root)?;
    }
    info!(staged = %project.staged_root.display(), "staged project discarded");
    Ok(())
}

/// Finish a merged project: drop the per-timestep results folder, then
/// re-archive if the input was an archive.
///
/// `results_subfolder` must name a direct child of the staged root; anything
/// else is rejected before the tree is touched.
pub fn finalize(staged: StagedProject, results_subfolder: &str) -> MergeResult<PackagedOutput> {
    require_plain_name("results subfolder", results_subfolder)?;
    let project = staged.into_project();
    let results = project.staged_root.join(results_subfolder);
    if results.is_dir() {
        fs::remove_dir_all(&results)?;
    }

    match (project.kind, project.archive_path) {
        (ProjectKind::Archive, Some(archive)) => {
            let files = compress_tree(&project.staged_root, &archive)?;
            fs::remove_dir_all(&project.staged_root)?;
            info!(archive = %archive.display(), files, "project archived");
            Ok(PackagedOutput::Archive(archive))
        }
        _ => {
            info!(project = %project.staged_root.display(), "project folder written");
            Ok(PackagedOutput::Directory(project.staged_root))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    use cgm_types::layout::DESCRIPTOR_FILE;
    use zip::ZipArchive;

    fn folder_project(base: &Path, name: &str) -> PathBuf {
        let root = base.join(name);
        fs::create_dir_all(root.join("result")).unwrap();
        fs::write(root.join(DESCRIPTOR_FILE), "<project/>").unwrap();
        fs::write(root.join("result").join("Solution1.cgn"), "s1").unwrap();
        root
    }

    #[test]
    fn finalize_folder_drops_results() {
        let dir = tempfile::tempdir().unwrap();
        let source = folder_project(dir.path(), "case");
        let out = dir.path().join("out");
        let staged = StagedProject::stage(&source, &out).unwrap();
        fs::write(staged.root().join("Case1.cgn"), "merged").unwrap();

        let output = finalize(staged, "result").unwrap();
        assert_eq!(output, PackagedOutput::Directory(out.join("case")));
        assert!(out.join("case").join("Case1.cgn").exists());
        assert!(!out.join("case").join("result").exists());
    }

    #[test]
    fn finalize_archive_leaves_only_archive() {
        let dir = tempfile::tempdir().unwrap();
        let folder = folder_project(dir.path(), "src");
        let archive = dir.path().join("case.ipro");
        compress_tree(&folder, &archive).unwrap();
        let out = dir.path().join("out");
        let staged = StagedProject::stage(&archive, &out).unwrap();
        fs::write(staged.root().join("Case1.cgn"), "merged").unwrap();

        let output = finalize(staged, "result").unwrap();
        assert_eq!(output.path(), out.join("case.ipro"));
        assert!(!out.join("case").exists());

        let zip = ZipArchive::new(File::open(output.path()).unwrap()).unwrap();
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["Case1.cgn", DESCRIPTOR_FILE]);
    }

    #[test]
    fn finalize_rejects_subfolder_outside_project() {
        let dir = tempfile::tempdir().unwrap();
        let source = folder_project(dir.path(), "case");
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("keep")).unwrap();
        let mut staged = StagedProject::stage(&source, &out).unwrap();
        staged.release();

        let err = finalize(staged, "../keep").unwrap_err();
        assert_eq!(err.kind(), cgm_types::ErrorKind::UserInput);
        assert_eq!(err.exit_code(), 2);
        assert!(out.join("keep").is_dir());
        assert!(out.join("case").join(DESCRIPTOR_FILE).is_file());
    }

    #[test]
    fn discard_removes_staged_tree() {
        let dir = tempfile::tempdir().unwrap();
        let source = folder_project(dir.path(), "case");
        let out = dir.path().join("out");
        let staged = StagedProject::stage(&source, &out).unwrap();

        discard(staged).unwrap();
        assert!(!out.join("case").exists());
        assert!(out.exists());
    }
}
