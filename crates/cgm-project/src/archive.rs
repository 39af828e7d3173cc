//! Zip handling for archive-kind projects.
//!
//! Archives store paths relative to the project root with `/` separators.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use cgm_types::{MergeError, MergeResult};

fn zip_error(context: &str, path: &Path) -> impl FnOnce(ZipError) -> MergeError {
    let context = format!("{context} {}", path.display());
    move |e| MergeError::unexpected(format!("{context}: {e}")).with_source(e)
}

/// Extract every entry of `archive` under `dest`. Returns the file count.
///
/// Entries whose names would escape `dest` are skipped.
pub fn extract_archive(archive: &Path, dest: &Path) -> MergeResult<usize> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| {
        MergeError::invalid(format!(
            "invalid or corrupt project archive {}: {e}",
            archive.display()
        ))
        .with_source(e)
    })?;

    fs::create_dir_all(dest)?;
    let mut count = 0;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(zip_error("failed to read entry of", archive))?;
        let Some(relative) = entry.enclosed_name() else {
            debug!(name = entry.name(), "skipping unsafe archive entry");
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&out_path)?;
            io::copy(&mut entry, &mut out)?;
            count += 1;
        }
    }
    debug!(archive = %archive.display(), files = count, "archive extracted");
    Ok(count)
}

/// Compress every file under `root` into a new deflate archive at `archive`.
/// Returns the file count.
pub fn compress_tree(root: &Path, archive: &Path) -> MergeResult<usize> {
    let file = File::create(archive)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| MergeError::unexpected(format!("failed to walk tree: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = archive_name(root, entry.path())?;
        zip.start_file(name, options)
            .map_err(zip_error("failed to add entry to", archive))?;
        let mut src = File::open(entry.path())?;
        io::copy(&mut src, &mut zip)?;
        count += 1;
    }
    zip.finish()
        .map_err(zip_error("failed to finish archive", archive))?;
    debug!(archive = %archive.display(), files = count, "archive written");
    Ok(count)
}

/// Relative path of `path` under `root`, joined with `/`.
fn archive_name(root: &Path, path: &Path) -> MergeResult<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        MergeError::unexpected(format!(
            "{} is outside {}",
            path.display(),
            root.display()
        ))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Recursively copy the directory tree at `src` to `dst`. Returns the file count.
pub fn copy_tree(src: &Path, dst: &Path) -> MergeResult<usize> {
    let mut count = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| MergeError::unexpected(format!("failed to walk tree: {e}")))?;
        let relative = entry.path().strip_prefix(src).map_err(|_| {
            MergeError::unexpected(format!("{} is outside {}", entry.path().display(), src.display()))
        })?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn compress_uses_forward_slash_names() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        write(&root.join("project.xml"), "<project/>");
        write(&root.join("result").join("Solution1.cgn"), "a");

        let archive = dir.path().join("proj.ipro");
        assert_eq!(compress_tree(&root, &archive).unwrap(), 2);

        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(names, vec!["project.xml", "result/Solution1.cgn"]);

        let mut content = String::new();
        zip.by_name("project.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<project/>");
    }

    #[test]
    fn extract_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        write(&root.join("project.xml"), "<project/>");
        write(&root.join("result").join("Solution2.cgn"), "b");
        let archive = dir.path().join("proj.ipro");
        compress_tree(&root, &archive).unwrap();

        let dest = dir.path().join("staged");
        assert_eq!(extract_archive(&archive, &dest).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(dest.join("result").join("Solution2.cgn")).unwrap(),
            "b"
        );
    }

    #[test]
    fn extract_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.ipro");
        fs::write(&archive, b"not a zip").unwrap();
        let err = extract_archive(&archive, &dir.path().join("out")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn copy_tree_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        write(&src.join("a").join("b").join("c.txt"), "deep");
        write(&src.join("top.txt"), "top");

        let dst = dir.path().join("dst");
        assert_eq!(copy_tree(&src, &dst).unwrap(), 2);
        assert_eq!(fs::read_to_string(dst.join("a/b/c.txt")).unwrap(), "deep");
    }
}
