use std::path::Path;

use cgm_container::ContainerError;
use cgm_types::MergeError;

/// Map an unclassified container failure while handling `file`.
pub(crate) fn container_failure(file: &Path, err: ContainerError) -> MergeError {
    MergeError::unexpected(format!("{}: {err}", display_name(file))).with_source(err)
}

/// File name for messages, falling back to the full path.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
