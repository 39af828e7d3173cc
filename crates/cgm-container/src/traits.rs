use std::path::Path;

use crate::array::DataArray;
use crate::error::ContainerResult;

/// Path-addressed access to one open hierarchical container.
///
/// Paths are `/`-separated and relative to the container root; segments are
/// used verbatim (the payload dataset of every node is named `" data"`).
///
/// All implementations must satisfy these invariants:
/// - Read operations never modify the container.
/// - Mutations through a read-only handle fail with `ReadOnly`.
/// - Handles release the underlying file when dropped.
pub trait Container {
    /// Whether any node exists at `path`.
    fn contains(&self, path: &str) -> bool;

    /// Whether a group exists at `path`.
    fn is_group(&self, path: &str) -> bool;

    /// Names of the direct children of the group at `path`, in container order.
    fn children(&self, path: &str) -> ContainerResult<Vec<String>>;

    /// Shape of the dataset at `path`, or `None` if nothing is there.
    fn shape(&self, path: &str) -> ContainerResult<Option<Vec<usize>>>;

    /// Read the dataset at `path`, or `None` if nothing is there.
    fn read(&self, path: &str) -> ContainerResult<Option<DataArray>>;

    /// Create every missing group along `path`.
    fn require_group(&mut self, path: &str) -> ContainerResult<()>;

    /// Write `data` at `path`, removing whatever was there first.
    ///
    /// The parent group must already exist.
    fn create_or_replace_dataset(&mut self, path: &str, data: &DataArray) -> ContainerResult<()>;

    /// Deep-copy the subtree at `src_path` into `dst` at `dst_path`.
    ///
    /// The destination parent must exist and the destination must be free.
    fn copy_subtree(&self, src_path: &str, dst: &mut Self, dst_path: &str) -> ContainerResult<()>;

    /// Remove the node at `path`. Returns `true` if something was removed.
    fn delete(&mut self, path: &str) -> ContainerResult<bool>;

    /// Push pending writes to disk.
    fn flush(&mut self) -> ContainerResult<()>;

    /// Read the dataset at `path` widened to `f64`.
    fn read_f64(&self, path: &str) -> ContainerResult<Option<Vec<f64>>> {
        Ok(self.read(path)?.map(|data| data.to_f64()))
    }
}

/// Opens containers of one on-disk format.
pub trait ContainerFormat {
    type Handle: Container;

    /// Open an existing container read-only.
    fn open(&self, path: &Path) -> ContainerResult<Self::Handle>;

    /// Open an existing container for reading and writing.
    fn open_rw(&self, path: &Path) -> ContainerResult<Self::Handle>;
}

/// Split a container path into its non-empty segments.
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Split a container path into `(parent, leaf)`.
pub(crate) fn split_leaf(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
        None => ("", trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_nested_path() {
        assert_eq!(
            split_leaf("iRIC/BaseIterativeData/TimeValues/ data"),
            ("iRIC/BaseIterativeData/TimeValues", " data")
        );
        assert_eq!(split_leaf("iRIC"), ("", "iRIC"));
    }

    #[test]
    fn segments_keep_leading_space() {
        let parts: Vec<_> = segments("/a/b/ data").collect();
        assert_eq!(parts, vec!["a", "b", " data"]);
    }
}
