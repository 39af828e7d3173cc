use std::io;

/// Errors from container access.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// I/O error from the underlying file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No node exists at the given path.
    #[error("path not found in container: {0}")]
    PathNotFound(String),

    /// The node exists but is a dataset where a group was expected.
    #[error("not a group: {0}")]
    NotAGroup(String),

    /// The node exists but is a group where a dataset was expected.
    #[error("not a dataset: {0}")]
    NotADataset(String),

    /// A node already occupies the destination path.
    #[error("node already exists: {0}")]
    AlreadyExists(String),

    /// Mutation attempted through a read-only handle.
    #[error("container is read-only")]
    ReadOnly,

    /// Declared shape and value count disagree.
    #[error("shape {shape:?} does not hold {len} values")]
    ShapeMismatch { shape: Vec<usize>, len: usize },

    /// A dataset is not a two-dimensional byte table.
    #[error("not a fixed-width name table: {0}")]
    NotANameTable(String),

    /// An encoded name does not fit its row (one byte is kept for NUL).
    #[error("name {name:?} does not fit a {width}-byte row")]
    NameTooLong { name: String, width: usize },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Failure reported by the HDF5 library.
    #[error("HDF5 error: {0}")]
    Backend(String),
}

#[cfg(feature = "hdf5")]
impl From<hdf5::Error> for ContainerError {
    fn from(err: hdf5::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Result alias for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
