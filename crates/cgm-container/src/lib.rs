//! Hierarchical container access for cgns-merge.
//!
//! Merge logic never touches a file format directly. It goes through the
//! [`Container`] capability trait, opened via a [`ContainerFormat`]:
//!
//! - [`Hdf5Container`] -- CGNS files stored as HDF5 (feature `hdf5`, default)
//! - [`TreeContainer`] -- in-memory tree persisted as JSON, for tests and fixtures
//!
//! [`NameTable`] encodes and decodes the fixed-width pointer-name tables that
//! index per-timestep zone subtrees.

pub mod array;
pub mod error;
#[cfg(feature = "hdf5")]
pub mod h5;
pub mod names;
pub mod traits;
pub mod tree;

pub use array::{ArrayValues, DataArray};
pub use error::{ContainerError, ContainerResult};
#[cfg(feature = "hdf5")]
pub use h5::{Hdf5Container, Hdf5Format};
pub use names::NameTable;
pub use traits::{Container, ContainerFormat};
pub use tree::{Node, TreeContainer, TreeFormat};
