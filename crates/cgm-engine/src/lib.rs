//! Merge engine for cgns-merge.
//!
//! A run enumerates the per-timestep containers of a results folder, reads
//! the pointer templates and scalar items once from the first file, validates
//! every file in a second pass, and rebuilds a single container that indexes
//! every surviving timestep.
//!
//! # Stages
//!
//! - [`enumerate_solutions`] -- glob and natural-sort the timestep files
//! - [`extract_metadata`] -- pointer templates, scalar items and grid shape
//! - [`EntryBuilder`] -- per-file time, scalars and grid checks, with skip policy
//! - [`GroupMerger`] -- subtree copies, pointer tables and time series
//! - [`Merger`] -- staging, the stages above, and packaging
//!
//! All container access goes through [`cgm_container::ContainerFormat`], so
//! the engine runs unchanged against HDF5 files or JSON tree fixtures.

pub mod entries;
pub mod enumerate;
mod error;
pub mod merger;
pub mod metadata;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

pub use entries::{read_time_value, time_from_filename, EntryBuilder, EntrySet};
pub use enumerate::{enumerate_solutions, natural_cmp};
pub use merger::{rename_with_index, GroupMerger};
pub use metadata::{extract_metadata, SolutionMetadata};
pub use pipeline::{MergeOutcome, MergeOutput, Merger};
