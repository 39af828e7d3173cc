//! Project staging and packaging for cgns-merge.
//!
//! A project is either a zip archive (`.ipro`) or a folder holding
//! `project.xml`. Before merging, the project is staged as a working copy in
//! the output directory; afterwards the copy is finalized in the same
//! packaging as the input.
//!
//! - [`StagedProject`] -- resolve, conflict-check, and materialize the working copy
//! - [`finalize`] / [`discard`] -- package merged output or drop a dry run

pub mod archive;
pub mod packager;
pub mod resolver;

pub use archive::{compress_tree, copy_tree, extract_archive};
pub use packager::{discard, finalize, PackagedOutput};
pub use resolver::{classify, Project, ProjectKind, StagedProject};
