//! Foundation types for cgns-merge.
//!
//! Every other cgns-merge crate depends on `cgm-types`. It holds the error
//! taxonomy with its exit codes, the closed set of pointer kinds, the fixed
//! internal layout of a timestep container, and the merge data model.
//!
//! # Key Types
//!
//! - [`MergeError`] -- failure tagged with kind, exit code, and skip eligibility
//! - [`PointerKind`] -- the five zone pointer tables
//! - [`PointerTemplate`] -- pointer name and row width read from the first timestep
//! - [`SolutionEntry`] -- one validated timestep
//! - [`MergeRequest`] / [`MergeOptions`] -- what to merge and how

pub mod error;
pub mod layout;
pub mod model;
pub mod options;
pub mod pointer;

pub use error::{exit_code, ErrorKind, MergeError, MergeResult};
pub use model::{GridShape, PointerTemplate, SkippedEntry, SolutionEntry};
pub use options::{
    require_plain_name, InputSelector, MergeOptions, MergeRequest, MissingPolicy, TimeSource,
    DEFAULT_OUTPUT_NAME, DEFAULT_PATTERN, DEFAULT_RESULTS_SUBFOLDER,
};
pub use pointer::PointerKind;
