use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pointer::PointerKind;

/// Pointer name read from the first timestep, reused for every entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerTemplate {
    pub kind: PointerKind,
    /// The single name stored in the source table, e.g. `FlowSolution1`.
    pub input_name: String,
    /// Fixed byte width of one row in the source table.
    pub width: usize,
}

/// Shapes of the two in-plane coordinate arrays of a timestep.
///
/// Only ever compared for equality between entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridShape {
    pub x: Vec<usize>,
    pub y: Vec<usize>,
}

impl GridShape {
    pub fn new(x: Vec<usize>, y: Vec<usize>) -> Self {
        Self { x, y }
    }
}

/// A validated timestep, numbered densely from 1 in sorted file order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolutionEntry {
    pub ordinal: usize,
    pub source_path: PathBuf,
    pub time: f64,
    /// First element of each scalar iterative item, keyed by item name.
    pub scalar_values: BTreeMap<String, f64>,
}

impl SolutionEntry {
    /// File name of the source container, for messages.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }
}

/// A timestep dropped under the skip policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub source_path: PathBuf,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_file_name() {
        let entry = SolutionEntry {
            ordinal: 1,
            source_path: PathBuf::from("/tmp/result/Solution3.cgn"),
            time: 3.0,
            scalar_values: BTreeMap::new(),
        };
        assert_eq!(entry.file_name(), "Solution3.cgn");
    }

    #[test]
    fn grid_shape_equality() {
        let a = GridShape::new(vec![10, 5], vec![10, 5]);
        let b = GridShape::new(vec![10, 5], vec![10, 5]);
        let c = GridShape::new(vec![11, 5], vec![11, 5]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
