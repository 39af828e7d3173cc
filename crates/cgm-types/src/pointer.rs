use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout;

/// The closed set of zone pointer tables a timestep container may expose.
///
/// Each kind names, per timestep, which zone subtree is current. A merged
/// container carries one table row per surviving timestep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PointerKind {
    FlowSolution,
    FlowCellSolution,
    FlowIFaceSolution,
    FlowJFaceSolution,
    GridCoordinates,
}

impl PointerKind {
    /// All kinds, in the order tables are read and written.
    pub const ALL: [PointerKind; 5] = [
        PointerKind::FlowSolution,
        PointerKind::FlowCellSolution,
        PointerKind::FlowIFaceSolution,
        PointerKind::FlowJFaceSolution,
        PointerKind::GridCoordinates,
    ];

    /// Name of the pointer-table group under the zone iterative data.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::FlowSolution => "FlowSolutionPointers",
            Self::FlowCellSolution => "FlowCellSolutionPointers",
            Self::FlowIFaceSolution => "FlowIFaceSolutionPointers",
            Self::FlowJFaceSolution => "FlowJFaceSolutionPointers",
            Self::GridCoordinates => "GridCoordinatesPointers",
        }
    }

    /// Group path of this kind's table.
    pub fn group_path(self) -> String {
        layout::join(layout::ZONE_ITERATIVE, self.table_name())
    }

    /// Dataset path of this kind's fixed-width name table.
    pub fn table_path(self) -> String {
        layout::data_path(&self.group_path())
    }
}

impl fmt::Display for PointerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}
