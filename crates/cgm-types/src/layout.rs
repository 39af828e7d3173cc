//! Fixed internal paths of a timestep container.
//!
//! Every node in the container is a group; numeric payloads live in a child
//! dataset named [`DATA`] (note the leading space).

/// Name of the payload dataset under each node group.
pub const DATA: &str = " data";

/// Base-level iterative metadata group.
pub const BASE_ITERATIVE: &str = "iRIC/BaseIterativeData";

/// Reserved child of [`BASE_ITERATIVE`] holding the time axis.
pub const TIME_VALUES: &str = "TimeValues";

/// Zone group holding coordinate and solution subtrees.
pub const ZONE: &str = "iRIC/iRICZone";

/// Zone-level iterative metadata group holding the pointer tables.
pub const ZONE_ITERATIVE: &str = "iRIC/iRICZone/ZoneIterativeData";

/// Mesh coordinate group inside the zone.
pub const GRID_COORDINATES: &str = "iRIC/iRICZone/GridCoordinates";

pub const COORDINATE_X: &str = "CoordinateX";
pub const COORDINATE_Y: &str = "CoordinateY";

/// Project descriptor file expected at the root of every project.
pub const DESCRIPTOR_FILE: &str = "project.xml";

/// File extension of archive-kind projects (without the dot).
pub const ARCHIVE_EXTENSION: &str = "ipro";

/// Join two container path segments with `/`.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

/// Path of the payload dataset under `group`.
pub fn data_path(group: &str) -> String {
    join(group, DATA)
}

/// Payload path of a base iterative item, e.g. `TimeValues`.
pub fn base_item_path(item: &str) -> String {
    data_path(&join(BASE_ITERATIVE, item))
}

pub fn time_values_path() -> String {
    base_item_path(TIME_VALUES)
}

/// Payload paths of the two in-plane coordinate arrays.
pub fn coordinate_paths() -> (String, String) {
    (
        data_path(&join(GRID_COORDINATES, COORDINATE_X)),
        data_path(&join(GRID_COORDINATES, COORDINATE_Y)),
    )
}
