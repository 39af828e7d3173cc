//! Structure read once, from the first timestep file.

use std::path::Path;

use tracing::debug;

use cgm_container::{Container, ContainerFormat, NameTable};
use cgm_types::layout::{self, BASE_ITERATIVE, TIME_VALUES};
use cgm_types::{GridShape, MergeError, MergeResult, PointerKind, PointerTemplate};

use crate::error::{container_failure, display_name};

/// Pointer templates and scalar item names of the first file.
///
/// The grid shape is not part of it: the first surviving entry that reports
/// one establishes it, which need not be the first file.
#[derive(Clone, Debug, PartialEq)]
pub struct SolutionMetadata {
    pub templates: Vec<PointerTemplate>,
    /// Scalar iterative items other than the time axis, in container order.
    pub base_items: Vec<String>,
}

/// Read the metadata of `first`.
///
/// Fails with `InvalidStructure` when no pointer table is present at all,
/// since there is nothing to merge.
pub fn extract_metadata<F: ContainerFormat>(format: &F, first: &Path) -> MergeResult<SolutionMetadata> {
    let container = format
        .open(first)
        .map_err(|e| container_failure(first, e))?;

    let templates = read_pointer_templates(&container, first)?;
    if templates.is_empty() {
        return Err(MergeError::invalid_structure(format!(
            "no pointer tables found in {}",
            display_name(first)
        )));
    }
    let base_items = read_base_items(&container).map_err(|e| container_failure(first, e))?;

    debug!(
        templates = templates.len(),
        items = ?base_items,
        "metadata extracted"
    );
    Ok(SolutionMetadata {
        templates,
        base_items,
    })
}

/// One template per pointer kind present; each table must hold exactly one name.
pub fn read_pointer_templates<C: Container>(
    container: &C,
    file: &Path,
) -> MergeResult<Vec<PointerTemplate>> {
    let mut templates = Vec::new();
    for kind in PointerKind::ALL {
        if !container.contains(&kind.group_path()) {
            continue;
        }
        let data = container
            .read(&kind.table_path())
            .map_err(|e| container_failure(file, e))?
            .ok_or_else(|| {
                MergeError::invalid_structure(format!(
                    "{kind} has no name table in {}",
                    display_name(file)
                ))
            })?;
        let table = NameTable::decode(&data).map_err(|e| {
            MergeError::invalid_structure(format!("{kind} in {}: {e}", display_name(file)))
                .with_source(e)
        })?;
        let [input_name] = <[String; 1]>::try_from(table.names).map_err(|names| {
            MergeError::invalid_structure(format!(
                "{kind} must hold exactly one entry, found {}",
                names.len()
            ))
        })?;
        templates.push(PointerTemplate {
            kind,
            input_name,
            width: table.width,
        });
    }
    Ok(templates)
}

/// Children of the base iterative group, other than the time axis, that carry
/// a payload.
pub fn read_base_items<C: Container>(container: &C) -> cgm_container::ContainerResult<Vec<String>> {
    if !container.is_group(BASE_ITERATIVE) {
        return Ok(Vec::new());
    }
    let mut items = Vec::new();
    for child in container.children(BASE_ITERATIVE)? {
        if child == TIME_VALUES {
            continue;
        }
        let group = layout::join(BASE_ITERATIVE, &child);
        if container.is_group(&group) && container.contains(&layout::data_path(&group)) {
            items.push(child);
        }
    }
    Ok(items)
}

/// Shapes of both in-plane coordinate arrays, if both are present.
pub fn read_grid_shape<C: Container>(container: &C) -> cgm_container::ContainerResult<Option<GridShape>> {
    let (x_path, y_path) = layout::coordinate_paths();
    match (container.shape(&x_path)?, container.shape(&y_path)?) {
        (Some(x), Some(y)) => Ok(Some(GridShape::new(x, y))),
        _ => Ok(None),
    }
}
