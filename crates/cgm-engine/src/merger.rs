//! Reconstruction of the merged container from the surviving entries.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use cgm_container::{Container, ContainerError, ContainerFormat, DataArray, NameTable};
use cgm_types::layout::{self, ZONE};
use cgm_types::{MergeError, MergeResult, PointerTemplate, SolutionEntry};

use crate::error::{container_failure, display_name};

/// Replace the trailing run of ASCII digits in `name` with `index`, or append
/// `index` when there is none.
pub fn rename_with_index(name: &str, index: usize) -> String {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    format!("{stem}{index}")
}

/// Generated names and encoded table of one pointer kind.
struct PointerPlan<'t> {
    template: &'t PointerTemplate,
    names: Vec<String>,
    table: DataArray,
}

/// Writes the merged container: per-entry zone subtrees, pointer tables and
/// the iterative time series.
pub struct GroupMerger<'a, F: ContainerFormat> {
    format: &'a F,
    templates: &'a [PointerTemplate],
    base_items: &'a [String],
}

impl<'a, F: ContainerFormat> GroupMerger<'a, F> {
    pub fn new(format: &'a F, templates: &'a [PointerTemplate], base_items: &'a [String]) -> Self {
        Self {
            format,
            templates,
            base_items,
        }
    }

    /// Merge `entries` into the container at `output`.
    ///
    /// A missing output is created as a verbatim copy of the first entry.
    /// Name widths are checked before the output is touched.
    pub fn merge(&self, output: &Path, entries: &[SolutionEntry]) -> MergeResult<()> {
        let first = entries
            .first()
            .ok_or_else(|| MergeError::not_found("no valid timestep files remain"))?;
        let plans = self.plan(entries.len())?;
        let series = self.scalar_series(entries)?;

        let mut out = self.open_output(output, &first.source_path)?;
        let fail = |e: ContainerError| container_failure(output, e);

        out.require_group(ZONE).map_err(fail)?;
        for plan in &plans {
            for name in &plan.names {
                if out.delete(&layout::join(ZONE, name)).map_err(fail)? {
                    debug!(name = %name, "replaced existing zone child");
                }
            }
        }

        for entry in entries {
            self.copy_entry(entry, &plans, &mut out, output)?;
        }

        for plan in &plans {
            let kind = plan.template.kind;
            out.require_group(&kind.group_path()).map_err(fail)?;
            out.create_or_replace_dataset(&kind.table_path(), &plan.table)
                .map_err(fail)?;
        }

        write_series(&mut out, layout::TIME_VALUES, entries.iter().map(|e| e.time).collect())
            .map_err(fail)?;
        for (item, values) in series {
            write_series(&mut out, item, values).map_err(fail)?;
        }
        out.flush().map_err(fail)?;

        info!(
            output = %output.display(),
            entries = entries.len(),
            "merged container written"
        );
        Ok(())
    }

    fn plan(&self, count: usize) -> MergeResult<Vec<PointerPlan<'a>>> {
        self.templates
            .iter()
            .map(|template| -> MergeResult<PointerPlan<'a>> {
                let names: Vec<String> = (1..=count)
                    .map(|i| rename_with_index(&template.input_name, i))
                    .collect();
                let table = NameTable::encode(&names, template.width).map_err(|e| match e {
                    ContainerError::NameTooLong { name, width } => {
                        MergeError::name_too_long(&name, width)
                    }
                    other => MergeError::unexpected(other.to_string()).with_source(other),
                })?;
                Ok(PointerPlan {
                    template,
                    names,
                    table,
                })
            })
            .collect()
    }

    fn open_output(&self, output: &Path, template: &Path) -> MergeResult<F::Handle> {
        if !output.exists() {
            fs::copy(template, output).map_err(|e| {
                MergeError::cannot_create(format!(
                    "cannot create output container {}",
                    output.display()
                ))
                .with_source(e)
            })?;
            debug!(from = %display_name(template), "output container allocated");
        }
        self.format.open_rw(output).map_err(|e| {
            MergeError::cannot_open(format!("cannot open output container {}", output.display()))
                .with_source(e)
        })
    }

    fn copy_entry(
        &self,
        entry: &SolutionEntry,
        plans: &[PointerPlan<'_>],
        out: &mut F::Handle,
        output: &Path,
    ) -> MergeResult<()> {
        let src = self
            .format
            .open(&entry.source_path)
            .map_err(|e| container_failure(&entry.source_path, e))?;
        if !src.is_group(ZONE) {
            return Err(MergeError::invalid_structure(format!(
                "iRICZone not found in {}",
                entry.file_name()
            )));
        }

        for plan in plans {
            let input_name = &plan.template.input_name;
            let src_path = layout::join(ZONE, input_name);
            if !src.contains(&src_path) {
                return Err(MergeError::invalid_structure(format!(
                    "{input_name} not found in {}",
                    entry.file_name()
                )));
            }
            let output_name = &plan.names[entry.ordinal - 1];
            src.copy_subtree(&src_path, out, &layout::join(ZONE, output_name))
                .map_err(|e| container_failure(output, e))?;
        }
        debug!(ordinal = entry.ordinal, file = %entry.file_name(), "entry copied");
        Ok(())
    }

    /// Per-item value series in ordinal order.
    fn scalar_series(&self, entries: &[SolutionEntry]) -> MergeResult<Vec<(&'a str, Vec<f64>)>> {
        self.base_items
            .iter()
            .map(|item| -> MergeResult<(&'a str, Vec<f64>)> {
                let values = entries
                    .iter()
                    .map(|entry| {
                        entry.scalar_values.get(item).copied().ok_or_else(|| {
                            MergeError::unexpected(format!(
                                "{item} has no value for {}",
                                entry.file_name()
                            ))
                        })
                    })
                    .collect::<MergeResult<Vec<f64>>>()?;
                Ok((item.as_str(), values))
            })
            .collect()
    }
}

fn write_series<C: Container>(out: &mut C, item: &str, values: Vec<f64>) -> Result<(), ContainerError> {
    let group = layout::join(layout::BASE_ITERATIVE, item);
    out.require_group(&group)?;
    out.create_or_replace_dataset(&layout::data_path(&group), &DataArray::vector(values))
}
