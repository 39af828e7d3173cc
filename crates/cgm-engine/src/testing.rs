//! Fixture builders for timestep containers backed by [`TreeContainer`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cgm_container::{ArrayValues, Container, DataArray, NameTable, TreeContainer};
use cgm_types::layout;
use cgm_types::PointerKind;

pub(crate) const FLOW_NAME: &str = "FlowSolution1";
pub(crate) const GRID_NAME: &str = "GridCoordinatesForSolution1";
pub(crate) const WIDTH: usize = 32;

/// Description of one timestep container.
#[derive(Clone, Debug)]
pub(crate) struct SolutionSpec {
    time: f64,
    /// Payload of the time-values dataset; `None` leaves it out.
    time_payload: Option<Vec<f64>>,
    scalars: Vec<(String, Vec<f64>)>,
    grid: Option<(usize, usize)>,
    flow_width: usize,
}

impl SolutionSpec {
    pub(crate) fn new(time: f64) -> Self {
        Self {
            time,
            time_payload: Some(vec![time]),
            scalars: Vec::new(),
            grid: None,
            flow_width: WIDTH,
        }
    }

    pub(crate) fn scalar(mut self, name: &str, value: f64) -> Self {
        self.scalars.push((name.to_string(), vec![value]));
        self
    }

    /// A scalar item whose payload holds no elements.
    pub(crate) fn empty_scalar(mut self, name: &str) -> Self {
        self.scalars.push((name.to_string(), Vec::new()));
        self
    }

    pub(crate) fn grid(mut self, nx: usize, ny: usize) -> Self {
        self.grid = Some((nx, ny));
        self
    }

    pub(crate) fn without_time(mut self) -> Self {
        self.time_payload = None;
        self
    }

    /// A time-values dataset that exists but holds no elements.
    pub(crate) fn empty_time(mut self) -> Self {
        self.time_payload = Some(Vec::new());
        self
    }

    /// Row width of the flow-solution pointer table.
    pub(crate) fn flow_width(mut self, width: usize) -> Self {
        self.flow_width = width;
        self
    }
}

/// A fixed-width pointer table holding `names`.
pub(crate) fn pointer_table(names: &[&str], width: usize) -> DataArray {
    let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    NameTable::encode(&names, width).unwrap()
}

/// Build the container described by a fixture description.
///
/// The flow subtree carries a `Depth` array holding the time, so copies can
/// be traced back to their source.
pub(crate) fn solution_tree(spec: &SolutionSpec) -> TreeContainer {
    let mut tree = TreeContainer::new();
    tree.require_group(layout::BASE_ITERATIVE).unwrap();

    if let Some(times) = &spec.time_payload {
        tree.insert_dataset(&layout::time_values_path(), DataArray::vector(times.clone()))
            .unwrap();
    }
    for (name, values) in &spec.scalars {
        tree.insert_dataset(&layout::base_item_path(name), DataArray::vector(values.clone()))
            .unwrap();
    }

    let flow = layout::join(layout::ZONE, FLOW_NAME);
    tree.insert_dataset(
        &layout::data_path(&layout::join(&flow, "Depth")),
        DataArray::vector(vec![spec.time; 4]),
    )
    .unwrap();
    let grid = layout::join(layout::ZONE, GRID_NAME);
    tree.insert_dataset(
        &layout::data_path(&layout::join(&grid, layout::COORDINATE_X)),
        DataArray::vector(vec![0.0, 1.0]),
    )
    .unwrap();

    tree.insert_dataset(
        &PointerKind::FlowSolution.table_path(),
        pointer_table(&[FLOW_NAME], spec.flow_width),
    )
    .unwrap();
    tree.insert_dataset(
        &PointerKind::GridCoordinates.table_path(),
        pointer_table(&[GRID_NAME], WIDTH),
    )
    .unwrap();

    if let Some((nx, ny)) = spec.grid {
        let (x_path, y_path) = layout::coordinate_paths();
        for path in [x_path, y_path] {
            let values = ArrayValues::Float64(vec![0.0; nx * ny]);
            tree.insert_dataset(&path, DataArray::new(vec![nx, ny], values).unwrap())
                .unwrap();
        }
    }
    tree
}

/// Log lines captured from a scoped `tracing` subscriber.
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Run `f` with WARN-and-above events recorded here.
    pub(crate) fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Save each fixture under `dir` and return the paths in the given order.
pub(crate) fn write_solutions(dir: &Path, files: &[(&str, SolutionSpec)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, spec)| {
            let path = dir.join(name);
            solution_tree(spec).save(&path).unwrap();
            path
        })
        .collect()
}
