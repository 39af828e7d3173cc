use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, ContainerResult};

/// Element storage of a dataset, flattened in row-major order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayValues {
    Float64(Vec<f64>),
    /// Single-byte elements; name tables use this type.
    Int8(Vec<i8>),
}

impl ArrayValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Float64(v) => v.len(),
            Self::Int8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A dataset payload together with its shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    pub shape: Vec<usize>,
    pub values: ArrayValues,
}

impl DataArray {
    /// Build an array, checking that `shape` holds exactly the given values.
    ///
    /// An empty shape denotes a scalar and holds one value.
    pub fn new(shape: Vec<usize>, values: ArrayValues) -> ContainerResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(ContainerError::ShapeMismatch {
                shape,
                len: values.len(),
            });
        }
        Ok(Self { shape, values })
    }

    /// One-dimensional float64 array.
    pub fn vector(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len()],
            values: ArrayValues::Float64(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All elements widened to `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        match &self.values {
            ArrayValues::Float64(v) => v.clone(),
            ArrayValues::Int8(v) => v.iter().map(|&b| f64::from(b)).collect(),
        }
    }

    /// The first element in row-major order, if any.
    pub fn first_f64(&self) -> Option<f64> {
        match &self.values {
            ArrayValues::Float64(v) => v.first().copied(),
            ArrayValues::Int8(v) => v.first().map(|&b| f64::from(b)),
        }
    }
}
