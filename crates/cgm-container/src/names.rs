//! Fixed-width name tables.
//!
//! Pointer tables store one name per row as a two-dimensional `int8` dataset
//! of shape `(rows, width)`. Each row holds the UTF-8 bytes of a name followed
//! by NUL padding; a name must leave room for at least one NUL, so its encoded
//! length is strictly less than `width`.

use crate::array::{ArrayValues, DataArray};
use crate::error::{ContainerError, ContainerResult};

/// Decoded contents of a name table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameTable {
    /// Row width in bytes.
    pub width: usize,
    pub names: Vec<String>,
}

impl NameTable {
    /// Decode every row: truncate at the first NUL and keep the valid UTF-8.
    pub fn decode(array: &DataArray) -> ContainerResult<Self> {
        let bytes = match &array.values {
            ArrayValues::Int8(v) => v,
            ArrayValues::Float64(_) => {
                return Err(ContainerError::NotANameTable(
                    "table elements are not bytes".into(),
                ))
            }
        };
        let (rows, width) = match array.shape.as_slice() {
            [rows, width] => (*rows, *width),
            other => {
                return Err(ContainerError::NotANameTable(format!(
                    "expected two dimensions, got {other:?}"
                )))
            }
        };

        let names = (0..rows)
            .map(|row| decode_row(&bytes[row * width..(row + 1) * width]))
            .collect();
        Ok(Self { width, names })
    }

    /// Encode `names` into a `(names.len(), width)` table, NUL-padded.
    pub fn encode(names: &[String], width: usize) -> ContainerResult<DataArray> {
        let mut buf = vec![0i8; names.len() * width];
        for (row, name) in names.iter().enumerate() {
            let raw = name.as_bytes();
            if raw.len() >= width {
                return Err(ContainerError::NameTooLong {
                    name: name.clone(),
                    width,
                });
            }
            let start = row * width;
            for (slot, &byte) in buf[start..start + raw.len()].iter_mut().zip(raw) {
                *slot = byte as i8;
            }
        }
        DataArray::new(vec![names.len(), width], ArrayValues::Int8(buf))
    }
}

fn decode_row(row: &[i8]) -> String {
    let raw: Vec<u8> = row
        .iter()
        .map(|&b| b as u8)
        .take_while(|&b| b != 0)
        .collect();
    raw.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[u8]], width: usize) -> DataArray {
        let mut buf = vec![0i8; rows.len() * width];
        for (r, row) in rows.iter().enumerate() {
            for (c, &b) in row.iter().enumerate() {
                buf[r * width + c] = b as i8;
            }
        }
        DataArray::new(vec![rows.len(), width], ArrayValues::Int8(buf)).unwrap()
    }

    #[test]
    fn decode_truncates_at_first_nul() {
        let arr = table(&[b"FlowSolution1\0junk"], 32);
        let decoded = NameTable::decode(&arr).unwrap();
        assert_eq!(decoded.width, 32);
        assert_eq!(decoded.names, vec!["FlowSolution1"]);
    }

    #[test]
    fn decode_drops_invalid_utf8() {
        let arr = table(&[&[b'A', 0xFF, b'B']], 8);
        assert_eq!(NameTable::decode(&arr).unwrap().names, vec!["AB"]);
    }

    #[test]
    fn decode_rejects_one_dimensional_data() {
        let arr = DataArray::new(vec![4], ArrayValues::Int8(vec![65, 0, 0, 0])).unwrap();
        assert!(matches!(
            NameTable::decode(&arr),
            Err(ContainerError::NotANameTable(_))
        ));
    }

    #[test]
    fn encode_pads_with_nul() {
        let names = vec!["Grid1".to_string(), "Grid2".to_string()];
        let arr = NameTable::encode(&names, 8).unwrap();
        assert_eq!(arr.shape, vec![2, 8]);
        match &arr.values {
            ArrayValues::Int8(v) => {
                assert_eq!(&v[0..6], &[71, 114, 105, 100, 49, 0]);
                assert_eq!(&v[8..13], &[71, 114, 105, 100, 50]);
                assert!(v[13..].iter().all(|&b| b == 0));
            }
            ArrayValues::Float64(_) => panic!("expected byte table"),
        }
        assert_eq!(NameTable::decode(&arr).unwrap().names, names);
    }

    #[test]
    fn encode_rejects_name_filling_whole_row() {
        let err = NameTable::encode(&["ABCD".to_string()], 4).unwrap_err();
        assert!(matches!(err, ContainerError::NameTooLong { width: 4, .. }));
        assert!(NameTable::encode(&["ABC".to_string()], 4).is_ok());
    }

    #[test]
    fn encode_empty_list() {
        let arr = NameTable::encode(&[], 32).unwrap();
        assert_eq!(arr.shape, vec![0, 32]);
        assert!(arr.is_empty());
    }
}
