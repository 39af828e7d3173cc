use std::ffi::CString;
use std::path::Path;

use hdf5::types::{IntSize, TypeDescriptor};
use hdf5::{File, Group};
use hdf5_sys::h5o::H5Ocopy;
use hdf5_sys::h5p::H5P_DEFAULT;
use tracing::debug;

use crate::array::{ArrayValues, DataArray};
use crate::error::{ContainerError, ContainerResult};
use crate::traits::{segments, split_leaf, Container, ContainerFormat};

/// A CGNS/HDF5 file opened through the `hdf5` crate.
pub struct Hdf5Container {
    file: File,
    writable: bool,
}

impl Hdf5Container {
    fn ensure_writable(&self) -> ContainerResult<()> {
        if self.writable {
            Ok(())
        } else {
            Err(ContainerError::ReadOnly)
        }
    }

    /// Open the group at `path`; the empty path is the root group.
    fn group(&self, path: &str) -> ContainerResult<Group> {
        let path = if path.is_empty() { "/" } else { path };
        Ok(self.file.group(path)?)
    }

    fn c_path(path: &str) -> ContainerResult<CString> {
        CString::new(path).map_err(|_| ContainerError::PathNotFound(path.to_string()))
    }
}

impl std::fmt::Debug for Hdf5Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hdf5Container")
            .field("file", &self.file.filename())
            .field("writable", &self.writable)
            .finish()
    }
}

impl Container for Hdf5Container {
    fn contains(&self, path: &str) -> bool {
        // H5Lexists only tolerates missing leaves, so walk every prefix.
        let mut prefix = String::new();
        for seg in segments(path) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(seg);
            if !self.file.link_exists(&prefix) {
                return false;
            }
        }
        true
    }

    fn is_group(&self, path: &str) -> bool {
        self.contains(path) && self.group(path).is_ok()
    }

    fn children(&self, path: &str) -> ContainerResult<Vec<String>> {
        if !self.contains(path) {
            return Err(ContainerError::PathNotFound(path.to_string()));
        }
        let group = self
            .group(path)
            .map_err(|_| ContainerError::NotAGroup(path.to_string()))?;
        Ok(group.member_names()?)
    }

    fn shape(&self, path: &str) -> ContainerResult<Option<Vec<usize>>> {
        if !self.contains(path) {
            return Ok(None);
        }
        let dataset = self
            .file
            .dataset(path)
            .map_err(|_| ContainerError::NotADataset(path.to_string()))?;
        Ok(Some(dataset.shape()))
    }

    fn read(&self, path: &str) -> ContainerResult<Option<DataArray>> {
        if !self.contains(path) {
            return Ok(None);
        }
        let dataset = self
            .file
            .dataset(path)
            .map_err(|_| ContainerError::NotADataset(path.to_string()))?;
        let shape = dataset.shape();
        let values = match dataset.dtype()?.to_descriptor()? {
            TypeDescriptor::Integer(IntSize::U1) => ArrayValues::Int8(dataset.read_raw::<i8>()?),
            // Read unsigned bytes as stored; a library conversion to i8 would clamp them.
            TypeDescriptor::Unsigned(IntSize::U1) => ArrayValues::Int8(
                dataset
                    .read_raw::<u8>()?
                    .into_iter()
                    .map(|b| b as i8)
                    .collect(),
            ),
            _ => ArrayValues::Float64(dataset.read_raw::<f64>()?),
        };
        Ok(Some(DataArray::new(shape, values)?))
    }

    fn require_group(&mut self, path: &str) -> ContainerResult<()> {
        self.ensure_writable()?;
        let mut current = self.group("")?;
        for seg in segments(path) {
            current = if current.link_exists(seg) {
                current
                    .group(seg)
                    .map_err(|_| ContainerError::NotAGroup(path.to_string()))?
            } else {
                current.create_group(seg)?
            };
        }
        Ok(())
    }

    fn create_or_replace_dataset(&mut self, path: &str, data: &DataArray) -> ContainerResult<()> {
        self.ensure_writable()?;
        let (parent, leaf) = split_leaf(path);
        if !self.is_group(parent) {
            return Err(ContainerError::PathNotFound(parent.to_string()));
        }
        let group = self.group(parent)?;
        if group.link_exists(leaf) {
            group.unlink(leaf)?;
        }
        match &data.values {
            ArrayValues::Float64(values) => {
                let dataset = group
                    .new_dataset::<f64>()
                    .shape(data.shape.clone())
                    .create(leaf)?;
                dataset.write_raw(values.as_slice())?;
            }
            ArrayValues::Int8(values) => {
                let dataset = group
                    .new_dataset::<i8>()
                    .shape(data.shape.clone())
                    .create(leaf)?;
                dataset.write_raw(values.as_slice())?;
            }
        }
        debug!(path, shape = ?data.shape, "dataset written");
        Ok(())
    }

    fn copy_subtree(&self, src_path: &str, dst: &mut Self, dst_path: &str) -> ContainerResult<()> {
        dst.ensure_writable()?;
        if !self.contains(src_path) {
            return Err(ContainerError::PathNotFound(src_path.to_string()));
        }
        if dst.contains(dst_path) {
            return Err(ContainerError::AlreadyExists(dst_path.to_string()));
        }
        let src_name = Self::c_path(src_path)?;
        let dst_name = Self::c_path(dst_path)?;
        // Raw library calls must hold the same global lock as the safe API.
        let status = hdf5::sync::sync(|| {
            // SAFETY: both location ids belong to files kept open by `self`
            // and `dst` for the duration of the call, and the name pointers
            // come from CStrings that outlive it.
            unsafe {
                H5Ocopy(
                    self.file.id(),
                    src_name.as_ptr(),
                    dst.file.id(),
                    dst_name.as_ptr(),
                    H5P_DEFAULT,
                    H5P_DEFAULT,
                )
            }
        });
        if status < 0 {
            return Err(ContainerError::Backend(format!(
                "failed to copy {src_path} to {dst_path}"
            )));
        }
        Ok(())
    }

    fn delete(&mut self, path: &str) -> ContainerResult<bool> {
        self.ensure_writable()?;
        if !self.contains(path) {
            return Ok(false);
        }
        let (parent, leaf) = split_leaf(path);
        self.group(parent)?.unlink(leaf)?;
        Ok(true)
    }

    fn flush(&mut self) -> ContainerResult<()> {
        if self.writable {
            self.file.flush()?;
        }
        Ok(())
    }
}

/// Opens CGNS files stored as HDF5.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hdf5Format;

impl ContainerFormat for Hdf5Format {
    type Handle = Hdf5Container;

    fn open(&self, path: &Path) -> ContainerResult<Hdf5Container> {
        Ok(Hdf5Container {
            file: File::open(path)?,
            writable: false,
        })
    }

    fn open_rw(&self, path: &Path) -> ContainerResult<Hdf5Container> {
        Ok(Hdf5Container {
            file: File::open_rw(path)?,
            writable: true,
        })
    }
}
