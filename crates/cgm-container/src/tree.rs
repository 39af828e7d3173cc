use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::array::DataArray;
use crate::error::{ContainerError, ContainerResult};
use crate::traits::{segments, split_leaf, Container, ContainerFormat};

/// One node of a [`TreeContainer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Group {
        #[serde(default)]
        children: BTreeMap<String, Node>,
    },
    Dataset(DataArray),
}

impl Node {
    pub fn group() -> Self {
        Self::Group {
            children: BTreeMap::new(),
        }
    }
}

/// In-memory container tree, optionally backed by a JSON file.
///
/// Intended for tests and fixtures. It follows the same path rules as the
/// HDF5 adapter so merge logic can be exercised without the native library.
/// Children are kept in name order, matching HDF5's default iteration order.
#[derive(Clone, Debug)]
pub struct TreeContainer {
    root: Node,
    path: Option<PathBuf>,
    writable: bool,
}

impl TreeContainer {
    /// Create an empty, writable, unbacked tree.
    pub fn new() -> Self {
        Self {
            root: Node::group(),
            path: None,
            writable: true,
        }
    }

    /// Load a tree from `path`, read-only.
    pub fn load(path: &Path) -> ContainerResult<Self> {
        let bytes = fs::read(path)?;
        let root: Node = serde_json::from_slice(&bytes)
            .map_err(|e| ContainerError::Serialization(e.to_string()))?;
        if !matches!(root, Node::Group { .. }) {
            return Err(ContainerError::NotAGroup("/".into()));
        }
        Ok(Self {
            root,
            path: Some(path.to_path_buf()),
            writable: false,
        })
    }

    /// Load a tree from `path`; [`Container::flush`] writes it back.
    pub fn load_rw(path: &Path) -> ContainerResult<Self> {
        let mut tree = Self::load(path)?;
        tree.writable = true;
        Ok(tree)
    }

    /// Serialize the tree to `path`.
    pub fn save(&self, path: &Path) -> ContainerResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.root)
            .map_err(|e| ContainerError::Serialization(e.to_string()))?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Write `data` at `path`, creating missing parent groups.
    pub fn insert_dataset(&mut self, path: &str, data: DataArray) -> ContainerResult<()> {
        let (parent, _) = split_leaf(path);
        self.require_group(parent)?;
        self.create_or_replace_dataset(path, &data)
    }

    /// The node at `path`; the empty path is the root.
    pub fn node(&self, path: &str) -> Option<&Node> {
        let mut current = &self.root;
        for seg in segments(path) {
            match current {
                Node::Group { children } => current = children.get(seg)?,
                Node::Dataset(_) => return None,
            }
        }
        Some(current)
    }

    fn ensure_writable(&self) -> ContainerResult<()> {
        if self.writable {
            Ok(())
        } else {
            Err(ContainerError::ReadOnly)
        }
    }

    /// Children map of the group at `path`.
    fn children_mut(&mut self, path: &str) -> ContainerResult<&mut BTreeMap<String, Node>> {
        let mut current = &mut self.root;
        for seg in segments(path) {
            current = match current {
                Node::Group { children } => children
                    .get_mut(seg)
                    .ok_or_else(|| ContainerError::PathNotFound(path.to_string()))?,
                Node::Dataset(_) => return Err(ContainerError::NotAGroup(path.to_string())),
            };
        }
        match current {
            Node::Group { children } => Ok(children),
            Node::Dataset(_) => Err(ContainerError::NotAGroup(path.to_string())),
        }
    }

    fn dataset(&self, path: &str) -> ContainerResult<Option<&DataArray>> {
        match self.node(path) {
            None => Ok(None),
            Some(Node::Dataset(data)) => Ok(Some(data)),
            Some(Node::Group { .. }) => Err(ContainerError::NotADataset(path.to_string())),
        }
    }
}

impl Default for TreeContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for TreeContainer {
    fn contains(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    fn is_group(&self, path: &str) -> bool {
        matches!(self.node(path), Some(Node::Group { .. }))
    }

    fn children(&self, path: &str) -> ContainerResult<Vec<String>> {
        match self.node(path) {
            Some(Node::Group { children }) => Ok(children.keys().cloned().collect()),
            Some(Node::Dataset(_)) => Err(ContainerError::NotAGroup(path.to_string())),
            None => Err(ContainerError::PathNotFound(path.to_string())),
        }
    }

    fn shape(&self, path: &str) -> ContainerResult<Option<Vec<usize>>> {
        Ok(self.dataset(path)?.map(|data| data.shape.clone()))
    }

    fn read(&self, path: &str) -> ContainerResult<Option<DataArray>> {
        Ok(self.dataset(path)?.cloned())
    }

    fn require_group(&mut self, path: &str) -> ContainerResult<()> {
        self.ensure_writable()?;
        let mut current = &mut self.root;
        for seg in segments(path) {
            current = match current {
                Node::Group { children } => children.entry(seg.to_string()).or_insert_with(Node::group),
                Node::Dataset(_) => return Err(ContainerError::NotAGroup(path.to_string())),
            };
        }
        match current {
            Node::Group { .. } => Ok(()),
            Node::Dataset(_) => Err(ContainerError::NotAGroup(path.to_string())),
        }
    }

    fn create_or_replace_dataset(&mut self, path: &str, data: &DataArray) -> ContainerResult<()> {
        self.ensure_writable()?;
        let (parent, leaf) = split_leaf(path);
        let children = self.children_mut(parent)?;
        children.insert(leaf.to_string(), Node::Dataset(data.clone()));
        Ok(())
    }

    fn copy_subtree(&self, src_path: &str, dst: &mut Self, dst_path: &str) -> ContainerResult<()> {
        dst.ensure_writable()?;
        let node = self
            .node(src_path)
            .ok_or_else(|| ContainerError::PathNotFound(src_path.to_string()))?
            .clone();
        let (parent, leaf) = split_leaf(dst_path);
        let children = dst.children_mut(parent)?;
        if children.contains_key(leaf) {
            return Err(ContainerError::AlreadyExists(dst_path.to_string()));
        }
        children.insert(leaf.to_string(), node);
        Ok(())
    }

    fn delete(&mut self, path: &str) -> ContainerResult<bool> {
        self.ensure_writable()?;
        if !self.contains(path) {
            return Ok(false);
        }
        let (parent, leaf) = split_leaf(path);
        Ok(self.children_mut(parent)?.remove(leaf).is_some())
    }

    fn flush(&mut self) -> ContainerResult<()> {
        match (&self.path, self.writable) {
            (Some(path), true) => self.save(path),
            _ => Ok(()),
        }
    }
}

/// Opens JSON-backed [`TreeContainer`] files.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeFormat;

impl ContainerFormat for TreeFormat {
    type Handle = TreeContainer;

    fn open(&self, path: &Path) -> ContainerResult<TreeContainer> {
        TreeContainer::load(path)
    }

    fn open_rw(&self, path: &Path) -> ContainerResult<TreeContainer> {
        TreeContainer::load_rw(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArrayValues;

    fn sample() -> TreeContainer {
        let mut tree = TreeContainer::new();
        tree.insert_dataset(
            "iRIC/BaseIterativeData/TimeValues/ data",
            DataArray::vector(vec![0.5]),
        )
        .unwrap();
        tree.insert_dataset(
            "iRIC/iRICZone/FlowSolution1/Depth/ data",
            DataArray::vector(vec![1.0, 2.0]),
        )
        .unwrap();
        tree
    }

    #[test]
    fn insert_creates_parents() {
        let tree = sample();
        assert!(tree.is_group("iRIC/BaseIterativeData/TimeValues"));
        assert!(!tree.is_group("iRIC/BaseIterativeData/TimeValues/ data"));
        assert_eq!(
            tree.read_f64("iRIC/BaseIterativeData/TimeValues/ data").unwrap(),
            Some(vec![0.5])
        );
    }

    #[test]
    fn read_missing_is_none() {
        let tree = sample();
        assert_eq!(tree.read("iRIC/nothing/ data").unwrap(), None);
        assert_eq!(tree.shape("iRIC/nothing/ data").unwrap(), None);
    }

    #[test]
    fn read_group_as_dataset_fails() {
        let tree = sample();
        assert!(matches!(
            tree.read("iRIC/iRICZone"),
            Err(ContainerError::NotADataset(_))
        ));
    }

    #[test]
    fn children_in_name_order() {
        let mut tree = sample();
        tree.require_group("iRIC/iRICZone/Alpha").unwrap();
        assert_eq!(
            tree.children("iRIC/iRICZone").unwrap(),
            vec!["Alpha".to_string(), "FlowSolution1".to_string()]
        );
    }

    #[test]
    fn replace_dataset_overwrites() {
        let mut tree = sample();
        let path = "iRIC/BaseIterativeData/TimeValues/ data";
        tree.create_or_replace_dataset(path, &DataArray::vector(vec![1.0, 2.0, 3.0]))
            .unwrap();
        assert_eq!(tree.shape(path).unwrap(), Some(vec![3]));
    }

    #[test]
    fn create_dataset_requires_parent() {
        let mut tree = TreeContainer::new();
        let err = tree
            .create_or_replace_dataset("a/b/ data", &DataArray::vector(vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, ContainerError::PathNotFound(_)));
    }

    #[test]
    fn copy_subtree_between_trees() {
        let src = sample();
        let mut dst = TreeContainer::new();
        dst.require_group("iRIC/iRICZone").unwrap();
        src.copy_subtree("iRIC/iRICZone/FlowSolution1", &mut dst, "iRIC/iRICZone/FlowSolution7")
            .unwrap();
        assert_eq!(
            dst.read_f64("iRIC/iRICZone/FlowSolution7/Depth/ data").unwrap(),
            Some(vec![1.0, 2.0])
        );

        let again = src.copy_subtree(
            "iRIC/iRICZone/FlowSolution1",
            &mut dst,
            "iRIC/iRICZone/FlowSolution7",
        );
        assert!(matches!(again, Err(ContainerError::AlreadyExists(_))));
    }

    #[test]
    fn delete_reports_presence() {
        let mut tree = sample();
        assert!(tree.delete("iRIC/iRICZone/FlowSolution1").unwrap());
        assert!(!tree.delete("iRIC/iRICZone/FlowSolution1").unwrap());
        assert!(!tree.contains("iRIC/iRICZone/FlowSolution1/Depth"));
    }

    #[test]
    fn read_only_handle_rejects_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Solution1.cgn");
        sample().save(&path).unwrap();

        let mut handle = TreeFormat.open(&path).unwrap();
        assert!(matches!(
            handle.require_group("x"),
            Err(ContainerError::ReadOnly)
        ));
        assert!(matches!(handle.delete("iRIC"), Err(ContainerError::ReadOnly)));
    }

    #[test]
    fn flush_persists_rw_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Case1.cgn");
        sample().save(&path).unwrap();

        let mut handle = TreeFormat.open_rw(&path).unwrap();
        handle
            .create_or_replace_dataset(
                "iRIC/BaseIterativeData/TimeValues/ data",
                &DataArray::new(vec![2], ArrayValues::Float64(vec![1.0, 2.0])).unwrap(),
            )
            .unwrap();
        handle.flush().unwrap();
        drop(handle);

        let reopened = TreeFormat.open(&path).unwrap();
        assert_eq!(
            reopened
                .read_f64("iRIC/BaseIterativeData/TimeValues/ data")
                .unwrap(),
            Some(vec![1.0, 2.0])
        );
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.cgn");
        std::fs::write(&path, b"\x89HDF\r\n").unwrap();
        assert!(matches!(
            TreeFormat.open(&path),
            Err(ContainerError::Serialization(_))
        ));
    }
}
