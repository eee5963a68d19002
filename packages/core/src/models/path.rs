//! Tree Paths
//!
//! A `NodePath` addresses a node inside a document tree as the sequence of
//! steps taken from the root. Steps are child indices for `children`, plus a
//! field segment when descending into a `nodeList` field.
//!
//! Paths display in a slash-separated form: `/` is the root, `/0/2` is the
//! third child of the first child, `/1/outputs/0` is the first element of the
//! `outputs` field on the root's second child.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step from a node to a node beneath it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Index into the parent's `children`
    Index(usize),

    /// Name of a `nodeList` field on the parent
    Field(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Field(name) => write!(f, "{}", name),
        }
    }
}

/// Location of a node relative to the tree root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    /// The root path (no segments)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Child indices only, skipping field segments
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().filter_map(|segment| match segment {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Field(_) => None,
        })
    }

    /// Return a new path extended by one child index
    pub fn child(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.push_index(index);
        next
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub fn push_field(&mut self, name: impl Into<String>) {
        self.0.push(PathSegment::Field(name.into()));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices.into_iter().map(PathSegment::Index).collect())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display() {
        assert_eq!(NodePath::root().to_string(), "/");

        let mut path = NodePath::from(vec![0, 2]);
        assert_eq!(path.to_string(), "/0/2");

        path.push_field("outputs");
        path.push_index(1);
        assert_eq!(path.to_string(), "/0/2/outputs/1");
    }

    #[test]
    fn test_serializes_as_flat_array() {
        let mut path = NodePath::from(vec![1]);
        path.push_field("outputs");
        path.push_index(0);

        assert_eq!(serde_json::to_value(&path).unwrap(), json!([1, "outputs", 0]));

        let back: NodePath = serde_json::from_value(json!([1, "outputs", 0])).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn test_indices_skip_fields() {
        let mut path = NodePath::from(vec![3]);
        path.push_field("errors");
        path.push_index(4);

        assert_eq!(path.indices().collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(path.depth(), 3);
    }
}
