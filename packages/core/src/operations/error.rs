//! Error types for tree transforms
//!
//! Traversal itself cannot fail; only a rewrite rule asking for a structurally
//! impossible action does.

use crate::models::NodePath;
use thiserror::Error;

/// Errors raised while applying a transform rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// `ReplaceChildren` returned for a leaf or content-free node
    #[error("Node '{type_name}' at {path} has no children to replace")]
    NotAContainer { type_name: String, path: NodePath },

    /// `RemoveSelf` returned for the root; a tree always has a root
    #[error("Cannot remove the root node '{type_name}'")]
    RootRemoved { type_name: String },
}
