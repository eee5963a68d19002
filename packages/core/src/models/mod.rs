//! Data Models
//!
//! This module contains the core data structures of the document tree engine:
//!
//! - `Node` / `RawNode` - Validated and untrusted node representations
//! - `NodePath` - Addressing nodes from the root
//! - `TypeSchema` and friends - Node type schemas held by the registry
//! - `Violation` / `ValidationReport` - Validator output
//! - `reference_schemas` - The reference node type set

pub mod core_schemas;
mod node;
pub mod path;
pub mod schema;
pub mod violation;

#[cfg(test)]
mod node_test;

pub use core_schemas::reference_schemas;
pub use node::{Content, Node, RawNode};
pub(crate) use node::{parse_json, release};
pub use path::{NodePath, PathSegment};
pub use schema::{
    ChildClass, ContentClass, FieldKind, FieldSpec, NodeCategory, PromotedFrom, TypeSchema,
};
pub use violation::{ValidationReport, Violation, ViolationKind};
