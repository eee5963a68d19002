//! Traversal and Transform Operations
//!
//! Type-agnostic walking and rewriting over validated `Node` trees:
//!
//! - [`visit`] - depth-first walk with enter/leave hooks
//! - [`find`] / [`matches`] - lazy pre-order search
//! - [`transform`] - bottom-up copy-on-write rewrite, composable via [`Pipeline`]
//!
//! None of these consult node type names beyond what a caller's predicate or
//! rule does; structure is read from each node's content class.

pub mod error;
pub mod find;
pub mod predicate;
pub mod transform;
pub mod visit;

pub use error::TransformError;
pub use find::{find, matches, Match, Matches};
pub use predicate::{any_node, by_category, by_content_class, by_type};
pub use transform::{transform, transform_with_path, Action, Pipeline, Transformed};
pub use visit::{visit, Hooks, VisitResult, Visitor};
