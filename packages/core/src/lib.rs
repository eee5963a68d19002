//! OXA Document Tree Engine
//!
//! Schema-driven validation, traversal and evolution of OXA document trees:
//! JSON-shaped node trees whose every node carries a `type`, ordered
//! `children` or a scalar `value`, an open `data` bucket, and the fields its
//! type declares.
//!
//! # Architecture
//!
//! - **Runtime type catalog**: node types are `TypeSchema` values registered
//!   in a `SchemaRegistry`, never compiled-in cases
//! - **Collect, don't throw**: the Validator reports every violation in a
//!   document at once
//! - **Copy-on-write rewriting**: transforms build new trees bottom-up and
//!   share unchanged subtrees
//! - **Reversible evolution**: fields graduate from `data` to first-class via
//!   promotion, and demotion undoes it for older consumers
//!
//! # Modules
//!
//! - [`models`] - Node, RawNode, TypeSchema, violations, paths
//! - [`services`] - SchemaRegistry, Validator, Promotion, MigrationRegistry, DocumentEngine
//! - [`operations`] - visit, find, transform
//! - [`config`] - engine configuration

pub mod config;
pub mod models;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use config::{EngineConfig, ValidatorConfig};
pub use models::*;
pub use operations::{find, transform, visit, Action, Transformed, TransformError};
pub use services::*;
