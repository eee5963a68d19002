//! Engine Services
//!
//! This module contains the schema-driven services:
//!
//! - `SchemaRegistry` - node type registration and lookup
//! - `Validator` - raw tree checking and typed tree construction
//! - `Promotion` - reversible `data`-to-field migration
//! - `MigrationRegistry` - promotion chains across schema versions
//! - `DocumentEngine` - JSON ingest/egress over a frozen registry
//!
//! Services read the registry and never mutate document trees in place.

pub mod document_engine;
pub mod error;
pub mod migration_registry;
pub mod promotion;
pub mod schema_registry;
pub mod validator;

pub use document_engine::DocumentEngine;
pub use error::{EngineError, PromotionError, RegistryError};
pub use migration_registry::MigrationRegistry;
pub use promotion::{demote, promote, FieldMapping, Promotion};
pub use schema_registry::{Registration, SchemaRegistry};
pub use validator::Validator;
