//! Schema Registry
//!
//! The single source of truth for node types. Holds one `TypeSchema` per
//! type name; the Validator, traversal predicates and promotion all look
//! types up here, and nothing else hardcodes a type list.
//!
//! ## Lifecycle
//!
//! Registration takes `&mut self`, lookups take `&self`. Populate the registry
//! during initialization, then share it (typically behind an `Arc`) for
//! validation and traversal. The borrow checker enforces the
//! single-writer / many-readers discipline; no locking is involved.
//!
//! ## Example Usage
//!
//! ```rust
//! use oxa_core::models::schema::{FieldKind, FieldSpec, NodeCategory, TypeSchema};
//! use oxa_core::services::SchemaRegistry;
//!
//! let mut registry = SchemaRegistry::with_reference_types();
//! registry
//!     .register(
//!         TypeSchema::empty("Image", NodeCategory::Block)
//!             .with_field("src", FieldSpec::optional(FieldKind::String)),
//!     )
//!     .unwrap();
//!
//! assert!(registry.resolve("Image").is_ok());
//! assert!(registry.resolve("image").is_err());
//! ```

use crate::models::schema::{is_valid_type_name, NodeCategory, TypeSchema, INLINE_PREFIX};
use crate::models::{reference_schemas, Node};
use crate::services::error::{EngineError, RegistryError};
use serde_json::Value;
use std::collections::HashMap;

/// What a successful `register` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Name was new
    Inserted,
    /// Identical schema already present
    Unchanged,
    /// Compatible successor replaced an older version
    Upgraded { from: u32, to: u32 },
}

/// Registry of node type schemas keyed by type name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, TypeSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Create a registry holding the reference type set
    pub fn with_reference_types() -> Self {
        let mut registry = Self::new();
        for schema in reference_schemas() {
            // Reference schemas are self-consistent and pairwise distinct
            if let Err(e) = registry.register(schema) {
                tracing::error!("Failed to register reference schema: {}", e);
            }
        }
        registry
    }

    /// Insert or replace a schema
    ///
    /// # Errors
    ///
    /// - `InvalidTypeName`: name breaks the `[A-Z][A-Za-z0-9]*` convention
    /// - `InvalidSchema`: schema fails `TypeSchema::check`
    /// - `DuplicateType`: a different schema holds the name and `schema` is not
    ///   a compatible successor of it
    pub fn register(&mut self, schema: TypeSchema) -> Result<Registration, RegistryError> {
        if !is_valid_type_name(&schema.name) {
            return Err(RegistryError::InvalidTypeName {
                name: schema.name.clone(),
            });
        }

        schema
            .check()
            .map_err(|reason| RegistryError::invalid_schema(&schema.name, reason))?;

        let outcome = match self.schemas.get(&schema.name) {
            None => Registration::Inserted,
            Some(existing) if existing == &schema => return Ok(Registration::Unchanged),
            Some(existing) => {
                existing
                    .compatible_successor(&schema)
                    .map_err(|reason| RegistryError::duplicate_type(&schema.name, reason))?;
                Registration::Upgraded {
                    from: existing.version,
                    to: schema.version,
                }
            }
        };

        match outcome {
            Registration::Upgraded { from, to } => {
                tracing::info!("Upgraded node type '{}' from v{} to v{}", schema.name, from, to);
            }
            _ => {
                tracing::debug!("Registered node type '{}' v{}", schema.name, schema.version);
            }
        }

        self.schemas.insert(schema.name.clone(), schema);
        Ok(outcome)
    }

    /// Register several schemas, stopping at the first failure
    pub fn register_all(
        &mut self,
        schemas: impl IntoIterator<Item = TypeSchema>,
    ) -> Result<(), RegistryError> {
        for schema in schemas {
            self.register(schema)?;
        }
        Ok(())
    }

    /// Register schemas described as a JSON array of `TypeSchema` objects
    ///
    /// Returns how many schemas were inserted or upgraded.
    pub fn register_json_str(&mut self, text: &str) -> Result<usize, EngineError> {
        let schemas: Vec<TypeSchema> = serde_json::from_str(text)?;
        let mut changed = 0;
        for schema in schemas {
            if self.register(schema)? != Registration::Unchanged {
                changed += 1;
            }
        }
        tracing::info!("Loaded {} schema(s) from JSON", changed);
        Ok(changed)
    }

    /// Look up a schema by exact type name
    pub fn resolve(&self, type_name: &str) -> Result<&TypeSchema, RegistryError> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| RegistryError::unknown_type(type_name))
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeSchema> {
        self.schemas.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn schemas(&self) -> impl Iterator<Item = &TypeSchema> {
        self.schemas.values()
    }

    /// Category of a registered type
    pub fn category_of(&self, type_name: &str) -> Option<NodeCategory> {
        self.schemas.get(type_name).map(|schema| schema.category)
    }

    /// If `type_name` is the inline counterpart of a registered block type,
    /// return that block type's schema
    ///
    /// `InlineCode` mirrors `Code` when both are registered, `InlineCode` is
    /// inline and `Code` is block.
    pub fn is_inline_variant_of(&self, type_name: &str) -> Option<&TypeSchema> {
        let variant = self.schemas.get(type_name)?;
        let root = type_name.strip_prefix(INLINE_PREFIX)?;
        if root.is_empty() || variant.category != NodeCategory::Inline {
            return None;
        }
        self.schemas
            .get(root)
            .filter(|block| block.category == NodeCategory::Block)
    }

    /// Inline counterpart of a registered block type, if one is registered
    pub fn inline_variant(&self, block_type: &str) -> Option<&TypeSchema> {
        let variant_name = format!("{}{}", INLINE_PREFIX, block_type);
        self.is_inline_variant_of(&variant_name)?;
        self.schemas.get(&variant_name)
    }

    /// A node's field value, falling back to the schema default
    pub fn field_value<'a>(&'a self, node: &'a Node, field: &str) -> Option<&'a Value> {
        node.field(field).or_else(|| {
            self.schemas
                .get(node.node_type())
                .and_then(|schema| schema.field(field))
                .and_then(|spec| spec.default_value.as_ref())
        })
    }
}
