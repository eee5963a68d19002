//! Schema Migration Registry
//!
//! Chains promotions across schema versions. Each registered step moves a
//! type from version N to N+1 by promoting a set of `data` keys; walking the
//! chain backwards demotes them again, so a tree can be produced for any
//! consumer version in the chain.
//!
//! ## Architecture
//!
//! - **One step per version**: steps are keyed by (type, from_version)
//! - **Chaining**: `upgrade` applies v1→v2→v3, `downgrade` v3→v2→v1
//! - **Schema-derived**: `from_schema_registry` builds steps from the
//!   `promotedFrom` declarations of registered schemas
//!
//! ## Example Usage
//!
//! ```rust
//! use oxa_core::models::Node;
//! use oxa_core::services::{FieldMapping, MigrationRegistry};
//!
//! let mut migrations = MigrationRegistry::new();
//! migrations.register_promotion("Image", 1, FieldMapping::new().with("alt", "alt"));
//! migrations.register_promotion("Image", 2, FieldMapping::new().with("src", "src"));
//!
//! let legacy = Node::empty("Image")
//!     .with_data_entry("alt", "diagram")
//!     .with_data_entry("src", "a.png");
//!
//! let current = migrations.upgrade(&legacy, "Image", 1, 3).unwrap();
//! assert_eq!(current.field("src").and_then(|v| v.as_str()), Some("a.png"));
//!
//! let back = migrations.downgrade(&current, "Image", 3, 1).unwrap();
//! assert_eq!(back, legacy);
//! ```

use crate::models::Node;
use crate::services::error::PromotionError;
use crate::services::promotion::{FieldMapping, Promotion};
use crate::services::SchemaRegistry;
use std::collections::{BTreeMap, HashMap};

/// Registry of per-version promotion steps
///
/// Stores one `Promotion` keyed by (type_name, from_version); the step
/// targets `from_version + 1`.
#[derive(Debug, Clone, Default)]
pub struct MigrationRegistry {
    steps: HashMap<(String, u32), Promotion>,
}

impl MigrationRegistry {
    /// Create a new empty migration registry
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
        }
    }

    /// Derive steps from every `promotedFrom` declaration in `registry`
    ///
    /// Fields promoted in version N form the step from N-1 to N.
    pub fn from_schema_registry(registry: &SchemaRegistry) -> Self {
        let mut migrations = Self::new();
        for schema in registry.schemas() {
            let mut by_version: BTreeMap<u32, FieldMapping> = BTreeMap::new();
            for (field, spec) in &schema.fields {
                if let Some(promoted) = &spec.promoted_from {
                    by_version
                        .entry(promoted.since_version)
                        .or_default()
                        .insert(promoted.data_key.clone(), field.clone());
                }
            }

            for (since_version, mapping) in by_version {
                match since_version.checked_sub(1) {
                    Some(from_version) => {
                        migrations.register_promotion(&schema.name, from_version, mapping)
                    }
                    None => tracing::warn!(
                        "Ignoring promotion into version 0 of '{}'",
                        schema.name
                    ),
                }
            }
        }
        migrations
    }

    /// Register the step taking `type_name` from `from_version` to
    /// `from_version + 1`, replacing any existing step
    ///
    /// `u32::MAX` has no successor version; a step from it is ignored.
    pub fn register_promotion(
        &mut self,
        type_name: impl Into<String>,
        from_version: u32,
        mapping: FieldMapping,
    ) {
        let type_name = type_name.into();
        let Some(to_version) = from_version.checked_add(1) else {
            tracing::warn!(
                "Ignoring migration of '{}' from v{}: no later version exists",
                type_name,
                from_version
            );
            return;
        };
        tracing::debug!(
            "Registered migration {} v{}→v{} ({} field(s))",
            type_name,
            from_version,
            to_version,
            mapping.len()
        );
        let step = Promotion::new(type_name.clone(), mapping);
        self.steps.insert((type_name, from_version), step);
    }

    /// Promote every `type_name` node from `from_version` up to `to_version`
    ///
    /// A `to_version` at or below `from_version` returns the tree unchanged.
    ///
    /// # Errors
    ///
    /// - `MissingStep`: a version in the chain has no registered step
    /// - `Conflict`: a step found a differing value at its destination
    pub fn upgrade(
        &self,
        tree: &Node,
        type_name: &str,
        from_version: u32,
        to_version: u32,
    ) -> Result<Node, PromotionError> {
        let mut migrated = tree.clone();
        for version in from_version..to_version {
            migrated = self.step(type_name, version)?.promote(&migrated)?;
        }
        Ok(migrated)
    }

    /// Demote every `type_name` node from `from_version` down to `to_version`
    ///
    /// A `to_version` at or above `from_version` returns the tree unchanged.
    pub fn downgrade(
        &self,
        tree: &Node,
        type_name: &str,
        from_version: u32,
        to_version: u32,
    ) -> Result<Node, PromotionError> {
        let mut migrated = tree.clone();
        for version in (to_version..from_version).rev() {
            migrated = self.step(type_name, version)?.demote(&migrated)?;
        }
        Ok(migrated)
    }

    /// Check if every step between the two versions is registered, in
    /// either direction
    pub fn has_migration_path(&self, type_name: &str, from_version: u32, to_version: u32) -> bool {
        let (low, high) = if from_version <= to_version {
            (from_version, to_version)
        } else {
            (to_version, from_version)
        };
        (low..high).all(|version| self.steps.contains_key(&(type_name.to_string(), version)))
    }

    /// Get the number of registered steps
    pub fn migration_count(&self) -> usize {
        self.steps.len()
    }

    fn step(&self, type_name: &str, from_version: u32) -> Result<&Promotion, PromotionError> {
        self.steps
            .get(&(type_name.to_string(), from_version))
            .ok_or_else(|| PromotionError::MissingStep {
                type_name: type_name.to_string(),
                from_version,
                to_version: from_version.saturating_add(1),
            })
    }
}
