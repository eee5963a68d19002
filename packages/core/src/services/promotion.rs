//! Promotion Tool
//!
//! Node types evolve by starting new fields out in the free-form `data`
//! bucket and later promoting them to first-class fields. `promote` performs
//! that move over a whole tree; `demote` moves the values back for consumers
//! still on the older schema version.
//!
//! Both run on validated trees and never fail because a key or field is
//! absent. The only document-level failure is a conflict: the destination
//! already holds a different value.
//!
//! ## Example Usage
//!
//! ```rust
//! use oxa_core::models::Node;
//! use oxa_core::services::{promote, FieldMapping};
//! use serde_json::json;
//!
//! let image = Node::empty("Image")
//!     .with_data_entry("alt", "A phase diagram")
//!     .with_data_entry("src", "figures/phase.png");
//! let mapping = FieldMapping::new().with("alt", "alt").with("src", "src");
//!
//! let promoted = promote(&image, "Image", &mapping).unwrap();
//! assert_eq!(
//!     promoted.to_value(),
//!     json!({"type": "Image", "alt": "A phase diagram", "src": "figures/phase.png", "data": {}})
//! );
//! ```

use crate::models::schema::is_base_field;
use crate::models::{Node, NodePath};
use crate::operations::{transform_with_path, Action};
use crate::services::error::PromotionError;
use crate::services::SchemaRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::BTreeMap;

/// Mapping from `data` key to first-class field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder form of `insert`
    pub fn with(mut self, data_key: impl Into<String>, field: impl Into<String>) -> Self {
        self.insert(data_key, field);
        self
    }

    pub fn insert(&mut self, data_key: impl Into<String>, field: impl Into<String>) {
        self.0.insert(data_key.into(), field.into());
    }

    /// Field name `data_key` maps to
    pub fn get(&self, data_key: &str) -> Option<&str> {
        self.0.get(data_key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(data_key, field)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, field)| (key.as_str(), field.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }
}

impl<K, F> FromIterator<(K, F)> for FieldMapping
where
    K: Into<String>,
    F: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, F)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, field)| (key.into(), field.into()))
                .collect(),
        )
    }
}

/// A reversible move of `data` entries to first-class fields for one type
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    type_name: String,
    mapping: FieldMapping,
}

impl Promotion {
    pub fn new(type_name: impl Into<String>, mapping: FieldMapping) -> Self {
        Self {
            type_name: type_name.into(),
            mapping,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// Check that the type is registered and declares every target field
    pub fn check_declared(&self, registry: &SchemaRegistry) -> Result<(), PromotionError> {
        let schema = registry
            .get(&self.type_name)
            .ok_or_else(|| PromotionError::UnknownType {
                type_name: self.type_name.clone(),
            })?;

        match self.mapping.fields().find(|field| schema.field(field).is_none()) {
            Some(field) => Err(self.undeclared(field)),
            None => Ok(()),
        }
    }

    /// Move mapped `data` entries into first-class fields on every node of
    /// this type
    ///
    /// A `data` bucket emptied by the move is kept as `{}`. A destination
    /// field already holding the same value is not a conflict; the `data`
    /// entry is dropped.
    pub fn promote(&self, tree: &Node) -> Result<Node, PromotionError> {
        self.run(tree, "Promoted", Self::promote_node)
    }

    /// Move mapped first-class fields back into `data` on every node of this
    /// type
    ///
    /// `data` is created only on nodes where something moves.
    pub fn demote(&self, tree: &Node) -> Result<Node, PromotionError> {
        self.run(tree, "Demoted", Self::demote_node)
    }

    fn run<F>(&self, tree: &Node, verb: &str, rewrite: F) -> Result<Node, PromotionError>
    where
        F: Fn(&Self, &Node, &NodePath) -> Result<Option<Node>, PromotionError>,
    {
        // Base fields are never first-class fields
        if let Some(field) = self.mapping.fields().find(|field| is_base_field(field)) {
            return Err(self.undeclared(field));
        }

        let mut failure = None;
        let result = transform_with_path(tree, |node: &Node, path: &NodePath| {
            if node.node_type() != self.type_name {
                return Action::Keep;
            }
            match rewrite(self, node, path) {
                Ok(Some(next)) => Action::Replace(next),
                Ok(None) => Action::Keep,
                Err(e) => {
                    failure = Some(e);
                    Action::Stop
                }
            }
        })?;

        if let Some(e) = failure {
            tracing::warn!("{} aborted: {}", verb, e);
            return Err(e);
        }

        tracing::debug!(
            "{} {} '{}' node(s) over {} field(s)",
            verb,
            result.rewrites,
            self.type_name,
            self.mapping.len()
        );
        Ok(result.tree)
    }

    fn promote_node(&self, node: &Node, path: &NodePath) -> Result<Option<Node>, PromotionError> {
        let Some(data) = node.data() else {
            return Ok(None);
        };
        if !self.mapping.iter().any(|(key, _)| data.contains_key(key)) {
            return Ok(None);
        }

        let mut next = node.clone();
        for (key, field) in self.mapping.iter() {
            let Some(value) = next.data_mut().as_mut().and_then(|data| data.remove(key)) else {
                continue;
            };
            match next.fields().get(field) {
                Some(existing) if existing != &value => {
                    return Err(PromotionError::conflict(&self.type_name, key, field, path.clone()));
                }
                Some(_) => {}
                None => {
                    next.fields_mut().insert(field.to_string(), value);
                }
            }
        }
        Ok(Some(next))
    }

    fn demote_node(&self, node: &Node, path: &NodePath) -> Result<Option<Node>, PromotionError> {
        if !self.mapping.fields().any(|field| node.field(field).is_some()) {
            return Ok(None);
        }

        let mut next = node.clone();
        for (key, field) in self.mapping.iter() {
            let Some(value) = next.fields_mut().remove(field) else {
                continue;
            };
            let data = next.data_mut().get_or_insert_with(Map::new);
            match data.get(key) {
                Some(existing) if existing != &value => {
                    return Err(PromotionError::conflict(&self.type_name, key, field, path.clone()));
                }
                Some(_) => {}
                None => {
                    data.insert(key.to_string(), value);
                }
            }
        }
        Ok(Some(next))
    }

    fn undeclared(&self, field: &str) -> PromotionError {
        PromotionError::UndeclaredField {
            type_name: self.type_name.clone(),
            field: field.to_string(),
        }
    }
}

/// Promote `mapping` on every `type_name` node in `tree`
pub fn promote(tree: &Node, type_name: &str, mapping: &FieldMapping) -> Result<Node, PromotionError> {
    Promotion::new(type_name, mapping.clone()).promote(tree)
}

/// Inverse of `promote`
pub fn demote(tree: &Node, type_name: &str, mapping: &FieldMapping) -> Result<Node, PromotionError> {
    Promotion::new(type_name, mapping.clone()).demote(tree)
}
