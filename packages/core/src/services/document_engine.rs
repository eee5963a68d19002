//! Document Engine
//!
//! Entry point tying the registry, Validator and Promotion Tool together for
//! callers that start from JSON text. The registry is frozen inside an `Arc`
//! once the engine is built; clones of the engine share it and may be used
//! from any number of threads.
//!
//! ## Example Usage
//!
//! ```rust
//! use oxa_core::services::{DocumentEngine, SchemaRegistry};
//!
//! let engine = DocumentEngine::new(SchemaRegistry::with_reference_types());
//! let text = r#"{"type": "Paragraph", "children": [{"type": "Text", "value": "Hello"}]}"#;
//!
//! let tree = engine.parse_str(text).unwrap();
//! assert_eq!(tree.children().len(), 1);
//! assert_eq!(engine.to_value(&tree), serde_json::from_str::<serde_json::Value>(text).unwrap());
//! ```

use crate::config::EngineConfig;
use crate::models::schema::describe_json;
use crate::models::{parse_json, release, Node, RawNode, ValidationReport, Violation};
use crate::services::error::{EngineError, Result};
use crate::services::migration_registry::MigrationRegistry;
use crate::services::promotion::{FieldMapping, Promotion};
use crate::services::schema_registry::SchemaRegistry;
use crate::services::validator::Validator;
use serde_json::Value;
use std::sync::Arc;

/// Validation and promotion over a frozen schema registry
#[derive(Debug, Clone)]
pub struct DocumentEngine {
    registry: Arc<SchemaRegistry>,
    config: EngineConfig,
}

impl DocumentEngine {
    /// Freeze `registry` with the default configuration
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            config: EngineConfig::default(),
        }
    }

    /// Freeze `registry` with `config`
    pub fn with_config(registry: SchemaRegistry, config: EngineConfig) -> Result<Self> {
        Self::from_shared(Arc::new(registry), config)
    }

    /// Build over a registry already shared elsewhere
    pub fn from_shared(registry: Arc<SchemaRegistry>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            "Document engine ready with {} node type(s), max depth {}",
            registry.len(),
            config.validation.max_depth
        );
        Ok(Self { registry, config })
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> Arc<SchemaRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn validator(&self) -> Validator<'_> {
        Validator::with_config(&self.registry, self.config.validation.clone())
    }

    /// Parse and validate a JSON document
    ///
    /// # Errors
    ///
    /// - `Ingest`: not JSON, or the root is not an object
    /// - `Validation`: the tree has violations
    pub fn parse_str(&self, text: &str) -> Result<Node> {
        let raw = ingest(text)?;
        Ok(self.validate(&raw)?)
    }

    /// Validate an already-parsed JSON value
    pub fn parse_value(&self, value: &Value) -> Result<Node> {
        let raw = RawNode::from_value(value.clone())
            .map_err(|other| {
            EngineError::ingest(format!("root must be an object, found {}", describe_json(&other)))
        })?;
        Ok(self.validate(&raw)?)
    }

    /// Parse a JSON document and return its violations, empty when valid
    pub fn check_str(&self, text: &str) -> Result<Vec<Violation>> {
        let raw = ingest(text)?;
        Ok(self.validator().violations(&raw))
    }

    pub fn validate(&self, raw: &RawNode) -> std::result::Result<Node, ValidationReport> {
        self.validator().validate(raw)
    }

    /// Promote after checking the target fields are declared
    pub fn promote(&self, tree: &Node, type_name: &str, mapping: &FieldMapping) -> Result<Node> {
        let promotion = Promotion::new(type_name, mapping.clone());
        promotion.check_declared(&self.registry)?;
        Ok(promotion.promote(tree)?)
    }

    /// Demote after checking the source fields are declared
    pub fn demote(&self, tree: &Node, type_name: &str, mapping: &FieldMapping) -> Result<Node> {
        let promotion = Promotion::new(type_name, mapping.clone());
        promotion.check_declared(&self.registry)?;
        Ok(promotion.demote(tree)?)
    }

    /// Migration steps implied by the registry's `promotedFrom` declarations
    pub fn migrations(&self) -> MigrationRegistry {
        MigrationRegistry::from_schema_registry(&self.registry)
    }

    pub fn to_value(&self, tree: &Node) -> Value {
        tree.to_value()
    }

    pub fn to_json_string(&self, tree: &Node, pretty: bool) -> Result<String> {
        let text = if pretty {
            serde_json::to_string_pretty(tree)?
        } else {
            serde_json::to_string(tree)?
        };
        Ok(text)
    }
}

fn ingest(text: &str) -> Result<RawNode> {
    let value = parse_json(text).map_err(|e| EngineError::ingest(format!("malformed JSON: {}", e)))?;
    match value {
        Value::Object(map) => Ok(RawNode::new(map)),
        other => {
            let message = format!("root must be an object, found {}", describe_json(&other));
            release(other);
            Err(EngineError::ingest(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::models::schema::{FieldKind, FieldSpec, NodeCategory, TypeSchema};
    use crate::models::ViolationKind;
    use serde_json::json;

    fn engine() -> DocumentEngine {
        let mut registry = SchemaRegistry::with_reference_types();
        registry
            .register(
                TypeSchema::empty("Image", NodeCategory::Block)
                    .with_field("alt", FieldSpec::optional(FieldKind::String))
                    .with_field("src", FieldSpec::optional(FieldKind::String)),
            )
            .unwrap();
        DocumentEngine::new(registry)
    }

    #[test]
    fn test_ingest_errors() {
        let engine = engine();
        assert!(matches!(engine.parse_str("[1, 2]"), Err(EngineError::Ingest(_))));
        assert!(matches!(engine.parse_str("{"), Err(EngineError::Ingest(_))));
        assert!(matches!(engine.parse_value(&json!("x")), Err(EngineError::Ingest(_))));
    }

    /// `levels` nodes deep: a Paragraph, nested Strong nodes, then one Text
    fn nested_strong(levels: usize) -> String {
        let strong = levels - 2;
        format!(
            r#"{{"type":"Paragraph","children":[{}{{"type":"Text","value":"deep"}}{}]}}"#,
            r#"{"type":"Strong","children":["#.repeat(strong),
            "]}".repeat(strong)
        )
    }

    #[test]
    fn test_parse_str_accepts_deep_documents() {
        let engine = engine();
        let text = nested_strong(100);

        let tree = engine.parse_str(&text).unwrap();
        assert_eq!(tree.subtree_size(), 100);
        assert!(engine.check_str(&text).unwrap().is_empty());
        assert_eq!(engine.to_json_string(&tree, false).unwrap(), text);
    }

    #[test]
    fn test_depth_beyond_limit_is_a_violation_not_an_ingest_error() {
        let violations = engine().check_str(&nested_strong(20_000)).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::DepthLimit);
        assert_eq!(violations[0].path.depth(), 256);
    }

    #[test]
    fn test_validation_failure_carries_report() {
        let err = engine().parse_str(r#"{"type": "code"}"#).unwrap_err();
        let report = err.report().unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.iter().next().unwrap().kind, ViolationKind::UnknownType);
    }

    #[test]
    fn test_check_str_lists_violations() {
        let engine = engine();
        assert!(engine.check_str(r#"{"type": "ThematicBreak"}"#).unwrap().is_empty());
        assert_eq!(engine.check_str(r#"{"type": "Text"}"#).unwrap().len(), 1);
    }

    #[test]
    fn test_promote_requires_declared_fields() {
        let engine = engine();
        let tree = engine
            .parse_value(&json!({"type": "Image", "data": {"alt": "x"}}))
            .unwrap();

        let promoted = engine
            .promote(&tree, "Image", &FieldMapping::new().with("alt", "alt"))
            .unwrap();
        assert_eq!(promoted.field("alt"), Some(&json!("x")));

        let err = engine
            .promote(&tree, "Image", &FieldMapping::new().with("alt", "title"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Promotion(_)));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            validation: ValidatorConfig {
                max_depth: 0,
                ..ValidatorConfig::default()
            },
        };
        let result = DocumentEngine::with_config(SchemaRegistry::new(), config);
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_json_string_round_trip() {
        let engine = engine();
        let text = r#"{"type":"Heading","level":2,"children":[{"type":"Text","value":"Intro"}]}"#;
        let tree = engine.parse_str(text).unwrap();
        let out = engine.to_json_string(&tree, false).unwrap();
        let reparsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reparsed, serde_json::from_str::<Value>(text).unwrap());
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentEngine>();
    }
}
