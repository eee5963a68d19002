//! Validator
//!
//! Checks a raw tree against the Schema Registry and the universal base-shape
//! rules, producing either a typed `Node` tree or every violation found.
//!
//! ## Algorithm (root first, children after)
//!
//! 1. `type` must be present and registered, otherwise `UnknownTypeError` and
//!    the subtree is skipped
//! 2. Content shape must match the content class (`ContentShapeError`)
//! 3. Declared fields: missing required (`MissingFieldError`), wrong kind
//!    (`FieldTypeError`), undeclared top-level keys (`UnexpectedFieldError`)
//! 4. Each child's category must fit the parent's child class
//!    (`InvalidChildClassError`)
//! 5. Recurse into children (and `nodeList` fields), collecting violations
//!    by path
//! 6. `data` must be a mapping; its contents are never inspected
//!
//! Validation is pure: the input is only read.

use crate::config::ValidatorConfig;
use crate::models::schema::{describe_json, is_base_field, ContentClass, FieldKind, FieldSpec};
use crate::models::{
    Content, Node, NodePath, RawNode, TypeSchema, ValidationReport, Violation, ViolationKind,
};
use crate::services::schema_registry::SchemaRegistry;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Remaining stack below which a nested check continues on a fresh segment
const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each heap-allocated stack segment
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Schema-driven tree validator
///
/// # Examples
///
/// ```rust
/// use oxa_core::models::RawNode;
/// use oxa_core::services::{SchemaRegistry, Validator};
///
/// let registry = SchemaRegistry::with_reference_types();
/// let validator = Validator::new(&registry);
///
/// let raw = RawNode::from_json_str(r#"{"type": "Code", "value": "x=1", "children": []}"#).unwrap();
/// let report = validator.validate(&raw).unwrap_err();
/// assert_eq!(report.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
    config: ValidatorConfig,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_config(registry, ValidatorConfig::default())
    }

    pub fn with_config(registry: &'r SchemaRegistry, config: ValidatorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a raw tree
    ///
    /// Returns the typed tree when there are zero violations anywhere,
    /// otherwise the full report.
    pub fn validate(&self, raw: &RawNode) -> Result<Node, ValidationReport> {
        let mut violations = Vec::new();
        let mut path = NodePath::root();
        let node = self.check_node(raw.as_map(), &mut path, 0, &mut violations);
        self.finish(node, violations)
    }

    /// Validate an arbitrary JSON value as a tree root
    pub fn validate_value(&self, value: &Value) -> Result<Node, ValidationReport> {
        let mut violations = Vec::new();
        let mut path = NodePath::root();
        let node = self.check_value(value, &mut path, 0, &mut violations);
        self.finish(node, violations)
    }

    /// Collect violations without building a tree
    pub fn violations(&self, raw: &RawNode) -> Vec<Violation> {
        match self.validate(raw) {
            Ok(_) => Vec::new(),
            Err(report) => report.into_violations(),
        }
    }

    fn finish(
        &self,
        node: Option<Node>,
        violations: Vec<Violation>,
    ) -> Result<Node, ValidationReport> {
        tracing::debug!("Validation finished with {} violation(s)", violations.len());
        match node {
            Some(node) if violations.is_empty() => Ok(node),
            _ => Err(ValidationReport::new(violations)),
        }
    }

    fn check_value(
        &self,
        value: &Value,
        path: &mut NodePath,
        depth: usize,
        out: &mut Vec<Violation>,
    ) -> Option<Node> {
        // Every descent passes through here
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || match value {
            Value::Object(map) => self.check_node(map, path, depth, out),
            other => {
                out.push(Violation::new(
                    path.clone(),
                    ViolationKind::ContentShape,
                    None,
                    format!("expected a node object, found {}", describe_json(other)),
                ));
                None
            }
        })
    }

    fn check_node(
        &self,
        map: &Map<String, Value>,
        path: &mut NodePath,
        depth: usize,
        out: &mut Vec<Violation>,
    ) -> Option<Node> {
        let start = out.len();

        if depth >= self.config.max_depth {
            out.push(Violation::new(
                path.clone(),
                ViolationKind::DepthLimit,
                map.get("type").and_then(Value::as_str),
                format!("tree is nested deeper than {} levels", self.config.max_depth),
            ));
            return None;
        }

        let schema = self.resolve_type(map, path, out)?;
        let name = schema.name.as_str();

        self.check_content_shape(schema, map, path, out);

        if schema.content_class == ContentClass::Leaf {
            if let Some(value) = map.get("value") {
                let kind = schema.value_kind();
                if !kind.matches(value) {
                    out.push(Violation::new(
                        path.clone(),
                        ViolationKind::FieldType,
                        Some(name),
                        format!("`value` must be {}, found {}", kind, describe_json(value)),
                    ));
                }
            }
        }

        let data = map.get("data");
        for (field, spec) in &schema.fields {
            match map.get(field) {
                Some(value) if !spec.kind.matches(value) => {
                    out.push(Violation::new(
                        path.clone(),
                        ViolationKind::FieldType,
                        Some(name),
                        format!(
                            "field '{}' must be {}, found {}",
                            field,
                            spec.kind,
                            describe_json(value)
                        ),
                    ));
                }
                Some(value) if spec.kind == FieldKind::NodeList => {
                    self.check_node_list(field, value, path, depth, out);
                }
                Some(_) => {}
                None if spec.required && !self.accepts_legacy(schema, field, spec, data) => {
                    out.push(Violation::new(
                        path.clone(),
                        ViolationKind::MissingField,
                        Some(name),
                        format!("required field '{}' is missing", field),
                    ));
                }
                None => {}
            }
        }

        for key in map.keys() {
            if !is_base_field(key) && !schema.fields.contains_key(key) {
                out.push(Violation::new(
                    path.clone(),
                    ViolationKind::UnexpectedField,
                    Some(name),
                    format!(
                        "field '{}' is not declared by '{}'; extensions belong under `data`",
                        key, name
                    ),
                ));
            }
        }

        if let Some(data) = data {
            if !data.is_object() {
                out.push(Violation::new(
                    path.clone(),
                    ViolationKind::FieldType,
                    Some(name),
                    format!("`data` must be an object, found {}", describe_json(data)),
                ));
            }
        }

        // Children stay walkable even when the shape was wrong
        let mut children = Vec::new();
        if let Some(Value::Array(raw_children)) = map.get("children") {
            for (index, child) in raw_children.iter().enumerate() {
                path.push_index(index);
                if schema.content_class == ContentClass::Container {
                    self.check_child_class(schema, index, child, path, out);
                }
                if let Some(node) = self.check_value(child, path, depth + 1, out) {
                    children.push(Arc::new(node));
                }
                path.pop();
            }
        }

        if out.len() > start {
            return None;
        }

        let content = match schema.content_class {
            ContentClass::Leaf => Content::Value(map.get("value")?.clone()),
            ContentClass::Container => Content::Children(children),
            ContentClass::Empty => Content::Empty,
        };
        let fields: Map<String, Value> = map
            .iter()
            .filter(|(key, _)| !is_base_field(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let data = data.and_then(Value::as_object).cloned();

        Some(Node::from_parts(schema.name.clone(), content, data, fields))
    }

    fn resolve_type(
        &self,
        map: &Map<String, Value>,
        path: &NodePath,
        out: &mut Vec<Violation>,
    ) -> Option<&'r TypeSchema> {
        let (type_name, message) = match map.get("type") {
            None => (None, "node has no `type`".to_string()),
            Some(Value::String(name)) => match self.registry.get(name) {
                Some(schema) => return Some(schema),
                None => (Some(name.as_str()), format!("type '{}' is not registered", name)),
            },
            Some(other) => (
                None,
                format!("`type` must be a string, found {}", describe_json(other)),
            ),
        };
        out.push(Violation::new(
            path.clone(),
            ViolationKind::UnknownType,
            type_name,
            message,
        ));
        None
    }

    fn check_content_shape(
        &self,
        schema: &TypeSchema,
        map: &Map<String, Value>,
        path: &NodePath,
        out: &mut Vec<Violation>,
    ) {
        let name = schema.name.as_str();
        let children = map.get("children");
        let has_value = map.contains_key("value");

        let problem = match (schema.content_class, children) {
            (_, Some(_)) if has_value => Some(
                "node has both `children` and `value`; exactly one is allowed".to_string(),
            ),
            (ContentClass::Leaf, Some(_)) => Some(format!(
                "leaf type '{}' takes `value`, not `children`",
                name
            )),
            (ContentClass::Leaf, None) if !has_value => {
                Some(format!("leaf type '{}' requires `value`", name))
            }
            (ContentClass::Container, None) if has_value => Some(format!(
                "container type '{}' takes `children`, not `value`",
                name
            )),
            (ContentClass::Container, None) => {
                Some(format!("container type '{}' requires `children`", name))
            }
            (ContentClass::Container, Some(children)) if !children.is_array() => Some(format!(
                "`children` must be an array, found {}",
                describe_json(children)
            )),
            (ContentClass::Empty, Some(_)) => Some(format!(
                "content-free type '{}' takes neither `children` nor `value`",
                name
            )),
            (ContentClass::Empty, None) if has_value => Some(format!(
                "content-free type '{}' takes neither `children` nor `value`",
                name
            )),
            _ => None,
        };

        if let Some(message) = problem {
            out.push(Violation::new(
                path.clone(),
                ViolationKind::ContentShape,
                Some(name),
                message,
            ));
        }
    }

    fn check_child_class(
        &self,
        parent: &TypeSchema,
        index: usize,
        child: &Value,
        path: &NodePath,
        out: &mut Vec<Violation>,
    ) {
        let allowed = parent.child_class();
        // Unknown or untyped children are reported by their own check
        let Some(child_type) = child.get("type").and_then(Value::as_str) else {
            return;
        };
        let Some(child_schema) = self.registry.get(child_type) else {
            return;
        };
        if allowed.accepts(child_schema.category) {
            return;
        }

        let mut message = format!(
            "child {} '{}' is {} content but '{}' accepts only {} children",
            index, child_type, child_schema.category, parent.name, allowed
        );
        if let Some(variant) = self.registry.inline_variant(child_type) {
            if allowed.accepts(variant.category) {
                message.push_str(&format!("; use '{}' instead", variant.name));
            }
        }

        out.push(Violation::new(
            path.clone(),
            ViolationKind::InvalidChildClass,
            Some(child_type),
            message,
        ));
    }

    fn check_node_list(
        &self,
        field: &str,
        items: &Value,
        path: &mut NodePath,
        depth: usize,
        out: &mut Vec<Violation>,
    ) {
        let Some(items) = items.as_array() else {
            return;
        };
        path.push_field(field);
        for (index, item) in items.iter().enumerate() {
            path.push_index(index);
            self.check_value(item, path, depth + 1, out);
            path.pop();
        }
        path.pop();
    }

    /// Whether a missing required field is covered by its pre-promotion
    /// `data` representation
    fn accepts_legacy(
        &self,
        schema: &TypeSchema,
        field: &str,
        spec: &FieldSpec,
        data: Option<&Value>,
    ) -> bool {
        if !self.config.accept_legacy_data_fields {
            return false;
        }
        let Some(promoted) = &spec.promoted_from else {
            return false;
        };
        if schema.version.saturating_sub(promoted.since_version) > self.config.compatibility_window {
            return false;
        }

        let present = data
            .and_then(Value::as_object)
            .is_some_and(|data| data.contains_key(&promoted.data_key));
        if present {
            tracing::warn!(
                "'{}.{}' read from deprecated data key '{}'",
                schema.name,
                field,
                promoted.data_key
            );
        }
        present
    }
}
