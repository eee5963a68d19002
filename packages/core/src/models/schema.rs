//! Node Type Schemas
//!
//! A `TypeSchema` describes one node type as data: which content it carries
//! (`value`, `children` or nothing), which extra fields it declares, and which
//! class of children it accepts. New node types are added by registering a
//! schema, never by adding code.
//!
//! ## Example Schema Description
//!
//! ```json
//! {
//!   "name": "Heading",
//!   "version": 1,
//!   "category": "block",
//!   "contentClass": "container",
//!   "childContentClass": "inline",
//!   "fields": {
//!     "level": { "kind": "number", "required": true }
//!   }
//! }
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Keys every node may carry regardless of its schema
pub const BASE_FIELDS: [&str; 4] = ["type", "children", "value", "data"];

/// Prefix marking the inline counterpart of a block type (`InlineCode` / `Code`)
pub const INLINE_PREFIX: &str = "Inline";

const TYPE_NAME_PATTERN: &str = r"^[A-Z][A-Za-z0-9]*$";

fn default_version() -> u32 {
    1
}

/// Check whether `name` is one of the four base node fields
pub fn is_base_field(name: &str) -> bool {
    BASE_FIELDS.contains(&name)
}

/// Check a type name against the capitalized-word convention
///
/// ```rust
/// # use oxa_core::models::schema::is_valid_type_name;
/// assert!(is_valid_type_name("InlineCode"));
/// assert!(!is_valid_type_name("code"));
/// assert!(!is_valid_type_name("Code-Block"));
/// ```
pub fn is_valid_type_name(name: &str) -> bool {
    static TYPE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    TYPE_NAME_REGEX
        .get_or_init(|| Regex::new(TYPE_NAME_PATTERN).expect("type name pattern is valid"))
        .is_match(name)
}

/// Which content a node of this type carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentClass {
    /// Carries `value`, never `children`
    Leaf,
    /// Carries `children` (possibly empty), never `value`
    Container,
    /// Carries neither (e.g. `ThematicBreak`)
    Empty,
}

impl fmt::Display for ContentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentClass::Leaf => "leaf",
            ContentClass::Container => "container",
            ContentClass::Empty => "empty",
        };
        f.write_str(label)
    }
}

/// Structural level of a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    /// Standalone document unit (Paragraph, Heading, Code)
    Block,
    /// Content flowing within a block (Text, Emphasis, InlineCode)
    Inline,
}

impl NodeCategory {
    /// Category implied by a type name when none is declared: inline for
    /// `Inline`-prefixed names, block otherwise
    pub fn implied_by(type_name: &str) -> Self {
        match type_name.strip_prefix(INLINE_PREFIX) {
            Some(root) if !root.is_empty() => NodeCategory::Inline,
            _ => NodeCategory::Block,
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeCategory::Block => f.write_str("block"),
            NodeCategory::Inline => f.write_str("inline"),
        }
    }
}

/// Children a container type accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildClass {
    Block,
    Inline,
    Any,
}

impl ChildClass {
    /// Whether a child of `category` is allowed
    pub fn accepts(&self, category: NodeCategory) -> bool {
        match self {
            ChildClass::Any => true,
            ChildClass::Block => category == NodeCategory::Block,
            ChildClass::Inline => category == NodeCategory::Inline,
        }
    }
}

impl fmt::Display for ChildClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildClass::Block => f.write_str("block"),
            ChildClass::Inline => f.write_str("inline"),
            ChildClass::Any => f.write_str("any"),
        }
    }
}

/// JSON shape a declared field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Object,
    /// Array of nodes, each validated as a node in its own right
    NodeList,
    /// Any of string, number or boolean
    Scalar,
}

impl FieldKind {
    /// Shallow check of `value` against this kind
    ///
    /// `NodeList` only checks for an array here; the Validator checks the
    /// elements as nodes.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Object => value.is_object(),
            FieldKind::NodeList => value.is_array(),
            FieldKind::Scalar => value.is_string() || value.is_number() || value.is_boolean(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object => "object",
            FieldKind::NodeList => "nodeList",
            FieldKind::Scalar => "scalar",
        };
        f.write_str(label)
    }
}

/// Name the JSON kind of a value for error messages
pub fn describe_json(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Records that a field used to live in the `data` bucket
///
/// While `schema.version - since_version` stays within the configured
/// compatibility window, a node that still carries the value under
/// `data[data_key]` satisfies a required field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotedFrom {
    pub data_key: String,
    pub since_version: u32,
}

/// Declaration of one typed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,

    /// Value reported by `SchemaRegistry::field_value` when the field is absent.
    /// Never written into a tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_from: Option<PromotedFrom>,
}

impl FieldSpec {
    pub fn required(kind: FieldKind) -> Self {
        Self {
            kind,
            required: true,
            default_value: None,
            promoted_from: None,
        }
    }

    pub fn optional(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            default_value: None,
            promoted_from: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn promoted_from(mut self, data_key: impl Into<String>, since_version: u32) -> Self {
        self.promoted_from = Some(PromotedFrom {
            data_key: data_key.into(),
            since_version,
        });
        self
    }
}

/// Structural schema of one node type
///
/// # Examples
///
/// ```rust
/// use oxa_core::models::schema::{ChildClass, FieldKind, FieldSpec, NodeCategory, TypeSchema};
///
/// let heading = TypeSchema::container("Heading", NodeCategory::Block, ChildClass::Inline)
///     .with_field("level", FieldSpec::required(FieldKind::Number));
///
/// assert!(heading.field("level").unwrap().required);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SchemaDescription")]
pub struct TypeSchema {
    pub name: String,

    /// Monotonic schema version; bumps when fields are promoted
    #[serde(default = "default_version")]
    pub version: u32,

    /// Whether nodes of this type are block or inline content
    pub category: NodeCategory,

    pub content_class: ContentClass,

    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,

    /// Allowed children (containers only); `None` means any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_content_class: Option<ChildClass>,

    /// Kind of `value` (leaves only); `None` means string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_kind: Option<FieldKind>,
}

/// Serialized form of a `TypeSchema`; `category` may be left out
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDescription {
    name: String,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    category: Option<NodeCategory>,
    content_class: ContentClass,
    #[serde(default)]
    fields: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    child_content_class: Option<ChildClass>,
    #[serde(default)]
    value_kind: Option<FieldKind>,
}

impl From<SchemaDescription> for TypeSchema {
    fn from(description: SchemaDescription) -> Self {
        let category = description
            .category
            .unwrap_or_else(|| NodeCategory::implied_by(&description.name));
        Self {
            name: description.name,
            version: description.version,
            category,
            content_class: description.content_class,
            fields: description.fields,
            child_content_class: description.child_content_class,
            value_kind: description.value_kind,
        }
    }
}

impl TypeSchema {
    fn new(name: impl Into<String>, category: NodeCategory, content_class: ContentClass) -> Self {
        Self {
            name: name.into(),
            version: 1,
            category,
            content_class,
            fields: BTreeMap::new(),
            child_content_class: None,
            value_kind: None,
        }
    }

    /// Schema for a type carrying `value`
    pub fn leaf(name: impl Into<String>, category: NodeCategory) -> Self {
        Self::new(name, category, ContentClass::Leaf)
    }

    /// Schema for a type carrying `children`
    pub fn container(
        name: impl Into<String>,
        category: NodeCategory,
        children: ChildClass,
    ) -> Self {
        let mut schema = Self::new(name, category, ContentClass::Container);
        schema.child_content_class = Some(children);
        schema
    }

    /// Schema for a content-free type
    pub fn empty(name: impl Into<String>, category: NodeCategory) -> Self {
        Self::new(name, category, ContentClass::Empty)
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    pub fn with_value_kind(mut self, kind: FieldKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Kind required of `value`; string unless widened
    pub fn value_kind(&self) -> FieldKind {
        self.value_kind.unwrap_or(FieldKind::String)
    }

    /// Allowed child class; `Any` when undeclared
    pub fn child_class(&self) -> ChildClass {
        self.child_content_class.unwrap_or(ChildClass::Any)
    }

    /// Structural self-check run at registration time
    ///
    /// Returns a human-readable reason on failure.
    pub fn check(&self) -> Result<(), String> {
        if self.content_class != ContentClass::Container && self.child_content_class.is_some() {
            return Err(format!(
                "childContentClass is only meaningful for containers, '{}' is {}",
                self.name, self.content_class
            ));
        }

        if self.content_class != ContentClass::Leaf && self.value_kind.is_some() {
            return Err(format!(
                "valueKind is only meaningful for leaves, '{}' is {}",
                self.name, self.content_class
            ));
        }

        if matches!(
            self.value_kind,
            Some(FieldKind::NodeList) | Some(FieldKind::Object)
        ) {
            return Err("value must be a scalar kind".to_string());
        }

        if self.name.starts_with(INLINE_PREFIX)
            && self.name.len() > INLINE_PREFIX.len()
            && self.category != NodeCategory::Inline
        {
            return Err(format!(
                "'{}' uses the Inline prefix but is declared {}",
                self.name, self.category
            ));
        }

        for (name, spec) in &self.fields {
            if is_base_field(name) {
                return Err(format!("field '{}' shadows a base node field", name));
            }

            if let Some(default) = &spec.default_value {
                if !spec.kind.matches(default) {
                    return Err(format!(
                        "default for field '{}' is {}, expected {}",
                        name,
                        describe_json(default),
                        spec.kind
                    ));
                }
            }

            if let Some(promoted) = &spec.promoted_from {
                if promoted.since_version > self.version {
                    return Err(format!(
                        "field '{}' promoted in version {} but schema is version {}",
                        name, promoted.since_version, self.version
                    ));
                }
            }
        }

        Ok(())
    }

    /// Decide whether `next` may replace this schema without breaking documents
    /// that validated against it
    ///
    /// Returns the reason it may not.
    pub fn compatible_successor(&self, next: &TypeSchema) -> Result<(), String> {
        if next.version <= self.version {
            return Err(format!(
                "version {} does not supersede registered version {}",
                next.version, self.version
            ));
        }

        if next.category != self.category {
            return Err(format!("category changed from {} to {}", self.category, next.category));
        }

        if next.content_class != self.content_class {
            return Err(format!(
                "content class changed from {} to {}",
                self.content_class, next.content_class
            ));
        }

        if next.child_class() != self.child_class() {
            return Err(format!(
                "child content class changed from {} to {}",
                self.child_class(),
                next.child_class()
            ));
        }

        if next.content_class == ContentClass::Leaf && next.value_kind() != self.value_kind() {
            return Err(format!(
                "value kind changed from {} to {}",
                self.value_kind(),
                next.value_kind()
            ));
        }

        for (name, old) in &self.fields {
            let Some(new) = next.fields.get(name) else {
                return Err(format!("field '{}' was removed", name));
            };
            if new.kind != old.kind {
                return Err(format!(
                    "field '{}' changed kind from {} to {}",
                    name, old.kind, new.kind
                ));
            }
            if new.required && !old.required {
                return Err(format!("optional field '{}' became required", name));
            }
        }

        for (name, new) in &next.fields {
            if self.fields.contains_key(name) {
                continue;
            }
            if new.required && new.promoted_from.is_none() {
                return Err(format!(
                    "new required field '{}' has no data key to fall back on",
                    name
                ));
            }
        }

        Ok(())
    }
}
