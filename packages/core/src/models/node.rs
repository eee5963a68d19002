//! Node Data Structures
//!
//! This module defines the two representations of a document tree node:
//!
//! - **RawNode**: untrusted, minimally parsed JSON mapping as it arrives from a
//!   serializer. Nothing about its shape is assumed.
//! - **Node**: the validated, typed view. Produced by the Validator (or built
//!   programmatically by trusted code) and consumed by traversal, transform and
//!   promotion.
//!
//! # Architecture
//!
//! - **Four base fields**: `type`, `children`, `value`, `data`
//! - **Exclusive content**: a node holds `children`, `value`, or neither, never
//!   both; `Content` makes the combination unrepresentable
//! - **Typed extension fields**: everything else a schema declares, kept as JSON
//! - **Opaque data bucket**: `data` is carried, never interpreted
//! - **Shared subtrees**: children are reference counted so unchanged subtrees
//!   can be shared between a tree and its transformed copy
//!
//! # Examples
//!
//! ```rust
//! use oxa_core::models::Node;
//! use serde_json::json;
//!
//! let paragraph = Node::container(
//!     "Paragraph",
//!     vec![
//!         Node::leaf("Text", json!("Hello ")),
//!         Node::container("Emphasis", vec![Node::leaf("Text", json!("world"))]),
//!     ],
//! );
//!
//! assert_eq!(paragraph.children().len(), 2);
//! assert_eq!(
//!     paragraph.to_value(),
//!     json!({
//!         "type": "Paragraph",
//!         "children": [
//!             {"type": "Text", "value": "Hello "},
//!             {"type": "Emphasis", "children": [{"type": "Text", "value": "world"}]}
//!         ]
//!     })
//! );
//! ```

use crate::models::schema::{describe_json, is_base_field, ContentClass};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Untyped node mapping as read from JSON/YAML
///
/// A RawNode is accepted from any serializer that produces a JSON object. It
/// becomes a `Node` only by passing the Validator.
///
/// ```rust
/// use oxa_core::models::RawNode;
///
/// let raw = RawNode::from_json_str(r#"{"type": "Text", "value": "hi"}"#).unwrap();
/// assert_eq!(raw.type_name(), Some("Text"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawNode(Map<String, Value>);

impl RawNode {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }

    /// Parse JSON text into a RawNode
    ///
    /// Nesting depth is not limited here; the Validator's `max_depth` is the
    /// only depth gate.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        match parse_json(text)? {
            Value::Object(map) => Ok(Self(map)),
            other => {
                let message = format!("expected a JSON object, found {}", describe_json(&other));
                release(other);
                Err(serde::de::Error::custom(message))
            }
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(mut self) -> Map<String, Value> {
        std::mem::take(&mut self.0)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.into_map())
    }

    /// The `type` key if present and a string
    pub fn type_name(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for RawNode {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// Input can be nested far deeper than `max_depth`
impl Drop for RawNode {
    fn drop(&mut self) {
        if !self.0.is_empty() {
            release(Value::Object(std::mem::take(&mut self.0)));
        }
    }
}

/// Parse JSON text without serde_json's fixed nesting limit
///
/// serde_json stops at 128 levels and every node level costs two (the node
/// object and its `children` array). The parser grows its stack on the heap
/// as it descends instead.
pub(crate) fn parse_json(text: &str) -> serde_json::Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    if let Err(e) = deserializer.end() {
        release(value);
        return Err(e);
    }
    Ok(value)
}

/// Drop a JSON value one level at a time instead of recursively
pub(crate) fn release(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(map) => pending.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}

/// Content carried by a node; the three content classes
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Ordered child nodes (container types)
    Children(Vec<Arc<Node>>),
    /// Scalar payload (leaf types)
    Value(Value),
    /// Neither (content-free types such as `ThematicBreak`)
    Empty,
}

impl Content {
    pub fn class(&self) -> ContentClass {
        match self {
            Content::Children(_) => ContentClass::Container,
            Content::Value(_) => ContentClass::Leaf,
            Content::Empty => ContentClass::Empty,
        }
    }
}

/// Validated document tree node
///
/// A Node exclusively owns its children; trees are never DAGs from the
/// caller's point of view. `Arc` sharing only happens between a tree and the
/// copies `transform` derives from it, and shared subtrees are immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    node_type: String,
    content: Content,
    data: Option<Map<String, Value>>,
    fields: Map<String, Value>,
}

impl Node {
    /// Create a node with explicit content and no extension fields
    pub fn new(node_type: impl Into<String>, content: Content) -> Self {
        Self {
            node_type: node_type.into(),
            content,
            data: None,
            fields: Map::new(),
        }
    }

    /// Assemble a node from validated parts
    pub(crate) fn from_parts(
        node_type: String,
        content: Content,
        data: Option<Map<String, Value>>,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            node_type,
            content,
            data,
            fields,
        }
    }

    /// Create a leaf node carrying `value`
    pub fn leaf(node_type: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(node_type, Content::Value(value.into()))
    }

    /// Create a container node owning `children`
    pub fn container(node_type: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(
            node_type,
            Content::Children(children.into_iter().map(Arc::new).collect()),
        )
    }

    /// Create a content-free node
    pub fn empty(node_type: impl Into<String>) -> Self {
        Self::new(node_type, Content::Empty)
    }

    /// Set a typed extension field
    ///
    /// Base field names (`type`, `children`, `value`, `data`) are not fields
    /// and are ignored here; use the content constructors or `with_data`.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if is_base_field(&name) {
            tracing::warn!("Ignoring base field '{}' set as a field on '{}'", name, self.node_type);
            return self;
        }
        self.fields.insert(name, value.into());
        self
    }

    /// Replace the `data` bucket
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Insert one entry into the `data` bucket, creating it if needed
    pub fn with_data_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn content_class(&self) -> ContentClass {
        self.content.class()
    }

    /// Child nodes; empty for leaf and content-free nodes
    pub fn children(&self) -> &[Arc<Node>] {
        match &self.content {
            Content::Children(children) => children,
            _ => &[],
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.content {
            Content::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn has_children(&self) -> bool {
        matches!(self.content, Content::Children(_))
    }

    pub fn has_value(&self) -> bool {
        matches!(self.content, Content::Value(_))
    }

    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.subtree_size())
            .sum::<usize>()
    }

    pub(crate) fn data_mut(&mut self) -> &mut Option<Map<String, Value>> {
        &mut self.data
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    /// Copy of this node with its children swapped out
    pub(crate) fn with_shared_children(&self, children: Vec<Arc<Node>>) -> Node {
        Node {
            node_type: self.node_type.clone(),
            content: Content::Children(children),
            data: self.data.clone(),
            fields: self.fields.clone(),
        }
    }

    /// Egress: the JSON shape this node was built from
    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    /// Egress as a RawNode
    pub fn to_raw(&self) -> RawNode {
        RawNode(self.to_map())
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(self.node_type.clone()));
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        match &self.content {
            Content::Children(children) => {
                map.insert(
                    "children".to_string(),
                    Value::Array(children.iter().map(|child| child.to_value()).collect()),
                );
            }
            Content::Value(value) => {
                map.insert("value".to_string(), value.clone());
            }
            Content::Empty => {}
        }
        if let Some(data) = &self.data {
            map.insert("data".to_string(), Value::Object(data.clone()));
        }
        map
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 1
            + self.fields.len()
            + usize::from(!matches!(self.content, Content::Empty))
            + usize::from(self.data.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", &self.node_type)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        match &self.content {
            Content::Children(children) => {
                let children: Vec<&Node> = children.iter().map(|child| child.as_ref()).collect();
                map.serialize_entry("children", &children)?;
            }
            Content::Value(value) => map.serialize_entry("value", value)?,
            Content::Empty => {}
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", data)?;
        }
        map.end()
    }
}
