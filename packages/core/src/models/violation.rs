//! Validation Violations
//!
//! The Validator never stops at the first problem. Every rule failure becomes
//! a `Violation` carrying enough path/type/kind information to locate and
//! categorize it without re-reading the raw tree.

use crate::models::NodePath;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a single validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// `type` missing, not a string, or not registered; the subtree is skipped
    #[serde(rename = "UnknownTypeError")]
    UnknownType,

    /// Wrong combination of `children` / `value` for the content class
    #[serde(rename = "ContentShapeError")]
    ContentShape,

    /// Required field absent
    #[serde(rename = "MissingFieldError")]
    MissingField,

    /// Field present with the wrong JSON kind
    #[serde(rename = "FieldTypeError")]
    FieldType,

    /// Top-level key the schema does not declare (extensions belong in `data`)
    #[serde(rename = "UnexpectedFieldError")]
    UnexpectedField,

    /// Block child under an inline-only parent or the reverse
    #[serde(rename = "InvalidChildClassError")]
    InvalidChildClass,

    /// Raw tree nests deeper than the configured maximum
    #[serde(rename = "DepthLimitError")]
    DepthLimit,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViolationKind::UnknownType => "UnknownTypeError",
            ViolationKind::ContentShape => "ContentShapeError",
            ViolationKind::MissingField => "MissingFieldError",
            ViolationKind::FieldType => "FieldTypeError",
            ViolationKind::UnexpectedField => "UnexpectedFieldError",
            ViolationKind::InvalidChildClass => "InvalidChildClassError",
            ViolationKind::DepthLimit => "DepthLimitError",
        };
        f.write_str(label)
    }
}

/// One rule failure, addressed by tree path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub path: NodePath,
    pub kind: ViolationKind,
    pub message: String,
    /// Type of the offending node, when it has a readable `type`
    pub type_name: Option<String>,
}

impl Violation {
    pub fn new(
        path: NodePath,
        kind: ViolationKind,
        type_name: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
            type_name: type_name.map(str::to_string),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_name {
            Some(type_name) => write!(
                f,
                "{} [{}] {}: {}",
                self.path, type_name, self.kind, self.message
            ),
            None => write!(f, "{} {}: {}", self.path, self.kind, self.message),
        }
    }
}

/// Non-empty list of violations found in one tree
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("document failed validation with {} violation(s)", .violations.len())]
#[serde(transparent)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// Violations of one kind
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl IntoIterator for ValidationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_serializes_with_error_names() {
        assert_eq!(
            serde_json::to_value(ViolationKind::InvalidChildClass).unwrap(),
            json!("InvalidChildClassError")
        );
        assert_eq!(ViolationKind::ContentShape.to_string(), "ContentShapeError");
    }

    #[test]
    fn test_violation_report_shape() {
        let violation = Violation::new(
            NodePath::from(vec![0]),
            ViolationKind::UnknownType,
            Some("code"),
            "type 'code' is not registered",
        );

        assert_eq!(
            serde_json::to_value(&violation).unwrap(),
            json!({
                "path": [0],
                "kind": "UnknownTypeError",
                "message": "type 'code' is not registered",
                "typeName": "code"
            })
        );
        assert_eq!(
            violation.to_string(),
            "/0 [code] UnknownTypeError: type 'code' is not registered"
        );
    }

    #[test]
    fn test_report_display_and_filter() {
        let report = ValidationReport::new(vec![
            Violation::new(NodePath::root(), ViolationKind::MissingField, Some("Heading"), "a"),
            Violation::new(NodePath::from(vec![1]), ViolationKind::FieldType, Some("Text"), "b"),
        ]);

        assert_eq!(
            report.to_string(),
            "document failed validation with 2 violation(s)"
        );
        assert_eq!(report.of_kind(ViolationKind::FieldType).count(), 1);
    }
}
