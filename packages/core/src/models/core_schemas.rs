//! Reference Schema Definitions
//!
//! This module contains the reference node type set that ships with the
//! engine. It exists to exercise the schema mechanism; downstream tools register
//! their own types the same way.
//!
//! ## Reference Types
//!
//! - **Heading** - block container of inline content, required `level`
//! - **Paragraph** - block container of inline content
//! - **Code** - block leaf, source in `value`, optional `language`
//! - **Text** - inline leaf
//! - **Emphasis** / **Strong** - inline containers of inline content
//! - **InlineCode** - inline counterpart of `Code`
//! - **CodeCell** - executable block, source in `code`, execution results in
//!   `outputs` / `errors`
//! - **CodeExpr** - executable inline expression
//! - **ThematicBreak** - content-free block
//!
//! ## Usage
//!
//! Call `reference_schemas()` and register the result, or use
//! `SchemaRegistry::with_reference_types()`.

use crate::models::schema::{ChildClass, FieldKind, FieldSpec, NodeCategory, TypeSchema};
use serde_json::json;

/// Get the reference schema definitions
pub fn reference_schemas() -> Vec<TypeSchema> {
    let language = || FieldSpec::optional(FieldKind::String);

    vec![
        TypeSchema::container("Heading", NodeCategory::Block, ChildClass::Inline)
            .with_field("level", FieldSpec::required(FieldKind::Number)),
        TypeSchema::container("Paragraph", NodeCategory::Block, ChildClass::Inline),
        TypeSchema::leaf("Code", NodeCategory::Block).with_field("language", language()),
        TypeSchema::leaf("Text", NodeCategory::Inline),
        TypeSchema::container("Emphasis", NodeCategory::Inline, ChildClass::Inline),
        TypeSchema::container("Strong", NodeCategory::Inline, ChildClass::Inline),
        TypeSchema::leaf("InlineCode", NodeCategory::Inline).with_field("language", language()),
        // Executable cell: results are node lists populated by an execution engine
        TypeSchema::empty("CodeCell", NodeCategory::Block)
            .with_field("code", FieldSpec::required(FieldKind::String))
            .with_field("language", language())
            .with_field(
                "isEchoed",
                FieldSpec::optional(FieldKind::Boolean).with_default(json!(true)),
            )
            .with_field(
                "isHidden",
                FieldSpec::optional(FieldKind::Boolean).with_default(json!(false)),
            )
            .with_field("outputs", FieldSpec::optional(FieldKind::NodeList))
            .with_field("errors", FieldSpec::optional(FieldKind::NodeList)),
        TypeSchema::empty("CodeExpr", NodeCategory::Inline)
            .with_field("code", FieldSpec::required(FieldKind::String))
            .with_field("language", language())
            .with_field("outputs", FieldSpec::optional(FieldKind::NodeList))
            .with_field("errors", FieldSpec::optional(FieldKind::NodeList)),
        TypeSchema::empty("ThematicBreak", NodeCategory::Block),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::is_valid_type_name;
    use crate::models::ContentClass;

    #[test]
    fn test_reference_schemas_pass_self_check() {
        for schema in reference_schemas() {
            assert!(is_valid_type_name(&schema.name), "{}", schema.name);
            assert!(schema.check().is_ok(), "{}: {:?}", schema.name, schema.check());
        }
    }

    #[test]
    fn test_reference_set_names() {
        let names: Vec<String> = reference_schemas().into_iter().map(|s| s.name).collect();
        for expected in [
            "Heading",
            "Paragraph",
            "Code",
            "Text",
            "Emphasis",
            "Strong",
            "InlineCode",
            "CodeCell",
            "CodeExpr",
            "ThematicBreak",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn test_code_cell_is_content_free() {
        let cell = reference_schemas()
            .into_iter()
            .find(|s| s.name == "CodeCell")
            .unwrap();
        assert_eq!(cell.content_class, ContentClass::Empty);
        assert_eq!(cell.field("outputs").unwrap().kind, FieldKind::NodeList);
        assert!(cell.field("code").unwrap().required);
    }
}
