//! Shared fixtures for integration tests

#![allow(dead_code)]

use oxa_core::models::schema::{ChildClass, FieldKind, FieldSpec, NodeCategory, TypeSchema};
use oxa_core::services::{DocumentEngine, SchemaRegistry};

/// Reference types plus a block-level `Document` root and an `Image` type
/// whose fields still live in `data` on older documents
pub fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::with_reference_types();
    registry
        .register_all([
            TypeSchema::container("Document", NodeCategory::Block, ChildClass::Block),
            TypeSchema::empty("Image", NodeCategory::Block)
                .with_field("alt", FieldSpec::optional(FieldKind::String))
                .with_field("src", FieldSpec::optional(FieldKind::String)),
        ])
        .expect("fixture schemas register");
    registry
}

pub fn engine() -> DocumentEngine {
    DocumentEngine::new(registry())
}
