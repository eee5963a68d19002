//! Promotion, demotion and schema evolution across whole documents

mod common;

use anyhow::Result;
use oxa_core::config::{EngineConfig, ValidatorConfig};
use oxa_core::models::schema::{FieldKind, FieldSpec, NodeCategory, TypeSchema};
use oxa_core::models::ViolationKind;
use oxa_core::services::{
    demote, promote, DocumentEngine, EngineError, FieldMapping, PromotionError, SchemaRegistry,
};
use serde_json::json;

fn alt_src() -> FieldMapping {
    FieldMapping::new().with("alt", "alt").with("src", "src")
}

#[test]
fn test_image_data_promoted_to_fields() -> Result<()> {
    let engine = common::engine();
    let image = engine.parse_value(&json!({
        "type": "Image",
        "data": {"alt": "A phase diagram", "src": "figures/phase.png"}
    }))?;

    let promoted = promote(&image, "Image", &alt_src())?;
    assert_eq!(
        promoted.to_value(),
        json!({
            "type": "Image",
            "alt": "A phase diagram",
            "src": "figures/phase.png",
            "data": {}
        })
    );

    // Still valid against the same schema
    engine.parse_value(&promoted.to_value())?;
    Ok(())
}

#[test]
fn test_demote_restores_legacy_document() -> Result<()> {
    let engine = common::engine();
    let original = json!({
        "type": "Document",
        "children": [
            {"type": "Image", "data": {"alt": "one", "src": "1.png", "credit": "lab"}},
            {"type": "Paragraph", "children": [{"type": "Text", "value": "between"}]},
            {"type": "Image", "data": {"src": "2.png"}},
            {"type": "Image"}
        ]
    });
    let tree = engine.parse_value(&original)?;

    let promoted = engine.promote(&tree, "Image", &alt_src())?;
    assert_eq!(promoted.children()[0].field("alt"), Some(&json!("one")));
    assert_eq!(
        promoted.children()[0].data().and_then(|d| d.get("credit")),
        Some(&json!("lab"))
    );

    let restored = engine.demote(&promoted, "Image", &alt_src())?;
    assert_eq!(restored.to_value(), original);
    Ok(())
}

#[test]
fn test_conflict_is_fatal_and_located() -> Result<()> {
    let engine = common::engine();
    let tree = engine.parse_value(&json!({
        "type": "Document",
        "children": [
            {"type": "ThematicBreak"},
            {"type": "Image", "alt": "new", "data": {"alt": "old"}}
        ]
    }))?;

    let err = promote(&tree, "Image", &alt_src()).unwrap_err();
    match err {
        PromotionError::Conflict { path, data_key, .. } => {
            assert_eq!(path.to_string(), "/1");
            assert_eq!(data_key, "alt");
        }
        other => panic!("expected a conflict, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_promotion_is_type_scoped() -> Result<()> {
    let engine = common::engine();
    let tree = engine.parse_value(&json!({
        "type": "Code",
        "value": "x",
        "data": {"alt": "not an image"}
    }))?;

    assert_eq!(promote(&tree, "Image", &alt_src())?, tree);
    assert_eq!(demote(&tree, "Image", &alt_src())?, tree);
    Ok(())
}

#[test]
fn test_engine_rejects_undeclared_target() {
    let engine = common::engine();
    let tree = oxa_core::models::Node::empty("Image");
    let err = engine
        .promote(&tree, "Image", &FieldMapping::new().with("caption", "caption"))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Promotion(PromotionError::UndeclaredField { .. })
    ));
}

fn evolving_registry(version: u32) -> SchemaRegistry {
    let mut registry = SchemaRegistry::with_reference_types();
    registry
        .register(TypeSchema::empty("Figure", NodeCategory::Block).with_field(
            "caption",
            FieldSpec::optional(FieldKind::String),
        ))
        .expect("v1 registers");
    if version >= 2 {
        registry
            .register(
                TypeSchema::empty("Figure", NodeCategory::Block)
                    .with_version(version)
                    .with_field("caption", FieldSpec::optional(FieldKind::String))
                    .with_field(
                        "label",
                        FieldSpec::required(FieldKind::String).promoted_from("label", 2),
                    ),
            )
            .expect("successor registers");
    }
    registry
}

#[test]
fn test_legacy_data_accepted_inside_window() -> Result<()> {
    let legacy = json!({"type": "Figure", "data": {"label": "fig-1"}});

    let current = DocumentEngine::new(evolving_registry(2));
    current.parse_value(&legacy)?;

    let promoted = current.migrations().upgrade(
        &current.parse_value(&legacy)?,
        "Figure",
        1,
        2,
    )?;
    assert_eq!(
        promoted.to_value(),
        json!({"type": "Figure", "label": "fig-1", "data": {}})
    );
    Ok(())
}

#[test]
fn test_legacy_data_rejected_after_window() {
    let legacy = json!({"type": "Figure", "data": {"label": "fig-1"}});

    let later = DocumentEngine::new(evolving_registry(4));
    let err = later.parse_value(&legacy).unwrap_err();
    let report = err.report().expect("validation failure");
    assert_eq!(report.of_kind(ViolationKind::MissingField).count(), 1);

    let strict = DocumentEngine::with_config(
        evolving_registry(2),
        EngineConfig {
            validation: ValidatorConfig {
                accept_legacy_data_fields: false,
                ..ValidatorConfig::default()
            },
        },
    )
    .expect("config is valid");
    assert!(strict.parse_value(&legacy).is_err());
}

#[test]
fn test_incompatible_reregistration_is_duplicate() {
    let mut registry = evolving_registry(2);
    let narrowed = TypeSchema::empty("Figure", NodeCategory::Inline).with_version(3);
    assert!(matches!(
        registry.register(narrowed),
        Err(oxa_core::services::RegistryError::DuplicateType { .. })
    ));
}
