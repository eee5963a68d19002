//! Property tests over generated documents

mod common;

use oxa_core::models::{Node, RawNode};
use oxa_core::operations::{any_node, by_type, find, matches};
use oxa_core::services::{demote, promote, FieldMapping, Validator};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_inline() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        "[a-z ]{0,8}".prop_map(|text| json!({"type": "Text", "value": text})),
        ("[a-z0-9=]{1,6}", proptest::option::of("[a-z]{1,5}")).prop_map(|(code, language)| {
            let mut node = json!({"type": "InlineCode", "value": code});
            if let Some(language) = language {
                node["language"] = json!(language);
            }
            node
        }),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop_oneof![Just("Emphasis"), Just("Strong")],
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(kind, children)| json!({"type": kind, "children": children}))
    })
}

fn arb_image() -> impl Strategy<Value = Value> {
    (
        proptest::option::of("[a-z ]{1,10}"),
        proptest::option::of("[a-z]{1,6}\\.png"),
        proptest::option::of("[a-z]{1,6}"),
    )
        .prop_map(|(alt, src, credit)| {
            let mut data = serde_json::Map::new();
            for (key, value) in [("alt", alt), ("src", src), ("credit", credit)] {
                if let Some(value) = value {
                    data.insert(key.to_string(), json!(value));
                }
            }
            if data.is_empty() {
                json!({"type": "Image"})
            } else {
                json!({"type": "Image", "data": data})
            }
        })
}

fn arb_block() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(arb_inline(), 0..4)
            .prop_map(|children| json!({"type": "Paragraph", "children": children})),
        (1..=6u8, prop::collection::vec(arb_inline(), 0..3)).prop_map(|(level, children)| {
            json!({"type": "Heading", "level": level, "children": children})
        }),
        "[a-z0-9= ]{0,12}".prop_map(|code| json!({"type": "Code", "value": code})),
        Just(json!({"type": "ThematicBreak"})),
        arb_image(),
    ]
}

fn arb_document() -> impl Strategy<Value = Value> {
    prop::collection::vec(arb_block(), 0..6)
        .prop_map(|children| json!({"type": "Document", "children": children}))
}

fn validate(value: &Value) -> Node {
    let registry = common::registry();
    let raw = RawNode::from_value(value.clone()).expect("generated root is an object");
    Validator::new(&registry)
        .validate(&raw)
        .expect("generated document is valid")
}

/// Break `count` distinct Text leaves by dropping their value
fn break_text_leaves(document: &Value, count: usize) -> (Value, usize) {
    fn walk(node: &mut Value, remaining: &mut usize, broken: &mut usize) {
        if *remaining == 0 {
            return;
        }
        if node["type"] == "Text" {
            if let Some(map) = node.as_object_mut() {
                map.remove("value");
                *remaining -= 1;
                *broken += 1;
            }
            return;
        }
        if let Some(children) = node.get_mut("children").and_then(Value::as_array_mut) {
            for child in children {
                walk(child, remaining, broken);
            }
        }
    }

    let mut document = document.clone();
    let mut remaining = count;
    let mut broken = 0;
    walk(&mut document, &mut remaining, &mut broken);
    (document, broken)
}

proptest! {
    #[test]
    fn prop_valid_documents_round_trip(document in arb_document()) {
        let tree = validate(&document);
        prop_assert_eq!(tree.to_value(), document);
    }

    #[test]
    fn prop_content_exclusivity(document in arb_document()) {
        let tree = validate(&document);
        for node in find(&tree, any_node) {
            prop_assert!(!(node.has_children() && node.has_value()));
        }
    }

    #[test]
    fn prop_demote_inverts_promote(document in arb_document()) {
        let tree = validate(&document);
        let mapping = FieldMapping::new().with("alt", "alt").with("src", "src");

        let promoted = promote(&tree, "Image", &mapping).expect("no conflicts in generated data");
        let restored = demote(&promoted, "Image", &mapping).expect("demote is total here");
        prop_assert_eq!(restored, tree);
    }

    #[test]
    fn prop_find_is_deterministic(document in arb_document()) {
        let tree = validate(&document);
        let first: Vec<String> = matches(&tree, by_type("Text")).map(|m| m.path.to_string()).collect();
        let second: Vec<String> = matches(&tree, by_type("Text")).map(|m| m.path.to_string()).collect();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(find(&tree, any_node).count(), tree.subtree_size());
    }

    #[test]
    fn prop_validator_reports_every_violation(document in arb_document(), count in 0usize..6) {
        let (broken, expected) = break_text_leaves(&document, count);
        let registry = common::registry();
        let raw = RawNode::from_value(broken).expect("root is an object");

        match Validator::new(&registry).validate(&raw) {
            Ok(_) => {
                prop_assert_eq!(expected, 0);
            }
            Err(report) => {
                prop_assert_eq!(report.len(), expected);
            }
        }
    }
}
