//! Tests for Node and RawNode

#[cfg(test)]
mod tests {
    use crate::models::{Content, ContentClass, Node, RawNode};
    use serde_json::{json, Map};

    #[test]
    fn test_leaf_has_value_only() {
        let text = Node::leaf("Text", json!("hello"));
        assert!(text.has_value());
        assert!(!text.has_children());
        assert_eq!(text.content_class(), ContentClass::Leaf);
        assert!(text.children().is_empty());
        assert_eq!(text.value(), Some(&json!("hello")));
    }

    #[test]
    fn test_container_preserves_child_order() {
        let paragraph = Node::container(
            "Paragraph",
            vec![
                Node::leaf("Text", json!("a")),
                Node::leaf("Text", json!("b")),
                Node::leaf("Text", json!("c")),
            ],
        );

        let values: Vec<_> = paragraph
            .children()
            .iter()
            .filter_map(|child| child.value().and_then(|v| v.as_str()))
            .collect();
        assert_eq!(values, vec!["a", "b", "c"]);
        assert_eq!(paragraph.subtree_size(), 4);
    }

    #[test]
    fn test_empty_node_has_neither() {
        let rule = Node::empty("ThematicBreak");
        assert_eq!(rule.content(), &Content::Empty);
        assert!(!rule.has_value());
        assert!(!rule.has_children());
        assert_eq!(rule.to_value(), json!({"type": "ThematicBreak"}));
    }

    #[test]
    fn test_to_value_includes_fields_and_data() {
        let heading = Node::container("Heading", vec![Node::leaf("Text", json!("Intro"))])
            .with_field("level", 2)
            .with_data_entry("label", "sec-intro");

        assert_eq!(
            heading.to_value(),
            json!({
                "type": "Heading",
                "level": 2,
                "children": [{"type": "Text", "value": "Intro"}],
                "data": {"label": "sec-intro"}
            })
        );
    }

    #[test]
    fn test_empty_data_bucket_is_kept() {
        let image = Node::empty("Image").with_data(Map::new());
        assert_eq!(image.to_value(), json!({"type": "Image", "data": {}}));
    }

    #[test]
    fn test_serialize_matches_to_value() {
        let cell = Node::empty("CodeCell")
            .with_field("code", "print(1)")
            .with_field("isHidden", false)
            .with_field("outputs", json!([{"type": "Text", "value": "1"}]));

        let serialized = serde_json::to_value(&cell).unwrap();
        assert_eq!(serialized, cell.to_value());
    }

    #[test]
    fn test_with_field_ignores_base_fields() {
        let rule = Node::empty("ThematicBreak")
            .with_field("children", json!([{"type": "Text", "value": "x"}]))
            .with_field("value", "x")
            .with_field("label", "hr");

        assert_eq!(rule.content(), &Content::Empty);
        assert_eq!(rule.fields().len(), 1);
        assert_eq!(rule.to_value(), json!({"type": "ThematicBreak", "label": "hr"}));
    }

    #[test]
    fn test_raw_node_from_deep_json_text() {
        let depth = 5_000;
        let text = format!("{}{}", r#"{"a":["#.repeat(depth), "]}".repeat(depth));
        let raw = RawNode::from_json_str(&text).unwrap();
        assert!(raw.as_map().contains_key("a"));
        assert!(RawNode::from_json_str("[1]").is_err());
    }

    #[test]
    fn test_raw_node_rejects_non_objects() {
        assert!(RawNode::from_value(json!({"type": "Text"})).is_ok());
        assert_eq!(RawNode::from_value(json!([1, 2])), Err(json!([1, 2])));
    }

    #[test]
    fn test_raw_node_type_name() {
        let raw = RawNode::from_json_str(r#"{"type": "Code", "value": "x=1"}"#).unwrap();
        assert_eq!(raw.type_name(), Some("Code"));

        let untyped = RawNode::from_json_str(r#"{"type": 3}"#).unwrap();
        assert_eq!(untyped.type_name(), None);
    }

    #[test]
    fn test_to_raw_round_trips_through_json_text() {
        let node = Node::container("Strong", vec![Node::leaf("Text", json!("bold"))]);
        let text = serde_json::to_string(&node).unwrap();
        let raw = RawNode::from_json_str(&text).unwrap();
        assert_eq!(raw, node.to_raw());
    }
}
