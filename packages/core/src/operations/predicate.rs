//! Node predicates for `visit` and `find`
//!
//! Predicates dispatch on type name, content class or category only; any
//! `Fn(&Node) -> bool` works in their place.

use crate::models::{ContentClass, Node, NodeCategory};
use crate::services::SchemaRegistry;

/// Matches every node
pub fn any_node(_node: &Node) -> bool {
    true
}

/// Matches nodes whose `type` equals `type_name`
pub fn by_type(type_name: impl Into<String>) -> impl Fn(&Node) -> bool {
    let type_name = type_name.into();
    move |node: &Node| node.node_type() == type_name
}

pub fn by_content_class(class: ContentClass) -> impl Fn(&Node) -> bool {
    move |node: &Node| node.content_class() == class
}

/// Matches nodes whose registered type has `category`; unregistered types
/// never match
pub fn by_category(
    registry: &SchemaRegistry,
    category: NodeCategory,
) -> impl Fn(&Node) -> bool + '_ {
    move |node: &Node| registry.category_of(node.node_type()) == Some(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::find;

    #[test]
    fn test_by_category_uses_registry() {
        let registry = SchemaRegistry::with_reference_types();
        let tree = Node::container(
            "Paragraph",
            [
                Node::leaf("Text", "a"),
                Node::leaf("Unregistered", "b"),
                Node::container("Strong", [Node::leaf("Text", "c")]),
            ],
        );

        let inline: Vec<&str> = find(&tree, by_category(&registry, NodeCategory::Inline))
            .map(Node::node_type)
            .collect();
        assert_eq!(inline, ["Text", "Strong", "Text"]);

        let blocks = find(&tree, by_category(&registry, NodeCategory::Block)).count();
        assert_eq!(blocks, 1);
    }

    #[test]
    fn test_by_content_class() {
        let rule = Node::empty("ThematicBreak");
        assert!(by_content_class(ContentClass::Empty)(&rule));
        assert!(!by_content_class(ContentClass::Leaf)(&rule));
        assert!(by_type("ThematicBreak")(&rule));
        assert!(!by_type("thematicBreak")(&rule));
    }
}
