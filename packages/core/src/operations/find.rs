//! Lazy search over a tree
//!
//! `matches` yields every node a predicate accepts, in the same pre-order as
//! `visit`. The iterator holds an explicit stack, so nothing past the last
//! yielded match is examined. Calling `matches` again walks from the root.

use crate::models::{Node, NodePath};
use std::iter::FusedIterator;

/// A node found by `matches`, with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    pub path: NodePath,
    pub node: &'a Node,
}

/// Iterator returned by `matches`
pub struct Matches<'a, P> {
    stack: Vec<(NodePath, &'a Node)>,
    predicate: P,
}

impl<'a, P> Iterator for Matches<'a, P>
where
    P: Fn(&Node) -> bool,
{
    type Item = Match<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, node)) = self.stack.pop() {
            // Reverse push keeps the leftmost child on top
            for (index, child) in node.children().iter().enumerate().rev() {
                self.stack.push((path.child(index), child.as_ref()));
            }
            if (self.predicate)(node) {
                return Some(Match { path, node });
            }
        }
        None
    }
}

impl<P> FusedIterator for Matches<'_, P> where P: Fn(&Node) -> bool {}

/// Matching nodes with their paths, depth-first
pub fn matches<P>(root: &Node, predicate: P) -> Matches<'_, P>
where
    P: Fn(&Node) -> bool,
{
    Matches {
        stack: vec![(NodePath::root(), root)],
        predicate,
    }
}

/// Matching nodes, depth-first
///
/// ```rust
/// use oxa_core::models::Node;
/// use oxa_core::operations::{by_type, find};
///
/// let tree = Node::container(
///     "Paragraph",
///     [Node::leaf("Text", "a"), Node::container("Strong", [Node::leaf("Text", "b")])],
/// );
/// let values: Vec<_> = find(&tree, by_type("Text")).filter_map(|n| n.value()).collect();
/// assert_eq!(values, ["a", "b"]);
/// ```
pub fn find<P>(root: &Node, predicate: P) -> impl Iterator<Item = &Node>
where
    P: Fn(&Node) -> bool,
{
    matches(root, predicate).map(|found| found.node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentClass;
    use crate::operations::{any_node, by_content_class, by_type};
    use std::cell::Cell;

    fn sample() -> Node {
        Node::container(
            "Paragraph",
            [
                Node::leaf("Text", "a"),
                Node::container(
                    "Emphasis",
                    [Node::leaf("Text", "b"), Node::leaf("InlineCode", "c")],
                ),
                Node::leaf("Text", "d"),
            ],
        )
    }

    #[test]
    fn test_find_order_matches_pre_order() {
        let tree = sample();
        let types: Vec<&str> = find(&tree, any_node).map(Node::node_type).collect();
        assert_eq!(
            types,
            ["Paragraph", "Text", "Emphasis", "Text", "InlineCode", "Text"]
        );
    }

    #[test]
    fn test_matches_reports_paths() {
        let tree = sample();
        let paths: Vec<String> = matches(&tree, by_content_class(ContentClass::Leaf))
            .map(|found| found.path.to_string())
            .collect();
        assert_eq!(paths, ["/0", "/1/0", "/1/1", "/2"]);
    }

    #[test]
    fn test_repeated_find_is_identical() {
        let tree = sample();
        let first: Vec<*const Node> = find(&tree, by_type("Text")).map(|n| n as *const _).collect();
        let second: Vec<*const Node> = find(&tree, by_type("Text")).map(|n| n as *const _).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_find_is_lazy() {
        let tree = sample();
        let calls = Cell::new(0);
        let first = find(&tree, |node: &Node| {
            calls.set(calls.get() + 1);
            node.node_type() == "Text"
        })
        .next();

        assert_eq!(first.and_then(Node::value), Some(&serde_json::json!("a")));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_no_match_is_empty() {
        let tree = sample();
        let mut found = find(&tree, by_type("Heading"));
        assert!(found.next().is_none());
        assert!(found.next().is_none());
    }
}
