//! Depth-first visitation
//!
//! `visit` walks a tree parent-before-children, left-to-right, calling a
//! `Visitor` for the nodes a predicate selects. Order depends only on tree
//! shape, so two walks over the same tree see the same sequence.
//!
//! ```rust
//! use oxa_core::models::{Node, NodePath};
//! use oxa_core::operations::{by_type, visit, Hooks};
//! use std::ops::ControlFlow;
//!
//! let tree = Node::container(
//!     "Paragraph",
//!     [Node::leaf("Text", "Hello "), Node::leaf("Text", "world")],
//! );
//!
//! let mut words = Vec::new();
//! let mut hooks = Hooks::new(|node: &Node, _path: &NodePath| {
//!     words.push(node.value().and_then(|v| v.as_str()).unwrap_or_default().to_string());
//!     ControlFlow::Continue(())
//! });
//! let _ = visit(&tree, by_type("Text"), &mut hooks);
//! assert_eq!(words, ["Hello ", "world"]);
//! ```

use crate::models::{Node, NodePath};
use std::ops::ControlFlow;

/// `Continue(())` to keep walking, `Break(())` to stop the walk
pub type VisitResult = ControlFlow<()>;

/// Callbacks for `visit`
///
/// Any `FnMut(&Node, &NodePath) -> VisitResult` is a visitor with an
/// enter hook only.
pub trait Visitor {
    /// Called before a matching node's children
    fn enter(&mut self, node: &Node, path: &NodePath) -> VisitResult;

    /// Called after a matching node's children
    fn leave(&mut self, _node: &Node, _path: &NodePath) -> VisitResult {
        ControlFlow::Continue(())
    }
}

impl<F> Visitor for F
where
    F: FnMut(&Node, &NodePath) -> VisitResult,
{
    fn enter(&mut self, node: &Node, path: &NodePath) -> VisitResult {
        self(node, path)
    }
}

fn continue_walk(_node: &Node, _path: &NodePath) -> VisitResult {
    ControlFlow::Continue(())
}

/// Visitor built from a pair of closures
pub struct Hooks<E, L = fn(&Node, &NodePath) -> VisitResult> {
    enter: E,
    leave: L,
}

impl<E> Hooks<E> {
    pub fn new(enter: E) -> Self
    where
        E: FnMut(&Node, &NodePath) -> VisitResult,
    {
        Self {
            enter,
            leave: continue_walk,
        }
    }
}

impl<E, L> Hooks<E, L> {
    /// Replace the leave hook
    pub fn on_leave<L2>(self, leave: L2) -> Hooks<E, L2>
    where
        L2: FnMut(&Node, &NodePath) -> VisitResult,
    {
        Hooks {
            enter: self.enter,
            leave,
        }
    }
}

impl<E, L> Visitor for Hooks<E, L>
where
    E: FnMut(&Node, &NodePath) -> VisitResult,
    L: FnMut(&Node, &NodePath) -> VisitResult,
{
    fn enter(&mut self, node: &Node, path: &NodePath) -> VisitResult {
        (self.enter)(node, path)
    }

    fn leave(&mut self, node: &Node, path: &NodePath) -> VisitResult {
        (self.leave)(node, path)
    }
}

/// Walk `root` depth-first, calling `visitor` on nodes matching `predicate`
///
/// Non-matching nodes are still descended into. A `Break` from either hook
/// ends the walk at once: no further `enter` or `leave` calls are made, and
/// `visit` returns `Break(())`.
pub fn visit<P, V>(root: &Node, predicate: P, visitor: &mut V) -> VisitResult
where
    P: Fn(&Node) -> bool,
    V: Visitor + ?Sized,
{
    let mut path = NodePath::root();
    walk(root, &mut path, &predicate, visitor)
}

fn walk<P, V>(node: &Node, path: &mut NodePath, predicate: &P, visitor: &mut V) -> VisitResult
where
    P: Fn(&Node) -> bool,
    V: Visitor + ?Sized,
{
    let selected = predicate(node);
    if selected {
        visitor.enter(node, path)?;
    }

    for (index, child) in node.children().iter().enumerate() {
        path.push_index(index);
        let result = walk(child, path, predicate, visitor);
        path.pop();
        result?;
    }

    if selected {
        visitor.leave(node, path)?;
    }
    ControlFlow::Continue(())
}
