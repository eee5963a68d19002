//! Copy-on-write tree rewriting
//!
//! `transform` applies a rule to every node bottom-up: a node's children are
//! rewritten first, so the rule sees its already-rewritten children and
//! nothing above it. The input tree is never touched. Subtrees the rule
//! leaves alone are shared with the output through their `Arc`.
//!
//! ## Example Usage
//!
//! ```rust
//! use oxa_core::models::Node;
//! use oxa_core::operations::{transform, Action};
//!
//! let tree = Node::container(
//!     "Paragraph",
//!     [Node::leaf("Text", "draft"), Node::container("Strong", [Node::leaf("Text", "keep")])],
//! );
//!
//! // Unwrap Strong into its children
//! let result = transform(&tree, |node| match node.node_type() {
//!     "Strong" => Action::Replace(node.children()[0].as_ref().clone()),
//!     _ => Action::Keep,
//! })
//! .unwrap();
//!
//! assert_eq!(result.tree.children()[1].node_type(), "Text");
//! assert_eq!(result.rewrites, 1);
//! ```

use crate::models::{Content, Node, NodePath};
use crate::operations::error::TransformError;
use std::fmt;
use std::sync::Arc;

/// What a rule wants done with the node it was shown
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Keep the node as it is (with its rewritten children)
    Keep,
    /// Substitute another node; the substitute is not itself rewritten
    Replace(Node),
    /// Drop the node from its parent's children
    RemoveSelf,
    /// Keep the node but swap its children
    ReplaceChildren(Vec<Node>),
    /// Keep the node and stop applying the rule anywhere
    Stop,
}

/// Output of a transform pass
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub tree: Node,
    /// True when a rule returned `Action::Stop`
    pub stopped: bool,
    /// Number of `Replace`, `RemoveSelf` and `ReplaceChildren` actions applied
    pub rewrites: usize,
}

enum Outcome {
    Unchanged,
    Removed,
    Rewritten(Node),
}

impl Outcome {
    fn from_rebuilt(rebuilt: Option<Node>) -> Self {
        rebuilt.map_or(Outcome::Unchanged, Outcome::Rewritten)
    }
}

struct Pass<R> {
    rule: R,
    path: NodePath,
    stopped: bool,
    rewrites: usize,
}

impl<R> Pass<R>
where
    R: FnMut(&Node, &NodePath) -> Action,
{
    fn rewrite(&mut self, node: &Node) -> Result<Outcome, TransformError> {
        if self.stopped {
            return Ok(Outcome::Unchanged);
        }

        // Rebuilt copy of `node`, only if some child changed
        let mut rebuilt = None;
        if let Content::Children(children) = node.content() {
            let mut next_children = Vec::with_capacity(children.len());
            let mut changed = false;
            for (index, child) in children.iter().enumerate() {
                self.path.push_index(index);
                let outcome = self.rewrite(child);
                self.path.pop();
                match outcome? {
                    Outcome::Unchanged => next_children.push(Arc::clone(child)),
                    Outcome::Rewritten(next) => {
                        next_children.push(Arc::new(next));
                        changed = true;
                    }
                    Outcome::Removed => changed = true,
                }
            }
            if changed {
                rebuilt = Some(node.with_shared_children(next_children));
            }
        }

        // A stop below this node freezes every ancestor
        if self.stopped {
            return Ok(Outcome::from_rebuilt(rebuilt));
        }

        let subject = rebuilt.as_ref().unwrap_or(node);
        match (self.rule)(subject, &self.path) {
            Action::Keep => Ok(Outcome::from_rebuilt(rebuilt)),
            Action::Stop => {
                self.stopped = true;
                Ok(Outcome::from_rebuilt(rebuilt))
            }
            Action::Replace(next) => {
                self.rewrites += 1;
                Ok(Outcome::Rewritten(next))
            }
            Action::RemoveSelf => {
                if self.path.is_root() {
                    return Err(TransformError::RootRemoved {
                        type_name: subject.node_type().to_string(),
                    });
                }
                self.rewrites += 1;
                Ok(Outcome::Removed)
            }
            Action::ReplaceChildren(children) => {
                if !subject.has_children() {
                    return Err(TransformError::NotAContainer {
                        type_name: subject.node_type().to_string(),
                        path: self.path.clone(),
                    });
                }
                self.rewrites += 1;
                Ok(Outcome::Rewritten(
                    subject.with_shared_children(children.into_iter().map(Arc::new).collect()),
                ))
            }
        }
    }
}

/// Rewrite `root` bottom-up with `rule`
///
/// # Errors
///
/// - `RootRemoved`: the rule returned `RemoveSelf` for the root
/// - `NotAContainer`: the rule returned `ReplaceChildren` for a node that
///   does not hold children
pub fn transform<R>(root: &Node, mut rule: R) -> Result<Transformed, TransformError>
where
    R: FnMut(&Node) -> Action,
{
    transform_with_path(root, |node: &Node, _: &NodePath| rule(node))
}

/// Like `transform`, but the rule also receives the node's path in the
/// input tree
pub fn transform_with_path<R>(root: &Node, rule: R) -> Result<Transformed, TransformError>
where
    R: FnMut(&Node, &NodePath) -> Action,
{
    let mut pass = Pass {
        rule,
        path: NodePath::root(),
        stopped: false,
        rewrites: 0,
    };

    let tree = match pass.rewrite(root)? {
        Outcome::Unchanged => root.clone(),
        Outcome::Rewritten(node) => node,
        Outcome::Removed => {
            return Err(TransformError::RootRemoved {
                type_name: root.node_type().to_string(),
            })
        }
    };

    Ok(Transformed {
        tree,
        stopped: pass.stopped,
        rewrites: pass.rewrites,
    })
}

type Rule<'p> = Box<dyn FnMut(&Node, &NodePath) -> Action + Send + 'p>;

/// Ordered rewrite passes applied one after another
///
/// Each pass sees the previous pass's output. Nothing is re-validated
/// between passes. A `Stop` in any pass ends the pipeline with the tree as
/// it stands.
#[derive(Default)]
pub struct Pipeline<'p> {
    passes: Vec<Rule<'p>>,
}

impl<'p> Pipeline<'p> {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a pass whose rule ignores paths
    pub fn pass<R>(self, mut rule: R) -> Self
    where
        R: FnMut(&Node) -> Action + Send + 'p,
    {
        self.pass_with_path(move |node: &Node, _: &NodePath| rule(node))
    }

    /// Append a pass whose rule receives paths
    pub fn pass_with_path<R>(mut self, rule: R) -> Self
    where
        R: FnMut(&Node, &NodePath) -> Action + Send + 'p,
    {
        self.passes.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order over `root`
    pub fn run(&mut self, root: &Node) -> Result<Transformed, TransformError> {
        let mut tree = root.clone();
        let mut rewrites = 0;
        let total = self.passes.len();

        for (index, rule) in self.passes.iter_mut().enumerate() {
            let result = transform_with_path(&tree, |node: &Node, path: &NodePath| rule(node, path))?;
            rewrites += result.rewrites;
            tree = result.tree;

            if result.stopped {
                tracing::debug!("Pipeline stopped in pass {} of {}", index + 1, total);
                return Ok(Transformed {
                    tree,
                    stopped: true,
                    rewrites,
                });
            }
        }

        Ok(Transformed {
            tree,
            stopped: false,
            rewrites,
        })
    }
}

impl fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("passes", &self.passes.len())
            .finish()
    }
}
