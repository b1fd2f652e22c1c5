use crate::swift::NodeHandle;
use crate::swift::arena::{NodeArena, NodeId};
use crate::swift::kind::NodeKind;
use std::collections::{HashSet, VecDeque};
use std::fmt::{self, Debug, Formatter};
use std::iter::FusedIterator;
use std::slice;

/// Read-only view of a node, borrowed from the [`Context`](crate::swift::Context) that produced it.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    arena: &'a NodeArena,
    handle: NodeHandle,
}

impl<'a> Node<'a> {
    pub(crate) const fn new(arena: &'a NodeArena, handle: NodeHandle) -> Self {
        Self { arena, handle }
    }

    const fn with_id(self, node: NodeId) -> Self {
        Self {
            arena: self.arena,
            handle: self.handle.with_node(node),
        }
    }

    /// A handle that can be stored and resolved later with [`Context::node`](crate::swift::Context::node).
    #[must_use]
    pub const fn handle(self) -> NodeHandle {
        self.handle
    }

    /// Kind of the node.
    #[must_use]
    pub fn kind(self) -> NodeKind {
        self.arena.kind(self.handle.node)
    }

    /// Whether the node carries text.
    #[must_use]
    pub fn has_text(self) -> bool {
        self.try_text().is_some()
    }

    /// Text of the node.
    ///
    /// # Panics
    ///
    /// Panics if the node carries no text.
    #[must_use]
    pub fn text(self) -> &'a str {
        match self.try_text() {
            Some(text) => text,
            None => panic!("`{}` node has no text", self.kind().name()),
        }
    }

    /// Text of the node, or `None` if it carries none.
    #[must_use]
    pub fn try_text(self) -> Option<&'a str> {
        self.arena.text(self.handle.node)
    }

    /// Whether the node carries an index.
    #[must_use]
    pub fn has_index(self) -> bool {
        self.try_index().is_some()
    }

    /// Index of the node.
    ///
    /// # Panics
    ///
    /// Panics if the node carries no index.
    #[must_use]
    pub fn index(self) -> u64 {
        match self.try_index() {
            Some(index) => index,
            None => panic!("`{}` node has no index", self.kind().name()),
        }
    }

    /// Index of the node, or `None` if it carries none.
    #[must_use]
    pub fn try_index(self) -> Option<u64> {
        self.arena.index(self.handle.node)
    }

    fn child_ids(self) -> &'a [NodeId] {
        self.arena.children(self.handle.node)
    }

    /// Whether the node has at least one child.
    #[must_use]
    pub fn has_children(self) -> bool {
        !self.child_ids().is_empty()
    }

    /// Number of children, zero for nodes without a child list.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.child_ids().len()
    }

    /// Child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`child_count`](Self::child_count).
    #[must_use]
    pub fn child(self, index: usize) -> Self {
        match self.get_child(index) {
            Some(child) => child,
            None => panic!(
                "child index {index} is out of range for `{}` node with {} children",
                self.kind().name(),
                self.child_count(),
            ),
        }
    }

    /// Child at `index`, or `None` if out of range.
    #[must_use]
    pub fn get_child(self, index: usize) -> Option<Self> {
        self.child_ids().get(index).map(|&id| self.with_id(id))
    }

    /// Children in order.
    #[must_use]
    pub fn children(self) -> Children<'a> {
        Children {
            node: self,
            ids: self.child_ids().iter(),
        }
    }

    /// The node followed by all of its descendants in breadth-first order.
    ///
    /// Substitutions make trees share subtrees, and a shared node is visited once for every path that reaches it. The
    /// number of visits can therefore grow exponentially with the length of the symbol. Use
    /// [`distinct_breadth_first`](Self::distinct_breadth_first) to visit every node once.
    #[must_use]
    pub fn breadth_first(self) -> BreadthFirst<'a> {
        BreadthFirst {
            queue: VecDeque::from([self]),
        }
    }

    /// Like [`breadth_first`](Self::breadth_first), but skips nodes that were already visited through another
    /// parent.
    #[must_use]
    pub fn distinct_breadth_first(self) -> DistinctBreadthFirst<'a> {
        DistinctBreadthFirst {
            queue: VecDeque::from([self]),
            visited: HashSet::from([self.handle.node]),
        }
    }
}

impl Debug for Node<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let kind = self.kind().name();

        if let Some(text) = self.try_text() {
            f.debug_tuple(kind).field(&text).finish()
        } else if let Some(index) = self.try_index() {
            f.debug_tuple(kind).field(&index).finish()
        } else if self.has_children() {
            let mut tuple = f.debug_tuple(kind);

            for child in self.children() {
                tuple.field(&child);
            }

            tuple.finish()
        } else {
            f.write_str(kind)
        }
    }
}

/// Iterator over the children of a [`Node`].
#[derive(Clone)]
pub struct Children<'a> {
    node: Node<'a>,
    ids: slice::Iter<'a, NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|&id| self.node.with_id(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|&id| self.node.with_id(id))
    }
}

impl ExactSizeIterator for Children<'_> {}

impl FusedIterator for Children<'_> {}

/// Breadth-first traversal returned by [`Node::breadth_first`].
#[derive(Clone)]
pub struct BreadthFirst<'a> {
    queue: VecDeque<Node<'a>>,
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;

        self.queue.extend(node.children());

        Some(node)
    }
}

impl FusedIterator for BreadthFirst<'_> {}

/// Breadth-first traversal returned by [`Node::distinct_breadth_first`].
#[derive(Clone)]
pub struct DistinctBreadthFirst<'a> {
    queue: VecDeque<Node<'a>>,
    visited: HashSet<NodeId>,
}

impl<'a> Iterator for DistinctBreadthFirst<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;

        for child in node.children() {
            if self.visited.insert(child.handle.node) {
                self.queue.push_back(child);
            }
        }

        Some(node)
    }
}

impl FusedIterator for DistinctBreadthFirst<'_> {}
