//! Swift symbols as node trees.

pub use self::arena::{NodeArena, NodeId};
pub use self::kind::{NodeKind, UNKNOWN_KIND_NAME, kind_name};
pub use self::node::{BreadthFirst, Children, DistinctBreadthFirst, Node};
pub use self::normalize::normalize_symbol;
pub use self::parsers::Demangler;
use mini_parser::CursorExt;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

mod arena;
mod kind;
mod node;
mod normalize;
mod parsers;

#[cfg(test)]
mod tests;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Grammar engine that builds node trees.
pub trait Engine {
    /// Demangles `symbol` into `arena` and returns the root node, or `None` if the symbol is malformed.
    ///
    /// Nodes created before a `None` result are discarded by the caller.
    fn demangle(&mut self, symbol: &str, arena: &mut NodeArena) -> Option<NodeId>;
}

/// Configuration of a [`Context`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    normalize_usr: bool,
    max_repeat_count: usize,
    max_stack_depth: usize,
    max_tree_depth: usize,
}

impl Options {
    /// Default options: USR normalization on, a repeat count limit of 2048, a node stack limit of 1024 and a tree
    /// depth limit of 256.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            normalize_usr: true,
            max_repeat_count: 2048,
            max_stack_depth: 1024,
            max_tree_depth: 256,
        }
    }

    /// Whether `s:` reference names are rewritten with [`normalize_symbol`] before demangling.
    #[must_use]
    pub const fn normalize_usr(mut self, value: bool) -> Self {
        self.normalize_usr = value;

        self
    }

    /// Largest repeat count a substitution may use.
    #[must_use]
    pub const fn max_repeat_count(mut self, value: usize) -> Self {
        self.max_repeat_count = value;

        self
    }

    /// Largest number of pending nodes while demangling.
    #[must_use]
    pub const fn max_stack_depth(mut self, value: usize) -> Self {
        self.max_stack_depth = value;

        self
    }

    /// Largest number of nodes on a path from a pending node down to a leaf.
    ///
    /// Deeper trees are rejected, which bounds the recursion of anything walking the result, such as [`Debug`].
    #[must_use]
    pub const fn max_tree_depth(mut self, value: usize) -> Self {
        self.max_tree_depth = value;

        self
    }

    pub(crate) const fn repeat_count_limit(&self) -> usize {
        self.max_repeat_count
    }

    pub(crate) const fn stack_depth_limit(&self) -> usize {
        self.max_stack_depth
    }

    pub(crate) const fn tree_depth_limit(&self) -> usize {
        self.max_tree_depth
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

/// Storable reference to a node of a [`Context`].
///
/// A handle stays valid until the context that produced it is cleared or dropped.
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeHandle {
    context: u64,
    epoch: u64,
    node: NodeId,
}

impl NodeHandle {
    const fn with_node(self, node: NodeId) -> Self {
        Self { node, ..self }
    }
}

/// Error returned when resolving a [`NodeHandle`] fails.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum InvalidHandle {
    /// The handle was produced by another context.
    #[error("node handle belongs to another context")]
    ForeignContext,
    /// The context was cleared after the handle was produced.
    #[error("node handle was invalidated by clearing its context")]
    Stale,
}

/// Demangling context that owns every node tree it produces.
///
/// ```rust
/// use swift_demangle_tree::swift::{Context, NodeKind};
///
/// let mut context = Context::new();
/// let root = context.demangle_symbol_as_tree("$S4main3FooC").unwrap();
/// let root = context.node(root);
///
/// assert_eq!(root.kind(), NodeKind::Global);
/// assert_eq!(root.child(0).kind(), NodeKind::Class);
/// assert_eq!(root.child(0).child(0).text(), "main");
/// assert_eq!(root.child(0).child(1).text(), "Foo");
///
/// assert!(context.demangle_symbol_as_tree("$S4mai").is_none());
/// ```
#[derive(Debug)]
pub struct Context<E = Demangler> {
    id: u64,
    epoch: u64,
    arena: NodeArena,
    engine: E,
    normalize_usr: bool,
}

impl Context {
    /// Creates a context with the default engine and options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::new())
    }

    /// Creates a context with the default engine configured by `options`.
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self::with_engine(Demangler::new(&options), options)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Context<E>
where
    E: Engine,
{
    /// Creates a context that demangles with `engine`. The limits in `options` only configure the default engine.
    pub fn with_engine(engine: E, options: Options) -> Self {
        Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            epoch: 0,
            arena: NodeArena::new(),
            engine,
            normalize_usr: options.normalize_usr,
        }
    }

    const fn handle(&self, node: NodeId) -> NodeHandle {
        NodeHandle {
            context: self.id,
            epoch: self.epoch,
            node,
        }
    }

    /// Demangles `symbol` and returns the root of the resulting tree, or `None` if the symbol is malformed.
    ///
    /// A failed attempt leaves no nodes behind.
    pub fn demangle_symbol_as_tree(&mut self, symbol: &str) -> Option<NodeHandle> {
        let normalized = if self.normalize_usr {
            normalize_symbol(symbol)
        } else {
            Cow::Borrowed(symbol)
        };

        if normalized != symbol {
            tracing::trace!(symbol, normalized = &*normalized, "normalized reference name");
        }

        let engine = &mut self.engine;

        match self
            .arena
            .transaction(|arena| engine.demangle(&normalized, arena).ok_or(()))
        {
            Ok(root) => Some(self.handle(root)),
            Err(()) => {
                tracing::debug!(symbol, "rejected symbol");

                None
            }
        }
    }

    /// Resolves `handle` to a node view.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to another context or the context was cleared since the handle was produced.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Node<'_> {
        match self.try_node(handle) {
            Ok(node) => node,
            Err(error) => panic!("{error}"),
        }
    }

    /// Resolves `handle` to a node view, or reports why it cannot be resolved.
    pub fn try_node(&self, handle: NodeHandle) -> Result<Node<'_>, InvalidHandle> {
        if handle.context != self.id {
            Err(InvalidHandle::ForeignContext)
        } else if handle.epoch != self.epoch || !self.arena.contains(handle.node) {
            Err(InvalidHandle::Stale)
        } else {
            Ok(Node::new(&self.arena, handle))
        }
    }

    /// Releases every node produced so far. All existing handles become stale.
    pub fn clear(&mut self) {
        if self.arena.is_empty() {
            return;
        }

        tracing::trace!(context = self.id, nodes = self.arena.len(), "clearing context");

        self.arena.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Number of nodes currently owned by the context.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Whether the context owns no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}
