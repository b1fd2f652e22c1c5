use crate::swift::kind::NodeKind;
use mini_parser::Cursor;
use std::ops::Range;

/// Index of a node inside a [`NodeArena`].
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
enum Payload {
    None,
    Text(Range<usize>),
    Index(u64),
    Children(Vec<NodeId>),
}

#[derive(Clone, Debug)]
struct NodeRecord {
    kind: NodeKind,
    payload: Payload,
    height: usize,
}

/// Node storage owned by a [`Context`](crate::swift::Context).
///
/// Engines build trees exclusively through this type. Node texts are stored back to back in a single buffer, and
/// children are referenced by [`NodeId`], so a subtree can be shared by several parents.
///
/// Passing a [`NodeId`] that was not created by this arena, or that was created before the last clear, is a contract
/// violation and may panic.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<NodeRecord>,
    text: String,
}

impl NodeArena {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            text: String::new(),
        }
    }

    fn push(&mut self, kind: NodeKind, payload: Payload) -> NodeId {
        let id = NodeId(self.nodes.len());

        let height = match &payload {
            Payload::Children(children) => self.height_above(children),
            _ => 1,
        };

        self.nodes.push(NodeRecord { kind, payload, height });

        id
    }

    fn height_above(&self, children: &[NodeId]) -> usize {
        children.iter().map(|&child| self.record(child).height).max().unwrap_or(0) + 1
    }

    fn record(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id.0]
    }

    /// Creates a node without payload.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.push(kind, Payload::None)
    }

    /// Creates a node carrying a copy of `text`.
    pub fn create_with_text(&mut self, kind: NodeKind, text: &str) -> NodeId {
        let start = self.text.len();

        self.text.push_str(text);

        let end = self.text.len();

        self.push(kind, Payload::Text(start..end))
    }

    /// Creates a node carrying a numeric index.
    pub fn create_with_index(&mut self, kind: NodeKind, index: u64) -> NodeId {
        self.push(kind, Payload::Index(index))
    }

    /// Creates a node with the given children, in order.
    pub fn create_with_children<I>(&mut self, kind: NodeKind, children: I) -> NodeId
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.push(kind, Payload::Children(children.into_iter().collect()))
    }

    /// Creates a copy of `id` with a different kind. The copy shares the text and children of the original.
    pub fn change_kind(&mut self, id: NodeId, kind: NodeKind) -> NodeId {
        let payload = self.record(id).payload.clone();

        self.push(kind, payload)
    }

    /// Appends `child` to the children of `parent`. Returns `None` if `parent` carries text or an index.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        let record = &mut self.nodes[parent.0];

        match &mut record.payload {
            payload @ Payload::None => *payload = Payload::Children(vec![child]),
            Payload::Children(children) => children.push(child),
            Payload::Text(_) | Payload::Index(_) => return None,
        }

        let height = self.record(child).height + 1;
        let record = &mut self.nodes[parent.0];

        record.height = record.height.max(height);

        Some(parent)
    }

    /// Reverses the child list of `id` in place.
    pub fn reverse_children(&mut self, id: NodeId) {
        if let Payload::Children(children) = &mut self.nodes[id.0].payload {
            children.reverse();
        }
    }

    /// Kind of the node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.record(id).kind
    }

    /// Text payload of the node, if any.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.record(id).payload {
            Payload::Text(range) => self.text.get(range.clone()),
            _ => None,
        }
    }

    /// Index payload of the node, if any.
    #[must_use]
    pub fn index(&self, id: NodeId) -> Option<u64> {
        match self.record(id).payload {
            Payload::Index(index) => Some(index),
            _ => None,
        }
    }

    /// Number of nodes on the longest downward path starting at `id`, counting `id` itself.
    ///
    /// The heights of nodes that already have parents are not updated by [`add_child`](Self::add_child).
    #[must_use]
    pub fn height(&self, id: NodeId) -> usize {
        self.record(id).height
    }

    /// Children of `id` in order. Empty for nodes without a child list.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.record(id).payload {
            Payload::Children(children) => children,
            _ => &[],
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.text.clear();
    }
}

// Rolling back only discards nodes created after the saved cursor. Nodes that existed before keep any children that
// were added to them in between.
impl Cursor for NodeArena {
    type Cursor = (usize, usize);

    fn get_cursor(&mut self) -> Self::Cursor {
        (self.nodes.len(), self.text.len())
    }

    fn set_cursor(&mut self, cursor: Self::Cursor) {
        self.nodes.truncate(cursor.0);
        self.text.truncate(cursor.1);
    }
}

#[cfg(test)]
mod tests {
    use super::NodeArena;
    use crate::swift::kind::NodeKind;
    use mini_parser::CursorExt;

    #[test]
    fn test_payloads() {
        let mut arena = NodeArena::new();
        let module = arena.create_with_text(NodeKind::Module, "main");
        let index = arena.create_with_index(NodeKind::Index, 7);
        let type_ = arena.create(NodeKind::Type);

        assert_eq!(arena.text(module), Some("main"));
        assert_eq!(arena.index(module), None);
        assert_eq!(arena.index(index), Some(7));
        assert_eq!(arena.text(index), None);
        assert!(arena.children(type_).is_empty());

        assert_eq!(arena.add_child(type_, module), Some(type_));
        assert_eq!(arena.add_child(type_, index), Some(type_));
        assert_eq!(arena.add_child(module, index), None);
        assert_eq!(arena.children(type_), [module, index]);

        arena.reverse_children(type_);

        assert_eq!(arena.children(type_), [index, module]);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_change_kind() {
        let mut arena = NodeArena::new();
        let identifier = arena.create_with_text(NodeKind::Identifier, "Foundation");
        let module = arena.change_kind(identifier, NodeKind::Module);

        assert_ne!(identifier, module);
        assert_eq!(arena.kind(identifier), NodeKind::Identifier);
        assert_eq!(arena.kind(module), NodeKind::Module);
        assert_eq!(arena.text(module), Some("Foundation"));
    }

    #[test]
    fn test_height() {
        let mut arena = NodeArena::new();
        let module = arena.create_with_text(NodeKind::Module, "main");
        let name = arena.create_with_text(NodeKind::Identifier, "Foo");
        let nominal = arena.create_with_children(NodeKind::Structure, [module, name]);
        let type_ = arena.create_with_children(NodeKind::Type, [nominal]);
        let global = arena.create(NodeKind::Global);

        assert_eq!(arena.height(module), 1);
        assert_eq!(arena.height(nominal), 2);
        assert_eq!(arena.height(type_), 3);
        assert_eq!(arena.height(global), 1);

        arena.add_child(global, module);

        assert_eq!(arena.height(global), 2);

        arena.add_child(global, type_);

        assert_eq!(arena.height(global), 4);

        let metatype = arena.change_kind(type_, NodeKind::Metatype);

        assert_eq!(arena.height(metatype), 3);
    }

    #[test]
    fn test_transaction_rolls_back() {
        let mut arena = NodeArena::new();
        let kept = arena.create_with_text(NodeKind::Identifier, "kept");

        let result = arena.transaction(|arena| {
            arena.create_with_text(NodeKind::Identifier, "discarded");

            Err::<(), _>(())
        });

        assert_eq!(result, Err(()));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.text(kept), Some("kept"));

        let created = arena.create_with_text(NodeKind::Identifier, "next");

        assert_eq!(arena.text(created), Some("next"));

        arena.clear();

        assert!(arena.is_empty());
    }
}
