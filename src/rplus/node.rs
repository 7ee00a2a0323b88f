//! Arena storage for tree nodes.

use crate::r#type::IndexableNum;
use crate::rplus::bbox::Bbox;

/// Handle of a node inside the tree's arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

/// What a node holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// Children are nodes.
    Internal,
    /// Children are entries.
    Leaf,
    /// A rectangle associated with the item at this insertion index. Has no children.
    Entry(u32),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData<N: IndexableNum> {
    pub(crate) bbox: Bbox<N>,
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
    /// Owner of this node. Only the root has none.
    pub(crate) parent: Option<NodeId>,
}

impl<N: IndexableNum> NodeData<N> {
    pub(crate) fn new(bbox: Bbox<N>, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            bbox,
            kind,
            children: Vec::new(),
            parent,
        }
    }

    /// Leaf containers and entries both count as leaves, so that traversal stops at the first
    /// leaf it meets.
    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        !matches!(self.kind, NodeKind::Internal)
    }

    #[inline]
    pub(crate) fn item(&self) -> Option<u32> {
        match self.kind {
            NodeKind::Entry(item) => Some(item),
            _ => None,
        }
    }
}
