use crate::error::{RPlusTreeError, Result};
use crate::r#type::IndexableNum;
use crate::rplus::bbox::Bbox;
use crate::rplus::node::{NodeData, NodeId, NodeKind};
use crate::rplus::traversal::Node;

/// The default maximum number of children per node used by [`RPlusTree::default`].
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// The default minimum number of children per non-root node used by [`RPlusTree::default`].
pub const DEFAULT_MIN_ENTRIES: usize = 2;

/// The default number of dimensions used by [`RPlusTree::new`].
pub const DEFAULT_NUM_DIMS: usize = 2;

/// Configuration describing a tree. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeMetadata {
    max_entries: usize,
    min_entries: usize,
    num_dims: usize,
}

impl TreeMetadata {
    /// Validate a tree configuration.
    ///
    /// `max_entries` and `num_dims` must be non-zero, and `min_entries` must be at most half of
    /// `max_entries`.
    pub fn try_new(max_entries: usize, min_entries: usize, num_dims: usize) -> Result<Self> {
        if max_entries == 0 {
            return Err(RPlusTreeError::InvalidConfig(
                "max_entries must be greater than zero.".to_string(),
            ));
        }
        if min_entries > max_entries / 2 {
            return Err(RPlusTreeError::InvalidConfig(format!(
                "min_entries ({}) must be at most half of max_entries ({}).",
                min_entries, max_entries
            )));
        }
        if num_dims == 0 {
            return Err(RPlusTreeError::InvalidConfig(
                "num_dims must be greater than zero.".to_string(),
            ));
        }

        Ok(Self {
            max_entries,
            min_entries,
            num_dims,
        })
    }

    /// The maximum number of children of any node.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// The minimum number of children of the halves produced by a split.
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// The number of dimensions of every rectangle in the tree.
    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// Reject rectangles whose dimensionality differs from the tree's.
    pub(crate) fn check_rect<N>(&self, lower: &[N], extent: &[N]) -> Result<()> {
        for actual in [lower.len(), extent.len()] {
            if actual != self.num_dims {
                return Err(RPlusTreeError::DimensionMismatch {
                    expected: self.num_dims,
                    actual,
                });
            }
        }
        Ok(())
    }
}

impl Default for TreeMetadata {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            min_entries: DEFAULT_MIN_ENTRIES,
            num_dims: DEFAULT_NUM_DIMS,
        }
    }
}

/// A dynamic R+-tree.
///
/// Rectangles are inserted one at a time together with a payload. Sibling regions produced by a
/// split never overlap: a rectangle crossing the cut line is stored in both halves, clipped to
/// each. Searches deduplicate, so each payload is reported at most once.
///
/// ```
/// use rplus_tree::rplus::RPlusTree;
///
/// let mut tree = RPlusTree::<f64, &str>::new(4, 2).unwrap();
/// tree.insert(&[0., 0.], &[2., 2.], "a").unwrap();
/// tree.insert(&[5., 5.], &[1., 1.], "b").unwrap();
///
/// let found = tree.search(&[1., 1.], &[0.5, 0.5]).unwrap();
/// assert_eq!(found, vec![&"a"]);
/// ```
#[derive(Debug, Clone)]
pub struct RPlusTree<N: IndexableNum, T> {
    pub(crate) metadata: TreeMetadata,
    pub(crate) nodes: Vec<NodeData<N>>,
    pub(crate) items: Vec<T>,
    pub(crate) root: NodeId,
}

impl<N: IndexableNum, T> RPlusTree<N, T> {
    /// Create an empty two-dimensional tree.
    pub fn new(max_entries: usize, min_entries: usize) -> Result<Self> {
        Self::new_with_dims(max_entries, min_entries, DEFAULT_NUM_DIMS)
    }

    /// Create an empty tree with the provided number of dimensions.
    pub fn new_with_dims(max_entries: usize, min_entries: usize, num_dims: usize) -> Result<Self> {
        let metadata = TreeMetadata::try_new(max_entries, min_entries, num_dims)?;
        Ok(Self::from_metadata(metadata))
    }

    /// Create an empty tree from validated metadata.
    pub fn from_metadata(metadata: TreeMetadata) -> Self {
        let root = NodeData::new(Bbox::empty(metadata.num_dims()), NodeKind::Leaf, None);
        Self {
            metadata,
            nodes: vec![root],
            items: Vec::new(),
            root: NodeId::new(0),
        }
    }

    /// Access the [TreeMetadata] of this tree.
    pub fn metadata(&self) -> &TreeMetadata {
        &self.metadata
    }

    pub fn max_entries(&self) -> usize {
        self.metadata.max_entries()
    }

    pub fn min_entries(&self) -> usize {
        self.metadata.min_entries()
    }

    pub fn num_dims(&self) -> usize {
        self.metadata.num_dims()
    }

    /// The number of `insert` calls made on this tree.
    ///
    /// This is not the number of stored entries, which may be larger because splitting can
    /// store one rectangle in several leaves.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The payload stored under the given insertion index.
    pub fn payload(&self, index: u32) -> Option<&T> {
        self.items.get(index as usize)
    }

    /// All payloads in insertion order.
    pub fn payloads(&self) -> &[T] {
        &self.items
    }

    /// Access the root node of the tree for manual traversal.
    pub fn root(&self) -> Node<'_, N, T> {
        Node::new(self, self.root)
    }

    /// The number of node levels above the entries. A tree whose root directly owns its entries
    /// has a height of 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.nodes[self.root.get()];
        while let NodeKind::Internal = node.kind {
            match node.children.first() {
                Some(child) => node = &self.nodes[child.get()],
                None => break,
            }
            height += 1;
        }
        height
    }

    /// The number of entries physically stored in the tree, duplicates included.
    pub fn num_entries(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Entry(_)))
            .count()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &NodeData<N> {
        &self.nodes[id.get()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData<N> {
        &mut self.nodes[id.get()]
    }

    pub(crate) fn alloc(&mut self, data: NodeData<N>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(data);
        id
    }
}

impl<N: IndexableNum, T> Default for RPlusTree<N, T> {
    fn default() -> Self {
        Self::from_metadata(TreeMetadata::default())
    }
}
