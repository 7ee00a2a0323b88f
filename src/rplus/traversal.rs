//! Utilities to traverse the R+-tree structure.

use std::fmt;

use geo_traits::{CoordTrait, RectTrait};

use crate::error::{RPlusTreeError, Result};
use crate::r#type::IndexableNum;
use crate::rplus::index::RPlusTree;
use crate::rplus::node::{NodeData, NodeId, NodeKind};

/// A borrowed view of a node in the tree: an internal node, a leaf, or an entry.
pub struct Node<'a, N: IndexableNum, T> {
    /// The tree that this node is a reference onto
    tree: &'a RPlusTree<N, T>,
    id: NodeId,
}

impl<N: IndexableNum, T> Clone for Node<'_, N, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: IndexableNum, T> Copy for Node<'_, N, T> {}

impl<N: IndexableNum, T> fmt::Debug for Node<'_, N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id.get())
            .field("kind", &self.data().kind)
            .field("lower", &self.lower())
            .field("extent", &self.extent())
            .finish()
    }
}

impl<'a, N: IndexableNum, T> Node<'a, N, T> {
    pub(crate) fn new(tree: &'a RPlusTree<N, T>, id: NodeId) -> Self {
        Self { tree, id }
    }

    #[inline]
    fn data(&self) -> &'a NodeData<N> {
        self.tree.node(self.id)
    }

    /// The lower corner of this node's bounding box.
    pub fn lower(&self) -> &'a [N] {
        self.data().bbox.lower()
    }

    /// The per-axis size of this node's bounding box.
    pub fn extent(&self) -> &'a [N] {
        self.data().bbox.extent()
    }

    /// Get the lower bound of this node on `axis`.
    ///
    /// Panics if `axis` is not below the tree's number of dimensions.
    pub fn lower_bound(&self, axis: usize) -> N {
        self.data().bbox.min(axis)
    }

    /// Get the upper bound of this node on `axis`.
    ///
    /// Panics if `axis` is not below the tree's number of dimensions.
    pub fn upper_bound(&self, axis: usize) -> N {
        self.data().bbox.max(axis)
    }

    /// Returns `true` if this node has no bounding box yet. Only a root without children is
    /// empty.
    pub fn is_empty(&self) -> bool {
        self.data().bbox.is_empty()
    }

    /// Returns `true` for leaf nodes and for entries.
    pub fn is_leaf(&self) -> bool {
        self.data().is_leaf()
    }

    /// Returns `true` if this is an entry holding a rectangle and a payload.
    pub fn is_entry(&self) -> bool {
        matches!(self.data().kind, NodeKind::Entry(_))
    }

    /// Returns `true` if this is an internal node whose children are nodes.
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// Returns an iterator over the children of this node. Entries have none.
    pub fn children(&self) -> impl Iterator<Item = Node<'a, N, T>> {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&child| Node::new(tree, child))
    }

    /// The node owning this one. The root has no parent.
    pub fn parent(&self) -> Option<Node<'a, N, T>> {
        self.data().parent.map(|parent| Node::new(self.tree, parent))
    }

    /// The insertion index of the payload. Only entries have one.
    pub fn index(&self) -> Option<u32> {
        self.data().item()
    }

    /// The payload of this entry.
    pub fn payload(&self) -> Option<&'a T> {
        let tree = self.tree;
        self.index().map(|index| &tree.items[index as usize])
    }

    /// Returns `true` if this node overlaps another node under the tolerant overlap test.
    pub fn intersects<T2>(&self, other: &Node<'_, N, T2>) -> bool {
        self.data().bbox.overlaps(&other.data().bbox)
    }
}

impl<N: IndexableNum, T> RPlusTree<N, T> {
    /// The nodes at a given level of the tree. Level 0 holds the leaf nodes and level
    /// `height() - 1` holds only the root. Entries are not part of any level.
    pub fn nodes_at_level(&self, level: usize) -> Result<Vec<Node<'_, N, T>>> {
        let height = self.height();
        if level >= height {
            return Err(RPlusTreeError::General("Level out of bounds".to_string()));
        }

        let mut nodes = vec![self.root()];
        for _ in 0..height - 1 - level {
            nodes = nodes.iter().flat_map(|node| node.children()).collect();
        }
        Ok(nodes)
    }
}

/// A single coordinate.
///
/// Used in the implementation of RectTrait for Node.
pub struct Coord<N: IndexableNum> {
    x: N,
    y: N,
}

impl<N: IndexableNum> CoordTrait for Coord<N> {
    type T = N;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

/// Views of two-dimensional trees are rectangles. Only the first two axes are exposed; a
/// one-dimensional tree reports zero for `y`.
impl<N: IndexableNum, T> RectTrait for Node<'_, N, T> {
    type T = N;
    type CoordType<'a>
        = Coord<N>
    where
        Self: 'a;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        let lower = self.lower();
        Coord {
            x: lower[0],
            y: lower.get(1).copied().unwrap_or_else(N::zero),
        }
    }

    fn max(&self) -> Self::CoordType<'_> {
        let bbox = &self.data().bbox;
        Coord {
            x: bbox.max(0),
            y: if bbox.num_dims() > 1 {
                bbox.max(1)
            } else {
                N::zero()
            },
        }
    }
}

#[cfg(test)]
mod test {
    use crate::rplus::RPlusTree;

    fn grid_tree() -> RPlusTree<f64, (u32, u32)> {
        let mut tree = RPlusTree::new(4, 2).unwrap();
        for x in 0..10 {
            for y in 0..10 {
                tree.insert(&[x as f64 * 10., y as f64 * 10.], &[5., 5.], (x, y))
                    .unwrap();
            }
        }
        tree
    }

    #[test]
    fn test_node() {
        let tree = grid_tree();
        let root = tree.root();
        assert!(root.is_parent());
        assert!(root.parent().is_none());
        assert_eq!(root.lower(), &[0., 0.]);
        assert_eq!(root.extent(), &[95., 95.]);

        for child in root.children() {
            assert_eq!(child.parent().map(|p| p.lower()), Some(root.lower()));
            assert!(child.intersects(&root));
        }
    }

    #[test]
    fn levels_partition_the_tree() {
        let tree = grid_tree();
        let height = tree.height();
        assert!(height > 2);

        let top = tree.nodes_at_level(height - 1).unwrap();
        assert_eq!(top.len(), 1);

        let leaves = tree.nodes_at_level(0).unwrap();
        assert!(leaves.iter().all(|node| node.is_leaf() && !node.is_entry()));
        let entries: usize = leaves.iter().map(|leaf| leaf.children().count()).sum();
        assert_eq!(entries, tree.num_entries());

        assert!(tree.nodes_at_level(height).is_err());
    }

    #[test]
    fn leaves_lists_every_entry() {
        let tree = grid_tree();
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), tree.num_entries());
        assert!(leaves.iter().all(|entry| entry.is_entry()));

        // every cell is listed at least once, however many pieces it was cut into
        let mut payloads: Vec<_> = leaves.iter().filter_map(|e| e.payload()).copied().collect();
        payloads.sort();
        payloads.dedup();
        assert_eq!(payloads.len(), 100);
    }
}
