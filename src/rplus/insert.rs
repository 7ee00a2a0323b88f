use geo_traits::{CoordTrait, RectTrait};
use log::{debug, trace};

use crate::error::{RPlusTreeError, Result};
use crate::r#type::IndexableNum;
use crate::rplus::bbox::Bbox;
use crate::rplus::index::RPlusTree;
use crate::rplus::node::{NodeData, NodeId, NodeKind};

impl<N: IndexableNum, T> RPlusTree<N, T> {
    /// Insert a rectangle given by its lower corner and per-axis extent, associated with
    /// `payload`.
    ///
    /// This returns the insertion index, which [`search_ids`][Self::search_ids] reports and
    /// [`payload`][Self::payload] resolves. Both slices must have exactly
    /// [`num_dims`][Self::num_dims] elements; otherwise the tree is left untouched and an error
    /// is returned. A zero extent stores a point.
    pub fn insert(&mut self, lower: &[N], extent: &[N], payload: T) -> Result<u32> {
        self.metadata.check_rect(lower, extent)?;
        let index: u32 = self.items.len().try_into().map_err(|_| {
            RPlusTreeError::General("Tree holds the maximum number of items.".to_string())
        })?;

        let bbox = Bbox::new(lower, extent);
        let leaves = self.choose_leaves(&bbox);
        trace!("inserting item {} into {} leaves", index, leaves.len());

        self.items.push(payload);
        for leaf in leaves {
            let entry = self.alloc(NodeData::new(
                bbox.clone(),
                NodeKind::Entry(index),
                Some(leaf),
            ));
            self.node_mut(leaf).children.push(entry);

            if self.node(leaf).children.len() > self.metadata.max_entries() {
                let (node, sibling) = self.split_node(leaf);
                self.adjust(node, Some(sibling));
            } else {
                self.adjust(leaf, None);
            }
        }

        Ok(index)
    }

    /// Insert a two-dimensional rectangle.
    ///
    /// Fails with [`RPlusTreeError::DimensionMismatch`] unless this tree has two dimensions.
    pub fn insert_rect(&mut self, rect: &impl RectTrait<T = N>, payload: T) -> Result<u32> {
        let (min, max) = (rect.min(), rect.max());
        self.insert(
            &[min.x(), min.y()],
            &[max.x() - min.x(), max.y() - min.y()],
            payload,
        )
    }

    /// Find every leaf that should receive a new rectangle.
    ///
    /// The descent follows every child overlapping the rectangle, so it may reach several
    /// leaves. When more than one child already contains the whole rectangle, only the first of
    /// them is followed. Where no child overlaps, it follows only the child needing the least expansion, preferring the smaller
    /// one on ties.
    fn choose_leaves(&self, bbox: &Bbox<N>) -> Vec<NodeId> {
        let mut leaves = vec![];
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.is_leaf() || node.children.is_empty() {
                leaves.push(id);
                continue;
            }

            // Siblings from an in-order split may both cover the rectangle. Following each of
            // them would store coincident rectangles again on every insert.
            let mut containing = node
                .children
                .iter()
                .filter(|&&child| self.node(child).bbox.contains(bbox));
            if let (Some(&first), Some(_)) = (containing.next(), containing.next()) {
                stack.push(first);
                continue;
            }

            let mut overlap = false;
            for &child in node.children.iter() {
                if self.node(child).bbox.overlaps(bbox) {
                    stack.push(child);
                    overlap = true;
                }
            }
            if overlap {
                continue;
            }

            let mut best: Option<(NodeId, N, N)> = None;
            for &child in node.children.iter() {
                let child_bbox = &self.node(child).bbox;
                let expansion = child_bbox.required_expansion(bbox);
                let area = child_bbox.area();
                best = match best {
                    Some((_, min_expansion, min_area))
                        if expansion > min_expansion
                            || (expansion == min_expansion && area >= min_area) =>
                    {
                        best
                    }
                    _ => Some((child, expansion, area)),
                };
            }
            if let Some((child, _, _)) = best {
                stack.push(child);
            }
        }

        leaves
    }

    /// Propagate a change at `node` up to the root.
    ///
    /// When `sibling` is set, `node` was just split and `sibling` holds the other half. A split
    /// root is replaced by a new root one level taller; a parent pushed over capacity by the new
    /// sibling is split in turn.
    fn adjust(&mut self, mut node: NodeId, mut sibling: Option<NodeId>) {
        loop {
            if node == self.root {
                if let Some(sibling) = sibling {
                    self.grow_root(node, sibling);
                }
                self.tighten(self.root);
                return;
            }

            self.tighten(node);
            if let Some(new_sibling) = sibling.take() {
                self.tighten(new_sibling);
                if let Some(parent) = self.node(node).parent {
                    if self.node(parent).children.len() > self.metadata.max_entries() {
                        let (a, b) = self.split_node(parent);
                        node = a;
                        sibling = Some(b);
                        continue;
                    }
                }
            }

            match self.node(node).parent {
                Some(parent) => node = parent,
                None => return,
            }
        }
    }

    fn grow_root(&mut self, node: NodeId, sibling: NodeId) {
        let mut root = NodeData::new(
            Bbox::empty(self.metadata.num_dims()),
            NodeKind::Internal,
            None,
        );
        root.children = vec![node, sibling];
        let root = self.alloc(root);
        self.node_mut(node).parent = Some(root);
        self.node_mut(sibling).parent = Some(root);
        self.root = root;
        debug!("root split, tree height is now {}", self.height());
    }

    /// Recompute the MBR of `node` as the exact bounding box of its children, and point every
    /// child's parent back at `node`.
    pub(crate) fn tighten(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.node_mut(node).children);
        for &child in children.iter() {
            self.node_mut(child).parent = Some(node);
        }
        let bbox = Bbox::union_of(
            self.metadata.num_dims(),
            children.iter().map(|&child| &self.node(child).bbox),
        );
        let data = self.node_mut(node);
        data.bbox = bbox;
        data.children = children;
    }
}

#[cfg(test)]
mod test {
    use crate::rplus::RPlusTree;
    use crate::test::{check_invariants, internal_of, leaf_of};
    use crate::RPlusTreeError;

    fn copies(tree: &RPlusTree<f64, u32>, item: u32) -> usize {
        tree.leaves()
            .iter()
            .filter(|entry| entry.index() == Some(item))
            .count()
    }

    #[test]
    fn first_insert_goes_to_root() {
        let mut tree = RPlusTree::<f64, &str>::new(4, 2).unwrap();
        let index = tree.insert(&[1., 2.], &[3., 4.], "only").unwrap();
        assert_eq!(index, 0);
        assert_eq!(tree.size(), 1);

        let root = tree.root();
        assert!(root.is_leaf());
        let children: Vec<_> = root.children().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].payload(), Some(&"only"));
        assert_eq!(root.lower(), &[1., 2.]);
        assert_eq!(root.extent(), &[3., 4.]);
    }

    #[test]
    fn three_points_split_root() {
        let mut tree = RPlusTree::<f64, u32>::new(2, 1).unwrap();
        tree.insert(&[0., 0.], &[0., 0.], 0).unwrap();
        tree.insert(&[10., 10.], &[0., 0.], 1).unwrap();
        assert_eq!(tree.height(), 1);
        tree.insert(&[20., 20.], &[0., 0.], 2).unwrap();
        assert_eq!(tree.height(), 2);
        assert!(tree.root().is_parent());

        let mut found: Vec<u32> = tree
            .search(&[5., 5.], &[20., 20.])
            .unwrap()
            .into_iter()
            .copied()
            .collect();
        found.sort();
        assert_eq!(found, vec![1, 2]);
    }

    #[test]
    fn dimension_mismatch_leaves_tree_untouched() {
        let mut tree = RPlusTree::<f64, u32>::new(4, 2).unwrap();
        tree.insert(&[0., 0.], &[1., 1.], 0).unwrap();

        let err = tree.insert(&[0., 0., 0.], &[1., 1., 1.], 1).unwrap_err();
        assert_eq!(
            err,
            RPlusTreeError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        assert!(tree.insert(&[0., 0.], &[1.], 1).is_err());
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.num_entries(), 1);
    }

    #[test]
    fn identical_rectangles_still_split() {
        let mut tree = RPlusTree::<f32, u32>::new(4, 2).unwrap();
        for i in 0..50 {
            tree.insert(&[3., 3.], &[1., 1.], i).unwrap();
        }
        assert_eq!(tree.size(), 50);
        assert!(tree.height() > 1);

        let mut found = tree.search_ids(&[3.5, 3.5], &[0., 0.]).unwrap();
        found.sort();
        assert_eq!(found, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn rect_trait_insert_requires_two_dimensions() {
        let mut source = RPlusTree::<f64, ()>::new(4, 2).unwrap();
        source.insert(&[1., 2.], &[3., 4.], ()).unwrap();
        let rect = source.root();

        let mut tree = RPlusTree::<f64, u8>::new(4, 2).unwrap();
        tree.insert_rect(&rect, 7).unwrap();
        assert_eq!(tree.search_ids(&[4., 6.], &[0., 0.]).unwrap(), vec![0]);

        let mut tree_3d = RPlusTree::<f64, u8>::new_with_dims(4, 2, 3).unwrap();
        assert!(tree_3d.insert_rect(&rect, 7).is_err());
    }

    #[test]
    fn touching_siblings_both_receive_the_rectangle() {
        let mut tree = RPlusTree::<f64, u32>::new(4, 2).unwrap();
        // [0, 5] x [0, 1]
        let a = leaf_of(&mut tree, &[([0., 0.], [0., 0.]), ([5., 1.], [0., 0.])]);
        // [5, 10] x [0, 0]
        let b = leaf_of(&mut tree, &[([5., 0.], [0., 0.]), ([10., 0.], [0., 0.])]);
        tree.root = internal_of(&mut tree, vec![a, b]);
        check_invariants(&tree);

        // contained by b, touching a
        let item = tree.insert(&[5., 0.], &[1., 0.], 4).unwrap();
        check_invariants(&tree);
        assert_eq!(copies(&tree, item), 2);
        assert_eq!(tree.search_ids(&[5.5, 0.], &[0., 0.]).unwrap(), vec![item]);
    }

    #[test]
    fn rectangle_covered_by_several_siblings_is_stored_once() {
        let mut tree = RPlusTree::<f64, u32>::new(4, 2).unwrap();
        let a = leaf_of(&mut tree, &[([0., 0.], [10., 10.])]);
        let b = leaf_of(&mut tree, &[([0., 0.], [10., 10.])]);
        let c = leaf_of(&mut tree, &[([20., 0.], [1., 1.])]);
        tree.root = internal_of(&mut tree, vec![a, b, c]);

        let item = tree.insert(&[2., 2.], &[1., 1.], 3).unwrap();
        check_invariants(&tree);
        assert_eq!(copies(&tree, item), 1);
        assert_eq!(tree.node(a).children.len(), 2);
    }
}
