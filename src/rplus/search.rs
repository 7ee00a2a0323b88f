use std::collections::HashSet;

use geo_traits::{CoordTrait, RectTrait};
use tinyvec::TinyVec;

use crate::error::Result;
use crate::r#type::IndexableNum;
use crate::rplus::bbox::Bbox;
use crate::rplus::index::RPlusTree;
use crate::rplus::node::{NodeId, NodeKind};
use crate::rplus::traversal::Node;

impl<N: IndexableNum, T> RPlusTree<N, T> {
    /// Search the tree for payloads whose rectangles overlap the given rectangle.
    ///
    /// Each payload is returned at most once, even when splitting stored its rectangle in several
    /// leaves. Results are in no particular order.
    pub fn search(&self, lower: &[N], extent: &[N]) -> Result<Vec<&T>> {
        let ids = self.search_ids(lower, extent)?;
        Ok(ids
            .into_iter()
            .map(|index| &self.items[index as usize])
            .collect())
    }

    /// Search the tree given the provided rectangle.
    ///
    /// Results are the insertion indexes of the matching payloads, without duplicates.
    pub fn search_ids(&self, lower: &[N], extent: &[N]) -> Result<Vec<u32>> {
        self.metadata.check_rect(lower, extent)?;
        let query = Bbox::new(lower, extent);

        let mut results = vec![];
        let mut seen = HashSet::new();

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[NodeId; 32]> = TinyVec::new();
        stack.push(self.root);

        while let Some(id) = stack.pop() {
            for &child_id in self.node(id).children.iter() {
                let child = self.node(child_id);
                if !child.bbox.overlaps(&query) {
                    continue;
                }
                match child.kind {
                    NodeKind::Entry(item) => {
                        if seen.insert(item) {
                            results.push(item);
                        }
                    }
                    _ => stack.push(child_id),
                }
            }
        }

        Ok(results)
    }

    /// Search the tree given a two-dimensional rectangle.
    pub fn search_rect(&self, rect: &impl RectTrait<T = N>) -> Result<Vec<&T>> {
        let (min, max) = (rect.min(), rect.max());
        self.search(
            &[min.x(), min.y()],
            &[max.x() - min.x(), max.y() - min.y()],
        )
    }

    /// Every entry stored in the tree, visited leaf by leaf.
    ///
    /// A payload whose rectangle was cut by a split appears once per piece.
    pub fn leaves(&self) -> Vec<Node<'_, N, T>> {
        let mut results = vec![];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.is_leaf() {
                results.extend(node.children.iter().map(|&child| Node::new(self, child)));
            } else {
                // reversed so leaves come out in child order
                stack.extend(node.children.iter().rev());
            }
        }
        results
    }
}
