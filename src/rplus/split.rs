//! Overflow splitting.
//!
//! An overflowing node is divided along a single cut line. Children entirely on one side move to
//! the matching half; children crossing the line are partitioned into two clipped clones, one per
//! half, recursing into their subtrees until entries are reached. The two halves therefore never
//! overlap along the split axis.

use std::cmp::Ordering;

use log::debug;

use crate::r#type::IndexableNum;
use crate::rplus::bbox::Bbox;
use crate::rplus::index::RPlusTree;
use crate::rplus::node::{NodeData, NodeId, NodeKind};

/// A split axis and the coordinate on that axis separating the two halves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cut<N: IndexableNum> {
    pub(crate) axis: usize,
    pub(crate) line: N,
}

/// Where a box falls relative to a cut line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
    Straddle,
}

/// Classify a box against a cut line.
///
/// A box ending on the line belongs to the left side, and a box starting on the line belongs to
/// the right side.
pub(crate) fn need_cut<N: IndexableNum>(bbox: &Bbox<N>, cut: Cut<N>) -> Side {
    let lower = bbox.min(cut.axis);
    let upper = bbox.max(cut.axis);
    if lower < cut.line && upper <= cut.line {
        Side::Left
    } else if lower >= cut.line {
        Side::Right
    } else {
        Side::Straddle
    }
}

fn sorted_bounds<N: IndexableNum>(boxes: &[&Bbox<N>], axis: usize) -> (Vec<N>, Vec<N>) {
    let mut lowers: Vec<N> = boxes.iter().map(|bbox| bbox.min(axis)).collect();
    let mut uppers: Vec<N> = boxes.iter().map(|bbox| bbox.max(axis)).collect();
    lowers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    uppers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    (lowers, uppers)
}

/// Propose a cut line on `axis`, or `None` if the boxes cannot be separated on it.
///
/// The boxes cannot be separated when all of their lower bounds, or all of their upper bounds,
/// coincide. Otherwise the line is the median lower bound, advanced to the next distinct lower
/// bound if it equals the smallest one, so the left side is never empty.
pub(crate) fn sweep<N: IndexableNum>(boxes: &[&Bbox<N>], axis: usize) -> Option<N> {
    let n = boxes.len();
    if n == 0 {
        return None;
    }

    let (lowers, uppers) = sorted_bounds(boxes, axis);
    if lowers[0] == lowers[n - 1] || uppers[0] == uppers[n - 1] {
        return None;
    }

    let median = lowers[n / 2];
    if median != lowers[0] {
        return Some(median);
    }
    // A distinct value exists since not all lower bounds are equal
    lowers[n / 2 + 1..]
        .iter()
        .copied()
        .find(|&lower| lower != median)
}

/// Number of boxes strictly crossing `line` on `axis`.
fn count_crossing<N: IndexableNum>(boxes: &[&Bbox<N>], axis: usize, line: N) -> usize {
    boxes
        .iter()
        .filter(|bbox| bbox.min(axis) < line && bbox.max(axis) > line)
        .count()
}

/// Choose the split axis and cut line for a set of children.
///
/// Only axes 0 and 1 are ever considered. When both are usable, the axis whose line crosses
/// strictly fewer children wins, with ties going to axis 1. When neither is usable, the median
/// lower bound on axis 0 is used.
pub(crate) fn evaluate<N: IndexableNum>(boxes: &[&Bbox<N>]) -> Cut<N> {
    let num_dims = boxes.first().map_or(0, |bbox| bbox.num_dims());

    let cut_x = sweep(boxes, 0);
    let cut_y = if num_dims > 1 { sweep(boxes, 1) } else { None };

    match (cut_x, cut_y) {
        (Some(x), Some(y)) => {
            if count_crossing(boxes, 0, x) < count_crossing(boxes, 1, y) {
                Cut { axis: 0, line: x }
            } else {
                Cut { axis: 1, line: y }
            }
        }
        (Some(x), None) => Cut { axis: 0, line: x },
        (None, Some(y)) => Cut { axis: 1, line: y },
        (None, None) => {
            let (lowers, _) = sorted_bounds(boxes, 0);
            let line = lowers.get(lowers.len() / 2).copied().unwrap_or_else(N::zero);
            Cut { axis: 0, line }
        }
    }
}

impl<N: IndexableNum, T> RPlusTree<N, T> {
    /// Split an overflowing node in two.
    ///
    /// The first returned node is `node` itself; the second is a new sibling of the same kind,
    /// already attached to `node`'s parent when there is one. Both are tightened.
    pub(crate) fn split_node(&mut self, node: NodeId) -> (NodeId, NodeId) {
        let children = std::mem::take(&mut self.node_mut(node).children);
        let num_children = children.len();
        debug_assert!(num_children >= 2, "split of a node with {num_children} children");

        let cut = {
            let boxes: Vec<&Bbox<N>> = children.iter().map(|&c| &self.node(c).bbox).collect();
            evaluate(&boxes)
        };

        let (kind, parent, bbox) = {
            let data = self.node(node);
            (data.kind, data.parent, data.bbox.clone())
        };
        let sibling = self.alloc(NodeData::new(bbox, kind, parent));
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(sibling);
        }

        let sides: Vec<Side> = children
            .iter()
            .map(|&c| need_cut(&self.node(c).bbox, cut))
            .collect();
        let left_count = sides.iter().filter(|&&side| side != Side::Right).count();
        let right_count = sides.iter().filter(|&&side| side != Side::Left).count();

        let (left, right) = if self.is_balanced_split(left_count, right_count) {
            let mut left = Vec::with_capacity(left_count);
            let mut right = Vec::with_capacity(right_count);
            for (child, side) in children.into_iter().zip(sides) {
                match side {
                    Side::Left => left.push(child),
                    Side::Right => right.push(child),
                    Side::Straddle => {
                        let (l, r) = self.partition(child, cut);
                        left.push(l);
                        right.push(r);
                    }
                }
            }
            (left, right)
        } else {
            debug!(
                "cut on axis {} at {:?} gives halves of {} and {} children, dividing in order instead",
                cut.axis, cut.line, left_count, right_count
            );
            self.divide_in_order(children, cut.axis)
        };

        debug!(
            "split {} children on axis {} at {:?} into {} and {}",
            num_children,
            cut.axis,
            cut.line,
            left.len(),
            right.len()
        );

        self.node_mut(node).children = left;
        self.node_mut(sibling).children = right;
        self.tighten(node);
        self.tighten(sibling);
        (node, sibling)
    }

    /// Both halves must respect the fan-out bounds for a cut to be used.
    fn is_balanced_split(&self, left_count: usize, right_count: usize) -> bool {
        let min_fill = self.metadata.min_entries().max(1);
        let max_fill = self.metadata.max_entries();
        (min_fill..=max_fill).contains(&left_count) && (min_fill..=max_fill).contains(&right_count)
    }

    /// Fallback for children that no cut line separates, such as many identical rectangles:
    /// sort by lower bound on `axis` and give each half one side of the list. The halves may
    /// overlap.
    fn divide_in_order(&self, mut children: Vec<NodeId>, axis: usize) -> (Vec<NodeId>, Vec<NodeId>) {
        children.sort_by(|&a, &b| {
            let (a, b) = (&self.node(a).bbox, &self.node(b).bbox);
            a.min(axis)
                .partial_cmp(&b.min(axis))
                .unwrap_or(Ordering::Equal)
                .then(a.max(axis).partial_cmp(&b.max(axis)).unwrap_or(Ordering::Equal))
        });
        let right = children.split_off(children.len() / 2);
        (children, right)
    }

    /// Cut a node crossing the line into two clones confined to either side of it.
    ///
    /// `node` keeps its identity as the left clone. Entries are clipped and both clones refer to
    /// the same item. Other nodes distribute their children the same way `split_node` does,
    /// partitioning any child that crosses the line in turn, and both clones are tightened.
    pub(crate) fn partition(&mut self, node: NodeId, cut: Cut<N>) -> (NodeId, NodeId) {
        let (left_bbox, right_bbox) = self.node(node).bbox.split_at(cut.axis, cut.line);
        let kind = self.node(node).kind;

        self.node_mut(node).bbox = left_bbox;
        let right = self.alloc(NodeData::new(right_bbox, kind, None));

        if let NodeKind::Entry(_) = kind {
            return (node, right);
        }

        let children = std::mem::take(&mut self.node_mut(node).children);
        let mut left_children = Vec::with_capacity(children.len());
        let mut right_children = Vec::with_capacity(children.len());
        for child in children {
            match need_cut(&self.node(child).bbox, cut) {
                Side::Left => left_children.push(child),
                Side::Right => right_children.push(child),
                Side::Straddle => {
                    let (l, r) = self.partition(child, cut);
                    left_children.push(l);
                    right_children.push(r);
                }
            }
        }

        self.node_mut(node).children = left_children;
        self.node_mut(right).children = right_children;
        self.tighten(node);
        self.tighten(right);
        (node, right)
    }
}
