mod invariants;

pub(crate) use invariants::check_invariants;

use crate::rplus::bbox::Bbox;
use crate::rplus::node::{NodeData, NodeId, NodeKind};
use crate::rplus::RPlusTree;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Allocate a detached leaf holding one entry per rectangle. Each payload is its own insertion
/// index.
pub(crate) fn leaf_of(tree: &mut RPlusTree<f64, u32>, rects: &[([f64; 2], [f64; 2])]) -> NodeId {
    let num_dims = tree.num_dims();
    let leaf = tree.alloc(NodeData::new(Bbox::empty(num_dims), NodeKind::Leaf, None));
    for (lower, extent) in rects {
        let item = tree.items.len() as u32;
        tree.items.push(item);
        let entry = tree.alloc(NodeData::new(
            Bbox::new(lower, extent),
            NodeKind::Entry(item),
            Some(leaf),
        ));
        tree.node_mut(leaf).children.push(entry);
    }
    tree.tighten(leaf);
    leaf
}

/// Allocate a detached internal node owning `children`.
pub(crate) fn internal_of(tree: &mut RPlusTree<f64, u32>, children: Vec<NodeId>) -> NodeId {
    let num_dims = tree.num_dims();
    let node = tree.alloc(NodeData::new(Bbox::empty(num_dims), NodeKind::Internal, None));
    tree.node_mut(node).children = children;
    tree.tighten(node);
    node
}
