use std::collections::HashSet;

use crate::r#type::IndexableNum;
use crate::rplus::bbox::Bbox;
use crate::rplus::node::NodeKind;
use crate::rplus::RPlusTree;

/// Walk the whole tree and assert the structural invariants:
///
/// - every node's MBR is exactly the bounding box of its children, and contains each of them
/// - parent handles point at the owning node
/// - no node has more than `max_entries` children and no non-root node is empty
/// - leaves hold only entries and internal nodes hold no entries
/// - all entries sit at the same depth
/// - every inserted item is stored at least once
pub(crate) fn check_invariants<N: IndexableNum, T>(tree: &RPlusTree<N, T>) {
    let max_entries = tree.max_entries();
    let num_dims = tree.num_dims();

    assert_eq!(tree.node(tree.root).parent, None, "root has a parent");

    let mut entry_depths = HashSet::new();
    let mut stored_items = HashSet::new();
    let mut stack = vec![(tree.root, 0usize)];

    while let Some((id, depth)) = stack.pop() {
        let node = tree.node(id);

        if let NodeKind::Entry(item) = node.kind {
            assert!(node.children.is_empty(), "entry with children");
            assert!(!node.bbox.is_empty(), "entry without a rectangle");
            entry_depths.insert(depth);
            stored_items.insert(item);
            continue;
        }

        assert!(
            node.children.len() <= max_entries,
            "node has {} children, max is {}",
            node.children.len(),
            max_entries
        );
        if id != tree.root {
            assert!(!node.children.is_empty(), "non-root node without children");
        }

        let union = Bbox::union_of(
            num_dims,
            node.children.iter().map(|&child| &tree.node(child).bbox),
        );
        assert_eq!(node.bbox, union, "node MBR is not tight");

        for &child in node.children.iter() {
            let child_data = tree.node(child);
            assert_eq!(child_data.parent, Some(id), "stale parent handle");
            assert!(node.bbox.contains(&child_data.bbox), "child escapes its parent");
            let child_is_entry = matches!(child_data.kind, NodeKind::Entry(_));
            match node.kind {
                NodeKind::Leaf => assert!(child_is_entry, "leaf holds a node"),
                _ => assert!(!child_is_entry, "internal node holds an entry"),
            }
            stack.push((child, depth + 1));
        }
    }

    assert!(
        entry_depths.len() <= 1,
        "entries at several depths: {:?}",
        entry_depths
    );
    assert_eq!(stored_items.len(), tree.size(), "an inserted item is missing");
}

/// Snapshot of every node's MBR, for comparing before and after an operation.
pub(crate) fn mbrs<N: IndexableNum, T>(tree: &RPlusTree<N, T>) -> Vec<Bbox<N>> {
    tree.nodes.iter().map(|node| node.bbox.clone()).collect()
}
