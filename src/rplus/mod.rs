//! An implementation of a dynamic R+-tree.

pub(crate) mod bbox;
mod index;
mod insert;
pub(crate) mod node;
mod search;
mod split;
pub mod traversal;

pub use bbox::{area, overlaps, required_expansion};
pub use index::{
    RPlusTree, TreeMetadata, DEFAULT_MAX_ENTRIES, DEFAULT_MIN_ENTRIES, DEFAULT_NUM_DIMS,
};
pub use traversal::Node;
