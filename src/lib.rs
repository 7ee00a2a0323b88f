#![doc = include_str!("../README.md")]

mod error;
pub mod rplus;
mod r#type;

pub use error::{RPlusTreeError, Result};
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
