//! Canonical model representation.
//!
//! A trained ensemble is a [`Forest`] of regression [`Tree`]s plus a scalar
//! base score. The representation is independent of how training was done and
//! is what gets serialized into artifacts.

mod forest;
mod tree;

pub use forest::Forest;
pub use tree::{Node, Tree};
