//! Data model layer: the node arena and dirty tracking.

pub mod dirty;
pub mod node_tree;

pub use node_tree::{
    DataRef, LoadState, NodeDraft, NodeId, NodeInfo, NodeTree, NodeTreeError, TreeRow,
};
