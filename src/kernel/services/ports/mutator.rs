//! Structural document hooks supplied per concrete editor.

use serde_json::Value;
use std::fmt;

use crate::models::{DataRef, NodeInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    InvalidFragment(String),
    Stale(String),
    Rejected(String),
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::InvalidFragment(msg) => write!(f, "invalid fragment: {}", msg),
            MutationError::Stale(what) => write!(f, "stale document reference: {}", what),
            MutationError::Rejected(msg) => write!(f, "mutation rejected: {}", msg),
        }
    }
}

impl std::error::Error for MutationError {}

/// Where a freshly inserted fragment landed.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedFragment {
    pub data_ref: DataRef,
    /// Position among the parent's children in document order.
    pub index: usize,
    pub fragment: Value,
}

pub trait DocumentMutator: Send + Sync {
    fn add_node(&self, parent: &NodeInfo, fragment: Value)
        -> Result<AddedFragment, MutationError>;

    fn delete_node(&self, node: &NodeInfo) -> Result<(), MutationError>;

    /// Last chance to reshape committed form data before it is written back.
    fn handle_form_update(&self, _node: &NodeInfo, data: Value) -> Value {
        data
    }
}
