//! Node factory contract: projects document fragments into tree nodes.

use compact_str::CompactString;
use serde_json::Value;
use std::fmt;

use crate::models::{DataRef, NodeDraft, NodeInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFragmentError {
    pub reason: String,
}

impl InvalidFragmentError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InvalidFragmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fragment: {}", self.reason)
    }
}

impl std::error::Error for InvalidFragmentError {}

/// An "add child" entry a host can offer for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddNodeCommand {
    pub editor_id: CompactString,
    pub type_tag: CompactString,
    pub template: Value,
}

/// Read-side projection; implementations must not touch the document.
pub trait NodeFactory: Send + Sync {
    fn editor_id(&self) -> &str;

    fn create_node(
        &self,
        fragment: &Value,
        data_ref: DataRef,
        parent: Option<&NodeInfo>,
    ) -> Result<NodeDraft, InvalidFragmentError>;

    /// Called when the tree expands `node`.
    fn create_children(&self, node: &NodeInfo) -> Result<Vec<NodeDraft>, InvalidFragmentError>;

    fn add_commands(&self, _node: &NodeInfo) -> Vec<AddNodeCommand> {
        Vec::new()
    }
}
