use serde_json::Value;

use crate::kernel::error::EditorError;
use crate::kernel::services::ports::DetailTriple;
use crate::models::{NodeDraft, NodeId};

/// A renderer event. Only `committed` changes are written back; the others carry
/// validation issues for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FormChange {
    pub node: NodeId,
    pub data: Value,
    pub issues: Vec<String>,
    pub committed: bool,
}

impl FormChange {
    pub fn committed(node: NodeId, data: Value) -> Self {
        Self {
            node,
            data,
            issues: Vec::new(),
            committed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddedNode {
    pub draft: NodeDraft,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Select(Option<NodeId>),
    DetailFetched {
        request_id: u64,
        node: NodeId,
        result: Result<DetailTriple, EditorError>,
    },
    FormChanged(FormChange),
    Expand(NodeId),
    Collapse(NodeId),
    ChildrenLoaded {
        node: NodeId,
        result: Result<Vec<NodeDraft>, EditorError>,
    },
    AddNode {
        parent: NodeId,
        fragment: Value,
    },
    NodeAdded {
        parent: NodeId,
        result: Result<AddedNode, EditorError>,
    },
    DeleteNode(NodeId),
    NodeDeleted {
        node: NodeId,
        result: Result<(), EditorError>,
    },
    Save,
    SaveCompleted {
        result: Result<(), EditorError>,
    },
    DocumentReloaded {
        root: NodeDraft,
    },
}

impl Action {
    /// Completions answer an `Effect`; everything else originates from the host.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Action::DetailFetched { .. }
                | Action::ChildrenLoaded { .. }
                | Action::NodeAdded { .. }
                | Action::NodeDeleted { .. }
                | Action::SaveCompleted { .. }
        )
    }
}
