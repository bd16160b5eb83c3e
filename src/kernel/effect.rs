use serde_json::Value;

use crate::kernel::services::ports::DocumentRef;
use crate::models::NodeInfo;

/// Collaborator calls requested by the store; each one reports back as an `Action`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchDetail { request_id: u64, node: NodeInfo },
    LoadChildren { node: NodeInfo },
    AddNode { parent: NodeInfo, fragment: Value },
    DeleteNode { node: NodeInfo },
    Commit { document: DocumentRef },
}
