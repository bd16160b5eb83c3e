use serde_json::Value;

use crate::kernel::error::EditorError;
use crate::kernel::services::Collaborators;
use crate::kernel::{Action, AddedNode, Effect};
use crate::models::{NodeId, NodeInfo};

/// Runs one effect against the collaborators and translates the outcome.
pub fn execute(collaborators: &Collaborators, effect: Effect) -> Action {
    match effect {
        Effect::FetchDetail { request_id, node } => Action::DetailFetched {
            request_id,
            node: node.id,
            result: collaborators
                .model
                .detail(&node)
                .map_err(|e| EditorError::unavailable(node.id, e)),
        },
        Effect::LoadChildren { node } => Action::ChildrenLoaded {
            node: node.id,
            result: collaborators
                .factory
                .create_children(&node)
                .map_err(|e| EditorError::invalid_fragment(Some(node.id), e)),
        },
        Effect::AddNode { parent, fragment } => Action::NodeAdded {
            parent: parent.id,
            result: add_node(collaborators, &parent, fragment),
        },
        Effect::DeleteNode { node } => Action::NodeDeleted {
            node: node.id,
            result: collaborators
                .mutator
                .delete_node(&node)
                .map_err(|e| EditorError::delete_failed(node.id, e)),
        },
        Effect::Commit { document } => Action::SaveCompleted {
            result: collaborators
                .committer
                .commit(&document)
                .map_err(EditorError::save_failed),
        },
    }
}

fn add_node(
    collaborators: &Collaborators,
    parent: &NodeInfo,
    fragment: Value,
) -> Result<AddedNode, EditorError> {
    let added = collaborators
        .mutator
        .add_node(parent, fragment)
        .map_err(|e| EditorError::add_failed(parent.id, e))?;

    match collaborators
        .factory
        .create_node(&added.fragment, added.data_ref, Some(parent))
    {
        Ok(draft) => Ok(AddedNode {
            draft,
            index: added.index,
        }),
        Err(e) => {
            // The tree never saw the fragment; take it back out of the document.
            let orphan = NodeInfo {
                id: NodeId::default(),
                parent: Some(parent.id),
                editor_id: collaborators.factory.editor_id().into(),
                type_tag: Default::default(),
                data_ref: added.data_ref,
            };
            if let Err(rollback) = collaborators.mutator.delete_node(&orphan) {
                tracing::error!(
                    data_ref = %added.data_ref,
                    error = %rollback,
                    "rollback of rejected fragment failed"
                );
            }
            Err(EditorError::invalid_fragment(Some(parent.id), e))
        }
    }
}

/// Completion reported when the effect task itself died.
pub fn failed_completion(effect: Effect, reason: String) -> Action {
    match effect {
        Effect::FetchDetail { request_id, node } => Action::DetailFetched {
            request_id,
            node: node.id,
            result: Err(EditorError::NodeUnavailable {
                node: node.id,
                reason,
            }),
        },
        Effect::LoadChildren { node } => Action::ChildrenLoaded {
            node: node.id,
            result: Err(EditorError::InvalidFragment {
                node: Some(node.id),
                reason,
            }),
        },
        Effect::AddNode { parent, .. } => Action::NodeAdded {
            parent: parent.id,
            result: Err(EditorError::InvalidFragment {
                node: Some(parent.id),
                reason,
            }),
        },
        Effect::DeleteNode { node } => Action::NodeDeleted {
            node: node.id,
            result: Err(EditorError::ModelUpdate {
                node: node.id,
                reason,
            }),
        },
        Effect::Commit { .. } => Action::SaveCompleted {
            result: Err(EditorError::SaveFailed { reason }),
        },
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/executor.rs"]
mod tests;
