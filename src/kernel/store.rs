use serde_json::Value;

use super::error::EditorError;
use super::services::ports::{AddNodeCommand, DocumentRef, SessionConfig};
use super::services::Collaborators;
use super::state::{DetailState, EditorPhase, EditorRow, Notification, SessionState};
use super::{Action, Effect};
use crate::models::{DataRef, NodeId, NodeTree};

mod edit;
mod save;
mod selection;
mod structure;

#[derive(Debug, Default)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
    /// Set when the action was rejected or a collaborator failure was surfaced.
    pub error: Option<EditorError>,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
            error: None,
        }
    }
}

/// The controller: a single-consumer state machine over one editor session.
pub struct Store {
    state: SessionState,
    collaborators: Collaborators,
}

impl Store {
    pub fn new(state: SessionState, collaborators: Collaborators) -> Self {
        Self {
            state,
            collaborators,
        }
    }

    /// Builds the tree from the document's root fragment.
    pub fn open(
        collaborators: Collaborators,
        document: DocumentRef,
        root_fragment: &Value,
        root_ref: DataRef,
        config: SessionConfig,
    ) -> Result<Self, EditorError> {
        let draft = collaborators
            .factory
            .create_node(root_fragment, root_ref, None)
            .map_err(|e| EditorError::invalid_fragment(None, e))?;
        let mut tree = NodeTree::new(draft);

        if config.eager_root_children {
            let root = tree.root();
            if let Some(info) = tree.info(root) {
                let drafts = collaborators
                    .factory
                    .create_children(&info)
                    .map_err(|e| EditorError::invalid_fragment(Some(root), e))?;
                for data_ref in tree.fill_children(root, drafts)? {
                    tracing::warn!(%data_ref, "duplicate data reference in root children");
                }
            }
        }

        tracing::info!(
            document = %document,
            nodes = tree.len(),
            "editor session opened"
        );
        Ok(Self::new(
            SessionState::new(document, tree, config),
            collaborators,
        ))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tree(&self) -> &NodeTree {
        &self.state.tree
    }

    pub fn phase(&self) -> EditorPhase {
        self.state.phase
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.state.selected()
    }

    pub fn detail(&self) -> Option<&DetailState> {
        self.state.detail.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.tree.is_dirty()
    }

    pub fn rows(&self) -> Vec<EditorRow> {
        self.state.rows()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.state.notifications.drain(..).collect()
    }

    pub fn add_commands(&self, node: NodeId) -> Vec<AddNodeCommand> {
        self.state
            .tree
            .info(node)
            .map(|info| self.collaborators.factory.add_commands(&info))
            .unwrap_or_default()
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::Select(target) => self.reduce_select(target),
            Action::DetailFetched {
                request_id,
                node,
                result,
            } => self.reduce_detail_fetched(request_id, node, result),
            Action::FormChanged(change) => self.reduce_form_changed(change),
            Action::Expand(node) => self.reduce_expand(node),
            Action::Collapse(node) => self.reduce_collapse(node),
            Action::ChildrenLoaded { node, result } => self.reduce_children_loaded(node, result),
            Action::AddNode { parent, fragment } => self.reduce_add_node(parent, fragment),
            Action::NodeAdded { parent, result } => self.reduce_node_added(parent, result),
            Action::DeleteNode(node) => self.reduce_delete_node(node),
            Action::NodeDeleted { node, result } => self.reduce_node_deleted(node, result),
            Action::Save => self.reduce_save(),
            Action::SaveCompleted { result } => self.reduce_save_completed(result),
            Action::DocumentReloaded { root } => self.reduce_document_reloaded(root),
        }
    }

    /// Surfaces an error: log, notification, and the per-node tree marker.
    fn fail(&mut self, err: EditorError) -> DispatchResult {
        tracing::warn!(kind = ?err.kind(), node = ?err.node(), error = %err, "editor error");
        self.state.push_notification(&err);
        if let Some(node) = err.node() {
            if self.state.tree.contains(node) && is_node_affordance(&err) {
                self.state.node_errors.insert(node, err.kind());
            }
        }
        DispatchResult {
            effects: Vec::new(),
            state_changed: true,
            error: Some(err),
        }
    }

    fn reject_busy(&mut self, node: NodeId) -> DispatchResult {
        let mut result = self.fail(EditorError::OperationInProgress { node });
        result.state_changed = false;
        result
    }
}

fn is_node_affordance(err: &EditorError) -> bool {
    matches!(
        err,
        EditorError::ModelUpdate { .. }
            | EditorError::NodeUnavailable { .. }
            | EditorError::InvalidFragment { .. }
    )
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
