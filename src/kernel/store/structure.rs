use serde_json::Value;

use crate::kernel::action::AddedNode;
use crate::kernel::error::EditorError;
use crate::kernel::state::PendingOp;
use crate::kernel::Effect;
use crate::models::{LoadState, NodeDraft, NodeId, NodeTreeError};

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_expand(&mut self, node: NodeId) -> DispatchResult {
        let Some(load_state) = self.state.tree.load_state(node) else {
            return DispatchResult::unchanged();
        };

        match load_state {
            LoadState::Loaded | LoadState::Loading => {
                let changed = !self.state.tree.is_expanded(node);
                self.state.tree.expand(node);
                DispatchResult::changed(changed)
            }
            LoadState::NotLoaded => {
                if self.state.is_busy(node) {
                    return self.reject_busy(node);
                }
                let Some(info) = self.state.tree.info(node) else {
                    return DispatchResult::unchanged();
                };
                self.state.in_flight.insert(node, PendingOp::LoadChildren);
                self.state.tree.set_load_state(node, LoadState::Loading);
                self.state.tree.expand(node);
                DispatchResult {
                    effects: vec![Effect::LoadChildren { node: info }],
                    state_changed: true,
                    error: None,
                }
            }
        }
    }

    pub(super) fn reduce_collapse(&mut self, node: NodeId) -> DispatchResult {
        let changed = self.state.tree.is_expanded(node);
        self.state.tree.collapse(node);
        DispatchResult::changed(changed)
    }

    pub(super) fn reduce_children_loaded(
        &mut self,
        node: NodeId,
        result: Result<Vec<NodeDraft>, EditorError>,
    ) -> DispatchResult {
        if self.state.in_flight.get(&node) != Some(&PendingOp::LoadChildren) {
            tracing::debug!(?node, "discarding children for a node no longer loading");
            return DispatchResult::unchanged();
        }
        self.state.in_flight.remove(&node);

        match result {
            Ok(drafts) => match self.state.tree.fill_children(node, drafts) {
                Ok(skipped) => {
                    for data_ref in skipped {
                        tracing::warn!(?node, %data_ref, "child already bound elsewhere; skipped");
                    }
                    DispatchResult::changed(true)
                }
                Err(e) => self.fail(e.into()),
            },
            Err(err) => {
                self.state.tree.set_load_state(node, LoadState::NotLoaded);
                self.state.tree.collapse(node);
                self.fail(err)
            }
        }
    }

    pub(super) fn reduce_add_node(&mut self, parent: NodeId, fragment: Value) -> DispatchResult {
        let Some(info) = self.state.tree.info(parent) else {
            return self.fail(EditorError::NodeUnavailable {
                node: parent,
                reason: "parent is not part of the tree".to_string(),
            });
        };
        if self.state.is_busy(parent) || self.state.siblings_reordering(parent, PendingOp::Add) {
            return self.reject_busy(parent);
        }

        self.state.in_flight.insert(parent, PendingOp::Add);
        DispatchResult {
            effects: vec![Effect::AddNode {
                parent: info,
                fragment,
            }],
            state_changed: true,
            error: None,
        }
    }

    pub(super) fn reduce_node_added(
        &mut self,
        parent: NodeId,
        result: Result<AddedNode, EditorError>,
    ) -> DispatchResult {
        if self.state.in_flight.get(&parent) != Some(&PendingOp::Add) {
            tracing::warn!(?parent, "add completed for a parent with no pending add");
            return DispatchResult::unchanged();
        }
        self.state.in_flight.remove(&parent);

        let added = match result {
            Ok(added) => added,
            Err(err) => return self.fail(err),
        };

        if self.state.tree.load_state(parent) != Some(LoadState::Loaded) {
            // Not projected yet; the new fragment shows up on expansion.
            self.state.tree.mark_dirty(parent);
            self.state.edit_generation += 1;
            return DispatchResult::changed(true);
        }

        let child = match self
            .state
            .tree
            .insert_child(parent, Some(added.index), added.draft)
        {
            Ok(child) => child,
            Err(e) => {
                self.state.tree.mark_dirty(parent);
                self.state.edit_generation += 1;
                return self.fail(e.into());
            }
        };
        self.state.tree.mark_dirty(child);
        self.state.edit_generation += 1;
        tracing::debug!(?parent, ?child, index = added.index, "node added");

        if self.state.config.select_added_node {
            let mut result = self.reduce_select(Some(child));
            result.state_changed = true;
            return result;
        }
        DispatchResult::changed(true)
    }

    pub(super) fn reduce_delete_node(&mut self, node: NodeId) -> DispatchResult {
        if node == self.state.tree.root() {
            return self.fail(NodeTreeError::RootRemoval.into());
        }
        let Some(info) = self.state.tree.info(node) else {
            return self.fail(EditorError::NodeUnavailable {
                node,
                reason: "node is not part of the tree".to_string(),
            });
        };
        let parent_adding = info
            .parent
            .is_some_and(|parent| self.state.siblings_reordering(parent, PendingOp::Delete));
        if parent_adding || self.state.subtree_busy(node) {
            return self.reject_busy(node);
        }

        self.state.in_flight.insert(node, PendingOp::Delete);
        DispatchResult {
            effects: vec![Effect::DeleteNode { node: info }],
            state_changed: true,
            error: None,
        }
    }

    pub(super) fn reduce_node_deleted(
        &mut self,
        node: NodeId,
        result: Result<(), EditorError>,
    ) -> DispatchResult {
        if self.state.in_flight.get(&node) != Some(&PendingOp::Delete) {
            tracing::warn!(?node, "delete completed for a node with no pending delete");
            return DispatchResult::unchanged();
        }
        self.state.in_flight.remove(&node);

        if let Err(err) = result {
            return self.fail(err);
        }

        let Some(parent) = self.state.tree.parent(node) else {
            return DispatchResult::unchanged();
        };
        let removed = match self.state.tree.remove_subtree(node) {
            Ok(removed) => removed,
            Err(e) => return self.fail(e.into()),
        };

        for id in &removed {
            self.state.node_errors.remove(id);
            self.state.in_flight.remove(id);
        }
        if self
            .state
            .pending_fetch
            .is_some_and(|p| removed.contains(&p.node))
        {
            self.state.pending_fetch = None;
        }
        if self
            .state
            .selected()
            .is_some_and(|selected| removed.contains(&selected))
        {
            self.clear_selection();
        }

        self.state.tree.mark_dirty(parent);
        self.state.edit_generation += 1;
        tracing::debug!(?node, removed = removed.len(), "node deleted");
        DispatchResult::changed(true)
    }

    pub(super) fn reduce_document_reloaded(&mut self, root: NodeDraft) -> DispatchResult {
        self.state.tree.reset(root);
        self.clear_selection();
        self.state.in_flight.clear();
        self.state.node_errors.clear();
        self.state.save_in_flight = None;
        self.state.edit_generation += 1;
        tracing::info!(document = %self.state.document, "document reloaded");

        let root = self.state.tree.root();
        if self.state.config.eager_root_children
            && self.state.tree.load_state(root) == Some(LoadState::NotLoaded)
        {
            return self.reduce_expand(root);
        }
        DispatchResult::changed(true)
    }
}
