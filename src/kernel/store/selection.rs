use crate::kernel::error::{EditorError, EditorErrorKind};
use crate::kernel::services::ports::DetailTriple;
use crate::kernel::state::{DetailState, EditorPhase, PendingFetch};
use crate::kernel::Effect;
use crate::models::NodeId;

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_select(&mut self, target: Option<NodeId>) -> DispatchResult {
        let Some(node) = target else {
            return DispatchResult::changed(self.clear_selection());
        };

        match self.state.phase {
            EditorPhase::Bound { node: bound } | EditorPhase::Loading { node: bound }
                if bound == node =>
            {
                return DispatchResult::unchanged();
            }
            _ => {}
        }

        self.state.detail = None;
        self.state.pending_fetch = None;

        let Some(info) = self.state.tree.info(node) else {
            self.state.phase = EditorPhase::Error {
                node,
                kind: EditorErrorKind::NodeUnavailable,
            };
            return self.fail(EditorError::NodeUnavailable {
                node,
                reason: "node is not part of the tree".to_string(),
            });
        };

        let request_id = self.state.next_request_id();
        self.state.pending_fetch = Some(PendingFetch { request_id, node });
        self.state.phase = EditorPhase::Loading { node };
        tracing::debug!(?node, request_id, "selection changed");

        DispatchResult {
            effects: vec![Effect::FetchDetail {
                request_id,
                node: info,
            }],
            state_changed: true,
            error: None,
        }
    }

    pub(super) fn reduce_detail_fetched(
        &mut self,
        request_id: u64,
        node: NodeId,
        result: Result<DetailTriple, EditorError>,
    ) -> DispatchResult {
        let active = self
            .state
            .pending_fetch
            .is_some_and(|p| p.request_id == request_id && p.node == node);
        if !active {
            tracing::debug!(?node, request_id, "discarding stale detail");
            return DispatchResult::unchanged();
        }
        self.state.pending_fetch = None;

        // A fetch issued after a rejected write-back refreshes the form but keeps it
        // locked.
        let refresh = matches!(self.state.phase, EditorPhase::Error { node: n, .. } if n == node);

        match result {
            Ok(triple) => {
                self.state.detail = Some(DetailState::from_triple(node, triple));
                if !refresh {
                    self.state.phase = EditorPhase::Bound { node };
                    self.state.node_errors.remove(&node);
                }
                DispatchResult::changed(true)
            }
            Err(err) if refresh => {
                tracing::warn!(?node, error = %err, "refresh after failed update did not complete");
                DispatchResult::unchanged()
            }
            Err(err) => {
                self.state.detail = None;
                self.state.phase = EditorPhase::Error {
                    node,
                    kind: EditorErrorKind::NodeUnavailable,
                };
                self.fail(err)
            }
        }
    }

    /// Back to `Idle`; any in-flight fetch result is dropped on arrival.
    pub(super) fn clear_selection(&mut self) -> bool {
        let changed = self.state.phase != EditorPhase::Idle || self.state.detail.is_some();
        self.state.phase = EditorPhase::Idle;
        self.state.detail = None;
        self.state.pending_fetch = None;
        changed
    }
}
