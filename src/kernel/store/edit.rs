use crate::kernel::action::FormChange;
use crate::kernel::error::{EditorError, EditorErrorKind};
use crate::kernel::state::{EditorPhase, PendingFetch};
use crate::kernel::Effect;

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_form_changed(&mut self, change: FormChange) -> DispatchResult {
        let node = change.node;
        match self.state.phase {
            EditorPhase::Bound { node: bound } if bound == node => {}
            EditorPhase::Error { node: locked, .. } if locked == node => {
                tracing::debug!(?node, "form is locked after an error; change ignored");
                return DispatchResult::unchanged();
            }
            _ => {
                tracing::debug!(?node, "form change for a node that is not bound");
                return DispatchResult::unchanged();
            }
        }

        if !change.committed {
            let Some(detail) = self.state.detail.as_mut() else {
                return DispatchResult::unchanged();
            };
            let changed = detail.issues != change.issues;
            detail.issues = change.issues;
            return DispatchResult::changed(changed);
        }

        if self.state.is_busy(node) {
            return self.reject_busy(node);
        }

        let Some(info) = self.state.tree.info(node) else {
            self.clear_selection();
            return self.fail(EditorError::NodeUnavailable {
                node,
                reason: "node is not part of the tree".to_string(),
            });
        };

        self.state.phase = EditorPhase::Editing { node };
        let data = self
            .collaborators
            .mutator
            .handle_form_update(&info, change.data);

        match self.collaborators.model.update_data(&info, data.clone()) {
            Ok(()) => {
                self.state.phase = EditorPhase::Bound { node };
                if let Some(detail) = self.state.detail.as_mut() {
                    detail.data = data;
                    detail.issues = change.issues;
                }
                self.state.tree.mark_dirty(node);
                self.state.edit_generation += 1;
                self.state.node_errors.remove(&node);
                DispatchResult::changed(true)
            }
            Err(err) => {
                self.state.phase = EditorPhase::Error {
                    node,
                    kind: EditorErrorKind::ModelUpdate,
                };
                let mut result = self.fail(EditorError::update_failed(node, err));

                if self.state.config.refetch_on_update_error {
                    let request_id = self.state.next_request_id();
                    self.state.pending_fetch = Some(PendingFetch { request_id, node });
                    result.effects.push(Effect::FetchDetail {
                        request_id,
                        node: info,
                    });
                }
                result
            }
        }
    }
}
