use crate::kernel::error::EditorError;
use crate::kernel::Effect;

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_save(&mut self) -> DispatchResult {
        if self.state.save_in_flight.is_some() {
            let root = self.state.tree.root();
            return self.reject_busy(root);
        }
        if !self.state.tree.is_dirty() {
            tracing::debug!("save requested with no unsaved changes");
            return DispatchResult::unchanged();
        }

        self.state.save_in_flight = Some(self.state.edit_generation);
        DispatchResult {
            effects: vec![Effect::Commit {
                document: self.state.document.clone(),
            }],
            state_changed: true,
            error: None,
        }
    }

    pub(super) fn reduce_save_completed(
        &mut self,
        result: Result<(), EditorError>,
    ) -> DispatchResult {
        let Some(started_at) = self.state.save_in_flight.take() else {
            // A reload dropped the pending commit; a failure still reaches the user.
            return match result {
                Ok(()) => {
                    tracing::debug!("save completion without a pending commit");
                    DispatchResult::unchanged()
                }
                Err(err) => self.fail(err),
            };
        };

        match result {
            Ok(()) => {
                if self.state.edit_generation == started_at {
                    self.state.tree.clear_all();
                    tracing::info!(document = %self.state.document, "document saved");
                } else {
                    tracing::info!(
                        document = %self.state.document,
                        "edits landed during commit; dirty state kept for the next save"
                    );
                }
                DispatchResult::changed(true)
            }
            Err(err) => self.fail(err),
        }
    }
}
