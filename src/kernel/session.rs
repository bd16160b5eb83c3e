//! One open editor: store + message queue + effect runner.
//!
//! Host events and effect completions share a single queue and are dispatched in
//! arrival order, so every reducer's bookkeeping lands before the next event runs.

use serde_json::Value;
use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use super::error::EditorError;
use super::services::adapters::runtime::EffectRunner;
use super::services::ports::{DocumentRef, SessionConfig};
use super::services::{kernel_bus, Collaborators, KernelBusReceiver, KernelBusSender, KernelMessage};
use super::{Action, DispatchResult, Store};
use crate::models::DataRef;

pub struct EditorSession {
    store: Store,
    runner: EffectRunner,
    collaborators: Collaborators,
    tx: KernelBusSender,
    rx: KernelBusReceiver,
    outstanding: usize,
}

impl EditorSession {
    pub fn open(
        handle: tokio::runtime::Handle,
        collaborators: Collaborators,
        document: DocumentRef,
        root_fragment: &Value,
        root_ref: DataRef,
        config: SessionConfig,
    ) -> Result<Self, EditorError> {
        let store = Store::open(
            collaborators.clone(),
            document,
            root_fragment,
            root_ref,
            config,
        )?;
        let (tx, rx) = kernel_bus();
        let runner = EffectRunner::new(handle, collaborators.clone(), tx.clone());
        Ok(Self {
            store,
            runner,
            collaborators,
            tx,
            rx,
            outstanding: 0,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Handle for hosts that post events from elsewhere (renderer callbacks etc.).
    pub fn sender(&self) -> KernelBusSender {
        self.tx.clone()
    }

    /// Number of effects whose completion has not been dispatched yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        if action.is_completion() {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
        let result = self.store.dispatch(action);
        for effect in result.effects.iter().cloned() {
            self.outstanding += 1;
            self.runner.run(effect);
        }
        result
    }

    /// Drains whatever is queued right now. Returns whether any state changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(KernelMessage::Action(action)) => changed |= self.dispatch(action).state_changed,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    /// Blocks until every outstanding effect has reported back, or `timeout`
    /// elapses. Returns `true` when the session went idle.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.outstanding > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(outstanding = self.outstanding, "session did not go idle in time");
                return false;
            }
            match self.rx.recv_timeout(remaining) {
                Ok(KernelMessage::Action(action)) => {
                    self.dispatch(action);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        self.pump();
        true
    }

    /// Saves and waits for the commit. Fails unless the store ends up clean
    /// within `timeout`.
    pub fn save_and_wait(&mut self, timeout: Duration) -> Result<(), EditorError> {
        if let Some(err) = self.dispatch(Action::Save).error {
            return Err(err);
        }
        if !self.run_until_idle(timeout) {
            return Err(EditorError::SaveFailed {
                reason: "commit did not finish in time".to_string(),
            });
        }
        if self.store.is_dirty() {
            return Err(EditorError::SaveFailed {
                reason: "changes are still unsaved".to_string(),
            });
        }
        Ok(())
    }

    /// Rebuilds the tree after the resource collaborator reloaded the document.
    pub fn document_reloaded(
        &mut self,
        root_fragment: &Value,
        root_ref: DataRef,
    ) -> Result<DispatchResult, EditorError> {
        let root = self
            .collaborators
            .factory
            .create_node(root_fragment, root_ref, None)
            .map_err(|e| EditorError::invalid_fragment(None, e))?;
        Ok(self.dispatch(Action::DocumentReloaded { root }))
    }
}
