use std::io;

use super::executor::{execute, failed_completion};
use crate::kernel::services::{Collaborators, KernelBusSender};
use crate::kernel::Effect;

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
}

impl AsyncRuntime {
    pub fn new() -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self { runtime })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }
}

/// Per-session effect executor. Collaborator calls are blocking, so each one runs on
/// the blocking pool and its completion is sent back as an `Action`.
#[derive(Clone)]
pub struct EffectRunner {
    handle: tokio::runtime::Handle,
    collaborators: Collaborators,
    bus: KernelBusSender,
}

impl EffectRunner {
    pub fn new(
        handle: tokio::runtime::Handle,
        collaborators: Collaborators,
        bus: KernelBusSender,
    ) -> Self {
        Self {
            handle,
            collaborators,
            bus,
        }
    }

    pub fn run(&self, effect: Effect) {
        let collaborators = self.collaborators.clone();
        let bus = self.bus.clone();
        let pending = effect.clone();
        self.handle.spawn(async move {
            let action =
                match tokio::task::spawn_blocking(move || execute(&collaborators, effect)).await {
                    Ok(action) => action,
                    Err(e) => {
                        tracing::error!(error = %e, "effect task failed");
                        failed_completion(pending, e.to_string())
                    }
                };
            if bus.send_action(action).is_err() {
                tracing::debug!("kernel bus closed; effect result dropped");
            }
        });
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/async_runtime.rs"]
mod tests;
