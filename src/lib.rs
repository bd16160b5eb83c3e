//! treeform - synchronization core for master/detail tree editors
//!
//! Module layout:
//! - models: node arena (NodeTree) and dirty tracking
//! - kernel: controller store, actions/effects, editor session
//! - kernel::services: collaborator ports, effect runtime, JSON reference adapters
//! - script: replay of recorded editor events (used by the CLI)

pub mod kernel;
pub mod models;
pub mod script;
