//! Reference adapters for editing a plain JSON document.
//!
//! Every object is a node; the object elements of the configured container arrays
//! (`children` by default) are its child nodes.

mod document;
mod factory;
mod label;
mod model;
mod mutator;
mod persistence;

pub use document::{DocumentError, JsonDocument, Segment};
pub use factory::{JsonNodeFactory, JSON_EDITOR_ID};
pub use label::JsonLabelProvider;
pub use model::{infer_schema, JsonModelService};
pub use mutator::JsonDocumentMutator;
pub use persistence::{document_ref_for, JsonFileCommitter};

use std::path::PathBuf;
use std::sync::Arc;

use crate::kernel::services::ports::JsonTreeSettings;
use crate::kernel::services::Collaborators;

/// Wires all four collaborators to one shared document.
pub fn json_collaborators(
    document: &JsonDocument,
    settings: Arc<JsonTreeSettings>,
    path: PathBuf,
) -> Collaborators {
    Collaborators::new(
        Arc::new(JsonNodeFactory::new(document.clone(), Arc::clone(&settings))),
        Arc::new(JsonModelService::new(document.clone(), Arc::clone(&settings))),
        Arc::new(JsonDocumentMutator::new(document.clone(), settings)),
        Arc::new(JsonFileCommitter::new(document.clone(), path)),
    )
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/json.rs"]
mod tests;
