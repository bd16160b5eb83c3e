use serde_json::Value;
use std::sync::Arc;

use super::document::{DocumentError, JsonDocument};
use crate::kernel::services::ports::{
    AddedFragment, DocumentMutator, JsonTreeSettings, MutationError,
};
use crate::models::NodeInfo;

/// New children go at the end of the last configured container, so they come
/// last among the parent's children.
pub struct JsonDocumentMutator {
    document: JsonDocument,
    settings: Arc<JsonTreeSettings>,
}

impl JsonDocumentMutator {
    pub fn new(document: JsonDocument, settings: Arc<JsonTreeSettings>) -> Self {
        Self { document, settings }
    }
}

fn mutation_error(e: DocumentError) -> MutationError {
    match e {
        DocumentError::UnknownRef(_) => MutationError::Stale(e.to_string()),
        DocumentError::ChildNotAnObject => MutationError::InvalidFragment(e.to_string()),
        other => MutationError::Rejected(other.to_string()),
    }
}

impl DocumentMutator for JsonDocumentMutator {
    fn add_node(
        &self,
        parent: &NodeInfo,
        fragment: Value,
    ) -> Result<AddedFragment, MutationError> {
        let container = self.settings.container_keys.last().ok_or_else(|| {
            MutationError::Rejected("no child container configured".to_string())
        })?;

        let (data_ref, index) = self
            .document
            .append_child(
                parent.data_ref,
                container,
                fragment.clone(),
                &self.settings.container_keys,
            )
            .map_err(mutation_error)?;

        Ok(AddedFragment {
            data_ref,
            index,
            fragment,
        })
    }

    fn delete_node(&self, node: &NodeInfo) -> Result<(), MutationError> {
        self.document.remove(node.data_ref).map_err(mutation_error)
    }
}
