use std::sync::Arc;

use super::document::JsonDocument;
use crate::kernel::services::ports::{JsonTreeSettings, LabelProvider};
use crate::models::NodeInfo;

pub struct JsonLabelProvider {
    document: JsonDocument,
    settings: Arc<JsonTreeSettings>,
}

impl JsonLabelProvider {
    pub fn new(document: JsonDocument, settings: Arc<JsonTreeSettings>) -> Self {
        Self { document, settings }
    }
}

impl LabelProvider for JsonLabelProvider {
    fn label(&self, node: &NodeInfo) -> String {
        self.document
            .get(node.data_ref)
            .and_then(|value| {
                value
                    .get(self.settings.label_key.as_str())
                    .and_then(|v| v.as_str().map(str::to_string))
            })
            .unwrap_or_else(|| node.type_tag.to_string())
    }

    fn icon(&self, node: &NodeInfo) -> Option<&'static str> {
        if node.parent.is_none() {
            Some("◆")
        } else {
            Some("•")
        }
    }
}
