use compact_str::CompactString;
use serde_json::Value;
use std::sync::Arc;

use super::document::{child_slots, JsonDocument};
use crate::kernel::services::ports::{
    AddNodeCommand, InvalidFragmentError, JsonTreeSettings, NodeFactory,
};
use crate::models::{DataRef, NodeDraft, NodeInfo};

pub const JSON_EDITOR_ID: &str = "json-tree";

pub struct JsonNodeFactory {
    document: JsonDocument,
    settings: Arc<JsonTreeSettings>,
}

impl JsonNodeFactory {
    pub fn new(document: JsonDocument, settings: Arc<JsonTreeSettings>) -> Self {
        Self { document, settings }
    }

    pub(crate) fn type_tag(settings: &JsonTreeSettings, fragment: &Value) -> CompactString {
        fragment
            .get(settings.type_key.as_str())
            .and_then(Value::as_str)
            .map(CompactString::from)
            .unwrap_or_else(|| settings.default_type.clone())
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl NodeFactory for JsonNodeFactory {
    fn editor_id(&self) -> &str {
        JSON_EDITOR_ID
    }

    fn create_node(
        &self,
        fragment: &Value,
        data_ref: DataRef,
        _parent: Option<&NodeInfo>,
    ) -> Result<NodeDraft, InvalidFragmentError> {
        if !fragment.is_object() {
            return Err(InvalidFragmentError::new(format!(
                "expected an object, found {}",
                kind_name(fragment)
            )));
        }

        Ok(NodeDraft {
            editor_id: JSON_EDITOR_ID.into(),
            type_tag: Self::type_tag(&self.settings, fragment),
            data_ref,
            has_children: child_slots(fragment, &self.settings.container_keys)
                .next()
                .is_some(),
        })
    }

    fn create_children(&self, node: &NodeInfo) -> Result<Vec<NodeDraft>, InvalidFragmentError> {
        let children = self
            .document
            .children_of(node.data_ref, &self.settings.container_keys)
            .map_err(|e| InvalidFragmentError::new(e.to_string()))?;

        children
            .into_iter()
            .map(|(data_ref, fragment)| self.create_node(&fragment, data_ref, Some(node)))
            .collect()
    }

    fn add_commands(&self, _node: &NodeInfo) -> Vec<AddNodeCommand> {
        let mut types: Vec<&CompactString> = self.settings.schemas.keys().collect();
        if types.is_empty() {
            types.push(&self.settings.default_type);
        }
        types.sort();

        types
            .into_iter()
            .map(|type_tag| {
                let mut template = serde_json::Map::new();
                template.insert(
                    self.settings.type_key.to_string(),
                    Value::String(type_tag.to_string()),
                );
                AddNodeCommand {
                    editor_id: JSON_EDITOR_ID.into(),
                    type_tag: type_tag.clone(),
                    template: Value::Object(template),
                }
            })
            .collect()
    }
}
