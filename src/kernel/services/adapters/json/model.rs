use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::document::{DocumentError, JsonDocument};
use crate::kernel::services::ports::{
    JsonTreeSettings, ModelService, ModelUpdateError, ServiceError,
};
use crate::models::NodeInfo;

/// Serves a node's own properties; child containers belong to the tree, not the form.
pub struct JsonModelService {
    document: JsonDocument,
    settings: Arc<JsonTreeSettings>,
}

impl JsonModelService {
    pub fn new(document: JsonDocument, settings: Arc<JsonTreeSettings>) -> Self {
        Self { document, settings }
    }

    fn is_container(&self, key: &str) -> bool {
        self.settings.container_keys.iter().any(|k| k == key)
    }

    fn form_data(&self, object: &Map<String, Value>) -> Value {
        Value::Object(
            object
                .iter()
                .filter(|(key, _)| !self.is_container(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

/// Schema derived from the data when none is configured for the type.
pub fn infer_schema(data: &Value) -> Value {
    match data {
        Value::Object(map) => {
            let properties: Map<String, Value> = map
                .iter()
                .map(|(key, value)| (key.clone(), infer_schema(value)))
                .collect();
            json!({ "type": "object", "properties": properties })
        }
        Value::Array(items) => match items.first() {
            Some(first) => json!({ "type": "array", "items": infer_schema(first) }),
            None => json!({ "type": "array" }),
        },
        Value::String(_) => json!({ "type": "string" }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "type": "integer" }),
        Value::Number(_) => json!({ "type": "number" }),
        Value::Bool(_) => json!({ "type": "boolean" }),
        Value::Null => json!({ "type": "null" }),
    }
}

impl ModelService for JsonModelService {
    fn data_schema(&self, node: &NodeInfo) -> Result<Value, ServiceError> {
        if let Some(schema) = self.settings.schemas.get(&node.type_tag) {
            return Ok(schema.clone());
        }
        Ok(infer_schema(&self.data(node)?))
    }

    fn ui_schema(&self, node: &NodeInfo) -> Result<Option<Value>, ServiceError> {
        Ok(self.settings.ui_schemas.get(&node.type_tag).cloned())
    }

    fn data(&self, node: &NodeInfo) -> Result<Value, ServiceError> {
        let value = self
            .document
            .get(node.data_ref)
            .ok_or_else(|| ServiceError::Unresolved(node.data_ref.to_string()))?;
        match value.as_object() {
            Some(object) => Ok(self.form_data(object)),
            None => Err(ServiceError::Backend(format!(
                "fragment {} is not an object",
                node.data_ref
            ))),
        }
    }

    fn update_data(&self, node: &NodeInfo, data: Value) -> Result<(), ModelUpdateError> {
        let Value::Object(incoming) = data else {
            return Err(ModelUpdateError::Rejected(
                "form data must be an object".to_string(),
            ));
        };
        if let Some(key) = incoming.keys().find(|key| self.is_container(key)) {
            return Err(ModelUpdateError::Rejected(format!(
                "`{}` holds child nodes and cannot be written from the form",
                key
            )));
        }

        self.document
            .update_object(node.data_ref, |object| {
                object.retain(|key, _| self.is_container(key));
                object.extend(incoming);
            })
            .map_err(|e| match e {
                DocumentError::UnknownRef(_) => ModelUpdateError::Stale(e.to_string()),
                other => ModelUpdateError::Rejected(other.to_string()),
            })
    }
}
