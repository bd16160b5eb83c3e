use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::SessionConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub json: JsonTreeSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

/// Shape hints for the JSON document adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonTreeSettings {
    /// Array properties whose object elements become child nodes. Children are
    /// ordered container by container; added nodes go into the last one.
    pub container_keys: Vec<CompactString>,
    /// Property naming a node's type tag.
    pub type_key: CompactString,
    pub default_type: CompactString,
    /// Property used for tree labels.
    pub label_key: CompactString,
    #[serde(skip_serializing_if = "FxHashMap::is_empty")]
    pub schemas: FxHashMap<CompactString, Value>,
    #[serde(skip_serializing_if = "FxHashMap::is_empty")]
    pub ui_schemas: FxHashMap<CompactString, Value>,
}

impl Default for JsonTreeSettings {
    fn default() -> Self {
        Self {
            container_keys: vec!["children".into()],
            type_key: "type".into(),
            default_type: "object".into(),
            label_key: "name".into(),
            schemas: FxHashMap::default(),
            ui_schemas: FxHashMap::default(),
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
