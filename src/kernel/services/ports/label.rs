use crate::models::NodeInfo;

/// Resolves display text and icons for nodes; keyed on `editor_id` + `type_tag`.
pub trait LabelProvider: Send + Sync {
    fn label(&self, node: &NodeInfo) -> String;

    fn icon(&self, _node: &NodeInfo) -> Option<&'static str> {
        None
    }
}
