use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Project the root's children when the session opens.
    pub eager_root_children: bool,
    /// Re-read a node from the document after its write-back was rejected.
    pub refetch_on_update_error: bool,
    /// Select a node right after it was added. Off unless an editor opts in.
    pub select_added_node: bool,
    pub max_notifications: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            eager_root_children: true,
            refetch_on_update_error: true,
            select_added_node: false,
            max_notifications: 64,
        }
    }
}
