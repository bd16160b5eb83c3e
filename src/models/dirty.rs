//! Dirty tracking on top of the node arena.

use super::node_tree::{NodeId, NodeTree};

impl NodeTree {
    /// Marks `id` dirty and walks up until an ancestor is already dirty.
    /// Returns whether any flag changed.
    pub fn mark_dirty(&mut self, id: NodeId) -> bool {
        let mut changed = false;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.arena.get_mut(node_id) else {
                break;
            };
            if node.dirty {
                break;
            }
            node.dirty = true;
            changed = true;
            current = node.parent;
        }
        changed
    }

    /// Only called after a successful commit.
    pub fn clear_all(&mut self) -> bool {
        let mut changed = false;
        for (_, node) in self.arena.iter_mut() {
            changed |= node.dirty;
            node.dirty = false;
        }
        changed
    }

    pub fn is_dirty(&self) -> bool {
        self.arena.values().any(|n| n.dirty)
    }

    pub fn is_node_dirty(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(|n| n.dirty)
    }

    pub fn dirty_nodes(&self) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|&id| self.is_node_dirty(id))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/dirty.rs"]
mod tests;
