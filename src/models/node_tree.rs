//! Arena-backed node tree.
//!
//! Nodes live in a single `SlotMap`; `parent`/`children` are keys, so removing a
//! subtree invalidates its ids instead of leaving dangling references. Removed keys
//! bump their slot version and are never handed out again.

use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! { pub struct NodeId; }

/// Opaque reference into the data document. Minted by the document side; the tree
/// only uses it as a lookup key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataRef(u64);

impl DataRef {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DataRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTreeError {
    InvalidNodeId,
    DuplicateDataRef(DataRef),
    RootRemoval,
}

impl fmt::Display for NodeTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeTreeError::InvalidNodeId => write!(f, "invalid node id"),
            NodeTreeError::DuplicateDataRef(data_ref) => {
                write!(f, "data reference {} is already bound to a node", data_ref)
            }
            NodeTreeError::RootRemoval => write!(f, "the root node cannot be removed"),
        }
    }
}

impl std::error::Error for NodeTreeError {}

/// What a node factory produces; the tree turns it into a node with a fresh id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDraft {
    pub editor_id: CompactString,
    pub type_tag: CompactString,
    pub data_ref: DataRef,
    pub has_children: bool,
}

/// Detached snapshot of a node handed to collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub editor_id: CompactString,
    pub type_tag: CompactString,
    pub data_ref: DataRef,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) editor_id: CompactString,
    pub(crate) type_tag: CompactString,
    pub(crate) data_ref: DataRef,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) load_state: LoadState,
    pub(crate) dirty: bool,
}

impl Node {
    fn from_draft(draft: NodeDraft, parent: Option<NodeId>) -> Self {
        let load_state = if draft.has_children {
            LoadState::NotLoaded
        } else {
            LoadState::Loaded
        };
        Self {
            editor_id: draft.editor_id,
            type_tag: draft.type_tag,
            data_ref: draft.data_ref,
            parent,
            children: Vec::new(),
            load_state,
            dirty: false,
        }
    }
}

pub struct NodeTree {
    pub(crate) arena: SlotMap<NodeId, Node>,
    root: NodeId,
    expanded: FxHashSet<NodeId>,
    id_by_ref: FxHashMap<DataRef, NodeId>,
}

impl NodeTree {
    pub fn new(root: NodeDraft) -> Self {
        let mut arena = SlotMap::with_key();
        let data_ref = root.data_ref;
        let root = arena.insert(Node::from_draft(root, None));

        let mut id_by_ref = FxHashMap::default();
        id_by_ref.insert(data_ref, root);

        let mut expanded = FxHashSet::default();
        expanded.insert(root);

        Self {
            arena,
            root,
            expanded,
            id_by_ref,
        }
    }

    /// Replaces every node with a fresh root. The arena is reused so ids handed
    /// out before the reset stay dead.
    pub fn reset(&mut self, root: NodeDraft) {
        self.arena.clear();
        self.expanded.clear();
        self.id_by_ref.clear();

        let data_ref = root.data_ref;
        self.root = self.arena.insert(Node::from_draft(root, None));
        self.id_by_ref.insert(data_ref, self.root);
        self.expanded.insert(self.root);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn info(&self, id: NodeId) -> Option<NodeInfo> {
        self.arena.get(id).map(|node| NodeInfo {
            id,
            parent: node.parent,
            editor_id: node.editor_id.clone(),
            type_tag: node.type_tag.clone(),
            data_ref: node.data_ref,
        })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn data_ref(&self, id: NodeId) -> Option<DataRef> {
        self.arena.get(id).map(|n| n.data_ref)
    }

    pub fn find_by_ref(&self, data_ref: DataRef) -> Option<NodeId> {
        self.id_by_ref.get(&data_ref).copied()
    }

    pub fn load_state(&self, id: NodeId) -> Option<LoadState> {
        self.arena.get(id).map(|n| n.load_state)
    }

    pub fn set_load_state(&mut self, id: NodeId, state: LoadState) {
        if let Some(node) = self.arena.get_mut(id) {
            node.load_state = state;
        }
    }

    /// Inserts a node under `parent`. `index` past the end (or `None`) appends.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: Option<usize>,
        draft: NodeDraft,
    ) -> Result<NodeId, NodeTreeError> {
        if !self.arena.contains_key(parent) {
            return Err(NodeTreeError::InvalidNodeId);
        }
        if self.id_by_ref.contains_key(&draft.data_ref) {
            return Err(NodeTreeError::DuplicateDataRef(draft.data_ref));
        }

        let data_ref = draft.data_ref;
        let id = self.arena.insert(Node::from_draft(draft, Some(parent)));
        self.id_by_ref.insert(data_ref, id);

        let parent_node = self
            .arena
            .get_mut(parent)
            .ok_or(NodeTreeError::InvalidNodeId)?;
        let at = index
            .unwrap_or(parent_node.children.len())
            .min(parent_node.children.len());
        parent_node.children.insert(at, id);

        Ok(id)
    }

    /// Fills a lazily expanded node. Drafts whose reference is already bound are
    /// skipped and reported back.
    pub fn fill_children(
        &mut self,
        parent: NodeId,
        drafts: Vec<NodeDraft>,
    ) -> Result<Vec<DataRef>, NodeTreeError> {
        if !self.arena.contains_key(parent) {
            return Err(NodeTreeError::InvalidNodeId);
        }

        let mut skipped = Vec::new();
        for draft in drafts {
            match self.insert_child(parent, None, draft) {
                Ok(_) => {}
                Err(NodeTreeError::DuplicateDataRef(data_ref)) => skipped.push(data_ref),
                Err(e) => return Err(e),
            }
        }
        self.set_load_state(parent, LoadState::Loaded);
        Ok(skipped)
    }

    /// Removes `id` and its whole subtree; returns every removed id.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>, NodeTreeError> {
        if id == self.root {
            return Err(NodeTreeError::RootRemoval);
        }
        let parent = self
            .arena
            .get(id)
            .ok_or(NodeTreeError::InvalidNodeId)?
            .parent;

        if let Some(parent_node) = parent.and_then(|p| self.arena.get_mut(p)) {
            parent_node.children.retain(|&child| child != id);
        }

        let removed = self.subtree(id);
        for &node_id in &removed {
            if let Some(node) = self.arena.remove(node_id) {
                self.id_by_ref.remove(&node.data_ref);
            }
            self.expanded.remove(&node_id);
        }
        Ok(removed)
    }

    /// Pre-order ids of `id` and all of its descendants.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.arena.get(node_id) else {
                continue;
            };
            out.push(node_id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Pre-order traversal of the whole tree.
    pub fn traverse(&self) -> Vec<NodeId> {
        self.subtree(self.root)
    }

    pub fn is_ancestor(&self, ancestor: NodeId, mut descendant: NodeId) -> bool {
        while let Some(parent) = self.parent(descendant) {
            if parent == ancestor {
                return true;
            }
            descendant = parent;
        }
        false
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    pub fn expand(&mut self, id: NodeId) {
        if self.arena.contains_key(id) {
            self.expanded.insert(id);
        }
    }

    pub fn collapse(&mut self, id: NodeId) {
        self.expanded.remove(&id);
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }
}

/// A visible row for the tree widget. `editor_id`/`type_tag` are what label and icon
/// providers key on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: NodeId,
    pub depth: u16,
    pub editor_id: CompactString,
    pub type_tag: CompactString,
    pub data_ref: DataRef,
    pub is_expanded: bool,
    pub load_state: LoadState,
    pub dirty: bool,
}

impl NodeTree {
    pub fn flatten_for_view(&self) -> Vec<TreeRow> {
        let mut result = Vec::new();
        let mut stack: Vec<(NodeId, u16)> = vec![(self.root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            let is_expanded = self.expanded.contains(&id);
            result.push(TreeRow {
                id,
                depth,
                editor_id: node.editor_id.clone(),
                type_tag: node.type_tag.clone(),
                data_ref: node.data_ref,
                is_expanded,
                load_state: node.load_state,
                dirty: node.dirty,
            });

            if is_expanded {
                for &child in node.children.iter().rev() {
                    stack.push((child, depth.saturating_add(1)));
                }
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/node_tree.rs"]
mod tests;
