use rustc_hash::FxHashMap;
use serde_json::Value;
use std::collections::VecDeque;

use crate::kernel::error::{EditorError, EditorErrorKind};
use crate::kernel::services::ports::{DetailTriple, DocumentRef, SessionConfig};
use crate::models::{NodeId, NodeTree, TreeRow};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditorPhase {
    Idle,
    /// Selected, detail fetch in flight.
    Loading { node: NodeId },
    Bound { node: NodeId },
    /// A committed form change is being written back.
    Editing { node: NodeId },
    /// Last fetch or write-back failed; the form is locked until reselection.
    Error { node: NodeId, kind: EditorErrorKind },
}

impl EditorPhase {
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            EditorPhase::Idle => None,
            EditorPhase::Loading { node }
            | EditorPhase::Bound { node }
            | EditorPhase::Editing { node }
            | EditorPhase::Error { node, .. } => Some(node),
        }
    }
}

/// The triple bound to the form renderer plus its latest validation issues.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
    pub node: NodeId,
    pub schema: Value,
    pub ui_schema: Option<Value>,
    pub data: Value,
    pub issues: Vec<String>,
}

impl DetailState {
    pub fn from_triple(node: NodeId, triple: DetailTriple) -> Self {
        Self {
            node,
            schema: triple.schema,
            ui_schema: triple.ui_schema,
            data: triple.data,
            issues: Vec::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PendingFetch {
    pub request_id: u64,
    pub node: NodeId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PendingOp {
    LoadChildren,
    Add,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: EditorErrorKind,
    pub node: Option<NodeId>,
    pub message: String,
}

impl From<&EditorError> for Notification {
    fn from(err: &EditorError) -> Self {
        Self {
            kind: err.kind(),
            node: err.node(),
            message: err.to_string(),
        }
    }
}

/// A row plus the controller's view of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorRow {
    pub row: TreeRow,
    pub selected: bool,
    pub error: Option<EditorErrorKind>,
    pub busy: bool,
}

pub struct SessionState {
    pub document: DocumentRef,
    pub config: SessionConfig,
    pub tree: NodeTree,
    pub phase: EditorPhase,
    pub detail: Option<DetailState>,
    pub pending_fetch: Option<PendingFetch>,
    pub in_flight: FxHashMap<NodeId, PendingOp>,
    /// Edit generation the running commit started from.
    pub save_in_flight: Option<u64>,
    pub edit_generation: u64,
    pub node_errors: FxHashMap<NodeId, EditorErrorKind>,
    pub notifications: VecDeque<Notification>,
    next_request_id: u64,
}

impl SessionState {
    pub fn new(document: DocumentRef, tree: NodeTree, config: SessionConfig) -> Self {
        Self {
            document,
            config,
            tree,
            phase: EditorPhase::Idle,
            detail: None,
            pending_fetch: None,
            in_flight: FxHashMap::default(),
            save_in_flight: None,
            edit_generation: 0,
            node_errors: FxHashMap::default(),
            notifications: VecDeque::new(),
            next_request_id: 1,
        }
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.phase.node()
    }

    pub(crate) fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        id
    }

    /// True when `node` or a node being deleted above it has work in flight.
    pub fn is_busy(&self, node: NodeId) -> bool {
        if self.in_flight.contains_key(&node) {
            return true;
        }
        self.tree
            .ancestors(node)
            .any(|id| self.in_flight.get(&id) == Some(&PendingOp::Delete))
    }

    pub fn subtree_busy(&self, node: NodeId) -> bool {
        self.is_busy(node)
            || self
                .tree
                .subtree(node)
                .into_iter()
                .any(|id| self.in_flight.contains_key(&id))
    }

    /// The position an add reports is only valid in the sibling list it was
    /// computed against, so adds and child deletes under one parent exclude each other.
    pub fn siblings_reordering(&self, parent: NodeId, op: PendingOp) -> bool {
        match op {
            PendingOp::Add => self
                .tree
                .children(parent)
                .iter()
                .any(|child| self.in_flight.get(child) == Some(&PendingOp::Delete)),
            PendingOp::Delete => self.in_flight.get(&parent) == Some(&PendingOp::Add),
            PendingOp::LoadChildren => false,
        }
    }

    pub fn push_notification(&mut self, err: &EditorError) {
        let cap = self.config.max_notifications.max(1);
        while self.notifications.len() >= cap {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification::from(err));
    }

    pub fn rows(&self) -> Vec<EditorRow> {
        let selected = self.selected();
        self.tree
            .flatten_for_view()
            .into_iter()
            .map(|row| EditorRow {
                selected: selected == Some(row.id),
                error: self.node_errors.get(&row.id).copied(),
                busy: self.in_flight.contains_key(&row.id),
                row,
            })
            .collect()
    }
}
