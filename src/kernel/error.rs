//! Errors surfaced by the controller. Collaborator failures are translated into
//! one of these kinds before they leave the store.

use std::fmt;

use crate::kernel::services::ports::{
    InvalidFragmentError, ModelUpdateError, MutationError, SaveError, ServiceError,
};
use crate::models::{NodeId, NodeTreeError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EditorErrorKind {
    InvalidFragment,
    ModelUpdate,
    OperationInProgress,
    NodeUnavailable,
    SaveFailed,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    InvalidFragment { node: Option<NodeId>, reason: String },
    ModelUpdate { node: NodeId, reason: String },
    OperationInProgress { node: NodeId },
    NodeUnavailable { node: NodeId, reason: String },
    SaveFailed { reason: String },
    Tree(NodeTreeError),
}

impl EditorError {
    pub fn kind(&self) -> EditorErrorKind {
        match self {
            EditorError::InvalidFragment { .. } => EditorErrorKind::InvalidFragment,
            EditorError::ModelUpdate { .. } => EditorErrorKind::ModelUpdate,
            EditorError::OperationInProgress { .. } => EditorErrorKind::OperationInProgress,
            EditorError::NodeUnavailable { .. } => EditorErrorKind::NodeUnavailable,
            EditorError::SaveFailed { .. } => EditorErrorKind::SaveFailed,
            EditorError::Tree(_) => EditorErrorKind::Tree,
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        match self {
            EditorError::InvalidFragment { node, .. } => *node,
            EditorError::ModelUpdate { node, .. }
            | EditorError::OperationInProgress { node }
            | EditorError::NodeUnavailable { node, .. } => Some(*node),
            EditorError::SaveFailed { .. } | EditorError::Tree(_) => None,
        }
    }

    pub fn unavailable(node: NodeId, err: ServiceError) -> Self {
        EditorError::NodeUnavailable {
            node,
            reason: err.to_string(),
        }
    }

    pub fn update_failed(node: NodeId, err: ModelUpdateError) -> Self {
        EditorError::ModelUpdate {
            node,
            reason: err.to_string(),
        }
    }

    pub fn invalid_fragment(node: Option<NodeId>, err: InvalidFragmentError) -> Self {
        EditorError::InvalidFragment {
            node,
            reason: err.reason,
        }
    }

    /// Add hooks fail as fragment errors, delete hooks as write-back errors.
    pub fn add_failed(parent: NodeId, err: MutationError) -> Self {
        EditorError::InvalidFragment {
            node: Some(parent),
            reason: err.to_string(),
        }
    }

    pub fn delete_failed(node: NodeId, err: MutationError) -> Self {
        EditorError::ModelUpdate {
            node,
            reason: err.to_string(),
        }
    }

    pub fn save_failed(err: SaveError) -> Self {
        EditorError::SaveFailed {
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::InvalidFragment { reason, .. } => {
                write!(f, "invalid fragment: {}", reason)
            }
            EditorError::ModelUpdate { reason, .. } => write!(f, "model update failed: {}", reason),
            EditorError::OperationInProgress { node } => {
                write!(f, "an operation is already in progress on {:?}", node)
            }
            EditorError::NodeUnavailable { reason, .. } => {
                write!(f, "node unavailable: {}", reason)
            }
            EditorError::SaveFailed { reason } => write!(f, "save failed: {}", reason),
            EditorError::Tree(e) => write!(f, "tree error: {}", e),
        }
    }
}

impl std::error::Error for EditorError {}

impl From<NodeTreeError> for EditorError {
    fn from(e: NodeTreeError) -> Self {
        EditorError::Tree(e)
    }
}
