//! Model service contract: schema, layout and data for the detail form.

use serde_json::Value;
use std::fmt;

use crate::models::NodeInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Unresolved(String),
    Backend(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Unresolved(what) => write!(f, "cannot resolve {}", what),
            ServiceError::Backend(msg) => write!(f, "model backend error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelUpdateError {
    /// The document was reloaded or restructured under the reference.
    Stale(String),
    Rejected(String),
}

impl fmt::Display for ModelUpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelUpdateError::Stale(what) => write!(f, "stale document reference: {}", what),
            ModelUpdateError::Rejected(msg) => write!(f, "update rejected: {}", msg),
        }
    }
}

impl std::error::Error for ModelUpdateError {}

/// What the form renderer is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailTriple {
    pub schema: Value,
    pub ui_schema: Option<Value>,
    pub data: Value,
}

pub trait ModelService: Send + Sync {
    fn data_schema(&self, node: &NodeInfo) -> Result<Value, ServiceError>;

    /// `None` lets the renderer derive a default layout from the schema.
    fn ui_schema(&self, node: &NodeInfo) -> Result<Option<Value>, ServiceError>;

    fn data(&self, node: &NodeInfo) -> Result<Value, ServiceError>;

    fn update_data(&self, node: &NodeInfo, data: Value) -> Result<(), ModelUpdateError>;

    fn detail(&self, node: &NodeInfo) -> Result<DetailTriple, ServiceError> {
        Ok(DetailTriple {
            schema: self.data_schema(node)?,
            ui_schema: self.ui_schema(node)?,
            data: self.data(node)?,
        })
    }
}
