//! Replays recorded editor events against a session and renders the tree.
//!
//! Steps address nodes with JSON pointers into the document, e.g.
//! `{ "op": "edit", "at": "/children/0", "data": { "name": "renamed" } }`.

use serde::Deserialize;
use serde_json::Value;
use std::fmt::{self, Write as _};
use std::time::Duration;

use crate::kernel::services::adapters::JsonDocument;
use crate::kernel::services::ports::LabelProvider;
use crate::kernel::{Action, EditorError, EditorPhase, EditorSession, FormChange, Store};
use crate::models::NodeId;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Select {
        #[serde(default)]
        at: Option<String>,
    },
    Expand {
        at: String,
    },
    Collapse {
        at: String,
    },
    Edit {
        at: String,
        data: Value,
    },
    Add {
        at: String,
        fragment: Value,
    },
    Delete {
        at: String,
    },
    Save,
}

#[derive(Debug)]
pub enum ScriptError {
    Parse(serde_json::Error),
    UnknownPointer(String),
    NotInTree(String),
    Timeout,
    Editor(EditorError),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Parse(e) => write!(f, "invalid script: {}", e),
            ScriptError::UnknownPointer(p) => write!(f, "pointer {} does not resolve", p),
            ScriptError::NotInTree(p) => write!(f, "{} is not shown in the tree", p),
            ScriptError::Timeout => write!(f, "session did not settle in time"),
            ScriptError::Editor(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<serde_json::Error> for ScriptError {
    fn from(e: serde_json::Error) -> Self {
        ScriptError::Parse(e)
    }
}

impl From<EditorError> for ScriptError {
    fn from(e: EditorError) -> Self {
        ScriptError::Editor(e)
    }
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    Ok(serde_json::from_str(text)?)
}

pub struct ScriptRunner<'a> {
    session: &'a mut EditorSession,
    document: &'a JsonDocument,
    timeout: Duration,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(session: &'a mut EditorSession, document: &'a JsonDocument, timeout: Duration) -> Self {
        Self {
            session,
            document,
            timeout,
        }
    }

    fn resolve(&self, pointer: &str) -> Result<NodeId, ScriptError> {
        let data_ref = self
            .document
            .ref_for_pointer(pointer)
            .ok_or_else(|| ScriptError::UnknownPointer(pointer.to_string()))?;
        self.session
            .store()
            .tree()
            .find_by_ref(data_ref)
            .ok_or_else(|| ScriptError::NotInTree(pointer.to_string()))
    }

    fn settle(&mut self) -> Result<(), ScriptError> {
        if self.session.run_until_idle(self.timeout) {
            Ok(())
        } else {
            Err(ScriptError::Timeout)
        }
    }

    fn dispatch(&mut self, action: Action) -> Result<(), ScriptError> {
        let result = self.session.dispatch(action);
        self.settle()?;
        match result.error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    pub fn run_step(&mut self, step: ScriptStep) -> Result<(), ScriptError> {
        tracing::debug!(?step, "script step");
        match step {
            ScriptStep::Select { at: None } => self.dispatch(Action::Select(None)),
            ScriptStep::Select { at: Some(at) } => {
                let node = self.resolve(&at)?;
                self.dispatch(Action::Select(Some(node)))
            }
            ScriptStep::Expand { at } => {
                let node = self.resolve(&at)?;
                self.dispatch(Action::Expand(node))
            }
            ScriptStep::Collapse { at } => {
                let node = self.resolve(&at)?;
                self.dispatch(Action::Collapse(node))
            }
            ScriptStep::Edit { at, data } => {
                let node = self.resolve(&at)?;
                if self.session.store().phase() != (EditorPhase::Bound { node }) {
                    self.dispatch(Action::Select(Some(node)))?;
                }
                self.dispatch(Action::FormChanged(FormChange::committed(node, data)))
            }
            ScriptStep::Add { at, fragment } => {
                let parent = self.resolve(&at)?;
                self.dispatch(Action::AddNode { parent, fragment })
            }
            ScriptStep::Delete { at } => {
                let node = self.resolve(&at)?;
                self.dispatch(Action::DeleteNode(node))
            }
            ScriptStep::Save => self.dispatch(Action::Save),
        }
    }

    /// Runs every step; failures are collected, not fatal.
    pub fn run(&mut self, steps: Vec<ScriptStep>) -> Vec<(usize, ScriptError)> {
        let mut failures = Vec::new();
        for (index, step) in steps.into_iter().enumerate() {
            if let Err(e) = self.run_step(step) {
                tracing::warn!(step = index, error = %e, "script step failed");
                failures.push((index, e));
            }
        }
        failures
    }
}

/// One line per visible row: marker column, indentation, icon, label.
pub fn render_tree(store: &Store, labels: &dyn LabelProvider) -> String {
    let mut out = String::new();
    for row in store.rows() {
        let Some(info) = store.tree().info(row.row.id) else {
            continue;
        };
        let marker = match (row.selected, row.error.is_some(), row.row.dirty) {
            (_, true, _) => '!',
            (true, _, _) => '>',
            (_, _, true) => '*',
            _ => ' ',
        };
        let icon = labels.icon(&info).unwrap_or("-");
        let _ = writeln!(
            out,
            "{} {}{} {}{}",
            marker,
            "  ".repeat(row.row.depth as usize),
            icon,
            labels.label(&info),
            if row.row.dirty { " (modified)" } else { "" }
        );
    }
    out
}
