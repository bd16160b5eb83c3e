use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the document a session edits, e.g. its file URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef(pub CompactString);

impl DocumentRef {
    pub fn new(uri: impl Into<CompactString>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Serialize(String),
    Rejected(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Serialize(msg) => write!(f, "serialize failed: {}", msg),
            SaveError::Rejected(msg) => write!(f, "commit rejected: {}", msg),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

/// Commits the whole document; individual updates already mutated it in place.
pub trait PersistenceCommitter: Send + Sync {
    fn commit(&self, document: &DocumentRef) -> Result<(), SaveError>;
}
