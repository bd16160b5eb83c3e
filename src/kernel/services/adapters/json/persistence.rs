use std::io::Write;
use std::path::{Path, PathBuf};

use super::document::JsonDocument;
use crate::kernel::services::ports::{DocumentRef, PersistenceCommitter, SaveError};

/// Writes the whole document back to its file as pretty JSON.
pub struct JsonFileCommitter {
    document: JsonDocument,
    path: PathBuf,
}

impl JsonFileCommitter {
    pub fn new(document: JsonDocument, path: PathBuf) -> Self {
        Self { document, path }
    }

    pub fn document_ref(&self) -> DocumentRef {
        document_ref_for(&self.path)
    }
}

pub fn document_ref_for(path: &Path) -> DocumentRef {
    DocumentRef::new(format!("file://{}", path.display()))
}

impl PersistenceCommitter for JsonFileCommitter {
    fn commit(&self, document: &DocumentRef) -> Result<(), SaveError> {
        if *document != self.document_ref() {
            return Err(SaveError::Rejected(format!(
                "{} is not backed by {}",
                document,
                self.path.display()
            )));
        }

        let snapshot = self.document.snapshot();
        let text =
            serde_json::to_string_pretty(&snapshot).map_err(|e| SaveError::Serialize(e.to_string()))?;
        write_text_to_path(&self.path, &text)?;
        tracing::debug!(path = %self.path.display(), bytes = text.len(), "document committed");
        Ok(())
    }
}

fn write_text_to_path(path: &Path, text: &str) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}
