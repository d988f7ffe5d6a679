//! File-per-record store: `<root>/<id>.json`

use crate::model::{EntityId, StoredContent};
use crate::store::ContentStore;
use crate::StoreError;
use chrono::Utc;
use lessondoc_document::Document;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &EntityId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }
}

impl ContentStore for DirectoryStore {
    fn save(&self, id: &EntityId, document: &Document) -> Result<(), StoreError> {
        let record = StoredContent {
            document: document.to_value()?,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&record)?;

        fs::create_dir_all(&self.root)?;

        // Each save gets its own temp file in the same directory; the rename
        // replaces the record atomically, last writer wins
        let path = self.path_for(id);
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|err| err.error)?;

        tracing::debug!("Saved {}", path.display());
        Ok(())
    }

    fn load(&self, id: &EntityId) -> Result<Option<StoredContent>, StoreError> {
        let source = match fs::read_to_string(self.path_for(id)) {
            Ok(source) => source,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&source)
            .map(Some)
            .map_err(|err| StoreError::Corrupt {
                id: id.clone(),
                reason: err.to_string(),
            })
    }

    fn delete(&self, id: &EntityId) -> Result<bool, StoreError> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
