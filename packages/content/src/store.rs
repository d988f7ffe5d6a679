//! Persistence contract
//!
//! Stores only move bytes; they never validate. Anything they return goes
//! back through the normalizer before it is rendered or edited.

use crate::model::{EntityId, StoredContent};
use crate::StoreError;
use chrono::Utc;
use lessondoc_document::Document;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

pub trait ContentStore: Send + Sync {
    /// Create or overwrite the record for `id`
    fn save(&self, id: &EntityId, document: &Document) -> Result<(), StoreError>;

    fn load(&self, id: &EntityId) -> Result<Option<StoredContent>, StoreError>;

    /// Returns false if nothing was stored under `id`
    fn delete(&self, id: &EntityId) -> Result<bool, StoreError>;
}

/// In-process store; last write wins
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<EntityId, StoredContent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a body as-is, bypassing validation (legacy rows, fixtures)
    pub fn insert_raw(&self, id: EntityId, document: serde_json::Value) {
        let record = StoredContent {
            document,
            updated_at: Utc::now(),
        };
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, record);
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentStore for MemoryStore {
    fn save(&self, id: &EntityId, document: &Document) -> Result<(), StoreError> {
        let record = StoredContent {
            document: document.to_value()?,
            updated_at: Utc::now(),
        };
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), record);
        Ok(())
    }

    fn load(&self, id: &EntityId) -> Result<Option<StoredContent>, StoreError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }

    fn delete(&self, id: &EntityId) -> Result<bool, StoreError> {
        Ok(self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some())
    }
}
