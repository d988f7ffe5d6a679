//! # Undo/Redo Stack
//!
//! Snapshot history for an edit surface.
//!
//! ## Design
//!
//! - Before an edit is committed the previous document is pushed
//! - Undo swaps the current document with the newest snapshot and moves
//!   the current one to the redo stack
//! - Redo is the mirror image
//! - New edits clear the redo stack
//!
//! Documents are small lesson bodies, so whole snapshots are stored rather
//! than inverse operations.

use lessondoc_document::Document;

pub const DEFAULT_MAX_LEVELS: usize = 100;

/// One entry of history
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub document: Document,

    /// Label of the edit that replaced this document
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    undo_stack: Vec<Snapshot>,

    /// Most recent last
    redo_stack: Vec<Snapshot>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record the document an edit is about to replace
    pub fn record(&mut self, previous: Document, description: impl Into<String>) {
        self.undo_stack.push(Snapshot {
            document: previous,
            description: Some(description.into()),
        });

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new edit invalidates the future
        self.redo_stack.clear();
    }

    /// Step back, returning the document to restore
    pub fn undo(&mut self, current: Document) -> Option<Document> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(Snapshot {
            document: current,
            description: snapshot.description.clone(),
        });
        Some(snapshot.document)
    }

    /// Step forward, returning the document to restore
    pub fn redo(&mut self, current: Document) -> Option<Document> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(Snapshot {
            document: current,
            description: snapshot.description.clone(),
        });
        Some(snapshot.document)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Description of the edit the next undo reverts
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|snapshot| snapshot.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|snapshot| snapshot.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
