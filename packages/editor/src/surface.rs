//! # Edit Surface
//!
//! Owns the single document being edited and tells listeners about every
//! committed local edit.
//!
//! ## Lifecycle
//!
//! ```text
//! load_str / load_value ──→ Document ──→ apply / undo / redo ──→ ChangeEvent
//!   (external, silent)       (valid)        (local, notifies)     (per listener)
//! ```
//!
//! The surface never holds an invalid document: edits run against a copy
//! that is re-normalized in strict mode before it replaces the current one.

use crate::subscription::{ChangeEvent, Subscribers, Subscription};
use crate::undo_stack::UndoStack;
use crate::{EditEvent, EditorError};
use lessondoc_document::Document;
use lessondoc_validator::{
    normalize, parse_document, renormalize, Diagnostic, ValidationError, ValidationOptions,
};
use serde_json::Value;

/// Result of replacing the content from an external source
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded,
    /// Input was absent, null or blank
    Empty,
    /// Input failed validation; the surface was cleared
    Rejected(Diagnostic),
}

pub struct EditSurface {
    document: Document,

    /// Increments on each committed local edit
    version: u64,

    /// Mode used for content loaded from outside
    load_options: ValidationOptions,

    history: UndoStack,
    subscribers: Subscribers,
}

impl EditSurface {
    pub fn new() -> Self {
        Self::with_options(ValidationOptions::default())
    }

    pub fn with_options(load_options: ValidationOptions) -> Self {
        Self {
            document: Document::empty(),
            version: 0,
            load_options,
            history: UndoStack::new(),
            subscribers: Subscribers::default(),
        }
    }

    pub fn with_history_depth(mut self, max_levels: usize) -> Self {
        self.history = UndoStack::with_max_levels(max_levels);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn subscribe(&mut self) -> Subscription {
        self.subscribers.subscribe()
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: u64) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Apply a local edit, returning the new version
    ///
    /// Rejected edits leave the document, version and history untouched and
    /// notify nobody.
    pub fn apply(&mut self, event: EditEvent) -> Result<u64, EditorError> {
        let mut draft = self.document.clone();
        event.apply(&mut draft)?;

        let draft = renormalize(&draft, &ValidationOptions::strict()).map_err(|err| {
            tracing::debug!("Rejected edit '{}': {}", event.describe(), err);
            EditorError::from(err)
        })?;

        let previous = std::mem::replace(&mut self.document, draft);
        self.history.record(previous, event.describe());
        Ok(self.commit())
    }

    pub fn undo(&mut self) -> Result<u64, EditorError> {
        let current = self.document.clone();
        let restored = self
            .history
            .undo(current)
            .ok_or(EditorError::NothingToUndo)?;
        self.document = restored;
        Ok(self.commit())
    }

    pub fn redo(&mut self) -> Result<u64, EditorError> {
        let current = self.document.clone();
        let restored = self
            .history
            .redo(current)
            .ok_or(EditorError::NothingToRedo)?;
        self.document = restored;
        Ok(self.commit())
    }

    /// Replace the content with stored JSON text
    ///
    /// Subscribers are not notified: the change did not originate here.
    pub fn load_str(&mut self, source: Option<&str>) -> LoadOutcome {
        match source {
            None => self.replace_content(Ok(Document::empty())),
            Some(source) => {
                let parsed = parse_document(source, &self.load_options);
                self.replace_content(parsed)
            }
        }
    }

    /// Replace the content with an already-parsed JSON value
    pub fn load_value(&mut self, value: Option<&Value>) -> LoadOutcome {
        match value {
            None => self.replace_content(Ok(Document::empty())),
            Some(value) => {
                let normalized = normalize(value, &self.load_options);
                self.replace_content(normalized)
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        self.document.to_json()
    }

    fn replace_content(&mut self, result: Result<Document, ValidationError>) -> LoadOutcome {
        self.history.clear();

        match result {
            Ok(document) if document.is_empty() => {
                self.document = document;
                LoadOutcome::Empty
            }
            Ok(document) => {
                self.document = document;
                LoadOutcome::Loaded
            }
            Err(err) => {
                tracing::warn!("Discarding stored content: {}", err);
                self.document = Document::empty();
                LoadOutcome::Rejected(Diagnostic::rejected(&err))
            }
        }
    }

    fn commit(&mut self) -> u64 {
        self.version += 1;
        match self.document.to_json() {
            Ok(json) => {
                let event = ChangeEvent::new(self.version, self.document.clone(), json);
                self.subscribers.notify(event);
            }
            Err(err) => tracing::error!("Failed to serialize version {}: {}", self.version, err),
        }
        self.version
    }
}

impl Default for EditSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessondoc_document::{Node, NodePath};

    #[test]
    fn test_surface_creation() {
        let surface = EditSurface::new();

        assert_eq!(surface.version(), 0);
        assert!(surface.document().is_empty());
        assert!(!surface.can_undo());
        assert_eq!(surface.to_json().unwrap(), r#"{"kind":"doc"}"#);
    }

    #[test]
    fn test_rejected_edit_keeps_version() {
        let mut surface = EditSurface::new();
        let err = surface
            .apply(EditEvent::InsertNode {
                parent: NodePath::root(),
                index: 0,
                node: Node::text("loose text"),
            })
            .unwrap_err();

        assert!(matches!(
            err,
            EditorError::Validation(ValidationError::InvalidNesting { .. })
        ));
        assert_eq!(surface.version(), 0);
        assert!(!surface.can_undo());
    }

    #[test]
    fn test_load_resets_history() {
        let mut surface = EditSurface::new();
        surface
            .apply(EditEvent::InsertNode {
                parent: NodePath::root(),
                index: 0,
                node: Node::paragraph(vec![Node::text("draft")]),
            })
            .unwrap();
        assert!(surface.can_undo());

        surface.load_str(Some(r#"{"kind":"doc"}"#));

        assert!(!surface.can_undo());
        assert!(surface.document().is_empty());
    }
}
