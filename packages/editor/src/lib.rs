//! # Lessondoc Editor
//!
//! Adapter between an editing UI and the document model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI: keystrokes, toolbar, paste              │
//! └─────────────────────────────────────────────┘
//!                     ↓ EditEvent
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSurface                         │
//! │  - Apply edits to a copy                    │
//! │  - Re-validate (strict) before commit       │
//! │  - Snapshot undo/redo                       │
//! │  - Notify listeners with the new JSON       │
//! └─────────────────────────────────────────────┘
//!                     ↓ ChangeEvent
//! ┌─────────────────────────────────────────────┐
//! │ form state / autosave                       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lessondoc_editor::{EditEvent, EditSurface};
//!
//! let mut surface = EditSurface::new();
//! surface.load_str(stored_json.as_deref());
//!
//! let mut changes = surface.subscribe();
//! surface.apply(EditEvent::ReplaceText { path, text: "Dose".into() })?;
//!
//! let change = changes.receiver.recv().await;
//! ```

mod errors;
mod mutations;
mod subscription;
mod surface;
mod undo_stack;

pub use errors::EditorError;
pub use mutations::EditEvent;
pub use subscription::{ChangeEvent, Subscription};
pub use surface::{EditSurface, LoadOutcome};
pub use undo_stack::{Snapshot, UndoStack, DEFAULT_MAX_LEVELS};
