//! Error types for the editor

use lessondoc_document::{NodeKind, NodePath};
use lessondoc_validator::ValidationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("No node at {0}")]
    PathNotFound(NodePath),

    #[error("Index {index} is out of bounds at {path} ({len} children)")]
    IndexOutOfBounds {
        path: NodePath,
        index: usize,
        len: usize,
    },

    #[error("Node at {path} is '{kind}', not text")]
    NotText { path: NodePath, kind: NodeKind },

    #[error("Node at {path} is '{kind}' and cannot hold children")]
    NotAContainer { path: NodePath, kind: NodeKind },

    #[error("Cannot move {from} into its own subtree at {to_parent}")]
    CycleDetected { from: NodePath, to_parent: NodePath },

    #[error("Edit rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}
