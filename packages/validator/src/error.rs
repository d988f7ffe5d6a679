//! Error types for document validation

use lessondoc_document::{NodeKind, NodePath};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown node kind '{kind}' at {path}")]
    UnknownNodeKind { kind: String, path: NodePath },

    #[error("Unknown mark '{mark}' at {path}")]
    UnknownMark { mark: String, path: NodePath },

    #[error("'{child}' is not allowed inside '{parent}' at {path}")]
    InvalidNesting {
        parent: NodeKind,
        child: NodeKind,
        path: NodePath,
    },

    #[error("'{kind}' cannot carry marks at {path}")]
    InvalidMark { kind: NodeKind, path: NodePath },

    #[error("Unsafe value for attribute '{attribute}' at {path}: {reason}")]
    UnsafeAttribute {
        attribute: String,
        reason: String,
        path: NodePath,
    },

    #[error("Unknown attribute '{attribute}' on {owner} at {path}")]
    UnknownAttribute {
        owner: String,
        attribute: String,
        path: NodePath,
    },

    #[error("Invalid value for attribute '{attribute}' at {path}: {reason}")]
    InvalidAttribute {
        attribute: String,
        reason: String,
        path: NodePath,
    },

    #[error("Missing required attribute '{attribute}' on {owner} at {path}")]
    MissingAttribute {
        owner: String,
        attribute: String,
        path: NodePath,
    },

    #[error("Malformed node at {path}: {reason}")]
    MalformedNode { reason: String, path: NodePath },

    #[error("Root node must be 'doc', found '{found}'")]
    InvalidRoot { found: String },

    #[error("Nesting exceeds {max_depth} levels at {path}")]
    TooDeep { max_depth: usize, path: NodePath },

    #[error("Malformed JSON: {0}")]
    MalformedJson(String),
}

impl ValidationError {
    /// Location of the offending node, when there is one
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            ValidationError::UnknownNodeKind { path, .. }
            | ValidationError::UnknownMark { path, .. }
            | ValidationError::InvalidNesting { path, .. }
            | ValidationError::InvalidMark { path, .. }
            | ValidationError::UnsafeAttribute { path, .. }
            | ValidationError::UnknownAttribute { path, .. }
            | ValidationError::InvalidAttribute { path, .. }
            | ValidationError::MissingAttribute { path, .. }
            | ValidationError::MalformedNode { path, .. }
            | ValidationError::TooDeep { path, .. } => Some(path),
            ValidationError::InvalidRoot { .. } | ValidationError::MalformedJson(_) => None,
        }
    }

    /// Stable identifier for structured reporting
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::UnknownNodeKind { .. } => "unknown-node-kind",
            ValidationError::UnknownMark { .. } => "unknown-mark",
            ValidationError::InvalidNesting { .. } => "invalid-nesting",
            ValidationError::InvalidMark { .. } => "invalid-mark",
            ValidationError::UnsafeAttribute { .. } => "unsafe-attribute",
            ValidationError::UnknownAttribute { .. } => "unknown-attribute",
            ValidationError::InvalidAttribute { .. } => "invalid-attribute",
            ValidationError::MissingAttribute { .. } => "missing-attribute",
            ValidationError::MalformedNode { .. } => "malformed-node",
            ValidationError::InvalidRoot { .. } => "invalid-root",
            ValidationError::TooDeep { .. } => "too-deep",
            ValidationError::MalformedJson(_) => "malformed-json",
        }
    }
}
