//! # Lessondoc Document
//!
//! Rich-text document model shared by the validator, the renderers and the
//! editing surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ untrusted JSON (editor UI, stored content)  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ validator: JSON → Document (schema-checked) │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: Node tree + static schema table   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compilers: Document → HTML / Markdown       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! A [`Document`] can be serialized but not deserialized: the only way to
//! turn JSON into a document is `lessondoc_validator::normalize`.

pub mod model;
pub mod schema;
pub mod visitor;

pub use model::{AttrValue, Attributes, Document, Mark, MarkKind, Node, NodeKind, NodePath};
pub use schema::{
    allowed_attributes, is_valid_child, mark_spec, node_spec, AttrSpec, AttrType, ContentRule,
    MarkSpec, NodeGroup, NodeSpec, LIST_START_MAX, MARK_SPECS, NODE_SPECS,
};
pub use visitor::{walk_document, walk_node, Visitor};
