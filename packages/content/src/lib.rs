//! # Lessondoc Content
//!
//! Authoring workflow around the document core: lessons and quizzes each
//! own one rich-text body, saved through a [`ContentStore`] and published
//! as HTML and Markdown.
//!
//! The relational database behind the real application is an external
//! collaborator; [`MemoryStore`] and [`DirectoryStore`] implement the same
//! contract for tests and the command line.

mod directory;
mod error;
mod model;
mod service;
mod store;

pub use directory::DirectoryStore;
pub use error::{ContentError, StoreError};
pub use model::{ContentKind, ContentRef, EntityId, StoredContent, MAX_ID_LEN};
pub use service::{AccessPolicy, AllowAll, ContentService, RenderedContent};
pub use store::{ContentStore, MemoryStore};
