use crate::ContentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_ID_LEN: usize = 128;

/// Store key; also used as a file name, so restricted to `[A-Za-z0-9_-]`
/// and at most [`MAX_ID_LEN`] bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Result<Self, ContentError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id.len() <= MAX_ID_LEN
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ContentError::InvalidId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parent record type that owns a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Lesson,
    Quiz,
}

impl ContentKind {
    pub fn name(self) -> &'static str {
        match self {
            ContentKind::Lesson => "lesson",
            ContentKind::Quiz => "quiz",
        }
    }
}

/// A lesson or quiz whose body is a document
///
/// The id must leave room for the kind prefix of the store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentRef {
    kind: ContentKind,
    id: EntityId,
    key: EntityId,
}

impl ContentRef {
    pub fn new(kind: ContentKind, id: &str) -> Result<Self, ContentError> {
        let id = EntityId::new(id)?;
        let key = EntityId::new(format!("{}-{}", kind.name(), id))
            .map_err(|_| ContentError::InvalidId(id.to_string()))?;
        Ok(Self { kind, id, key })
    }

    pub fn lesson(id: &str) -> Result<Self, ContentError> {
        Self::new(ContentKind::Lesson, id)
    }

    pub fn quiz(id: &str) -> Result<Self, ContentError> {
        Self::new(ContentKind::Quiz, id)
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Store key, unique across kinds
    pub fn key(&self) -> &EntityId {
        &self.key
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind.name(), self.id)
    }
}

/// A persisted document body
///
/// The body is kept as raw JSON: what comes back from storage is untrusted
/// until it has been normalized again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredContent {
    pub document: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
