//! # Content Service
//!
//! Save, publish and delete lesson and quiz bodies.
//!
//! Writes are validated before they reach the store and gated by an
//! [`AccessPolicy`]. Publishing never fails because of what is stored:
//! a body that no longer validates renders as an empty page plus a
//! structured warning.

use crate::model::ContentRef;
use crate::store::ContentStore;
use crate::ContentError;
use chrono::{DateTime, Utc};
use lessondoc_compiler_html::to_html;
use lessondoc_compiler_markdown::to_markdown;
use lessondoc_document::{Document, NodePath};
use lessondoc_validator::{normalize, parse_document, Diagnostic, ValidationOptions};
use serde::Serialize;

/// Write authorization, decided by the identity provider in front of the
/// service
pub trait AccessPolicy: Send + Sync {
    fn can_write(&self, reference: &ContentRef) -> bool;
}

/// Grants every write; for the CLI and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn can_write(&self, _reference: &ContentRef) -> bool {
        true
    }
}

/// Public rendering of one content body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedContent {
    pub html: String,
    pub markdown: String,
    pub updated_at: Option<DateTime<Utc>>,
    /// Why the rendering is empty, when stored content was unusable
    pub warning: Option<Diagnostic>,
}

pub struct ContentService<S, P = AllowAll> {
    store: S,
    policy: P,
    options: ValidationOptions,
}

impl<S: ContentStore> ContentService<S, AllowAll> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: AllowAll,
            options: ValidationOptions::default(),
        }
    }
}

impl<S: ContentStore, P: AccessPolicy> ContentService<S, P> {
    pub fn with_policy<Q: AccessPolicy>(self, policy: Q) -> ContentService<S, Q> {
        ContentService {
            store: self.store,
            policy,
            options: self.options,
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate `raw` and store it as the body of `reference`
    pub fn save(
        &self,
        reference: &ContentRef,
        raw: &serde_json::Value,
    ) -> Result<Document, ContentError> {
        self.authorize(reference)?;
        let document = normalize(raw, &self.options)?;
        self.store.save(reference.key(), &document)?;
        tracing::info!("Saved {}", reference);
        Ok(document)
    }

    /// Like [`save`](Self::save), from JSON text
    pub fn save_str(&self, reference: &ContentRef, source: &str) -> Result<Document, ContentError> {
        self.authorize(reference)?;
        let document = parse_document(source, &self.options)?;
        self.store.save(reference.key(), &document)?;
        tracing::info!("Saved {}", reference);
        Ok(document)
    }

    /// Stored body, re-validated; `None` if nothing was saved
    pub fn load(&self, reference: &ContentRef) -> Result<Option<Document>, ContentError> {
        match self.store.load(reference.key())? {
            Some(record) => Ok(Some(normalize(&record.document, &self.options)?)),
            None => Ok(None),
        }
    }

    /// Render the stored body for public display
    pub fn publish(&self, reference: &ContentRef) -> RenderedContent {
        let record = match self.store.load(reference.key()) {
            Ok(Some(record)) => record,
            Ok(None) => return RenderedContent::default(),
            Err(err) => {
                tracing::warn!("Could not load {}: {}", reference, err);
                return RenderedContent {
                    warning: Some(Diagnostic::error(
                        "store-unavailable",
                        err.to_string(),
                        NodePath::root(),
                    )),
                    ..Default::default()
                };
            }
        };

        match normalize(&record.document, &self.options) {
            Ok(document) => RenderedContent {
                html: to_html(&document),
                markdown: to_markdown(&document),
                updated_at: Some(record.updated_at),
                warning: None,
            },
            Err(err) => {
                tracing::warn!("Stored {} no longer validates: {}", reference, err);
                RenderedContent {
                    updated_at: Some(record.updated_at),
                    warning: Some(Diagnostic::rejected(&err)),
                    ..Default::default()
                }
            }
        }
    }

    /// Remove the body together with its parent record
    pub fn delete(&self, reference: &ContentRef) -> Result<bool, ContentError> {
        self.authorize(reference)?;
        let deleted = self.store.delete(reference.key())?;
        if deleted {
            tracing::info!("Deleted {}", reference);
        }
        Ok(deleted)
    }

    fn authorize(&self, reference: &ContentRef) -> Result<(), ContentError> {
        if self.policy.can_write(reference) {
            return Ok(());
        }
        tracing::warn!("Denied write to {}", reference);
        Err(ContentError::Forbidden {
            reference: reference.clone(),
        })
    }
}
