use crate::model::{ContentRef, EntityId};
use lessondoc_validator::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Stored record '{id}' is corrupt: {reason}")]
    Corrupt { id: EntityId, reason: String },
}

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Not allowed to modify {reference}")]
    Forbidden { reference: ContentRef },

    #[error("Invalid content id '{0}'")]
    InvalidId(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
