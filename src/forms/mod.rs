//! Form records edited by the marketplace screens.

use thiserror::Error;

use crate::validation::FieldErrors;

pub mod account;
pub mod business;
pub mod field_names;
pub mod media;
pub mod message;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field {0} does not accept this kind of value")]
    InvalidValue(String),

    #[error("invalid number in field {field}: {value}")]
    InvalidNumber { field: String, value: String },

    #[error("no list entry at index {0}")]
    ListIndex(usize),

    #[error("no media item at index {0}")]
    MediaIndex(usize),

    #[error("media item at index {0} is stored on the server and must be deleted there")]
    PersistedMedia(usize),

    #[error("media batch does not belong to this field")]
    MediaKindMismatch,

    #[error("failed to serialize list field: {0}")]
    Serialization(#[from] serde_json::Error),
}
