//! Workflows driving the marketplace forms against the backend.

use thiserror::Error;

use crate::api::ApiError;
use crate::forms::FormError;
use crate::media::MediaError;

pub mod account;
pub mod business_form;
pub mod messages;
pub mod submission;
pub mod ui;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("form error: {0}")]
    Form(#[from] FormError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("media error: {0}")]
    Media(#[from] MediaError),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),

    #[error("sign in required")]
    Unauthorized,

    #[error("operation only available when editing a listing")]
    NotEditing,
}

pub type ServiceResult<T> = Result<T, ServiceError>;
