use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Field message as sent by the backend: a bare string or a list of them.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ErrorMessages {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessages {
    /// The message shown next to the field.
    pub fn first(&self) -> Option<&str> {
        match self {
            ErrorMessages::One(message) => Some(message.as_str()),
            ErrorMessages::Many(messages) => messages.first().map(String::as_str),
        }
    }
}

/// JSON body of a rejected request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, ErrorMessages>>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request rejected with status {status}")]
    Rejected { status: u16, body: ErrorBody },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("not signed in")]
    Unauthenticated,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Top-level message supplied by the backend, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { body, .. } => body.message.as_deref(),
            _ => None,
        }
    }

    /// Per-field messages under the backend's own keys, first message each.
    ///
    /// Returns `None` unless the body carries a non-empty `errors` map.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        let ApiError::Rejected { body, .. } = self else {
            return None;
        };
        let errors: FieldErrors = body
            .errors
            .as_ref()?
            .iter()
            .filter_map(|(field, messages)| {
                messages.first().map(|message| (field.as_str(), message))
            })
            .collect();
        (!errors.is_empty()).then_some(errors)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
