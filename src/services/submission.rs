//! Mapping of submission results to form errors and notifications.

use crate::api::{ApiResult, SubmitResponse};
use crate::forms::business::{BusinessField, FormMode};
use crate::forms::field_names::{base_field_name, edit_field_name};
use crate::services::ui::{Toast, ToastStatus};
use crate::validation::FieldErrors;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

/// How a submit attempt ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend accepted the listing.
    Succeeded { message: Option<String> },
    /// Client-side checks failed; nothing was sent.
    Invalid(FieldErrors),
    /// The backend rejected individual fields; keys use the form's naming.
    Rejected(FieldErrors),
    /// Anything else: network trouble, server errors, malformed input.
    Failed { message: String },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded { .. })
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            SubmitOutcome::Invalid(errors) | SubmitOutcome::Rejected(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Renames backend error keys to the input names of `mode`.
///
/// Array suffixes are dropped so `photos.0` lands on `photos`, and the
/// `submitter_*` keys land on the contact inputs. Keys that match no input
/// pass through. When two backend keys collapse onto one input, the first
/// message is kept.
pub fn map_server_errors(errors: &FieldErrors, mode: FormMode) -> FieldErrors {
    let mut mapped = FieldErrors::new();
    for (key, message) in errors.iter() {
        let base = base_field_name(key);
        let name = match BusinessField::from_name(edit_field_name(base)) {
            Some(field) => mode.field_key(field),
            None => base,
        };
        if !mapped.contains(name) {
            mapped.insert(name, message);
        }
    }
    mapped
}

/// Sorts a backend response into an outcome.
pub fn classify(result: ApiResult<SubmitResponse>, mode: FormMode) -> SubmitOutcome {
    match result {
        Ok(response) => SubmitOutcome::Succeeded {
            message: response.message,
        },
        Err(err) => match err.field_errors() {
            Some(errors) => {
                log::info!("Backend rejected {} field(s)", errors.len());
                SubmitOutcome::Rejected(map_server_errors(&errors, mode))
            }
            None => {
                log::error!("Failed to submit business: {err}");
                SubmitOutcome::Failed {
                    message: err
                        .server_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
                }
            }
        },
    }
}

/// Notification shown for an outcome.
pub fn toast_for(outcome: &SubmitOutcome, mode: FormMode) -> Toast {
    match outcome {
        SubmitOutcome::Succeeded { message } => {
            let (title, fallback) = if mode.is_edit() {
                ("Listing updated", "Your changes were saved.")
            } else {
                ("Listing submitted", "Your business was sent for review.")
            };
            Toast::new(
                title,
                message.as_deref().unwrap_or(fallback),
                ToastStatus::Success,
            )
        }
        SubmitOutcome::Invalid(_) | SubmitOutcome::Rejected(_) => Toast::new(
            "Check the form",
            "Some fields need your attention.",
            ToastStatus::Warning,
        ),
        SubmitOutcome::Failed { message } => {
            Toast::new("Submission failed", message.as_str(), ToastStatus::Error)
        }
    }
}
