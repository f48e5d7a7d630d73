//! Contact and inquiry message forms.

use serde::{Deserialize, Serialize};

use crate::formatting::{sanitize_phone_digits, sanitize_text};
use crate::forms::FormError;
use crate::validation::{FieldSource, schemas};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
/// Message sent through the contact page.
pub struct ContactMessageForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl FieldSource for ContactMessageForm {
    fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "subject" => Some(&self.subject),
            "message" => Some(&self.message),
            _ => None,
        }
    }
}

impl ContactMessageForm {
    /// Validates the form and returns a copy with markup removed.
    pub fn clean(&self) -> Result<Self, FormError> {
        schemas::contact_message()
            .validate(self)
            .map_err(FormError::Validation)?;

        Ok(Self {
            name: sanitize_text(self.name.trim()),
            email: self.email.trim().to_lowercase(),
            subject: sanitize_text(self.subject.trim()),
            message: sanitize_text(self.message.trim()),
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
/// Buyer inquiry about one listing.
pub struct InquiryForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub message: String,
}

impl FieldSource for InquiryForm {
    fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "phone" => Some(&self.phone),
            "message" => Some(&self.message),
            _ => None,
        }
    }
}

impl InquiryForm {
    /// Validates the form and returns a copy with markup removed.
    pub fn clean(&self) -> Result<Self, FormError> {
        schemas::inquiry_message()
            .validate(self)
            .map_err(FormError::Validation)?;

        Ok(Self {
            name: sanitize_text(self.name.trim()),
            email: self.email.trim().to_lowercase(),
            phone: sanitize_phone_digits(&self.phone),
            message: sanitize_text(self.message.trim()),
        })
    }
}
