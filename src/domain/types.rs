//! Strongly-typed value objects used by the marketplace domain.
//!
//! These wrappers enforce basic invariants (positive identifiers, normalized
//! email, E.164 phone numbers, absolute media URLs) so that once a value
//! reaches the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Phone number did not meet expected format.
    #[error("invalid phone number")]
    InvalidPhone,
    /// Provided url failed format validation.
    #[error("invalid url address")]
    InvalidUrl,
}

/// Normalizes and validates an email string.
fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i64` backing this identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(BusinessId, "Unique identifier for a business listing.");
id_newtype!(UserId, "Unique identifier for a marketplace account.");

/// Lower-cased and validated email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContactEmail(String);

impl ContactEmail {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_email(email)?;
        Ok(Self(normalized))
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContactEmail {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ContactEmail {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new(value)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

non_empty_string_newtype!(AccessToken, "Bearer token issued at sign-in.");

non_empty_string_newtype!(
    DisplayName,
    "Account display name wrapper enforcing trimmed, non-empty values."
);

/// Normalizes a phone number string to E.164 format.
pub fn normalize_phone_to_e164(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let parsed = parse(None, trimmed).map_err(|_| TypeConstraintError::InvalidPhone)?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Normalized phone number wrapper (expected E.164).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Constructs a phone number ensuring it parses and normalizes to E.164 format.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_phone_to_e164(&value.into())?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute URL of a photo or video already persisted by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MediaUrl(String);

impl MediaUrl {
    /// Ensures a trimmed, non-empty, well-formed URL before wrapping.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let url = NonEmptyString::new(value)?.into_inner();

        if !url.as_str().validate_url() {
            Err(TypeConstraintError::InvalidUrl)
        } else {
            Ok(Self(url))
        }
    }

    /// Borrow the URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MediaUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for MediaUrl {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_id_rejects_non_positive_values() {
        assert_eq!(BusinessId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(BusinessId::new(12).map(BusinessId::get), Ok(12));
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = ContactEmail::new("  Awa.K@Example.COM ").expect("valid email");
        assert_eq!(email.as_str(), "awa.k@example.com");
        assert_eq!(
            ContactEmail::new("not-an-email"),
            Err(TypeConstraintError::InvalidEmail)
        );
    }

    #[test]
    fn phone_is_normalized_to_e164() {
        let phone = PhoneNumber::new("+1 (415) 555-2671").expect("valid phone");
        assert_eq!(phone.as_str(), "+14155552671");
        assert_eq!(PhoneNumber::new("  "), Err(TypeConstraintError::EmptyString));
        assert_eq!(
            PhoneNumber::new("call me"),
            Err(TypeConstraintError::InvalidPhone)
        );
    }

    #[test]
    fn media_url_requires_valid_url() {
        assert!(MediaUrl::new("https://cdn.example.com/photos/1.jpg").is_ok());
        assert_eq!(MediaUrl::new(""), Err(TypeConstraintError::EmptyString));
        assert_eq!(
            MediaUrl::new("photos/1.jpg"),
            Err(TypeConstraintError::InvalidUrl)
        );
    }

    #[test]
    fn display_name_trims_input() {
        let name = DisplayName::new("  Awa  ").expect("valid name");
        assert_eq!(&*name, "Awa");
    }
}
