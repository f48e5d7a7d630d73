//! Sign-in, profile and password forms.

use serde::{Deserialize, Serialize};

use crate::domain::types::{ContactEmail, DisplayName, PhoneNumber};
use crate::forms::FormError;
use crate::validation::{FieldSource, schemas};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
/// Credentials entered on the sign-in screen.
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl FieldSource for SignInForm {
    fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), FormError> {
        schemas::sign_in()
            .validate(self)
            .map_err(FormError::Validation)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
/// Password change request.
pub struct PasswordChangeForm {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

impl FieldSource for PasswordChangeForm {
    fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "current_password" => Some(&self.current_password),
            "new_password" => Some(&self.new_password),
            "new_password_confirmation" => Some(&self.new_password_confirmation),
            _ => None,
        }
    }
}

impl PasswordChangeForm {
    pub fn validate(&self) -> Result<(), FormError> {
        schemas::password_change()
            .validate(self)
            .map_err(FormError::Validation)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
/// Profile edit form.
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl FieldSource for ProfileForm {
    fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "phone" => Some(&self.phone),
            _ => None,
        }
    }
}

/// Normalized profile update sent to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub name: DisplayName,
    pub email: ContactEmail,
    pub phone: Option<PhoneNumber>,
}

impl TryFrom<&ProfileForm> for ProfileUpdate {
    type Error = FormError;

    fn try_from(form: &ProfileForm) -> Result<Self, Self::Error> {
        schemas::profile()
            .validate(form)
            .map_err(FormError::Validation)?;

        let invalid = |field: &str| FormError::InvalidValue(field.to_string());
        let phone = match form.phone.trim() {
            "" => None,
            raw => Some(PhoneNumber::new(raw).map_err(|_| invalid("phone"))?),
        };

        Ok(Self {
            name: DisplayName::new(form.name.as_str()).map_err(|_| invalid("name"))?,
            email: ContactEmail::new(form.email.as_str()).map_err(|_| invalid("email"))?,
            phone,
        })
    }
}
