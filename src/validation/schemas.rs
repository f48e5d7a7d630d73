//! Constraint tables for every form family of the marketplace.
//!
//! Field names are the snake_case wire names; the business form controller
//! renames keys for edit mode after validation.

use crate::validation::{FieldRules, Rule, Schema};

pub const DESCRIPTION_MIN_CHARS: usize = 50;
pub const LONG_TEXT_MAX_CHARS: usize = 5000;
pub const EMPLOYEES_MAX: u64 = 1_000_000;
pub const YEARLY_REVENUE_MAX: u64 = 999_999_999;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// Business submission and edit form.
///
/// `assets` and `advantages` are deliberately absent: their "at least one
/// entry" rule is applied by the form controller on the list itself.
pub fn business_draft(current_year: u64) -> Schema {
    Schema::new(vec![
        FieldRules::required("contact_name", "Contact name is required")
            .rule(Rule::MinChars(2), "Contact name must be at least 2 characters"),
        FieldRules::required("contact_phone", "Contact phone is required").rule(
            Rule::DigitCount { min: 8, max: 15 },
            "Phone number must contain between 8 and 15 digits",
        ),
        FieldRules::optional("contact_email").rule(Rule::Email, "Enter a valid email address"),
        FieldRules::required("name", "Business name is required")
            .rule(Rule::MinChars(3), "Business name must be at least 3 characters"),
        FieldRules::required("category", "Category is required"),
        FieldRules::required("location", "Location is required"),
        FieldRules::required("description", "Description is required")
            .rule(
                Rule::MinChars(DESCRIPTION_MIN_CHARS),
                format!("Description must be at least {DESCRIPTION_MIN_CHARS} characters"),
            )
            .rule(
                Rule::MaxChars(LONG_TEXT_MAX_CHARS),
                format!("Description must not exceed {LONG_TEXT_MAX_CHARS} characters"),
            ),
        FieldRules::optional("additional_info").rule(
            Rule::MaxChars(LONG_TEXT_MAX_CHARS),
            format!("Additional information must not exceed {LONG_TEXT_MAX_CHARS} characters"),
        ),
        FieldRules::required("price", "Price is required")
            .rule(Rule::Numeric, "Price must contain digits only"),
        FieldRules::required("year_established", "Year established is required")
            .rule(Rule::Numeric, "Year must contain digits only")
            .rule(
                Rule::MaxValue(current_year),
                "Year established cannot be in the future",
            ),
        FieldRules::optional("employees")
            .rule(Rule::Numeric, "Employee count must contain digits only")
            .rule(Rule::MinValue(1), "Employee count must be at least 1")
            .rule(
                Rule::MaxValue(EMPLOYEES_MAX),
                "Employee count must not exceed 1 000 000",
            ),
        FieldRules::optional("monthly_revenue")
            .rule(Rule::Numeric, "Monthly revenue must contain digits only"),
        FieldRules::optional("yearly_revenue")
            .rule(Rule::Numeric, "Yearly revenue must contain digits only")
            .rule(
                Rule::MaxValue(YEARLY_REVENUE_MAX),
                "Yearly revenue is too large",
            ),
        FieldRules::optional("reasons").rule(
            Rule::MaxChars(LONG_TEXT_MAX_CHARS),
            format!("Reasons must not exceed {LONG_TEXT_MAX_CHARS} characters"),
        ),
    ])
}

/// Password change form.
pub fn password_change() -> Schema {
    Schema::new(vec![
        FieldRules::required("current_password", "Current password is required"),
        FieldRules::required("new_password", "New password is required").rule(
            Rule::MinChars(PASSWORD_MIN_CHARS),
            format!("Password must be at least {PASSWORD_MIN_CHARS} characters"),
        ),
        FieldRules::required("new_password_confirmation", "Confirm the new password")
            .rule(Rule::Matches("new_password"), "Passwords do not match"),
    ])
}

/// Profile edit form.
pub fn profile() -> Schema {
    Schema::new(vec![
        FieldRules::required("name", "Name is required")
            .rule(Rule::MinChars(2), "Name must be at least 2 characters"),
        FieldRules::required("email", "Email is required")
            .rule(Rule::Email, "Enter a valid email address"),
        FieldRules::optional("phone").rule(
            Rule::Phone,
            "Enter the phone number in international format",
        ),
    ])
}

/// Contact-us message form.
pub fn contact_message() -> Schema {
    Schema::new(vec![
        FieldRules::required("name", "Name is required")
            .rule(Rule::MinChars(2), "Name must be at least 2 characters"),
        FieldRules::required("email", "Email is required")
            .rule(Rule::Email, "Enter a valid email address"),
        FieldRules::required("subject", "Subject is required")
            .rule(Rule::MinChars(3), "Subject must be at least 3 characters"),
        message_rules(),
    ])
}

/// Inquiry about a specific listing.
pub fn inquiry_message() -> Schema {
    Schema::new(vec![
        FieldRules::required("name", "Name is required")
            .rule(Rule::MinChars(2), "Name must be at least 2 characters"),
        FieldRules::required("email", "Email is required")
            .rule(Rule::Email, "Enter a valid email address"),
        FieldRules::optional("phone").rule(
            Rule::DigitCount { min: 8, max: 15 },
            "Phone number must contain between 8 and 15 digits",
        ),
        message_rules(),
    ])
}

/// Sign-in form.
pub fn sign_in() -> Schema {
    Schema::new(vec![
        FieldRules::required("email", "Email is required")
            .rule(Rule::Email, "Enter a valid email address"),
        FieldRules::required("password", "Password is required"),
    ])
}

fn message_rules() -> FieldRules {
    FieldRules::required("message", "Message is required")
        .rule(
            Rule::MinChars(MESSAGE_MIN_CHARS),
            format!("Message must be at least {MESSAGE_MIN_CHARS} characters"),
        )
        .rule(
            Rule::MaxChars(MESSAGE_MAX_CHARS),
            format!("Message must not exceed {MESSAGE_MAX_CHARS} characters"),
        )
}
